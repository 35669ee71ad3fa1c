// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

//! The modern OAuth chain: Microsoft token, Xbox Live, XSTS, game token,
//! profile. Every step consumes the previous step's output.

use std::time::{SystemTime, UNIX_EPOCH};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use shared::HTTP_CLIENT;

use crate::RestResponse;

const TOKEN_ENDPOINT: &str = "https://login.microsoftonline.com/consumers/oauth2/v2.0/token";
const XBL_ENDPOINT: &str = "https://user.auth.xboxlive.com/user/authenticate";
const XSTS_ENDPOINT: &str = "https://xsts.auth.xboxlive.com/xsts/authorize";
const GAME_ENDPOINT: &str = "https://api.minecraftservices.com/authentication/login_with_xbox";
const PROFILE_ENDPOINT: &str = "https://api.minecraftservices.com/minecraft/profile";
const OAUTH_SCOPE: &str = "XboxLive.signin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MicrosoftErrorCode {
    NoXboxAccount,
    XblBanned,
    Under18,
    NotOwned,
    Unknown,
}

impl MicrosoftErrorCode {
    /// Maps the Xbox `XErr` numeric codes we understand.
    pub fn from_xerr(xerr: u64) -> Self {
        match xerr {
            2148916233 => Self::NoXboxAccount,
            2148916235 => Self::XblBanned,
            2148916238 => Self::Under18,
            _ => Self::Unknown,
        }
    }
}

pub type MicrosoftResponse<T> = RestResponse<T, MicrosoftErrorCode>;

/// Either leg of the OAuth token grant.
pub enum TokenGrant {
    AuthorizationCode(String),
    RefreshToken(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct XuiClaim {
    pub uhs: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayClaims {
    pub xui: Vec<XuiClaim>,
}

/// The shape both XBL and XSTS reply with.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct XboxServiceToken {
    pub issue_instant: String,
    pub not_after: String,
    pub token: String,
    pub display_claims: DisplayClaims,
}

impl XboxServiceToken {
    pub fn user_hash(&self) -> Option<&str> {
        self.xui_claim().map(|claim| claim.uhs.as_str())
    }

    fn xui_claim(&self) -> Option<&XuiClaim> {
        self.display_claims.xui.first()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct XboxErrorBody {
    #[serde(rename = "XErr")]
    xerr: Option<u64>,
    #[serde(rename = "Message")]
    message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameToken {
    pub access_token: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skin {
    pub id: String,
    pub state: String,
    #[serde(rename(serialize = "textureKey", deserialize = "textureKey"))]
    pub texture_key: Option<String>,
    pub url: String,
    pub variant: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cape {
    pub alias: Option<String>,
    pub id: String,
    pub state: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub skins: Vec<Skin>,
    #[serde(default)]
    pub capes: Vec<Cape>,
}

#[derive(Debug, Clone, Deserialize)]
struct ProfileErrorBody {
    path: Option<String>,
    #[serde(rename = "errorType")]
    error_type: Option<String>,
    #[serde(rename = "errorMessage")]
    error_message: Option<String>,
}

/// Everything a launcher needs after the whole chain succeeded.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedSession {
    pub game_token: String,
    /// Unix timestamp the Microsoft access token expires at.
    pub expires_on: u64,
    pub refresh_token: String,
    pub profile: GameProfile,
}

#[derive(Clone, Serialize, Deserialize)]
struct XboxAuthProperties {
    #[serde(rename = "AuthMethod")]
    auth_method: String,
    #[serde(rename = "SiteName")]
    site_name: String,
    #[serde(rename = "RpsTicket")]
    rps_ticket: String,
}

#[derive(Clone, Serialize, Deserialize)]
struct XboxAuthBody {
    #[serde(rename = "Properties")]
    properties: XboxAuthProperties,
    #[serde(rename = "RelyingParty")]
    relying_party: String,
    #[serde(rename = "TokenType")]
    token_type: String,
}

impl XboxAuthBody {
    fn new(access_token: &str) -> Self {
        Self {
            properties: XboxAuthProperties {
                auth_method: "RPS".to_string(),
                site_name: "user.auth.xboxlive.com".to_string(),
                rps_ticket: format!("d={access_token}"),
            },
            relying_party: "http://auth.xboxlive.com".to_string(),
            token_type: "JWT".to_string(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
struct XstsAuthProperties {
    #[serde(rename = "SandboxId")]
    sandbox_id: String,
    #[serde(rename = "UserTokens")]
    user_tokens: Vec<String>,
}

#[derive(Clone, Serialize, Deserialize)]
struct XstsAuthBody {
    #[serde(rename = "Properties")]
    properties: XstsAuthProperties,
    #[serde(rename = "RelyingParty")]
    relying_party: String,
    #[serde(rename = "TokenType")]
    token_type: String,
}

impl XstsAuthBody {
    fn new(xbl_token: &str) -> Self {
        Self {
            properties: XstsAuthProperties {
                sandbox_id: "RETAIL".to_string(),
                user_tokens: vec![xbl_token.to_string()],
            },
            relying_party: "rp://api.minecraftservices.com/".to_string(),
            token_type: "JWT".to_string(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
struct GameAuthBody {
    #[serde(rename = "identityToken")]
    identity_token: String,
}

impl GameAuthBody {
    fn new(user_hash: &str, xsts_token: &str) -> Self {
        Self {
            identity_token: format!("XBL3.0 x={user_hash};{xsts_token}"),
        }
    }
}

/// Client for the four-hop OAuth chain and the profile endpoint.
pub struct MicrosoftClient {
    pub client_id: String,
    pub redirect_uri: String,
    pub token_endpoint: String,
    pub xbl_endpoint: String,
    pub xsts_endpoint: String,
    pub game_endpoint: String,
    pub profile_endpoint: String,
}

impl MicrosoftClient {
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            token_endpoint: TOKEN_ENDPOINT.to_string(),
            xbl_endpoint: XBL_ENDPOINT.to_string(),
            xsts_endpoint: XSTS_ENDPOINT.to_string(),
            game_endpoint: GAME_ENDPOINT.to_string(),
            profile_endpoint: PROFILE_ENDPOINT.to_string(),
        }
    }

    fn transport_failure<T>(error: reqwest::Error) -> MicrosoftResponse<T> {
        RestResponse::failure(error.to_string(), Some(MicrosoftErrorCode::Unknown))
    }

    /// Step 1: trade an authorization code or refresh token for OAuth tokens.
    pub async fn get_tokens(&self, grant: TokenGrant) -> MicrosoftResponse<OAuthTokens> {
        let mut form = vec![
            ("client_id", self.client_id.clone()),
            ("redirect_uri", self.redirect_uri.clone()),
            ("scope", OAUTH_SCOPE.to_string()),
        ];
        match grant {
            TokenGrant::AuthorizationCode(code) => {
                form.push(("grant_type", "authorization_code".to_string()));
                form.push(("code", code));
            }
            TokenGrant::RefreshToken(token) => {
                form.push(("grant_type", "refresh_token".to_string()));
                form.push(("refresh_token", token));
            }
        }
        let result = HTTP_CLIENT
            .post(&self.token_endpoint)
            .form(&form)
            .send()
            .await;
        let response = match result {
            Ok(response) => response,
            Err(error) => return Self::transport_failure(error),
        };
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("OAuth token exchange failed with HTTP {status}");
            return RestResponse::failure(body, Some(MicrosoftErrorCode::Unknown));
        }
        match response.json::<OAuthTokens>().await {
            Ok(tokens) => RestResponse::success(tokens),
            Err(error) => Self::transport_failure(error),
        }
    }

    /// Step 2: authenticate against Xbox Live with the OAuth access token.
    pub async fn xbl_authenticate(
        &self,
        access_token: &str,
    ) -> MicrosoftResponse<XboxServiceToken> {
        self.xbox_request(&self.xbl_endpoint, &XboxAuthBody::new(access_token))
            .await
    }

    /// Step 3: trade the XBL token for an XSTS token.
    pub async fn xsts_authenticate(
        &self,
        xbl_token: &str,
    ) -> MicrosoftResponse<XboxServiceToken> {
        self.xbox_request(&self.xsts_endpoint, &XstsAuthBody::new(xbl_token))
            .await
    }

    async fn xbox_request<B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> MicrosoftResponse<XboxServiceToken> {
        let result = HTTP_CLIENT
            .post(endpoint)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await;
        let response = match result {
            Ok(response) => response,
            Err(error) => return Self::transport_failure(error),
        };
        if !response.status().is_success() {
            let status = response.status();
            let body: XboxErrorBody = response.json().await.unwrap_or(XboxErrorBody {
                xerr: None,
                message: None,
            });
            let code = body
                .xerr
                .map(MicrosoftErrorCode::from_xerr)
                .unwrap_or(MicrosoftErrorCode::Unknown);
            warn!("Xbox service request failed with HTTP {status}: {code:?}");
            return RestResponse::failure(
                body.message.unwrap_or_else(|| format!("HTTP {status}")),
                Some(code),
            );
        }
        match response.json::<XboxServiceToken>().await {
            Ok(token) => RestResponse::success(token),
            Err(error) => Self::transport_failure(error),
        }
    }

    /// Step 4: obtain the game token from the Minecraft services.
    pub async fn game_authenticate(
        &self,
        user_hash: &str,
        xsts_token: &str,
    ) -> MicrosoftResponse<GameToken> {
        let result = HTTP_CLIENT
            .post(&self.game_endpoint)
            .header("Accept", "application/json")
            .json(&GameAuthBody::new(user_hash, xsts_token))
            .send()
            .await;
        let response = match result {
            Ok(response) => response,
            Err(error) => return Self::transport_failure(error),
        };
        if !response.status().is_success() {
            let status = response.status();
            return RestResponse::failure(
                format!("HTTP {status}"),
                Some(MicrosoftErrorCode::Unknown),
            );
        }
        match response.json::<GameToken>().await {
            Ok(token) => RestResponse::success(token),
            Err(error) => Self::transport_failure(error),
        }
    }

    /// Step 5: fetch the player profile with the game token.
    pub async fn get_profile(&self, game_token: &str) -> MicrosoftResponse<GameProfile> {
        let result = HTTP_CLIENT
            .get(&self.profile_endpoint)
            .bearer_auth(game_token)
            .send()
            .await;
        let response = match result {
            Ok(response) => response,
            Err(error) => return Self::transport_failure(error),
        };
        if !response.status().is_success() {
            let status = response.status();
            let body: Option<ProfileErrorBody> = response.json().await.ok();
            let code = match &body {
                Some(body)
                    if body.path.as_deref() == Some("/minecraft/profile")
                        && body.error_type.as_deref() == Some("NOT_FOUND") =>
                {
                    MicrosoftErrorCode::NotOwned
                }
                _ => MicrosoftErrorCode::Unknown,
            };
            warn!("Profile request failed with HTTP {status}: {code:?}");
            return RestResponse::failure(
                body.and_then(|body| body.error_message)
                    .unwrap_or_else(|| format!("HTTP {status}")),
                Some(code),
            );
        }
        match response.json::<GameProfile>().await {
            Ok(profile) => RestResponse::success(profile),
            Err(error) => Self::transport_failure(error),
        }
    }

    /// Drives the whole chain in one call.
    ///
    /// The first envelope that reports an error is propagated with its code;
    /// nothing later in the chain runs.
    pub async fn full_login(&self, grant: TokenGrant) -> MicrosoftResponse<AuthenticatedSession> {
        let tokens = self.get_tokens(grant).await;
        let Some(oauth) = tokens.data else {
            return RestResponse::failure(
                tokens.error.unwrap_or_default(),
                tokens.provider_code,
            );
        };
        info!("Successfully got Microsoft access token");

        let xbl = self.xbl_authenticate(&oauth.access_token).await;
        let Some(xbl_token) = xbl.data else {
            return RestResponse::failure(xbl.error.unwrap_or_default(), xbl.provider_code);
        };
        info!("Successfully logged into Xbox Live");

        let Some(user_hash) = xbl_token.user_hash().map(str::to_string) else {
            return RestResponse::failure(
                "Xbox Live reply carried no user hash",
                Some(MicrosoftErrorCode::Unknown),
            );
        };

        let xsts = self.xsts_authenticate(&xbl_token.token).await;
        let Some(xsts_token) = xsts.data else {
            return RestResponse::failure(xsts.error.unwrap_or_default(), xsts.provider_code);
        };
        info!("Successfully passed XSTS");

        let game = self.game_authenticate(&user_hash, &xsts_token.token).await;
        let Some(game_token) = game.data else {
            return RestResponse::failure(game.error.unwrap_or_default(), game.provider_code);
        };
        info!("Successfully got Minecraft access token");

        let profile = self.get_profile(&game_token.access_token).await;
        let Some(profile) = profile.data else {
            return RestResponse::failure(
                profile.error.unwrap_or_default(),
                profile.provider_code,
            );
        };
        info!("Successfully got game profile");

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Incorrect System Time")
            .as_secs();
        RestResponse::success(AuthenticatedSession {
            game_token: game_token.access_token,
            expires_on: now + oauth.expires_in,
            refresh_token: oauth.refresh_token,
            profile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RestStatus;
    use std::io::{Read as _, Write as _};
    use std::net::TcpListener;
    use std::thread;

    fn spawn_single_response(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server failed");
        let addr = listener.local_addr().expect("read local addr failed");
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept failed");
            let mut buf = [0_u8; 4096];
            let _ = stream.read(&mut buf);
            let head = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status_line,
                body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(body.as_bytes());
            let _ = stream.flush();
        });
        (format!("http://{addr}"), handle)
    }

    fn test_client() -> MicrosoftClient {
        MicrosoftClient::new("test-client-id", "http://localhost/callback")
    }

    #[test]
    fn xerr_codes_map() {
        assert_eq!(
            MicrosoftErrorCode::from_xerr(2148916233),
            MicrosoftErrorCode::NoXboxAccount
        );
        assert_eq!(
            MicrosoftErrorCode::from_xerr(2148916235),
            MicrosoftErrorCode::XblBanned
        );
        assert_eq!(
            MicrosoftErrorCode::from_xerr(2148916238),
            MicrosoftErrorCode::Under18
        );
        assert_eq!(
            MicrosoftErrorCode::from_xerr(42),
            MicrosoftErrorCode::Unknown
        );
    }

    #[tokio::test]
    async fn xbl_under_18_yields_classified_envelope() {
        let (base, handle) =
            spawn_single_response("401 Unauthorized", r#"{"XErr":2148916238,"Message":""}"#);
        let mut client = test_client();
        client.xbl_endpoint = base;

        let response = client.xbl_authenticate("token").await;
        let _ = handle.join();

        assert_eq!(response.status, RestStatus::Error);
        assert_eq!(response.provider_code, Some(MicrosoftErrorCode::Under18));
        assert!(response.data.is_none());
    }

    #[tokio::test]
    async fn profile_not_found_means_not_owned() {
        let (base, handle) = spawn_single_response(
            "404 Not Found",
            r#"{"path":"/minecraft/profile","errorType":"NOT_FOUND","error":"NOT_FOUND","errorMessage":"Not found."}"#,
        );
        let mut client = test_client();
        client.profile_endpoint = base;

        let response = client.get_profile("game-token").await;
        let _ = handle.join();

        assert_eq!(response.status, RestStatus::Error);
        assert_eq!(response.provider_code, Some(MicrosoftErrorCode::NotOwned));
    }

    #[tokio::test]
    async fn xbl_success_parses_user_hash() {
        let (base, handle) = spawn_single_response(
            "200 OK",
            r#"{
                "IssueInstant": "2024-01-01T00:00:00.0000000Z",
                "NotAfter": "2024-01-02T00:00:00.0000000Z",
                "Token": "xbl-token",
                "DisplayClaims": { "xui": [ { "uhs": "userhash" } ] }
            }"#,
        );
        let mut client = test_client();
        client.xbl_endpoint = base;

        let response = client.xbl_authenticate("token").await;
        let _ = handle.join();

        assert_eq!(response.status, RestStatus::Success);
        let token = response.data.expect("token");
        assert_eq!(token.token, "xbl-token");
        assert_eq!(token.user_hash(), Some("userhash"));
    }

    #[test]
    fn identity_token_shape() {
        let body = GameAuthBody::new("hash", "xsts");
        assert_eq!(body.identity_token, "XBL3.0 x=hash;xsts");
    }
}
