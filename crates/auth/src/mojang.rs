// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

//! The legacy Yggdrasil username/password scheme and service status board.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use shared::HTTP_CLIENT;

use crate::RestResponse;

const AUTH_BASE: &str = "https://authserver.mojang.com";
const STATUS_ENDPOINT: &str = "https://status.mojang.com/summary.json";

/// Classified Yggdrasil failures. The `is_internal_error` codes mean the
/// caller built a malformed request, report those as bugs rather than
/// credential problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MojangErrorCode {
    MethodNotAllowed,
    NotFound,
    UserMigrated,
    InvalidCredentials,
    Ratelimit,
    InvalidToken,
    AccessTokenHasProfile,
    CredentialsMissing,
    InvalidSaltVersion,
    UnsupportedMediaType,
    Gone,
    Unreachable,
    Unknown,
}

impl MojangErrorCode {
    pub fn is_internal_error(&self) -> bool {
        matches!(
            self,
            Self::MethodNotAllowed
                | Self::NotFound
                | Self::AccessTokenHasProfile
                | Self::CredentialsMissing
                | Self::InvalidSaltVersion
                | Self::UnsupportedMediaType
        )
    }

    /// Translates the provider's error body into a code.
    pub fn from_error_body(body: &MojangErrorBody) -> Self {
        let error = body.error.as_deref().unwrap_or_default();
        let message = body.error_message.as_deref().unwrap_or_default();
        match error {
            "Method Not Allowed" => Self::MethodNotAllowed,
            "Not Found" => Self::NotFound,
            "Unsupported Media Type" => Self::UnsupportedMediaType,
            "ForbiddenOperationException" => {
                if body.cause.as_deref() == Some("UserMigratedException") {
                    return Self::UserMigrated;
                }
                match message {
                    "Invalid credentials. Invalid username or password." => {
                        Self::InvalidCredentials
                    }
                    "Invalid credentials." => Self::Ratelimit,
                    "Invalid token." => Self::InvalidToken,
                    "Forbidden" => Self::CredentialsMissing,
                    _ => Self::Unknown,
                }
            }
            "IllegalArgumentException" => match message {
                "Access token already has a profile assigned." => Self::AccessTokenHasProfile,
                "Invalid salt version" => Self::InvalidSaltVersion,
                _ => Self::Unknown,
            },
            "ResourceException" | "GoneException" => Self::Gone,
            _ => Self::Unknown,
        }
    }
}

/// `{error, errorMessage, cause?}` as the auth server reports failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MojangErrorBody {
    pub error: Option<String>,
    pub error_message: Option<String>,
    pub cause: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProfile {
    pub id: String,
    pub name: String,
}

/// A full Yggdrasil session as returned by authenticate and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub client_token: String,
    pub selected_profile: SessionProfile,
    pub user: Option<Value>,
}

pub type MojangResponse<T> = RestResponse<T, MojangErrorCode>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Green,
    Yellow,
    Red,
    Grey,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub slug: String,
    pub name: String,
    pub status: StatusColor,
}

/// A freshly constructed status board, everything grey until a poll says
/// otherwise.
fn default_statuses() -> Vec<ServiceStatus> {
    let service = |slug: &str, name: &str| ServiceStatus {
        slug: slug.to_string(),
        name: name.to_string(),
        status: StatusColor::Grey,
    };
    vec![
        service("mojang-multiplayer-session-service", "Multiplayer Session Service"),
        service("microsoft-o-auth-server", "Microsoft OAuth Server"),
        service("xbox-live-auth-server", "Xbox Live Auth Server"),
        service("xbox-live-gatekeeper", "Xbox Live Gatekeeper"),
        service("microsoft-minecraft-api", "Minecraft API"),
        service("microsoft-minecraft-profile", "Minecraft Profile"),
    ]
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StatusSummaryEntry {
    pub(crate) slug: String,
    pub(crate) status: String,
}

pub(crate) fn project_statuses(entries: &[StatusSummaryEntry]) -> Vec<ServiceStatus> {
    let mut statuses = default_statuses();
    for entry in entries {
        let Some(service) = statuses.iter_mut().find(|service| service.slug == entry.slug) else {
            continue;
        };
        service.status = match entry.status.as_str() {
            "up" => StatusColor::Green,
            "down" => StatusColor::Red,
            _ => StatusColor::Grey,
        };
    }
    statuses
}

/// Client for the legacy authentication server.
pub struct MojangClient {
    pub auth_base: String,
    pub status_endpoint: String,
}

impl Default for MojangClient {
    fn default() -> Self {
        Self {
            auth_base: AUTH_BASE.to_string(),
            status_endpoint: STATUS_ENDPOINT.to_string(),
        }
    }
}

impl MojangClient {
    fn transport_failure<T>(error: reqwest::Error) -> MojangResponse<T> {
        // reqwest folds DNS resolution failures into its connect class
        let code = if error.is_connect() {
            MojangErrorCode::Unreachable
        } else {
            MojangErrorCode::Unknown
        };
        RestResponse::failure(error.to_string(), Some(code))
    }

    async fn classify_response<T>(response: reqwest::Response) -> MojangResponse<T> {
        let status = response.status();
        let body: MojangErrorBody = response.json().await.unwrap_or_default();
        let code = MojangErrorCode::from_error_body(&body);
        warn!("Yggdrasil request failed with HTTP {status}: {code:?}");
        RestResponse::failure(
            body.error_message
                .unwrap_or_else(|| format!("HTTP {status}")),
            Some(code),
        )
    }

    /// `POST /authenticate` with the vanilla agent.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        client_token: Option<&str>,
    ) -> MojangResponse<Session> {
        let mut body = json!({
            "agent": { "name": "Minecraft", "version": 1 },
            "username": username,
            "password": password,
            "requestUser": true,
        });
        if let Some(client_token) = client_token {
            body["clientToken"] = json!(client_token);
        }
        let result = HTTP_CLIENT
            .post(format!("{}/authenticate", self.auth_base))
            .json(&body)
            .send()
            .await;
        let response = match result {
            Ok(response) => response,
            Err(error) => return Self::transport_failure(error),
        };
        if !response.status().is_success() {
            return Self::classify_response(response).await;
        }
        match response.json::<Session>().await {
            Ok(session) => {
                info!("Authenticated {}", session.selected_profile.name);
                RestResponse::success(session)
            }
            Err(error) => Self::transport_failure(error),
        }
    }

    /// `POST /validate`. A 403 is the semantic "token is stale" answer, not
    /// a failure.
    pub async fn validate(
        &self,
        access_token: &str,
        client_token: Option<&str>,
    ) -> MojangResponse<bool> {
        let mut body = json!({ "accessToken": access_token });
        if let Some(client_token) = client_token {
            body["clientToken"] = json!(client_token);
        }
        let result = HTTP_CLIENT
            .post(format!("{}/validate", self.auth_base))
            .json(&body)
            .send()
            .await;
        match result {
            Ok(response) if response.status().is_success() => RestResponse::success(true),
            Ok(response) if response.status().as_u16() == 403 => RestResponse::success(false),
            Ok(response) => Self::classify_response(response).await,
            Err(error) => Self::transport_failure(error),
        }
    }

    /// `POST /invalidate`, dropping the session server-side.
    pub async fn invalidate(
        &self,
        access_token: &str,
        client_token: Option<&str>,
    ) -> MojangResponse<bool> {
        let mut body = json!({ "accessToken": access_token });
        if let Some(client_token) = client_token {
            body["clientToken"] = json!(client_token);
        }
        let result = HTTP_CLIENT
            .post(format!("{}/invalidate", self.auth_base))
            .json(&body)
            .send()
            .await;
        match result {
            Ok(response) if response.status().is_success() => RestResponse::success(true),
            Ok(response) => Self::classify_response(response).await,
            Err(error) => Self::transport_failure(error),
        }
    }

    /// `POST /refresh`, trading a stale access token for a fresh session.
    pub async fn refresh(
        &self,
        access_token: &str,
        client_token: &str,
    ) -> MojangResponse<Session> {
        let body = json!({
            "accessToken": access_token,
            "clientToken": client_token,
            "requestUser": true,
        });
        let result = HTTP_CLIENT
            .post(format!("{}/refresh", self.auth_base))
            .json(&body)
            .send()
            .await;
        let response = match result {
            Ok(response) => response,
            Err(error) => return Self::transport_failure(error),
        };
        if !response.status().is_success() {
            return Self::classify_response(response).await;
        }
        match response.json::<Session>().await {
            Ok(session) => RestResponse::success(session),
            Err(error) => Self::transport_failure(error),
        }
    }

    /// Polls the status board and projects it onto the known services.
    pub async fn status(&self) -> MojangResponse<Vec<ServiceStatus>> {
        let result = HTTP_CLIENT.get(&self.status_endpoint).send().await;
        let entries: Result<Vec<StatusSummaryEntry>, String> = match result {
            Ok(response) if response.status().is_success() => {
                response.json().await.map_err(|error| error.to_string())
            }
            Ok(response) => Err(format!("HTTP {}", response.status())),
            Err(error) => Err(error.to_string()),
        };
        match entries {
            Ok(entries) => RestResponse::success(project_statuses(&entries)),
            Err(error) => {
                warn!("Status poll failed: {error}");
                RestResponse::failure_with_data(default_statuses(), error, None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RestStatus;
    use std::io::{Read as _, Write as _};
    use std::net::TcpListener;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[derive(Clone)]
    struct MockResponse {
        status_line: &'static str,
        body: &'static str,
    }

    fn spawn_mock_server(
        responses: Vec<MockResponse>,
    ) -> (String, Arc<AtomicUsize>, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server failed");
        let addr = listener.local_addr().expect("read local addr failed");
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = Arc::clone(&hits);
        let handle = thread::spawn(move || {
            for response in responses {
                let (mut stream, _) = listener.accept().expect("accept failed");
                hits_clone.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0_u8; 4096];
                let _ = stream.read(&mut buf);
                let body = response.body.as_bytes();
                let head = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    response.status_line,
                    body.len()
                );
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(body);
                let _ = stream.flush();
            }
        });
        (format!("http://{addr}"), hits, handle)
    }

    #[test]
    fn forbidden_operation_classification() {
        let body = |message: &str, cause: Option<&str>| MojangErrorBody {
            error: Some("ForbiddenOperationException".to_string()),
            error_message: Some(message.to_string()),
            cause: cause.map(str::to_string),
        };
        assert_eq!(
            MojangErrorCode::from_error_body(&body(
                "Invalid credentials. Invalid username or password.",
                None
            )),
            MojangErrorCode::InvalidCredentials
        );
        assert_eq!(
            MojangErrorCode::from_error_body(&body("Invalid credentials.", None)),
            MojangErrorCode::Ratelimit
        );
        assert_eq!(
            MojangErrorCode::from_error_body(&body("Invalid token.", None)),
            MojangErrorCode::InvalidToken
        );
        assert_eq!(
            MojangErrorCode::from_error_body(&body("Forbidden", None)),
            MojangErrorCode::CredentialsMissing
        );
        assert_eq!(
            MojangErrorCode::from_error_body(&body("anything", Some("UserMigratedException"))),
            MojangErrorCode::UserMigrated
        );
    }

    #[test]
    fn illegal_argument_and_gone_classification() {
        let body = MojangErrorBody {
            error: Some("IllegalArgumentException".to_string()),
            error_message: Some("Access token already has a profile assigned.".to_string()),
            cause: None,
        };
        assert_eq!(
            MojangErrorCode::from_error_body(&body),
            MojangErrorCode::AccessTokenHasProfile
        );
        let body = MojangErrorBody {
            error: Some("GoneException".to_string()),
            error_message: None,
            cause: None,
        };
        assert_eq!(MojangErrorCode::from_error_body(&body), MojangErrorCode::Gone);
    }

    #[test]
    fn internal_error_flags() {
        assert!(MojangErrorCode::MethodNotAllowed.is_internal_error());
        assert!(MojangErrorCode::CredentialsMissing.is_internal_error());
        assert!(MojangErrorCode::InvalidSaltVersion.is_internal_error());
        assert!(!MojangErrorCode::InvalidCredentials.is_internal_error());
        assert!(!MojangErrorCode::Ratelimit.is_internal_error());
        assert!(!MojangErrorCode::Unreachable.is_internal_error());
    }

    #[tokio::test]
    async fn validate_maps_204_and_403_to_success() {
        let responses = vec![
            MockResponse {
                status_line: "204 No Content",
                body: "",
            },
            MockResponse {
                status_line: "403 Forbidden",
                body: r#"{"error":"ForbiddenOperationException","errorMessage":"Invalid token."}"#,
            },
        ];
        let (base, hits, handle) = spawn_mock_server(responses);
        let client = MojangClient {
            auth_base: base,
            ..MojangClient::default()
        };

        let first = client.validate("abc", Some("client")).await;
        assert!(first.is_success());
        assert_eq!(first.data, Some(true));

        let second = client.validate("def", Some("client")).await;
        assert!(second.is_success());
        assert_eq!(second.data, Some(false));

        let _ = handle.join();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn authenticate_error_body_is_classified() {
        let responses = vec![MockResponse {
            status_line: "403 Forbidden",
            body: r#"{"error":"ForbiddenOperationException","errorMessage":"Invalid credentials. Invalid username or password."}"#,
        }];
        let (base, _hits, handle) = spawn_mock_server(responses);
        let client = MojangClient {
            auth_base: base,
            ..MojangClient::default()
        };

        let response = client.authenticate("user", "hunter2", None).await;
        let _ = handle.join();
        assert_eq!(response.status, RestStatus::Error);
        assert_eq!(
            response.provider_code,
            Some(MojangErrorCode::InvalidCredentials)
        );
        assert!(response.data.is_none());
    }

    #[tokio::test]
    async fn unreachable_server_yields_unreachable_code() {
        let client = MojangClient {
            // port 9 is discard, nothing listens there
            auth_base: "http://127.0.0.1:9".to_string(),
            ..MojangClient::default()
        };
        let response = client.validate("abc", None).await;
        assert_eq!(response.status, RestStatus::Error);
        assert_eq!(response.provider_code, Some(MojangErrorCode::Unreachable));
    }

    #[test]
    fn status_projection_is_fresh_each_call() {
        let entries = vec![
            StatusSummaryEntry {
                slug: "mojang-multiplayer-session-service".to_string(),
                status: "down".to_string(),
            },
            StatusSummaryEntry {
                slug: "microsoft-minecraft-api".to_string(),
                status: "up".to_string(),
            },
            StatusSummaryEntry {
                slug: "not-a-known-service".to_string(),
                status: "up".to_string(),
            },
        ];
        let projected = project_statuses(&entries);
        let by_slug = |slug: &str| {
            projected
                .iter()
                .find(|service| service.slug == slug)
                .unwrap()
                .status
        };
        assert_eq!(by_slug("mojang-multiplayer-session-service"), StatusColor::Red);
        assert_eq!(by_slug("microsoft-minecraft-api"), StatusColor::Green);
        assert_eq!(by_slug("xbox-live-auth-server"), StatusColor::Grey);

        // the template is pure data, a second projection starts grey again
        let untouched = project_statuses(&[]);
        assert!(untouched
            .iter()
            .all(|service| service.status == StatusColor::Grey));
    }
}
