//! HTTP client wrapper for interacting with the Tigris API.

use crate::config::Config;
use crate::tigris::{
    operation::Operation,
    types::{BearerToken, RemoteResponse, SessionToken, TigrisError},
};
use crate::token::{AuthError, ClientSecret};
use reqwest::{Client, Method, Url, header};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

const AUTH_TOKEN_PATH: [&str; 3] = ["v1", "auth", "token"];

/// Lightweight HTTP client for Tigris operations.
///
/// Clone is cheap; the inner `reqwest::Client` shares its connection pool.
#[derive(Clone)]
pub struct TigrisClient {
    pub(crate) client: Client,
    pub(crate) base_url: Url,
    pub(crate) project: String,
}

impl TigrisClient {
    /// Build a client for `base_url` scoped to `project`, bounding every request by `timeout`.
    ///
    /// `base_url` may omit its scheme, in which case `https://` is assumed.
    pub fn new(base_url: &str, project: &str, timeout: Duration) -> Result<Self, TigrisError> {
        let client = Client::builder()
            .user_agent(concat!("tigris-relay/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        let base_url = normalize_base_url(base_url).map_err(TigrisError::InvalidUrl)?;
        tracing::debug!(url = %base_url, project, ?timeout, "Initialized Tigris HTTP client");

        Ok(Self {
            client,
            base_url,
            project: project.to_string(),
        })
    }

    /// Construct a client from the loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, TigrisError> {
        Self::new(
            &config.tigris_uri,
            &config.tigris_project,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Project every operation is scoped to.
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Exchange client credentials for a bearer token.
    pub async fn exchange_token(
        &self,
        client_id: &str,
        client_secret: &ClientSecret,
    ) -> Result<SessionToken, AuthError> {
        let response = self
            .request(Method::POST, &AUTH_TOKEN_PATH)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id),
                ("client_secret", client_secret.expose()),
            ])
            .send()
            .await
            .map_err(AuthError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(AuthError::Transport)?;
        if !status.is_success() {
            tracing::warn!(%status, "Token exchange rejected");
            return Err(AuthError::Rejected { status, body });
        }

        let payload: TokenResponse = serde_json::from_str(&body).map_err(|err| {
            tracing::warn!(error = %err, "Token exchange returned an unexpected body");
            AuthError::MalformedResponse(err.to_string())
        })?;

        Ok(SessionToken {
            token: BearerToken::new(payload.access_token),
            expires_in: payload.expires_in,
        })
    }

    /// Issue `operation` with `token` and return the remote response, whatever its status.
    pub async fn forward(
        &self,
        token: &BearerToken,
        operation: &Operation,
    ) -> Result<RemoteResponse, TigrisError> {
        let segments = operation.path_segments(&self.project);
        let mut request = self
            .request(operation.method(), &segments)
            .header(header::AUTHORIZATION, token.header_value());
        if let Some(body) = operation.body() {
            request = request.json(&body);
        }

        tracing::debug!(
            operation = operation.name(),
            target = operation.target(),
            method = %operation.method(),
            "Forwarding operation"
        );
        let response = request.send().await?;
        let remote = decode_response(response).await?;
        if !remote.status.is_success() {
            tracing::warn!(
                operation = operation.name(),
                status = %remote.status,
                "Tigris returned a non-success status"
            );
        }
        Ok(remote)
    }

    fn request(&self, method: Method, segments: &[&str]) -> reqwest::RequestBuilder {
        self.client.request(method, endpoint(&self.base_url, segments))
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

async fn decode_response(response: reqwest::Response) -> Result<RemoteResponse, TigrisError> {
    let status = response.status();
    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(RemoteResponse {
            status,
            body: Value::Null,
        });
    }

    match serde_json::from_slice(&bytes) {
        Ok(body) => Ok(RemoteResponse { status, body }),
        Err(_) => Err(TigrisError::UndecodableBody {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }),
    }
}

fn normalize_base_url(url: &str) -> Result<Url, String> {
    let url = url.trim();
    let with_scheme = if url.contains("://") {
        url.to_string()
    } else {
        format!("https://{url}")
    };
    let mut parsed = Url::parse(&with_scheme).map_err(|err| err.to_string())?;
    if parsed.cannot_be_a_base() {
        return Err(format!("{url} cannot be used as a base URL"));
    }
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed)
}

/// Append `segments` to `base`, percent-encoding each one as a single path segment.
fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    // Base URLs are checked by `normalize_base_url`, so this branch always runs.
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{
        Method::{DELETE, POST, PUT},
        MockServer,
    };
    use reqwest::StatusCode;
    use serde_json::json;

    fn client_for(server: &MockServer) -> TigrisClient {
        TigrisClient::new(&server.base_url(), "demo", Duration::from_secs(5)).expect("client")
    }

    #[test]
    fn bare_host_defaults_to_https() {
        let base = normalize_base_url("api.preview.tigrisdata.cloud").unwrap();
        assert_eq!(base.as_str(), "https://api.preview.tigrisdata.cloud/");
        assert_eq!(
            endpoint(&base, &AUTH_TOKEN_PATH).as_str(),
            "https://api.preview.tigrisdata.cloud/v1/auth/token"
        );
    }

    #[test]
    fn explicit_scheme_is_kept() {
        assert_eq!(
            normalize_base_url("http://127.0.0.1:8081/").unwrap().as_str(),
            "http://127.0.0.1:8081/"
        );
        let prefixed = normalize_base_url("http://127.0.0.1:8081/tigris/").unwrap();
        assert_eq!(
            endpoint(&prefixed, &AUTH_TOKEN_PATH).as_str(),
            "http://127.0.0.1:8081/tigris/v1/auth/token"
        );
        assert!(normalize_base_url("http://").is_err());
        assert!(normalize_base_url("mailto:ops@example.com").is_err());
    }

    #[test]
    fn reserved_characters_in_names_are_encoded() {
        let base = normalize_base_url("http://127.0.0.1:8081").unwrap();
        let operation = Operation::DropCollection {
            collection: "users/documents/delete?".into(),
        };
        let url = endpoint(&base, &operation.path_segments("demo"));
        assert_eq!(
            url.path(),
            "/v1/projects/demo/database/collections/users%2Fdocuments%2Fdelete%3F/drop"
        );
        assert_eq!(url.query(), None);

        let fragment = Operation::CreateBranch {
            branch: "main#frag".into(),
        };
        let url = endpoint(&base, &fragment.path_segments("demo"));
        assert_eq!(
            url.path(),
            "/v1/projects/demo/database/branches/main%23frag/create"
        );
        assert_eq!(url.fragment(), None);
    }

    #[tokio::test]
    async fn token_exchange_posts_client_credentials_form() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/auth/token")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body_contains("grant_type=client_credentials")
                    .body_contains("client_id=my-id")
                    .body_contains("client_secret=my-secret");
                then.status(200).json_body(json!({
                    "access_token": "tok-1",
                    "expires_in": 86400
                }));
            })
            .await;

        let session = client_for(&server)
            .exchange_token("my-id", &ClientSecret::new("my-secret"))
            .await
            .expect("token");

        mock.assert_async().await;
        assert_eq!(session.token.expose(), "tok-1");
        assert_eq!(session.expires_in, 86400);
    }

    #[tokio::test]
    async fn token_exchange_surfaces_rejection() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/auth/token");
                then.status(401)
                    .json_body(json!({ "error": { "message": "invalid credentials" } }));
            })
            .await;

        let err = client_for(&server)
            .exchange_token("bad", &ClientSecret::new("bad"))
            .await
            .expect_err("rejected");

        match err {
            AuthError::Rejected { status, body } => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert!(body.contains("invalid credentials"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn token_exchange_requires_expiry() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/auth/token");
                then.status(200).json_body(json!({ "access_token": "tok" }));
            })
            .await;

        let err = client_for(&server)
            .exchange_token("id", &ClientSecret::new("secret"))
            .await
            .expect_err("malformed");
        assert!(matches!(err, AuthError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn forward_attaches_bearer_and_json_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/v1/projects/demo/database/collections/users/documents/update")
                    .header("authorization", "Bearer tok-1")
                    .header("content-type", "application/json")
                    .json_body(json!({
                        "fields": { "$set": { "balance": 6045.7 } },
                        "filter": { "id": 1 }
                    }));
                then.status(200).json_body(json!({ "modified_count": 1 }));
            })
            .await;

        let operation = Operation::UpdateDocuments {
            collection: "users".into(),
            body: crate::tigris::payloads::update_body(1, "balance", json!(6045.7)),
        };
        let response = client_for(&server)
            .forward(&BearerToken::new("tok-1"), &operation)
            .await
            .expect("forwarded");

        mock.assert_async().await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, json!({ "modified_count": 1 }));
    }

    #[tokio::test]
    async fn forward_passes_remote_errors_through() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE)
                    .path("/v1/projects/demo/database/collections/ghosts/drop");
                then.status(404).json_body(json!({
                    "error": { "code": "NOT_FOUND", "message": "collection doesn't exist" }
                }));
            })
            .await;

        let operation = Operation::DropCollection {
            collection: "ghosts".into(),
        };
        let response = client_for(&server)
            .forward(&BearerToken::new("tok"), &operation)
            .await
            .expect("remote response");

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn forward_rejects_non_json_bodies() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/projects/demo/database/collections/users/describe");
                then.status(502).body("upstream unavailable");
            })
            .await;

        let operation = Operation::DescribeCollection {
            collection: "users".into(),
        };
        let err = client_for(&server)
            .forward(&BearerToken::new("tok"), &operation)
            .await
            .expect_err("undecodable");

        match err {
            TigrisError::UndecodableBody { status, body } => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert_eq!(body, "upstream unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_body_decodes_as_null() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/projects/demo/database/branches/staging/create");
                then.status(200);
            })
            .await;

        let operation = Operation::CreateBranch {
            branch: "staging".into(),
        };
        let response = client_for(&server)
            .forward(&BearerToken::new("tok"), &operation)
            .await
            .expect("remote response");

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, Value::Null);
    }

    #[tokio::test]
    async fn slow_remote_hits_the_request_timeout() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/projects/demo/database/collections/users/describe");
                then.status(200)
                    .delay(Duration::from_secs(3))
                    .json_body(json!({ "collection": "users" }));
            })
            .await;

        let client =
            TigrisClient::new(&server.base_url(), "demo", Duration::from_secs(1)).expect("client");
        let operation = Operation::DescribeCollection {
            collection: "users".into(),
        };
        let err = client
            .forward(&BearerToken::new("tok"), &operation)
            .await
            .expect_err("timed out");

        match err {
            TigrisError::Http(err) => assert!(err.is_timeout(), "not a timeout: {err:?}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
