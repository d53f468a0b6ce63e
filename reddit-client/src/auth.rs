use banter_core::{CoreError, RedditApiError, RedditCredentials};
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, SystemTime};
use tracing::{debug, error, info};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Refresh the token this long before it actually expires.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Bearer token obtained through the script-app password grant.
#[derive(Debug, Clone)]
pub struct AuthToken {
    pub access_token: String,
    pub expires_at: SystemTime,
}

impl AuthToken {
    pub fn is_expired(&self) -> bool {
        SystemTime::now() + EXPIRY_MARGIN >= self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
}

/// Run the password grant and return a fresh token.
///
/// Script apps authenticate with HTTP basic auth (client id / secret) plus
/// the account's username and password in the form body. A grant rejection
/// comes back as `{"error": "..."}` with a 200 or 401 status, so both paths
/// are mapped to `AuthenticationFailed`.
pub async fn request_token(
    http_client: &Client,
    credentials: &RedditCredentials,
) -> Result<AuthToken, CoreError> {
    debug!("Requesting access token for u/{}", credentials.username);

    let response = http_client
        .post(TOKEN_URL)
        .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
        .header("User-Agent", &credentials.user_agent)
        .form(&[
            ("grant_type", "password"),
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ])
        .send()
        .await
        .map_err(|e| {
            error!("Token request failed: {}", e);
            if e.is_timeout() {
                CoreError::RedditApi(RedditApiError::RequestTimeout)
            } else {
                CoreError::Network(e)
            }
        })?;

    let status = response.status();
    if status.as_u16() == 401 {
        return Err(CoreError::RedditApi(RedditApiError::AuthenticationFailed {
            reason: "invalid client id or secret".to_string(),
        }));
    }
    if !status.is_success() {
        return Err(CoreError::RedditApi(RedditApiError::ServerError {
            status_code: status.as_u16(),
        }));
    }

    let token_response: TokenResponse = response.json().await.map_err(|e| {
        error!("Failed to parse token response: {}", e);
        CoreError::RedditApi(RedditApiError::InvalidResponse {
            details: "failed to parse token response".to_string(),
        })
    })?;

    if let Some(reason) = token_response.error {
        return Err(CoreError::RedditApi(RedditApiError::AuthenticationFailed {
            reason,
        }));
    }

    let access_token =
        token_response
            .access_token
            .ok_or(CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: "token response missing access_token".to_string(),
            }))?;
    let expires_in = token_response.expires_in.unwrap_or(3600);

    info!("Obtained access token, valid for {} seconds", expires_in);
    Ok(AuthToken {
        access_token,
        expires_at: SystemTime::now() + Duration::from_secs(expires_in),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_expiry() {
        let fresh = AuthToken {
            access_token: "token".to_string(),
            expires_at: SystemTime::now() + Duration::from_secs(3600),
        };
        assert!(!fresh.is_expired());

        let stale = AuthToken {
            access_token: "token".to_string(),
            expires_at: SystemTime::now() - Duration::from_secs(1),
        };
        assert!(stale.is_expired());

        // Inside the refresh margin counts as expired.
        let almost = AuthToken {
            access_token: "token".to_string(),
            expires_at: SystemTime::now() + Duration::from_secs(10),
        };
        assert!(almost.is_expired());
    }

    #[test]
    fn test_token_response_parsing() {
        let ok: TokenResponse =
            serde_json::from_str(r#"{"access_token":"abc","token_type":"bearer","expires_in":3600,"scope":"*"}"#)
                .unwrap();
        assert_eq!(ok.access_token.as_deref(), Some("abc"));
        assert_eq!(ok.expires_in, Some(3600));
        assert!(ok.error.is_none());

        let rejected: TokenResponse = serde_json::from_str(r#"{"error":"invalid_grant"}"#).unwrap();
        assert_eq!(rejected.error.as_deref(), Some("invalid_grant"));
        assert!(rejected.access_token.is_none());
    }
}
