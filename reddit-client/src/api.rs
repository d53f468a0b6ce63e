use crate::auth::{self, AuthToken};
use async_trait::async_trait;
use banter_core::{
    CandidateItem, CoreError, Platform, RedditApiError, RedditCredentials, SelectionConfig,
    SortMode,
};
use reqwest::{Client, Method, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

const REDDIT_API_BASE: &str = "https://oauth.reddit.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing {
    pub kind: String,
    pub data: RedditListingData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData {
    /// Children are parsed individually so one malformed entry never
    /// discards the whole batch.
    pub children: Vec<serde_json::Value>,
    pub after: Option<String>,
    pub before: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild {
    pub kind: String,
    pub data: RedditPostData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    pub author: String,
    pub subreddit: String,
    pub created_utc: f64,
    pub score: i32,
    pub num_comments: u32,
    pub stickied: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditUserData {
    pub id: String,
    pub name: String,
    pub link_karma: i32,
    pub comment_karma: i32,
}

impl RedditUserData {
    pub fn total_karma(&self) -> i32 {
        self.link_karma + self.comment_karma
    }
}

#[derive(Debug, Deserialize)]
struct CommentResponse {
    json: CommentResponseBody,
}

#[derive(Debug, Deserialize)]
struct CommentResponseBody {
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

/// Authenticated Reddit API client for a script app.
///
/// Holds the bearer token behind a lock and re-runs the password grant when
/// it nears expiry; callers never see token lifecycle.
#[derive(Debug)]
pub struct RedditApiClient {
    http_client: Client,
    credentials: RedditCredentials,
    token: RwLock<Option<AuthToken>>,
    identity: RwLock<Option<String>>,
}

impl RedditApiClient {
    pub fn new(credentials: RedditCredentials) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .user_agent(&credentials.user_agent)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(CoreError::Network)?;

        Ok(Self {
            http_client,
            credentials,
            token: RwLock::new(None),
            identity: RwLock::new(None),
        })
    }

    /// Run the password grant and verify it by fetching the acting account.
    /// Called once at startup; any failure here is fatal to the run.
    pub async fn authenticate(&self) -> Result<RedditUserData, CoreError> {
        info!("Connecting to Reddit API...");
        let token = auth::request_token(&self.http_client, &self.credentials).await?;
        *self.token.write().await = Some(token);

        let user = self.get_user_info().await?;
        info!(
            "Connected to Reddit as u/{} ({} karma)",
            user.name,
            user.total_karma()
        );
        *self.identity.write().await = Some(user.name.clone());
        Ok(user)
    }

    async fn access_token(&self) -> Result<String, CoreError> {
        {
            let token = self.token.read().await;
            if let Some(token) = token.as_ref() {
                if !token.is_expired() {
                    return Ok(token.access_token.clone());
                }
            }
        }

        debug!("Access token missing or expired, re-authenticating");
        let fresh = auth::request_token(&self.http_client, &self.credentials).await?;
        let access_token = fresh.access_token.clone();
        *self.token.write().await = Some(fresh);
        Ok(access_token)
    }

    async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        query_params: Option<&[(&str, &str)]>,
        form_params: Option<&[(&str, &str)]>,
    ) -> Result<Response, CoreError> {
        let url = format!("{}{}", REDDIT_API_BASE, endpoint);
        let access_token = self.access_token().await?;

        let mut request_builder = self
            .http_client
            .request(method.clone(), &url)
            .bearer_auth(access_token)
            .header("User-Agent", &self.credentials.user_agent);

        if let Some(params) = query_params {
            request_builder = request_builder.query(params);
        }
        if let Some(params) = form_params {
            request_builder = request_builder.form(params);
        }

        debug!("Reddit API request: {} {}", method, endpoint);
        let response = match request_builder.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Network error for {} {}: {}", method, endpoint, e);
                if e.is_timeout() {
                    return Err(CoreError::RedditApi(RedditApiError::RequestTimeout));
                }
                return Err(CoreError::Network(e));
            }
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        error!("Request failed with status {} for {}", status, endpoint);
        match status.as_u16() {
            401 => Err(CoreError::RedditApi(RedditApiError::InvalidToken)),
            403 => Err(CoreError::RedditApi(RedditApiError::Forbidden {
                resource: endpoint.to_string(),
            })),
            404 => Err(CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("resource not found: {endpoint}"),
            })),
            429 => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                warn!("Rate limited by Reddit, retry after {} seconds", retry_after);
                Err(CoreError::RedditApi(RedditApiError::RateLimitExceeded {
                    retry_after,
                }))
            }
            code if status.is_server_error() => {
                Err(CoreError::RedditApi(RedditApiError::ServerError {
                    status_code: code,
                }))
            }
            code => Err(CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("unexpected status {code} for {endpoint}"),
            })),
        }
    }

    pub async fn get_user_info(&self) -> Result<RedditUserData, CoreError> {
        let response = self
            .make_request(Method::GET, "/api/v1/me", None, None)
            .await?;

        let user_data: RedditUserData = response.json().await.map_err(|e| {
            error!("Failed to parse user data: {}", e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: "failed to parse user data".to_string(),
            })
        })?;

        debug!("Retrieved user info for: {}", user_data.name);
        Ok(user_data)
    }

    pub async fn get_subreddit_posts(
        &self,
        subreddit: &str,
        sort: SortMode,
        time_filter: &str,
        limit: u32,
    ) -> Result<Vec<CandidateItem>, CoreError> {
        let endpoint = format!("/r/{}/{}", subreddit, sort.as_str());
        let limit_str = limit.to_string();
        let mut params = vec![("limit", limit_str.as_str()), ("raw_json", "1")];
        if sort == SortMode::Top {
            params.push(("t", time_filter));
        }

        let response = self
            .make_request(Method::GET, &endpoint, Some(params.as_slice()), None)
            .await
            .map_err(|e| match e {
                // A 404 on a listing means the subreddit itself is gone.
                CoreError::RedditApi(RedditApiError::InvalidResponse { .. }) => {
                    CoreError::RedditApi(RedditApiError::SubredditNotFound {
                        subreddit: subreddit.to_string(),
                    })
                }
                other => other,
            })?;

        let listing: RedditListing = response.json().await.map_err(|e| {
            error!("Failed to parse listing for r/{}: {}", subreddit, e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("failed to parse posts for r/{subreddit}"),
            })
        })?;

        let mut items = Vec::with_capacity(listing.data.children.len());
        for child in listing.data.children {
            match serde_json::from_value::<RedditListingChild>(child) {
                Ok(child) => items.push(CandidateItem::from(child.data)),
                Err(e) => {
                    // One malformed entry must not discard the batch.
                    warn!("Skipping malformed listing entry in r/{}: {}", subreddit, e);
                }
            }
        }

        info!("Retrieved {} posts from r/{}", items.len(), subreddit);
        Ok(items)
    }

    pub async fn post_comment(&self, fullname: &str, text: &str) -> Result<(), CoreError> {
        let response = self
            .make_request(
                Method::POST,
                "/api/comment",
                None,
                Some(&[("api_type", "json"), ("thing_id", fullname), ("text", text)]),
            )
            .await?;

        // The comment endpoint reports failures like RATELIMIT inside a 200
        // body, so the body has to be inspected as well.
        let body: CommentResponse = response.json().await.map_err(|e| {
            error!("Failed to parse comment response: {}", e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: "failed to parse comment response".to_string(),
            })
        })?;

        if !body.json.errors.is_empty() {
            let details = serde_json::to_string(&body.json.errors)
                .unwrap_or_else(|_| "unknown".to_string());
            error!("Comment rejected for {}: {}", fullname, details);
            return Err(CoreError::RedditApi(RedditApiError::InvalidResponse {
                details,
            }));
        }

        debug!("Posted comment on {}", fullname);
        Ok(())
    }
}

#[async_trait]
impl Platform for RedditApiClient {
    async fn identity(&self) -> Result<String, CoreError> {
        if let Some(name) = self.identity.read().await.as_ref() {
            return Ok(name.clone());
        }
        let user = self.get_user_info().await?;
        *self.identity.write().await = Some(user.name.clone());
        Ok(user.name)
    }

    async fn candidates(
        &self,
        subreddit: &str,
        selection: &SelectionConfig,
        limit: u32,
    ) -> Result<Vec<CandidateItem>, CoreError> {
        self.get_subreddit_posts(subreddit, selection.sort_by, &selection.time_filter, limit)
            .await
    }

    async fn post_reply(&self, item: &CandidateItem, text: &str) -> Result<(), CoreError> {
        self.post_comment(&item.fullname(), text).await
    }
}

impl From<RedditPostData> for CandidateItem {
    fn from(post_data: RedditPostData) -> Self {
        Self {
            id: post_data.id,
            author: post_data.author,
            title: post_data.title,
            created_utc: post_data.created_utc as i64,
            score: post_data.score,
            num_comments: post_data.num_comments,
            stickied: post_data.stickied,
            subreddit: post_data.subreddit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_credentials() -> RedditCredentials {
        RedditCredentials {
            client_id: "test_client_id".to_string(),
            client_secret: "test_client_secret".to_string(),
            user_agent: "banter/0.1 by test_user".to_string(),
            username: "test_user".to_string(),
            password: "test_password".to_string(),
        }
    }

    #[test]
    fn test_client_creation() {
        let client = RedditApiClient::new(test_credentials());
        assert!(client.is_ok());
    }

    #[test]
    fn test_post_data_conversion() {
        let post_data = RedditPostData {
            id: "abc123".to_string(),
            title: "Test Post".to_string(),
            author: "test_user".to_string(),
            subreddit: "test".to_string(),
            created_utc: 1640995200.0,
            score: 42,
            num_comments: 5,
            stickied: false,
        };

        let item: CandidateItem = post_data.into();
        assert_eq!(item.id, "abc123");
        assert_eq!(item.fullname(), "t3_abc123");
        assert_eq!(item.created_utc, 1640995200);
        assert_eq!(item.score, 42);
        assert!(!item.stickied);
    }

    #[test]
    fn test_listing_tolerates_malformed_children() {
        let raw = r#"{
            "kind": "Listing",
            "data": {
                "children": [
                    {"kind": "t3", "data": {"id": "ok1", "title": "t", "author": "a",
                     "subreddit": "test", "created_utc": 1.0, "score": 1,
                     "num_comments": 0, "stickied": false}},
                    {"kind": "t3", "data": {"id": "broken"}},
                    {"kind": "t3", "data": {"id": "ok2", "title": "t", "author": "a",
                     "subreddit": "test", "created_utc": 2.0, "score": 2,
                     "num_comments": 1, "stickied": true}}
                ],
                "after": null,
                "before": null
            }
        }"#;

        let listing: RedditListing = serde_json::from_str(raw).unwrap();
        let parsed: Vec<CandidateItem> = listing
            .data
            .children
            .into_iter()
            .filter_map(|child| serde_json::from_value::<RedditListingChild>(child).ok())
            .map(|child| CandidateItem::from(child.data))
            .collect();

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].id, "ok1");
        assert_eq!(parsed[1].id, "ok2");
    }

    #[test]
    fn test_comment_response_parsing() {
        let ok: CommentResponse =
            serde_json::from_str(r#"{"json": {"errors": [], "data": {}}}"#).unwrap();
        assert!(ok.json.errors.is_empty());

        let rejected: CommentResponse = serde_json::from_str(
            r#"{"json": {"errors": [["RATELIMIT", "you are doing that too much", "ratelimit"]]}}"#,
        )
        .unwrap();
        assert_eq!(rejected.json.errors.len(), 1);
    }

    #[test]
    fn test_user_karma() {
        let user = RedditUserData {
            id: "u1".to_string(),
            name: "test_user".to_string(),
            link_karma: 10,
            comment_karma: 32,
        };
        assert_eq!(user.total_karma(), 42);
    }
}
