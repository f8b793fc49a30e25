//! Reddit API access.
//!
//! [`RemoteApi`] is the seam between the application and the account
//! provider: one call opens a [`Session`], the other reads one page of the
//! account's saved listing through that session. [`RedditApi`] implements it
//! over HTTPS; tests substitute their own implementations.
use std::{fmt, time::Duration};

use async_trait::async_trait;
use log::{debug, trace, warn};
use reqwest::{header::USER_AGENT, Client, StatusCode};
use serde::Deserialize;

use crate::{AuthError, Credentials, RawItem, Result, SavedError};

/// Public site root; permalinks are relative to it.
pub const REDDIT_BASE_URL: &str = "https://www.reddit.com";

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const OAUTH_API_URL: &str = "https://oauth.reddit.com";

/// An authenticated handle on the remote account.
#[derive(Clone)]
pub struct Session {
    access_token: String,
    username: String,
    user_agent: String,
}

impl Session {
    pub fn new(
        access_token: impl Into<String>,
        username: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            username: username.into(),
            user_agent: user_agent.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

/// One page of the saved-items listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedPage {
    /// Items in the order the listing returned them
    pub items: Vec<RawItem>,
    /// Cursor for the next page, `None` on the last one
    pub after: Option<String>,
}

/// The remote account provider.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Opens a session for the given account.
    async fn authenticate(&self, credentials: &Credentials)
        -> std::result::Result<Session, AuthError>;

    /// Reads up to `limit` saved items following the `after` cursor.
    async fn saved_page(
        &self,
        session: &Session,
        limit: u32,
        after: Option<&str>,
    ) -> Result<SavedPage>;
}

/// [`RemoteApi`] backed by the public Reddit OAuth endpoints.
pub struct RedditApi {
    client: Client,
    token_url: String,
    api_url: String,
}

impl RedditApi {
    /// Creates a client whose requests give up after `request_timeout`.
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            token_url: TOKEN_URL.to_string(),
            api_url: OAUTH_API_URL.to_string(),
        })
    }
}

#[async_trait]
impl RemoteApi for RedditApi {
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> std::result::Result<Session, AuthError> {
        debug!("Requesting access token for {}", credentials.username);

        let params = [
            ("grant_type", "password"),
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .header(USER_AGENT, &credentials.user_agent)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&params)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(classify_transport_error)?;

        parse_token_response(status, &body, credentials)
    }

    async fn saved_page(
        &self,
        session: &Session,
        limit: u32,
        after: Option<&str>,
    ) -> Result<SavedPage> {
        let url = format!("{}/user/{}/saved", self.api_url, session.username());
        let limit = limit.to_string();
        let mut query = vec![("limit", limit.as_str()), ("raw_json", "1")];
        if let Some(cursor) = after {
            query.push(("after", cursor));
        }

        trace!("GET {} {:?}", url, query);
        let response = self
            .client
            .get(&url)
            .header(USER_AGENT, session.user_agent())
            .bearer_auth(session.access_token())
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Saved listing request failed with HTTP {}", status);
            return Err(SavedError::FetchFailed {
                message: format!("listing request returned HTTP {}", status),
            });
        }

        let body = response.text().await?;
        parse_listing(&body)
    }
}

fn classify_transport_error(e: reqwest::Error) -> AuthError {
    if e.is_builder() {
        AuthError::Unexpected {
            message: e.to_string(),
        }
    } else {
        AuthError::Transient {
            message: e.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<serde_json::Value>,
}

/// Turns the token endpoint's answer into a session or a classified error.
pub fn parse_token_response(
    status: StatusCode,
    body: &str,
    credentials: &Credentials,
) -> std::result::Result<Session, AuthError> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(AuthError::InvalidCredentials {
            message: "client id or secret rejected".to_string(),
        });
    }
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        return Err(AuthError::Transient {
            message: format!("token endpoint returned HTTP {}", status),
        });
    }
    // a 400 still carries a JSON `error` worth classifying
    if !status.is_success() && status != StatusCode::BAD_REQUEST {
        return Err(AuthError::Unexpected {
            message: format!("token endpoint returned HTTP {}: {}", status, snippet(body)),
        });
    }

    let token: TokenResponse =
        serde_json::from_str(body).map_err(|e| AuthError::Unexpected {
            message: format!("unreadable token response: {}", e),
        })?;

    match (token.access_token, token.error) {
        (Some(access_token), None) => Ok(Session::new(
            access_token,
            credentials.username.clone(),
            credentials.user_agent.clone(),
        )),
        (_, Some(error)) if error.as_str() == Some("invalid_grant") => {
            Err(AuthError::InvalidCredentials {
                message: "wrong username or password".to_string(),
            })
        }
        (_, Some(error)) => Err(AuthError::Unexpected {
            message: format!("token endpoint reported {}", error),
        }),
        (None, None) => Err(AuthError::Unexpected {
            message: format!("no access token in response: {}", snippet(body)),
        }),
    }
}

fn snippet(body: &str) -> String {
    body.chars().take(100).collect()
}

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    after: Option<String>,
    #[serde(default)]
    children: Vec<Thing>,
}

#[derive(Deserialize)]
struct Thing {
    data: ThingData,
}

#[derive(Deserialize)]
struct ThingData {
    title: Option<String>,
    link_title: Option<String>,
    permalink: String,
    url: Option<String>,
    link_url: Option<String>,
}

/// Parses one saved-listing page.
///
/// Saved comments have no title or url of their own; they borrow those of
/// the post they were written on. Items without any url link to their own
/// permalink.
pub fn parse_listing(body: &str) -> Result<SavedPage> {
    let listing: Listing = serde_json::from_str(body).map_err(|e| SavedError::FetchFailed {
        message: format!("unreadable listing: {}", e),
    })?;

    let items = listing
        .data
        .children
        .into_iter()
        .map(|thing| {
            let data = thing.data;
            let url = data
                .url
                .or(data.link_url)
                .unwrap_or_else(|| format!("{}{}", REDDIT_BASE_URL, data.permalink));
            RawItem {
                title: data.title.or(data.link_title).unwrap_or_default(),
                permalink: data.permalink,
                url,
            }
        })
        .collect();

    Ok(SavedPage {
        items,
        after: listing.data.after,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials {
            user_agent: "test-agent".to_string(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            username: "someone".to_string(),
            password: "pw".to_string(),
        }
    }

    #[test]
    fn token_response_opens_session() {
        let body = r#"{"access_token": "tok", "token_type": "bearer", "expires_in": 3600}"#;
        let session = parse_token_response(StatusCode::OK, body, &credentials()).unwrap();

        assert_eq!(session.access_token(), "tok");
        assert_eq!(session.username(), "someone");
        assert_eq!(session.user_agent(), "test-agent");
    }

    #[test]
    fn invalid_grant_means_bad_password() {
        let err = parse_token_response(StatusCode::OK, r#"{"error": "invalid_grant"}"#, &credentials())
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials { .. }));
    }

    #[test]
    fn unauthorized_means_bad_client_credentials() {
        let err = parse_token_response(StatusCode::UNAUTHORIZED, "", &credentials()).unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials { .. }));
    }

    #[test]
    fn server_errors_are_transient() {
        for status in [StatusCode::BAD_GATEWAY, StatusCode::TOO_MANY_REQUESTS] {
            let err = parse_token_response(status, "busy", &credentials()).unwrap_err();
            assert!(err.is_retryable(), "{status} should be retryable");
        }
    }

    #[test]
    fn odd_answers_are_unexpected() {
        let err = parse_token_response(StatusCode::OK, "<html>", &credentials()).unwrap_err();
        assert!(matches!(err, AuthError::Unexpected { .. }));

        let err = parse_token_response(StatusCode::OK, r#"{"error": 500}"#, &credentials())
            .unwrap_err();
        assert!(matches!(err, AuthError::Unexpected { .. }));

        let err = parse_token_response(StatusCode::OK, "{}", &credentials()).unwrap_err();
        assert!(matches!(err, AuthError::Unexpected { .. }));
    }

    #[test]
    fn session_debug_hides_token() {
        let session = Session::new("very-secret", "me", "ua");
        assert!(!format!("{:?}", session).contains("very-secret"));
    }

    #[test]
    fn parse_listing_reads_posts_and_comments_in_order() {
        let body = r#"{
          "kind": "Listing",
          "data": {
            "after": "t3_next",
            "children": [
              { "kind": "t3", "data": {
                  "title": "Cats",
                  "permalink": "/r/aww/comments/1/cats/",
                  "url": "https://i.example.com/cat.jpg" } },
              { "kind": "t1", "data": {
                  "link_title": "Rust 2.0?",
                  "permalink": "/r/rust/comments/2/rust_20/c1/",
                  "link_url": "https://blog.rust-lang.org/" } },
              { "kind": "t3", "data": {
                  "title": "Self post",
                  "permalink": "/r/linux/comments/3/self_post/" } }
            ]
          }
        }"#;

        let page = parse_listing(body).unwrap();

        assert_eq!(page.after.as_deref(), Some("t3_next"));
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.items[0].title, "Cats");
        assert_eq!(page.items[0].url, "https://i.example.com/cat.jpg");
        assert_eq!(page.items[1].title, "Rust 2.0?");
        assert_eq!(page.items[1].url, "https://blog.rust-lang.org/");
        assert_eq!(
            page.items[2].url,
            "https://www.reddit.com/r/linux/comments/3/self_post/"
        );
    }

    #[test]
    fn parse_listing_last_page_has_no_cursor() {
        let page = parse_listing(r#"{"data": {"after": null, "children": []}}"#).unwrap();
        assert!(page.after.is_none());
        assert!(page.items.is_empty());
    }

    #[test]
    fn parse_listing_rejects_garbage() {
        let err = parse_listing("not json").unwrap_err();
        assert!(matches!(err, SavedError::FetchFailed { .. }));
    }
}
