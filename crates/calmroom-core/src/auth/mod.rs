//! Current-user identity and sign-out against the hosted auth provider.
//!
//! Identity is never global: callers resolve a [`UserContext`] once and
//! pass it into every operation that needs to know who the user is.

pub mod credentials;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::BackendConfig;
use crate::error::AuthError;

/// Who is signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl UserIdentity {
    /// First word of the display name, if there is one.
    pub fn first_name(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .and_then(|name| name.split_whitespace().next())
    }
}

/// Identity plus the access token that proves it.
#[derive(Clone)]
pub struct UserContext {
    pub identity: UserIdentity,
    access_token: String,
}

impl UserContext {
    pub fn new(identity: UserIdentity, access_token: impl Into<String>) -> Self {
        Self {
            identity,
            access_token: access_token.into(),
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.identity.id
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl std::fmt::Debug for UserContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserContext")
            .field("identity", &self.identity)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
struct UserResponse {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

#[derive(Deserialize, Default)]
struct UserMetadata {
    #[serde(default)]
    full_name: Option<String>,
}

impl From<UserResponse> for UserIdentity {
    fn from(resp: UserResponse) -> Self {
        Self {
            id: resp.id,
            email: resp.email,
            display_name: resp
                .user_metadata
                .full_name
                .filter(|name| !name.trim().is_empty()),
        }
    }
}

/// Client for the auth provider's user endpoints.
pub struct AuthClient {
    http_client: Client,
    backend: BackendConfig,
}

impl AuthClient {
    pub fn new(backend: BackendConfig) -> Self {
        Self {
            http_client: Client::new(),
            backend,
        }
    }

    /// Resolve the user an access token belongs to.
    pub async fn current_user(&self, access_token: &str) -> Result<UserIdentity, AuthError> {
        let resp = self
            .http_client
            .get(self.backend.auth_url("user"))
            .header("apikey", &self.backend.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        match resp.status() {
            s if s.is_success() => Ok(resp.json::<UserResponse>().await?.into()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AuthError::NotSignedIn),
            s => Err(AuthError::Status { status: s.as_u16() }),
        }
    }

    /// Build a [`UserContext`] from a stored token.
    pub async fn context(&self, access_token: &str) -> Result<UserContext, AuthError> {
        let identity = self.current_user(access_token).await?;
        Ok(UserContext::new(identity, access_token))
    }

    /// Revoke the session at the provider.
    pub async fn sign_out(&self, ctx: &UserContext) -> Result<(), AuthError> {
        let resp = self
            .http_client
            .post(self.backend.auth_url("logout"))
            .header("apikey", &self.backend.anon_key)
            .bearer_auth(ctx.access_token())
            .send()
            .await?;

        // An already-expired session counts as signed out.
        if resp.status().is_success() || resp.status() == StatusCode::UNAUTHORIZED {
            tracing::info!(user = %ctx.user_id(), "signed out");
            Ok(())
        } else {
            Err(AuthError::Status {
                status: resp.status().as_u16(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER_ID: &str = "3f2b8f4e-52a4-4f7a-9d8e-0c6f1f0a1b2c";

    fn identity(display_name: Option<&str>) -> UserIdentity {
        UserIdentity {
            id: USER_ID.parse().unwrap(),
            email: Some("sam@example.com".into()),
            display_name: display_name.map(String::from),
        }
    }

    #[test]
    fn first_name_takes_first_word() {
        assert_eq!(identity(Some("Sam Rivera")).first_name(), Some("Sam"));
        assert_eq!(identity(None).first_name(), None);
    }

    #[test]
    fn debug_redacts_token() {
        let ctx = UserContext::new(identity(None), "secret-token");
        assert!(!format!("{ctx:?}").contains("secret-token"));
    }

    #[tokio::test]
    async fn current_user_reads_metadata_name() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/auth/v1/user")
            .match_header("apikey", "anon")
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "id": USER_ID,
                    "email": "sam@example.com",
                    "user_metadata": { "full_name": "Sam Rivera" }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = AuthClient::new(BackendConfig::new(server.url(), "anon"));
        let ctx = client.context("tok").await.unwrap();
        assert_eq!(ctx.identity, identity(Some("Sam Rivera")));
        assert_eq!(ctx.access_token(), "tok");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn expired_token_is_not_signed_in() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/auth/v1/user")
            .with_status(401)
            .create_async()
            .await;

        let client = AuthClient::new(BackendConfig::new(server.url(), "anon"));
        assert!(matches!(
            client.current_user("old").await,
            Err(AuthError::NotSignedIn)
        ));
    }

    #[tokio::test]
    async fn sign_out_posts_logout() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/v1/logout")
            .match_header("authorization", "Bearer tok")
            .with_status(204)
            .create_async()
            .await;

        let client = AuthClient::new(BackendConfig::new(server.url(), "anon"));
        let ctx = UserContext::new(identity(None), "tok");
        client.sign_out(&ctx).await.unwrap();
        mock.assert_async().await;
    }
}
