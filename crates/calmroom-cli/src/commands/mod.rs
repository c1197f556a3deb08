pub mod auth;
pub mod breathe;
pub mod chat;
pub mod config;
pub mod dashboard;
pub mod journal;
pub mod mood;

use calmroom_core::auth::credentials;
use calmroom_core::{AuthClient, AuthError, Config, UserContext};
use serde::Serialize;

pub type CmdResult = calmroom_core::error::Result<()>;

/// Resolve the signed-in user from the token in the OS keyring.
pub async fn signed_in(config: &Config) -> calmroom_core::error::Result<UserContext> {
    config.backend.ensure_configured()?;
    let token = credentials::load_access_token()?.ok_or(AuthError::NotSignedIn)?;
    let ctx = AuthClient::new(config.backend.clone()).context(&token).await?;
    Ok(ctx)
}

pub fn print_json<T: Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
