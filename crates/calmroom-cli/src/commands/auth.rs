use calmroom_core::auth::credentials;
use calmroom_core::{AuthClient, Config, ValidationError};
use clap::Subcommand;

use super::{signed_in, CmdResult};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Store an access token and verify it
    Login {
        /// Access token issued by the auth provider (read from stdin if omitted)
        #[arg(long)]
        token: Option<String>,
    },
    /// Show who is signed in
    Whoami,
    /// Sign out and forget the stored token
    Logout,
}

pub async fn run(action: AuthAction) -> CmdResult {
    let config = Config::load()?;
    match action {
        AuthAction::Login { token } => {
            config.backend.ensure_configured()?;
            let token = match token {
                Some(token) => token,
                None => {
                    let mut line = String::new();
                    std::io::stdin().read_line(&mut line)?;
                    line.trim().to_string()
                }
            };
            if token.is_empty() {
                return Err(ValidationError::EmptyField { field: "token" }.into());
            }

            let ctx = AuthClient::new(config.backend.clone()).context(&token).await?;
            credentials::store_access_token(&token)?;
            println!("Signed in as {}", describe(&ctx.identity));
        }
        AuthAction::Whoami => {
            let ctx = signed_in(&config).await?;
            println!("{}", describe(&ctx.identity));
            println!("  id: {}", ctx.user_id());
        }
        AuthAction::Logout => {
            let remote = match signed_in(&config).await {
                Ok(ctx) => AuthClient::new(config.backend.clone())
                    .sign_out(&ctx)
                    .await
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            // The local token goes regardless of what the provider said.
            credentials::clear()?;
            if let Err(e) = remote {
                tracing::warn!(error = %e, "remote sign-out failed");
            }
            println!("Signed out");
        }
    }
    Ok(())
}

fn describe(identity: &calmroom_core::UserIdentity) -> String {
    match (&identity.display_name, &identity.email) {
        (Some(name), Some(email)) => format!("{name} <{email}>"),
        (Some(name), None) => name.clone(),
        (None, Some(email)) => email.clone(),
        (None, None) => identity.id.to_string(),
    }
}
