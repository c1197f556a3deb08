//! Thin wrapper around the OS keyring for the signed-in session.

use crate::error::AuthError;

const SERVICE: &str = "calmroom";
const ACCESS_TOKEN_KEY: &str = "access_token";

fn entry(key: &str) -> Result<keyring::Entry, AuthError> {
    Ok(keyring::Entry::new(SERVICE, key)?)
}

pub fn load_access_token() -> Result<Option<String>, AuthError> {
    match entry(ACCESS_TOKEN_KEY)?.get_password() {
        Ok(token) => Ok(Some(token)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn store_access_token(token: &str) -> Result<(), AuthError> {
    entry(ACCESS_TOKEN_KEY)?.set_password(token)?;
    Ok(())
}

pub fn clear() -> Result<(), AuthError> {
    match entry(ACCESS_TOKEN_KEY)?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
