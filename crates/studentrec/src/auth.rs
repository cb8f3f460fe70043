//! Sign-in.

use tracing::{debug, info};

use crate::console::Console;
use crate::error::Result;
use crate::record::Session;
use crate::storage::{CredentialRepository, CredentialStore};

/// Prompt for a username and masked password and look them up.
///
/// Returns `None` on an authentication failure; the caller decides whether
/// to try again. Retries are unlimited.
///
/// # Errors
///
/// Returns [`crate::Error::UnknownRole`] when the matching row's role has no
/// menu, and console or store errors as they occur.
pub fn login<C: Console>(console: &mut C, credentials: &CredentialStore) -> Result<Option<Session>> {
    console.say("\n----- SIGN IN -----")?;
    let username = console.read_word("Username: ")?;
    let password = console.read_masked("Password: ")?;

    if !credentials.exists() {
        let file = credentials
            .path()
            .file_name()
            .map_or_else(String::new, |name| name.to_string_lossy().into_owned());
        console.say(&format!("Error: {file} not found!"))?;
        return Ok(None);
    }

    let Some(credential) = credentials.find_by_credentials(&username, &password)? else {
        debug!("Rejected sign-in for '{}'", username);
        return Ok(None);
    };

    console.say(&format!("Logged in as {}!\n", credential.role))?;
    let session = Session::from_credential(credential)?;
    info!("{} signed in as {}", session.username, session.role);
    Ok(Some(session))
}
