//! Admin access commands.
//!
//! # Usage
//!
//! ```bash
//! sp-cli admin grant -e jean@example.com
//! echo 'correct horse battery staple' | sp-cli admin hash-password
//! ```
//!
//! # Environment Variables
//!
//! - `SITE_DATABASE_URL` - `PostgreSQL` connection string for grant/revoke

use tokio::io::{AsyncBufReadExt, BufReader};

use solar_portal_site::services::auth;
use solar_portal_site::services::users::UserDirectory;
use solar_portal_site::storage::Datastore;

use super::{CommandError, connect};

/// Grant or revoke the admin flag on an existing account.
///
/// # Errors
///
/// Returns `CommandError::UnknownUser` if no account has this email.
pub async fn set_admin(email: &str, is_admin: bool) -> Result<(), CommandError> {
    let store = Datastore::postgres(connect().await?);

    let found = UserDirectory::new(&store).set_admin(email, is_admin).await?;
    if !found {
        return Err(CommandError::UnknownUser(email.to_owned()));
    }

    if is_admin {
        tracing::info!(email, "Admin access granted");
    } else {
        tracing::info!(email, "Admin access revoked");
    }
    Ok(())
}

/// Read a password from the first line of stdin and print its Argon2 hash.
///
/// # Errors
///
/// Returns `CommandError::InvalidInput` for an empty line or a hashing failure.
#[allow(clippy::print_stdout)]
pub async fn hash_password() -> Result<(), CommandError> {
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .map_err(|e| CommandError::InvalidInput(e.to_string()))?;

    let hash = hash_line(&line)?;

    println!("Set this value as SITE_ADMIN_PASSWORD_HASH:");
    println!("{hash}");
    Ok(())
}

/// Hash one stdin line, without its line ending.
fn hash_line(line: &str) -> Result<String, CommandError> {
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(CommandError::InvalidInput("empty password".to_owned()));
    }

    auth::hash_password(password).map_err(|e| CommandError::InvalidInput(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_line_strips_line_ending() {
        let hash = hash_line("Ouanaminthe-2026\r\n").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(auth::verify_password("Ouanaminthe-2026", &hash).is_ok());
    }

    #[test]
    fn test_hash_line_rejects_empty_password() {
        assert!(matches!(
            hash_line("\n"),
            Err(CommandError::InvalidInput(_))
        ));
    }
}
