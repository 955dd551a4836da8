//! Seed the formation catalogue.

use solar_portal_site::services::formations::FormationRepository;
use solar_portal_site::storage::Datastore;

use super::{CommandError, connect};

/// Seed the default formations.
///
/// Without `reset` the catalogue is only written when no record exists yet;
/// an existing catalogue is reported and left alone.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the write fails.
pub async fn formations(reset: bool) -> Result<(), CommandError> {
    let store = Datastore::postgres(connect().await?);
    let repository = FormationRepository::new(&store);

    let formations = if reset {
        tracing::warn!("Replacing the formation catalogue with the defaults");
        repository.reset_defaults().await?
    } else {
        repository.list().await?
    };

    for formation in &formations {
        tracing::info!(
            id = %formation.id,
            enrolled = formation.enrolled,
            capacity = formation.capacity,
            "{}",
            formation.title
        );
    }
    tracing::info!(count = formations.len(), "Formation catalogue ready");
    Ok(())
}
