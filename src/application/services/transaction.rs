//! Unit of work helpers shared by the application services

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::application::ports::outbound::UnitOfWorkPort;

/// Commit on success or roll back on failure, but only if this caller opened
/// the transaction
pub(crate) async fn finish<T>(
    unit_of_work: &dyn UnitOfWorkPort,
    opened: bool,
    result: Result<T>,
) -> Result<T> {
    if !opened {
        if unit_of_work.in_transaction().await {
            debug!("Leaving commit to the enclosing unit of work");
        }
        return result;
    }

    match result {
        Ok(value) => {
            unit_of_work
                .commit()
                .await
                .context("Failed to commit unit of work")?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = unit_of_work.rollback().await {
                warn!(error = %rollback_err, "Rollback failed after error: {}", err);
            }
            Err(err)
        }
    }
}
