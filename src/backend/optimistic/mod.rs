/**
 * Optimistic Update Protocol
 *
 * Applies a partial update to a versioned record without holding any lock
 * across the read and the write:
 *
 * 1. Read the record's current version (`Reading`)
 * 2. Missing record: fail with `NotFound`, no retry
 * 3. Conditional write against the version read (`Comparing`)
 * 4. Nothing matched (or the engine reported a write conflict): wait a
 *    jittered pause and start over, until the retry budget is spent
 *    (`Conflict` then `ConflictExhausted`)
 * 5. Write landed: return the record at `version + 1` (`Applied`)
 *
 * The loop makes one initial attempt plus at most `max_retries` retries.
 * Any storage error other than a retryable conflict ends the operation
 * immediately.
 */

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::backend::store::{StoreError, VersionedStore};
use crate::shared::config::{AppConfig, DEFAULT_MAX_JITTER, DEFAULT_MAX_RETRIES};

/// Pauses between attempts
pub mod backoff;

pub use backoff::{Backoff, JitterBackoff, NoBackoff};

/// Retry budget for the update loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt loses the race
    pub max_retries: u32,
    /// Ceiling of the random pause between attempts
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            max_jitter: DEFAULT_MAX_JITTER,
        }
    }
}

impl From<&AppConfig> for RetryPolicy {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            max_jitter: config.max_jitter,
        }
    }
}

/// Terminal outcomes of the update loop
#[derive(Debug, Error)]
pub enum UpdateError {
    /// No record with that id at the time of a version read
    #[error("Record not found")]
    NotFound,

    /// Every attempt lost the compare-and-swap race
    #[error("Failed to update due to concurrent modifications after {attempts} attempts")]
    ConflictExhausted { attempts: u32 },

    /// Non-retryable storage failure
    #[error(transparent)]
    Storage(StoreError),
}

/// Runs the optimistic update loop against any `VersionedStore`
#[derive(Clone)]
pub struct OptimisticUpdater {
    policy: RetryPolicy,
    backoff: Arc<dyn Backoff>,
}

impl std::fmt::Debug for OptimisticUpdater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimisticUpdater")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl OptimisticUpdater {
    pub fn new(policy: RetryPolicy, backoff: Arc<dyn Backoff>) -> Self {
        Self { policy, backoff }
    }

    /// Updater pausing a uniform random time up to `policy.max_jitter`
    pub fn with_jitter(policy: RetryPolicy) -> Self {
        Self::new(policy, Arc::new(JitterBackoff::new(policy.max_jitter)))
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Apply `changes` to the record `id`.
    ///
    /// # Errors
    ///
    /// - `UpdateError::NotFound` when a version read finds nothing
    /// - `UpdateError::ConflictExhausted` when the first attempt and all
    ///   `max_retries` retries lost the race
    /// - `UpdateError::Storage` for any non-retryable storage error
    pub async fn apply<S>(
        &self,
        store: &S,
        id: &S::Id,
        changes: &S::Changes,
    ) -> Result<S::Record, UpdateError>
    where
        S: VersionedStore + ?Sized,
    {
        let mut retries: u32 = 0;

        loop {
            let attempt = retries + 1;

            let expected = match store.read_version(id).await {
                Ok(Some(version)) => version,
                Ok(None) => {
                    tracing::debug!(%id, attempt, "Update target not found");
                    return Err(UpdateError::NotFound);
                }
                Err(err) => return Err(UpdateError::Storage(err)),
            };

            match store.update_if_version(id, expected, changes).await {
                Ok(Some(record)) => {
                    tracing::debug!(%id, attempt, version = expected + 1, "Update applied");
                    return Ok(record);
                }
                Ok(None) => {
                    tracing::warn!(%id, attempt, expected, "Version changed before write");
                }
                Err(err) if err.is_retryable() => {
                    tracing::warn!(%id, attempt, error = %err, "Storage reported a write conflict");
                }
                Err(err) => return Err(UpdateError::Storage(err)),
            }

            retries += 1;
            if retries > self.policy.max_retries {
                tracing::warn!(%id, attempts = attempt, "Giving up after repeated version conflicts");
                return Err(UpdateError::ConflictExhausted { attempts: attempt });
            }
            self.backoff.wait(retries).await;
        }
    }
}
