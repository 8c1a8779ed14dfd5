use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::errors::{AppError, Result};
use crate::models::{AudioRecord, ClonedVoice, NewAudioRecord, NewClonedVoice, Usage, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

/// Persistence seam for users, ledgers, audio records and cloned voices.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn ping(&self) -> Result<()>;

    async fn find_user(&self, user_id: i64) -> Result<Option<User>>;

    async fn find_usage(&self, user_id: i64) -> Result<Option<Usage>>;

    /// Charges `record.characters_used` against the owner's ledger and
    /// inserts the record, atomically. Returns `None` without changing
    /// anything when there is no ledger or the balance is too small.
    async fn record_generation(&self, record: NewAudioRecord) -> Result<Option<AudioRecord>>;

    async fn find_audio(&self, audio_id: i64) -> Result<Option<AudioRecord>>;

    /// Newest first.
    async fn list_audio_by_user(&self, user_id: i64) -> Result<Vec<AudioRecord>>;

    async fn list_expired_audio(&self, now: DateTime<Utc>) -> Result<Vec<AudioRecord>>;

    /// Deletes the given rows and returns how many existed.
    async fn delete_audio(&self, audio_ids: &[i64]) -> Result<u64>;

    async fn create_voice(&self, voice: NewClonedVoice) -> Result<ClonedVoice>;

    async fn find_voice(&self, voice_id: i64) -> Result<Option<ClonedVoice>>;

    /// Voices owned by `user_id` whose name contains `search`, ignoring
    /// case. An empty search matches everything.
    async fn search_voices(&self, user_id: i64, search: &str) -> Result<Vec<ClonedVoice>>;

    async fn delete_voice(&self, voice_id: i64) -> Result<bool>;
}

/// Picks a backend from the database URL: `memory://` for the in-process
/// store, `postgres://` or `postgresql://` for Postgres (migrated on connect).
pub async fn create_repository(database_url: &str) -> Result<Arc<dyn Repository>> {
    if database_url.starts_with("memory://") {
        tracing::warn!("Using in-memory repository; data will not survive a restart");
        return Ok(Arc::new(MemoryRepository::new()));
    }

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        let repository = PgRepository::new(database_url).await?;
        repository.migrate().await?;
        return Ok(Arc::new(repository));
    }

    Err(AppError::Internal(anyhow::anyhow!(
        "Unsupported database URL scheme: {}",
        database_url.split("://").next().unwrap_or_default()
    )))
}
