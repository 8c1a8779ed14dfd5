use chrono::{DateTime, Utc};
use std::{path::Path, sync::Arc, time::Duration};
use tokio::task::JoinHandle;

use crate::{database::Repository, errors::Result, handlers::AppState, storage::LocalStorage};

/// Deletes generated audio whose retention window has passed.
#[derive(Clone)]
pub struct ExpirySweeper {
    repository: Arc<dyn Repository>,
    storage: LocalStorage,
}

impl ExpirySweeper {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.repository.clone(),
            storage: state.audio_storage.clone(),
        }
    }

    /// Removes every record with `expire_at <= now` and returns how many
    /// rows were deleted. File removal is best-effort; rows are deleted
    /// regardless. Safe to re-run after a partial sweep.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<u64> {
        let expired = self.repository.list_expired_audio(now).await?;
        if expired.is_empty() {
            return Ok(0);
        }

        let mut files_removed = 0;
        for audio in &expired {
            if self.storage.discard(Path::new(&audio.file_path)).await {
                files_removed += 1;
            }
        }

        let ids: Vec<i64> = expired.iter().map(|audio| audio.id).collect();
        let deleted = self.repository.delete_audio(&ids).await?;

        tracing::info!(deleted, files_removed, "Expired audio swept");
        Ok(deleted)
    }

    /// Runs `sweep` every `period` until the task is aborted.
    pub fn spawn(self, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                if let Err(e) = self.sweep(Utc::now()).await {
                    tracing::error!("Expiry sweep failed: {}", e);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{database::MemoryRepository, models::{AudioRecord, Usage}, services::generation::GenerationService, test_support::test_state};

    async fn backdate(repo: &MemoryRepository, audio: &AudioRecord, days: i64) {
        let mut record = audio.clone();
        record.created_at -= chrono::Duration::days(days);
        record.expire_at -= chrono::Duration::days(days);
        repo.put_audio(record).await;
    }

    #[tokio::test]
    async fn test_sweep_deletes_all_and_only_expired() {
        let repo = Arc::new(MemoryRepository::new());
        repo.put_usage(Usage::new(1, 100)).await;
        repo.put_usage(Usage::new(2, 100)).await;
        let (state, _dir) = test_state(repo.clone());
        let generation = GenerationService::new(&state);

        let old_a = generation.generate(1, "old").await.unwrap();
        let old_b = generation.generate(2, "older").await.unwrap();
        let fresh = generation.generate(1, "fresh").await.unwrap();
        backdate(&repo, &old_a, 8).await;
        backdate(&repo, &old_b, 30).await;

        let sweeper = ExpirySweeper::new(&state);
        assert_eq!(sweeper.sweep(Utc::now()).await.unwrap(), 2);

        assert!(repo.find_audio(old_a.id).await.unwrap().is_none());
        assert!(repo.find_audio(old_b.id).await.unwrap().is_none());
        assert!(!Path::new(&old_a.file_path).exists());
        assert!(repo.find_audio(fresh.id).await.unwrap().is_some());
        assert!(Path::new(&fresh.file_path).exists());

        // Second pass finds nothing left to do
        assert_eq!(sweeper.sweep(Utc::now()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sweep_boundary_is_inclusive() {
        let repo = Arc::new(MemoryRepository::new());
        repo.put_usage(Usage::new(1, 100)).await;
        let (state, _dir) = test_state(repo.clone());

        let audio = GenerationService::new(&state).generate(1, "edge").await.unwrap();
        let sweeper = ExpirySweeper::new(&state);

        assert_eq!(sweeper.sweep(audio.expire_at - chrono::Duration::seconds(1)).await.unwrap(), 0);
        assert_eq!(sweeper.sweep(audio.expire_at).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_does_not_block_row_deletion() {
        let repo = Arc::new(MemoryRepository::new());
        repo.put_usage(Usage::new(1, 100)).await;
        let (state, _dir) = test_state(repo.clone());

        let audio = GenerationService::new(&state).generate(1, "gone").await.unwrap();
        std::fs::remove_file(&audio.file_path).unwrap();

        let sweeper = ExpirySweeper::new(&state);
        assert_eq!(sweeper.sweep(audio.expire_at).await.unwrap(), 1);
        assert!(repo.find_audio(audio.id).await.unwrap().is_none());
    }
}
