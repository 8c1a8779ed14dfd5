use chrono::{Duration, Utc};

use crate::{
    database::Repository,
    errors::{AppError, Result},
    handlers::AppState,
    models::{AudioRecord, NewAudioRecord},
    services::synthesizer::Synthesizer,
    storage::LocalStorage,
    utils::file::generated_audio_filename,
};

pub struct GenerationService<'a> {
    repository: &'a dyn Repository,
    storage: &'a LocalStorage,
    synthesizer: &'a dyn Synthesizer,
    retention: Duration,
}

impl<'a> GenerationService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self {
            repository: state.repository.as_ref(),
            storage: &state.audio_storage,
            synthesizer: state.synthesizer.as_ref(),
            retention: state.config.retention(),
        }
    }

    /// Characters charged for `text`.
    pub fn cost_of(text: &str) -> i64 {
        text.chars().count() as i64
    }

    /// Synthesizes `text`, stores the audio and charges the owner's ledger.
    ///
    /// The ledger charge and the record insert happen together in the
    /// repository; when either fails the written file is removed again.
    pub async fn generate(&self, user_id: i64, text: &str) -> Result<AudioRecord> {
        let cost = Self::cost_of(text);
        if cost == 0 {
            return Err(AppError::Validation("Text is required".to_string()));
        }

        // Cheap early exit; the authoritative check is the conditional charge below.
        match self.repository.find_usage(user_id).await? {
            Some(usage) if usage.can_afford(cost) => {}
            _ => {
                tracing::info!(user_id, cost, "Generation rejected: not enough characters");
                return Err(AppError::QuotaExceeded);
            }
        }

        let wav = self.synthesizer.synthesize(text).await?;

        let now = Utc::now();
        let path = self
            .storage
            .store_bytes(&generated_audio_filename(user_id, now), &wav)
            .await?;

        let record = NewAudioRecord {
            user_id,
            file_path: path.to_string_lossy().to_string(),
            characters_used: cost,
            created_at: now,
            expire_at: now + self.retention,
        };

        match self.repository.record_generation(record).await {
            Ok(Some(audio)) => {
                tracing::info!(user_id, audio_id = audio.id, cost, "Audio generated");
                Ok(audio)
            }
            Ok(None) => {
                self.storage.discard(&path).await;
                tracing::info!(user_id, cost, "Generation lost the race for remaining characters");
                Err(AppError::QuotaExceeded)
            }
            Err(e) => {
                self.storage.discard(&path).await;
                Err(e)
            }
        }
    }
}
