use chrono::Utc;
use std::path::Path;

use crate::{
    database::Repository,
    errors::{AppError, Result},
    handlers::AppState,
    models::{ClonedVoice, NewClonedVoice},
    services::retrieval::ensure_owner,
    storage::LocalStorage,
    utils::file::cloned_voice_filename,
};

pub struct VoiceService<'a> {
    repository: &'a dyn Repository,
    storage: &'a LocalStorage,
}

impl<'a> VoiceService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self {
            repository: state.repository.as_ref(),
            storage: &state.voice_storage,
        }
    }

    pub async fn clone_voice(
        &self,
        user_id: i64,
        voice_name: Option<String>,
        voice_file: Option<Vec<u8>>,
    ) -> Result<ClonedVoice> {
        let voice_name = voice_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        let voice_file = voice_file.filter(|data| !data.is_empty());

        let (voice_name, voice_file) = match (voice_name, voice_file) {
            (Some(name), Some(data)) => (name, data),
            _ => return Err(AppError::Validation("Voice file and name required".to_string())),
        };

        let now = Utc::now();
        let path = self
            .storage
            .store_bytes(&cloned_voice_filename(user_id, &voice_name, now), &voice_file)
            .await?;

        let created = self
            .repository
            .create_voice(NewClonedVoice {
                user_id,
                voice_name,
                file_path: path.to_string_lossy().to_string(),
                created_at: now,
            })
            .await;

        match created {
            Ok(voice) => {
                tracing::info!(user_id, voice_id = voice.id, "Voice cloned");
                Ok(voice)
            }
            Err(e) => {
                self.storage.discard(&path).await;
                Err(e)
            }
        }
    }

    pub async fn list_voices(&self, user_id: i64, search: &str) -> Result<Vec<ClonedVoice>> {
        self.repository.search_voices(user_id, search).await
    }

    /// Removes the sample file, then the row. The file goes first and
    /// failing to remove it does not keep the row alive.
    pub async fn delete_voice(&self, user_id: i64, voice_id: i64) -> Result<()> {
        let voice = self
            .repository
            .find_voice(voice_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Voice not found".to_string()))?;

        ensure_owner(voice.user_id, user_id)?;

        self.storage.discard(Path::new(&voice.file_path)).await;

        if !self.repository.delete_voice(voice.id).await? {
            // Deleted concurrently
            return Err(AppError::NotFound("Voice not found".to_string()));
        }

        tracing::info!(user_id, voice_id, "Voice deleted");
        Ok(())
    }
}
