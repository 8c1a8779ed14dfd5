use std::path::Path;
use tokio::fs::File;

use crate::{
    database::Repository,
    errors::{AppError, Result},
    handlers::AppState,
    storage::LocalStorage,
};

/// An authorized, opened file ready to be sent.
#[derive(Debug)]
pub struct RetrievedFile {
    pub file: File,
    pub len: u64,
    pub download_name: String,
}

pub struct RetrievalService<'a> {
    repository: &'a dyn Repository,
    audio_storage: &'a LocalStorage,
    voice_storage: &'a LocalStorage,
}

pub(crate) fn ensure_owner(owner_id: i64, user_id: i64) -> Result<()> {
    if owner_id != user_id {
        tracing::warn!(owner_id, user_id, "Access denied to another user's file");
        return Err(AppError::Forbidden("Access denied".to_string()));
    }
    Ok(())
}

impl<'a> RetrievalService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self {
            repository: state.repository.as_ref(),
            audio_storage: &state.audio_storage,
            voice_storage: &state.voice_storage,
        }
    }

    pub async fn fetch_audio(&self, user_id: i64, audio_id: i64) -> Result<RetrievedFile> {
        let audio = self
            .repository
            .find_audio(audio_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Audio file not found".to_string()))?;

        ensure_owner(audio.user_id, user_id)?;

        let (file, len) = open_backing_file(self.audio_storage, "Audio file", &audio.file_path).await?;

        Ok(RetrievedFile {
            file,
            len,
            download_name: audio.download_name(),
        })
    }

    pub async fn fetch_voice(&self, user_id: i64, voice_id: i64) -> Result<RetrievedFile> {
        let voice = self
            .repository
            .find_voice(voice_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Voice not found".to_string()))?;

        ensure_owner(voice.user_id, user_id)?;

        let (file, len) = open_backing_file(self.voice_storage, "Voice file", &voice.file_path).await?;

        Ok(RetrievedFile {
            file,
            len,
            download_name: voice.download_name(),
        })
    }
}

async fn open_backing_file(
    storage: &LocalStorage,
    what: &'static str,
    file_path: &str,
) -> Result<(File, u64)> {
    let path = Path::new(file_path);
    storage.open(path).await?.ok_or_else(|| AppError::MissingFile {
        what,
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        database::MemoryRepository,
        models::{NewClonedVoice, Usage},
        services::generation::GenerationService,
        test_support::test_state,
    };
    use chrono::Utc;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_fetch_audio_authorization() {
        let repo = Arc::new(MemoryRepository::new());
        repo.put_usage(Usage::new(1, 100)).await;
        let (state, _dir) = test_state(repo);

        let audio = GenerationService::new(&state).generate(1, "hello").await.unwrap();
        let retrieval = RetrievalService::new(&state);

        let fetched = retrieval.fetch_audio(1, audio.id).await.unwrap();
        assert_eq!(fetched.download_name, format!("audio_{}.wav", audio.id));
        assert!(fetched.len > 44);

        assert!(matches!(retrieval.fetch_audio(2, audio.id).await, Err(AppError::Forbidden(_))));
        assert!(matches!(retrieval.fetch_audio(1, audio.id + 1).await, Err(AppError::NotFound(_))));

        std::fs::remove_file(&audio.file_path).unwrap();
        assert!(matches!(
            retrieval.fetch_audio(1, audio.id).await,
            Err(AppError::MissingFile { what: "Audio file", .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_voice_uses_voice_name() {
        let repo = Arc::new(MemoryRepository::new());
        let (state, _dir) = test_state(repo.clone());

        let path = state.voice_storage.store_bytes("1_narrator.wav", b"RIFF").await.unwrap();
        let voice = repo
            .create_voice(NewClonedVoice {
                user_id: 1,
                voice_name: "Narrator".to_string(),
                file_path: path.to_string_lossy().to_string(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let retrieval = RetrievalService::new(&state);
        let fetched = retrieval.fetch_voice(1, voice.id).await.unwrap();
        assert_eq!(fetched.download_name, "Narrator.wav");
        assert_eq!(fetched.len, 4);

        assert!(matches!(retrieval.fetch_voice(3, voice.id).await, Err(AppError::Forbidden(_))));
    }
}
