use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;

use super::Repository;
use crate::errors::Result;
use crate::models::{AudioRecord, ClonedVoice, NewAudioRecord, NewClonedVoice, Usage, User};

#[derive(Default)]
struct MemoryState {
    users: HashMap<i64, User>,
    usage: HashMap<i64, Usage>,
    audio: BTreeMap<i64, AudioRecord>,
    voices: BTreeMap<i64, ClonedVoice>,
    last_audio_id: i64,
    last_voice_id: i64,
}

/// In-process backend for local development and tests. Every operation
/// runs under one lock, which is what makes `record_generation` atomic here.
#[derive(Default)]
pub struct MemoryRepository {
    state: Mutex<MemoryState>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provisions a user; users are created outside this service.
    pub async fn insert_user(&self, user: User) {
        self.state.lock().await.users.insert(user.id, user);
    }

    /// Assigns or replaces a user's ledger.
    pub async fn put_usage(&self, usage: Usage) {
        self.state.lock().await.usage.insert(usage.user_id, usage);
    }

    /// Replaces an audio record wholesale, e.g. to back-date its expiry.
    pub async fn put_audio(&self, record: AudioRecord) {
        let mut state = self.state.lock().await;
        state.last_audio_id = state.last_audio_id.max(record.id);
        state.audio.insert(record.id, record);
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<User>> {
        Ok(self.state.lock().await.users.get(&user_id).cloned())
    }

    async fn find_usage(&self, user_id: i64) -> Result<Option<Usage>> {
        Ok(self.state.lock().await.usage.get(&user_id).cloned())
    }

    async fn record_generation(&self, record: NewAudioRecord) -> Result<Option<AudioRecord>> {
        let mut state = self.state.lock().await;

        let charged = match state.usage.get_mut(&record.user_id) {
            Some(usage) => usage.charge(record.characters_used, record.created_at),
            None => false,
        };
        if !charged {
            return Ok(None);
        }

        state.last_audio_id += 1;
        let audio = AudioRecord {
            id: state.last_audio_id,
            user_id: record.user_id,
            file_path: record.file_path,
            characters_used: record.characters_used,
            created_at: record.created_at,
            expire_at: record.expire_at,
        };
        state.audio.insert(audio.id, audio.clone());

        Ok(Some(audio))
    }

    async fn find_audio(&self, audio_id: i64) -> Result<Option<AudioRecord>> {
        Ok(self.state.lock().await.audio.get(&audio_id).cloned())
    }

    async fn list_audio_by_user(&self, user_id: i64) -> Result<Vec<AudioRecord>> {
        let state = self.state.lock().await;
        let mut audio: Vec<AudioRecord> = state
            .audio
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        audio.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(audio)
    }

    async fn list_expired_audio(&self, now: DateTime<Utc>) -> Result<Vec<AudioRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .audio
            .values()
            .filter(|a| a.is_expired(now))
            .cloned()
            .collect())
    }

    async fn delete_audio(&self, audio_ids: &[i64]) -> Result<u64> {
        let mut state = self.state.lock().await;
        let deleted = audio_ids
            .iter()
            .filter(|id| state.audio.remove(*id).is_some())
            .count();
        Ok(deleted as u64)
    }

    async fn create_voice(&self, voice: NewClonedVoice) -> Result<ClonedVoice> {
        let mut state = self.state.lock().await;
        state.last_voice_id += 1;
        let created = ClonedVoice {
            id: state.last_voice_id,
            user_id: voice.user_id,
            voice_name: voice.voice_name,
            file_path: voice.file_path,
            created_at: voice.created_at,
        };
        state.voices.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_voice(&self, voice_id: i64) -> Result<Option<ClonedVoice>> {
        Ok(self.state.lock().await.voices.get(&voice_id).cloned())
    }

    async fn search_voices(&self, user_id: i64, search: &str) -> Result<Vec<ClonedVoice>> {
        let needle = search.to_lowercase();
        let state = self.state.lock().await;
        let mut voices: Vec<ClonedVoice> = state
            .voices
            .values()
            .filter(|v| v.user_id == user_id && v.voice_name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        voices.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(voices)
    }

    async fn delete_voice(&self, voice_id: i64) -> Result<bool> {
        Ok(self.state.lock().await.voices.remove(&voice_id).is_some())
    }
}
