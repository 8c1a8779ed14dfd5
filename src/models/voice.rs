use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ClonedVoice {
    pub id: i64,
    pub user_id: i64,
    pub voice_name: String,
    pub file_path: String,
    pub created_at: DateTime<Utc>,
}

impl ClonedVoice {
    pub fn download_name(&self) -> String {
        format!("{}.wav", self.voice_name)
    }
}

#[derive(Debug, Clone)]
pub struct NewClonedVoice {
    pub user_id: i64,
    pub voice_name: String,
    pub file_path: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VoiceSearchQuery {
    #[serde(default)]
    pub search: String,
}

#[derive(Debug, Serialize)]
pub struct VoiceSummary {
    pub id: i64,
    pub voice_name: String,
    pub file_path: String,
    pub created_at: DateTime<Utc>,
}

impl From<ClonedVoice> for VoiceSummary {
    fn from(voice: ClonedVoice) -> Self {
        Self {
            id: voice.id,
            voice_name: voice.voice_name,
            file_path: voice.file_path,
            created_at: voice.created_at,
        }
    }
}
