use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AudioRecord {
    pub id: i64,
    pub user_id: i64,
    pub file_path: String,
    pub characters_used: i64,
    pub created_at: DateTime<Utc>,
    pub expire_at: DateTime<Utc>,
}

impl AudioRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expire_at <= now
    }

    pub fn download_name(&self) -> String {
        format!("audio_{}.wav", self.id)
    }
}

/// Everything the repository needs to charge a ledger and persist the
/// resulting record in one step.
#[derive(Debug, Clone)]
pub struct NewAudioRecord {
    pub user_id: i64,
    pub file_path: String,
    pub characters_used: i64,
    pub created_at: DateTime<Utc>,
    pub expire_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub message: &'static str,
    pub audio_id: i64,
    pub file_path: String,
}

#[derive(Debug, Deserialize)]
pub struct LogDownloadRequest {
    pub audio_id: Option<i64>,
}

/// How a retrieved file is handed to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Download,
    Stream,
}
