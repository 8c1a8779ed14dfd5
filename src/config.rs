use anyhow::Result;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub generated_audio_dir: String,
    pub cloned_voice_dir: String,
    pub audio_retention_days: i64,
    pub sweep_interval_secs: u64,
    pub max_upload_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "memory://".to_string()),
            host: env::var("HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "your-secret-key".to_string()),
            generated_audio_dir: env::var("GENERATED_AUDIO_DIR")
                .unwrap_or_else(|_| "./generated_audio".to_string()),
            cloned_voice_dir: env::var("CLONED_VOICE_DIR")
                .unwrap_or_else(|_| "./cloned_voices".to_string()),
            audio_retention_days: env::var("AUDIO_RETENTION_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()?,
            sweep_interval_secs: env::var("SWEEP_INTERVAL_SECS")
                .unwrap_or_else(|_| "3600".to_string()) // 1 hour, 0 disables
                .parse()?,
            max_upload_size: env::var("MAX_UPLOAD_SIZE")
                .unwrap_or_else(|_| "20971520".to_string()) // 20MB
                .parse()?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::days(self.audio_retention_days)
    }
}
