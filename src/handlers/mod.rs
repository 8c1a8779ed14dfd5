use axum::extract::{rejection::PathRejection, Path};
use std::sync::Arc;

use crate::{
    config::Config,
    database::{create_repository, Repository},
    errors::{AppError, Result},
    services::synthesizer::{Synthesizer, ToneSynthesizer},
    storage::LocalStorage,
};

pub mod files;
pub mod health;
pub mod reference;
pub mod tts;
pub mod user;
pub mod voices;

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn Repository>,
    pub config: Config,
    pub audio_storage: LocalStorage,
    pub voice_storage: LocalStorage,
    pub synthesizer: Arc<dyn Synthesizer>,
}

impl AppState {
    /// Wires a state around an existing repository, creating both storage
    /// roots and using the tone synthesizer.
    pub fn new(config: Config, repository: Arc<dyn Repository>) -> Result<Self> {
        Ok(Self {
            audio_storage: LocalStorage::new(&config.generated_audio_dir)?,
            voice_storage: LocalStorage::new(&config.cloned_voice_dir)?,
            synthesizer: Arc::new(ToneSynthesizer::default()),
            repository,
            config,
        })
    }

    pub async fn from_config(config: Config) -> Result<Self> {
        let repository = create_repository(&config.database_url).await?;
        Self::new(config, repository)
    }

    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn Synthesizer>) -> Self {
        self.synthesizer = synthesizer;
        self
    }
}

/// Resolves a numeric `:id` segment. Anything that is not an integer names
/// no record, so it is reported as `not_found` in the usual JSON shape.
pub(crate) fn record_id(
    path: std::result::Result<Path<i64>, PathRejection>,
    not_found: &str,
) -> Result<i64> {
    match path {
        Ok(Path(id)) => Ok(id),
        Err(e) => {
            tracing::debug!("Rejected record id: {}", e.body_text());
            Err(AppError::NotFound(not_found.to_string()))
        }
    }
}
