use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};

use super::Repository;
use crate::errors::{AppError, Result};
use crate::models::{AudioRecord, ClonedVoice, NewAudioRecord, NewClonedVoice, Usage, User};

const AUDIO_COLUMNS: &str = "id, user_id, file_path, characters_used, created_at, expire_at";
const VOICE_COLUMNS: &str = "id, user_id, voice_name, file_path, created_at";

#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Internal(e.into()))?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Escapes LIKE metacharacters so the search matches literally.
fn escape_like(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len());
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl Repository for PgRepository {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, plan_id, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_usage(&self, user_id: i64) -> Result<Option<Usage>> {
        let usage = sqlx::query_as::<_, Usage>(
            r#"
            SELECT user_id, characters_used, characters_remaining, last_generated_at
            FROM usage
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(usage)
    }

    async fn record_generation(&self, record: NewAudioRecord) -> Result<Option<AudioRecord>> {
        let mut tx = self.pool.begin().await?;

        // The balance guard and the decrement are one statement, so
        // concurrent charges serialise on the row lock.
        let charged = sqlx::query(
            r#"
            UPDATE usage
            SET characters_used = characters_used + $2,
                characters_remaining = characters_remaining - $2,
                last_generated_at = $3
            WHERE user_id = $1 AND characters_remaining >= $2
            "#,
        )
        .bind(record.user_id)
        .bind(record.characters_used)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await?;

        if charged.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let audio = sqlx::query_as::<_, AudioRecord>(&format!(
            r#"
            INSERT INTO audio_files (user_id, file_path, characters_used, created_at, expire_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            AUDIO_COLUMNS
        ))
        .bind(record.user_id)
        .bind(&record.file_path)
        .bind(record.characters_used)
        .bind(record.created_at)
        .bind(record.expire_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(audio))
    }

    async fn find_audio(&self, audio_id: i64) -> Result<Option<AudioRecord>> {
        let audio = sqlx::query_as::<_, AudioRecord>(&format!(
            "SELECT {} FROM audio_files WHERE id = $1",
            AUDIO_COLUMNS
        ))
        .bind(audio_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(audio)
    }

    async fn list_audio_by_user(&self, user_id: i64) -> Result<Vec<AudioRecord>> {
        let audio = sqlx::query_as::<_, AudioRecord>(&format!(
            "SELECT {} FROM audio_files WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
            AUDIO_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(audio)
    }

    async fn list_expired_audio(&self, now: DateTime<Utc>) -> Result<Vec<AudioRecord>> {
        let audio = sqlx::query_as::<_, AudioRecord>(&format!(
            "SELECT {} FROM audio_files WHERE expire_at <= $1 ORDER BY id",
            AUDIO_COLUMNS
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(audio)
    }

    async fn delete_audio(&self, audio_ids: &[i64]) -> Result<u64> {
        if audio_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM audio_files WHERE id = ANY($1)")
            .bind(audio_ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn create_voice(&self, voice: NewClonedVoice) -> Result<ClonedVoice> {
        let created = sqlx::query_as::<_, ClonedVoice>(&format!(
            r#"
            INSERT INTO cloned_voices (user_id, voice_name, file_path, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            VOICE_COLUMNS
        ))
        .bind(voice.user_id)
        .bind(&voice.voice_name)
        .bind(&voice.file_path)
        .bind(voice.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_voice(&self, voice_id: i64) -> Result<Option<ClonedVoice>> {
        let voice = sqlx::query_as::<_, ClonedVoice>(&format!(
            "SELECT {} FROM cloned_voices WHERE id = $1",
            VOICE_COLUMNS
        ))
        .bind(voice_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(voice)
    }

    async fn search_voices(&self, user_id: i64, search: &str) -> Result<Vec<ClonedVoice>> {
        let pattern = format!("%{}%", escape_like(search));

        let voices = sqlx::query_as::<_, ClonedVoice>(&format!(
            r#"
            SELECT {}
            FROM cloned_voices
            WHERE user_id = $1 AND voice_name ILIKE $2 ESCAPE '\'
            ORDER BY created_at DESC, id DESC
            "#,
            VOICE_COLUMNS
        ))
        .bind(user_id)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(voices)
    }

    async fn delete_voice(&self, voice_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cloned_voices WHERE id = $1")
            .bind(voice_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
