use chrono::{Duration, Utc};
use serial_test::serial;
use std::env;
use voice_studio_api::{
    database::{PgRepository, Repository},
    models::{NewAudioRecord, NewClonedVoice},
};

/// Connects to `TEST_DATABASE_URL` and resets the schema. Returns `None`
/// when no test database is configured so the suite still runs offline.
async fn setup_test_db() -> Option<PgRepository> {
    let database_url = match env::var("TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("TEST_DATABASE_URL not set, skipping Postgres test");
            return None;
        }
    };

    let db = PgRepository::new(&database_url)
        .await
        .expect("Failed to connect to test database");
    db.migrate().await.expect("Failed to run migrations");

    sqlx::query("TRUNCATE TABLE audio_files, cloned_voices, usage, users RESTART IDENTITY CASCADE")
        .execute(db.pool())
        .await
        .expect("Failed to clean test database");

    Some(db)
}

async fn create_user(db: &PgRepository, name: &str, plan_id: Option<i64>, remaining: Option<i64>) -> i64 {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO users (username, email, plan_id) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(name)
    .bind(format!("{}@example.com", name))
    .bind(plan_id)
    .fetch_one(db.pool())
    .await
    .unwrap();

    if let Some(remaining) = remaining {
        sqlx::query("INSERT INTO usage (user_id, characters_remaining) VALUES ($1, $2)")
            .bind(id)
            .bind(remaining)
            .execute(db.pool())
            .await
            .unwrap();
    }

    id
}

fn new_record(user_id: i64, cost: i64, expire_in: Duration) -> NewAudioRecord {
    let now = Utc::now();
    NewAudioRecord {
        user_id,
        file_path: format!("/tmp/voice-studio-{}-{}.wav", user_id, cost),
        characters_used: cost,
        created_at: now,
        expire_at: now + expire_in,
    }
}

#[tokio::test]
#[serial]
async fn test_find_user_and_usage() {
    let Some(db) = setup_test_db().await else { return };

    let id = create_user(&db, "alice", Some(1), Some(100)).await;

    let user = db.find_user(id).await.unwrap().unwrap();
    assert_eq!(user.username, "alice");
    assert!(user.has_plan());

    let usage = db.find_usage(id).await.unwrap().unwrap();
    assert_eq!(usage.characters_remaining, 100);
    assert_eq!(usage.characters_used, 0);
    assert!(usage.last_generated_at.is_none());

    assert!(db.find_user(id + 1000).await.unwrap().is_none());
    assert!(db.find_usage(id + 1000).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn test_record_generation_charges_atomically() {
    let Some(db) = setup_test_db().await else { return };

    let id = create_user(&db, "bob", Some(1), Some(100)).await;

    let audio = db
        .record_generation(new_record(id, 30, Duration::days(7)))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(audio.characters_used, 30);

    let usage = db.find_usage(id).await.unwrap().unwrap();
    assert_eq!(usage.characters_remaining, 70);
    assert_eq!(usage.characters_used, 30);
    assert!(usage.last_generated_at.is_some());

    // Too expensive: no charge, no row
    assert!(db
        .record_generation(new_record(id, 71, Duration::days(7)))
        .await
        .unwrap()
        .is_none());
    assert_eq!(db.find_usage(id).await.unwrap().unwrap().characters_remaining, 70);
    assert_eq!(db.list_audio_by_user(id).await.unwrap().len(), 1);

    // Exact balance is allowed
    assert!(db
        .record_generation(new_record(id, 70, Duration::days(7)))
        .await
        .unwrap()
        .is_some());
    assert_eq!(db.find_usage(id).await.unwrap().unwrap().characters_remaining, 0);
}

#[tokio::test]
#[serial]
async fn test_concurrent_charges_never_overdraw() {
    let Some(db) = setup_test_db().await else { return };

    let id = create_user(&db, "carol", Some(1), Some(50)).await;

    let (a, b) = tokio::join!(
        db.record_generation(new_record(id, 40, Duration::days(7))),
        db.record_generation(new_record(id, 40, Duration::days(7))),
    );
    let successes = [a.unwrap(), b.unwrap()].iter().filter(|r| r.is_some()).count();
    assert_eq!(successes, 1);

    let usage = db.find_usage(id).await.unwrap().unwrap();
    assert_eq!(usage.characters_remaining, 10);
    assert_eq!(usage.characters_used, 40);
}

#[tokio::test]
#[serial]
async fn test_expired_audio_listing_and_deletion() {
    let Some(db) = setup_test_db().await else { return };

    let id = create_user(&db, "dave", Some(1), Some(100)).await;

    let expired = db
        .record_generation(new_record(id, 1, -Duration::hours(1)))
        .await
        .unwrap()
        .unwrap();
    let fresh = db
        .record_generation(new_record(id, 2, Duration::days(7)))
        .await
        .unwrap()
        .unwrap();

    let listed = db.list_expired_audio(Utc::now()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, expired.id);

    let history = db.list_audio_by_user(id).await.unwrap();
    assert_eq!(history[0].id, fresh.id);

    assert_eq!(db.delete_audio(&[expired.id]).await.unwrap(), 1);
    assert_eq!(db.delete_audio(&[expired.id]).await.unwrap(), 0);
    assert_eq!(db.delete_audio(&[]).await.unwrap(), 0);
    assert!(db.find_audio(fresh.id).await.unwrap().is_some());
}

#[tokio::test]
#[serial]
async fn test_voice_search_and_delete() {
    let Some(db) = setup_test_db().await else { return };

    let owner = create_user(&db, "erin", Some(1), Some(100)).await;
    let other = create_user(&db, "frank", Some(1), Some(100)).await;

    for (user_id, name) in [(owner, "Warm ABC"), (owner, "100% calm"), (other, "abc")] {
        db.create_voice(NewClonedVoice {
            user_id,
            voice_name: name.to_string(),
            file_path: format!("/tmp/{}.wav", name),
            created_at: Utc::now(),
        })
        .await
        .unwrap();
    }

    assert_eq!(db.search_voices(owner, "").await.unwrap().len(), 2);

    let matches = db.search_voices(owner, "abc").await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].voice_name, "Warm ABC");

    let literal = db.search_voices(owner, "0%").await.unwrap();
    assert_eq!(literal.len(), 1);
    assert!(db.search_voices(owner, "_").await.unwrap().is_empty());

    let voice_id = matches[0].id;
    assert!(db.delete_voice(voice_id).await.unwrap());
    assert!(!db.delete_voice(voice_id).await.unwrap());
    assert!(db.find_voice(voice_id).await.unwrap().is_none());
}
