use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Longest caller-supplied fragment embedded in a stored file name.
const MAX_NAME_FRAGMENT: usize = 64;

/// Reduces a caller-supplied name to a single safe path component.
///
/// Path separators become spaces, whitespace runs collapse to `_`, anything
/// outside `[A-Za-z0-9._-]` is dropped and leading/trailing dots and
/// underscores are trimmed, so the result can never climb out of the
/// directory it is joined to.
pub fn sanitize_filename(name: &str) -> String {
    let spaced: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Name for a freshly generated audio file.
pub fn generated_audio_filename(user_id: i64, at: DateTime<Utc>) -> String {
    format!(
        "{}_{}_{}.wav",
        user_id,
        at.timestamp_micros(),
        Uuid::new_v4().simple()
    )
}

/// Name for an uploaded voice sample. Only the voice name comes from the
/// caller; it is sanitized and cut to `MAX_NAME_FRAGMENT` characters so the
/// result stays well under filesystem name limits.
pub fn cloned_voice_filename(user_id: i64, voice_name: &str, at: DateTime<Utc>) -> String {
    let sanitized = sanitize_filename(voice_name);
    let fragment: String = sanitized.chars().take(MAX_NAME_FRAGMENT).collect();

    format!(
        "{}_{}_{}_{}.wav",
        user_id,
        fragment.trim_end_matches(|c| c == '.' || c == '_'),
        at.timestamp_micros(),
        Uuid::new_v4().simple()
    )
}
