use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use tokio_util::io::ReaderStream;

use crate::{
    errors::{AppError, Result},
    models::Delivery,
    services::retrieval::RetrievedFile,
};

/// Builds a streaming `audio/wav` response for an authorized file.
pub fn file_response(retrieved: RetrievedFile, delivery: Delivery) -> Result<Response> {
    let disposition = match delivery {
        Delivery::Download => format!(
            "attachment; filename=\"{}\"",
            header_safe_filename(&retrieved.download_name)
        ),
        Delivery::Stream => "inline".to_string(),
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "audio/wav")
        .header(header::CONTENT_LENGTH, retrieved.len)
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from_stream(ReaderStream::new(retrieved.file)))
        .map_err(|e| AppError::Internal(e.into()))
}

/// Keeps a display name inside a quoted header parameter.
fn header_safe_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_safe_filename() {
        assert_eq!(header_safe_filename("audio_1.wav"), "audio_1.wav");
        assert_eq!(header_safe_filename("My \"Voice\".wav"), "My _Voice_.wav");
        assert_eq!(header_safe_filename("naïve\r\n.wav"), "na_ve__.wav");
    }
}
