use async_trait::async_trait;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;

use crate::errors::{AppError, Result};

/// Turns text into a complete audio file.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Returns the encoded WAV bytes.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// Stand-in engine: renders a fixed sine tone whatever the text says.
#[derive(Debug, Clone)]
pub struct ToneSynthesizer {
    pub frequency_hz: f32,
    pub duration_ms: u32,
    pub sample_rate: u32,
}

impl Default for ToneSynthesizer {
    fn default() -> Self {
        Self {
            frequency_hz: 440.0,
            duration_ms: 1000,
            sample_rate: 44100,
        }
    }
}

impl ToneSynthesizer {
    pub fn sample_count(&self) -> u32 {
        (self.sample_rate as u64 * self.duration_ms as u64 / 1000) as u32
    }

    fn render(&self) -> std::result::Result<Vec<u8>, hound::Error> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut buffer = Vec::new();
        let mut writer = WavWriter::new(Cursor::new(&mut buffer), spec)?;
        let step = 2.0 * std::f32::consts::PI * self.frequency_hz / self.sample_rate as f32;
        for n in 0..self.sample_count() {
            let sample = (n as f32 * step).sin() * i16::MAX as f32;
            writer.write_sample(sample as i16)?;
        }
        writer.finalize()?;

        Ok(buffer)
    }
}

#[async_trait]
impl Synthesizer for ToneSynthesizer {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>> {
        self.render()
            .map_err(|e| AppError::Synthesis(format!("Failed to render tone: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tone_is_one_second_of_mono_pcm() {
        let synthesizer = ToneSynthesizer::default();
        let wav = synthesizer.synthesize("hello").await.unwrap();

        let reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 44100);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 44100);
    }

    #[tokio::test]
    async fn test_output_ignores_text() {
        let synthesizer = ToneSynthesizer { duration_ms: 50, ..Default::default() };

        let a = synthesizer.synthesize("short").await.unwrap();
        let b = synthesizer.synthesize("a much longer piece of text").await.unwrap();
        assert_eq!(a, b);
    }
}
