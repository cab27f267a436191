//! Voice clip transcoding: Ogg/Opus in, normalized mono 16-bit 44.1 kHz WAV out.

pub mod decode;
pub mod dsp;
#[cfg(test)]
pub(crate) mod fixtures;

use std::{io::Cursor, path::Path};
use tracing::{debug, info};

use crate::error::TranscodeError;
pub use decode::{DecodedAudio, decode_ogg_opus};

pub const TARGET_SAMPLE_RATE: u32 = 44_100;
pub const TARGET_CHANNELS: u16 = 1;
pub const TARGET_BITS: u16 = 16;
/// Everything above this is treated as noise before recognition
pub const LOW_PASS_CUTOFF_HZ: f32 = 3_000.0;

/// Resample, collapse to mono, quantize to 16 bit, then low-pass.
pub fn process(audio: &DecodedAudio) -> Result<Vec<i16>, TranscodeError> {
    let resampled = dsp::resample(
        &audio.samples,
        audio.channels,
        audio.sample_rate,
        TARGET_SAMPLE_RATE,
    )?;
    let mono = dsp::downmix_to_mono(&resampled, audio.channels);
    let mut pcm = dsp::to_pcm16(&mono);
    dsp::low_pass(&mut pcm, LOW_PASS_CUTOFF_HZ, TARGET_SAMPLE_RATE);
    Ok(pcm)
}

/// Wrap mono 16-bit samples in a WAV container
pub fn encode_wav(pcm: Vec<i16>) -> Result<Vec<u8>, TranscodeError> {
    let header = wav::Header::new(
        wav::header::WAV_FORMAT_PCM,
        TARGET_CHANNELS,
        TARGET_SAMPLE_RATE,
        TARGET_BITS,
    );
    let mut out = Cursor::new(Vec::new());
    wav::write(header, &wav::BitDepth::Sixteen(pcm), &mut out)?;
    Ok(out.into_inner())
}

/// Full in-memory conversion of a compressed clip to WAV bytes
pub fn render_wav(input: &[u8]) -> Result<Vec<u8>, TranscodeError> {
    let decoded = decode_ogg_opus(input)?;
    debug!(
        frames = decoded.frames(),
        channels = decoded.channels,
        "voice clip decoded"
    );
    encode_wav(process(&decoded)?)
}

/// Convert `input` and write the result to `dest`, replacing any existing file.
///
/// Nothing is written when decoding fails.
pub async fn transcode_to_file(input: Vec<u8>, dest: &Path) -> Result<(), TranscodeError> {
    let wav_bytes = tokio::task::spawn_blocking(move || render_wav(&input))
        .await
        .map_err(|e| TranscodeError::Decode(format!("transcoding task failed: {e}")))??;

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(dest, &wav_bytes).await?;

    info!(path = %dest.display(), bytes = wav_bytes.len(), "voice clip transcoded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo_clip(frames: usize) -> DecodedAudio {
        let samples = (0..frames)
            .flat_map(|n| {
                let s = 0.4 * (2.0 * std::f32::consts::PI * 220.0 * n as f32 / 48_000.0).sin();
                [s, s]
            })
            .collect();
        DecodedAudio {
            samples,
            channels: 2,
            sample_rate: decode::OPUS_SAMPLE_RATE,
        }
    }

    #[test]
    fn processing_yields_mono_at_target_rate() {
        let pcm = process(&stereo_clip(48_000)).unwrap();
        assert_eq!(pcm.len(), 44_100);
        assert!(pcm.iter().any(|&s| s.abs() > 10_000));
    }

    #[test]
    fn wav_header_describes_mono_16bit_44k1() {
        let bytes = encode_wav(process(&stereo_clip(4_800)).unwrap()).unwrap();
        assert_eq!(&bytes[..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");

        let (header, data) = wav::read(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(header.channel_count, 1);
        assert_eq!(header.sampling_rate, 44_100);
        assert_eq!(header.bits_per_sample, 16);
        match data {
            wav::BitDepth::Sixteen(samples) => assert_eq!(samples.len(), 4_410),
            _ => panic!("expected 16-bit samples"),
        }
    }

    #[test]
    fn real_clip_renders_to_mono_16bit_44k1() {
        let frames = 10;
        let bytes = render_wav(&fixtures::tone_clip(2, frames)).unwrap();

        let (header, data) = wav::read(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(header.channel_count, 1);
        assert_eq!(header.sampling_rate, 44_100);
        assert_eq!(header.bits_per_sample, 16);

        let decoded_frames = frames * fixtures::FRAME_SAMPLES - fixtures::PRE_SKIP as usize;
        let expected = decoded_frames * 44_100 / 48_000;
        match data {
            wav::BitDepth::Sixteen(samples) => {
                assert_eq!(samples.len(), expected);
                assert!(samples.iter().any(|&s| s.saturating_abs() > 3_000));
            }
            _ => panic!("expected 16-bit samples"),
        }
    }

    #[tokio::test]
    async fn real_clip_is_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("voices").join("voice_1.wav");
        std::fs::create_dir_all(dest.parent().unwrap()).unwrap();
        std::fs::write(&dest, b"stale").unwrap();

        transcode_to_file(fixtures::tone_clip(1, 5), &dest).await.unwrap();

        let written = std::fs::read(&dest).unwrap();
        assert_eq!(&written[..4], b"RIFF");
    }

    #[tokio::test]
    async fn corrupt_clip_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("voices").join("voice_1.wav");

        let err = transcode_to_file(b"not audio".to_vec(), &dest).await.unwrap_err();

        assert!(matches!(err, TranscodeError::Decode(_)));
        assert!(!dest.exists());
    }
}
