//! Ogg/Opus voice clip decoding.

use ogg::PacketReader;
use opus::{Channels, Decoder};
use std::io::Cursor;

use crate::error::TranscodeError;

/// Opus always decodes at 48 kHz
pub const OPUS_SAMPLE_RATE: u32 = 48_000;

/// 120 ms at 48 kHz, the longest frame an Opus packet can carry
const MAX_FRAME_SAMPLES: usize = 5760;

const OPUS_HEAD_MAGIC: &[u8] = b"OpusHead";
const OPUS_TAGS_MAGIC: &[u8] = b"OpusTags";

/// Interleaved float PCM
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub channels: usize,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1)
    }
}

/// Fields of the identification header we need
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OpusHead {
    pub channels: u8,
    pub pre_skip: u16,
}

impl OpusHead {
    pub(crate) fn parse(packet: &[u8]) -> Result<Self, TranscodeError> {
        if packet.len() < 19 || !packet.starts_with(OPUS_HEAD_MAGIC) {
            return Err(TranscodeError::Decode("missing OpusHead header".to_string()));
        }
        Ok(Self {
            channels: packet[9],
            pre_skip: u16::from_le_bytes([packet[10], packet[11]]),
        })
    }
}

fn decode_error(e: impl std::fmt::Display) -> TranscodeError {
    TranscodeError::Decode(e.to_string())
}

/// Decode an Ogg/Opus stream into interleaved 48 kHz samples, dropping the encoder pre-skip.
pub fn decode_ogg_opus(bytes: &[u8]) -> Result<DecodedAudio, TranscodeError> {
    let mut reader = PacketReader::new(Cursor::new(bytes));

    let head_packet = reader
        .read_packet()
        .map_err(decode_error)?
        .ok_or_else(|| TranscodeError::Decode("empty Ogg stream".to_string()))?;
    let head = OpusHead::parse(&head_packet.data)?;

    let (channel_layout, channels) = match head.channels {
        1 => (Channels::Mono, 1),
        2 => (Channels::Stereo, 2),
        n => return Err(TranscodeError::Unsupported(format!("{n} channels"))),
    };

    let mut decoder = Decoder::new(OPUS_SAMPLE_RATE, channel_layout).map_err(decode_error)?;
    let mut frame = vec![0f32; MAX_FRAME_SAMPLES * channels];
    let mut samples = Vec::new();

    while let Some(packet) = reader.read_packet().map_err(decode_error)? {
        if packet.data.is_empty() || packet.data.starts_with(OPUS_TAGS_MAGIC) {
            continue;
        }
        let decoded = decoder
            .decode_float(&packet.data, &mut frame, false)
            .map_err(decode_error)?;
        samples.extend_from_slice(&frame[..decoded * channels]);
    }

    if samples.is_empty() {
        return Err(TranscodeError::Decode("no audio packets".to_string()));
    }

    let skip = (head.pre_skip as usize * channels).min(samples.len());
    samples.drain(..skip);

    Ok(DecodedAudio {
        samples,
        channels,
        sample_rate: OPUS_SAMPLE_RATE,
    })
}
