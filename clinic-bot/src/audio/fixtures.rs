//! Real Ogg/Opus clips for tests, encoded on the fly.

use ogg::{PacketWriteEndInfo, PacketWriter};
use opus::{Application, Channels, Encoder};

use super::decode::OPUS_SAMPLE_RATE;

/// 20 ms at 48 kHz
pub(crate) const FRAME_SAMPLES: usize = 960;
pub(crate) const PRE_SKIP: u16 = 312;

const SERIAL: u32 = 0x0c11_71c5;

fn opus_head(channels: u8) -> Vec<u8> {
    let mut head = b"OpusHead".to_vec();
    head.push(1);
    head.push(channels);
    head.extend_from_slice(&PRE_SKIP.to_le_bytes());
    head.extend_from_slice(&OPUS_SAMPLE_RATE.to_le_bytes());
    head.extend_from_slice(&0i16.to_le_bytes());
    head.push(0);
    head
}

fn opus_tags() -> Vec<u8> {
    let vendor = b"clinic-bot tests";
    let mut tags = b"OpusTags".to_vec();
    tags.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    tags.extend_from_slice(vendor);
    tags.extend_from_slice(&0u32.to_le_bytes());
    tags
}

/// `frames` Opus packets of a 440 Hz tone in an Ogg stream, `channels` 1 or 2.
pub(crate) fn tone_clip(channels: u8, frames: usize) -> Vec<u8> {
    let layout = if channels == 2 {
        Channels::Stereo
    } else {
        Channels::Mono
    };
    let mut encoder = Encoder::new(OPUS_SAMPLE_RATE, layout, Application::Audio).unwrap();

    let mut bytes = Vec::new();
    {
        let mut writer = PacketWriter::new(&mut bytes);
        writer
            .write_packet(opus_head(channels), SERIAL, PacketWriteEndInfo::EndPage, 0)
            .unwrap();
        writer
            .write_packet(opus_tags(), SERIAL, PacketWriteEndInfo::EndPage, 0)
            .unwrap();

        for frame in 0..frames {
            let pcm: Vec<f32> = (0..FRAME_SAMPLES)
                .flat_map(|n| {
                    let t = (frame * FRAME_SAMPLES + n) as f32 / OPUS_SAMPLE_RATE as f32;
                    let sample = 0.3 * (2.0 * std::f32::consts::PI * 440.0 * t).sin();
                    std::iter::repeat_n(sample, channels as usize)
                })
                .collect();
            let packet = encoder.encode_vec_float(&pcm, 4000).unwrap();

            let end = if frame + 1 == frames {
                PacketWriteEndInfo::EndStream
            } else {
                PacketWriteEndInfo::NormalPacket
            };
            let granule = ((frame + 1) * FRAME_SAMPLES) as u64;
            writer.write_packet(packet, SERIAL, end, granule).unwrap();
        }
    }
    bytes
}
