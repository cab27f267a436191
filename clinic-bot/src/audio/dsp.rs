//! Sample-level processing applied between decoding and WAV export.

use rubato::{FftFixedIn, Resampler};
use std::f32::consts::PI;

use crate::error::TranscodeError;

/// Input frames per resampler chunk; rubato rounds it to what the rate ratio needs.
const RESAMPLE_CHUNK: usize = 1024;

fn resample_error(e: impl std::fmt::Display) -> TranscodeError {
    TranscodeError::Resample(e.to_string())
}

fn deinterleave(samples: &[f32], channels: usize) -> Vec<Vec<f32>> {
    (0..channels)
        .map(|channel| samples.iter().skip(channel).step_by(channels).copied().collect())
        .collect()
}

fn append(output: &mut [Vec<f32>], chunk: Vec<Vec<f32>>) {
    for (channel, samples) in output.iter_mut().zip(chunk) {
        channel.extend(samples);
    }
}

/// Band-limited resampling of interleaved samples.
///
/// The output has exactly `frames * to_rate / from_rate` frames, aligned with the input
/// (the resampler's own delay is cut off).
pub fn resample(
    samples: &[f32],
    channels: usize,
    from_rate: u32,
    to_rate: u32,
) -> Result<Vec<f32>, TranscodeError> {
    if from_rate == to_rate || samples.is_empty() || channels == 0 {
        return Ok(samples.to_vec());
    }

    let in_frames = samples.len() / channels;
    let out_frames = (in_frames as u64 * to_rate as u64 / from_rate as u64) as usize;
    let input = deinterleave(&samples[..in_frames * channels], channels);

    let mut resampler = FftFixedIn::<f32>::new(
        from_rate as usize,
        to_rate as usize,
        RESAMPLE_CHUNK,
        1,
        channels,
    )
    .map_err(resample_error)?;
    let delay = resampler.output_delay();
    let mut output = vec![Vec::with_capacity(delay + out_frames); channels];

    let mut position = 0;
    while in_frames - position >= resampler.input_frames_next() {
        let end = position + resampler.input_frames_next();
        let chunk: Vec<&[f32]> = input.iter().map(|channel| &channel[position..end]).collect();
        append(&mut output, resampler.process(&chunk[..], None).map_err(resample_error)?);
        position = end;
    }

    if position < in_frames {
        let chunk: Vec<&[f32]> = input.iter().map(|channel| &channel[position..]).collect();
        let tail = resampler
            .process_partial(Some(&chunk[..]), None)
            .map_err(resample_error)?;
        append(&mut output, tail);
    }

    // Flush what is still buffered inside the filter
    while output[0].len() < delay + out_frames {
        let flushed = resampler
            .process_partial(None::<&[&[f32]]>, None)
            .map_err(resample_error)?;
        append(&mut output, flushed);
    }

    let mut interleaved = Vec::with_capacity(out_frames * channels);
    for frame in delay..delay + out_frames {
        for channel in &output {
            interleaved.push(channel[frame]);
        }
    }
    Ok(interleaved)
}

/// Average all channels of each frame into one.
pub fn downmix_to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Float samples in [-1.0, 1.0] to signed 16-bit PCM.
pub fn to_pcm16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&sample| (sample * 32768.0).round().clamp(-32768.0, 32767.0) as i16)
        .collect()
}

/// First-order RC low-pass filter over 16-bit mono samples.
pub fn low_pass(samples: &mut [i16], cutoff_hz: f32, sample_rate: u32) {
    let Some(&first) = samples.first() else {
        return;
    };

    let rc = 1.0 / (2.0 * PI * cutoff_hz);
    let dt = 1.0 / sample_rate as f32;
    let alpha = dt / (rc + dt);

    let mut previous = first as f32;
    for sample in samples.iter_mut() {
        previous += alpha * (*sample as f32 - previous);
        *sample = previous.round().clamp(-32768.0, 32767.0) as i16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(frequency: f32, sample_rate: u32, frames: usize, amplitude: f32) -> Vec<f32> {
        (0..frames)
            .map(|n| amplitude * (2.0 * PI * frequency * n as f32 / sample_rate as f32).sin())
            .collect()
    }

    fn peak(samples: &[i16]) -> i16 {
        samples.iter().map(|s| s.saturating_abs()).max().unwrap_or(0)
    }

    fn rms(samples: &[f32]) -> f32 {
        (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
    }

    #[test]
    fn resample_48k_to_44k1_keeps_duration() {
        let input = sine(440.0, 48_000, 48_000, 0.5);
        let output = resample(&input, 1, 48_000, 44_100).unwrap();
        assert_eq!(output.len(), 44_100);

        let stereo: Vec<f32> = input.iter().flat_map(|&s| [s, -s]).collect();
        let output = resample(&stereo, 2, 48_000, 44_100).unwrap();
        assert_eq!(output.len(), 2 * 44_100);
        assert!((output[100] + output[101]).abs() < 1e-6);
    }

    #[test]
    fn resampling_keeps_speech_band_and_drops_tones_above_new_nyquist() {
        let speech = resample(&sine(1_000.0, 48_000, 48_000, 0.5), 1, 48_000, 44_100).unwrap();
        let level = rms(&speech[4_410..39_690]);
        assert!((level - 0.5 / 2f32.sqrt()).abs() < 0.02, "speech level {level}");

        // 23 kHz has no place below 22.05 kHz; it must not fold back as a 21.1 kHz tone
        let ultrasonic =
            resample(&sine(23_000.0, 48_000, 48_000, 0.5), 1, 48_000, 44_100).unwrap();
        let level = rms(&ultrasonic[4_410..39_690]);
        assert!(level < 0.05, "aliased level {level}");
    }

    #[test]
    fn odd_length_input_is_fully_flushed() {
        let input = sine(300.0, 48_000, 4_803, 0.5);
        let output = resample(&input, 1, 48_000, 44_100).unwrap();
        assert_eq!(output.len(), 4_803 * 44_100 / 48_000);
        assert!(output[output.len() - 200..].iter().any(|s| s.abs() > 0.1));
    }

    #[test]
    fn downmix_averages_channels() {
        assert_eq!(downmix_to_mono(&[1.0, 0.0, 0.5, 0.5], 2), vec![0.5, 0.5]);
        assert_eq!(downmix_to_mono(&[0.25, 0.75], 1), vec![0.25, 0.75]);
    }

    #[test]
    fn pcm16_conversion_clamps() {
        assert_eq!(to_pcm16(&[0.0, 0.5, -1.0, 1.0, 2.0]), vec![0, 16384, -32768, 32767, 32767]);
    }

    #[test]
    fn low_pass_keeps_speech_and_cuts_hiss() {
        let rate = 44_100;
        let mut speech = to_pcm16(&sine(300.0, rate, 4410, 0.5));
        let mut hiss = to_pcm16(&sine(12_000.0, rate, 4410, 0.5));

        low_pass(&mut speech, 3000.0, rate);
        low_pass(&mut hiss, 3000.0, rate);

        // Skip the filter's settling time
        assert!(peak(&speech[1000..]) > 14_000);
        assert!(peak(&hiss[1000..]) < 6_000);
    }

    #[test]
    fn empty_input_is_left_alone() {
        let mut empty: Vec<i16> = vec![];
        low_pass(&mut empty, 3000.0, 44_100);
        assert!(resample(&[], 2, 48_000, 44_100).unwrap().is_empty());
    }
}
