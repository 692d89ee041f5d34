use std::path::Path;

use crate::audio::source::SampleSource;
use crate::foundation::error::{WavelockError, WavelockResult};

/// Decode an audio file into a [`SampleSource`].
///
/// `.wav` files are decoded in-process. Other containers go through the system `ffmpeg`
/// binary and require the `media-ffmpeg` feature.
#[tracing::instrument]
pub fn open_audio(path: &Path) -> WavelockResult<SampleSource> {
    let is_wav = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"));
    if is_wav {
        decode_wav(path)
    } else {
        decode_audio_ffmpeg(path)
    }
}

/// Decode a RIFF WAV file, normalizing integer PCM to `[-1, 1]`.
pub fn decode_wav(path: &Path) -> WavelockResult<SampleSource> {
    let reader = hound::WavReader::open(path).map_err(|e| {
        WavelockError::decode(format!("failed to open wav '{}': {e}", path.display()))
    })?;
    let spec = reader.spec();
    tracing::debug!(
        path = %path.display(),
        channels = spec.channels,
        sample_rate = spec.sample_rate,
        bits = spec.bits_per_sample,
        "decoding wav"
    );

    let interleaved = read_wav_samples(reader).map_err(|e| {
        WavelockError::decode(format!("corrupt wav data in '{}': {e}", path.display()))
    })?;
    SampleSource::from_interleaved(&interleaved, spec.channels, spec.sample_rate)
}

pub(crate) fn read_wav_samples<R: std::io::Read>(
    mut reader: hound::WavReader<R>,
) -> Result<Vec<f32>, hound::Error> {
    let spec = reader.spec();
    match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect(),
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect()
        }
    }
}

/// Decode any container `ffmpeg` understands into native-rate interleaved `f32`.
#[cfg(feature = "media-ffmpeg")]
pub fn decode_audio_ffmpeg(path: &Path) -> WavelockResult<SampleSource> {
    let (sample_rate, channels) = read_stream_info(path)?;
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            &channels.to_string(),
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| WavelockError::decode(format!("failed to run ffmpeg for decode: {e}")))?;

    if !out.status.success() {
        let msg = String::from_utf8_lossy(&out.stderr);
        return Err(WavelockError::decode(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            msg.trim()
        )));
    }
    if !out.stdout.len().is_multiple_of(4) {
        return Err(WavelockError::decode(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }

    let pcm: Vec<f32> = out
        .stdout
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    SampleSource::from_interleaved(&pcm, channels, sample_rate)
}

#[cfg(feature = "media-ffmpeg")]
fn read_stream_info(path: &Path) -> WavelockResult<(u32, u16)> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        sample_rate: Option<String>,
        channels: Option<u16>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "a:0",
            "-show_entries",
            "stream=sample_rate,channels",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .map_err(|e| WavelockError::decode(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(WavelockError::decode(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| WavelockError::decode(format!("invalid ffprobe output: {e}")))?;
    let stream = parsed.streams.into_iter().next().ok_or_else(|| {
        WavelockError::decode(format!("'{}' has no audio stream", path.display()))
    })?;
    let sample_rate = stream
        .sample_rate
        .and_then(|s| s.parse::<u32>().ok())
        .filter(|&r| r > 0)
        .ok_or_else(|| WavelockError::decode("ffprobe reported no sample rate"))?;
    let channels = stream
        .channels
        .filter(|&c| c > 0)
        .ok_or_else(|| WavelockError::decode("ffprobe reported no channels"))?;
    Ok((sample_rate, channels))
}

/// Decode any container `ffmpeg` understands into native-rate interleaved `f32`.
#[cfg(not(feature = "media-ffmpeg"))]
pub fn decode_audio_ffmpeg(path: &Path) -> WavelockResult<SampleSource> {
    Err(WavelockError::decode(format!(
        "'{}' is not a .wav file; other formats require the 'media-ffmpeg' feature",
        path.display()
    )))
}

#[cfg(test)]
#[path = "../../tests/unit/audio/decode.rs"]
mod tests;
