use smallvec::SmallVec;

use crate::foundation::error::{WavelockError, WavelockResult};

/// Decoded audio for one rendered channel.
///
/// Holds every decoded audio channel plus a precomputed mono downmix. All windowed reads go
/// through the downmix and never fail: positions outside `[0, total_length())` read as silence.
#[derive(Clone, Debug)]
pub struct SampleSource {
    channels: Vec<Vec<f32>>,
    mono: Vec<f32>,
    sample_rate: u32,
}

impl SampleSource {
    /// Build a source from per-channel sample sequences of equal length.
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> WavelockResult<Self> {
        if sample_rate == 0 {
            return Err(WavelockError::decode("sample rate must be > 0"));
        }
        let Some(first) = channels.first() else {
            return Err(WavelockError::decode("audio has no channels"));
        };
        let frames = first.len();
        if let Some(idx) = channels.iter().position(|c| c.len() != frames) {
            return Err(WavelockError::decode(format!(
                "channel {idx} has {} frames, expected {frames}",
                channels[idx].len()
            )));
        }

        let mono = downmix(&channels, frames);
        Ok(Self {
            channels,
            mono,
            sample_rate,
        })
    }

    /// Build a single-channel source.
    pub fn from_mono(samples: Vec<f32>, sample_rate: u32) -> WavelockResult<Self> {
        Self::from_channels(vec![samples], sample_rate)
    }

    /// Build a source from interleaved frames (`[c0, c1, .., c0, c1, ..]`).
    pub fn from_interleaved(
        interleaved: &[f32],
        channel_count: u16,
        sample_rate: u32,
    ) -> WavelockResult<Self> {
        let n = usize::from(channel_count);
        if n == 0 {
            return Err(WavelockError::decode("audio has no channels"));
        }
        if !interleaved.len().is_multiple_of(n) {
            return Err(WavelockError::decode(format!(
                "interleaved sample count {} is not a multiple of {n} channels",
                interleaved.len()
            )));
        }

        let frames = interleaved.len() / n;
        let mut channels = vec![Vec::with_capacity(frames); n];
        for frame in interleaved.chunks_exact(n) {
            for (dst, &s) in channels.iter_mut().zip(frame) {
                dst.push(s);
            }
        }
        Self::from_channels(channels, sample_rate)
    }

    /// Number of audio frames (samples per channel).
    pub fn total_length(&self) -> usize {
        self.mono.len()
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of decoded audio channels before downmix.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.total_length() as f64 / f64::from(self.sample_rate)
    }

    /// Mean across channels per audio frame.
    pub fn downmix_to_mono(&self) -> &[f32] {
        &self.mono
    }

    /// Read exactly `length` mono samples starting at `start`, zero-padded out of bounds.
    pub fn read_window(&self, start: i64, length: usize) -> Vec<f32> {
        self.read_window_strided(start, length, 1)
    }

    /// Read `length` mono samples at `start, start + stride, ..`, zero-padded out of bounds.
    pub fn read_window_strided(&self, start: i64, length: usize, stride: usize) -> Vec<f32> {
        let mut out = vec![0.0; length];
        self.read_window_into(start, stride, &mut out);
        out
    }

    /// Fill `out` from `start` at `stride`; positions outside the stream become `0.0`.
    pub fn read_window_into(&self, start: i64, stride: usize, out: &mut [f32]) {
        read_padded(&self.mono, start, stride.max(1), out);
    }

    /// Read a window from one decoded channel, bypassing the downmix.
    pub fn read_channel_window(
        &self,
        channel: usize,
        start: i64,
        length: usize,
    ) -> WavelockResult<Vec<f32>> {
        let data = self.channels.get(channel).ok_or_else(|| {
            WavelockError::render(format!(
                "channel {channel} out of range (source has {})",
                self.channels.len()
            ))
        })?;
        let mut out = vec![0.0; length];
        read_padded(data, start, 1, &mut out);
        Ok(out)
    }
}

fn read_padded(data: &[f32], start: i64, stride: usize, out: &mut [f32]) {
    let len = data.len() as i64;
    if stride == 1 {
        out.fill(0.0);
        let lo = start.max(0);
        let hi = start.saturating_add(out.len() as i64).min(len);
        if lo < hi {
            let dst = (lo - start) as usize;
            let n = (hi - lo) as usize;
            out[dst..dst + n].copy_from_slice(&data[lo as usize..hi as usize]);
        }
        return;
    }

    let stride = stride as i64;
    for (i, slot) in out.iter_mut().enumerate() {
        // Overflowing positions lie past either end of the stream.
        let pos = (i as i64)
            .checked_mul(stride)
            .and_then(|off| start.checked_add(off));
        *slot = match pos {
            Some(pos) if (0..len).contains(&pos) => data[pos as usize],
            _ => 0.0,
        };
    }
}

fn downmix(channels: &[Vec<f32>], frames: usize) -> Vec<f32> {
    if let [only] = channels {
        return only.clone();
    }

    // Summing a sorted copy keeps the result independent of channel storage order.
    let n = channels.len() as f64;
    let mut frame = SmallVec::<[f32; 8]>::with_capacity(channels.len());
    let mut out = Vec::with_capacity(frames);
    for i in 0..frames {
        frame.clear();
        frame.extend(channels.iter().map(|c| c[i]));
        frame.sort_by(f32::total_cmp);
        let sum: f64 = frame.iter().map(|&s| f64::from(s)).sum();
        out.push((sum / n) as f32);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/audio/source.rs"]
mod tests;
