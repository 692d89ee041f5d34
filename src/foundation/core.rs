use crate::foundation::error::{WavelockError, WavelockResult};

/// Absolute 0-based output frame index within a render session.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Half-open frame range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// Inclusive range start.
    pub start: FrameIndex,
    /// Exclusive range end.
    pub end: FrameIndex, // exclusive
}

impl FrameRange {
    /// Create a validated range with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> WavelockResult<Self> {
        if start.0 > end.0 {
            return Err(WavelockError::config(
                "frame_range",
                "start must be <= end",
            ));
        }
        Ok(Self { start, end })
    }

    /// Number of frames contained in the range.
    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    /// Return `true` when the range has no frames.
    pub fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }

    /// Return `true` when `f` is inside `[start, end)`.
    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 < self.end.0
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32, // must be > 0
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> WavelockResult<Self> {
        if den == 0 {
            return Err(WavelockError::config("fps", "denominator must be > 0"));
        }
        if num == 0 {
            return Err(WavelockError::config("fps", "must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Convert seconds to frame count using ceil semantics, so a partial trailing frame is
    /// still rendered.
    pub fn secs_to_frames_ceil(self, secs: f64) -> u64 {
        (secs * self.as_f64()).ceil().max(0.0) as u64
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated canvas with non-zero dimensions.
    pub fn new(width: u32, height: u32) -> WavelockResult<Self> {
        if width == 0 {
            return Err(WavelockError::config("render.width", "must be > 0"));
        }
        if height == 0 {
            return Err(WavelockError::config("render.height", "must be > 0"));
        }
        Ok(Self { width, height })
    }

    /// Byte length of a BGRA8 buffer covering this canvas.
    pub fn bgra_len(self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }
}

/// Opaque-by-default BGRA8 color, the single internal color representation.
///
/// Field order matches the in-memory byte order of rendered frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Bgra8 {
    /// Blue channel.
    pub b: u8,
    /// Green channel.
    pub g: u8,
    /// Red channel.
    pub r: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Bgra8 {
    /// Fully opaque color from straight RGB components.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { b, g, r, a: 255 }
    }

    /// Bytes in frame order (`[b, g, r, a]`).
    pub const fn to_bytes(self) -> [u8; 4] {
        [self.b, self.g, self.r, self.a]
    }

    /// Parse a `#rrggbb` hex triplet into an opaque color.
    pub fn from_hex(s: &str) -> WavelockResult<Self> {
        crate::foundation::color::parse_hex(s)
            .map_err(|reason| WavelockError::config("color", reason))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
