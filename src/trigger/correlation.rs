use crate::audio::source::SampleSource;
use crate::foundation::error::{WavelockError, WavelockResult};
use crate::trigger::{EdgeDirection, Trigger, TriggerConfig, WindowAnchor};

const EPS: f64 = 1e-9;

/// Stateful aligner that locks each window onto an adaptively updated reference shape.
///
/// Each call:
/// 1. scores every offset in `[-radius, +radius]` by normalized cross-correlation against the
///    reference (ties prefer the smallest `|d|`, then the leftmost `d`),
/// 2. optionally snaps to the nearest configured zero crossing; the total correction never
///    exceeds the search radius,
/// 3. blends the chosen (mean-removed) window into the reference.
///
/// All offsets are in window slots; one slot is `stride` full-rate samples.
#[derive(Clone, Debug)]
pub struct CorrelationTrigger {
    length: usize,
    stride: usize,
    radius: usize,
    responsiveness: f32,
    edge: Option<EdgeDirection>,
    anchor: WindowAnchor,

    reference: Option<Vec<f32>>,

    span: Vec<f32>,
    edge_span: Vec<f32>,
    window: Vec<f32>,
}

impl CorrelationTrigger {
    /// Create a trigger for windows of `length` slots spaced `stride` samples apart.
    pub fn new(cfg: &TriggerConfig, length: usize, stride: usize) -> WavelockResult<Self> {
        if length == 0 {
            return Err(WavelockError::config(
                "trigger_ms",
                "trigger window must contain at least one sample",
            ));
        }
        if stride == 0 {
            return Err(WavelockError::config("trigger_subsampling", "must be >= 1"));
        }
        cfg.validate("trigger")?;

        let radius_samples = cfg
            .search_radius
            .map(|r| r as usize)
            .unwrap_or(length * stride / 2);
        let radius = radius_samples / stride;

        Ok(Self {
            length,
            stride,
            radius,
            responsiveness: cfg.responsiveness,
            edge: cfg.edge,
            anchor: cfg.anchor,
            reference: None,
            span: vec![0.0; length + 2 * radius],
            edge_span: vec![0.0; 2 * radius + 2],
            window: vec![0.0; length],
        })
    }

    /// Current reference shape, `None` before the first call.
    pub fn reference(&self) -> Option<&[f32]> {
        self.reference.as_deref()
    }

    /// Search radius in window slots.
    pub fn radius(&self) -> usize {
        self.radius
    }

    fn window_start(&self, trigger: i64) -> i64 {
        trigger + self.anchor.start_offset(self.length) * self.stride as i64
    }

    fn best_offset(&self, reference: &[f32]) -> i64 {
        let ref_norm = norm(reference);
        if ref_norm <= EPS {
            return 0;
        }

        let r = self.radius as i64;
        let center = &self.span[self.radius..self.radius + self.length];
        if centered_norm(center) <= EPS {
            return 0;
        }

        let mut best = (0i64, f64::NEG_INFINITY);
        // Preference order 0, -1, +1, -2, +2, ..: a strict `>` keeps the earliest on ties.
        for d in std::iter::once(0).chain((1..=r).flat_map(|m| [-m, m])) {
            let start = (r + d) as usize;
            let candidate = &self.span[start..start + self.length];
            let score = similarity(candidate, reference, ref_norm);
            if score > best.1 {
                best = (d, score);
            }
        }
        best.0
    }

    /// Nearest crossing around `nominal + d * stride`, limited so that `d + k` stays within
    /// the search radius.
    fn refine_edge(
        &mut self,
        source: &SampleSource,
        nominal: i64,
        d: i64,
        edge: EdgeDirection,
    ) -> i64 {
        let s = self.stride as i64;
        let r = self.radius as i64;
        let trigger = nominal + d * s;
        source.read_window_into(self.window_start(trigger), self.stride, &mut self.window);
        let level = mean(&self.window);

        source.read_window_into(trigger - (r + 1) * s, self.stride, &mut self.edge_span);
        // edge_span[r + 1 + k] holds the slot at `trigger + k * stride`.
        for k in std::iter::once(0).chain((1..=r).flat_map(|m| [-m, m])) {
            if (d + k).abs() > r {
                continue;
            }
            let prev = f64::from(self.edge_span[(r + k) as usize]) - level;
            let cur = f64::from(self.edge_span[(r + 1 + k) as usize]) - level;
            let crossed = match edge {
                EdgeDirection::Rising => prev < 0.0 && cur >= 0.0,
                EdgeDirection::Falling => prev > 0.0 && cur <= 0.0,
            };
            if crossed {
                return k;
            }
        }
        0
    }
}

impl Trigger for CorrelationTrigger {
    fn get_trigger(&mut self, source: &SampleSource, nominal: i64) -> i64 {
        let s = self.stride as i64;
        let span_start = self.window_start(nominal) - self.radius as i64 * s;
        source.read_window_into(span_start, self.stride, &mut self.span);

        let Some(reference) = self.reference.take() else {
            let mut initial = self.span[self.radius..self.radius + self.length].to_vec();
            remove_mean(&mut initial);
            self.reference = Some(initial);
            return nominal;
        };

        let mut offset = self.best_offset(&reference);
        if let Some(edge) = self.edge {
            offset += self.refine_edge(source, nominal, offset, edge);
        }
        let trigger = nominal + offset * s;

        source.read_window_into(self.window_start(trigger), self.stride, &mut self.window);
        remove_mean(&mut self.window);
        let mut reference = reference;
        let k = self.responsiveness;
        for (r, &w) in reference.iter_mut().zip(&self.window) {
            *r = (1.0 - k) * *r + k * w;
        }
        self.reference = Some(reference);

        trigger
    }
}

fn mean(xs: &[f32]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().map(|&x| f64::from(x)).sum::<f64>() / xs.len() as f64
}

fn remove_mean(xs: &mut [f32]) {
    let m = mean(xs) as f32;
    for x in xs {
        *x -= m;
    }
}

fn norm(xs: &[f32]) -> f64 {
    xs.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>().sqrt()
}

fn centered_norm(xs: &[f32]) -> f64 {
    let m = mean(xs);
    xs.iter()
        .map(|&x| {
            let c = f64::from(x) - m;
            c * c
        })
        .sum::<f64>()
        .sqrt()
}

/// Normalized cross-correlation of the mean-removed `candidate` against a zero-mean reference.
fn similarity(candidate: &[f32], reference: &[f32], ref_norm: f64) -> f64 {
    let m = mean(candidate);
    let mut dot = 0.0;
    let mut energy = 0.0;
    for (&c, &r) in candidate.iter().zip(reference) {
        let c = f64::from(c) - m;
        dot += c * f64::from(r);
        energy += c * c;
    }
    dot / (energy.sqrt() * ref_norm + EPS)
}

#[cfg(test)]
#[path = "../../tests/unit/trigger/correlation.rs"]
mod tests;
