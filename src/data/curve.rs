//! Keyframe Curves
//!
//! Authored balance curves (ability scaling, XP requirements) are keyframe
//! curves evaluated with cubic Hermite interpolation, the same model used by
//! common engine animation curves. Outside the key range the curve clamps to
//! the first/last key value.
//!
//! In RON a curve can be written either as explicit keys or as a linear
//! shorthand:
//!
//! ```ron
//! Linear(from: (1.0, 0.0), to: (4.0, 100.0))
//! Keys([(time: 1.0, value: 0.0), (time: 4.0, value: 100.0, in_tangent: 40.0)])
//! ```

use serde::Deserialize;

/// A single curve key. Tangents are slopes (value per unit time).
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
    #[serde(default)]
    pub in_tangent: f32,
    #[serde(default)]
    pub out_tangent: f32,
}

impl Keyframe {
    pub fn new(time: f32, value: f32, in_tangent: f32, out_tangent: f32) -> Self {
        Self {
            time,
            value,
            in_tangent,
            out_tangent,
        }
    }
}

/// Authoring formats accepted for a curve.
#[derive(Clone, Debug, Deserialize)]
enum CurveSpec {
    Linear { from: (f32, f32), to: (f32, f32) },
    Constant(f32),
    Keys(Vec<Keyframe>),
}

impl From<CurveSpec> for Curve {
    fn from(spec: CurveSpec) -> Self {
        match spec {
            CurveSpec::Linear { from, to } => Curve::linear(from.0, from.1, to.0, to.1),
            CurveSpec::Constant(value) => Curve::constant(value),
            CurveSpec::Keys(keys) => Curve::from_keys(keys),
        }
    }
}

/// Piecewise cubic Hermite curve.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(from = "CurveSpec")]
pub struct Curve {
    keys: Vec<Keyframe>,
}

impl Curve {
    /// Build a curve from keys. Keys are sorted by time.
    pub fn from_keys(mut keys: Vec<Keyframe>) -> Self {
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// Straight line between two points (both tangents equal the slope).
    pub fn linear(time_start: f32, value_start: f32, time_end: f32, value_end: f32) -> Self {
        if time_start == time_end {
            return Self::constant(value_start);
        }
        let slope = (value_end - value_start) / (time_end - time_start);
        Self::from_keys(vec![
            Keyframe::new(time_start, value_start, 0.0, slope),
            Keyframe::new(time_end, value_end, slope, 0.0),
        ])
    }

    pub fn constant(value: f32) -> Self {
        Self {
            keys: vec![Keyframe::new(0.0, value, 0.0, 0.0)],
        }
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    /// Sample the curve at `time`. An empty curve evaluates to 0.
    pub fn evaluate(&self, time: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };

        if time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }

        // Keys are sorted, so the first key past `time` closes the segment
        let upper = self
            .keys
            .iter()
            .position(|k| k.time > time)
            .unwrap_or(self.keys.len() - 1);
        let a = self.keys[upper - 1];
        let b = self.keys[upper];
        hermite(a, b, time)
    }
}

fn hermite(a: Keyframe, b: Keyframe, time: f32) -> f32 {
    let span = b.time - a.time;
    if span <= f32::EPSILON {
        return b.value;
    }
    let t = (time - a.time) / span;
    let t2 = t * t;
    let t3 = t2 * t;

    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;

    h00 * a.value + h10 * span * a.out_tangent + h01 * b.value + h11 * span * b.in_tangent
}
