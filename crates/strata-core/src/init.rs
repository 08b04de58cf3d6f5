// init: Parameter initialization policies
//
// An initializer is a rule for filling freshly allocated parameter storage.
// Policies are attached to parameters long before their shape is known, so
// every policy is an object implementing `Initializer` that only sees the
// concrete shape at resolution time.
//
// AVAILABLE POLICIES:
//
//   Zeros / Ones / Constant(v)     - deterministic fills
//   Uniform { scale }              - U(-scale, scale), default scale 0.07
//   Normal { sigma }               - N(0, sigma), default sigma 0.01
//   Xavier { gain, distribution }  - Glorot: a = gain * sqrt(6 / (fan_in + fan_out))
//   Kaiming { .. }                 - He: bound = sqrt(3 * gain² / fan)
//
// The random stream is passed in by the caller (see `Context`), which keeps
// every policy a pure function of (shape, rng).

use std::fmt;

use ndarray::{ArrayD, IxDyn};
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal as NormalDist, Uniform as UniformDist};

use crate::error::{Error, Result};
use crate::shape::Shape;

/// A rule mapping a concrete shape to filled storage.
pub trait Initializer: fmt::Debug {
    /// Produce an array of exactly `shape`.
    fn init(&self, shape: &Shape, rng: &mut StdRng) -> Result<ArrayD<f32>>;

    /// Short policy name used in logs.
    fn name(&self) -> &'static str;
}

/// Fan computation mode for Kaiming initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FanMode {
    /// Use fan_in (input features). Preserves variance in the forward pass.
    #[default]
    FanIn,
    /// Use fan_out (output features).
    FanOut,
}

/// Sampling distribution for the scaled initializers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sampling {
    #[default]
    Uniform,
    Normal,
}

/// Compute (fan_in, fan_out) from a shape.
///
/// - 0-D: (1, 1)
/// - 1-D: fan_in = fan_out = dims[0]
/// - 2-D `[out, in]`: fan_in = dims[1], fan_out = dims[0]
fn compute_fans(shape: &Shape) -> Result<(f32, f32)> {
    let dims = shape.dims();
    match dims.len() {
        0 => Ok((1.0, 1.0)),
        1 => Ok((dims[0] as f32, dims[0] as f32)),
        2 => Ok((dims[1] as f32, dims[0] as f32)),
        n => Err(Error::RankMismatch {
            expected: 2,
            got: n,
        }),
    }
}

// rand panics on non-finite bounds and on ranges whose width overflows f32,
// so both are reported as configuration errors here.
fn fill_uniform(shape: &Shape, low: f32, high: f32, rng: &mut StdRng) -> Result<ArrayD<f32>> {
    if low.is_nan() || high.is_nan() || low > high {
        return Err(Error::config(format!(
            "uniform range [{low}, {high}] is empty"
        )));
    }
    if !(high - low).is_finite() {
        return Err(Error::config(format!(
            "uniform range [{low}, {high}] is not finite"
        )));
    }
    let dist = UniformDist::new_inclusive(low, high);
    Ok(ArrayD::from_shape_fn(IxDyn(shape.dims()), |_| {
        dist.sample(rng)
    }))
}

fn fill_normal(shape: &Shape, mean: f32, std: f32, rng: &mut StdRng) -> Result<ArrayD<f32>> {
    if !mean.is_finite() || !std.is_finite() {
        return Err(Error::config(format!(
            "normal(mean={mean}, std={std}) is not finite"
        )));
    }
    let dist = NormalDist::new(mean, std)
        .map_err(|e| Error::config(format!("normal(mean={mean}, std={std}): {e}")))?;
    Ok(ArrayD::from_shape_fn(IxDyn(shape.dims()), |_| {
        dist.sample(rng)
    }))
}

/// All elements zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct Zeros;

impl Initializer for Zeros {
    fn init(&self, shape: &Shape, _rng: &mut StdRng) -> Result<ArrayD<f32>> {
        Ok(ArrayD::zeros(IxDyn(shape.dims())))
    }
    fn name(&self) -> &'static str {
        "zeros"
    }
}

/// All elements one.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ones;

impl Initializer for Ones {
    fn init(&self, shape: &Shape, _rng: &mut StdRng) -> Result<ArrayD<f32>> {
        Ok(ArrayD::ones(IxDyn(shape.dims())))
    }
    fn name(&self) -> &'static str {
        "ones"
    }
}

/// All elements set to one value.
#[derive(Debug, Clone, Copy)]
pub struct Constant(pub f32);

impl Initializer for Constant {
    fn init(&self, shape: &Shape, _rng: &mut StdRng) -> Result<ArrayD<f32>> {
        Ok(ArrayD::from_elem(IxDyn(shape.dims()), self.0))
    }
    fn name(&self) -> &'static str {
        "constant"
    }
}

/// Uniform samples in `[-scale, scale]`.
#[derive(Debug, Clone, Copy)]
pub struct Uniform {
    pub scale: f32,
}

impl Uniform {
    pub fn new(scale: f32) -> Self {
        Uniform { scale }
    }
}

impl Default for Uniform {
    fn default() -> Self {
        Uniform { scale: 0.07 }
    }
}

impl Initializer for Uniform {
    fn init(&self, shape: &Shape, rng: &mut StdRng) -> Result<ArrayD<f32>> {
        if self.scale < 0.0 {
            return Err(Error::config(format!(
                "uniform scale must be non-negative, got {}",
                self.scale
            )));
        }
        fill_uniform(shape, -self.scale, self.scale, rng)
    }
    fn name(&self) -> &'static str {
        "uniform"
    }
}

/// Normal samples with zero mean and standard deviation `sigma`.
#[derive(Debug, Clone, Copy)]
pub struct Normal {
    pub sigma: f32,
}

impl Normal {
    pub fn new(sigma: f32) -> Self {
        Normal { sigma }
    }
}

impl Default for Normal {
    fn default() -> Self {
        Normal { sigma: 0.01 }
    }
}

impl Initializer for Normal {
    fn init(&self, shape: &Shape, rng: &mut StdRng) -> Result<ArrayD<f32>> {
        fill_normal(shape, 0.0, self.sigma, rng)
    }
    fn name(&self) -> &'static str {
        "normal"
    }
}

/// Xavier (Glorot) initialization.
///
/// Uniform: U(-a, a) with a = gain * sqrt(6 / (fan_in + fan_out)).
/// Normal: N(0, std) with std = gain * sqrt(2 / (fan_in + fan_out)).
#[derive(Debug, Clone, Copy)]
pub struct Xavier {
    pub gain: f32,
    pub distribution: Sampling,
}

impl Default for Xavier {
    fn default() -> Self {
        Xavier {
            gain: 1.0,
            distribution: Sampling::Uniform,
        }
    }
}

impl Initializer for Xavier {
    fn init(&self, shape: &Shape, rng: &mut StdRng) -> Result<ArrayD<f32>> {
        let (fan_in, fan_out) = compute_fans(shape)?;
        let fan_sum = fan_in + fan_out;
        if fan_sum <= 0.0 {
            return Err(Error::config(format!("xavier: zero fan for shape {shape}")));
        }
        match self.distribution {
            Sampling::Uniform => {
                let a = self.gain * (6.0 / fan_sum).sqrt();
                fill_uniform(shape, -a, a, rng)
            }
            Sampling::Normal => {
                let std = self.gain * (2.0 / fan_sum).sqrt();
                fill_normal(shape, 0.0, std, rng)
            }
        }
    }
    fn name(&self) -> &'static str {
        "xavier"
    }
}

/// Kaiming (He) initialization, designed for rectifier activations.
///
/// `negative_slope` is 0 for ReLU; gain² = 2 / (1 + slope²).
#[derive(Debug, Clone, Copy, Default)]
pub struct Kaiming {
    pub negative_slope: f32,
    pub mode: FanMode,
    pub distribution: Sampling,
}

impl Initializer for Kaiming {
    fn init(&self, shape: &Shape, rng: &mut StdRng) -> Result<ArrayD<f32>> {
        let (fan_in, fan_out) = compute_fans(shape)?;
        let fan = match self.mode {
            FanMode::FanIn => fan_in,
            FanMode::FanOut => fan_out,
        };
        if fan <= 0.0 {
            return Err(Error::config(format!("kaiming: zero fan for shape {shape}")));
        }
        let gain_sq = 2.0 / (1.0 + self.negative_slope * self.negative_slope);
        match self.distribution {
            Sampling::Uniform => {
                let bound = (3.0 * gain_sq / fan).sqrt();
                fill_uniform(shape, -bound, bound, rng)
            }
            Sampling::Normal => fill_normal(shape, 0.0, (gain_sq / fan).sqrt(), rng),
        }
    }
    fn name(&self) -> &'static str {
        "kaiming"
    }
}
