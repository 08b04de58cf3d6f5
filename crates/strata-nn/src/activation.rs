// Activations: elementwise functions, usable as a Dense tag or a block
//
// `Dense::with_activation(Activation::Relu)` fuses the activation into the
// layer; `seq.add(ActivationBlock::new(Activation::Relu))` appends it as its
// own block. As a block it has no parameters and preserves the batch width,
// so it is transparent to shape inference. It still takes a unique name from
// the stack it joins, like any other layer.

use std::fmt;

use ndarray::Array2;
use strata_core::error::Result;
use strata_core::param::Parameter;

use crate::module::Module;

/// Elementwise activation function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activation {
    /// f(x) = x
    #[default]
    Identity,
    /// max(0, x)
    Relu,
    /// 1 / (1 + e^(-x))
    Sigmoid,
    Tanh,
    /// Softplus: ln(1 + e^x)
    SoftRelu,
}

impl Activation {
    /// Apply the function to a single value.
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Activation::Identity => x,
            Activation::Relu => x.max(0.0),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
            // ln(1 + e^x) = max(x, 0) + ln(1 + e^-|x|), stable for large |x|
            Activation::SoftRelu => x.max(0.0) + (-x.abs()).exp().ln_1p(),
        }
    }

    /// Apply the function in place over a batch.
    pub fn apply_inplace(self, x: &mut Array2<f32>) {
        if self != Activation::Identity {
            x.mapv_inplace(|v| self.apply(v));
        }
    }

    /// Name used in block names and printouts.
    pub fn as_str(self) -> &'static str {
        match self {
            Activation::Identity => "identity",
            Activation::Relu => "relu",
            Activation::Sigmoid => "sigmoid",
            Activation::Tanh => "tanh",
            Activation::SoftRelu => "softrelu",
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Activation({})", self.as_str())
    }
}

/// An [`Activation`] as a standalone, parameter-free block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationBlock {
    name: String,
    activation: Activation,
}

impl ActivationBlock {
    /// An unnamed block; its name is the activation's kind until it is added
    /// to a stack.
    pub fn new(activation: Activation) -> Self {
        ActivationBlock {
            name: activation.as_str().to_string(),
            activation,
        }
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }
}

impl From<Activation> for ActivationBlock {
    fn from(activation: Activation) -> Self {
        ActivationBlock::new(activation)
    }
}

impl fmt::Display for ActivationBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.activation, f)
    }
}

impl Module for ActivationBlock {
    fn forward(&mut self, x: &Array2<f32>) -> Result<Array2<f32>> {
        let mut out = x.clone();
        self.activation.apply_inplace(&mut out);
        Ok(out)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        vec![]
    }

    fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        vec![]
    }

    fn kind(&self) -> &'static str {
        self.activation.as_str()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_relu() {
        let mut act = ActivationBlock::new(Activation::Relu);
        let y = act.forward(&array![[-1.0, 0.0, 2.5]]).unwrap();
        assert_eq!(y, array![[0.0, 0.0, 2.5]]);
    }

    #[test]
    fn test_sigmoid_midpoint() {
        assert!((Activation::Sigmoid.apply(0.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_softrelu_is_stable() {
        assert!((Activation::SoftRelu.apply(0.0) - 2f32.ln()).abs() < 1e-6);
        assert!((Activation::SoftRelu.apply(100.0) - 100.0).abs() < 1e-4);
        assert!(Activation::SoftRelu.apply(-100.0) >= 0.0);
    }

    #[test]
    fn test_identity_is_default() {
        assert_eq!(Activation::default(), Activation::Identity);
        assert_eq!(Activation::Identity.apply(-3.0), -3.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Activation::Relu.to_string(), "Activation(relu)");
        assert_eq!(
            ActivationBlock::new(Activation::Tanh).to_string(),
            "Activation(tanh)"
        );
    }

    #[test]
    fn test_block_name_defaults_to_kind() {
        let mut block = ActivationBlock::from(Activation::Sigmoid);
        assert_eq!(block.name(), "sigmoid");
        assert!(block.parameters().is_empty());
        block.set_name("sequential0_sigmoid0".into());
        assert_eq!(block.name(), "sequential0_sigmoid0");
        assert_eq!(block.kind(), "sigmoid");
    }
}
