// Dense: Fully-connected layer with deferred input width
//
//   y = activation(x @ W^T + b)
//
// `Dense::new(units)` fixes only the output width. The input width may be
// given up front with `with_in_units`, or left unknown and inferred from the
// first batch the layer sees.
//
// PARAMETER SHAPES:
//
//   weight: [units, in_units]   - declared as (units, ?) until inferred
//   bias:   [units]             - broadcast across the batch dimension
//
// DEFERRED RESOLUTION:
//
//   first forward with x: [batch, w]
//     in_units unknown → weight.resolve((units, w)), bias.resolve(units),
//                        in_units = w
//     in_units known   → w must equal in_units, else ShapeMismatch
//
// Resolution is one-way. Once the weight has storage the layer's input width
// is fixed for the rest of its life, and later calls never reallocate.

use std::fmt;

use ndarray::{Array2, Ix1, Ix2};
use strata_core::error::{Error, Result};
use strata_core::param::Parameter;
use strata_core::shape::{Dim, ParamShape, Shape};

use crate::activation::Activation;
use crate::module::Module;
use crate::scope::param_name;

const KIND: &str = "dense";

/// A fully-connected layer: `y = activation(x W^T + b)`.
///
/// # Examples
/// ```ignore
/// let mut layer = Dense::new(128).with_activation(Activation::Relu);
/// layer.initialize(Rc::new(Normal::new(0.01)), &Context::cpu())?;
/// let y = layer.forward(&x)?; // x: [32, 784] → y: [32, 128]
/// assert_eq!(layer.in_units(), Some(784));
/// ```
pub struct Dense {
    name: String,
    units: usize,
    in_units: Dim,
    activation: Activation,
    weight: Parameter,
    bias: Parameter,
}

impl Dense {
    /// Create a layer with `units` outputs and an unknown input width.
    ///
    /// # Panics
    /// If `units` is zero. Use [`Dense::try_new`] to get an error instead.
    pub fn new(units: usize) -> Self {
        match Self::try_new(units) {
            Ok(layer) => layer,
            Err(e) => panic!("{e}"),
        }
    }

    /// Fallible constructor: rejects a zero output width.
    pub fn try_new(units: usize) -> Result<Self> {
        if units == 0 {
            return Err(Error::config("Dense output width must be positive"));
        }
        Ok(Dense {
            name: KIND.to_string(),
            units,
            in_units: Dim::Unknown,
            activation: Activation::Identity,
            weight: Parameter::new(
                param_name(KIND, "weight"),
                vec![Dim::Known(units), Dim::Unknown],
            ),
            bias: Parameter::new(param_name(KIND, "bias"), Shape::from(units)),
        })
    }

    /// Fix the input width up front instead of inferring it.
    ///
    /// # Panics
    /// If `in_units` is zero.
    pub fn with_in_units(mut self, in_units: usize) -> Self {
        assert!(in_units > 0, "Dense input width must be positive");
        self.in_units = Dim::Known(in_units);
        self.weight = Parameter::new(
            self.weight.name().to_string(),
            ParamShape::from(Shape::from((self.units, in_units))),
        );
        self
    }

    /// Apply `activation` to the affine output.
    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    /// The output width.
    pub fn units(&self) -> usize {
        self.units
    }

    /// The input width, once known.
    pub fn in_units(&self) -> Option<usize> {
        self.in_units.size()
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn weight(&self) -> &Parameter {
        &self.weight
    }

    pub fn bias(&self) -> &Parameter {
        &self.bias
    }

    /// Resolve both parameters for an input of `width` columns.
    ///
    /// The input width is committed as soon as the weight has storage, so a
    /// failure on the bias leaves the layer retryable with the same width.
    fn resolve(&mut self, width: usize) -> Result<()> {
        if width == 0 {
            return Err(Error::config(format!(
                "layer '{}' cannot infer a zero input width",
                self.name
            )));
        }
        self.weight.resolve((self.units, width))?;
        if !self.in_units.is_known() {
            log::debug!("{}: inferred in_units = {width}", self.name);
        }
        self.in_units = Dim::Known(width);
        self.bias.resolve(self.units)
    }
}

impl Module for Dense {
    /// Forward pass: y = activation(x @ W^T + b)
    ///
    /// Input shape:  [batch, in_units]
    /// Output shape: [batch, units]
    fn forward(&mut self, x: &Array2<f32>) -> Result<Array2<f32>> {
        let width = x.ncols();
        if let Dim::Known(expected) = self.in_units {
            if width != expected {
                return Err(Error::ShapeMismatch {
                    layer: self.name.clone(),
                    expected,
                    got: width,
                });
            }
        }
        if !(self.weight.is_resolved() && self.bias.is_resolved()) {
            self.resolve(width)?;
        }

        log::trace!("{}: forward {:?}", self.name, x.shape());
        let w = self.weight.value()?.view().into_dimensionality::<Ix2>()?;
        let b = self.bias.value()?.view().into_dimensionality::<Ix1>()?;

        // x: [batch, in] @ W^T: [in, units] → [batch, units], bias broadcast over rows
        let mut out = x.dot(&w.t()) + &b;
        self.activation.apply_inplace(&mut out);
        Ok(out)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        vec![&self.weight, &self.bias]
    }

    fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        vec![&mut self.weight, &mut self.bias]
    }

    fn kind(&self) -> &'static str {
        KIND
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.weight.set_name(param_name(&name, "weight"));
        self.bias.set_name(param_name(&name, "bias"));
        self.name = name;
    }
}

impl fmt::Display for Dense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.in_units {
            Dim::Known(n) => write!(f, "Dense({n} -> {}, ", self.units)?,
            Dim::Unknown => write!(f, "Dense(None -> {}, ", self.units)?,
        }
        match self.activation {
            Activation::Identity => write!(f, "linear)"),
            act => write!(f, "{act})"),
        }
    }
}
