//! # Strata
//!
//! Neural-network blocks whose parameter shapes are inferred from the first
//! batch they see.
//!
//! This is the top-level facade crate that re-exports everything you need.
//!
//! ## Usage
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use strata::ndarray::Array2;
//! use strata::prelude::*;
//!
//! fn main() -> strata::Result<()> {
//!     let mut names = NameScope::root();
//!     let mut net = Sequential::new(&mut names)
//!         .with(Dense::new(128).with_activation(Activation::Relu))
//!         .with(Dense::new(10));
//!     net.initialize(Rc::new(Normal::new(0.01)), &Context::seeded(0))?;
//!
//!     let y = net.forward(&Array2::zeros((64, 784)))?;
//!     assert_eq!(y.dim(), (64, 10));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! | Crate | Purpose |
//! |-------|---------|
//! | `strata-core` | Parameter, Dim/ParamShape/Shape, initializers, Context, Error |
//! | `strata-nn` | Module trait, Dense, Activation, Sequential, NameScope |
//!
//! ## Modules
//!
//! - [`summary`]: parameter tables for a block, before or after resolution

/// The array crate used for batches and parameter storage.
pub use ndarray;

/// Re-export core types.
pub use strata_core::{
    init, Context, Device, Dim, Error, Initializer, ParamShape, Parameter, Result, Shape,
};

/// Re-export blocks.
pub mod nn {
    pub use strata_nn::*;
}

/// Model summary: parameter counts and shapes.
pub mod summary;

/// Prelude: import this for the most common types.
pub mod prelude {
    pub use crate::init::{
        Constant, FanMode, Kaiming, Normal, Ones, Sampling, Uniform, Xavier, Zeros,
    };
    pub use crate::nn::{
        Activation, ActivationBlock, Dense, Module, NameScope, ParameterDict, Sequential,
    };
    pub use crate::summary::ModelSummary;
    pub use crate::{Context, Dim, Error, Initializer, ParamShape, Parameter, Result, Shape};
}
