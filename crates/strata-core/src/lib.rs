//! # strata-core
//!
//! Core primitives for Strata's deferred-shape parameters.
//!
//! This crate provides:
//! - [`Parameter`]: a named learnable tensor slot whose shape may be resolved lazily
//! - [`Dim`] / [`ParamShape`] / [`Shape`]: partial and concrete shapes
//! - [`Initializer`]: policies that fill storage once a shape is known
//! - [`Context`]: device tag and shared (optionally seeded) random stream
//! - [`Error`] / [`Result`]: the single error type used across Strata
//
// Storage is plain `ndarray::ArrayD<f32>`; this crate never implements
// array arithmetic itself.

pub mod context;
pub mod error;
pub mod init;
pub mod param;
pub mod shape;

pub use context::{Context, Device};
pub use error::{Error, Result};
pub use init::{
    Constant, FanMode, Initializer, Kaiming, Normal, Ones, Sampling, Uniform, Xavier, Zeros,
};
pub use param::Parameter;
pub use shape::{Dim, ParamShape, Shape};
