//! # strata-nn
//!
//! Blocks with deferred shape inference for Strata.
//!
//! Provides:
//!
//! 1. **Module trait**: every block implements `forward()` and exposes its parameters
//! 2. **Dense**: fully connected `y = activation(xW^T + b)`, input width optional
//! 3. **Activation**: elementwise functions, as a Dense tag or a standalone block
//! 4. **Sequential**: ordered stack that resolves unknown widths left to right
//! 5. **NameScope**: explicit allocator of unique hierarchical names
//! 6. **ParameterDict**: ordered name → parameter view returned by `collect_parameters()`

pub mod activation;
pub mod dense;
pub mod module;
pub mod param_dict;
pub mod scope;
pub mod sequential;

pub use activation::{Activation, ActivationBlock};
pub use dense::Dense;
pub use module::Module;
pub use param_dict::ParameterDict;
pub use scope::NameScope;
pub use sequential::Sequential;
