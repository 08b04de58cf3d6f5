// Module trait: The interface every block implements
//
// A block (Dense, an activation, a Sequential stack) takes a 2-D batch and
// returns a 2-D batch. Unlike an eager framework, a block may not know its
// parameter shapes until it sees its first input, so `forward` takes
// `&mut self`: the first call is allowed to resolve shapes and allocate.
// The exclusive borrow also guarantees that at most one forward pass is in
// flight per block.
//
// NAMING:
//
// Blocks are named by the stack they are added to (see `NameScope`). A block
// that has not been added anywhere keeps its bare kind as its name, so its
// parameters are `{kind}_{role}` (`dense_weight`, `dense_bias`).

use std::fmt;
use std::rc::Rc;

use ndarray::Array2;
use strata_core::context::Context;
use strata_core::error::{Error, Result};
use strata_core::init::Initializer;
use strata_core::param::Parameter;

use crate::param_dict::ParameterDict;

/// The fundamental trait for all blocks.
///
/// Provides:
/// - `forward()`: compute output from input, resolving deferred shapes on first use
/// - `parameters()` / `parameters_mut()`: every owned parameter, in order
/// - `kind()` / `name()` / `set_name()`: naming hooks used by `Sequential::add`
/// - `initialize()` / `reinitialize()`: attach an initializer policy everywhere
/// - `collect_parameters()`: ordered name → parameter view
pub trait Module: fmt::Display {
    /// Compute the output batch from the input batch.
    fn forward(&mut self, x: &Array2<f32>) -> Result<Array2<f32>>;

    /// All parameters owned by this block, in a stable order.
    fn parameters(&self) -> Vec<&Parameter>;

    /// Mutable access to the same parameters, same order.
    fn parameters_mut(&mut self) -> Vec<&mut Parameter>;

    /// Layer type used to allocate names, e.g. `"dense"`.
    fn kind(&self) -> &'static str;

    /// The block's full name.
    fn name(&self) -> &str;

    /// Rename the block and, transitively, everything it owns.
    fn set_name(&mut self, name: String);

    /// Whether every owned parameter has storage.
    fn is_resolved(&self) -> bool {
        self.parameters().iter().all(|p| p.is_resolved())
    }

    /// Total number of scalar parameters that have been allocated so far.
    fn num_parameters(&self) -> usize {
        self.parameters()
            .iter()
            .filter_map(|p| p.num_elements())
            .sum()
    }

    /// Ordered mapping from fully-qualified name to parameter.
    ///
    /// Usable before resolution; unknown dimensions show up as `?`.
    fn collect_parameters(&self) -> ParameterDict<'_> {
        ParameterDict::new(self.parameters())
    }

    /// Attach `init` to every parameter that has not been resolved yet.
    ///
    /// Nothing is allocated here; storage appears on the first forward pass.
    /// Already-resolved parameters are left untouched.
    fn initialize(&mut self, init: Rc<dyn Initializer>, ctx: &Context) -> Result<()> {
        for p in self.parameters_mut() {
            if p.is_resolved() {
                log::debug!("skip initialization of resolved parameter {}", p.name());
                continue;
            }
            p.attach_initializer(Rc::clone(&init), ctx)?;
        }
        Ok(())
    }

    /// Explicitly re-initialize every parameter.
    ///
    /// Fails with [`Error::AlreadyResolved`] for the first parameter that
    /// already owns storage; in that case no policy is attached anywhere.
    fn reinitialize(&mut self, init: Rc<dyn Initializer>, ctx: &Context) -> Result<()> {
        if let Some(p) = self.parameters().into_iter().find(|p| p.is_resolved()) {
            return Err(Error::AlreadyResolved {
                name: p.name().to_string(),
            });
        }
        self.initialize(init, ctx)
    }
}
