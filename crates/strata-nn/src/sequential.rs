// Sequential: A chain of blocks with cascading shape inference
//
// Sequential is the simplest way to build a network: a list of blocks applied
// in order, each block's output becoming the next block's input.
//
// Example:
//   let mut names = NameScope::root();
//   let mut net = Sequential::new(&mut names)
//       .with(Dense::new(128).with_activation(Activation::Relu))
//       .with(Dense::new(10));
//   net.initialize(Rc::new(Normal::new(0.01)), &Context::cpu())?;
//   let y = net.forward(&x)?;   // resolves (128, 784) then (10, 128)
//
// THE CASCADE:
//
// Layer i+1's unknown input width is exactly layer i's output width. Running
// the layers strictly in order means layer i has resolved (and allocated) by
// the time layer i+1 observes its input, so a single forward pass resolves
// the whole stack left to right.
//
// NAMING:
//
// The stack owns a NameScope. `add` asks it for `{prefix}_{kind}{n}` and
// hands that name to the block before storing it, so names never depend on
// shapes and are fixed at append time.

use std::fmt;

use ndarray::Array2;
use strata_core::error::Result;
use strata_core::param::Parameter;

use crate::module::Module;
use crate::scope::NameScope;

const KIND: &str = "sequential";

/// A container that chains blocks sequentially.
///
/// Sequential itself implements Module, so it can be nested.
pub struct Sequential {
    scope: NameScope,
    layers: Vec<Box<dyn Module>>,
}

impl Sequential {
    /// Create an empty stack in a fresh child scope of `parent`.
    pub fn new(parent: &mut NameScope) -> Self {
        Self::with_scope(parent.enter_scope(KIND))
    }

    /// Create an empty stack that allocates names from `scope`.
    pub fn with_scope(scope: NameScope) -> Self {
        Sequential {
            scope,
            layers: Vec::new(),
        }
    }

    /// The prefix shared by every name in this stack.
    pub fn scope_name(&self) -> &str {
        self.scope.prefix()
    }

    /// Append a block, naming it at append time.
    pub fn add<M: Module + 'static>(&mut self, module: M) -> &mut Self {
        self.push(Box::new(module));
        self
    }

    /// Builder-style [`Sequential::add`].
    pub fn with<M: Module + 'static>(mut self, module: M) -> Self {
        self.push(Box::new(module));
        self
    }

    /// Append an already-boxed block.
    pub fn push(&mut self, mut module: Box<dyn Module>) {
        let name = self.scope.next_name(module.kind());
        log::trace!("{}: add {name}", self.scope_name());
        module.set_name(name);
        self.layers.push(module);
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// The block at position `index`.
    pub fn get(&self, index: usize) -> Option<&dyn Module> {
        self.layers.get(index).map(|l| l.as_ref())
    }

    /// Blocks in evaluation order.
    pub fn layers(&self) -> impl Iterator<Item = &dyn Module> + '_ {
        self.layers.iter().map(|l| l.as_ref())
    }
}

impl Module for Sequential {
    fn forward(&mut self, x: &Array2<f32>) -> Result<Array2<f32>> {
        let mut out = x.clone();
        for layer in &mut self.layers {
            let was_resolved = layer.is_resolved();
            out = layer.forward(&out)?;
            if !was_resolved && layer.is_resolved() {
                log::debug!(
                    "{}: {} resolved, output {:?}",
                    self.scope.prefix(),
                    layer.name(),
                    out.shape()
                );
            }
        }
        Ok(out)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        self.layers.iter().flat_map(|l| l.parameters()).collect()
    }

    fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        self.layers
            .iter_mut()
            .flat_map(|l| l.parameters_mut())
            .collect()
    }

    fn kind(&self) -> &'static str {
        KIND
    }

    fn name(&self) -> &str {
        self.scope.prefix()
    }

    /// Move the stack under a new prefix and rename every child from scratch.
    fn set_name(&mut self, name: String) {
        self.scope = NameScope::with_prefix(name);
        for layer in &mut self.layers {
            let child = self.scope.next_name(layer.kind());
            layer.set_name(child);
        }
    }
}

impl fmt::Display for Sequential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sequential(")?;
        for (i, layer) in self.layers.iter().enumerate() {
            let block = layer.to_string();
            let mut lines = block.lines();
            if let Some(first) = lines.next() {
                writeln!(f, "  ({i}): {first}")?;
            }
            for line in lines {
                writeln!(f, "  {line}")?;
            }
        }
        write!(f, ")")
    }
}
