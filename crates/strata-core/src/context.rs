// Context: where parameters live and where their randomness comes from
//
// Parameters are initialized lazily: the policy is attached long before the
// storage exists. The Context captured at attach time is what the parameter
// uses when it finally resolves, so it has to carry its own random stream.
//
// Clones share one StdRng. With `Context::seeded(seed)` the whole network is
// reproducible as long as layers are resolved in the same order, which is
// always the case for a sequential stack.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Compute device. Only host memory is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Device {
    #[default]
    Cpu,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu(0)"),
        }
    }
}

/// Device plus the shared random stream used by initializers.
#[derive(Clone)]
pub struct Context {
    device: Device,
    seed: Option<u64>,
    rng: Rc<RefCell<StdRng>>,
}

impl Context {
    /// Host context seeded from OS entropy.
    pub fn cpu() -> Self {
        Context {
            device: Device::Cpu,
            seed: None,
            rng: Rc::new(RefCell::new(StdRng::from_entropy())),
        }
    }

    /// Host context with a deterministic random stream.
    pub fn seeded(seed: u64) -> Self {
        Self::cpu().with_seed(seed)
    }

    /// Replace the random stream with one seeded from `seed`.
    ///
    /// Contexts cloned before this call keep the old stream.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self.rng = Rc::new(RefCell::new(StdRng::seed_from_u64(seed)));
        self
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// The seed, if this context is deterministic.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Run `f` with exclusive access to the shared random stream.
    pub fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        f(&mut *self.rng.borrow_mut())
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::cpu()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("device", &self.device)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}
