// Parameter: a named, lazily-shaped learnable tensor slot
//
// A Parameter is created together with its owning layer, usually before the
// layer has seen any data. At that point its declared shape may still hold
// unknown dimensions and it owns no storage.
//
// LIFECYCLE:
//
//   unresolved ──attach_initializer──▶ unresolved + policy
//        │                                   │
//        └──────────── resolve(shape) ◀──────┘
//                          │
//                          ▼
//              resolved: shape fixed, data allocated + filled
//
// The single invariant: `data` exists iff the shape is fully known. The two
// are set together inside `resolve`, which is the only place storage is
// allocated. Once resolved, the shape never changes again.

use std::fmt;
use std::rc::Rc;

use ndarray::ArrayD;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::init::Initializer;
use crate::shape::{ParamShape, Shape};

/// Initializer plus the context whose random stream it will draw from.
#[derive(Clone)]
struct Policy {
    init: Rc<dyn Initializer>,
    ctx: Context,
}

/// A named learnable tensor whose shape may be resolved lazily.
pub struct Parameter {
    name: String,
    shape: ParamShape,
    policy: Option<Policy>,
    data: Option<ArrayD<f32>>,
}

impl Parameter {
    /// Create an unresolved parameter with a declared (possibly partial) shape.
    pub fn new(name: impl Into<String>, shape: impl Into<ParamShape>) -> Self {
        Parameter {
            name: name.into(),
            shape: shape.into(),
            policy: None,
            data: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the parameter. Shape, policy and data are untouched.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The declared shape; fully known once resolved.
    pub fn shape(&self) -> &ParamShape {
        &self.shape
    }

    pub fn is_resolved(&self) -> bool {
        self.data.is_some()
    }

    pub fn has_initializer(&self) -> bool {
        self.policy.is_some()
    }

    /// Name of the attached initializer policy, if any.
    pub fn initializer_name(&self) -> Option<&'static str> {
        self.policy.as_ref().map(|p| p.init.name())
    }

    /// Number of scalar elements, or `None` while unresolved.
    pub fn num_elements(&self) -> Option<usize> {
        self.data.as_ref().map(|d| d.len())
    }

    /// Record the initializer to apply when the shape becomes known.
    ///
    /// Replaces any previously attached policy. Fails with
    /// [`Error::AlreadyResolved`] once the parameter owns storage.
    pub fn attach_initializer(&mut self, init: Rc<dyn Initializer>, ctx: &Context) -> Result<()> {
        if self.is_resolved() {
            return Err(Error::AlreadyResolved {
                name: self.name.clone(),
            });
        }
        log::debug!(
            "attach {} initializer to {} {}",
            init.name(),
            self.name,
            self.shape
        );
        self.policy = Some(Policy {
            init,
            ctx: ctx.clone(),
        });
        Ok(())
    }

    /// Fix the shape, allocate storage and fill it with the attached policy.
    ///
    /// Resolving again with the identical shape is a no-op; any other shape
    /// is a [`Error::ShapeConflict`].
    pub fn resolve(&mut self, shape: impl Into<Shape>) -> Result<()> {
        let shape = shape.into();

        if self.is_resolved() || !self.shape.is_compatible(&shape) {
            if self.is_resolved() && self.shape.to_shape().as_ref() == Some(&shape) {
                return Ok(());
            }
            return Err(self.conflict(shape));
        }

        let policy = self
            .policy
            .as_ref()
            .ok_or_else(|| Error::MissingInitializer {
                name: self.name.clone(),
            })?;

        let data = policy.ctx.with_rng(|rng| policy.init.init(&shape, rng))?;
        if data.shape() != shape.dims() {
            return Err(self.conflict(Shape::from(data.shape())));
        }

        log::debug!(
            "resolve {} {} -> {} ({} initializer)",
            self.name,
            self.shape,
            shape,
            policy.init.name()
        );
        self.shape = ParamShape::from(shape);
        self.data = Some(data);
        Ok(())
    }

    /// The current storage. Fails with [`Error::NotResolved`] before resolution.
    pub fn value(&self) -> Result<&ArrayD<f32>> {
        self.data.as_ref().ok_or_else(|| Error::NotResolved {
            name: self.name.clone(),
        })
    }

    /// Mutable access to the storage, for optimizers and other updaters.
    pub fn value_mut(&mut self) -> Result<&mut ArrayD<f32>> {
        match self.data.as_mut() {
            Some(d) => Ok(d),
            None => Err(Error::NotResolved {
                name: self.name.clone(),
            }),
        }
    }

    /// Replace the storage of a resolved parameter with same-shaped data.
    pub fn set_data(&mut self, data: ArrayD<f32>) -> Result<()> {
        let current = self.value_mut()?;
        if current.shape() != data.shape() {
            let requested = Shape::from(data.shape());
            return Err(self.conflict(requested));
        }
        *current = data;
        Ok(())
    }

    fn conflict(&self, requested: Shape) -> Error {
        Error::ShapeConflict {
            name: self.name.clone(),
            existing: self.shape.clone(),
            requested,
        }
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .field("initializer", &self.initializer_name())
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parameter {} (shape={}, dtype=float32)",
            self.name, self.shape
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init::{Constant, Normal, Ones};
    use crate::shape::Dim;

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn weight() -> Parameter {
        Parameter::new("dense0_weight", vec![Dim::Known(4), Dim::Unknown])
    }

    #[test]
    fn test_value_before_resolve() {
        let p = weight();
        assert!(matches!(p.value(), Err(Error::NotResolved { .. })));
        assert_eq!(p.num_elements(), None);
    }

    #[test]
    fn test_resolve_without_initializer() {
        let mut p = weight();
        let err = p.resolve((4, 3)).unwrap_err();
        assert!(matches!(err, Error::MissingInitializer { ref name } if name == "dense0_weight"));
        assert!(!p.is_resolved());
        assert!(!p.shape().is_resolved());
    }

    #[test]
    fn test_resolve_allocates_and_fills() {
        init_logs();
        let mut p = weight();
        p.attach_initializer(Rc::new(Constant(0.5)), &Context::seeded(0))
            .unwrap();
        p.resolve((4, 3)).unwrap();

        assert!(p.is_resolved());
        assert_eq!(p.shape().to_shape(), Some(Shape::from((4, 3))));
        let v = p.value().unwrap();
        assert_eq!(v.shape(), &[4, 3]);
        assert!(v.iter().all(|&x| x == 0.5));
        assert_eq!(p.num_elements(), Some(12));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut p = weight();
        p.attach_initializer(Rc::new(Normal::default()), &Context::seeded(1))
            .unwrap();
        p.resolve((4, 3)).unwrap();
        let before = p.value().unwrap().clone();
        p.resolve((4, 3)).unwrap();
        assert_eq!(p.value().unwrap(), &before);
    }

    #[test]
    fn test_resolve_conflict_after_resolution() {
        let mut p = weight();
        p.attach_initializer(Rc::new(Ones), &Context::cpu()).unwrap();
        p.resolve((4, 3)).unwrap();
        let err = p.resolve((4, 5)).unwrap_err();
        assert!(matches!(err, Error::ShapeConflict { .. }));
        assert_eq!(p.value().unwrap().shape(), &[4, 3]);
    }

    #[test]
    fn test_resolve_conflict_with_known_dim() {
        let mut p = weight();
        p.attach_initializer(Rc::new(Ones), &Context::cpu()).unwrap();
        assert!(matches!(
            p.resolve((5, 3)),
            Err(Error::ShapeConflict { .. })
        ));
        assert!(matches!(p.resolve(4), Err(Error::ShapeConflict { .. })));
        assert!(!p.is_resolved());
    }

    #[test]
    fn test_reattach_replaces_policy() {
        let mut p = Parameter::new("b", Shape::from(3));
        p.attach_initializer(Rc::new(Ones), &Context::cpu()).unwrap();
        p.attach_initializer(Rc::new(Constant(2.0)), &Context::cpu())
            .unwrap();
        assert_eq!(p.initializer_name(), Some("constant"));
        p.resolve(3).unwrap();
        assert!(p.value().unwrap().iter().all(|&x| x == 2.0));
    }

    #[test]
    fn test_attach_after_resolution() {
        let mut p = Parameter::new("b", Shape::from(3));
        p.attach_initializer(Rc::new(Ones), &Context::cpu()).unwrap();
        p.resolve(3).unwrap();
        let err = p
            .attach_initializer(Rc::new(Ones), &Context::cpu())
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyResolved { .. }));
    }

    #[test]
    fn test_set_data() {
        let mut p = Parameter::new("b", Shape::from(2));
        let replacement = ArrayD::from_elem(ndarray::IxDyn(&[2]), 9.0f32);
        assert!(matches!(
            p.set_data(replacement.clone()),
            Err(Error::NotResolved { .. })
        ));

        p.attach_initializer(Rc::new(Ones), &Context::cpu()).unwrap();
        p.resolve(2).unwrap();
        p.set_data(replacement).unwrap();
        assert!(p.value().unwrap().iter().all(|&x| x == 9.0));

        let wrong = ArrayD::zeros(ndarray::IxDyn(&[3]));
        assert!(matches!(p.set_data(wrong), Err(Error::ShapeConflict { .. })));
    }

    #[test]
    fn test_display() {
        let p = weight();
        assert_eq!(
            p.to_string(),
            "Parameter dense0_weight (shape=(4, ?), dtype=float32)"
        );
    }
}
