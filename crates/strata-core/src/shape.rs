use std::fmt;

// Shapes: concrete and deferred
//
// Two shape types live here:
//
//   Shape       - a concrete shape, every dimension known: (128, 784)
//   ParamShape  - a declared parameter shape that may still contain unknown
//                 dimensions: (128, ?)
//
// A Dense layer built without an input width declares its weight as
// [Known(units), Unknown]. The first forward pass observes the batch width
// and turns the ParamShape into a Shape, at which point storage can be
// allocated.
//
// Unknown is an explicit tag, never 0. A zero-sized dimension is a perfectly
// legal (if unusual) known size.

/// A single dimension of a declared parameter shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dim {
    /// Size fixed at construction or by resolution.
    Known(usize),
    /// Size not yet observed; filled in on the first forward pass.
    Unknown,
}

impl Dim {
    pub fn is_known(&self) -> bool {
        matches!(self, Dim::Known(_))
    }

    /// The concrete size, if known.
    pub fn size(&self) -> Option<usize> {
        match self {
            Dim::Known(n) => Some(*n),
            Dim::Unknown => None,
        }
    }

    /// Whether a concrete size is allowed for this dimension.
    pub fn accepts(&self, value: usize) -> bool {
        match self {
            Dim::Known(n) => *n == value,
            Dim::Unknown => true,
        }
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dim::Known(n) => write!(f, "{n}"),
            Dim::Unknown => write!(f, "?"),
        }
    }
}

impl From<usize> for Dim {
    fn from(n: usize) -> Self {
        Dim::Known(n)
    }
}

impl From<Option<usize>> for Dim {
    fn from(n: Option<usize>) -> Self {
        n.map_or(Dim::Unknown, Dim::Known)
    }
}

/// Writes dims as a Python-style tuple: `(3, 4)`, `(5,)`, `()`.
fn write_tuple<T: fmt::Display>(f: &mut fmt::Formatter<'_>, dims: &[T]) -> fmt::Result {
    write!(f, "(")?;
    for (i, d) in dims.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{d}")?;
    }
    if dims.len() == 1 {
        write!(f, ",")?;
    }
    write!(f, ")")
}

/// N-dimensional concrete shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape(Vec<usize>);

impl Shape {
    /// Create a new shape from a vector of dimension sizes.
    pub fn new(dims: Vec<usize>) -> Self {
        Shape(dims)
    }

    /// The dimension sizes as a slice.
    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// Number of dimensions (0 for scalar, 1 for vector, 2 for matrix, etc.).
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Total number of elements (product of all dimensions).
    /// A scalar shape () has 1 element; any zero dimension gives 0.
    pub fn elem_count(&self) -> usize {
        self.0.iter().product::<usize>()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_tuple(f, &self.0)
    }
}

// Convenient From implementations
// These let you write: Shape::from((3, 4)) instead of Shape::new(vec![3, 4])

impl From<()> for Shape {
    /// Scalar shape (0 dimensions).
    fn from(_: ()) -> Self {
        Shape(vec![])
    }
}

impl From<usize> for Shape {
    /// 1-D shape.
    fn from(d: usize) -> Self {
        Shape(vec![d])
    }
}

impl From<(usize,)> for Shape {
    fn from((d0,): (usize,)) -> Self {
        Shape(vec![d0])
    }
}

impl From<(usize, usize)> for Shape {
    fn from((d0, d1): (usize, usize)) -> Self {
        Shape(vec![d0, d1])
    }
}

impl From<Vec<usize>> for Shape {
    fn from(v: Vec<usize>) -> Self {
        Shape(v)
    }
}

impl From<&[usize]> for Shape {
    fn from(s: &[usize]) -> Self {
        Shape(s.to_vec())
    }
}

/// A declared parameter shape whose dimensions may still be unknown.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamShape(Vec<Dim>);

impl ParamShape {
    pub fn new(dims: Vec<Dim>) -> Self {
        ParamShape(dims)
    }

    pub fn dims(&self) -> &[Dim] {
        &self.0
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// True iff every dimension is known.
    pub fn is_resolved(&self) -> bool {
        self.0.iter().all(Dim::is_known)
    }

    /// The concrete shape, if every dimension is known.
    pub fn to_shape(&self) -> Option<Shape> {
        self.0
            .iter()
            .map(Dim::size)
            .collect::<Option<Vec<_>>>()
            .map(Shape::new)
    }

    /// Whether `shape` fits this declaration: same rank, and every known
    /// dimension matches exactly.
    pub fn is_compatible(&self, shape: &Shape) -> bool {
        self.rank() == shape.rank()
            && self
                .0
                .iter()
                .zip(shape.dims())
                .all(|(d, &n)| d.accepts(n))
    }
}

impl fmt::Display for ParamShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_tuple(f, &self.0)
    }
}

impl From<Shape> for ParamShape {
    fn from(s: Shape) -> Self {
        ParamShape(s.0.into_iter().map(Dim::Known).collect())
    }
}

impl From<Vec<Dim>> for ParamShape {
    fn from(v: Vec<Dim>) -> Self {
        ParamShape(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_shape() {
        let s = Shape::from(());
        assert_eq!(s.rank(), 0);
        assert_eq!(s.elem_count(), 1);
    }

    #[test]
    fn test_zero_dim_has_no_elements() {
        let s = Shape::from((0, 3));
        assert_eq!(s.elem_count(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Shape::from((3, 4)).to_string(), "(3, 4)");
        assert_eq!(Shape::from(10).to_string(), "(10,)");
        let p = ParamShape::new(vec![Dim::Known(128), Dim::Unknown]);
        assert_eq!(p.to_string(), "(128, ?)");
    }

    #[test]
    fn test_unknown_is_not_zero() {
        let p = ParamShape::new(vec![Dim::Known(0), Dim::Unknown]);
        assert!(!p.is_resolved());
        assert!(p.to_shape().is_none());

        let q = ParamShape::new(vec![Dim::Known(0), Dim::Known(4)]);
        assert!(q.is_resolved());
        assert_eq!(q.to_shape(), Some(Shape::from((0, 4))));
    }

    #[test]
    fn test_compatibility() {
        let p = ParamShape::new(vec![Dim::Known(128), Dim::Unknown]);
        assert!(p.is_compatible(&Shape::from((128, 784))));
        assert!(!p.is_compatible(&Shape::from((64, 784))));
        assert!(!p.is_compatible(&Shape::from(128)));
    }

    #[test]
    fn test_dim_from_option() {
        assert_eq!(Dim::from(Some(3)), Dim::Known(3));
        assert_eq!(Dim::from(None), Dim::Unknown);
    }
}
