// ParameterDict: ordered, borrowed view of a block's parameters
//
// Keys are the parameters' own fully-qualified names, so the view is always
// consistent with the current naming. Order is the block's insertion order:
// layer by layer, weight before bias.

use std::fmt;

use strata_core::param::Parameter;

/// Ordered mapping from fully-qualified name to [`Parameter`].
#[derive(Debug, Clone, Default)]
pub struct ParameterDict<'a> {
    params: Vec<&'a Parameter>,
}

impl<'a> ParameterDict<'a> {
    pub fn new(params: Vec<&'a Parameter>) -> Self {
        ParameterDict { params }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Look up a parameter by full name.
    pub fn get(&self, name: &str) -> Option<&'a Parameter> {
        self.params.iter().copied().find(|p| p.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.params.iter().map(|p| p.name())
    }

    /// `(name, parameter)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Parameter)> + '_ {
        self.params.iter().map(|p| (p.name(), *p))
    }

    /// The parameters whose names end with `suffix`, e.g. `"_weight"`.
    pub fn select(&self, suffix: &str) -> ParameterDict<'a> {
        ParameterDict::new(
            self.params
                .iter()
                .copied()
                .filter(|p| p.name().ends_with(suffix))
                .collect(),
        )
    }

    pub fn all_resolved(&self) -> bool {
        self.params.iter().all(|p| p.is_resolved())
    }

    pub fn any_resolved(&self) -> bool {
        self.params.iter().any(|p| p.is_resolved())
    }

    /// Scalar count over resolved parameters.
    pub fn num_elements(&self) -> usize {
        self.params.iter().filter_map(|p| p.num_elements()).sum()
    }
}

impl<'a> IntoIterator for ParameterDict<'a> {
    type Item = &'a Parameter;
    type IntoIter = std::vec::IntoIter<&'a Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.into_iter()
    }
}

impl fmt::Display for ParameterDict<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "(")?;
        for p in &self.params {
            writeln!(f, "  {p}")?;
        }
        write!(f, ")")
    }
}
