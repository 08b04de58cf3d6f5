// NameScope: deterministic, collision-free hierarchical names
//
// Every layer added to a stack gets a name like `sequential0_dense1`, and its
// parameters inherit it: `sequential0_dense1_weight`. Names come from an
// explicit allocator object rather than process-wide counters, so two stacks
// built in the same test never race for the same index.
//
// RULES:
//
//   next_name("dense")        → "{prefix}_dense{n}"   (n counts per layer type)
//   enter_scope("sequential") → child scope with prefix = next_name("sequential")
//
// Because a child's prefix is itself allocated from the parent's counter, two
// child scopes of one parent can never share a prefix, and therefore never
// hand out the same full name.

use std::collections::HashMap;

/// Separator placed between scope levels and before parameter roles.
pub const SEPARATOR: char = '_';

/// An allocator of unique names under a fixed prefix.
///
/// Not `Clone`: a copy would carry the same counters and hand out the same
/// names twice. Use [`NameScope::enter_scope`] for a separate allocator.
///
/// ```compile_fail
/// let scope = strata_nn::NameScope::root();
/// let _copy = scope.clone();
/// ```
#[derive(Debug, Default)]
pub struct NameScope {
    prefix: String,
    counters: HashMap<String, usize>,
}

impl NameScope {
    /// The top-level scope with an empty prefix.
    pub fn root() -> Self {
        Self::default()
    }

    /// A scope rooted at an already-allocated name.
    ///
    /// Used when a block receives its name from an enclosing scope.
    pub(crate) fn with_prefix(prefix: impl Into<String>) -> Self {
        NameScope {
            prefix: prefix.into(),
            counters: HashMap::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Allocate the next name for `layer_type` in this scope.
    pub fn next_name(&mut self, layer_type: &str) -> String {
        let counter = self.counters.entry(layer_type.to_string()).or_insert(0);
        let index = *counter;
        *counter += 1;
        if self.prefix.is_empty() {
            format!("{layer_type}{index}")
        } else {
            format!("{}{SEPARATOR}{layer_type}{index}", self.prefix)
        }
    }

    /// Open a fresh child scope. Re-entering the same name yields a new suffix.
    pub fn enter_scope(&mut self, name: &str) -> NameScope {
        NameScope::with_prefix(self.next_name(name))
    }
}

/// Full name of a parameter owned by `layer_name`.
pub fn param_name(layer_name: &str, role: &str) -> String {
    if layer_name.is_empty() {
        role.to_string()
    } else {
        format!("{layer_name}{SEPARATOR}{role}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_per_layer_type() {
        let mut scope = NameScope::root().enter_scope("sequential");
        assert_eq!(scope.prefix(), "sequential0");
        assert_eq!(scope.next_name("dense"), "sequential0_dense0");
        assert_eq!(scope.next_name("dense"), "sequential0_dense1");
        assert_eq!(scope.next_name("relu"), "sequential0_relu0");
        assert_eq!(scope.next_name("dense"), "sequential0_dense2");
    }

    #[test]
    fn test_reentering_scope_gets_fresh_suffix() {
        let mut root = NameScope::root();
        let mut a = root.enter_scope("sequential");
        let mut b = root.enter_scope("sequential");
        assert_eq!(a.prefix(), "sequential0");
        assert_eq!(b.prefix(), "sequential1");
        assert_ne!(a.next_name("dense"), b.next_name("dense"));
    }

    #[test]
    fn test_nested_scopes_concatenate() {
        let mut root = NameScope::root();
        let mut outer = root.enter_scope("model");
        let mut inner = outer.enter_scope("block");
        assert_eq!(inner.next_name("dense"), "model0_block0_dense0");
    }

    #[test]
    fn test_root_names_have_no_leading_separator() {
        let mut root = NameScope::root();
        assert_eq!(root.next_name("dense"), "dense0");
    }

    #[test]
    fn test_param_name() {
        assert_eq!(param_name("dense0", "weight"), "dense0_weight");
        assert_eq!(param_name("", "bias"), "bias");
    }
}
