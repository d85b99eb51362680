//! Variable bindings produced by matching

use std::fmt;

use indexmap::IndexMap;

use super::{Constant, Variable};

/// One satisfying assignment: an ordered set of `variable -> constant` pairs
///
/// Each variable is bound at most once. Iteration follows binding order.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Binding {
    pairs: IndexMap<Variable, Constant>,
}

impl Binding {
    /// Create an empty binding
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the constant bound to a variable
    pub fn get(&self, var: &Variable) -> Option<&Constant> {
        self.pairs.get(var)
    }

    /// Look up a variable by name (with or without the `?` marker)
    pub fn get_by_name(&self, name: &str) -> Option<&Constant> {
        self.pairs.get(&Variable::new(name))
    }

    /// Bind `var` to `value`, or check consistency if it is already bound
    ///
    /// Returns `false` when `var` is bound to a different constant.
    pub fn test_and_bind(&mut self, var: &Variable, value: &Constant) -> bool {
        match self.pairs.get(var) {
            Some(existing) => existing == value,
            None => {
                self.pairs.insert(var.clone(), value.clone());
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over the pairs in binding order
    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Constant)> {
        self.pairs.iter()
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self)
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (var, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} : {}", var, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_is_consistent() {
        let mut b = Binding::new();
        let x = Variable::new("x");
        assert!(b.test_and_bind(&x, &Constant::new("A")));
        assert!(b.test_and_bind(&x, &Constant::new("A")));
        assert!(!b.test_and_bind(&x, &Constant::new("B")));
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn test_display_keeps_order() {
        let mut b = Binding::new();
        b.test_and_bind(&Variable::new("y"), &Constant::new("B"));
        b.test_and_bind(&Variable::new("x"), &Constant::new("A"));
        assert_eq!(b.to_string(), "?y : B, ?x : A");
        assert_eq!(b.get_by_name("?x"), Some(&Constant::new("A")));
    }
}
