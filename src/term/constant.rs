//! Constant (ground) symbols

use std::fmt;
use std::sync::Arc;

/// An opaque ground identifier such as `A` or `parent`
///
/// Constants compare by their text. Cloning is cheap.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Constant(Arc<str>);

impl Constant {
    pub fn new(value: impl AsRef<str>) -> Self {
        Constant(Arc::from(value.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Constant {
    fn from(s: &str) -> Self {
        Constant::new(s)
    }
}
