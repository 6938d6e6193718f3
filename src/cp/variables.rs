//! CP variable types.

use std::fmt;

/// Handle to a decision variable inside one [`CpModel`](super::CpModel).
///
/// A `VarId` remembers the model that created it. Solutions and models
/// refuse handles that belong to a different model, so variables never
/// leak across rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId {
    pub(crate) model: u64,
    pub(crate) index: usize,
}

impl VarId {
    /// Position of the variable in its model's variable list.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Identifier of the model that created this variable.
    pub fn model_id(&self) -> u64 {
        self.model
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}#{}", self.index, self.model)
    }
}

/// An integer variable with a domain [min, max].
///
/// Represents a decision variable that takes integer values within
/// the specified bounds. Can be fixed to a single value.
#[derive(Debug, Clone)]
pub struct IntVar {
    /// Variable name (diagnostics only).
    pub name: String,
    /// Minimum value.
    pub min: i64,
    /// Maximum value.
    pub max: i64,
    /// Fixed value, if any.
    pub fixed: Option<i64>,
}

impl IntVar {
    /// Creates a new integer variable with the given bounds.
    pub fn new(name: impl Into<String>, min: i64, max: i64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            fixed: None,
        }
    }

    /// Creates a fixed integer variable.
    pub fn fixed(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            min: value,
            max: value,
            fixed: Some(value),
        }
    }

    /// Whether this variable is fixed to a single value.
    pub fn is_fixed(&self) -> bool {
        self.fixed.is_some()
    }

    /// Domain size (max - min + 1).
    pub fn domain_size(&self) -> i64 {
        self.max - self.min + 1
    }
}

/// A boolean variable (true/false decision).
///
/// Stored in the model as an integer variable over `{0, 1}`.
#[derive(Debug, Clone)]
pub struct BoolVar {
    /// Variable name.
    pub name: String,
    /// Fixed value, if any.
    pub fixed: Option<bool>,
}

impl BoolVar {
    /// Creates a new boolean variable.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fixed: None,
        }
    }

    /// Creates a fixed boolean variable.
    pub fn fixed(name: impl Into<String>, value: bool) -> Self {
        Self {
            name: name.into(),
            fixed: Some(value),
        }
    }
}

impl From<BoolVar> for IntVar {
    fn from(var: BoolVar) -> Self {
        match var.fixed {
            Some(value) => IntVar::fixed(var.name, i64::from(value)),
            None => IntVar::new(var.name, 0, 1),
        }
    }
}
