//! CP model definition.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::variables::{BoolVar, IntVar, VarId};

static NEXT_MODEL_ID: AtomicU64 = AtomicU64::new(1);

/// Bound on the absolute activity of any constraint or objective.
///
/// Keeps every intermediate sum of a solver within `i64`.
pub const MAX_ACTIVITY: i64 = i64::MAX / 4;

/// A linear combination of variables with integer coefficients.
///
/// # Examples
///
/// ```
/// use u_assign::cp::{BoolVar, CpModel, LinearExpr};
///
/// let mut model = CpModel::new("example");
/// let a = model.add_bool_var(BoolVar::new("a"));
/// let b = model.add_bool_var(BoolVar::new("b"));
/// let expr = LinearExpr::new().with_term(a, 3).with_term(b, 2);
/// assert_eq!(expr.terms().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    terms: Vec<(VarId, i64)>,
    constant: i64,
}

impl LinearExpr {
    /// Creates an empty expression (value 0).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of the given variables, each with coefficient 1.
    pub fn sum(vars: impl IntoIterator<Item = VarId>) -> Self {
        vars.into_iter().map(|v| (v, 1)).collect()
    }

    /// Adds `coef * var` to the expression. Zero coefficients are dropped.
    pub fn add_term(&mut self, var: VarId, coef: i64) {
        if coef != 0 {
            self.terms.push((var, coef));
        }
    }

    /// Builder form of [`add_term`](Self::add_term).
    pub fn with_term(mut self, var: VarId, coef: i64) -> Self {
        self.add_term(var, coef);
        self
    }

    /// Adds a constant offset.
    pub fn add_constant(&mut self, value: i64) {
        self.constant += value;
    }

    /// The `(variable, coefficient)` terms.
    pub fn terms(&self) -> &[(VarId, i64)] {
        &self.terms
    }

    /// The constant offset.
    pub fn constant(&self) -> i64 {
        self.constant
    }

    /// Whether the expression has no variable terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluates the expression, resolving each variable with `value_of`.
    pub fn evaluate(&self, mut value_of: impl FnMut(VarId) -> i64) -> i64 {
        self.terms
            .iter()
            .fold(self.constant, |acc, &(v, c)| acc + c * value_of(v))
    }
}

impl FromIterator<(VarId, i64)> for LinearExpr {
    fn from_iter<I: IntoIterator<Item = (VarId, i64)>>(iter: I) -> Self {
        let mut expr = LinearExpr::new();
        for (var, coef) in iter {
            expr.add_term(var, coef);
        }
        expr
    }
}

/// Comparison operator of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// `expr <= rhs`
    Le,
    /// `expr >= rhs`
    Ge,
    /// `expr == rhs`
    Eq,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Relation::Le => "<=",
            Relation::Ge => ">=",
            Relation::Eq => "==",
        };
        f.write_str(op)
    }
}

/// A linear constraint `expr (<= | >= | ==) rhs`.
#[derive(Debug, Clone)]
pub struct LinearConstraint {
    /// Label for diagnostics (e.g. `budget[PJ-1]`).
    pub label: String,
    /// Left-hand side.
    pub expr: LinearExpr,
    /// Comparison operator.
    pub relation: Relation,
    /// Right-hand side.
    pub rhs: i64,
}

impl LinearConstraint {
    /// Whether the constraint holds for the given variable values.
    pub fn is_satisfied(&self, value_of: impl FnMut(VarId) -> i64) -> bool {
        let lhs = self.expr.evaluate(value_of);
        match self.relation {
            Relation::Le => lhs <= self.rhs,
            Relation::Ge => lhs >= self.rhs,
            Relation::Eq => lhs == self.rhs,
        }
    }
}

/// Objective function for the CP model.
#[derive(Debug, Clone)]
pub enum Objective {
    /// Minimize a linear expression.
    Minimize(LinearExpr),
    /// Maximize a linear expression.
    Maximize(LinearExpr),
}

impl Objective {
    /// The expression being optimized.
    pub fn expr(&self) -> &LinearExpr {
        match self {
            Objective::Minimize(expr) | Objective::Maximize(expr) => expr,
        }
    }
}

/// A constraint programming model.
///
/// Contains variables, linear constraints, and an optional objective.
/// Every model gets a process-unique id; variables created here carry it.
///
/// # Examples
///
/// ```
/// use u_assign::cp::{BoolVar, CpModel, IntVar, LinearExpr, Objective};
///
/// let mut model = CpModel::new("example");
/// let x = model.add_bool_var(BoolVar::new("x"));
/// let h = model.add_int_var(IntVar::new("h", 0, 8));
/// model.add_le("link", LinearExpr::new().with_term(h, 1).with_term(x, -8), 0);
/// model.set_objective(Objective::Minimize(LinearExpr::new().with_term(x, 5)));
/// assert!(model.validate().is_ok());
/// assert_eq!(model.variable_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct CpModel {
    id: u64,
    /// Model name.
    pub name: String,
    variables: Vec<IntVar>,
    constraints: Vec<LinearConstraint>,
    objective: Option<Objective>,
}

impl CpModel {
    /// Creates a new empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: None,
        }
    }

    /// Process-unique identifier of this model.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Adds an integer variable.
    pub fn add_int_var(&mut self, var: IntVar) -> VarId {
        let id = VarId {
            model: self.id,
            index: self.variables.len(),
        };
        self.variables.push(var);
        id
    }

    /// Adds a boolean variable.
    pub fn add_bool_var(&mut self, var: BoolVar) -> VarId {
        self.add_int_var(var.into())
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: LinearConstraint) {
        self.constraints.push(constraint);
    }

    /// Convenience: add `expr <= rhs`.
    pub fn add_le(&mut self, label: impl Into<String>, expr: LinearExpr, rhs: i64) {
        self.push(label, expr, Relation::Le, rhs);
    }

    /// Convenience: add `expr >= rhs`.
    pub fn add_ge(&mut self, label: impl Into<String>, expr: LinearExpr, rhs: i64) {
        self.push(label, expr, Relation::Ge, rhs);
    }

    /// Convenience: add `expr == rhs`.
    pub fn add_eq(&mut self, label: impl Into<String>, expr: LinearExpr, rhs: i64) {
        self.push(label, expr, Relation::Eq, rhs);
    }

    fn push(&mut self, label: impl Into<String>, expr: LinearExpr, relation: Relation, rhs: i64) {
        self.constraints.push(LinearConstraint {
            label: label.into(),
            expr,
            relation,
            rhs,
        });
    }

    /// Sets the objective function.
    pub fn set_objective(&mut self, objective: Objective) {
        self.objective = Some(objective);
    }

    /// The objective, if one was set.
    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    /// All variables, indexed by [`VarId::index`].
    pub fn variables(&self) -> &[IntVar] {
        &self.variables
    }

    /// Looks up a variable definition. Returns `None` for foreign handles.
    pub fn variable(&self, id: VarId) -> Option<&IntVar> {
        if id.model != self.id {
            return None;
        }
        self.variables.get(id.index)
    }

    /// All constraints in insertion order.
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Validates the model for consistency.
    ///
    /// Checks that every variable has a non-empty domain and that every
    /// constraint and objective term references a variable of this model.
    pub fn validate(&self) -> Result<(), String> {
        for var in &self.variables {
            if var.min > var.max {
                return Err(format!(
                    "empty domain for {}: [{}, {}]",
                    var.name, var.min, var.max
                ));
            }
        }
        for constraint in &self.constraints {
            for &(var, _) in constraint.expr.terms() {
                if self.variable(var).is_none() {
                    return Err(format!(
                        "constraint {} references unknown variable {var}",
                        constraint.label
                    ));
                }
            }
            if self.activity_bound(&constraint.expr, constraint.rhs).is_none() {
                return Err(format!(
                    "constraint {} exceeds the integer range",
                    constraint.label
                ));
            }
        }
        if let Some(objective) = &self.objective {
            for &(var, _) in objective.expr().terms() {
                if self.variable(var).is_none() {
                    return Err(format!("objective references unknown variable {var}"));
                }
            }
            if self.activity_bound(objective.expr(), 0).is_none() {
                return Err("objective exceeds the integer range".into());
            }
        }
        Ok(())
    }

    /// Largest absolute value `expr` and `rhs` can reach over the variable
    /// domains, or `None` when it would exceed [`MAX_ACTIVITY`].
    fn activity_bound(&self, expr: &LinearExpr, rhs: i64) -> Option<i64> {
        let mut total = expr.constant().checked_abs()?.checked_add(rhs.checked_abs()?)?;
        for &(var, coef) in expr.terms() {
            let v = self.variable(var)?;
            let reach = v.min.checked_abs()?.max(v.max.checked_abs()?);
            total = total.checked_add(coef.checked_abs()?.checked_mul(reach)?)?;
        }
        (total <= MAX_ACTIVITY).then_some(total)
    }

    /// Returns the number of variables.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Returns the number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_creation() {
        let mut model = CpModel::new("test");
        let a = model.add_bool_var(BoolVar::new("a"));
        let b = model.add_bool_var(BoolVar::new("b"));
        model.add_ge("cover", LinearExpr::sum([a, b]), 1);
        model.set_objective(Objective::Minimize(
            LinearExpr::new().with_term(a, 10).with_term(b, 20),
        ));

        assert_eq!(model.variable_count(), 2);
        assert_eq!(model.constraint_count(), 1);
        assert!(model.objective().is_some());
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_model_ids_unique() {
        let first = CpModel::new("a");
        let second = CpModel::new("a");
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn test_foreign_variable_rejected() {
        let mut first = CpModel::new("first");
        let stale = first.add_bool_var(BoolVar::new("x"));

        let mut second = CpModel::new("second");
        second.add_bool_var(BoolVar::new("x"));
        second.add_le("uses_stale", LinearExpr::sum([stale]), 1);

        assert!(second.variable(stale).is_none());
        assert!(second.validate().is_err());
    }

    #[test]
    fn test_foreign_objective_rejected() {
        let mut first = CpModel::new("first");
        let stale = first.add_bool_var(BoolVar::new("x"));

        let mut second = CpModel::new("second");
        second.set_objective(Objective::Minimize(LinearExpr::sum([stale])));
        assert!(second.validate().is_err());
    }

    #[test]
    fn test_empty_domain_rejected() {
        let mut model = CpModel::new("test");
        model.add_int_var(IntVar::new("h", 5, 2));
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_oversized_activity_rejected() {
        let mut model = CpModel::new("test");
        let a = model.add_int_var(IntVar::new("a", 0, 1 << 40));
        model.add_le("big", LinearExpr::new().with_term(a, 1 << 40), 0);
        assert!(model.validate().is_err());

        let mut model = CpModel::new("test");
        let x = model.add_bool_var(BoolVar::new("x"));
        model.set_objective(Objective::Minimize(LinearExpr::new().with_term(x, i64::MAX - 10)));
        assert!(model.validate().is_err());

        let mut model = CpModel::new("test");
        let x = model.add_bool_var(BoolVar::new("x"));
        model.add_le("fits", LinearExpr::new().with_term(x, MAX_ACTIVITY), MAX_ACTIVITY);
        assert!(model.validate().is_err());
        model = CpModel::new("test");
        let x = model.add_bool_var(BoolVar::new("x"));
        model.add_le("fits", LinearExpr::new().with_term(x, 1_000_000), 1_000_000);
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_zero_coefficients_dropped() {
        let mut model = CpModel::new("test");
        let a = model.add_bool_var(BoolVar::new("a"));
        let b = model.add_bool_var(BoolVar::new("b"));
        let expr: LinearExpr = [(a, 0), (b, 3)].into_iter().collect();
        assert_eq!(expr.terms(), &[(b, 3)]);
    }

    #[test]
    fn test_constraint_satisfaction() {
        let mut model = CpModel::new("test");
        let a = model.add_int_var(IntVar::new("a", 0, 8));
        let b = model.add_int_var(IntVar::new("b", 0, 8));
        model.add_le("cap", LinearExpr::sum([a, b]), 6);

        let c = &model.constraints()[0];
        assert!(c.is_satisfied(|v| if v == a { 4 } else { 2 }));
        assert!(!c.is_satisfied(|v| if v == a { 4 } else { 3 }));
    }

    #[test]
    fn test_expr_evaluate_with_constant() {
        let mut model = CpModel::new("test");
        let a = model.add_int_var(IntVar::new("a", 0, 8));
        let mut expr = LinearExpr::new().with_term(a, 2);
        expr.add_constant(7);
        assert_eq!(expr.evaluate(|_| 3), 13);
        assert_eq!(expr.constant(), 7);
    }
}
