use core::fmt;
use std::collections::BTreeMap;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::datastructures::Assignment;

/// Evaluation tolerance for constraint satisfaction.
const TOLERANCE: f64 = 1e-6;

/// The five variable families of the placement/routing formulations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
pub enum VarRole {
    ServerStatus,
    VmStatus,
    SwitchStatus,
    FlowEdge,
    LinkStatus,
}

/// A named binary decision variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub role: VarRole,
}

/// A linear expression `Σ coeff * var + constant`.
///
/// Terms are kept in a sorted map so repeated contributions to the same
/// variable accumulate and structurally equal expressions compare equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearExpr {
    pub terms: BTreeMap<String, f64>,
    pub constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single-term expression.
    pub fn term(name: impl Into<String>, coeff: f64) -> Self {
        let mut expr = Self::new();
        expr.add_term(name, coeff);
        expr
    }

    /// A constant expression.
    pub fn constant(value: f64) -> Self {
        Self {
            terms: BTreeMap::new(),
            constant: value,
        }
    }

    /// Adds `coeff * var`, accumulating with any existing coefficient.
    pub fn add_term(&mut self, name: impl Into<String>, coeff: f64) {
        *self.terms.entry(name.into()).or_insert(0.0) += coeff;
    }

    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    /// Value of the expression under an assignment; missing variables
    /// read as 0.
    pub fn evaluate(&self, assignment: &Assignment) -> f64 {
        self.terms
            .iter()
            .map(|(name, coeff)| coeff * assignment.value(name))
            .sum::<f64>()
            + self.constant
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.constant == 0.0
    }
}

impl Add for LinearExpr {
    type Output = LinearExpr;

    fn add(mut self, rhs: LinearExpr) -> LinearExpr {
        for (name, coeff) in rhs.terms {
            self.add_term(name, coeff);
        }
        self.constant += rhs.constant;
        self
    }
}

impl Sub for LinearExpr {
    type Output = LinearExpr;

    fn sub(mut self, rhs: LinearExpr) -> LinearExpr {
        for (name, coeff) in rhs.terms {
            self.add_term(name, -coeff);
        }
        self.constant -= rhs.constant;
        self
    }
}

/// Comparison sense of a constraint in `expr ⋈ 0` normal form.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
pub enum ConstraintSense {
    Eq,
    Le,
}

/// A labeled constraint `expr == 0` or `expr <= 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub label: String,
    pub expr: LinearExpr,
    pub sense: ConstraintSense,
}

impl Constraint {
    pub fn is_satisfied(&self, assignment: &Assignment) -> bool {
        let value = self.expr.evaluate(assignment);
        match self.sense {
            ConstraintSense::Eq => value.abs() <= TOLERANCE,
            ConstraintSense::Le => value <= TOLERANCE,
        }
    }
}

/// An abstract minimization model: binary variables, a linear objective and
/// labeled constraints. Built fresh per formulation and never mutated after
/// handing it to a solver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    pub variables: Vec<Variable>,
    pub objective: LinearExpr,
    pub constraints: Vec<Constraint>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Registers a binary variable and returns its name.
    pub fn binary(&mut self, role: VarRole, name: impl Into<String>) -> String {
        let name = name.into();
        self.variables.push(Variable {
            name: name.clone(),
            role,
        });
        name
    }

    pub fn add_constraint(
        &mut self,
        label: impl Into<String>,
        expr: LinearExpr,
        sense: ConstraintSense,
    ) {
        self.constraints.push(Constraint {
            label: label.into(),
            expr,
            sense,
        });
    }

    pub fn constraint(&self, label: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.label == label)
    }

    pub fn var_names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.name.as_str())
    }

    pub fn vars_with_role(
        &self,
        role: VarRole,
    ) -> impl Iterator<Item = &Variable> {
        self.variables.iter().filter(move |v| v.role == role)
    }

    pub fn objective_value(&self, assignment: &Assignment) -> f64 {
        self.objective.evaluate(assignment)
    }

    pub fn violated_constraints(
        &self,
        assignment: &Assignment,
    ) -> Vec<&Constraint> {
        self.constraints
            .iter()
            .filter(|c| !c.is_satisfied(assignment))
            .collect()
    }

    pub fn is_feasible(&self, assignment: &Assignment) -> bool {
        self.constraints.iter().all(|c| c.is_satisfied(assignment))
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {} structure #", self.name)?;
        writeln!(f, "variables:   {}", self.variables.len())?;
        writeln!(f, "objective terms: {}", self.objective.terms.len())?;
        write!(f, "constraints: {}", self.constraints.len())
    }
}
