//! # Conditions
//!
//! Typed filters over entity columns. A condition is a conjunction of
//! clauses, each comparing one column against a value (`=`) or a set of
//! values (`IN`). Stores translate conditions into their own query language;
//! the in-memory store evaluates them directly through [`Record`].

use std::fmt::Debug;

use crate::value::Value;

/// An entity whose columns can be read by name.
///
/// Implemented by every filterable row type, with `Column` being that
/// entity's column enum.
pub trait Record {
    /// Column enum of this entity.
    type Column: Copy + Eq + Debug;

    /// Read a column. `None` means the column is NULL.
    fn get(&self, column: Self::Column) -> Option<Value>;
}

/// Comparison applied to a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Column equals the value
    Eq(Value),

    /// Column is one of the values. An empty list matches nothing.
    In(Vec<Value>),
}

impl Predicate {
    /// Evaluate against a column value. NULL never matches.
    pub fn matches(&self, value: Option<&Value>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match self {
            Self::Eq(expected) => expected == value,
            Self::In(candidates) => candidates.contains(value),
        }
    }
}

/// One `column <predicate>` term of a condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause<C> {
    /// Column being filtered
    pub column: C,
    /// Comparison applied to the column
    pub predicate: Predicate,
}

/// Conjunction of clauses over the columns `C`.
///
/// An empty condition matches every row.
///
/// # Examples
///
/// ```
/// use rbac_model::{Condition, RuleColumn, Status};
///
/// let cond = Condition::new()
///     .eq(RuleColumn::SystemId, 1)
///     .eq(RuleColumn::Status, Status::Enabled)
///     .is_in(RuleColumn::RuleId, [3_i64, 5]);
/// assert_eq!(cond.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition<C> {
    clauses: Vec<Clause<C>>,
}

impl<C: Copy + Eq + Debug> Condition<C> {
    /// Create an empty condition (matches everything).
    pub fn new() -> Self {
        Self {
            clauses: Vec::new(),
        }
    }

    /// Add an equality clause.
    pub fn eq(mut self, column: C, value: impl Into<Value>) -> Self {
        self.clauses.push(Clause {
            column,
            predicate: Predicate::Eq(value.into()),
        });
        self
    }

    /// Add a set-membership clause.
    pub fn is_in<I, V>(mut self, column: C, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.clauses.push(Clause {
            column,
            predicate: Predicate::In(values.into_iter().map(Into::into).collect()),
        });
        self
    }

    /// Clauses in insertion order.
    pub fn clauses(&self) -> &[Clause<C>] {
        &self.clauses
    }

    /// Number of clauses.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Whether the condition has no clauses.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Evaluate the condition against a row.
    pub fn matches<R>(&self, record: &R) -> bool
    where
        R: Record<Column = C>,
    {
        self.clauses
            .iter()
            .all(|clause| clause.predicate.matches(record.get(clause.column).as_ref()))
    }
}

impl<C: Copy + Eq + Debug> Default for Condition<C> {
    fn default() -> Self {
        Self::new()
    }
}
