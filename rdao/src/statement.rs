//! Statements and their parameter slots

use crate::error::{Error, Result};
use crate::params::ParameterSet;
use crate::traits::ToValue;
use crate::value::ValueType;

/// SQL text plus one or more bound parameter slots.
///
/// A statement always has at least one slot. Binding methods write to the
/// current (last) slot; [`Statement::add`] starts a new one, turning the
/// statement into a batch executed once per slot.
///
/// # Example
///
/// ```ignore
/// let mut statement = Statement::new("INSERT INTO some_entity (svalue) VALUES (?)")
///     .return_generated_values(["id"]);
/// statement.bind(0, "a");
/// statement.add();
/// statement.bind(0, "b");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    slots: Vec<ParameterSet>,
    generated: Vec<String>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            slots: vec![ParameterSet::new()],
            generated: Vec::new(),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bind a value at a zero-based position in the current slot.
    pub fn bind<V: ToValue>(&mut self, index: usize, value: V) -> &mut Self {
        self.parameters_mut().bind(index, value);
        self
    }

    /// Bind a named value in the current slot.
    pub fn bind_named<V: ToValue>(&mut self, name: &str, value: V) -> &mut Self {
        self.parameters_mut().bind_named(name, value);
        self
    }

    /// Bind a typed NULL at a zero-based position in the current slot.
    pub fn bind_null(&mut self, index: usize, ty: ValueType) -> &mut Self {
        self.parameters_mut().bind_null(index, ty);
        self
    }

    /// Start a new parameter slot.
    pub fn add(&mut self) -> &mut Self {
        self.slots.push(ParameterSet::new());
        self
    }

    /// Ask the driver to return the given generated columns, one row per
    /// inserted row.
    pub fn return_generated_values<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.generated = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn generated_columns(&self) -> &[String] {
        &self.generated
    }

    pub fn returns_generated_values(&self) -> bool {
        !self.generated.is_empty()
    }

    /// The parameters of the current slot.
    pub fn parameters_mut(&mut self) -> &mut ParameterSet {
        if self.slots.is_empty() {
            self.slots.push(ParameterSet::new());
        }
        let last = self.slots.len() - 1;
        &mut self.slots[last]
    }

    pub fn slots(&self) -> &[ParameterSet] {
        &self.slots
    }

    /// Whether the statement carries no parameters and no generated-value
    /// request, so it can run through a plain text query.
    pub fn is_simple(&self) -> bool {
        self.slots.len() == 1 && self.slots[0].is_empty() && self.generated.is_empty()
    }

    /// Check every slot before execution.
    ///
    /// Within a batch either every slot is empty or none is. An empty slot
    /// next to bound ones is an unfinished `add`.
    pub fn validate(&self) -> Result<()> {
        let mixed = self.slots.iter().any(ParameterSet::is_empty)
            && self.slots.iter().any(|slot| !slot.is_empty());
        for (index, slot) in self.slots.iter().enumerate() {
            if mixed && slot.is_empty() {
                return Err(Error::binding(
                    format!("slot {}", index),
                    "empty parameter slot in batch",
                ));
            }
            slot.validate()?;
        }
        Ok(())
    }
}
