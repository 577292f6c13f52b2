//! Parameter binding

use crate::error::{Error, Result};
use crate::traits::ToValue;
use crate::value::{Value, ValueType};

/// A value bound to one statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    /// A non-null value.
    Value(Value),
    /// An explicit SQL NULL of the given type.
    Null(ValueType),
}

impl Bound {
    /// Wrap a value, turning `Value::Null` into an explicitly typed null.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null => Bound::Null(ValueType::UNTYPED_NULL),
            value => Bound::Value(value),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Bound::Null(_))
    }

    /// The declared type of the bound parameter.
    pub fn value_type(&self) -> ValueType {
        match self {
            Bound::Null(ty) => *ty,
            Bound::Value(value) => value.value_type().unwrap_or(ValueType::UNTYPED_NULL),
        }
    }

    /// The value to send to the driver.
    pub fn to_value(&self) -> Value {
        match self {
            Bound::Value(value) => value.clone(),
            Bound::Null(_) => Value::Null,
        }
    }
}

/// The parameters of one logical row of a statement.
///
/// Positions are zero-based. Named parameters are stored without their
/// placeholder prefix, so `:name`, `@name`, `$name` and `name` all bind the
/// same parameter. A set is either positional or named, never both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    positional: Vec<Option<Bound>>,
    named: Vec<(String, Bound)>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value at a zero-based position.
    ///
    /// `None` and `Value::Null` bind an explicit NULL typed as
    /// [`ValueType::UNTYPED_NULL`].
    pub fn bind<V: ToValue>(&mut self, index: usize, value: V) -> &mut Self {
        self.set_positional(index, Bound::from_value(value.to_value()));
        self
    }

    /// Bind an explicit NULL of the given type at a zero-based position.
    pub fn bind_null(&mut self, index: usize, ty: ValueType) -> &mut Self {
        self.set_positional(index, Bound::Null(ty));
        self
    }

    /// Bind a value to a named parameter.
    pub fn bind_named<V: ToValue>(&mut self, name: &str, value: V) -> &mut Self {
        self.set_named(name, Bound::from_value(value.to_value()));
        self
    }

    /// Bind an explicit NULL of the given type to a named parameter.
    pub fn bind_named_null(&mut self, name: &str, ty: ValueType) -> &mut Self {
        self.set_named(name, Bound::Null(ty));
        self
    }

    /// Bind a value at the next free position.
    pub fn push<V: ToValue>(&mut self, value: V) -> &mut Self {
        self.positional
            .push(Some(Bound::from_value(value.to_value())));
        self
    }

    /// Number of bound parameters, counting unbound positional gaps.
    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    pub fn is_named(&self) -> bool {
        !self.named.is_empty()
    }

    /// The parameter bound at a position, if any.
    pub fn get(&self, index: usize) -> Option<&Bound> {
        self.positional.get(index).and_then(Option::as_ref)
    }

    /// The parameter bound to a name, if any.
    pub fn get_named(&self, name: &str) -> Option<&Bound> {
        let name = normalize_name(name);
        self.named
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, bound)| bound)
    }

    /// Iterate positional parameters in order.
    ///
    /// Call [`ParameterSet::validate`] first; gaps are skipped here.
    pub fn positional(&self) -> impl Iterator<Item = &Bound> {
        self.positional.iter().flatten()
    }

    /// Iterate named parameters in binding order.
    pub fn named(&self) -> impl Iterator<Item = (&str, &Bound)> {
        self.named.iter().map(|(name, bound)| (name.as_str(), bound))
    }

    /// Check that the set can be sent to the driver.
    ///
    /// Rejects positional gaps and sets mixing positional and named
    /// parameters.
    pub fn validate(&self) -> Result<()> {
        if let Some(index) = self.positional.iter().position(Option::is_none) {
            return Err(Error::binding(
                index.to_string(),
                "no value bound for this position",
            ));
        }
        if !self.positional.is_empty() {
            if let Some((name, _)) = self.named.first() {
                return Err(Error::binding(
                    name.as_str(),
                    "positional and named parameters cannot be mixed",
                ));
            }
        }
        Ok(())
    }

    fn set_positional(&mut self, index: usize, bound: Bound) {
        if self.positional.len() <= index {
            self.positional.resize(index + 1, None);
        }
        self.positional[index] = Some(bound);
    }

    fn set_named(&mut self, name: &str, bound: Bound) {
        let name = normalize_name(name);
        match self.named.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = bound,
            None => self.named.push((name.to_string(), bound)),
        }
    }
}

fn normalize_name(name: &str) -> &str {
    name.strip_prefix(|c: char| matches!(c, ':' | '@' | '$'))
        .unwrap_or(name)
}

/// Build a `Vec<Value>` of positional parameters.
///
/// ```ignore
/// dao.execute("UPDATE t SET v = ? WHERE id = ?", params!["x", 5i64]);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::ToValue::to_value(&$value)),+]
    };
}
