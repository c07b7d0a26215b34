//! The closed set of value kinds and the per-path value definition.
//!
//! Every configuration entry is a [`ConfigValue`]: one variant per [`Kind`],
//! each wrapping a [`Definition<T>`] that carries the dotted path, the current
//! value, the default, an optional inline comment and a [`Validator<T>`].
//! Definitions are immutable; [`Definition::with_value`] and
//! [`ConfigValue::with_value`] return new instances and never touch the
//! original. The kind of a path never changes after construction.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::SnapfigError;
use crate::validation::ValidationResult;
use crate::validator::Validator;

/// An ordered, string-keyed map. Used for the record kinds.
pub type Record = serde_yaml::Mapping;

pub type TextMap = BTreeMap<String, String>;

pub type IntMap = BTreeMap<String, i64>;

/// The shape a configuration value may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Int,
    Double,
    Text,
    Bool,
    TextList,
    IntList,
    DoubleList,
    RecordList,
    Record,
    TextMap,
    IntMap,
}

impl Kind {
    pub fn is_list(self) -> bool {
        matches!(
            self,
            Kind::TextList | Kind::IntList | Kind::DoubleList | Kind::RecordList
        )
    }

    pub fn is_map(self) -> bool {
        matches!(self, Kind::Record | Kind::TextMap | Kind::IntMap)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Int => "an integer",
            Kind::Double => "a floating-point number",
            Kind::Text => "text",
            Kind::Bool => "a boolean",
            Kind::TextList => "a list of text",
            Kind::IntList => "a list of integers",
            Kind::DoubleList => "a list of floating-point numbers",
            Kind::RecordList => "a list of records",
            Kind::Record => "a record",
            Kind::TextMap => "a text map",
            Kind::IntMap => "an integer map",
        };
        f.write_str(name)
    }
}

/// A bare value of any kind, detached from its path.
///
/// This is what callers pass to [`Config::with`](crate::Config::with) and what
/// generic accessors return. Serializes untagged, i.e. as the plain YAML shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Double(f64),
    Text(String),
    Bool(bool),
    TextList(Vec<String>),
    IntList(Vec<i64>),
    DoubleList(Vec<f64>),
    RecordList(Vec<Record>),
    Record(Record),
    TextMap(TextMap),
    IntMap(IntMap),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Int(_) => Kind::Int,
            Value::Double(_) => Kind::Double,
            Value::Text(_) => Kind::Text,
            Value::Bool(_) => Kind::Bool,
            Value::TextList(_) => Kind::TextList,
            Value::IntList(_) => Kind::IntList,
            Value::DoubleList(_) => Kind::DoubleList,
            Value::RecordList(_) => Kind::RecordList,
            Value::Record(_) => Kind::Record,
            Value::TextMap(_) => Kind::TextMap,
            Value::IntMap(_) => Kind::IntMap,
        }
    }

    /// The value as a YAML tree node.
    pub fn to_yaml(&self) -> serde_yaml::Value {
        // Every variant maps onto plain YAML shapes, so this cannot fail.
        serde_yaml::to_value(self).unwrap_or(serde_yaml::Value::Null)
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

value_from! {
    i64 => Int,
    i32 => Int,
    f64 => Double,
    bool => Bool,
    String => Text,
    &str => Text,
    Vec<String> => TextList,
    Vec<i64> => IntList,
    Vec<f64> => DoubleList,
    Vec<Record> => RecordList,
    Record => Record,
    TextMap => TextMap,
    IntMap => IntMap,
}

impl From<Vec<&str>> for Value {
    fn from(v: Vec<&str>) -> Self {
        Value::TextList(v.into_iter().map(String::from).collect())
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Rust types that can back a [`ConfigValue`] variant.
///
/// Sealed: the set of kinds is closed.
pub trait ValueType: Clone + PartialEq + Send + Sync + 'static + sealed::Sealed {
    const KIND: Kind;

    fn wrap(definition: Definition<Self>) -> ConfigValue;

    fn unwrap(value: &ConfigValue) -> Option<&Definition<Self>>;

    fn into_value(self) -> Value;

    /// Extract from a bare [`Value`], handing it back on a kind mismatch.
    fn from_value(value: Value) -> Result<Self, Value>;
}

macro_rules! value_type {
    (@extract Double, $value:ident) => {
        match $value {
            Value::Double(v) => Ok(v),
            Value::Int(v) => Ok(v as f64),
            other => Err(other),
        }
    };
    (@extract DoubleList, $value:ident) => {
        match $value {
            Value::DoubleList(v) => Ok(v),
            Value::IntList(v) => Ok(v.into_iter().map(|i| i as f64).collect()),
            other => Err(other),
        }
    };
    (@extract $variant:ident, $value:ident) => {
        match $value {
            Value::$variant(v) => Ok(v),
            other => Err(other),
        }
    };
    ($ty:ty, $variant:ident) => {
        impl sealed::Sealed for $ty {}

        impl ValueType for $ty {
            const KIND: Kind = Kind::$variant;

            fn wrap(definition: Definition<Self>) -> ConfigValue {
                ConfigValue::$variant(definition)
            }

            fn unwrap(value: &ConfigValue) -> Option<&Definition<Self>> {
                match value {
                    ConfigValue::$variant(d) => Some(d),
                    _ => None,
                }
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: Value) -> Result<Self, Value> {
                value_type!(@extract $variant, value)
            }
        }
    };
}

value_type!(i64, Int);
value_type!(f64, Double);
value_type!(String, Text);
value_type!(bool, Bool);
value_type!(Vec<String>, TextList);
value_type!(Vec<i64>, IntList);
value_type!(Vec<f64>, DoubleList);
value_type!(Vec<Record>, RecordList);
value_type!(Record, Record);
value_type!(TextMap, TextMap);
value_type!(IntMap, IntMap);

/// One configuration entry of a single kind.
#[derive(Clone)]
pub struct Definition<T> {
    path: String,
    value: T,
    default: T,
    comment: Option<String>,
    validator: Validator<T>,
}

impl<T: ValueType> Definition<T> {
    /// A definition whose current value is its default.
    pub fn new(path: impl Into<String>, default: T) -> Self {
        Self {
            path: path.into(),
            value: default.clone(),
            default,
            comment: None,
            validator: Validator::none(),
        }
    }

    /// Attach an inline comment. Empty text means no comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        let comment = comment.into();
        self.comment = (!comment.is_empty()).then_some(comment);
        self
    }

    pub fn with_validator(mut self, validator: Validator<T>) -> Self {
        self.validator = validator;
        self
    }

    /// A copy holding `value`; path, default, comment and validator carry over.
    pub fn with_value(&self, value: T) -> Self {
        Self {
            path: self.path.clone(),
            value,
            default: self.default.clone(),
            comment: self.comment.clone(),
            validator: self.validator.clone(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn validator(&self) -> &Validator<T> {
        &self.validator
    }

    /// Run the attached validator against the current value.
    pub fn validate(&self) -> ValidationResult {
        self.validator.validate(&self.value)
    }

    pub(crate) fn with_path(mut self, path: String) -> Self {
        self.path = path;
        self
    }
}

impl<T: fmt::Debug> fmt::Debug for Definition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("path", &self.path)
            .field("value", &self.value)
            .field("default", &self.default)
            .field("comment", &self.comment)
            .finish_non_exhaustive()
    }
}

/// Validators are functions and do not take part in equality.
impl<T: PartialEq> PartialEq for Definition<T> {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
            && self.value == other.value
            && self.default == other.default
            && self.comment == other.comment
    }
}

/// A configuration entry of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Int(Definition<i64>),
    Double(Definition<f64>),
    Text(Definition<String>),
    Bool(Definition<bool>),
    TextList(Definition<Vec<String>>),
    IntList(Definition<Vec<i64>>),
    DoubleList(Definition<Vec<f64>>),
    RecordList(Definition<Vec<Record>>),
    Record(Definition<Record>),
    TextMap(Definition<TextMap>),
    IntMap(Definition<IntMap>),
}

macro_rules! each {
    ($value:expr, $def:ident => $body:expr) => {
        match $value {
            ConfigValue::Int($def) => $body,
            ConfigValue::Double($def) => $body,
            ConfigValue::Text($def) => $body,
            ConfigValue::Bool($def) => $body,
            ConfigValue::TextList($def) => $body,
            ConfigValue::IntList($def) => $body,
            ConfigValue::DoubleList($def) => $body,
            ConfigValue::RecordList($def) => $body,
            ConfigValue::Record($def) => $body,
            ConfigValue::TextMap($def) => $body,
            ConfigValue::IntMap($def) => $body,
        }
    };
}

impl ConfigValue {
    pub fn path(&self) -> &str {
        each!(self, d => d.path())
    }

    pub fn comment(&self) -> Option<&str> {
        each!(self, d => d.comment())
    }

    pub fn kind(&self) -> Kind {
        each!(self, d => kind_of(d))
    }

    pub fn value(&self) -> Value {
        each!(self, d => d.value().clone().into_value())
    }

    pub fn default_value(&self) -> Value {
        each!(self, d => d.default_value().clone().into_value())
    }

    pub fn is_default(&self) -> bool {
        each!(self, d => d.value() == d.default_value())
    }

    pub fn validate(&self) -> ValidationResult {
        each!(self, d => d.validate())
    }

    /// A copy holding `value`. Fails if `value` is of a different kind.
    pub fn with_value(&self, value: Value) -> Result<ConfigValue, SnapfigError> {
        each!(self, d => replace(d, value))
    }

    /// A copy holding the default value.
    pub fn reset(&self) -> ConfigValue {
        each!(self, d => ValueType::wrap(d.with_value(d.default_value().clone())))
    }
}

fn kind_of<T: ValueType>(_: &Definition<T>) -> Kind {
    T::KIND
}

fn replace<T: ValueType>(definition: &Definition<T>, value: Value) -> Result<ConfigValue, SnapfigError> {
    let actual = value.kind();
    let typed = T::from_value(value).map_err(|_| SnapfigError::KindMismatch {
        path: definition.path().to_string(),
        expected: T::KIND,
        actual,
    })?;
    Ok(T::wrap(definition.with_value(typed)))
}

impl<T: ValueType> From<Definition<T>> for ConfigValue {
    fn from(definition: Definition<T>) -> Self {
        T::wrap(definition)
    }
}
