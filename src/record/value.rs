//! Scalar value model
//!
//! Supported kinds:
//! - int: signed integers (stored as i64)
//! - uint: unsigned integers (stored as u64)
//! - float: floating point (stored as f64)
//! - bool: Boolean
//! - text: UTF-8 string
//!
//! There is no coercion between Rust types. Schemas only map a source
//! field onto a destination field of the identical Rust type.

use serde::{Deserialize, Serialize};
use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// The kind of a scalar field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Int,
    UInt,
    Float,
    Bool,
    Text,
}

impl ValueKind {
    /// Returns the kind name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ValueKind::Int => "int",
            ValueKind::UInt => "uint",
            ValueKind::Float => "float",
            ValueKind::Bool => "bool",
            ValueKind::Text => "text",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// A scalar field value read from a source row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl Value {
    /// The zero value of a kind, used as the "no entity" sentinel for keys
    pub fn zero(kind: ValueKind) -> Value {
        match kind {
            ValueKind::Int => Value::Int(0),
            ValueKind::UInt => Value::UInt(0),
            ValueKind::Float => Value::Float(0.0),
            ValueKind::Bool => Value::Bool(false),
            ValueKind::Text => Value::Text(String::new()),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::UInt(_) => ValueKind::UInt,
            Value::Float(_) => ValueKind::Float,
            Value::Bool(_) => ValueKind::Bool,
            Value::Text(_) => ValueKind::Text,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Value::zero(self.kind())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::UInt(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{:?}", v),
        }
    }
}

/// Hashable primary-key value used to group rows.
///
/// Floats compare by bit pattern, so `NaN` groups with itself and `-0.0`
/// is distinct from `0.0`.
#[derive(Debug, Clone)]
pub struct GroupKey(Value);

impl GroupKey {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (a, b) => a == b,
        }
    }
}

impl Eq for GroupKey {}

impl Hash for GroupKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(&self.0).hash(state);
        match &self.0 {
            Value::Int(v) => v.hash(state),
            Value::UInt(v) => v.hash(state),
            Value::Float(v) => v.to_bits().hash(state),
            Value::Bool(v) => v.hash(state),
            Value::Text(v) => v.hash(state),
        }
    }
}

/// Exact Rust type of a scalar field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarType {
    pub kind: ValueKind,
    pub type_id: TypeId,
    pub name: &'static str,
}

impl ScalarType {
    pub fn of<T: Scalar>() -> Self {
        Self {
            kind: T::KIND,
            type_id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Conversion between a Rust scalar type and `Value`
pub trait Scalar: Sized + 'static {
    const KIND: ValueKind;

    fn into_value(self) -> Value;

    /// Returns `None` if the value has another kind or does not fit
    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! signed_scalar {
    ($($ty:ty),*) => {
        $(
            impl Scalar for $ty {
                const KIND: ValueKind = ValueKind::Int;

                fn into_value(self) -> Value {
                    Value::Int(self as i64)
                }

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::Int(v) => <$ty>::try_from(v).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

macro_rules! unsigned_scalar {
    ($($ty:ty),*) => {
        $(
            impl Scalar for $ty {
                const KIND: ValueKind = ValueKind::UInt;

                fn into_value(self) -> Value {
                    Value::UInt(self as u64)
                }

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::UInt(v) => <$ty>::try_from(v).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

signed_scalar!(i8, i16, i32, i64, isize);
unsigned_scalar!(u8, u16, u32, u64, usize);

impl Scalar for f64 {
    const KIND: ValueKind = ValueKind::Float;

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(v),
            _ => None,
        }
    }
}

impl Scalar for f32 {
    const KIND: ValueKind = ValueKind::Float;

    fn into_value(self) -> Value {
        Value::Float(self as f64)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(v as f32),
            _ => None,
        }
    }
}

impl Scalar for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }
}

impl Scalar for String {
    const KIND: ValueKind = ValueKind::Text;

    fn into_value(self) -> Value {
        Value::Text(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
}
