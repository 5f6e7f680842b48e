//! Field kinds, converted values, and the [`FieldType`] trait that ties a Rust
//! type to both.
//!
//! The set of kinds is closed: every configuration leaf is a boolean, an
//! integer or float of some width, a string, a duration, or a sequence of one
//! of those. Types outside that set can still be registered through
//! [`Kind::Unsupported`], but any attempt to convert text into them fails.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use chrono::TimeDelta;

use crate::convert::{format_duration, format_signed_duration};

/// The shape of a configuration field, as seen by the converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Bool,
    /// Signed integer of the given bit width.
    Int(u32),
    /// Unsigned integer of the given bit width.
    Uint(u32),
    /// Floating point of the given bit width (32 or 64).
    Float(u32),
    Str,
    Duration,
    /// A duration that may be negative.
    SignedDuration,
    /// Comma-separated sequence of the inner kind.
    Seq(Box<Kind>),
    /// A type with no textual conversion. Carries the name used in errors.
    Unsupported(&'static str),
}

impl Kind {
    /// Human-readable type name used in error messages and help output.
    pub fn type_name(&self) -> String {
        match self {
            Kind::Bool => "bool".into(),
            Kind::Int(bits) => format!("i{bits}"),
            Kind::Uint(bits) => format!("u{bits}"),
            Kind::Float(bits) => format!("f{bits}"),
            Kind::Str => "string".into(),
            Kind::Duration | Kind::SignedDuration => "duration".into(),
            Kind::Seq(elem) => format!("[{}]", elem.type_name()),
            Kind::Unsupported(name) => (*name).into(),
        }
    }
}

/// A value produced by [`convert`](crate::convert::convert).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
    Duration(Duration),
    SignedDuration(TimeDelta),
    Seq(Vec<Value>),
}

/// A Rust type that can back a configuration field.
///
/// `Default` is the type's zero value: a `required` field still equal to it
/// after resolution is reported as missing.
pub trait FieldType: Clone + PartialEq + Default {
    fn kind() -> Kind;

    /// Build `Self` from a converted value of [`Self::kind()`].
    /// Returns `None` if the value does not fit.
    fn from_value(value: Value) -> Option<Self>;

    /// Render to the canonical text form accepted back by the converter.
    fn render(&self) -> String;
}

macro_rules! signed_field {
    ($($t:ty),*) => {$(
        impl FieldType for $t {
            fn kind() -> Kind {
                Kind::Int(<$t>::BITS)
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::Int(i) => <$t>::try_from(i).ok(),
                    _ => None,
                }
            }

            fn render(&self) -> String {
                self.to_string()
            }
        }
    )*};
}

macro_rules! unsigned_field {
    ($($t:ty),*) => {$(
        impl FieldType for $t {
            fn kind() -> Kind {
                Kind::Uint(<$t>::BITS)
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::Uint(u) => <$t>::try_from(u).ok(),
                    _ => None,
                }
            }

            fn render(&self) -> String {
                self.to_string()
            }
        }
    )*};
}

signed_field!(i8, i16, i32, i64, isize);
unsigned_field!(u8, u16, u32, u64, usize);

impl FieldType for f32 {
    fn kind() -> Kind {
        Kind::Float(32)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            // The converter already range-checked against f32.
            Value::Float(f) => Some(f as f32),
            _ => None,
        }
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl FieldType for f64 {
    fn kind() -> Kind {
        Kind::Float(64)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(f),
            _ => None,
        }
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl FieldType for bool {
    fn kind() -> Kind {
        Kind::Bool
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl FieldType for String {
    fn kind() -> Kind {
        Kind::Str
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    fn render(&self) -> String {
        self.clone()
    }
}

impl FieldType for Duration {
    fn kind() -> Kind {
        Kind::Duration
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Duration(d) => Some(d),
            _ => None,
        }
    }

    fn render(&self) -> String {
        format_duration(*self)
    }
}

impl FieldType for TimeDelta {
    fn kind() -> Kind {
        Kind::SignedDuration
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::SignedDuration(d) => Some(d),
            _ => None,
        }
    }

    fn render(&self) -> String {
        format_signed_duration(*self)
    }
}

impl<T: FieldType> FieldType for Vec<T> {
    fn kind() -> Kind {
        Kind::Seq(Box::new(T::kind()))
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Seq(items) => items.into_iter().map(T::from_value).collect(),
            _ => None,
        }
    }

    fn render(&self) -> String {
        self.iter().map(T::render).collect::<Vec<_>>().join(",")
    }
}

// Maps can sit in a config struct but have no textual form: converting into
// them always fails with `InvalidTypeForDefaultValues`.
impl FieldType for BTreeMap<String, String> {
    fn kind() -> Kind {
        Kind::Unsupported("map")
    }

    fn from_value(_: Value) -> Option<Self> {
        None
    }

    fn render(&self) -> String {
        render_entries(self.iter())
    }
}

impl FieldType for HashMap<String, String> {
    fn kind() -> Kind {
        Kind::Unsupported("map")
    }

    fn from_value(_: Value) -> Option<Self> {
        None
    }

    fn render(&self) -> String {
        let sorted: BTreeMap<_, _> = self.iter().collect();
        render_entries(sorted.into_iter())
    }
}

fn render_entries<'e>(entries: impl Iterator<Item = (&'e String, &'e String)>) -> String {
    entries
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(",")
}
