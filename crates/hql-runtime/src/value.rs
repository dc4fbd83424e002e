//! The dynamic value model the runtime operates on.
//!
//! Values mirror the JavaScript surface the compiled code runs against:
//! null and undefined are distinct, numbers are doubles, vectors are
//! arrays, maps and sets preserve insertion order. Equality follows
//! SameValueZero (NaN equals NaN, +0 equals -0) so values can key sets
//! and maps; collections compare structurally, functions and seqs by
//! identity.

use std::hash::{Hash, Hasher};
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};

use crate::error::{RunResult, RuntimeError};
use crate::seq::Seq;

/// A native function value.
pub type NativeFn = Rc<dyn Fn(&[Value]) -> RunResult<Value>>;

#[derive(Clone)]
pub enum Value {
    Null,
    Undefined,
    Bool(bool),
    Number(f64),
    BigInt(i64),
    Str(Rc<str>),
    Vector(Rc<Vec<Value>>),
    Map(Rc<IndexMap<Rc<str>, Value>>),
    Set(Rc<IndexSet<Value>>),
    Fn(NativeFn),
    Seq(Seq),
    /// Early-termination wrapper observed by `reduce` and transducers.
    Reduced(Rc<Value>),
}

impl Value {
    #[must_use]
    pub fn str(s: impl AsRef<str>) -> Self {
        Value::Str(Rc::from(s.as_ref()))
    }

    #[must_use]
    pub fn vector(items: Vec<Value>) -> Self {
        Value::Vector(Rc::new(items))
    }

    #[must_use]
    pub fn native_fn(f: impl Fn(&[Value]) -> RunResult<Value> + 'static) -> Self {
        Value::Fn(Rc::new(f))
    }

    /// Truthiness, JavaScript rules: `null`, `undefined`, `false`, `0`,
    /// `NaN` and `""` are falsy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null | Value::Undefined | Value::Bool(false) => false,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::BigInt(n) => *n != 0,
            Value::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Undefined => "undefined",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::Str(_) => "string",
            Value::Vector(_) => "vector",
            Value::Map(_) => "map",
            Value::Set(_) => "set",
            Value::Fn(_) => "function",
            Value::Seq(_) => "seq",
            Value::Reduced(_) => "reduced",
        }
    }

    /// The numeric value, or a type error naming `context`.
    pub fn as_number(&self, context: &str) -> RunResult<f64> {
        match self {
            Value::Number(n) => Ok(*n),
            other => Err(RuntimeError::type_error(format!(
                "{context} expects a number, got {}",
                other.type_name()
            ))),
        }
    }

    /// The callable, or a type error naming `context`.
    pub fn as_fn(&self, context: &str) -> RunResult<&NativeFn> {
        match self {
            Value::Fn(f) => Ok(f),
            other => Err(RuntimeError::type_error(format!(
                "{context} expects a function, got {}",
                other.type_name()
            ))),
        }
    }

    /// Call this value as a function.
    pub fn call(&self, args: &[Value]) -> RunResult<Value> {
        self.as_fn("call target")?(args)
    }

    /// Whether this value is wrapped in `Reduced`.
    #[must_use]
    pub fn is_reduced(&self) -> bool {
        matches!(self, Value::Reduced(_))
    }

    /// Unwrap a `Reduced`, or return the value unchanged.
    #[must_use]
    pub fn unreduced(self) -> Value {
        match self {
            Value::Reduced(inner) => (*inner).clone(),
            other => other,
        }
    }
}

/// Normalized bit pattern for SameValueZero hashing: all NaNs collapse,
/// and -0.0 hashes like +0.0.
fn number_bits(n: f64) -> u64 {
    if n.is_nan() {
        f64::NAN.to_bits()
    } else if n == 0.0 {
        0.0f64.to_bits()
    } else {
        n.to_bits()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Undefined, Value::Undefined) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => number_bits(*a) == number_bits(*b),
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Vector(a), Value::Vector(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            (Value::Set(a), Value::Set(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            (Value::Fn(a), Value::Fn(b)) => Rc::ptr_eq(a, b),
            (Value::Seq(a), Value::Seq(b)) => a.ptr_eq(b),
            (Value::Reduced(a), Value::Reduced(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null | Value::Undefined => {}
            Value::Bool(b) => b.hash(state),
            Value::Number(n) => number_bits(*n).hash(state),
            Value::BigInt(n) => n.hash(state),
            Value::Str(s) => s.hash(state),
            Value::Vector(items) => {
                for item in items.iter() {
                    item.hash(state);
                }
            }
            Value::Map(map) => {
                for (k, v) in map.iter() {
                    k.hash(state);
                    v.hash(state);
                }
            }
            Value::Set(set) => {
                for item in set.iter() {
                    item.hash(state);
                }
            }
            Value::Fn(f) => Rc::as_ptr(f).cast::<()>().hash(state),
            Value::Seq(seq) => seq.identity().hash(state),
            Value::Reduced(inner) => inner.hash(state),
        }
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Undefined => write!(f, "undefined"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::BigInt(n) => write!(f, "{n}n"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Vector(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Map(map) => f.debug_map().entries(map.iter()).finish(),
            Value::Set(set) => f.debug_set().entries(set.iter()).finish(),
            Value::Fn(_) => write!(f, "#<fn>"),
            Value::Seq(_) => write!(f, "#<seq>"),
            Value::Reduced(inner) => write!(f, "#<reduced {inner:?}>"),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{s}"),
            other => write!(f, "{other:?}"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}
