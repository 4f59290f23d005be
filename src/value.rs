//! Runtime values for template rendering.
//!
//! The expression language works on a small dynamic value model. Arrays
//! and objects are shared mutable handles, so an expression that pushes
//! into a context array is observable by the caller after rendering.

use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::RenderError;

/// A host function callable from expressions.
pub type HostFn = Rc<dyn Fn(&[Value]) -> Result<Value, RenderError>>;

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Rc<RefCell<Vec<Value>>>),
    Object(Rc<RefCell<IndexMap<String, Value>>>),
    Func(HostFn),
}

impl Value {
    /// Wrap a vector in a shared array handle.
    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    /// Wrap an ordered map in a shared object handle.
    pub fn object(entries: IndexMap<String, Value>) -> Value {
        Value::Object(Rc::new(RefCell::new(entries)))
    }

    /// Wrap a host closure so expressions can call it.
    pub fn func<F>(f: F) -> Value
    where
        F: Fn(&[Value]) -> Result<Value, RenderError> + 'static,
    {
        Value::Func(Rc::new(f))
    }

    /// Truthiness: null, false, zero, NaN and the empty string are
    /// falsy; every array, object and function is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Func(_) => true,
        }
    }

    /// The value's type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) | Value::Float(_) => "number",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Func(_) => "function",
        }
    }

    /// Numeric view of the value, if it is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// String coercion matching the expression language: `null` prints
    /// as "null", arrays join their elements with commas.
    pub fn to_js_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(n) => number_to_string(*n),
            Value::Str(s) => s.clone(),
            Value::Array(items) => items
                .borrow()
                .iter()
                .map(|item| match item {
                    Value::Null => String::new(),
                    other => other.to_js_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object Object]".to_string(),
            Value::Func(_) => "function".to_string(),
        }
    }

    /// String coercion for emitted output. Unlike [`to_js_string`],
    /// null contributes nothing.
    ///
    /// [`to_js_string`]: Value::to_js_string
    pub fn to_output_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            other => other.to_js_string(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(i) => write!(f, "Int({i})"),
            Value::Float(n) => write!(f, "Float({n})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Array(items) => f.debug_tuple("Array").field(&items.borrow()).finish(),
            Value::Object(entries) => f.debug_tuple("Object").field(&entries.borrow()).finish(),
            Value::Func(_) => write!(f, "Func"),
        }
    }
}

/// Equality follows the expression language's strict `===`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        strict_equals(self, other)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Value {
        Value::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Value {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Value {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Value {
        Value::array(items)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Value {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::object(
                entries
                    .into_iter()
                    .map(|(key, item)| (key, Value::from(item)))
                    .collect(),
            ),
        }
    }
}

/// Strict `===` comparison. Int and Float compare numerically; arrays,
/// objects and functions compare by handle identity.
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x == y,
        (Value::Int(x), Value::Float(y)) | (Value::Float(y), Value::Int(x)) => *x as f64 == *y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => Rc::ptr_eq(x, y),
        (Value::Object(x), Value::Object(y)) => Rc::ptr_eq(x, y),
        (Value::Func(x), Value::Func(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

/// Loose `==` comparison: strict equality plus numeric-string and
/// boolean-to-number coercion. No other implicit conversions.
pub fn loose_equals(a: &Value, b: &Value) -> bool {
    if strict_equals(a, b) {
        return true;
    }
    match (a, b) {
        (Value::Str(s), Value::Int(_) | Value::Float(_)) => match b.as_number() {
            Some(n) => string_to_number(s) == n,
            None => false,
        },
        (Value::Int(_) | Value::Float(_), Value::Str(s)) => match a.as_number() {
            Some(n) => n == string_to_number(s),
            None => false,
        },
        (Value::Bool(flag), other) => loose_equals(&Value::Int(i64::from(*flag)), other),
        (other, Value::Bool(flag)) => loose_equals(other, &Value::Int(i64::from(*flag))),
        _ => false,
    }
}

/// Number formatting matching the expression language: integral floats
/// print without a decimal part.
pub fn number_to_string(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == value.trunc() && value.abs() < 9.0e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Numeric coercion of a string: blank strings are zero, anything that
/// does not parse is NaN.
pub fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// The root bindings a template renders against.
#[derive(Debug, Clone, Default)]
pub struct Context {
    entries: IndexMap<String, Value>,
}

impl Context {
    /// An empty context.
    pub fn new() -> Context {
        Context::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Context {
        self.entries.insert(name.into(), value.into());
        self
    }

    /// Bind a name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Look up a name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Build a context from a JSON object; any other JSON value gives
    /// an empty context.
    pub fn from_json(value: serde_json::Value) -> Context {
        match value {
            serde_json::Value::Object(entries) => Context {
                entries: entries
                    .into_iter()
                    .map(|(key, item)| (key, Value::from(item)))
                    .collect(),
            },
            _ => Context::new(),
        }
    }
}
