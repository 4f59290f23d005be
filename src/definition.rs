//! Layout definitions: the declarative tree handed to the compiler.
//!
//! A definition is JSON-shaped (null, booleans, numbers, strings,
//! sequences, maps) plus two kinds only a host program can produce:
//! already-compiled templates for composition, and custom leaves that
//! know how to print themselves.

use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

use crate::template::Template;

/// A custom leaf value. It is stringified once, at compile time, and
/// the result is baked into the template as a literal.
pub trait Stringify: Send + Sync {
    fn stringify(&self) -> String;
}

/// A node in a layout definition.
#[derive(Clone)]
pub enum Definition {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Str(String),
    Seq(Vec<Definition>),
    Map(IndexMap<String, Definition>),
    Template(Arc<Template>),
    Custom(Arc<dyn Stringify>),
}

impl Definition {
    /// Build a map node from key/value pairs, preserving order.
    pub fn map<'a>(entries: impl IntoIterator<Item = (&'a str, Definition)>) -> Definition {
        Definition::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        )
    }

    /// Build a sequence node.
    pub fn seq(items: impl IntoIterator<Item = Definition>) -> Definition {
        Definition::Seq(items.into_iter().collect())
    }

    /// Wrap a custom leaf.
    pub fn custom(value: impl Stringify + 'static) -> Definition {
        Definition::Custom(Arc::new(value))
    }

    /// Parse a definition from JSON text. Map keys keep their order.
    pub fn from_json_str(text: &str) -> Result<Definition, serde_json::Error> {
        serde_json::from_str::<serde_json::Value>(text).map(Definition::from)
    }
}

/// JSON-flavored rendering, used when a node has to be named in an
/// error message.
impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Definition::Null => f.write_str("null"),
            Definition::Bool(b) => write!(f, "{b}"),
            Definition::Number(n) => write!(f, "{n}"),
            Definition::Str(s) => write!(f, "{s:?}"),
            Definition::Seq(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Definition::Map(entries) => {
                f.write_str("{")?;
                for (index, (key, value)) in entries.iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{key:?}:{value}")?;
                }
                f.write_str("}")
            }
            Definition::Template(_) => f.write_str("<template>"),
            Definition::Custom(_) => f.write_str("<custom>"),
        }
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<bool> for Definition {
    fn from(b: bool) -> Definition {
        Definition::Bool(b)
    }
}

impl From<i32> for Definition {
    fn from(i: i32) -> Definition {
        Definition::Number(serde_json::Number::from(i))
    }
}

impl From<i64> for Definition {
    fn from(i: i64) -> Definition {
        Definition::Number(serde_json::Number::from(i))
    }
}

impl From<f64> for Definition {
    fn from(n: f64) -> Definition {
        serde_json::Number::from_f64(n)
            .map(Definition::Number)
            .unwrap_or(Definition::Null)
    }
}

impl From<&str> for Definition {
    fn from(s: &str) -> Definition {
        Definition::Str(s.to_string())
    }
}

impl From<String> for Definition {
    fn from(s: String) -> Definition {
        Definition::Str(s)
    }
}

impl From<Vec<Definition>> for Definition {
    fn from(items: Vec<Definition>) -> Definition {
        Definition::Seq(items)
    }
}

impl From<Template> for Definition {
    fn from(template: Template) -> Definition {
        Definition::Template(Arc::new(template))
    }
}

impl From<Arc<Template>> for Definition {
    fn from(template: Arc<Template>) -> Definition {
        Definition::Template(template)
    }
}

impl From<serde_json::Value> for Definition {
    fn from(value: serde_json::Value) -> Definition {
        match value {
            serde_json::Value::Null => Definition::Null,
            serde_json::Value::Bool(b) => Definition::Bool(b),
            serde_json::Value::Number(n) => Definition::Number(n),
            serde_json::Value::String(s) => Definition::Str(s),
            serde_json::Value::Array(items) => {
                Definition::Seq(items.into_iter().map(Definition::from).collect())
            }
            serde_json::Value::Object(entries) => Definition::Map(
                entries
                    .into_iter()
                    .map(|(key, item)| (key, Definition::from(item)))
                    .collect(),
            ),
        }
    }
}
