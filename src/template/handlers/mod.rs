//! Built-in node handlers, one module per node kind.
//!
//! A handler receives the object node and the compile environment and
//! bakes a fragment. Shape validation happens here, at compile time:
//! a key the handler does not recognize fails the whole compilation.

pub mod composition;
pub mod conditional;
pub mod element;
pub mod expression;
pub mod iteration;

use indexmap::IndexMap;

use crate::definition::Definition;
use crate::error::CompileError;

/// The node formatted for an error message.
pub(crate) fn node_text(node: &IndexMap<String, Definition>) -> String {
    Definition::Map(node.clone()).to_string()
}

/// Reject any key outside the handler's shape.
pub(crate) fn check_keys(
    node: &IndexMap<String, Definition>,
    allowed: &[&str],
) -> Result<(), CompileError> {
    for key in node.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(CompileError::UnknownKey {
                key: key.clone(),
                node: node_text(node),
            });
        }
    }
    Ok(())
}

/// A key that must hold a string.
pub(crate) fn expect_string<'a>(
    node: &'a IndexMap<String, Definition>,
    key: &str,
) -> Result<&'a str, CompileError> {
    match node.get(key) {
        Some(Definition::Str(s)) => Ok(s),
        Some(other) => Err(CompileError::InvalidDefinition(format!(
            "\"{key}\" expects a string, got {other}"
        ))),
        None => Err(CompileError::InvalidDefinition(format!(
            "\"{key}\" is missing in {}",
            node_text(node)
        ))),
    }
}

/// A key that may hold a string.
pub(crate) fn optional_string<'a>(
    node: &'a IndexMap<String, Definition>,
    key: &str,
) -> Result<Option<&'a str>, CompileError> {
    match node.get(key) {
        None => Ok(None),
        Some(Definition::Str(s)) => Ok(Some(s)),
        Some(other) => Err(CompileError::InvalidDefinition(format!(
            "\"{key}\" expects a string, got {other}"
        ))),
    }
}

/// A key that may hold a boolean; absent reads as false.
pub(crate) fn bool_key(
    node: &IndexMap<String, Definition>,
    key: &str,
) -> Result<bool, CompileError> {
    match node.get(key) {
        None => Ok(false),
        Some(Definition::Bool(b)) => Ok(*b),
        Some(other) => Err(CompileError::InvalidDefinition(format!(
            "\"{key}\" expects a boolean, got {other}"
        ))),
    }
}

/// A key that may hold a boolean, distinguishing absence; handlers use
/// this where the ambient options supply the default.
pub(crate) fn optional_bool(
    node: &IndexMap<String, Definition>,
    key: &str,
) -> Result<Option<bool>, CompileError> {
    match node.get(key) {
        None => Ok(None),
        Some(Definition::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(CompileError::InvalidDefinition(format!(
            "\"{key}\" expects a boolean, got {other}"
        ))),
    }
}
