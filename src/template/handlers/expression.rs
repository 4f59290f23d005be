//! The `expr` handler: an embedded expression emitted as text.

use indexmap::IndexMap;

use super::{check_keys, expect_string, optional_bool};
use crate::definition::Definition;
use crate::error::CompileError;
use crate::expression_parser::CompiledExpr;
use crate::template::compiler::CompileEnv;
use crate::template::fragment::{ExprFragment, Fragment};

const KEYS: &[&str] = &["expr", "escape", "omitEmpty"];

/// `{expr: snippet, escape?}`. The snippet parses now; a bad one never
/// reaches a render. `omitEmpty` is accepted here and acted on by the
/// element handler when the node sits in attribute or gated-content
/// position.
pub fn expression(
    node: &IndexMap<String, Definition>,
    env: &mut CompileEnv<'_>,
) -> Result<Option<Fragment>, CompileError> {
    check_keys(node, KEYS)?;
    super::bool_key(node, "omitEmpty")?;
    let expr = CompiledExpr::parse(expect_string(node, "expr")?)?;
    let escape = optional_bool(node, "escape")?.unwrap_or(env.options().escape);
    Ok(Some(Fragment::Expr(ExprFragment { expr, escape })))
}
