//! The `each` handler: cursor-driven iteration with optional first,
//! content and last segments and a filter predicate.

use indexmap::IndexMap;

use super::{check_keys, expect_string, optional_string};
use crate::definition::Definition;
use crate::error::CompileError;
use crate::expression_parser::CompiledExpr;
use crate::template::compiler::CompileEnv;
use crate::template::fragment::{Fragment, IterationFragment};

const KEYS: &[&str] = &[
    "each", "content", "first", "last", "filter", "itemVar", "indexVar",
];

/// `{each: snippet, content?, first?, last?, filter?, itemVar?,
/// indexVar?}`. The loop variables default to `$item` and `$index`
/// and are bound only inside the iteration's segments.
pub fn iteration(
    node: &IndexMap<String, Definition>,
    env: &mut CompileEnv<'_>,
) -> Result<Option<Fragment>, CompileError> {
    check_keys(node, KEYS)?;
    let each = CompiledExpr::parse(expect_string(node, "each")?)?;
    let filter = optional_string(node, "filter")?
        .map(CompiledExpr::parse)
        .transpose()?;
    let item_var = optional_string(node, "itemVar")?.unwrap_or("$item").to_string();
    let index_var = optional_string(node, "indexVar")?.unwrap_or("$index").to_string();

    let mut segment = |env: &mut CompileEnv<'_>, key: &str| -> Result<Option<Fragment>, CompileError> {
        node.get(key).map(|definition| env.compile(definition)).transpose()
    };
    let first = segment(env, "first")?;
    let content = segment(env, "content")?;
    let last = segment(env, "last")?;

    Ok(Some(Fragment::Iteration(Box::new(IterationFragment {
        each,
        filter,
        first,
        content,
        last,
        item_var,
        index_var,
    }))))
}
