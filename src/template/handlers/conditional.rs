//! The `test` handler: branch on an evaluated condition.

use indexmap::IndexMap;

use super::{check_keys, expect_string, node_text};
use crate::definition::Definition;
use crate::error::CompileError;
use crate::expression_parser::CompiledExpr;
use crate::template::compiler::CompileEnv;
use crate::template::fragment::{ConditionalFragment, ConditionalMode, Fragment};

const KEYS: &[&str] = &[
    "test", "yes", "no", "empty", "notEmpty", "plural", "singular", "none",
];

const TRUTH_KEYS: &[&str] = &["yes", "no"];
const EMPTINESS_KEYS: &[&str] = &["empty", "notEmpty"];
const COUNT_KEYS: &[&str] = &["plural", "singular", "none"];

/// `{test: snippet}` plus exactly one branch family: `yes`/`no`,
/// `empty`/`notEmpty` or `plural`/`singular`/`none`. Mixing families,
/// or naming none, is a definition error.
pub fn conditional(
    node: &IndexMap<String, Definition>,
    env: &mut CompileEnv<'_>,
) -> Result<Option<Fragment>, CompileError> {
    check_keys(node, KEYS)?;
    let test = CompiledExpr::parse(expect_string(node, "test")?)?;

    let has = |keys: &[&str]| keys.iter().any(|key| node.contains_key(*key));
    let active: Vec<bool> = [TRUTH_KEYS, EMPTINESS_KEYS, COUNT_KEYS]
        .iter()
        .map(|keys| has(keys))
        .collect();
    match active.iter().filter(|present| **present).count() {
        0 => return Err(CompileError::MissingTestBranch(node_text(node))),
        1 => {}
        _ => return Err(CompileError::MixedTestModes(node_text(node))),
    }

    let mut branch = |env: &mut CompileEnv<'_>, key: &str| -> Result<Option<Fragment>, CompileError> {
        node.get(key).map(|definition| env.compile(definition)).transpose()
    };

    let mode = if active[0] {
        ConditionalMode::Truth {
            yes: branch(env, "yes")?,
            no: branch(env, "no")?,
        }
    } else if active[1] {
        ConditionalMode::Emptiness {
            empty: branch(env, "empty")?,
            not_empty: branch(env, "notEmpty")?,
        }
    } else {
        ConditionalMode::Count {
            plural: branch(env, "plural")?,
            singular: branch(env, "singular")?,
            none: branch(env, "none")?,
        }
    };

    Ok(Some(Fragment::Conditional(Box::new(ConditionalFragment {
        temp: env.local_name(),
        test,
        mode,
    }))))
}
