//! The `tag` handler: markup elements.

use indexmap::IndexMap;

use super::{bool_key, check_keys, expect_string};
use crate::definition::Definition;
use crate::error::CompileError;
use crate::escape::escape_markup;
use crate::html_tags::is_void_tag;
use crate::template::compiler::{CompileEnv, CompileOptions};
use crate::template::fragment::{ElementFragment, Fragment, GatedContent, OmitEmptyAttrFragment, ValueProbe};

const KEYS: &[&str] = &[
    "tag", "id", "cls", "name", "value", "attr", "content", "omitEmpty",
];

/// `{tag: name, id?, cls?, name?, value?, attr?, content?, omitEmpty?}`.
///
/// Attributes emit in fixed order (`id`, `class`, `name`, `value`,
/// then `attr` entries in key order). With `omitEmpty`, the content is
/// probed once and the whole element vanishes when it comes up empty.
pub fn element(
    node: &IndexMap<String, Definition>,
    env: &mut CompileEnv<'_>,
) -> Result<Option<Fragment>, CompileError> {
    check_keys(node, KEYS)?;
    let tag = expect_string(node, "tag")?.to_string();
    let omit_empty = bool_key(node, "omitEmpty")?;

    let mut attrs = Vec::new();
    for (attr_name, key) in [("id", "id"), ("class", "cls"), ("name", "name"), ("value", "value")]
    {
        if let Some(value) = node.get(key) {
            push_attr(env, &mut attrs, attr_name, value)?;
        }
    }
    if let Some(table) = node.get("attr") {
        let Definition::Map(entries) = table else {
            return Err(CompileError::InvalidDefinition(format!(
                "\"attr\" expects an object, got {table}"
            )));
        };
        for (attr_name, value) in entries {
            push_attr(env, &mut attrs, attr_name, value)?;
        }
    }

    let content_def = node.get("content");
    // An omit-empty element with no content can never emit.
    if omit_empty && content_def.is_none() {
        return Ok(Some(Fragment::Empty));
    }

    let mut content = None;
    let mut gate = None;
    if let Some(definition) = content_def {
        let options = CompileOptions {
            separator: "\n".to_string(),
            escape: env.options().escape,
        };
        let fragment = env.compile_with(definition, options)?;
        if omit_empty {
            // The gate tests the rendered text, so a value that prints
            // (0, false) keeps its element; only empty output suppresses.
            gate = Some(GatedContent {
                temp: env.local_name(),
                value: ValueProbe::Rendered(fragment),
            });
        } else {
            content = Some(fragment);
        }
    }

    // A void tag still closes when content is supplied for it.
    let close_tag = content_def.is_some() || !is_void_tag(&tag);
    Ok(Some(Fragment::Element(Box::new(ElementFragment {
        tag,
        attrs,
        content,
        gate,
        close_tag,
    }))))
}

/// Compile one attribute into its emission fragment, ` name="value"`
/// included.
fn push_attr(
    env: &mut CompileEnv<'_>,
    attrs: &mut Vec<Fragment>,
    name: &str,
    value: &Definition,
) -> Result<(), CompileError> {
    match value {
        // false and null mean "leave the attribute out".
        Definition::Null | Definition::Bool(false) => {}
        Definition::Bool(true) => attrs.push(Fragment::Literal(format!(" {name}"))),
        Definition::Str(s) => attrs.push(Fragment::Literal(format!(
            " {name}=\"{}\"",
            escape_markup(s)
        ))),
        Definition::Number(n) => attrs.push(Fragment::Literal(format!(" {name}=\"{n}\""))),
        dynamic => {
            let options = CompileOptions {
                separator: " ".to_string(),
                escape: true,
            };
            let fragment = env.compile_with(dynamic, options)?;
            if omit_empty_requested(dynamic) {
                attrs.push(Fragment::OmitEmptyAttr(Box::new(OmitEmptyAttrFragment {
                    name: name.to_string(),
                    temp: env.local_name(),
                    value: probe_from(fragment),
                })));
            } else {
                attrs.push(Fragment::concat(vec![
                    Fragment::Literal(format!(" {name}=\"")),
                    fragment,
                    Fragment::Literal("\"".to_string()),
                ]));
            }
        }
    }
    Ok(())
}

fn omit_empty_requested(definition: &Definition) -> bool {
    matches!(definition, Definition::Map(node)
        if matches!(node.get("omitEmpty"), Some(Definition::Bool(true))))
}

/// Omit-empty probe for an attribute value. A lone expression or slot
/// probes its raw value, so falsy non-strings drop the attribute; the
/// one evaluation doubles as the emitted text, escaped per the site.
fn probe_from(fragment: Fragment) -> ValueProbe {
    match fragment {
        Fragment::Expr(expr) => ValueProbe::Expr {
            expr: expr.expr,
            escape: expr.escape,
        },
        Fragment::SlotRef(slot) => ValueProbe::Slot {
            name: slot.name,
            escape: slot.escape,
        },
        other => ValueProbe::Rendered(other),
    }
}
