//! The `slot` and `use` handlers: declaring extension points inside a
//! template and instantiating a compiled template with values for
//! them.

use indexmap::IndexMap;
use std::sync::Arc;

use super::{bool_key, check_keys, expect_string, optional_bool};
use crate::definition::Definition;
use crate::error::CompileError;
use crate::template::compiler::{CompileEnv, CompileOptions};
use crate::template::fragment::{Fragment, SlotRefFragment, UseFragment};
use crate::template::SlotDescriptor;

const SLOT_KEYS: &[&str] = &["slot", "escape", "required", "default", "omitEmpty"];

/// `{slot: name, escape?, required?, default?}`. Declares the slot on
/// the template being compiled and emits a reference to its binding.
/// The first site for a name fixes the descriptor; later sites share
/// the one resolved value but keep their own escape setting.
pub fn slot(
    node: &IndexMap<String, Definition>,
    env: &mut CompileEnv<'_>,
) -> Result<Option<Fragment>, CompileError> {
    check_keys(node, SLOT_KEYS)?;
    bool_key(node, "omitEmpty")?;
    let name = expect_string(node, "slot")?.to_string();
    let required = bool_key(node, "required")?;
    let default = node.get("default");
    if required && default.is_some() {
        return Err(CompileError::DefaultOnRequiredSlot(name));
    }
    let escape = optional_bool(node, "escape")?.unwrap_or(env.options().escape);

    env.declare_slot(SlotDescriptor {
        name: name.clone(),
        escape,
        required,
    });
    if let Some(definition) = default {
        let fragment = env.compile_with(definition, binding_options())?;
        env.set_slot_default(name.clone(), fragment);
    }

    Ok(Some(Fragment::SlotRef(SlotRefFragment { name, escape })))
}

/// `{use: template, <slotName>: node, ...}`. Resolves one binding per
/// declared slot: the supplied node, else the slot's default, else an
/// empty string; a required slot with neither fails, as does a key
/// naming no declared slot. All of that happens here, at compile time.
pub fn compose(
    node: &IndexMap<String, Definition>,
    env: &mut CompileEnv<'_>,
) -> Result<Option<Fragment>, CompileError> {
    // Declines without a `use` key so the handler stays well-behaved
    // when registered under another discriminant.
    let target = match node.get("use") {
        Some(Definition::Template(template)) => Arc::clone(template),
        Some(other) => return Err(CompileError::ExpectedTemplate(other.to_string())),
        None => return Ok(None),
    };

    for key in node.keys() {
        if key != "use" && target.slot(key).is_none() {
            return Err(CompileError::UnknownSlot(key.clone()));
        }
    }

    let mut bindings = Vec::with_capacity(target.slots().len());
    for descriptor in target.slots() {
        let fragment = if let Some(supplied) = node.get(&descriptor.name) {
            env.compile_with(supplied, binding_options())?
        } else if let Some(default) = target.default_for(&descriptor.name) {
            default.clone()
        } else if descriptor.required {
            return Err(CompileError::MissingRequiredSlot(descriptor.name.clone()));
        } else {
            Fragment::Empty
        };
        bindings.push((descriptor.name.clone(), fragment));
    }

    Ok(Some(Fragment::Use(Box::new(UseFragment {
        template: target,
        bindings,
    }))))
}

/// Slot values compile unescaped; each reference site applies its own
/// escape to the one shared rendering.
fn binding_options() -> CompileOptions {
    CompileOptions {
        separator: "\n".to_string(),
        escape: false,
    }
}
