//! The template compiler: dispatcher, handler registry, compiled
//! fragments and the `Template` artifact itself.
//!
//! A definition tree goes in through [`compiler::Compiler::compile`]
//! and a [`Template`] comes out: an immutable, render-ready value that
//! turns a [`Context`] into a string as many times as needed.

pub mod compiler;
pub mod fragment;
pub mod handlers;
pub mod registry;
pub mod scope;

use indexmap::IndexMap;

use crate::error::RenderError;
use crate::value::Context;
use fragment::Fragment;
use scope::Scope;

/// A slot declared by a template, in document order. Callers composing
/// with the template read these to know what it expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotDescriptor {
    pub name: String,
    pub escape: bool,
    pub required: bool,
}

/// The compiled artifact: a reusable, immutable renderer.
///
/// Rendering never mutates the template, so one instance can serve any
/// number of callers concurrently.
#[derive(Debug)]
pub struct Template {
    root: Fragment,
    slots: Vec<SlotDescriptor>,
    defaults: IndexMap<String, Fragment>,
}

impl Template {
    pub(crate) fn new(
        root: Fragment,
        slots: Vec<SlotDescriptor>,
        defaults: IndexMap<String, Fragment>,
    ) -> Template {
        Template {
            root,
            slots,
            defaults,
        }
    }

    /// Render against a context. An empty [`Context`] stands in for an
    /// omitted one.
    pub fn render(&self, context: &Context) -> Result<String, RenderError> {
        let mut scope = Scope::new(context);
        self.root.render(&mut scope)
    }

    /// The slots this template declares, in the order their first
    /// sites were encountered during compilation.
    pub fn slots(&self) -> &[SlotDescriptor] {
        &self.slots
    }

    /// Look up a declared slot by name.
    pub fn slot(&self, name: &str) -> Option<&SlotDescriptor> {
        self.slots.iter().find(|descriptor| descriptor.name == name)
    }

    pub(crate) fn root(&self) -> &Fragment {
        &self.root
    }

    pub(crate) fn default_for(&self, name: &str) -> Option<&Fragment> {
        self.defaults.get(name)
    }

    /// Human-readable outline of the compiled fragment tree, for
    /// debugging a definition.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for descriptor in &self.slots {
            out.push_str(&format!(
                "slot {{{}}} escape={} required={}\n",
                descriptor.name, descriptor.escape, descriptor.required
            ));
        }
        self.root.outline(&mut out, 0);
        out
    }
}
