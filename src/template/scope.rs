//! Render-time scopes and compile-time name allocation.
//!
//! A scope is the base context plus a stack of frames. Variable frames
//! and slot frames are separate namespaces: slot bindings can never
//! shadow a variable and expressions can never read a slot.

use indexmap::IndexMap;

use crate::value::{Context, Value};

#[derive(Debug)]
enum Frame {
    Vars(IndexMap<String, Value>),
    Slots(IndexMap<String, String>),
}

/// The lookup environment a template renders against.
#[derive(Debug)]
pub struct Scope<'a> {
    context: &'a Context,
    frames: Vec<Frame>,
}

impl<'a> Scope<'a> {
    pub fn new(context: &'a Context) -> Scope<'a> {
        Scope {
            context,
            frames: Vec::new(),
        }
    }

    /// Variable lookup, innermost frame first, then the context.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        for frame in self.frames.iter().rev() {
            if let Frame::Vars(bindings) = frame {
                if let Some(value) = bindings.get(name) {
                    return Some(value.clone());
                }
            }
        }
        self.context.get(name).cloned()
    }

    /// Slot lookup, innermost frame first. Slots never fall back to
    /// the context.
    pub fn lookup_slot(&self, name: &str) -> Option<&str> {
        for frame in self.frames.iter().rev() {
            if let Frame::Slots(bindings) = frame {
                if let Some(text) = bindings.get(name) {
                    return Some(text);
                }
            }
        }
        None
    }

    /// Push a variable frame; bindings shadow outer ones of the same
    /// name until [`pop`].
    ///
    /// [`pop`]: Scope::pop
    pub fn push_vars(&mut self, bindings: IndexMap<String, Value>) {
        self.frames.push(Frame::Vars(bindings));
    }

    /// Push a slot frame holding pre-rendered strings.
    pub fn push_slots(&mut self, bindings: IndexMap<String, String>) {
        self.frames.push(Frame::Slots(bindings));
    }

    /// Update a binding in the innermost variable frame. Callers pair
    /// this with a frame they pushed themselves.
    pub fn rebind(&mut self, name: &str, value: Value) {
        if let Some(Frame::Vars(bindings)) = self.frames.last_mut() {
            bindings.insert(name.to_string(), value);
        }
    }

    /// Drop the innermost frame.
    pub fn pop(&mut self) {
        self.frames.pop();
    }
}

/// Issues binding names for compiler-introduced temporaries. The
/// reserved `_layout$` prefix keeps them clear of anything a
/// definition author would write, so loop variables and omit-empty
/// probes cannot collide with caller-chosen names.
#[derive(Debug, Default)]
pub struct NameAllocator {
    next: usize,
}

impl NameAllocator {
    pub fn new() -> NameAllocator {
        NameAllocator::default()
    }

    /// Next unique local name: `_layout$0`, `_layout$1`, ...
    pub fn local_name(&mut self) -> String {
        let name = format!("_layout${}", self.next);
        self.next += 1;
        name
    }
}
