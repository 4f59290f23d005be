//! The compiler entry point and the environment handlers compile in.

use indexmap::IndexMap;

use crate::definition::Definition;
use crate::error::CompileError;
use crate::template::fragment::{Fragment, SequenceFragment};
use crate::template::registry::{Handler, HandlerRegistry};
use crate::template::scope::NameAllocator;
use crate::template::{SlotDescriptor, Template};

/// Options in force while a subtree compiles. Handlers adjust them for
/// their children (attribute values join with spaces, slot bindings
/// compile unescaped) and the dispatcher threads them through.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Separator between sequence siblings.
    pub separator: String,
    /// Default escape setting for expressions and slots that do not
    /// choose their own.
    pub escape: bool,
}

impl Default for CompileOptions {
    fn default() -> CompileOptions {
        CompileOptions {
            separator: "\n".to_string(),
            escape: true,
        }
    }
}

/// The template compiler. Owns its handler registry; registration is
/// done before compiling, and compiled templates never consult the
/// registry again.
#[derive(Debug)]
pub struct Compiler {
    registry: HandlerRegistry,
}

impl Default for Compiler {
    fn default() -> Compiler {
        Compiler::new()
    }
}

impl Compiler {
    /// A compiler with the six built-in handlers.
    pub fn new() -> Compiler {
        Compiler {
            registry: HandlerRegistry::with_builtins(),
        }
    }

    /// A compiler over a caller-assembled registry.
    pub fn with_registry(registry: HandlerRegistry) -> Compiler {
        Compiler { registry }
    }

    /// Add or replace a handler. See [`HandlerRegistry::register`].
    pub fn register(&mut self, name: impl Into<String>, handler: Handler) {
        self.registry.register(name, handler);
    }

    /// Add or replace several handlers in order.
    pub fn register_all<N>(&mut self, pairs: impl IntoIterator<Item = (N, Handler)>)
    where
        N: Into<String>,
    {
        self.registry.register_all(pairs);
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Compile a definition into a template. Only a sequence or an
    /// object node can stand at the root.
    pub fn compile(&self, definition: &Definition) -> Result<Template, CompileError> {
        if !matches!(definition, Definition::Seq(_) | Definition::Map(_)) {
            return Err(CompileError::InvalidDefinition(definition.to_string()));
        }
        let mut env = CompileEnv::new(&self.registry);
        let root = env.compile(definition)?;
        let (slots, defaults) = env.finish();
        Ok(Template::new(root, slots, defaults))
    }
}

/// What a handler sees while compiling: the dispatcher, the ambient
/// options, the slot table of the template under construction and the
/// temporary-name allocator.
pub struct CompileEnv<'a> {
    registry: &'a HandlerRegistry,
    options: CompileOptions,
    names: NameAllocator,
    slots: Vec<SlotDescriptor>,
    defaults: IndexMap<String, Fragment>,
}

impl<'a> CompileEnv<'a> {
    fn new(registry: &'a HandlerRegistry) -> CompileEnv<'a> {
        CompileEnv {
            registry,
            options: CompileOptions::default(),
            names: NameAllocator::new(),
            slots: Vec::new(),
            defaults: IndexMap::new(),
        }
    }

    /// The options in force for the node being compiled.
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// A fresh temporary-binding name, free of collisions with
    /// caller-chosen names.
    pub fn local_name(&mut self) -> String {
        self.names.local_name()
    }

    /// Record a slot declaration on the template under construction.
    /// The first site for a name fixes its descriptor; later sites are
    /// extra reference points.
    pub fn declare_slot(&mut self, descriptor: SlotDescriptor) {
        if !self.slots.iter().any(|d| d.name == descriptor.name) {
            self.slots.push(descriptor);
        }
    }

    /// Attach a compiled default for a slot name; the first default
    /// wins, like the descriptor itself.
    pub fn set_slot_default(&mut self, name: impl Into<String>, fragment: Fragment) {
        self.defaults.entry(name.into()).or_insert(fragment);
    }

    /// Compile a child node under the current options.
    pub fn compile(&mut self, definition: &Definition) -> Result<Fragment, CompileError> {
        match definition {
            Definition::Null => Ok(Fragment::Empty),
            Definition::Bool(b) => Ok(Fragment::Literal(b.to_string())),
            Definition::Number(n) => Ok(Fragment::Literal(n.to_string())),
            Definition::Str(s) => Ok(Fragment::Literal(s.clone())),
            Definition::Custom(custom) => Ok(Fragment::Literal(custom.stringify())),
            Definition::Seq(items) => {
                let mut fragments = Vec::with_capacity(items.len());
                for item in items {
                    if matches!(item, Definition::Null) {
                        continue;
                    }
                    fragments.push(self.compile(item)?);
                }
                Ok(Fragment::Sequence(SequenceFragment {
                    items: fragments,
                    separator: self.options.separator.clone(),
                }))
            }
            Definition::Map(node) => self.dispatch(node, definition),
            Definition::Template(_) => Err(CompileError::UnhandledNode(definition.to_string())),
        }
    }

    /// Compile a child node under altered options, restoring the
    /// ambient ones afterwards.
    pub fn compile_with(
        &mut self,
        definition: &Definition,
        options: CompileOptions,
    ) -> Result<Fragment, CompileError> {
        let saved = std::mem::replace(&mut self.options, options);
        let result = self.compile(definition);
        self.options = saved;
        result
    }

    fn dispatch(
        &mut self,
        node: &IndexMap<String, Definition>,
        definition: &Definition,
    ) -> Result<Fragment, CompileError> {
        for index in 0..self.registry.len() {
            let handler = match self.registry.entry_at(index) {
                Some((name, handler)) if node.contains_key(name) => handler.clone(),
                _ => continue,
            };
            if let Some(fragment) = (*handler)(node, self)? {
                return Ok(fragment);
            }
        }
        Err(CompileError::UnhandledNode(definition.to_string()))
    }

    fn finish(self) -> (Vec<SlotDescriptor>, IndexMap<String, Fragment>) {
        (self.slots, self.defaults)
    }
}
