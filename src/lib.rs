//! Compile declarative layout trees into reusable markup templates.
//!
//! A layout is a JSON-shaped tree of nodes: elements (`tag`), embedded
//! expressions (`expr`), conditionals (`test`), iterations (`each`)
//! and composition points (`slot` / `use`). Compiling one produces a
//! [`Template`], a pure function from a [`Context`] to a string.
//!
//! ```
//! use layout_compiler::{compile, Context, Definition};
//! use serde_json::json;
//!
//! let definition = Definition::from(json!({
//!     "tag": "div",
//!     "cls": ["hat", "beard"],
//!     "content": {"expr": "greeting"},
//! }));
//! let template = compile(&definition).unwrap();
//! let context = Context::new().with("greeting", "hello");
//! assert_eq!(
//!     template.render(&context).unwrap(),
//!     "<div class=\"hat beard\">hello</div>",
//! );
//! ```
//!
//! Definition shapes are checked while compiling: unknown keys,
//! malformed expression snippets and broken slot contracts all fail
//! with a [`CompileError`] before a template exists. Rendering can
//! still fail (an unbound variable, a type error in an expression)
//! and then the whole render aborts with a [`RenderError`].

pub mod chars;
pub mod definition;
pub mod error;
pub mod escape;
pub mod expression_parser;
pub mod html_tags;
pub mod template;
pub mod value;

pub use definition::{Definition, Stringify};
pub use error::{CompileError, RenderError};
pub use template::compiler::{CompileEnv, CompileOptions, Compiler};
pub use template::fragment::Fragment;
pub use template::registry::{Handler, HandlerRegistry};
pub use template::{SlotDescriptor, Template};
pub use value::{Context, Value};

/// Compile a definition with the built-in handlers. Callers that need
/// custom handlers build a [`Compiler`] instead.
pub fn compile(definition: &Definition) -> Result<Template, CompileError> {
    Compiler::new().compile(definition)
}
