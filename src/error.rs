//! Error types for the two phases of a template's life: compiling a
//! definition into a `Template`, and rendering that template against a
//! context.

use thiserror::Error;

/// Raised while turning a layout definition into a compiled template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The definition (or a piece of one) does not have the required shape.
    #[error("invalid definition: {0}")]
    InvalidDefinition(String),

    /// An object node matched no registered handler key.
    #[error("no handler for node: {0}")]
    UnhandledNode(String),

    /// A node carries a key its handler does not understand.
    #[error("\"{key}\" not allowed in {node}")]
    UnknownKey { key: String, node: String },

    /// An embedded expression failed to parse.
    #[error("syntax error in expression [{snippet}]: {message}")]
    ExpressionSyntax { snippet: String, message: String },

    /// A test node names no branch at all.
    #[error("test node needs at least one branch: {0}")]
    MissingTestBranch(String),

    /// A test node mixes branches from different modes.
    #[error("conflicting test branches in {0}")]
    MixedTestModes(String),

    /// A slot declares a default value while also being required.
    #[error("slot \"{0}\" is required and cannot carry a default")]
    DefaultOnRequiredSlot(String),

    /// A use node supplies no value for a required slot.
    #[error("no value supplied for required slot \"{0}\"")]
    MissingRequiredSlot(String),

    /// A use node supplies a value for a slot the target never declared.
    #[error("no slot named \"{0}\"")]
    UnknownSlot(String),

    /// The use key holds something other than a compiled template.
    #[error("\"use\" expects a compiled template, got {0}")]
    ExpectedTemplate(String),
}

/// Raised while rendering a compiled template against a context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// An expression referenced a name bound neither by the context nor
    /// by any enclosing scope frame.
    #[error("{0} is not defined")]
    UnboundVariable(String),

    /// A slot reference rendered outside any use that bound it.
    #[error("no binding for slot \"{0}\"")]
    UnsetSlot(String),

    /// An expression applied an operation to a value that cannot take it.
    #[error("type error: {0}")]
    TypeError(String),
}
