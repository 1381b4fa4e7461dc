//! Error taxonomy shared by the navigator, signature builder and resolvers.

use thiserror::Error;

/// Library result type
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// No `ContractDefinition` with that name in the source unit.
    #[error("contract {name} not found in {path}")]
    ContractNotFound { path: String, name: String },

    #[error("source {0} not found in build-info output")]
    SourceNotFound(String),

    /// A declaration kind the signature builder does not know how to render.
    #[error("unsupported node kind {node_type} (id {id:?})")]
    UnsupportedNodeKind { node_type: String, id: Option<i64> },

    #[error("unknown tag @{tag} on {declaration}")]
    UnknownTag { tag: String, declaration: String },

    #[error("invalid @inheritdoc {reference} on {declaration}")]
    InvalidInheritdoc {
        reference: String,
        declaration: String,
    },

    #[error("malformed build-info: {0}")]
    MalformedBuildInfo(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Problems the resolver reports next to a partial record; these never
    /// abort the surrounding contract unless the caller asks for strictness.
    pub fn is_declaration_level(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedNodeKind { .. }
                | Error::UnknownTag { .. }
                | Error::InvalidInheritdoc { .. }
        )
    }
}
