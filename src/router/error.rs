use thiserror::Error;

/// Reasons a route cannot be registered.
///
/// Registration problems are programming errors in the route table, so the
/// panicking registration methods on [`Router`](super::Router) surface them
/// as an immediate abort. The `try_*` variants hand them back instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("path must begin with '/' in path '{path}'")]
    MissingLeadingSlash { path: String },

    #[error("a handler is already registered for path '{path}'")]
    Duplicate { path: String },

    #[error(
        "'{segment}' in new path '{path}' conflicts with existing wildcard '{wildcard}' in existing prefix '{prefix}'"
    )]
    WildcardConflict {
        path: String,
        segment: String,
        wildcard: String,
        prefix: String,
    },

    #[error("wildcard segment '{segment}' conflicts with existing children in path '{path}'")]
    ChildConflict { path: String, segment: String },

    #[error("only one wildcard per path segment is allowed, has: '{segment}' in path '{path}'")]
    InvalidWildcard { path: String, segment: String },

    #[error("wildcards must be named with a non-empty name in path '{path}'")]
    UnnamedWildcard { path: String },

    #[error("wildcard name '{name}' is used more than once in path '{path}'")]
    DuplicateWildcardName { path: String, name: String },

    #[error("catch-all routes are only allowed at the end of the path in path '{path}'")]
    CatchAllNotAtEnd { path: String },

    #[error("catch-all conflicts with existing handle for the path segment root in path '{path}'")]
    CatchAllConflict { path: String },

    #[error("no / before catch-all in path '{path}'")]
    MissingSlashBeforeCatchAll { path: String },

    #[error("path must end with /*filepath in path '{path}'")]
    MissingFilepath { path: String },
}

impl RegistrationError {
    /// The route pattern that was rejected.
    pub fn path(&self) -> &str {
        match self {
            Self::MissingLeadingSlash { path }
            | Self::Duplicate { path }
            | Self::WildcardConflict { path, .. }
            | Self::ChildConflict { path, .. }
            | Self::InvalidWildcard { path, .. }
            | Self::UnnamedWildcard { path }
            | Self::DuplicateWildcardName { path, .. }
            | Self::CatchAllNotAtEnd { path }
            | Self::CatchAllConflict { path }
            | Self::MissingSlashBeforeCatchAll { path }
            | Self::MissingFilepath { path } => path,
        }
    }
}
