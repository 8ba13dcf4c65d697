use thiserror::Error;

/// The projection could not produce a consistent snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("project {project}: configuration `{name}` is defined more than once")]
    DuplicateConfiguration { project: String, name: String },
}

/// A host could not resolve a configuration (or classpath) it was asked for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("configuration `{0}` does not exist")]
    UnknownConfiguration(String),
    #[error("configuration `{0}` cannot be resolved")]
    NotResolvable(String),
    #[error("failed to resolve `{configuration}`: {message}")]
    Failed {
        configuration: String,
        message: String,
    },
}

/// A capability probe against a host extension failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("extension `{extension}` has no member `{member}`")]
    MissingMember { extension: String, member: String },
    #[error("`{member}` returned an unexpected value: {message}")]
    UnexpectedValue { member: String, message: String },
}
