use thiserror::Error;

/// Result type used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors reported by the knowledge base.
#[derive(Error, Debug)]
pub enum Error {
    /// A fact was asserted with a rule variable in one of its positions.
    #[error("fact for `{predicate}` has rule variable `{variable}` at position {position}")]
    FactDeclaration {
        /// Diagnostic name of the predicate
        predicate: String,
        /// Zero-based argument position holding the variable
        position: usize,
        /// Name of the offending rule variable
        variable: String,
    },

    /// A configuration document could not be parsed.
    #[cfg(feature = "serde")]
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
