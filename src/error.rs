use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

/// Structural problems found while assembling a graph from bundle input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A bundle lists a dependency key that is not part of the input mapping.
    #[error("bundle '{bundle}' depends on '{missing}', which is not in the bundle set")]
    DanglingDependency { bundle: String, missing: String },

    /// A supplied starting coordinate was NaN or infinite.
    #[error("bundle '{bundle}' has a non-finite starting position")]
    NonFinitePosition { bundle: String },
}
