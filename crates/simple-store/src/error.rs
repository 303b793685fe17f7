use simple_store_path::PathError;
use thiserror::Error;

/// Errors returned by store mutations.
///
/// Reads never fail and removing listeners never fails, so every variant
/// comes from an operation that needed a target.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error(transparent)]
    Path(#[from] PathError),
    /// A predicate passed to an item operation matched nothing.
    #[error("object not found in {path}")]
    ItemNotFound { path: String },
    /// An item operation addressed something that is not an array.
    #[error("not an array: {path}")]
    NotArray { path: String },
    /// The change emitter gave up. The state was already written.
    #[error("change emitter failed: {0}")]
    Emitter(String),
}
