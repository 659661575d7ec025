//! Repository factory trait
//!
//! Lets callers build a repository from whatever backs it without knowing the
//! concrete implementation.

/// A trait for database repository factories
///
/// Generic over the repository type and the value it is built from.
pub trait RepositoryFactory<R, C> {
    /// Create a new repository instance
    fn create_repository(&self, config: C) -> R;
}
