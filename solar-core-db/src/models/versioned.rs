use super::identifiable::Identifiable;

/// Trait for entities written with optimistic concurrency control
///
/// Every successful update increments the version; a writer holding a stale
/// version is refused instead of overwriting a concurrent change.
pub trait Versioned: Identifiable {
    /// Returns the version the entity had when it was loaded
    fn get_version(&self) -> i32;
}
