// Public modules
pub mod error;
pub mod resource;
pub mod rules;
pub mod script;
pub mod walker;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
pub use walker::{FileMigration, MigrationReport};
