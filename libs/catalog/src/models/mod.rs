//! Catalog models

pub mod movie;
pub mod user;

// Re-export for convenience
pub use movie::{DueReminder, Movie, MovieChanges, MovieInput, MoviePage, MoviePatch, NewMovie};
pub use user::{User, normalize_email};
