//! Tag aggregate

pub mod model;
pub mod repository;

pub use model::{OcpiToken, Tag};
pub use repository::TagRepository;
