//! User aggregate

pub mod model;
pub mod repository;

pub use model::{User, UserOrigin};
pub use repository::UserRepository;
