//! Authorization aggregate

pub mod model;
pub mod repository;

pub use model::{Authorization, AuthorizationFilter};
pub use repository::AuthorizationRepository;
