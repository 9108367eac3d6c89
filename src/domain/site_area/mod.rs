//! Site area aggregate

pub mod model;
pub mod repository;

pub use model::{SiteArea, SiteAreaLimitSource};
pub use repository::SiteAreaRepository;
