//! Infrastructure layer - external concerns

pub mod integrations;
pub mod storage;

pub use integrations::StaticIntegrations;
pub use storage::InMemoryStorage;
