pub mod decimal;
pub mod errors;
pub mod logging;
pub mod timeout;

pub use errors::*;
pub use timeout::with_timeout;
