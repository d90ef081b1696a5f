//! Shared utilities.

pub mod telemetry;
#[cfg(feature = "tokio-runtime")]
pub mod throttle;

pub use telemetry::*;
#[cfg(feature = "tokio-runtime")]
pub use throttle::ThrottleReduce;
