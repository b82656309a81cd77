//! Infrastructure adapters and runtime bootstrap.

pub mod assets;
pub mod error;
pub mod github;
pub mod http;
pub mod push;
pub mod reports;
pub mod subscriptions;
pub mod telemetry;
