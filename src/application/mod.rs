//! Application services layer.

pub mod error;
pub mod generator;
pub mod markdown;
pub mod notify;
pub mod reports;
pub mod repos;
pub mod subscriptions;
