//! Gmail adapter — metadata fetch and label-change action execution.

pub mod client;
pub mod executor;

pub use client::GmailClient;
pub use executor::GmailExecutor;
