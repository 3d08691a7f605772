//! Restaurant listings provider client.

pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

pub use client::ListingsClient;
pub use error::ListingsError;
