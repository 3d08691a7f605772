//! Restaurant search: distance ordering, random recommendation, and
//! price/cuisine listings over a [`foodme_core::ListingsProvider`].

mod error;
pub mod query;
pub mod random;
pub mod service;

pub use error::SearchError;
pub use random::{RandomSource, ThreadRandom};
pub use service::SearchService;
