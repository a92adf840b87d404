//! Five-element destiny consultation engine.
//!
//! This crate provides:
//! - Birth-year to destiny-element resolution via a sexagenary lookup table
//! - Relation lookups against the consultation backend, memoized per element
//! - Aggregation of a complete consultation view-model
//!
//! # Quick Start
//!
//! ```ignore
//! use koi_api::Client;
//! use koi_core::Consultant;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::from_env("https://api.koipond.example");
//!     let consultant = Consultant::new(client);
//!
//!     let result = consultant.consult("1990").await?;
//!     println!("Your destiny is {}", result.destiny);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod consultation;
pub mod destiny;
pub mod source;
pub mod testing;

// Primary public API
pub use cache::RelationCache;
pub use consultation::{Consultant, ConsultationError, ConsultationResult};
pub use destiny::{DestinyElement, DestinyTable};
pub use source::RelationSource;
pub use testing::ScriptedSource;
