//! External card metadata: fetch, cache, normalize, translate and join.

pub mod cache;
pub mod client;
pub mod error;
pub mod index;
pub mod join;
pub mod provider;
pub(crate) mod retry;
pub mod translate;
pub mod types;

pub use cache::{CacheStatus, CardCache};
pub use client::MetadataClient;
pub use error::EnrichError;
pub use index::CardIndex;
pub use join::{join, seed_reference, JoinOutcome, UntranslatedValue};
pub use provider::{CatalogOrigin, FetchedCatalog, MetadataProvider};
pub use translate::translate_card;
pub use types::RawExternalCard;
