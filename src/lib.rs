pub mod config;
pub mod coordinator;
pub mod error;
pub mod fetcher;
pub mod formatter;
pub mod models;

pub use config::FeedConfig;
pub use coordinator::{FetchOutcome, SearchCoordinator};
pub use error::FetchError;
pub use fetcher::{FeedSource, FlickrClient};
pub use models::{FeedItemDetail, FeedItemsPage, FeedRecord, Media};
