#![forbid(unsafe_code)]

pub mod config;
pub mod episode;
pub mod error;
pub mod feed;
pub mod fetch;
pub mod formats;
pub mod listing;
pub mod logging;
pub mod reconcile;
pub mod resolver;
pub mod seasons;
pub mod source;
pub mod store;
pub mod sync;

pub use config::ScraperConfig;
pub use error::{Result, ScrapeError};
pub use source::{ScrapeContext, ShowSource, build_source};
