//! Feed retrieval and entry extraction.
//!
//! - [`fetcher`] - the single HTTP GET, accepting only status 200
//! - [`parser`] - `<item>` extraction with `quick-xml`
//!
//! [`load_entries`] ties the two together for the rotator.

mod fetcher;
mod parser;

pub use fetcher::{fetch_feed, FetchError, FetchOutcome, FetchSettings};
pub use parser::{parse_entries, Entry, ParseError};

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Result of a feed load that reached the server.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Every `<item>` of the document, possibly none.
    Entries(Vec<Entry>),
    /// The endpoint answered with a status other than 200.
    NotOk(StatusCode),
}

/// Downloads the feed and extracts its entries.
pub async fn load_entries(
    client: &reqwest::Client,
    url: &str,
    settings: &FetchSettings,
) -> Result<LoadOutcome, LoadError> {
    let bytes = match fetch_feed(client, url, settings).await? {
        FetchOutcome::Document(bytes) => bytes,
        FetchOutcome::NotOk(status) => return Ok(LoadOutcome::NotOk(status)),
    };

    let entries = parse_entries(&bytes)?;
    tracing::info!(url = %url, items = entries.len(), "Feed loaded");
    Ok(LoadOutcome::Entries(entries))
}
