//! Startup sequence: fetch once, then hand the entries to the rotator.
//!
//! Failures before the rotation starts are never shown to the viewer. They
//! are logged and reported back as a [`Finished`] value so the binary can
//! exit quietly.

use crate::config::Config;
use crate::element::{Element, ElementError};
use crate::feed::{load_entries, Entry, LoadError, LoadOutcome};
use crate::rotator::Rotator;
use reqwest::StatusCode;
use std::time::Duration;

/// Why [`run`] returned. Outside of tests the rotation itself never ends,
/// so every variant describes a rotation that did not start or had nothing
/// to show.
#[derive(Debug)]
pub enum Finished {
    /// The feed endpoint answered with something other than 200.
    FeedUnavailable(StatusCode),
    /// The request failed or the document was not valid XML.
    LoadFailed(LoadError),
    /// The document held no `<item>`.
    NoEntries,
    /// No entry in the rotation window has a description.
    NothingToDisplay,
}

/// Builds the HTTP client used for the feed request.
pub fn build_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("feedroll/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(10))
        .build()
}

/// Loads the feed from `config.feed_url` and rotates it through an element.
///
/// `make_element` is only called once there are entries to show, so a
/// failed or empty feed leaves the display untouched.
///
/// # Errors
///
/// Only display failures are errors; everything about the feed itself ends
/// in a [`Finished`] value.
pub async fn run<E, F>(
    client: &reqwest::Client,
    config: &Config,
    make_element: F,
) -> Result<Finished, ElementError>
where
    E: Element,
    F: FnOnce() -> Result<E, ElementError>,
{
    let entries = match fetch_entries(client, config).await {
        Ok(entries) => entries,
        Err(finished) => return Ok(finished),
    };

    let Some(mut rotator) = Rotator::new(entries, make_element()?, config.timing()) else {
        return Ok(Finished::NoEntries);
    };
    rotator.run().await?;
    Ok(Finished::NothingToDisplay)
}

/// Fetches and parses the feed, mapping every non-rotating case to
/// [`Finished`].
pub async fn fetch_entries(client: &reqwest::Client, config: &Config) -> Result<Vec<Entry>, Finished> {
    let url = config.feed_url.as_str();
    match load_entries(client, url, &config.fetch_settings()).await {
        Ok(LoadOutcome::Entries(entries)) if entries.is_empty() => {
            tracing::info!(url = %url, "Feed has no items");
            Err(Finished::NoEntries)
        }
        Ok(LoadOutcome::Entries(entries)) => Ok(entries),
        Ok(LoadOutcome::NotOk(status)) => {
            tracing::info!(url = %url, status = %status, "Feed unavailable, not rotating");
            Err(Finished::FeedUnavailable(status))
        }
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Failed to load feed");
            Err(Finished::LoadFailed(e))
        }
    }
}
