//! Rotates the entries of an RSS feed through a single display element.
//!
//! The feed is fetched once. Up to five entries are then shown one after
//! another, each faded in, held for a few seconds and faded out, forever.
//!
//! - [`feed`] - fetching and `<item>` extraction
//! - [`rotator`] - the timed rotation loop
//! - [`element`] - display backends (HTML page, terminal)
//! - [`render`] - entry markup and its plain-text form
//! - [`config`] - TOML configuration
//! - [`app`] - the startup sequence tying it together

pub mod app;
pub mod config;
pub mod element;
pub mod feed;
pub mod render;
pub mod rotator;
