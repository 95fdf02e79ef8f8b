//! The display region the rotator drives.
//!
//! An [`Element`] behaves like a single DOM node: it has inner HTML and a
//! visibility toggle. Backends decide what "visible" means on their medium.

mod html;
mod terminal;

pub use html::HtmlPageElement;
pub use terminal::TerminalElement;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ElementError {
    #[error("Failed to update display: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode display state: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A single display region with replaceable content and a hide toggle.
pub trait Element {
    fn is_visible(&self) -> bool;

    /// Starts the fade-out. The rotator waits for the fade before swapping.
    fn hide(&mut self) -> Result<(), ElementError>;

    fn show(&mut self) -> Result<(), ElementError>;

    /// Replaces the element content. `html` is trusted and not escaped.
    fn set_inner_html(&mut self, html: &str) -> Result<(), ElementError>;
}
