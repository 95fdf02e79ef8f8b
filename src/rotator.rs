//! The feed rotation loop.
//!
//! Each step shows one entry: fade the element out (if it is showing),
//! pause, swap the content, fade in, then hold it on screen. Entries without
//! a description are passed over without touching the element or waiting.

use crate::element::{Element, ElementError};
use crate::feed::Entry;
use crate::render::entry_html;
use std::time::Duration;

/// Timing and window size of the rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationTiming {
    /// Wait after hiding a visible element, covering the fade-out.
    pub hide_delay: Duration,
    /// Wait before every content swap, visible or not.
    pub swap_delay: Duration,
    /// How long each entry stays on screen.
    pub display_duration: Duration,
    /// Only the first `max_entries` entries take part in the rotation.
    pub max_entries: usize,
}

impl Default for RotationTiming {
    fn default() -> Self {
        Self {
            hide_delay: Duration::from_millis(1_000),
            swap_delay: Duration::from_millis(500),
            display_duration: Duration::from_millis(7_000),
            max_entries: 5,
        }
    }
}

/// Index of the next entry to visit.
///
/// Wraps to 0 once it reaches the window size or runs past the last entry.
#[derive(Debug, Clone)]
pub struct RotationCursor {
    index: usize,
    len: usize,
    max_entries: usize,
}

impl RotationCursor {
    pub fn new(len: usize, max_entries: usize) -> Self {
        Self {
            index: 0,
            len,
            max_entries,
        }
    }

    /// Number of entries the cursor cycles through.
    pub fn window(&self) -> usize {
        self.len.min(self.max_entries)
    }

    /// Returns the index to visit now and moves past it.
    ///
    /// Must not be called on an empty window.
    pub fn advance(&mut self) -> usize {
        if self.index >= self.max_entries || self.index >= self.len {
            self.index = 0;
        }
        let current = self.index;
        self.index += 1;
        current
    }
}

/// What a single rotation step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Displayed { index: usize },
    /// The entry had no description; nothing changed and no time passed.
    Skipped { index: usize },
}

pub struct Rotator<E> {
    entries: Vec<Entry>,
    element: E,
    timing: RotationTiming,
    cursor: RotationCursor,
}

impl<E: Element> Rotator<E> {
    /// Returns `None` when there is nothing to rotate (no entries, or a zero
    /// window), in which case the element is never touched.
    pub fn new(entries: Vec<Entry>, element: E, timing: RotationTiming) -> Option<Self> {
        let cursor = RotationCursor::new(entries.len(), timing.max_entries);
        if cursor.window() == 0 {
            return None;
        }
        Some(Self {
            entries,
            element,
            timing,
            cursor,
        })
    }

    pub fn element(&self) -> &E {
        &self.element
    }

    pub fn into_element(self) -> E {
        self.element
    }

    /// Performs one rotation step on the entry under the cursor.
    pub async fn step(&mut self) -> Result<StepOutcome, ElementError> {
        let index = self.cursor.advance();
        let entry = &self.entries[index];

        let Some(description) = entry.description.as_deref() else {
            tracing::trace!(index, "Entry has no description, skipping");
            return Ok(StepOutcome::Skipped { index });
        };
        let html = entry_html(description, entry.link.as_deref());

        if self.element.is_visible() {
            self.element.hide()?;
            tokio::time::sleep(self.timing.hide_delay).await;
        }
        tokio::time::sleep(self.timing.swap_delay).await;

        self.element.set_inner_html(&html)?;
        self.element.show()?;
        tracing::debug!(index, link = ?entry.link, "Displaying entry");

        tokio::time::sleep(self.timing.display_duration).await;
        Ok(StepOutcome::Displayed { index })
    }

    /// Rotates forever.
    ///
    /// Returns `Ok(())` straight away if no entry in the window has a
    /// description, since the loop would otherwise never suspend.
    pub async fn run(&mut self) -> Result<(), ElementError> {
        let window = self.cursor.window();
        if !self.entries[..window].iter().any(Entry::is_displayable) {
            tracing::warn!(
                entries = window,
                "No feed entry has a description, nothing to display"
            );
            return Ok(());
        }

        tracing::info!(entries = window, "Starting rotation");
        loop {
            self.step().await?;
        }
    }
}
