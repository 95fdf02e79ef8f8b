use super::{Element, ElementError};
use crate::render::html_to_text;
use crossterm::{
    cursor::{self, MoveTo, MoveToNextLine},
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use std::io::Write;

/// Element drawn directly on a terminal.
///
/// Hiding clears the screen; showing draws the content flattened to text.
/// The cursor is hidden while the element exists and restored on drop.
pub struct TerminalElement<W: Write> {
    out: W,
    visible: bool,
    inner_html: String,
}

impl<W: Write> TerminalElement<W> {
    pub fn new(mut out: W) -> Result<Self, ElementError> {
        queue!(out, cursor::Hide, Clear(ClearType::All), MoveTo(0, 0))?;
        out.flush()?;
        Ok(Self {
            out,
            visible: false,
            inner_html: String::new(),
        })
    }

    fn draw(&mut self) -> Result<(), ElementError> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        for line in html_to_text(&self.inner_html).lines() {
            queue!(self.out, Print(line), MoveToNextLine(1))?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), ElementError> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> Element for TerminalElement<W> {
    fn is_visible(&self) -> bool {
        self.visible
    }

    fn hide(&mut self) -> Result<(), ElementError> {
        self.visible = false;
        self.clear()
    }

    fn show(&mut self) -> Result<(), ElementError> {
        self.visible = true;
        self.draw()
    }

    fn set_inner_html(&mut self, html: &str) -> Result<(), ElementError> {
        self.inner_html = html.to_string();
        // Content changes on a visible element show up immediately
        if self.visible {
            self.draw()?;
        }
        Ok(())
    }
}

impl<W: Write> Drop for TerminalElement<W> {
    fn drop(&mut self) {
        let _ = queue!(self.out, cursor::Show);
        let _ = self.out.flush();
    }
}
