use super::{Element, ElementError};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// How often the page checks the state file for changes.
const POLL_INTERVAL_MS: u32 = 250;

/// Name of the global callback the state file invokes.
const UPDATE_CALLBACK: &str = "feedrollUpdate";

/// Element backed by a standalone HTML page on disk.
///
/// The page is written once and stays loaded in the browser. It holds one
/// `<div>` with the configured id and a small script that keeps polling a
/// sibling state file (`<page>.state.js`). Every mutation rewrites only the
/// state file, atomically; the script swaps the div's `innerHTML` and
/// toggles the hidden class in place, so the CSS opacity transition runs.
///
/// The state file is loaded through a `<script>` tag rather than `fetch`,
/// which keeps it working when the page is opened from `file://`.
#[derive(Debug)]
pub struct HtmlPageElement {
    path: PathBuf,
    state_path: PathBuf,
    element_id: String,
    hidden_class: String,
    visible: bool,
    inner_html: String,
}

#[derive(Serialize)]
struct PageState<'a> {
    visible: bool,
    html: &'a str,
}

impl HtmlPageElement {
    /// Writes the page and its initial (hidden, empty) state next to `path`.
    ///
    /// `element_id` and `hidden_class` are inserted into the page's CSS
    /// unescaped and must be plain identifiers.
    pub fn create(
        path: impl Into<PathBuf>,
        element_id: &str,
        hidden_class: &str,
    ) -> Result<Self, ElementError> {
        let path = path.into();
        let element = Self {
            state_path: path.with_extension("state.js"),
            path,
            element_id: element_id.to_string(),
            hidden_class: hidden_class.to_string(),
            visible: false,
            inner_html: String::new(),
        };
        element.write_state()?;
        write_atomically(&element.path, element.render_page()?.as_bytes())?;
        tracing::info!(
            path = %element.path.display(),
            state = %element.state_path.display(),
            "Writing display page"
        );
        Ok(element)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File the page polls for the current content and visibility.
    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    pub fn inner_html(&self) -> &str {
        &self.inner_html
    }

    /// The static page shell. It starts hidden and empty; the script fills
    /// it in from the state file.
    pub fn render_page(&self) -> Result<String, ElementError> {
        let id = &self.element_id;
        let class = &self.hidden_class;
        let state_src = self
            .state_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>feedroll</title>
<style>
#{id} {{ opacity: 1; transition: opacity 1s ease-in-out; }}
#{id}.{class} {{ opacity: 0; }}
</style>
</head>
<body>
<div id="{id}" class="{class}"></div>
<script>
(function () {{
  var el = document.getElementById({id_js});
  var hiddenClass = {class_js};
  var stateSrc = {state_js};
  var shown = null;
  window.{UPDATE_CALLBACK} = function (state) {{
    if (state.html !== shown) {{
      el.innerHTML = state.html;
      shown = state.html;
    }}
    el.classList.toggle(hiddenClass, !state.visible);
  }};
  function poll() {{
    var s = document.createElement("script");
    s.src = stateSrc + "?t=" + Date.now();
    s.onload = s.onerror = function () {{ s.remove(); }};
    document.head.appendChild(s);
  }}
  poll();
  setInterval(poll, {POLL_INTERVAL_MS});
}})();
</script>
</body>
</html>
"#,
            id_js = serde_json::to_string(id)?,
            class_js = serde_json::to_string(class)?,
            state_js = serde_json::to_string(&state_src)?,
        ))
    }

    /// The state file body for the current element state.
    pub fn render_state(&self) -> Result<String, ElementError> {
        let state = serde_json::to_string(&PageState {
            visible: self.visible,
            html: &self.inner_html,
        })?;
        Ok(format!("{UPDATE_CALLBACK}({state});\n"))
    }

    fn write_state(&self) -> Result<(), ElementError> {
        write_atomically(&self.state_path, self.render_state()?.as_bytes())?;
        Ok(())
    }
}

impl Element for HtmlPageElement {
    fn is_visible(&self) -> bool {
        self.visible
    }

    fn hide(&mut self) -> Result<(), ElementError> {
        self.visible = false;
        self.write_state()
    }

    fn show(&mut self) -> Result<(), ElementError> {
        self.visible = true;
        self.write_state()
    }

    fn set_inner_html(&mut self, html: &str) -> Result<(), ElementError> {
        self.inner_html = html.to_string();
        self.write_state()
    }
}

/// Replaces `dst` via write-to-temp-then-rename, so a polling browser
/// never sees a partially written file.
fn write_atomically(dst: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::time::{SystemTime, UNIX_EPOCH};
    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = dst.with_extension(format!("tmp.{:016x}", random_suffix));

    let result = (|| {
        let mut temp_file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)?;
        temp_file.write_all(content)?;
        temp_file.sync_all()?;
        drop(temp_file);

        // On Windows, rename fails if destination exists
        #[cfg(windows)]
        if dst.exists() {
            std::fs::remove_file(dst)?;
        }

        std::fs::rename(&temp_path, dst)
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&temp_path);
    }
    result
}
