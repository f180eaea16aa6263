//! Browser capability seam
//!
//! The navigation and listing flows depend on this trait rather than on
//! `headless_chrome` directly, so tests drive them with a scripted page
//! double. `BrowserSession` provides the real implementation.

use anyhow::Result;

/// One browser tab-set under automation. All element operations target the
/// currently focused tab.
pub trait PageDriver {
    fn goto(&mut self, url: &str) -> Result<()>;

    fn current_url(&mut self) -> Result<String>;

    /// Responsiveness check; `false` means the session is unusable and the
    /// caller should replace it
    fn healthy(&mut self) -> bool {
        self.current_url().is_ok()
    }

    /// Visible text of every element matching `selector`, in document order
    fn element_texts(&mut self, selector: &str) -> Result<Vec<String>>;

    fn element_count(&mut self, selector: &str) -> Result<usize>;

    /// Index of the first element whose text case-insensitively contains
    /// `needle`
    fn find_by_text(&mut self, selector: &str, needle: &str) -> Result<Option<usize>> {
        let needle = needle.to_lowercase();
        Ok(self
            .element_texts(selector)?
            .iter()
            .position(|text| text.to_lowercase().contains(&needle)))
    }

    fn click_nth(&mut self, selector: &str, index: usize) -> Result<()>;

    fn scroll_nth_into_view(&mut self, selector: &str, index: usize) -> Result<()>;

    /// Resolved href of the first element matching `selector`, `None` when
    /// the element is absent
    fn first_href(&mut self, selector: &str) -> Result<Option<String>>;

    /// Open `url` in a new tab via in-page script, leaving focus on the
    /// current tab
    fn open_tab(&mut self, url: &str) -> Result<()>;

    /// Number of tabs beyond the original navigation tab
    fn extra_tab_count(&mut self) -> Result<usize>;

    /// Move focus to the most recently opened secondary tab
    fn focus_latest_tab(&mut self) -> Result<()>;

    /// Full HTML of the focused tab's document
    fn page_html(&mut self) -> Result<String>;

    /// Close every secondary tab and refocus the original navigation tab
    fn restore_original_tab(&mut self) -> Result<()>;

    fn press_escape(&mut self) -> Result<()>;
}
