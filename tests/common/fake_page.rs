use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use anyhow::{anyhow, Result};

use agencyharvest::driver::PageDriver;
use agencyharvest::listings::{
    LISTING_BUTTON_SELECTOR, OVERLAY_PRIMARY_CLOSE, PROFILE_LINK_SELECTOR,
};
use agencyharvest::navigate::{CATEGORY_MENU_SELECTOR, SUBCATEGORY_MENU_SELECTOR};

/// Scripted in-memory page double for the navigation and listing flows.
/// Selector lookups resolve against a plain map, tab state is a counter,
/// and per-slot variation (profile links, tab opens) is scripted with
/// queues that fall back to a default once exhausted.
#[derive(Default)]
pub struct FakePage {
    pub url: String,
    pub elements: HashMap<String, Vec<String>>,
    pub profile_html: String,

    pub default_profile_link: Option<String>,
    pub profile_link_script: VecDeque<Option<String>>,
    pub tab_open_script: VecDeque<bool>,

    pub open_tabs: usize,
    pub on_original_tab: bool,
    pub clicks: Vec<(String, usize)>,
    pub scrolls: Vec<(String, usize)>,
    pub opened_urls: Vec<String>,
    pub escape_presses: usize,
    pub restore_calls: usize,
    pub goto_count: usize,
    pub health_probes: usize,

    pub fail_goto: bool,
    pub fail_health_probe: bool,
    pub fail_restore: bool,

    live_counter: Option<Rc<Cell<usize>>>,
}

impl FakePage {
    pub fn new() -> Self {
        let mut page = FakePage::default();
        page.on_original_tab = true;
        page
    }

    /// Page whose category menu and subcategory menu hold the given entries
    pub fn with_directory(categories: &[&str], businesses: &[&str]) -> Self {
        let mut page = Self::new();
        page.elements
            .insert(CATEGORY_MENU_SELECTOR.to_string(), to_strings(categories));
        page.elements
            .insert(SUBCATEGORY_MENU_SELECTOR.to_string(), to_strings(businesses));
        page
    }

    pub fn with_listing_buttons(mut self, count: usize) -> Self {
        self.elements.insert(
            LISTING_BUTTON_SELECTOR.to_string(),
            vec!["View Portfolio".to_string(); count],
        );
        self
    }

    pub fn with_profile_link(mut self, href: &str) -> Self {
        self.default_profile_link = Some(href.to_string());
        self
    }

    pub fn with_profile_html(mut self, html: impl Into<String>) -> Self {
        self.profile_html = html.into();
        self
    }

    pub fn with_overlay_close_button(mut self) -> Self {
        self.elements
            .insert(OVERLAY_PRIMARY_CLOSE.to_string(), vec!["×".to_string()]);
        self
    }

    /// Queue per-slot profile link results; `None` means the overlay has no
    /// profile link for that slot
    pub fn script_profile_links(mut self, links: &[Option<&str>]) -> Self {
        self.profile_link_script = links
            .iter()
            .map(|link| link.map(|href| href.to_string()))
            .collect();
        self
    }

    /// Queue per-call tab-open outcomes; `false` simulates a popup that
    /// never materializes
    pub fn script_tab_opens(mut self, opens: &[bool]) -> Self {
        self.tab_open_script = opens.iter().copied().collect();
        self
    }

    pub fn failing_health_probe(mut self) -> Self {
        self.fail_health_probe = true;
        self
    }

    /// Tie the page to a shared count of live sessions; the count rises
    /// here and falls again when the page is dropped
    pub fn counting_live_sessions(mut self, counter: Rc<Cell<usize>>) -> Self {
        counter.set(counter.get() + 1);
        self.live_counter = Some(counter);
        self
    }
}

impl Drop for FakePage {
    fn drop(&mut self) {
        if let Some(counter) = &self.live_counter {
            counter.set(counter.get() - 1);
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

impl PageDriver for FakePage {
    fn goto(&mut self, url: &str) -> Result<()> {
        if self.fail_goto {
            return Err(anyhow!("navigation refused"));
        }
        self.goto_count += 1;
        self.url = url.to_string();
        Ok(())
    }

    fn current_url(&mut self) -> Result<String> {
        self.health_probes += 1;
        if self.fail_health_probe {
            return Err(anyhow!("target detached"));
        }
        Ok(self.url.clone())
    }

    fn element_texts(&mut self, selector: &str) -> Result<Vec<String>> {
        Ok(self.elements.get(selector).cloned().unwrap_or_default())
    }

    fn element_count(&mut self, selector: &str) -> Result<usize> {
        Ok(self.elements.get(selector).map(Vec::len).unwrap_or(0))
    }

    fn click_nth(&mut self, selector: &str, index: usize) -> Result<()> {
        if self.element_count(selector)? <= index {
            return Err(anyhow!(
                "Element {} under '{}' no longer present",
                index,
                selector
            ));
        }
        self.clicks.push((selector.to_string(), index));
        Ok(())
    }

    fn scroll_nth_into_view(&mut self, selector: &str, index: usize) -> Result<()> {
        self.scrolls.push((selector.to_string(), index));
        Ok(())
    }

    fn first_href(&mut self, selector: &str) -> Result<Option<String>> {
        if selector != PROFILE_LINK_SELECTOR {
            return Ok(None);
        }
        if let Some(scripted) = self.profile_link_script.pop_front() {
            return Ok(scripted);
        }
        Ok(self.default_profile_link.clone())
    }

    fn open_tab(&mut self, url: &str) -> Result<()> {
        self.opened_urls.push(url.to_string());
        let opens = self.tab_open_script.pop_front().unwrap_or(true);
        if opens {
            self.open_tabs += 1;
        }
        Ok(())
    }

    fn extra_tab_count(&mut self) -> Result<usize> {
        Ok(self.open_tabs)
    }

    fn focus_latest_tab(&mut self) -> Result<()> {
        if self.open_tabs == 0 {
            return Err(anyhow!("no secondary tab to focus"));
        }
        self.on_original_tab = false;
        if let Some(last) = self.opened_urls.last() {
            self.url = last.clone();
        }
        Ok(())
    }

    fn page_html(&mut self) -> Result<String> {
        Ok(self.profile_html.clone())
    }

    fn restore_original_tab(&mut self) -> Result<()> {
        if self.fail_restore {
            return Err(anyhow!("browser gone"));
        }
        self.restore_calls += 1;
        self.open_tabs = 0;
        self.on_original_tab = true;
        Ok(())
    }

    fn press_escape(&mut self) -> Result<()> {
        self.escape_presses += 1;
        Ok(())
    }
}
