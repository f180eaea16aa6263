//! Chrome session lifecycle
//!
//! One `BrowserSession` wraps one Chrome process plus its tab set. The
//! launch profile (user-agent + viewport) is sampled once per run and
//! reused when a session has to be recreated mid-run, so recreation does
//! not change the browser fingerprint.

use anyhow::{anyhow, Result};
use headless_chrome::{Browser, LaunchOptions, Tab};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::BrowserConfig;
use crate::driver::PageDriver;

/// Fixed Chrome arguments applied to every session
const CHROME_ARGS: &[&str] = &[
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--disable-web-security",
    "--disable-extensions",
    "--disable-plugins",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-renderer-backgrounding",
    "--disable-features=TranslateUI",
    "--disable-ipc-flooding-protection",
    "--disable-blink-features=AutomationControlled",
];

/// Per-run launch identity, sampled once and shared by every session the
/// run creates
#[derive(Debug, Clone)]
pub struct SessionProfile {
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl SessionProfile {
    pub fn sample(config: &BrowserConfig) -> Self {
        let mut rng = rand::thread_rng();
        let user_agent = config
            .user_agents
            .choose(&mut rng)
            .cloned()
            .unwrap_or_default();
        SessionProfile {
            user_agent,
            viewport_width: sample_dimension(config.viewport_width, &mut rng),
            viewport_height: sample_dimension(config.viewport_height, &mut rng),
        }
    }
}

fn sample_dimension(range: [u32; 2], rng: &mut impl Rng) -> u32 {
    if range[0] >= range[1] {
        range[0]
    } else {
        rng.gen_range(range[0]..=range[1])
    }
}

/// One live Chrome instance. The navigation tab created at launch is the
/// tab every listing flow returns to; secondary tabs are tracked against a
/// baseline of known target IDs so they can be closed as a group.
pub struct BrowserSession {
    browser: Browser,
    original: Arc<Tab>,
    active: Arc<Tab>,
    known_targets: HashSet<String>,
    element_timeout: Duration,
}

impl BrowserSession {
    pub fn create(config: &BrowserConfig, profile: &SessionProfile) -> Result<Self> {
        let is_container = std::env::var("AGENCYHARVEST_CONTAINER").is_ok()
            || std::path::Path::new("/.dockerenv").exists();
        if is_container {
            debug!("Container environment detected");
        }

        let chrome_path: Option<std::path::PathBuf> =
            std::env::var("CHROME_PATH").ok().map(std::path::PathBuf::from);

        // Unique debug port per instance to avoid conflicts with a
        // previous session that is still shutting down.
        static PORT_COUNTER: std::sync::atomic::AtomicU16 =
            std::sync::atomic::AtomicU16::new(9222);
        let debug_port = PORT_COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        if debug_port > 9322 {
            PORT_COUNTER.store(9222, std::sync::atomic::Ordering::Relaxed);
        }

        let mut arg_storage: Vec<OsString> = CHROME_ARGS.iter().map(OsString::from).collect();
        if !profile.user_agent.is_empty() {
            arg_storage.push(OsString::from(format!(
                "--user-agent={}",
                profile.user_agent
            )));
        }
        if !config.headless {
            arg_storage.push(OsString::from("--start-maximized"));
        }
        let args: Vec<&OsStr> = arg_storage.iter().map(OsString::as_os_str).collect();

        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .sandbox(false)
            .path(chrome_path)
            .port(Some(debug_port))
            .window_size(Some((profile.viewport_width, profile.viewport_height)))
            .args(args)
            .build()
            .map_err(|e| anyhow!("Failed to build Chrome launch options: {}", e))?;

        let browser =
            Browser::new(options).map_err(|e| anyhow!("Failed to launch Chrome: {}", e))?;

        let original = browser.new_tab()?;
        original.set_default_timeout(Duration::from_secs(config.page_load_timeout_secs));

        // Everything open at this point (including the launch tab) belongs
        // to the baseline; only tabs created later count as secondary.
        let known_targets = Self::current_target_ids(&browser)?;

        debug!(
            "Browser session ready (port {}, {}x{})",
            debug_port, profile.viewport_width, profile.viewport_height
        );

        Ok(BrowserSession {
            browser,
            active: original.clone(),
            original,
            known_targets,
            element_timeout: Duration::from_secs(config.element_timeout_secs),
        })
    }

    /// Probe responsiveness by reading the current navigation target
    pub fn is_healthy(&self) -> bool {
        self.original
            .evaluate("window.location.href", false)
            .is_ok()
    }

    /// Orderly teardown; dropping the session has the same effect
    pub fn close(self) {
        debug!("Closing browser session");
        drop(self);
    }

    fn current_target_ids(browser: &Browser) -> Result<HashSet<String>> {
        let tabs = browser
            .get_tabs()
            .lock()
            .map_err(|_| anyhow!("Browser tab registry poisoned"))?;
        Ok(tabs.iter().map(|t| t.get_target_id().to_string()).collect())
    }

    fn secondary_tabs(&self) -> Result<Vec<Arc<Tab>>> {
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|_| anyhow!("Browser tab registry poisoned"))?;
        Ok(tabs
            .iter()
            .filter(|t| !self.known_targets.contains(t.get_target_id()))
            .cloned()
            .collect())
    }
}

impl PageDriver for BrowserSession {
    fn goto(&mut self, url: &str) -> Result<()> {
        self.active.navigate_to(url)?;
        self.active.wait_until_navigated()?;
        Ok(())
    }

    fn current_url(&mut self) -> Result<String> {
        let result = self.active.evaluate("window.location.href", false)?;
        Ok(result
            .value
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_default())
    }

    fn healthy(&mut self) -> bool {
        self.is_healthy()
    }

    fn element_texts(&mut self, selector: &str) -> Result<Vec<String>> {
        let elements = self.active.find_elements(selector).unwrap_or_default();
        elements
            .iter()
            .map(|el| el.get_inner_text())
            .collect::<Result<Vec<_>>>()
    }

    fn element_count(&mut self, selector: &str) -> Result<usize> {
        Ok(self
            .active
            .find_elements(selector)
            .map(|els| els.len())
            .unwrap_or(0))
    }

    fn click_nth(&mut self, selector: &str, index: usize) -> Result<()> {
        let elements = self.active.find_elements(selector)?;
        let element = elements
            .get(index)
            .ok_or_else(|| anyhow!("Element {} under '{}' no longer present", index, selector))?;
        element.click()?;
        Ok(())
    }

    fn scroll_nth_into_view(&mut self, selector: &str, index: usize) -> Result<()> {
        let elements = self.active.find_elements(selector)?;
        let element = elements
            .get(index)
            .ok_or_else(|| anyhow!("Element {} under '{}' no longer present", index, selector))?;
        element.call_js_fn(
            r#"function() { this.scrollIntoView({block: "center"}); }"#,
            vec![],
            false,
        )?;
        Ok(())
    }

    fn first_href(&mut self, selector: &str) -> Result<Option<String>> {
        let element = match self
            .active
            .wait_for_element_with_custom_timeout(selector, self.element_timeout)
        {
            Ok(el) => el,
            Err(_) => return Ok(None),
        };
        let href = element
            .call_js_fn("function() { return this.href; }", vec![], false)?
            .value
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_default();
        Ok(if href.is_empty() { None } else { Some(href) })
    }

    fn open_tab(&mut self, url: &str) -> Result<()> {
        let script = format!("window.open({}, \"_blank\");", serde_json::to_string(url)?);
        self.active.evaluate(&script, false)?;
        Ok(())
    }

    fn extra_tab_count(&mut self) -> Result<usize> {
        Ok(self.secondary_tabs()?.len())
    }

    fn focus_latest_tab(&mut self) -> Result<()> {
        let tab = self
            .secondary_tabs()?
            .into_iter()
            .last()
            .ok_or_else(|| anyhow!("No secondary tab to focus"))?;
        tab.set_default_timeout(self.element_timeout);
        if let Err(e) = tab.activate() {
            debug!("Could not activate secondary tab: {}", e);
        }
        if let Err(e) = tab.wait_until_navigated() {
            debug!("Secondary tab still settling: {}", e);
        }
        self.active = tab;
        Ok(())
    }

    fn page_html(&mut self) -> Result<String> {
        self.active.get_content()
    }

    fn restore_original_tab(&mut self) -> Result<()> {
        for tab in self.secondary_tabs()? {
            let target_id = tab.get_target_id().to_string();
            if let Err(e) = tab.close(true) {
                warn!("Could not close secondary tab {}: {}", target_id, e);
            }
            // Closed targets may linger in the registry; remember them so
            // they never count as open again.
            self.known_targets.insert(target_id);
        }
        self.active = self.original.clone();
        if let Err(e) = self.original.activate() {
            debug!("Could not refocus navigation tab: {}", e);
        }
        Ok(())
    }

    fn press_escape(&mut self) -> Result<()> {
        self.active.press_key("Escape")?;
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        debug!("Browser session released");
    }
}
