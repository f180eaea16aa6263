//! Listing slot processing
//!
//! Walks the bounded view-portfolio slots on a listing page. Each slot
//! opens an overlay, jumps to the full profile in a secondary tab,
//! snapshots the document for extraction, then restores the original tab
//! and closes the overlay so the next slot starts from clean state. The
//! restore step runs after every slot, including failed ones.

use anyhow::Result;
use tracing::debug;

use crate::config::ScrapeConfig;
use crate::driver::PageDriver;
use crate::extract;
use crate::logger::RunLogger;
use crate::pacing::{poll_until, PollError};
use crate::record::{AgencyRecord, SearchParameters};

pub const LISTING_BUTTON_SELECTOR: &str = "button.btn-view-portfolio.js-item-overlay-open";
pub const PROFILE_LINK_SELECTOR: &str = "a.view-profile.js--agency-profile-link";
pub const OVERLAY_PRIMARY_CLOSE: &str = ".item-overlay--close.js-item-overlay-close";
pub const OVERLAY_FALLBACK_CLOSE: &str = ".overlay-close, .modal-close, .js-overlay-close";

enum SlotOutcome {
    Extracted(AgencyRecord),
    NoProfileLink,
    NoTabDetected,
}

/// Process up to `max_items_per_keyword` listing slots, pushing extracted
/// records onto `out` as they complete so a mid-search failure keeps the
/// slots already scraped. Slot-level problems are logged and skipped; only
/// failures that leave the session unusable propagate.
pub async fn extract_listings<D: PageDriver>(
    driver: &mut D,
    params: &SearchParameters,
    config: &ScrapeConfig,
    logger: &RunLogger,
    out: &mut Vec<AgencyRecord>,
) -> Result<()> {
    for index in 0..config.max_items_per_keyword {
        let available = driver.element_count(LISTING_BUTTON_SELECTOR)?;
        if available <= index {
            logger.log_end_of_results(index);
            break;
        }

        match process_slot(driver, params, config, index).await {
            Ok(SlotOutcome::Extracted(record)) => {
                logger.log_slot_scraped(&record.title);
                out.push(record);
            }
            Ok(SlotOutcome::NoProfileLink) => logger.log_profile_link_missing(index + 1),
            Ok(SlotOutcome::NoTabDetected) => logger.log_no_tab_detected(index + 1),
            Err(e) => logger.log_slot_error(index + 1, params, &e),
        }

        // Tab state must be clean before the next slot regardless of how
        // this one ended.
        restore_slot_state(driver, config).await?;
    }
    Ok(())
}

async fn process_slot<D: PageDriver>(
    driver: &mut D,
    params: &SearchParameters,
    config: &ScrapeConfig,
    index: usize,
) -> Result<SlotOutcome> {
    driver.scroll_nth_into_view(LISTING_BUTTON_SELECTOR, index)?;
    config.step_delay_ms.pause().await;
    driver.click_nth(LISTING_BUTTON_SELECTOR, index)?;
    config.base_delay_ms.pause().await;

    let href = match driver.first_href(PROFILE_LINK_SELECTOR)? {
        Some(href) => href,
        None => return Ok(SlotOutcome::NoProfileLink),
    };

    let baseline = driver.extra_tab_count()?;
    driver.open_tab(&href)?;
    config.base_delay_ms.pause().await;

    let appeared = poll_until(config.tab_poll_attempts, config.step_delay_ms, || {
        Ok((driver.extra_tab_count()? > baseline).then_some(()))
    })
    .await;
    match appeared {
        Ok(()) => {}
        Err(PollError::Timeout { .. }) => return Ok(SlotOutcome::NoTabDetected),
        Err(PollError::Probe(e)) => return Err(e),
    }

    driver.focus_latest_tab()?;
    config.base_delay_ms.pause().await;

    let html = driver.page_html()?;
    let page_url = driver.current_url().unwrap_or_default();
    let base_url = if page_url.is_empty() {
        None
    } else {
        Some(page_url.as_str())
    };
    let profile = extract::extract_profile(&html, base_url);
    Ok(SlotOutcome::Extracted(profile.into_record(params.search_name())))
}

async fn restore_slot_state<D: PageDriver>(driver: &mut D, config: &ScrapeConfig) -> Result<()> {
    driver.restore_original_tab()?;
    config.base_delay_ms.pause().await;
    close_overlay(driver, config).await;
    Ok(())
}

/// Close the listing overlay: primary control first, then the alternate
/// close selectors, then an Escape keypress. Absence at each step is
/// normal (the overlay may already be gone).
async fn close_overlay<D: PageDriver>(driver: &mut D, config: &ScrapeConfig) {
    for selector in [OVERLAY_PRIMARY_CLOSE, OVERLAY_FALLBACK_CLOSE] {
        match try_click_first(driver, selector) {
            Ok(true) => {
                config.base_delay_ms.pause().await;
                return;
            }
            Ok(false) => {}
            Err(e) => debug!("Overlay close via '{}' failed: {}", selector, e),
        }
    }
    if let Err(e) = driver.press_escape() {
        debug!("Escape fallback failed: {}", e);
    }
    config.base_delay_ms.pause().await;
}

fn try_click_first<D: PageDriver>(driver: &mut D, selector: &str) -> Result<bool> {
    if driver.element_count(selector)? == 0 {
        return Ok(false);
    }
    driver.click_nth(selector, 0)?;
    Ok(true)
}
