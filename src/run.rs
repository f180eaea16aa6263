//! Run orchestration
//!
//! Iterates the search parameter sets sequentially over one browser
//! session, recreating the session when its health probe fails and
//! isolating each parameter set's failures so the run always reaches the
//! end of the list. The session is released when the run returns, on every
//! path.

use anyhow::Result;
use tracing::debug;

use crate::config::ScrapeConfig;
use crate::driver::PageDriver;
use crate::listings;
use crate::logger::RunLogger;
use crate::navigate::{self, NavigateError};
use crate::record::{AgencyRecord, SearchParameters};

enum SearchOutcome {
    Found(usize),
    NotFound,
    Failed,
}

/// Process every parameter set in order and return the accumulated
/// records. `create_session` is invoked once up front and again whenever
/// the health probe fails; total inability to create a session is the one
/// scrape error that aborts the run.
pub async fn run_searches<D, F>(
    mut create_session: F,
    params_list: &[SearchParameters],
    config: &ScrapeConfig,
    logger: &RunLogger,
) -> Result<Vec<AgencyRecord>>
where
    D: PageDriver,
    F: FnMut() -> Result<D>,
{
    let mut session = create_session()?;
    let mut records: Vec<AgencyRecord> = Vec::new();

    for (position, params) in params_list.iter().enumerate() {
        logger.log_search_start(params, position + 1, params_list.len());
        logger.update_progress(&params.to_string()).await;

        if !session.healthy() {
            logger.log_session_recreated();
            // The dead browser must be gone before its replacement launches;
            // only one session exists at a time.
            drop(session);
            session = create_session()?;
        }

        match search_one(&mut session, params, config, logger, &mut records).await {
            SearchOutcome::Found(count) => {
                debug!("Search '{}' yielded {} records", params, count);
                logger.record_search_processed();
            }
            SearchOutcome::NotFound => logger.record_search_skipped(),
            SearchOutcome::Failed => logger.record_search_failed(),
        }

        logger.advance_progress(1).await;
        config.search_delay_ms.pause().await;
    }

    Ok(records)
}

async fn search_one<D: PageDriver>(
    session: &mut D,
    params: &SearchParameters,
    config: &ScrapeConfig,
    logger: &RunLogger,
    records: &mut Vec<AgencyRecord>,
) -> SearchOutcome {
    match navigate::navigate_to_listings(session, params, config).await {
        Ok(()) => {}
        Err(NavigateError::Browser(e)) => {
            logger.log_search_error(params, &e);
            return SearchOutcome::Failed;
        }
        Err(not_found) => {
            logger.log_navigation_skip(&not_found);
            return SearchOutcome::NotFound;
        }
    }

    let before = records.len();
    if let Err(e) = listings::extract_listings(session, params, config, logger, records).await {
        logger.log_search_error(params, &e);
        return SearchOutcome::Failed;
    }
    SearchOutcome::Found(records.len() - before)
}
