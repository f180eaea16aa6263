//! Category menu navigation
//!
//! Drives the home page's category → subcategory click sequence that lands
//! on a listing page for one search parameter set. Menu entries are matched
//! by case-insensitive substring, first match wins.

use thiserror::Error;
use tracing::debug;

use crate::config::ScrapeConfig;
use crate::driver::PageDriver;
use crate::record::SearchParameters;

pub const CATEGORY_MENU_SELECTOR: &str = ".js-service-category-nav ul li";
pub const SUBCATEGORY_MENU_SELECTOR: &str = ".section-item.active ul li a";

#[derive(Debug, Error)]
pub enum NavigateError {
    #[error("category '{0}' not found")]
    CategoryNotFound(String),
    #[error("business '{business}' not found in category '{category}'")]
    BusinessNotFound { business: String, category: String },
    #[error(transparent)]
    Browser(#[from] anyhow::Error),
}

impl NavigateError {
    /// Menu stage the lookup failed at, for skip logging
    pub fn stage(&self) -> &'static str {
        match self {
            NavigateError::CategoryNotFound(_) => "category",
            NavigateError::BusinessNotFound { .. } => "business",
            NavigateError::Browser(_) => "browser",
        }
    }
}

/// Land on the listing page for `params`. Location is deliberately not used
/// for filtering; it only labels output rows.
pub async fn navigate_to_listings<D: PageDriver>(
    driver: &mut D,
    params: &SearchParameters,
    config: &ScrapeConfig,
) -> Result<(), NavigateError> {
    debug!("Navigating to {}", config.home_url);
    driver.goto(&config.home_url)?;
    config.base_delay_ms.pause().await;

    let category_index = driver
        .find_by_text(CATEGORY_MENU_SELECTOR, &params.category)?
        .ok_or_else(|| NavigateError::CategoryNotFound(params.category.clone()))?;
    debug!(
        "Category '{}' matched menu entry {}",
        params.category, category_index
    );
    driver.click_nth(CATEGORY_MENU_SELECTOR, category_index)?;
    config.base_delay_ms.pause().await;

    let business_index = driver
        .find_by_text(SUBCATEGORY_MENU_SELECTOR, &params.business)?
        .ok_or_else(|| NavigateError::BusinessNotFound {
            business: params.business.clone(),
            category: params.category.clone(),
        })?;
    debug!(
        "Business '{}' matched subcategory entry {}",
        params.business, business_index
    );
    driver.click_nth(SUBCATEGORY_MENU_SELECTOR, business_index)?;
    config.base_delay_ms.pause().await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_messages() {
        let err = NavigateError::CategoryNotFound("Marketing".to_string());
        assert_eq!(err.to_string(), "category 'Marketing' not found");
        assert_eq!(err.stage(), "category");

        let err = NavigateError::BusinessNotFound {
            business: "Branding".to_string(),
            category: "Marketing".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "business 'Branding' not found in category 'Marketing'"
        );
        assert_eq!(err.stage(), "business");
    }
}
