mod common;

use agencyharvest::navigate::{
    navigate_to_listings, NavigateError, CATEGORY_MENU_SELECTOR, SUBCATEGORY_MENU_SELECTOR,
};
use agencyharvest::record::SearchParameters;
use common::fake_page::FakePage;
use common::fixtures::fast_scrape_config;

#[tokio::test]
async fn test_navigation_clicks_category_then_business() {
    let mut page = FakePage::with_directory(
        &["Web Design Companies", "Digital Marketing Agencies", "Logo Design"],
        &["SEO Agencies", "Social Media Marketing", "Email Marketing"],
    );
    let params = SearchParameters::new("Social Media", "Digital Marketing");

    navigate_to_listings(&mut page, &params, &fast_scrape_config())
        .await
        .expect("navigation should succeed");

    assert_eq!(page.goto_count, 1);
    assert_eq!(page.url, "https://www.designrush.com");
    assert_eq!(
        page.clicks,
        vec![
            (CATEGORY_MENU_SELECTOR.to_string(), 1),
            (SUBCATEGORY_MENU_SELECTOR.to_string(), 1),
        ]
    );
}

#[tokio::test]
async fn test_menu_matching_is_case_insensitive_substring() {
    let mut page = FakePage::with_directory(
        &["Web Design Companies"],
        &["Branding Agencies For Startups"],
    );
    let params = SearchParameters::new("BRANDING", "web design");

    navigate_to_listings(&mut page, &params, &fast_scrape_config())
        .await
        .expect("mixed-case needles should still match");
}

#[tokio::test]
async fn test_unknown_category_skips_before_any_click() {
    let mut page = FakePage::with_directory(&["Web Design Companies"], &["SEO Agencies"]);
    let params = SearchParameters::new("SEO", "Accounting");

    let err = navigate_to_listings(&mut page, &params, &fast_scrape_config())
        .await
        .expect_err("category is not in the menu");

    assert!(matches!(err, NavigateError::CategoryNotFound(_)));
    assert_eq!(err.stage(), "category");
    assert_eq!(err.to_string(), "category 'Accounting' not found");
    assert!(page.clicks.is_empty());
}

#[tokio::test]
async fn test_unknown_business_skips_after_category_click() {
    let mut page = FakePage::with_directory(
        &["Web Design Companies"],
        &["SEO Agencies", "PPC Agencies"],
    );
    let params = SearchParameters::new("Flower Arranging", "Web Design");

    let err = navigate_to_listings(&mut page, &params, &fast_scrape_config())
        .await
        .expect_err("business is not in the subcategory menu");

    assert!(matches!(err, NavigateError::BusinessNotFound { .. }));
    assert_eq!(err.stage(), "business");
    // The category click already happened; only the business click is missing
    assert_eq!(page.clicks.len(), 1);
    assert_eq!(page.clicks[0].0, CATEGORY_MENU_SELECTOR);
}

#[tokio::test]
async fn test_failed_page_load_is_a_browser_error() {
    let mut page = FakePage::with_directory(&["Web Design Companies"], &["SEO Agencies"]);
    page.fail_goto = true;
    let params = SearchParameters::new("SEO", "Web Design");

    let err = navigate_to_listings(&mut page, &params, &fast_scrape_config())
        .await
        .expect_err("goto failure must propagate");

    assert!(matches!(err, NavigateError::Browser(_)));
    assert_eq!(err.stage(), "browser");
}
