//! Profile-page field extraction
//!
//! Pure functions over a parsed document snapshot; no live browser access.
//! Scalar fields are declared in a single field-spec table (ordered
//! candidate selectors plus an extraction mode) and evaluated uniformly,
//! with every miss defaulting to an empty value.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::record::{AgencyRecord, ReviewEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Title,
    Address,
    Website,
    Employees,
    Services,
    Industries,
    ClientTypes,
    ReviewRating,
    ReviewCount,
    AreasOfExpertise,
}

impl ProfileField {
    pub const ALL: [ProfileField; 10] = [
        ProfileField::Title,
        ProfileField::Address,
        ProfileField::Website,
        ProfileField::Employees,
        ProfileField::Services,
        ProfileField::Industries,
        ProfileField::ClientTypes,
        ProfileField::ReviewRating,
        ProfileField::ReviewCount,
        ProfileField::AreasOfExpertise,
    ];
}

#[derive(Debug, Clone, Copy)]
enum ModeSpec {
    /// First non-empty text among the candidates
    Text,
    /// Texts under the first candidate with matches, joined ", "
    JoinedList,
    /// Named attribute of the first matching element
    Attr(&'static str),
    /// First capture group of `pattern` applied to the first candidate's text
    Capture { pattern: &'static str },
    /// Scan candidate items for a label containing `needle`, return its value
    Labeled {
        label: &'static str,
        value: &'static str,
        needle: &'static str,
    },
}

struct FieldSpec {
    field: ProfileField,
    selectors: &'static [&'static str],
    mode: ModeSpec,
}

/// Candidate selectors per field, ordered by priority. Evaluation falls
/// through to the next candidate whenever the current one yields an empty
/// value.
const PROFILE_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        field: ProfileField::Title,
        selectors: &[".company-title", "h1", ".agency-title", ".profile-title"],
        mode: ModeSpec::Text,
    },
    FieldSpec {
        field: ProfileField::Address,
        selectors: &[".company-address", ".address", r#"[class*="address"]"#],
        mode: ModeSpec::Text,
    },
    FieldSpec {
        field: ProfileField::Website,
        selectors: &[".profile-header--edit a.site"],
        mode: ModeSpec::Attr("href"),
    },
    FieldSpec {
        field: ProfileField::Employees,
        selectors: &[".overview-adds--item"],
        mode: ModeSpec::Labeled {
            label: ".overview-adds--title",
            value: ".overview-adds--text",
            needle: "number of employees",
        },
    },
    FieldSpec {
        field: ProfileField::Services,
        selectors: &[".services-list li", ".services li", r#"[class*="service"] li"#],
        mode: ModeSpec::JoinedList,
    },
    FieldSpec {
        field: ProfileField::Industries,
        selectors: &[
            ".industries-list li",
            ".industries li",
            r#"[class*="industry"] li"#,
        ],
        mode: ModeSpec::JoinedList,
    },
    FieldSpec {
        field: ProfileField::ClientTypes,
        selectors: &[".client-types-list li", ".clients li", r#"[class*="client"] li"#],
        mode: ModeSpec::JoinedList,
    },
    FieldSpec {
        field: ProfileField::ReviewRating,
        selectors: &[".profile-header--reviews .review-rating"],
        mode: ModeSpec::Text,
    },
    FieldSpec {
        field: ProfileField::ReviewCount,
        selectors: &[".profile-header--reviews .review-count"],
        mode: ModeSpec::Capture {
            pattern: r"\((\d+) reviews?\)",
        },
    },
    FieldSpec {
        field: ProfileField::AreasOfExpertise,
        selectors: &[".aoe__tab-item.js-expertise-tab span"],
        mode: ModeSpec::JoinedList,
    },
];

enum CompiledMode {
    Text,
    JoinedList,
    Attr(&'static str),
    Capture(Regex),
    Labeled {
        label: Selector,
        value: Selector,
        needle: &'static str,
    },
}

struct CompiledField {
    field: ProfileField,
    selectors: Vec<Selector>,
    mode: CompiledMode,
}

// Compile selectors and patterns once at startup.
// Safety: the .unwrap() calls below are safe because every selector string
// and regex pattern is a compile-time constant with valid syntax.
static COMPILED_FIELDS: Lazy<Vec<CompiledField>> = Lazy::new(|| {
    PROFILE_FIELDS
        .iter()
        .map(|spec| CompiledField {
            field: spec.field,
            selectors: spec
                .selectors
                .iter()
                .map(|sel| Selector::parse(sel).unwrap())
                .collect(),
            mode: match spec.mode {
                ModeSpec::Text => CompiledMode::Text,
                ModeSpec::JoinedList => CompiledMode::JoinedList,
                ModeSpec::Attr(name) => CompiledMode::Attr(name),
                ModeSpec::Capture { pattern } => CompiledMode::Capture(Regex::new(pattern).unwrap()),
                ModeSpec::Labeled {
                    label,
                    value,
                    needle,
                } => CompiledMode::Labeled {
                    label: Selector::parse(label).unwrap(),
                    value: Selector::parse(value).unwrap(),
                    needle,
                },
            },
        })
        .collect()
});

static REVIEW_ITEM_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".review-list.js-review-list > .tab-review--list-item").unwrap());

static REVIEW_AUTHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".review-author-name").unwrap());

static REVIEW_POSITION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".review-author-position").unwrap());

static REVIEW_TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse(".item-title").unwrap());

static REVIEW_TYPE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".item-type span").unwrap());

static REVIEW_DESCRIPTION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".tab-review--item-description.desktop").unwrap());

/// Raw field values pulled from one profile document
#[derive(Debug, Clone, Default)]
pub struct RawProfile {
    pub title: String,
    pub address: String,
    pub website: String,
    pub employees: String,
    pub services: String,
    pub industries: String,
    pub client_types: String,
    pub review_rating: String,
    pub review_count: String,
    pub areas_of_expertise: String,
    pub reviews: Vec<ReviewEntry>,
}

impl RawProfile {
    pub fn into_record(self, search_name: String) -> AgencyRecord {
        AgencyRecord {
            search_name,
            title: self.title,
            address: self.address,
            website: self.website,
            employees: self.employees,
            services: self.services,
            industries: self.industries,
            client_types: self.client_types,
            review_rating: self.review_rating,
            review_count: self.review_count,
            areas_of_expertise: self.areas_of_expertise,
            reviews: self.reviews,
        }
    }
}

/// Extract every profile field from a document snapshot. `base_url` is the
/// profile page URL, used to resolve a relative website link; everything
/// else is best-effort with empty defaults.
pub fn extract_profile(html: &str, base_url: Option<&str>) -> RawProfile {
    let doc = Html::parse_document(html);
    let mut profile = RawProfile::default();

    for compiled in COMPILED_FIELDS.iter() {
        let value = compiled.evaluate(&doc);
        match compiled.field {
            ProfileField::Title => profile.title = value,
            ProfileField::Address => profile.address = value,
            ProfileField::Website => profile.website = value,
            ProfileField::Employees => profile.employees = value,
            ProfileField::Services => profile.services = value,
            ProfileField::Industries => profile.industries = value,
            ProfileField::ClientTypes => profile.client_types = value,
            ProfileField::ReviewRating => profile.review_rating = value,
            ProfileField::ReviewCount => profile.review_count = value,
            ProfileField::AreasOfExpertise => profile.areas_of_expertise = value,
        }
    }

    if let Some(base) = base_url {
        profile.website = resolve_href(&profile.website, base);
    }
    profile.reviews = extract_reviews(&doc);
    profile
}

impl CompiledField {
    fn evaluate(&self, doc: &Html) -> String {
        match &self.mode {
            CompiledMode::Text => self
                .selectors
                .iter()
                .map(|sel| first_text(doc, sel))
                .find(|text| !text.is_empty())
                .unwrap_or_default(),
            CompiledMode::JoinedList => self
                .selectors
                .iter()
                .map(|sel| {
                    doc.select(sel)
                        .map(|el| element_text(&el))
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .find(|joined| !joined.is_empty())
                .unwrap_or_default(),
            CompiledMode::Attr(name) => self
                .selectors
                .iter()
                .map(|sel| {
                    doc.select(sel)
                        .next()
                        .and_then(|el| el.value().attr(name))
                        .unwrap_or("")
                        .to_string()
                })
                .find(|attr| !attr.is_empty())
                .unwrap_or_default(),
            CompiledMode::Capture(pattern) => {
                let text = self
                    .selectors
                    .iter()
                    .map(|sel| first_text(doc, sel))
                    .find(|text| !text.is_empty())
                    .unwrap_or_default();
                pattern
                    .captures(&text)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default()
            }
            CompiledMode::Labeled {
                label,
                value,
                needle,
            } => {
                for sel in &self.selectors {
                    for item in doc.select(sel) {
                        let item_label = sub_text(&item, label);
                        if item_label.to_lowercase().contains(needle) {
                            return sub_text(&item, value);
                        }
                    }
                }
                String::new()
            }
        }
    }
}

fn extract_reviews(doc: &Html) -> Vec<ReviewEntry> {
    doc.select(&REVIEW_ITEM_SELECTOR)
        .map(|item| ReviewEntry {
            author_name: sub_text(&item, &REVIEW_AUTHOR_SELECTOR),
            author_position: sub_text(&item, &REVIEW_POSITION_SELECTOR),
            review_item_title: sub_text(&item, &REVIEW_TITLE_SELECTOR),
            review_type: sub_text(&item, &REVIEW_TYPE_SELECTOR),
            review_description: sub_text(&item, &REVIEW_DESCRIPTION_SELECTOR),
        })
        .collect()
}

fn resolve_href(href: &str, base_url: &str) -> String {
    if href.is_empty() {
        return String::new();
    }
    Url::parse(base_url)
        .ok()
        .and_then(|base| base.join(href).ok())
        .map(|resolved| resolved.to_string())
        .unwrap_or_else(|| href.to_string())
}

fn first_text(doc: &Html, sel: &Selector) -> String {
    doc.select(sel)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default()
}

fn sub_text(parent: &ElementRef, sel: &Selector) -> String {
    parent
        .select(sel)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default()
}

fn element_text(el: &ElementRef) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_table_covers_every_field_once() {
        for field in ProfileField::ALL {
            let count = PROFILE_FIELDS.iter().filter(|s| s.field == field).count();
            assert_eq!(count, 1, "{:?} should appear exactly once", field);
        }
    }

    #[test]
    fn test_resolve_href_joins_relative_links() {
        assert_eq!(
            resolve_href("/goto/site", "https://example.com/agency/acme"),
            "https://example.com/goto/site"
        );
        assert_eq!(
            resolve_href("https://acme.example", "https://example.com/agency/acme"),
            "https://acme.example/"
        );
        assert_eq!(resolve_href("", "https://example.com"), "");
    }

    #[test]
    fn test_review_count_capture() {
        let html = r#"<div class="profile-header--reviews">
            <span class="review-rating">4.8</span>
            <span class="review-count">(12 reviews)</span>
        </div>"#;
        let profile = extract_profile(html, None);
        assert_eq!(profile.review_rating, "4.8");
        assert_eq!(profile.review_count, "12");
    }

    #[test]
    fn test_single_review_grammar() {
        let html = r#"<div class="profile-header--reviews">
            <span class="review-count">(1 review)</span>
        </div>"#;
        let profile = extract_profile(html, None);
        assert_eq!(profile.review_count, "1");
    }

    #[test]
    fn test_title_falls_through_candidates() {
        let html = "<h1>Fallback Name</h1>";
        let profile = extract_profile(html, None);
        assert_eq!(profile.title, "Fallback Name");
    }

    #[test]
    fn test_missing_sections_default_empty() {
        let profile = extract_profile("<html><body></body></html>", None);
        assert_eq!(profile.title, "");
        assert_eq!(profile.services, "");
        assert_eq!(profile.review_count, "");
        assert!(profile.reviews.is_empty());
    }
}
