use serde::{Deserialize, Serialize};

pub const RESULT_HEADERS: [&str; 11] = [
    "Search Name",
    "Title",
    "Address",
    "Website",
    "Employees",
    "Services",
    "Industries",
    "Client Types",
    "Review Rating",
    "Review Count",
    "Areas of Expertise",
];

pub const REVIEW_HEADERS: [&str; 7] = [
    "Search Name",
    "Agency Title",
    "Author Name",
    "Author Position",
    "Review Item Title",
    "Review Type",
    "Review Description",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchParameters {
    pub business: String,
    pub category: String,
    pub location: String, // empty when the input sheet has no location column
}

impl SearchParameters {
    pub fn new(business: impl Into<String>, category: impl Into<String>) -> Self {
        SearchParameters {
            business: business.into(),
            category: category.into(),
            location: String::new(),
        }
    }

    pub fn search_name(&self) -> String {
        format!("{} | {} | {}", self.business, self.category, self.location)
    }
}

impl std::fmt::Display for SearchParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.search_name())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReviewEntry {
    pub author_name: String,
    pub author_position: String,
    pub review_item_title: String,
    pub review_type: String,
    pub review_description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgencyRecord {
    pub search_name: String,
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

impl AgencyRecord {
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.search_name.clone(),
            self.title.clone(),
            self.address.clone(),
            self.website.clone(),
            self.employees.clone(),
            self.services.clone(),
            self.industries.clone(),
            self.client_types.clone(),
            self.review_rating.clone(),
            self.review_count.clone(),
            self.areas_of_expertise.clone(),
        ]
    }
}

/// Results table handed to the sink: header row followed by one row per record.
pub fn result_rows(records: &[AgencyRecord]) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(RESULT_HEADERS.iter().map(|h| h.to_string()).collect());
    rows.extend(records.iter().map(AgencyRecord::to_row));
    rows
}

/// Reviews table: header row, then one row per review entry, flattened in
/// parent record order.
pub fn review_rows(records: &[AgencyRecord]) -> Vec<Vec<String>> {
    let mut rows = vec![REVIEW_HEADERS.iter().map(|h| h.to_string()).collect::<Vec<_>>()];
    for record in records {
        for review in &record.reviews {
            rows.push(vec![
                record.search_name.clone(),
                record.title.clone(),
                review.author_name.clone(),
                review.author_position.clone(),
                review.review_item_title.clone(),
                review.review_type.clone(),
                review.review_description.clone(),
            ]);
        }
    }
    rows
}
