use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Sentinel value meaning "no restriction" for tab and job level selections
pub const ALL: &str = "all";

/// A single-value selection that is either unrestricted (`"all"`) or one concrete label
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Facet {
    #[default]
    All,
    Only(String),
}

impl From<String> for Facet {
    fn from(value: String) -> Self {
        if value == ALL {
            Facet::All
        } else {
            Facet::Only(value)
        }
    }
}

impl From<&str> for Facet {
    fn from(value: &str) -> Self {
        Facet::from(value.to_string())
    }
}

impl From<Facet> for String {
    fn from(facet: Facet) -> Self {
        match facet {
            Facet::All => ALL.to_string(),
            Facet::Only(value) => value,
        }
    }
}

impl Display for Facet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Facet::All => write!(f, "{}", ALL),
            Facet::Only(value) => write!(f, "{}", value),
        }
    }
}

/// Sort criterion for the displayed list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Descending relevance score
    #[default]
    Relevance,
    /// Ascending name, locale-aware
    Name,
    /// Ascending duration in minutes
    Duration,
}

/// Inputs of the filter/sort pipeline besides the raw list
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Filters {
    /// Free-text search, empty means no filtering
    pub search: String,
    /// Active test type tab
    pub test_type: Facet,
    /// Job level filter
    pub job_level: Facet,
    pub sort_by: SortBy,
}

impl Filters {
    /// Resets the narrowing filters, keeping the sort criterion
    pub fn clear(&mut self) {
        self.search.clear();
        self.test_type = Facet::All;
        self.job_level = Facet::All;
    }

    /// Applies the fields present in `update`
    pub fn apply(&mut self, update: FiltersUpdate) {
        if let Some(search) = update.search {
            self.search = search;
        }
        if let Some(test_type) = update.test_type {
            self.test_type = test_type;
        }
        if let Some(job_level) = update.job_level {
            self.job_level = job_level;
        }
        if let Some(sort_by) = update.sort_by {
            self.sort_by = sort_by;
        }
    }
}

/// Partial update of [`Filters`]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FiltersUpdate {
    pub search: Option<String>,
    pub test_type: Option<Facet>,
    pub job_level: Option<Facet>,
    pub sort_by: Option<SortBy>,
}
