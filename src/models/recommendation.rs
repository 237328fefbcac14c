use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Separator between labels in a `job_levels` string
pub const JOB_LEVEL_SEPARATOR: &str = ", ";

static FIRST_INTEGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+").expect("static pattern is valid"));

/// Stable identifier assigned to a recommendation when it is fetched
///
/// Ids are arrival sequence numbers. UI flags (expanded, compared, favorite) are keyed by
/// this id so they keep pointing at the same assessment after the displayed list is
/// re-filtered or re-sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub usize);

impl Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw assessment record returned by the recommendation backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiRecommendation {
    pub name: String,
    pub test_type: String,
    pub duration: String,
    pub job_levels: String,
    pub languages: String,
    pub description: String,
    pub explanation: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
}

impl ApiRecommendation {
    /// Attaches the stable id assigned at fetch time
    pub fn into_recommendation(self, id: ItemId) -> Recommendation {
        Recommendation {
            id,
            name: self.name,
            test_type: self.test_type,
            duration: self.duration,
            job_levels: self.job_levels,
            languages: self.languages,
            description: self.description,
            explanation: self.explanation,
            url: self.url,
            relevance_score: self.relevance_score,
        }
    }
}

/// A fetched assessment, immutable once stored in the view-model
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    pub id: ItemId,
    pub name: String,
    pub test_type: String,
    pub duration: String,
    pub job_levels: String,
    pub languages: String,
    pub description: String,
    pub explanation: String,
    pub url: String,
    pub relevance_score: Option<f64>,
}

impl Recommendation {
    /// Relevance score with a missing value treated as 0
    pub fn score(&self) -> f64 {
        self.relevance_score.unwrap_or(0.0)
    }

    /// First integer embedded in the duration text, 0 when there is none
    pub fn duration_minutes(&self) -> u64 {
        duration_minutes(&self.duration)
    }

    /// Individual job level labels
    pub fn job_level_labels(&self) -> impl Iterator<Item = &str> {
        self.job_levels
            .split(JOB_LEVEL_SEPARATOR)
            .map(str::trim)
            .filter(|level| !level.is_empty())
    }

    /// Short job level badge: the first level, with `+` appended when there are more
    pub fn job_level_badge(&self) -> String {
        let mut levels = self.job_levels.split(JOB_LEVEL_SEPARATOR);
        let first = levels.next().unwrap_or_default();
        if levels.next().is_some() {
            format!("{}+", first)
        } else {
            first.to_string()
        }
    }

    /// Case-insensitive substring match over the searchable text fields
    ///
    /// `needle` must already be lowercased.
    pub fn matches_search(&self, needle: &str) -> bool {
        [
            &self.name,
            &self.description,
            &self.explanation,
            &self.test_type,
            &self.job_levels,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Extracts the first run of ASCII digits from a duration string
pub fn duration_minutes(duration: &str) -> u64 {
    FIRST_INTEGER
        .find(duration)
        .map(|m| m.as_str().parse::<u64>().unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Request body sent to the recommendation backend
#[derive(Debug, Clone, Serialize)]
pub struct RecommendRequest<'a> {
    pub query: &'a str,
}
