use serde::Serialize;

use crate::{
    models::{ItemId, Recommendation},
    services::scoring::{star_rating, StarRating},
};

/// Minimum number of selected items for the comparison table to render
pub const MIN_COMPARED_ITEMS: usize = 2;

/// Attribute compared side by side, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonFeature {
    Type,
    Duration,
    JobLevels,
    Languages,
    RelevanceScore,
}

impl ComparisonFeature {
    pub const ALL: [ComparisonFeature; 5] = [
        ComparisonFeature::Type,
        ComparisonFeature::Duration,
        ComparisonFeature::JobLevels,
        ComparisonFeature::Languages,
        ComparisonFeature::RelevanceScore,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ComparisonFeature::Type => "Type",
            ComparisonFeature::Duration => "Duration",
            ComparisonFeature::JobLevels => "Job Levels",
            ComparisonFeature::Languages => "Languages",
            ComparisonFeature::RelevanceScore => "Relevance Score",
        }
    }

    fn cell(self, rec: &Recommendation) -> ComparisonCell {
        match self {
            ComparisonFeature::Type => ComparisonCell::Text(rec.test_type.clone()),
            ComparisonFeature::Duration => ComparisonCell::Text(rec.duration.clone()),
            ComparisonFeature::JobLevels => ComparisonCell::Text(rec.job_levels.clone()),
            ComparisonFeature::Languages => ComparisonCell::Text(rec.languages.clone()),
            ComparisonFeature::RelevanceScore => ComparisonCell::Stars(star_rating(rec.score())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ComparisonCell {
    Text(String),
    Stars(StarRating),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonColumn {
    pub id: ItemId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub feature: ComparisonFeature,
    pub label: &'static str,
    pub cells: Vec<ComparisonCell>,
}

/// Side-by-side table, one column per selected item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonTable {
    pub columns: Vec<ComparisonColumn>,
    pub rows: Vec<ComparisonRow>,
}

/// Builds the comparison table for `selected`, keeping selection order
///
/// Ids that do not resolve to a fetched item are skipped. Returns `None` when fewer than
/// [`MIN_COMPARED_ITEMS`] items remain.
pub fn build(recommendations: &[Recommendation], selected: &[ItemId]) -> Option<ComparisonTable> {
    let items: Vec<&Recommendation> = selected
        .iter()
        .filter_map(|id| recommendations.iter().find(|rec| rec.id == *id))
        .collect();

    if items.len() < MIN_COMPARED_ITEMS {
        return None;
    }

    let columns = items
        .iter()
        .map(|rec| ComparisonColumn {
            id: rec.id,
            name: rec.name.clone(),
        })
        .collect();

    let rows = ComparisonFeature::ALL
        .iter()
        .map(|feature| ComparisonRow {
            feature: *feature,
            label: feature.label(),
            cells: items.iter().map(|rec| feature.cell(rec)).collect(),
        })
        .collect();

    Some(ComparisonTable { columns, rows })
}
