use serde::Serialize;
use uuid::Uuid;

use crate::{
    models::{Filters, ItemId, Notification, Recommendation, StepStatus, WizardStep},
    services::{star_rating, ComparisonTable, StarRating, Wizard},
};

/// Milestones shown in the progress indicator
const PROGRESS_MILESTONES: [(&str, WizardStep); 2] =
    [("Query", WizardStep::Query), ("Results", WizardStep::Results)];

/// Everything a client needs to render the current wizard screen
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub step: WizardStep,
    pub progress: ProgressView,
    pub query: String,
    pub loading: bool,
    pub can_submit: bool,
    pub error: Option<String>,
    pub filters: Filters,
    pub type_tabs: Vec<String>,
    pub job_levels: Vec<String>,
    /// Number of fetched records before filtering
    pub total_count: usize,
    pub items: Vec<CardView>,
    /// "No assessments found" state of the results screen
    pub empty_state: bool,
    pub comparison_ids: Vec<ItemId>,
    pub can_compare: bool,
    pub show_comparison: bool,
    pub comparison: Option<ComparisonTable>,
    pub favorite_ids: Vec<ItemId>,
}

#[derive(Debug, Serialize)]
pub struct ProgressView {
    pub percent: f64,
    pub steps: Vec<ProgressStep>,
}

#[derive(Debug, Serialize)]
pub struct ProgressStep {
    pub name: &'static str,
    pub status: StepStatus,
}

/// One result card
#[derive(Debug, Serialize)]
pub struct CardView {
    pub id: ItemId,
    pub name: String,
    pub test_type: String,
    pub duration: String,
    pub job_level_badge: String,
    pub relevance_score: f64,
    pub stars: StarRating,
    pub explanation: String,
    pub url: String,
    pub expanded: bool,
    pub in_comparison: bool,
    pub favorite: bool,
    /// Present only while the card is expanded
    pub details: Option<CardDetails>,
}

#[derive(Debug, Serialize)]
pub struct CardDetails {
    pub description: String,
    pub languages: String,
    pub job_levels: String,
}

impl CardView {
    fn new(rec: &Recommendation, wizard: &Wizard) -> Self {
        let expanded = wizard.is_expanded(rec.id);
        Self {
            id: rec.id,
            name: rec.name.clone(),
            test_type: rec.test_type.clone(),
            duration: rec.duration.clone(),
            job_level_badge: rec.job_level_badge(),
            relevance_score: rec.score(),
            stars: star_rating(rec.score()),
            explanation: rec.explanation.clone(),
            url: rec.url.clone(),
            expanded,
            in_comparison: wizard.is_compared(rec.id),
            favorite: wizard.is_favorite(rec.id),
            details: expanded.then(|| CardDetails {
                description: rec.description.clone(),
                languages: rec.languages.clone(),
                job_levels: rec.job_levels.clone(),
            }),
        }
    }
}

impl SessionView {
    pub fn new(id: Uuid, wizard: &Wizard) -> Self {
        let step = wizard.step();
        let progress = ProgressView {
            percent: step.progress_percent(),
            steps: PROGRESS_MILESTONES
                .iter()
                .map(|&(name, milestone)| ProgressStep {
                    name,
                    status: step.milestone_status(milestone),
                })
                .collect(),
        };

        Self {
            id,
            step,
            progress,
            query: wizard.query().to_string(),
            loading: wizard.loading(),
            can_submit: wizard.can_submit(),
            error: wizard.error().map(str::to_string),
            filters: wizard.filters().clone(),
            type_tabs: wizard.type_tabs(),
            job_levels: wizard.job_levels(),
            total_count: wizard.recommendations().len(),
            items: wizard
                .displayed()
                .map(|rec| CardView::new(rec, wizard))
                .collect(),
            empty_state: wizard.is_empty_state(),
            comparison_ids: wizard.comparison_ids().to_vec(),
            can_compare: wizard.can_compare(),
            show_comparison: wizard.show_comparison(),
            comparison: wizard.comparison_table(),
            favorite_ids: wizard.favorite_ids().to_vec(),
        }
    }
}

/// Response to a favorite toggle
#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub favorite: bool,
    pub notification: Notification,
    pub session: SessionView,
}
