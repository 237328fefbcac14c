pub mod filters;
pub mod notification;
pub mod recommendation;

pub use filters::{Facet, Filters, FiltersUpdate, SortBy, ALL};
pub use notification::Notification;
pub use recommendation::{
    duration_minutes, ApiRecommendation, ItemId, RecommendRequest, Recommendation,
};

use serde::{Deserialize, Serialize};

/// Wizard step, forward and backward transitions only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    #[default]
    Welcome,
    Query,
    Results,
}

impl WizardStep {
    const LAST_INDEX: usize = 2;

    /// Position in the wizard, 0-based
    pub fn index(self) -> usize {
        match self {
            WizardStep::Welcome => 0,
            WizardStep::Query => 1,
            WizardStep::Results => 2,
        }
    }

    /// Completion of the wizard as a percentage
    pub fn progress_percent(self) -> f64 {
        self.index() as f64 / Self::LAST_INDEX as f64 * 100.0
    }

    /// Status of `milestone` as seen from this step
    pub fn milestone_status(self, milestone: WizardStep) -> StepStatus {
        match self.index().cmp(&milestone.index()) {
            std::cmp::Ordering::Less => StepStatus::Upcoming,
            std::cmp::Ordering::Equal => StepStatus::Current,
            std::cmp::Ordering::Greater => StepStatus::Complete,
        }
    }
}

/// Rendering state of one entry in the progress indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Upcoming,
    Current,
    Complete,
}
