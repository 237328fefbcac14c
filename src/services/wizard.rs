//! Recommendation wizard view-model
//!
//! One explicit state struct with synchronous transition methods. The only asynchronous
//! step, fetching recommendations, is split into [`Wizard::begin_submit`] and
//! [`Wizard::complete_submit`] so a host can release its lock while the request is in
//! flight. [`Wizard::submit`] chains both for single-owner callers.
use std::collections::HashSet;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{
        ApiRecommendation, Facet, Filters, FiltersUpdate, ItemId, Notification, Recommendation,
        SortBy, WizardStep,
    },
    services::{
        comparison::{self, ComparisonTable, MIN_COMPARED_ITEMS},
        pipeline,
        recommender::RecommendationSource,
        scoring,
    },
};

/// Message shown for any failed fetch; the cause is only logged
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred. Please try again.";

/// Identifies one submission so a late outcome cannot land on a wizard that moved on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

#[derive(Debug, Default)]
pub struct Wizard {
    step: WizardStep,
    query: String,
    loading: bool,
    error: Option<String>,
    recommendations: Vec<Recommendation>,
    /// Filtered and sorted view over `recommendations`
    displayed: Vec<ItemId>,
    filters: Filters,
    expanded: HashSet<ItemId>,
    /// Insertion order is the comparison column order
    comparison: Vec<ItemId>,
    favorites: Vec<ItemId>,
    show_comparison: bool,
    fetch_generation: u64,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Every fetched record, in arrival order
    pub fn recommendations(&self) -> &[Recommendation] {
        &self.recommendations
    }

    pub fn displayed_ids(&self) -> &[ItemId] {
        &self.displayed
    }

    /// The filtered and sorted list
    pub fn displayed(&self) -> impl Iterator<Item = &Recommendation> {
        self.displayed.iter().filter_map(|id| self.recommendation(*id))
    }

    pub fn recommendation(&self, id: ItemId) -> Option<&Recommendation> {
        self.recommendations.get(id.0).filter(|rec| rec.id == id)
    }

    pub fn is_expanded(&self, id: ItemId) -> bool {
        self.expanded.contains(&id)
    }

    pub fn is_compared(&self, id: ItemId) -> bool {
        self.comparison.contains(&id)
    }

    pub fn is_favorite(&self, id: ItemId) -> bool {
        self.favorites.contains(&id)
    }

    pub fn comparison_ids(&self) -> &[ItemId] {
        &self.comparison
    }

    pub fn favorite_ids(&self) -> &[ItemId] {
        &self.favorites
    }

    pub fn show_comparison(&self) -> bool {
        self.show_comparison
    }

    pub fn can_submit(&self) -> bool {
        self.step == WizardStep::Query && !self.loading && !self.query.trim().is_empty()
    }

    pub fn can_compare(&self) -> bool {
        self.comparison.len() >= MIN_COMPARED_ITEMS
    }

    /// Results step with nothing left after filtering
    pub fn is_empty_state(&self) -> bool {
        self.step == WizardStep::Results && self.displayed.is_empty()
    }

    pub fn type_tabs(&self) -> Vec<String> {
        pipeline::type_tabs(&self.recommendations)
    }

    pub fn job_levels(&self) -> Vec<String> {
        pipeline::job_levels(&self.recommendations)
    }

    /// Comparison table, rendered only while the panel is visible and 2+ items are selected
    pub fn comparison_table(&self) -> Option<ComparisonTable> {
        if !self.show_comparison {
            return None;
        }
        self.selected_comparison()
    }

    /// Comparison table regardless of panel visibility
    pub fn selected_comparison(&self) -> Option<ComparisonTable> {
        comparison::build(&self.recommendations, &self.comparison)
    }

    // ------------------------------------------------------------------------
    // Step transitions
    // ------------------------------------------------------------------------

    /// Welcome -> Query
    pub fn start(&mut self) -> AppResult<()> {
        self.expect_step(WizardStep::Welcome, "start")?;
        self.step = WizardStep::Query;
        Ok(())
    }

    /// Query -> Welcome
    ///
    /// Abandons an in-flight fetch: its outcome will be discarded.
    pub fn back(&mut self) -> AppResult<()> {
        self.expect_step(WizardStep::Query, "go back")?;
        if self.loading {
            self.loading = false;
            self.fetch_generation += 1;
        }
        self.step = WizardStep::Welcome;
        Ok(())
    }

    pub fn set_query(&mut self, query: impl Into<String>) -> AppResult<()> {
        self.expect_step(WizardStep::Query, "edit the query")?;
        self.query = query.into();
        Ok(())
    }

    /// Starts a submission, returning the ticket and the trimmed query to fetch
    ///
    /// Clears the previous error, list and per-item flags, and raises `loading`.
    pub fn begin_submit(&mut self) -> AppResult<(FetchTicket, String)> {
        self.expect_step(WizardStep::Query, "submit")?;
        if self.loading {
            return Err(AppError::Conflict(
                "A recommendation request is already in flight".to_string(),
            ));
        }
        let query = self.query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput("Query is required".to_string()));
        }
        let query = query.to_string();

        self.loading = true;
        self.error = None;
        self.clear_results();
        self.fetch_generation += 1;

        Ok((FetchTicket(self.fetch_generation), query))
    }

    /// Applies the outcome of the fetch started with `ticket`
    ///
    /// Success moves to Results; failure stays on Query with the generic error message.
    /// Returns `false` when the outcome was discarded because the wizard moved on.
    pub fn complete_submit(
        &mut self,
        ticket: FetchTicket,
        outcome: AppResult<Vec<ApiRecommendation>>,
    ) -> bool {
        if !self.loading || ticket != FetchTicket(self.fetch_generation) {
            tracing::debug!("Discarding stale recommendation outcome");
            return false;
        }
        self.loading = false;

        match outcome {
            Ok(records) => {
                let mut recommendations: Vec<Recommendation> = records
                    .into_iter()
                    .enumerate()
                    .map(|(position, rec)| rec.into_recommendation(ItemId(position)))
                    .collect();
                scoring::assign_fallback_scores(&mut recommendations);

                tracing::info!(count = recommendations.len(), "Showing recommendations");
                self.recommendations = recommendations;
                self.recompute();
                self.step = WizardStep::Results;
            }
            Err(e) => {
                tracing::error!(error = %e, "Fetching recommendations failed");
                self.error = Some(GENERIC_ERROR_MESSAGE.to_string());
            }
        }

        true
    }

    /// Submits the current query to `source` and applies the outcome
    pub async fn submit(
        &mut self,
        source: &dyn RecommendationSource,
        request_id: RequestId,
    ) -> AppResult<()> {
        let (ticket, query) = self.begin_submit()?;
        let outcome = source.fetch_recommendations(&query, request_id).await;
        self.complete_submit(ticket, outcome);
        Ok(())
    }

    /// Results -> Welcome, resetting query, list, filters and flags
    pub fn new_search(&mut self) -> AppResult<()> {
        self.expect_step(WizardStep::Results, "start a new search")?;
        *self = Wizard {
            fetch_generation: self.fetch_generation + 1,
            ..Wizard::default()
        };
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Filters
    // ------------------------------------------------------------------------

    pub fn set_search(&mut self, search: impl Into<String>) -> AppResult<()> {
        self.update_filters(FiltersUpdate {
            search: Some(search.into()),
            ..FiltersUpdate::default()
        })
    }

    pub fn set_type_tab(&mut self, tab: Facet) -> AppResult<()> {
        self.update_filters(FiltersUpdate {
            test_type: Some(tab),
            ..FiltersUpdate::default()
        })
    }

    pub fn set_job_level(&mut self, level: Facet) -> AppResult<()> {
        self.update_filters(FiltersUpdate {
            job_level: Some(level),
            ..FiltersUpdate::default()
        })
    }

    pub fn set_sort(&mut self, sort_by: SortBy) -> AppResult<()> {
        self.update_filters(FiltersUpdate {
            sort_by: Some(sort_by),
            ..FiltersUpdate::default()
        })
    }

    pub fn update_filters(&mut self, update: FiltersUpdate) -> AppResult<()> {
        self.expect_step(WizardStep::Results, "change filters")?;
        self.filters.apply(update);
        self.recompute();
        Ok(())
    }

    /// Resets search, type tab and job level; the sort criterion is kept
    pub fn clear_filters(&mut self) -> AppResult<()> {
        self.expect_step(WizardStep::Results, "clear filters")?;
        self.filters.clear();
        self.recompute();
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Per-item flags
    // ------------------------------------------------------------------------

    /// Toggles card expansion, returning the new state
    pub fn toggle_expanded(&mut self, id: ItemId) -> AppResult<bool> {
        self.ensure_item(id)?;
        if self.expanded.remove(&id) {
            Ok(false)
        } else {
            self.expanded.insert(id);
            Ok(true)
        }
    }

    /// Toggles comparison membership, returning the new state
    pub fn toggle_comparison(&mut self, id: ItemId) -> AppResult<bool> {
        self.ensure_item(id)?;
        Ok(toggle_membership(&mut self.comparison, id))
    }

    /// Toggles favorite membership and returns the notification to show
    pub fn toggle_favorite(&mut self, id: ItemId) -> AppResult<Notification> {
        self.ensure_item(id)?;
        let notification = if toggle_membership(&mut self.favorites, id) {
            Notification::favorite_added()
        } else {
            Notification::favorite_removed()
        };
        Ok(notification)
    }

    /// Shows or hides the comparison panel, returning the new visibility
    pub fn toggle_comparison_panel(&mut self) -> AppResult<bool> {
        self.expect_step(WizardStep::Results, "toggle the comparison")?;
        self.show_comparison = !self.show_comparison;
        Ok(self.show_comparison)
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn recompute(&mut self) {
        self.displayed = pipeline::apply(&self.recommendations, &self.filters)
            .into_iter()
            .map(|rec| rec.id)
            .collect();
    }

    fn clear_results(&mut self) {
        self.recommendations.clear();
        self.displayed.clear();
        self.expanded.clear();
        self.comparison.clear();
        self.favorites.clear();
        self.show_comparison = false;
    }

    fn ensure_item(&self, id: ItemId) -> AppResult<()> {
        self.recommendation(id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Recommendation {} not found", id)))
    }

    fn expect_step(&self, expected: WizardStep, action: &str) -> AppResult<()> {
        if self.step == expected {
            Ok(())
        } else {
            Err(AppError::Conflict(format!(
                "Cannot {} from the {:?} step",
                action, self.step
            )))
        }
    }
}

/// Adds `id` when absent, removes it when present; returns the new membership
fn toggle_membership(set: &mut Vec<ItemId>, id: ItemId) -> bool {
    if let Some(position) = set.iter().position(|member| *member == id) {
        set.remove(position);
        false
    } else {
        set.push(id);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::recommendation::fixtures::api_recommendation;
    use crate::services::recommender::MockRecommendationSource;
    use tokio_test::{assert_err, assert_ok};

    fn pair() -> Vec<ApiRecommendation> {
        vec![
            api_recommendation("A", "Cognitive", "Entry-Level", "30 minutes"),
            api_recommendation("B", "Personality", "Senior", "10 minutes"),
        ]
    }

    fn four() -> Vec<ApiRecommendation> {
        vec![
            api_recommendation("Delta", "Cognitive", "Entry-Level", "40 minutes"),
            api_recommendation("alpha", "Personality", "Senior", "10 minutes"),
            api_recommendation("Charlie", "Cognitive", "Manager, Senior", "25 minutes"),
            api_recommendation("Bravo", "Simulations", "Entry-Level", "Untimed"),
        ]
    }

    fn on_query(query: &str) -> Wizard {
        let mut wizard = Wizard::new();
        wizard.start().unwrap();
        wizard.set_query(query).unwrap();
        wizard
    }

    fn with_results(records: Vec<ApiRecommendation>) -> Wizard {
        let mut wizard = on_query("java developers");
        let (ticket, _) = wizard.begin_submit().unwrap();
        assert!(wizard.complete_submit(ticket, Ok(records)));
        wizard
    }

    fn displayed_names(wizard: &Wizard) -> Vec<String> {
        wizard.displayed().map(|rec| rec.name.clone()).collect()
    }

    #[test]
    fn test_step_transitions() {
        let mut wizard = Wizard::new();
        assert_eq!(wizard.step(), WizardStep::Welcome);

        assert_ok!(wizard.start());
        assert_eq!(wizard.step(), WizardStep::Query);

        assert_ok!(wizard.back());
        assert_eq!(wizard.step(), WizardStep::Welcome);
    }

    #[test]
    fn test_invalid_transitions_are_rejected() {
        let mut wizard = Wizard::new();
        assert!(matches!(wizard.back(), Err(AppError::Conflict(_))));
        assert!(matches!(wizard.new_search(), Err(AppError::Conflict(_))));
        assert!(matches!(wizard.begin_submit(), Err(AppError::Conflict(_))));
        assert!(matches!(wizard.set_search("x"), Err(AppError::Conflict(_))));
        assert_eq!(wizard.step(), WizardStep::Welcome);

        wizard.start().unwrap();
        assert!(matches!(wizard.start(), Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_blank_query_cannot_be_submitted() {
        let mut wizard = on_query("   \t ");
        assert!(!wizard.can_submit());
        assert!(matches!(wizard.begin_submit(), Err(AppError::InvalidInput(_))));
        assert!(!wizard.loading());
    }

    #[test]
    fn test_begin_submit_trims_and_guards_loading() {
        let mut wizard = on_query("  java developers  ");
        assert!(wizard.can_submit());

        let (_, query) = wizard.begin_submit().unwrap();
        assert_eq!(query, "java developers");
        assert!(wizard.loading());
        assert!(!wizard.can_submit());

        assert!(matches!(wizard.begin_submit(), Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_successful_fetch_moves_to_results_with_fallback_scores() {
        let wizard = with_results(four());

        assert_eq!(wizard.step(), WizardStep::Results);
        assert!(!wizard.loading());
        assert_eq!(wizard.error(), None);

        let scores: Vec<Option<f64>> = wizard
            .recommendations()
            .iter()
            .map(|rec| rec.relevance_score)
            .collect();
        assert_eq!(scores, vec![Some(7.5), Some(5.0), Some(2.5), Some(0.0)]);
        assert_eq!(
            displayed_names(&wizard),
            vec!["Delta", "alpha", "Charlie", "Bravo"]
        );
    }

    #[test]
    fn test_failed_fetch_stays_on_query() {
        let mut wizard = on_query("java");
        let (ticket, _) = wizard.begin_submit().unwrap();

        let applied = wizard.complete_submit(
            ticket,
            Err(AppError::MalformedResponse("'recommendations' missing".to_string())),
        );

        assert!(applied);
        assert_eq!(wizard.step(), WizardStep::Query);
        assert_eq!(wizard.error(), Some(GENERIC_ERROR_MESSAGE));
        assert!(wizard.recommendations().is_empty());
        assert!(!wizard.loading());
        assert!(wizard.can_submit());
    }

    #[test]
    fn test_resubmit_clears_previous_error() {
        let mut wizard = on_query("java");
        let (ticket, _) = wizard.begin_submit().unwrap();
        wizard.complete_submit(ticket, Err(AppError::ExternalApi("503".to_string())));

        let (ticket, _) = wizard.begin_submit().unwrap();
        assert_eq!(wizard.error(), None);
        wizard.complete_submit(ticket, Ok(pair()));
        assert_eq!(wizard.step(), WizardStep::Results);
    }

    #[test]
    fn test_empty_result_is_not_an_error() {
        let wizard = with_results(vec![]);
        assert_eq!(wizard.step(), WizardStep::Results);
        assert_eq!(wizard.error(), None);
        assert!(wizard.is_empty_state());
        assert_eq!(wizard.type_tabs(), vec!["all"]);
    }

    #[test]
    fn test_outcome_after_back_is_discarded() {
        let mut wizard = on_query("java");
        let (ticket, _) = wizard.begin_submit().unwrap();
        wizard.back().unwrap();

        assert!(!wizard.complete_submit(ticket, Ok(pair())));
        assert_eq!(wizard.step(), WizardStep::Welcome);
        assert!(wizard.recommendations().is_empty());
    }

    #[test]
    fn test_filters_and_tabs() {
        let mut wizard = with_results(pair());
        assert_eq!(wizard.type_tabs(), vec!["all", "Cognitive", "Personality"]);
        assert_eq!(wizard.job_levels(), vec!["all", "Entry-Level", "Senior"]);

        wizard.set_type_tab(Facet::from("Cognitive")).unwrap();
        assert_eq!(displayed_names(&wizard), vec!["A"]);

        wizard.set_type_tab(Facet::All).unwrap();
        wizard.set_sort(SortBy::Duration).unwrap();
        assert_eq!(displayed_names(&wizard), vec!["B", "A"]);

        wizard.set_search("nothing matches this").unwrap();
        assert!(wizard.is_empty_state());

        wizard.clear_filters().unwrap();
        assert_eq!(displayed_names(&wizard), vec!["B", "A"]);
        assert_eq!(wizard.filters().sort_by, SortBy::Duration);
    }

    #[test]
    fn test_flags_follow_item_across_sorts() {
        let mut wizard = with_results(four());
        let charlie = wizard
            .recommendations()
            .iter()
            .find(|rec| rec.name == "Charlie")
            .map(|rec| rec.id)
            .unwrap();

        wizard.toggle_favorite(charlie).unwrap();
        wizard.toggle_comparison(charlie).unwrap();
        wizard.toggle_expanded(charlie).unwrap();

        for sort_by in [SortBy::Name, SortBy::Duration, SortBy::Relevance] {
            wizard.set_sort(sort_by).unwrap();
            let flagged: Vec<&str> = wizard
                .displayed()
                .filter(|rec| wizard.is_favorite(rec.id))
                .map(|rec| rec.name.as_str())
                .collect();
            assert_eq!(flagged, vec!["Charlie"]);
            assert!(wizard.is_compared(charlie));
            assert!(wizard.is_expanded(charlie));
        }
    }

    #[test]
    fn test_toggling_twice_restores_membership() {
        let mut wizard = with_results(pair());
        let id = ItemId(1);

        assert_eq!(wizard.toggle_favorite(id).unwrap().title, "Added to favorites");
        assert_eq!(wizard.toggle_favorite(id).unwrap().title, "Removed from favorites");
        assert!(!wizard.is_favorite(id));

        assert!(wizard.toggle_comparison(id).unwrap());
        assert!(!wizard.toggle_comparison(id).unwrap());
        assert!(!wizard.is_compared(id));

        assert!(wizard.toggle_expanded(id).unwrap());
        assert!(!wizard.toggle_expanded(id).unwrap());
    }

    #[test]
    fn test_unknown_item_is_not_found() {
        let mut wizard = with_results(pair());
        assert!(matches!(
            wizard.toggle_favorite(ItemId(5)),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_comparison_requires_two_and_visible_panel() {
        let mut wizard = with_results(four());
        wizard.toggle_comparison(ItemId(2)).unwrap();
        assert!(!wizard.can_compare());

        wizard.toggle_comparison(ItemId(0)).unwrap();
        assert!(wizard.can_compare());
        assert!(wizard.comparison_table().is_none());

        assert!(wizard.toggle_comparison_panel().unwrap());
        let table = wizard.comparison_table().unwrap();
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Charlie", "Delta"]);

        wizard.toggle_comparison(ItemId(0)).unwrap();
        assert!(wizard.comparison_table().is_none());
    }

    #[test]
    fn test_new_search_resets_everything() {
        let mut wizard = with_results(four());
        wizard.set_search("a").unwrap();
        wizard.set_sort(SortBy::Name).unwrap();
        wizard.toggle_favorite(ItemId(0)).unwrap();
        wizard.toggle_comparison(ItemId(1)).unwrap();
        wizard.toggle_comparison_panel().unwrap();

        assert_ok!(wizard.new_search());

        assert_eq!(wizard.step(), WizardStep::Welcome);
        assert_eq!(wizard.query(), "");
        assert!(wizard.recommendations().is_empty());
        assert!(wizard.displayed_ids().is_empty());
        assert_eq!(wizard.filters(), &Filters::default());
        assert!(wizard.favorite_ids().is_empty());
        assert!(wizard.comparison_ids().is_empty());
        assert!(!wizard.show_comparison());
    }

    #[tokio::test]
    async fn test_submit_calls_source_with_trimmed_query() {
        let mut source = MockRecommendationSource::new();
        source
            .expect_fetch_recommendations()
            .withf(|query, _| query == "java developers")
            .times(1)
            .returning(|_, _| Ok(pair()));

        let mut wizard = on_query("  java developers ");
        assert_ok!(wizard.submit(&source, RequestId::new()).await);

        assert_eq!(wizard.step(), WizardStep::Results);
        assert_eq!(wizard.recommendations().len(), 2);
    }

    #[tokio::test]
    async fn test_submit_never_fetches_blank_query() {
        let mut source = MockRecommendationSource::new();
        source.expect_fetch_recommendations().times(0);

        let mut wizard = on_query("  ");
        assert_err!(wizard.submit(&source, RequestId::new()).await);
        assert_eq!(wizard.step(), WizardStep::Query);
    }

    #[tokio::test]
    async fn test_submit_failure_sets_error() {
        let mut source = MockRecommendationSource::new();
        source
            .expect_fetch_recommendations()
            .returning(|_, _| Err(AppError::ExternalApi("status 500".to_string())));

        let mut wizard = on_query("java");
        assert_ok!(wizard.submit(&source, RequestId::new()).await);

        assert_eq!(wizard.step(), WizardStep::Query);
        assert_eq!(wizard.error(), Some(GENERIC_ERROR_MESSAGE));
    }
}
