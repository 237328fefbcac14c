use serde::Serialize;

use crate::models::Recommendation;

/// Upper bound of the relevance scale
pub const MAX_RELEVANCE: f64 = 10.0;

/// Number of stars in a rating
pub const STAR_COUNT: u8 = 5;

/// Rank-based relevance for a record the backend sent without a score
///
/// Relies on the backend returning results in descending relevance order: the first of
/// `len` items scores just under [`MAX_RELEVANCE`], the last scores 0.
pub fn fallback_score(position: usize, len: usize) -> f64 {
    if len == 0 || position >= len {
        return 0.0;
    }
    (len - 1 - position) as f64 / len as f64 * MAX_RELEVANCE
}

/// Fills in missing relevance scores from arrival order
///
/// Returns how many records received a fallback score.
pub fn assign_fallback_scores(recommendations: &mut [Recommendation]) -> usize {
    let len = recommendations.len();
    let mut assigned = 0;

    for (position, rec) in recommendations.iter_mut().enumerate() {
        if rec.relevance_score.is_none() {
            rec.relevance_score = Some(fallback_score(position, len));
            assigned += 1;
        }
    }

    if assigned > 0 {
        tracing::debug!(
            assigned,
            total = len,
            "Assigned rank-based relevance scores assuming backend order is relevance-descending"
        );
    }

    assigned
}

/// Five-star rendering of a relevance score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StarRating {
    pub filled: u8,
    pub total: u8,
    /// Score formatted to one decimal
    pub label: String,
}

pub fn star_rating(score: f64) -> StarRating {
    let score = if score.is_finite() { score } else { 0.0 };
    let filled = (score / 2.0).round().clamp(0.0, STAR_COUNT as f64) as u8;

    StarRating {
        filled,
        total: STAR_COUNT,
        label: format!("{:.1}", score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::recommendation::fixtures::recommendation;

    #[test]
    fn test_fallback_scores_for_four_items() {
        let scores: Vec<f64> = (0..4).map(|i| fallback_score(i, 4)).collect();
        assert_eq!(scores, vec![7.5, 5.0, 2.5, 0.0]);
    }

    #[test]
    fn test_fallback_score_single_item() {
        assert_eq!(fallback_score(0, 1), 0.0);
        assert_eq!(fallback_score(0, 0), 0.0);
    }

    #[test]
    fn test_assign_keeps_backend_scores() {
        let mut recs = vec![
            recommendation(0, "A", "Cognitive", "Entry-Level", "30"),
            recommendation(1, "B", "Cognitive", "Entry-Level", "30"),
        ];
        recs[0].relevance_score = Some(9.1);

        let assigned = assign_fallback_scores(&mut recs);

        assert_eq!(assigned, 1);
        assert_eq!(recs[0].relevance_score, Some(9.1));
        assert_eq!(recs[1].relevance_score, Some(0.0));
    }

    #[test]
    fn test_star_rating() {
        assert_eq!(star_rating(7.5).filled, 4);
        assert_eq!(star_rating(7.5).label, "7.5");
        assert_eq!(star_rating(0.0).filled, 0);
        assert_eq!(star_rating(10.0).filled, 5);
        assert_eq!(star_rating(3.0).filled, 2);
        assert_eq!(star_rating(42.0).filled, 5);
        assert_eq!(star_rating(f64::NAN).label, "0.0");
    }
}
