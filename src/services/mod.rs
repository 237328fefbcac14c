pub mod comparison;
pub mod pipeline;
pub mod recommender;
pub mod scoring;
pub mod wizard;

pub use comparison::{ComparisonCell, ComparisonFeature, ComparisonTable};
pub use recommender::{HttpRecommender, RecommendationSource};
pub use scoring::{star_rating, StarRating};
pub use wizard::{FetchTicket, Wizard, GENERIC_ERROR_MESSAGE};
