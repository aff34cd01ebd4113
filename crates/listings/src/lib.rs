//! `craftlens-listings` — Etsy-listing analysis domain.
//!
//! The recommendation engine is a canned template for now; the analysis
//! record and scoring contract are real so the eventual model swap is
//! invisible to callers.

pub mod analysis;
pub mod recommend;

pub use analysis::{
    ActionItem, ActionPriority, Analysis, AnalysisStatus, Competitor, CompetitorRange,
    ListingInput, PricingRecommendation, Recommendations, TagSuggestion,
};
pub use recommend::{generate_recommendations, mock_competitors, random_score};
