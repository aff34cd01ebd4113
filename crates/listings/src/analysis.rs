//! Analysis records.

use chrono::{DateTime, Utc};
use craftlens_core::{AnalysisId, DomainError, DomainResult, UserId};
use serde::{Deserialize, Serialize};

/// The listing as submitted for analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingInput {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub price: f64,
    pub category: String,
}

impl ListingInput {
    /// Field-level validation before any quota is consumed.
    pub fn validate(&self) -> DomainResult<()> {
        if self.title.trim().is_empty()
            || self.description.trim().is_empty()
            || self.category.trim().is_empty()
        {
            return Err(DomainError::validation(
                "title, description, price and category are required",
            ));
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(DomainError::validation("price must be a positive number"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagSuggestion {
    pub tag: String,
    pub reasoning: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompetitorRange {
    pub min: f64,
    pub max: f64,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRecommendation {
    pub suggested_price: f64,
    pub reasoning: String,
    pub competitor_range: CompetitorRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub priority: ActionPriority,
    pub action: String,
    pub impact: String,
}

/// Full recommendation payload for one listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub optimized_title: String,
    pub title_reasoning: String,
    pub optimized_description: String,
    pub description_reasoning: String,
    pub optimized_tags: Vec<TagSuggestion>,
    pub pricing: PricingRecommendation,
    pub action_items: Vec<ActionItem>,
}

/// A (currently mocked) competitor listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub title: String,
    pub price: f64,
    pub sales: u32,
    pub ranking: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Pending,
    #[default]
    Completed,
    Failed,
}

/// One stored analysis, owned by the customer who ran it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub id: AnalysisId,
    pub user_id: UserId,
    pub listing: ListingInput,
    pub recommendations: Recommendations,
    pub competitors: Vec<Competitor>,
    /// Overall listing quality score, 0–100.
    pub score: u8,
    pub status: AnalysisStatus,
    pub processing_time_ms: u64,
    pub created_at: DateTime<Utc>,
}
