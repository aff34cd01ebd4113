//! Canned recommendation engine.
//!
//! Deterministic templates keyed off the submitted listing, standing in for
//! a model-backed pipeline. Pricing figures derive from the submitted price
//! so the output stays plausible for any listing.

use rand::Rng;

use crate::analysis::{
    ActionItem, ActionPriority, Competitor, CompetitorRange, ListingInput, PricingRecommendation,
    Recommendations, TagSuggestion,
};

/// Round to cents.
fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Build the recommendation payload for a listing.
pub fn generate_recommendations(listing: &ListingInput) -> Recommendations {
    let price = listing.price;
    let suggested = round_cents(price * 1.25);

    let optimized_tags = vec![
        tag("premium gift", "High search volume (12K/month), low competition, matches buyer intent"),
        tag("handmade quality", "Etsy shoppers specifically search this, 8K monthly searches"),
        tag("fast shipping", "Reduces cart abandonment, 15K searches/month"),
        TagSuggestion {
            tag: listing.category.to_lowercase(),
            reasoning: "Your category as a tag increases discoverability by 25%".into(),
        },
        tag("unique present", "Gift-buyers use this term, 6K searches"),
        tag("artisan made", "Premium positioning keyword, 4K searches"),
        tag("ready to ship", "Urgency keyword, converts 30% higher"),
        tag("home decor", "Broad category, 50K+ searches"),
        tag("birthday gift", "Occasion-based, 18K searches"),
        tag("gift for her", "Gender-targeted, 22K searches"),
        tag("gift for him", "Gender-targeted, 19K searches"),
        tag("anniversary gift", "Occasion-based, 9K searches"),
        tag("custom order", "Personalization angle, 7K searches"),
    ];

    Recommendations {
        optimized_title: format!(
            "{} | Premium Quality | Fast Shipping | Gift Ready",
            truncate_chars(&listing.title, 30)
        ),
        title_reasoning: "Your original title was good but missing key buyer triggers. Added \
            \"Premium Quality\" to increase perceived value, \"Fast Shipping\" to reduce \
            purchase anxiety, and \"Gift Ready\" to capture gift-buyers. Limited to 140 \
            characters for SEO."
            .into(),
        optimized_description: format!(
            "🌟 PRODUCT HIGHLIGHTS\n{}... crafted with premium materials for lasting quality.\n\n\
             ✨ WHY CHOOSE US?\n\
             • Fast shipping - ships within 24 hours\n\
             • Premium packaging included\n\
             • 100% satisfaction guarantee\n\
             • Perfect gift option\n\n\
             📦 SHIPPING & RETURNS\n\
             Ships from our studio within 1 business day. Free returns within 30 days.\n\n\
             💝 PERFECT FOR\n\
             Gifts, home decor, special occasions, or treating yourself!\n\n\
             ORDER NOW and get FREE gift wrapping with your purchase!",
            truncate_chars(&listing.description, 100)
        ),
        description_reasoning: "Restructured your description with clear sections, added emojis \
            for visual appeal, included trust signals (shipping time, guarantee), and ended \
            with urgency CTA. This format increases conversions by 40% based on competitor \
            analysis."
            .into(),
        optimized_tags,
        pricing: PricingRecommendation {
            suggested_price: suggested,
            reasoning: format!(
                "Your current price of ${price} is undervalued. Top competitors charge \
                 ${:.0}-${:.0}. Recommended 25% increase to ${suggested} positions you as \
                 premium without losing sales. This sweet spot maximizes revenue.",
                (price * 1.15).round(),
                (price * 1.35).round(),
            ),
            competitor_range: CompetitorRange {
                min: round_cents(price * 0.9),
                max: round_cents(price * 1.5),
                average: round_cents(price * 1.25),
            },
        },
        action_items: vec![
            item(
                ActionPriority::High,
                "Update title with optimized version",
                "Expected 35% increase in search visibility",
            ),
            item(
                ActionPriority::High,
                "Replace all 13 tags with recommended tags",
                "Reach 50K+ more monthly searches",
            ),
            item(
                ActionPriority::High,
                "Implement new description format",
                "40% higher conversion rate based on competitor data",
            ),
            item(
                ActionPriority::Medium,
                "Increase price to recommended amount",
                "25% revenue increase per sale",
            ),
            item(
                ActionPriority::Medium,
                "Add \"Fast Shipping\" badge if not already active",
                "Reduces cart abandonment by 15%",
            ),
            item(
                ActionPriority::Low,
                "Consider adding product video",
                "Listings with videos get 2x more sales",
            ),
        ],
    }
}

/// Mocked competitor listings priced around the submitted price.
pub fn mock_competitors(price: f64) -> Vec<Competitor> {
    vec![
        competitor("Similar Premium Product | Fast Ship", price * 1.2, 450, 2),
        competitor("Handmade Quality Item | Gift Ready", price * 1.3, 320, 5),
        competitor("Top Rated Seller | Premium Gift", price * 1.15, 580, 1),
        competitor("Artisan Made | Custom Orders", price * 1.4, 210, 8),
        competitor("Best Seller | Fast Shipping", price * 1.25, 390, 3),
    ]
}

/// Placeholder quality score in the 70–90 band.
pub fn random_score() -> u8 {
    rand::rng().random_range(70..90)
}

fn tag(tag: &str, reasoning: &str) -> TagSuggestion {
    TagSuggestion {
        tag: tag.into(),
        reasoning: reasoning.into(),
    }
}

fn item(priority: ActionPriority, action: &str, impact: &str) -> ActionItem {
    ActionItem {
        priority,
        action: action.into(),
        impact: impact.into(),
    }
}

fn competitor(title: &str, price: f64, sales: u32, ranking: u32) -> Competitor {
    Competitor {
        title: title.into(),
        price: round_cents(price),
        sales,
        ranking,
    }
}
