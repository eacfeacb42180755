//! Keyword rules for complaint classification.
//!
//! Category detection walks an ordered list of keyword groups and stops at the
//! first group with a hit. Priority detection is independent of the category:
//! high-urgency words win over low-urgency words, Medium is the fallback.
//! All matching is case-insensitive substring search, so "streetlights" hits
//! both "street" and "light".

use crate::models::{Category, Priority};

/// One row of the category table.
struct KeywordGroup {
    category: Category,
    keywords: &'static [&'static str],
}

/// Evaluated top to bottom. Order matters: a text mentioning both a road and a
/// flood is an infrastructure complaint.
const CATEGORY_RULES: &[KeywordGroup] = &[
    KeywordGroup {
        category: Category::InfrastructureRoads,
        keywords: &["road", "pothole", "street", "traffic"],
    },
    KeywordGroup {
        category: Category::WaterSanitation,
        keywords: &["water", "sewage", "drain", "flood"],
    },
    KeywordGroup {
        category: Category::WasteManagement,
        keywords: &["garbage", "trash", "waste", "litter"],
    },
    KeywordGroup {
        category: Category::ElectricityLighting,
        keywords: &["power", "electricity", "light", "streetlight"],
    },
    KeywordGroup {
        category: Category::Environmental,
        keywords: &["noise", "pollution", "air quality"],
    },
    KeywordGroup {
        category: Category::ParksRecreation,
        keywords: &["park", "playground", "recreation"],
    },
    KeywordGroup {
        category: Category::PublicSafety,
        keywords: &["safety", "crime", "dangerous"],
    },
];

const HIGH_PRIORITY_KEYWORDS: &[&str] = &["urgent", "emergency", "dangerous", "immediate", "hazard"];

const LOW_PRIORITY_KEYWORDS: &[&str] = &["minor", "small", "suggestion"];

/// Outcome of the category table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryMatch {
    pub category: Category,
    /// The keyword that selected the category, `None` for the fallback.
    pub keyword: Option<&'static str>,
}

fn first_hit(text_lower: &str, keywords: &'static [&'static str]) -> Option<&'static str> {
    keywords.iter().copied().find(|keyword| text_lower.contains(keyword))
}

/// Matches `text` against the category table. First matching group wins.
pub fn detect_category(text: &str) -> CategoryMatch {
    let text_lower = text.to_lowercase();

    CATEGORY_RULES
        .iter()
        .find_map(|group| {
            first_hit(&text_lower, group.keywords).map(|keyword| CategoryMatch {
                category: group.category,
                keyword: Some(keyword),
            })
        })
        .unwrap_or(CategoryMatch {
            category: Category::GeneralInquiry,
            keyword: None,
        })
}

/// Assigns an urgency tier. High is checked before Low.
pub fn detect_priority(text: &str) -> Priority {
    let text_lower = text.to_lowercase();

    if first_hit(&text_lower, HIGH_PRIORITY_KEYWORDS).is_some() {
        Priority::High
    } else if first_hit(&text_lower, LOW_PRIORITY_KEYWORDS).is_some() {
        Priority::Low
    } else {
        Priority::Medium
    }
}
