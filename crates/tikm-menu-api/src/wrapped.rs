//! Year-in-review ("Wrapped") slides over precomputed statistics.

use serde::{Deserialize, Serialize};

use crate::MealKey;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DishVariation {
    pub name: String,
    pub count: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DishCategory {
    pub name: String,
    pub keywords: Vec<String>,
    pub emoji: String,
    pub variations: Vec<DishVariation>,
    pub total_count: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MealStats {
    pub breakfast: u32,
    pub lunch: u32,
    pub snacks: u32,
    pub dinner: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayPattern {
    pub day_name: String,
    pub signature: Vec<String>,
    pub frequency: std::collections::BTreeMap<String, u32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FunFactKind {
    Longest,
    Shortest,
    Weird,
    Repeated,
    Creative,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FunFact {
    #[serde(rename = "type")]
    pub kind: FunFactKind,
    pub title: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DishCategories {
    pub paneer: DishCategory,
    pub chicken: DishCategory,
    pub fish: DishCategory,
    pub dal: DishCategory,
    pub rice: DishCategory,
    pub bread: DishCategory,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// The statistics file produced offline for one year.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WrappedStats {
    pub total_weeks: u32,
    pub total_days: u32,
    pub total_meals: u32,
    pub meal_counts: MealStats,
    #[serde(default)]
    pub all_items: Vec<String>,
    pub categories: DishCategories,
    pub top_breakfast_items: Vec<DishVariation>,
    pub top_dinner_items: Vec<DishVariation>,
    #[serde(default)]
    pub top_overall_items: Vec<DishVariation>,
    pub day_patterns: Vec<DayPattern>,
    #[serde(default)]
    pub fun_facts: Vec<FunFact>,
    pub most_repeated: DishVariation,
    #[serde(default)]
    pub sweet_treats: Vec<DishVariation>,
    #[serde(default)]
    pub snack_highlights: Vec<DishVariation>,
    pub date_range: DateRange,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Slide {
    Intro { date_range: DateRange },
    TotalMeals { total_meals: u32, total_days: u32, meal_counts: MealStats },
    StapleAlert { most_repeated: DishVariation },
    Category { category: DishCategory, tagline: &'static str, sub_tagline: &'static str },
    TopItems { title: &'static str, emoji: &'static str, meal: MealKey, items: Vec<DishVariation> },
    SpecialMentions { title: &'static str, emoji: &'static str, tagline: &'static str, items: Vec<DishVariation> },
    DayPatterns { patterns: Vec<DayPattern> },
    Summary,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct WrappedDeck {
    pub slides: Vec<Slide>,
}

impl WrappedDeck {
    /// Ten fixed slides, plus sweets and snacks when there is anything to show.
    pub fn from_stats(stats: &WrappedStats) -> Self {
        let c = &stats.categories;
        let mut slides = vec![
            Slide::Intro { date_range: stats.date_range.clone() },
            Slide::TotalMeals {
                total_meals: stats.total_meals,
                total_days: stats.total_days,
                meal_counts: stats.meal_counts.clone(),
            },
            Slide::StapleAlert { most_repeated: stats.most_repeated.clone() },
            Slide::Category {
                category: c.paneer.clone(),
                tagline: "Paneer was served",
                sub_tagline: "The cottage cheese conspiracy continues...",
            },
            Slide::Category {
                category: c.chicken.clone(),
                tagline: "Chicken was served",
                sub_tagline: "From Butter to Tandoori, we've seen it all",
            },
            Slide::Category {
                category: c.dal.clone(),
                tagline: "Dal & Lentils appeared",
                sub_tagline: "Protein packed, name creative",
            },
            Slide::TopItems {
                title: "Breakfast Champions",
                emoji: "🌅",
                meal: MealKey::Breakfast,
                items: stats.top_breakfast_items.clone(),
            },
            Slide::TopItems {
                title: "Dinner Favorites",
                emoji: "🌙",
                meal: MealKey::Dinner,
                items: stats.top_dinner_items.clone(),
            },
        ];

        if !stats.sweet_treats.is_empty() {
            slides.push(Slide::SpecialMentions {
                title: "Sweet Endings",
                emoji: "🍮",
                tagline: "The desserts that made it to the menu",
                items: stats.sweet_treats.clone(),
            });
        }
        if !stats.snack_highlights.is_empty() {
            slides.push(Slide::SpecialMentions {
                title: "Snack Attack",
                emoji: "🍟",
                tagline: "The best bites between meals",
                items: stats.snack_highlights.clone(),
            });
        }

        slides.push(Slide::DayPatterns { patterns: stats.day_patterns.clone() });
        slides.push(Slide::Summary);

        Self { slides }
    }

    pub fn len(&self) -> usize { self.slides.len() }

    pub fn is_empty(&self) -> bool { self.slides.is_empty() }
}
