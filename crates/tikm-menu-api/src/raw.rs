
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Clone)]
pub struct ApiMenuQuery {
    #[serde(rename = "weekStart")]
    week_start: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    menu_type: Option<String>,
}

impl ApiMenuQuery {
    pub fn new(
        week_start: impl Into<String>,
        menu_type: Option<impl Into<String>>,
    ) -> Self {
        Self {
            week_start: week_start.into(),
            menu_type: menu_type.map(Into::into),
        }
    }
}


#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ApiWeekMenu {
    pub food_court: String,
    /// human label, e.g. "August 18 - August 24, 2024"
    pub week: String,
    /// keyed by YYYY-MM-DD
    pub menu: BTreeMap<String, ApiDayMenu>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiDayMenu {
    pub day: String,
    /// breakfast, lunch, snacks, dinner; any may be missing
    #[serde(default)]
    pub meals: HashMap<String, ApiMeal>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ApiMeal {
    pub name: String,
    /// HH:MM in IST
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub items: Vec<ApiMenuItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergens: Option<Vec<String>>,
}

/// older weeks ship bare strings, newer ones carry tags
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(untagged)]
pub enum ApiMenuItem {
    Plain(String),
    Tagged {
        name: String,
        #[serde(default)]
        tags: Option<Vec<String>>,
    },
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiHistory {
    pub weeks: Vec<ApiWeekSummary>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ApiWeekSummary {
    pub week: String,
    pub food_court: String,
    pub start_date: String,
    pub end_date: String,
    pub num_days: u32,
    pub week_monday: String,
    pub last_modified: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MenuType;

    #[test]
    fn jain_query_asks_for_jain_dataset() {
        let query = ApiMenuQuery::new("2025-08-18", MenuType::Jain.query_value());
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            serde_json::json!({ "weekStart": "2025-08-18", "type": "jain" }),
        );
    }

    #[test]
    fn normal_query_omits_type() {
        let query = ApiMenuQuery::new("2025-08-18", MenuType::Normal.query_value());
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            serde_json::json!({ "weekStart": "2025-08-18" }),
        );
    }
}
