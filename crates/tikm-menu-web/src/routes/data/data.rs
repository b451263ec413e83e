
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use tikm_menu_api::{WeekMenu, WeekMenuParseError};

#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    ParseWeek(#[from] WeekMenuParseError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredWeek {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    /// YYYY-MM-DD
    pub week_start: String,
    /// `normal` or `jain`
    pub menu_type: String,
    pub fetched_at: String,
    pub menu: WeekMenu,
}
