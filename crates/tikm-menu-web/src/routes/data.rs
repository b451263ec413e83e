use std::sync::Arc;

use chrono::NaiveDate;
use mongodb::{bson::doc, options::ReplaceOptions, Collection};
use tokio::sync::RwLock;
use tikm_menu_api::{raw, week_start_for, MenuType, WeekMenu, WeekMenus};

mod data;
pub use data::*;

#[derive(Clone)]
pub struct MenuManager {
    client: reqwest::Client,
    base_url: Arc<str>,
    collections: Option<MenuCollections>,
    data: Arc<RwLock<WeekMenus>>,
    history: Arc<RwLock<Option<raw::ApiHistory>>>,
}

impl MenuManager {
    pub fn new(base_url: &str, collections: Option<MenuCollections>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').into(),
            data: Arc::new(RwLock::new(WeekMenus::default())),
            history: Arc::new(RwLock::new(None)),
            collections,
        }
    }

    /// cached week, else the stored copy, else a fresh fetch
    pub async fn get_week(
        &self, week_start: &NaiveDate, menu_type: MenuType,
    ) -> Result<WeekMenu, MenuError> {
        if let Some(week) = self.data.read().await.get(week_start, menu_type) {
            return Ok(week.clone());
        }

        if let Some(collections) = &self.collections {
            match collections.get_week(week_start, menu_type).await {
                Ok(Some(week)) => {
                    tracing::info!("loaded {menu_type} week {week_start} from db");
                    self.data.write().await.insert(week_start, menu_type, week.clone());
                    return Ok(week);
                },
                Ok(None) => {},
                Err(err) => tracing::error!("could not read week from db: {err}"),
            }
        }

        self.fetch_week(week_start, menu_type).await
    }

    pub async fn fetch_week(
        &self, week_start: &NaiveDate, menu_type: MenuType,
    ) -> Result<WeekMenu, MenuError> {
        let data: raw::ApiWeekMenu = self.client.get(format!("{}/api/menu", self.base_url))
            .query(&raw::ApiMenuQuery::new(week_start.to_string(), menu_type.query_value()))
            .send().await?
            .error_for_status()?
        .json().await?;

        let week = WeekMenu::try_from(data)?;
        self.store_week(*week_start, menu_type, week.clone()).await;

        Ok(week)
    }

    async fn store_week(
        &self, week_start: NaiveDate, menu_type: MenuType,
        week: WeekMenu,
    ) {
        self.data.write().await
            .insert(&week_start, menu_type, week.clone());

        if let Some(collections) = self.collections.clone() {
            tokio::spawn(async move {
                if let Err(err) = collections.store_week(week_start, menu_type, &week).await {
                    tracing::error!("could not store week {week_start}: {err}");
                }
            });
        }
    }

    pub async fn get_history(&self) -> Result<raw::ApiHistory, MenuError> {
        if let Some(history) = self.history.read().await.as_ref() {
            return Ok(history.clone());
        }
        self.fetch_history().await
    }

    pub async fn fetch_history(&self) -> Result<raw::ApiHistory, MenuError> {
        let history: raw::ApiHistory = self.client.get(format!("{}/api/history", self.base_url))
            .send().await?
            .error_for_status()?
        .json().await?;

        *self.history.write().await = Some(history.clone());
        Ok(history)
    }

    /// Start date of the published week covering `date`, see
    /// [`week_start_for`].
    pub async fn week_containing(&self, date: NaiveDate) -> NaiveDate {
        let weeks = match self.get_history().await {
            Ok(history) => history.weeks,
            Err(err) => {
                tracing::warn!("could not fetch week listing: {err}");
                Vec::new()
            },
        };

        week_start_for(&weeks, date)
    }

    pub async fn fetch_all(&self) {
        if let Err(err) = self.fetch_history().await {
            tracing::error!("could not fetch week listing: {err}");
        }

        let weeks: Vec<_> = self.data.read().await.weeks().collect();

        for (week_start, menu_type) in weeks {
            if let Err(err) = self.fetch_week(&week_start, menu_type).await {
                tracing::error!("could not fetch {menu_type} week {week_start}: {err}");
            } else {
                tracing::info!("updated {menu_type} week {week_start}");
            }
        }
    }
}

#[derive(Clone)]
pub struct MenuCollections {
    weeks: Collection<StoredWeek>,
}

impl MenuCollections {
    pub fn new(db: &mongodb::Database) -> Self {
        Self { weeks: db.collection("weeks") }
    }

    async fn get_week(
        &self, week_start: &NaiveDate, menu_type: MenuType,
    ) -> mongodb::error::Result<Option<WeekMenu>> {
        Ok(self.weeks.find_one(doc! {
            "week_start": week_start.to_string(),
            "menu_type": menu_type.to_string(),
        }, None).await?.map(|v| v.menu))
    }

    async fn store_week(
        &self, week_start: NaiveDate, menu_type: MenuType,
        week: &WeekMenu,
    ) -> mongodb::error::Result<()> {
        let week_start = week_start.to_string();
        let menu_type = menu_type.to_string();

        self.weeks.replace_one(doc! {
            "week_start": &week_start,
            "menu_type": &menu_type,
        }, StoredWeek {
            _id: None,
            week_start, menu_type,
            fetched_at: chrono::Utc::now().to_rfc3339(),
            menu: week.clone(),
        }, ReplaceOptions::builder()
            .upsert(true)
        .build()).await?;

        Ok(())
    }
}
