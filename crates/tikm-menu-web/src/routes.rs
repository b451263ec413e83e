use std::sync::Arc;

use axum::{
    extract::{FromRef, Query, State},
    http::StatusCode,
    routing::get,
    Json,
    Router,
};

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tikm_menu_api::{
    filter_week_menu, find_current_or_upcoming_meal, pick_highlight_meal_for_day,
    raw, wrapped::WrappedDeck, CurrentMealPointer, DayMenu, DietaryFilter,
    HighlightedMeal, IstInstant, WeekMenu, years_of,
};
use tokio_cron_scheduler::Job;

use crate::config::Config;

use self::data::{MenuCollections, MenuManager};
use std::time::Instant;

mod data;
mod helpers;
use helpers::*;

type ApiError = (StatusCode, Json<String>);

#[derive(Clone, FromRef)]
struct AppState {
    menus: MenuManager,
    wrapped: Option<Arc<WrappedDeck>>,
}

impl AppState {
    async fn new(config: &Config) -> Self {
        let db = if let Some(db) = &config.db {
            tracing::info!("connecting to db");
            let v = connect_db(db).await;
            tracing::info!("connected to db");
            v
        } else {
            tracing::info!("no db specified");
            None
        };

        let menus = MenuManager::new(
            &config.upstream.url,
            db.as_ref().map(MenuCollections::new),
        );

        let wrapped = match &config.wrapped_stats {
            Some(path) => load_wrapped(path).await.map(Arc::new),
            None => None,
        };

        let m = menus.clone();
        register_jobs(|shed| async move {
            // 00:01 IST
            shed.add(Job::new_async("0 31 18 * * *", move |uuid, _| {
                let m = m.clone();
                async move {
                    tracing::info!("refreshing menus (job: {uuid:?})");
                    let start = Instant::now();
                    m.fetch_all().await;
                    let took = start.elapsed();
                    tracing::info!("refreshed menus (took {took:?})");
                }.pin()
            })?).await?;

            Ok(shed)
        }).await;

        Self { menus, wrapped }
    }
}

pub async fn make_router(config: &Config) -> Router {
    Router::new()
        .route("/api/weeks", get(weeks))
        .route("/api/week", get(week))
        .route("/api/now", get(now))
        .route("/api/day", get(day))
        .route("/api/wrapped", get(wrapped))
        .with_state(AppState::new(config).await)
    .fallback_service(fallback_service())
}

#[derive(Debug, serde::Deserialize)]
struct MenuQuery {
    week_start: Option<NaiveDate>,
    #[serde(default)]
    filter: DietaryFilter,
    day: Option<MenuDate>,
    /// skip the cache and ask the upstream again
    #[serde(default)]
    fresh: bool,
}

impl MenuQuery {
    /// the requested week, fetched from the dataset the filter asks for
    async fn load_week(
        &self, menus: &MenuManager, date: NaiveDate,
    ) -> Result<(NaiveDate, WeekMenu), ApiError> {
        let week_start = match self.week_start {
            Some(v) => v,
            None => menus.week_containing(date).await,
        };

        let menu_type = self.filter.menu_type();
        let week = if self.fresh {
            menus.fetch_week(&week_start, menu_type).await
        } else {
            menus.get_week(&week_start, menu_type).await
        }.map_err(|err| {
            tracing::warn!("could not load week {week_start}: {err}");
            (StatusCode::NOT_FOUND, Json(format!("week_not_found")))
        })?;

        Ok((week_start, filter_week_menu(&week, self.filter)))
    }
}

#[derive(Debug, Serialize)]
struct WeeksResponse {
    /// newest first
    years: Vec<String>,
    weeks: Vec<raw::ApiWeekSummary>,
}

#[derive(Debug, serde::Deserialize)]
struct WeeksQuery {
    #[serde(default)]
    fresh: bool,
}

async fn weeks(
    Query(q): Query<WeeksQuery>,
    State(menus): State<MenuManager>,
) -> Result<Json<WeeksResponse>, ApiError> {
    let history = if q.fresh {
        menus.fetch_history().await
    } else {
        menus.get_history().await
    };

    let history = history.map_err(|err| {
        tracing::warn!("could not load week listing: {err}");
        (StatusCode::BAD_GATEWAY, Json(format!("weeks_unavailable")))
    })?;

    let years = years_of(history.weeks.iter().map(|w| w.start_date.as_str()));
    Ok(Json(WeeksResponse { years, weeks: history.weeks }))
}

async fn week(
    Query(q): Query<MenuQuery>,
    State(menus): State<MenuManager>,
) -> Result<Json<WeekMenu>, ApiError> {
    let today = IstInstant::now().date;
    let (_, week) = q.load_week(&menus, today).await?;
    Ok(Json(week))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NowResponse {
    week_start: NaiveDate,
    pointer: Option<CurrentMealPointer>,
    highlight: Option<HighlightedMeal>,
}

async fn now(
    Query(q): Query<MenuQuery>,
    State(menus): State<MenuManager>,
) -> Result<Json<NowResponse>, ApiError> {
    let now = Utc::now();
    let today = IstInstant::from_instant(&now).date;
    let (week_start, week) = q.load_week(&menus, today).await?;

    let pointer = find_current_or_upcoming_meal(&week, &now);
    let highlight = pointer.and_then(|p| pick_highlight_meal_for_day(&week, &p.date, &now));

    Ok(Json(NowResponse { week_start, pointer, highlight }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DayResponse {
    date: NaiveDate,
    day: DayMenu,
    highlight: Option<HighlightedMeal>,
}

async fn day(
    Query(q): Query<MenuQuery>,
    State(menus): State<MenuManager>,
) -> Result<Json<DayResponse>, ApiError> {
    let now = Utc::now();
    let today = IstInstant::from_instant(&now).date;
    let date = q.day.unwrap_or_default().resolve(today).ok_or_else(|| {
        (StatusCode::BAD_REQUEST, Json(format!("invalid_date")))
    })?;

    let (_, week) = q.load_week(&menus, date).await?;
    let day = week.day(&date).cloned().ok_or_else(||
        (StatusCode::NOT_FOUND, Json(format!("day_not_found")))
    )?;
    let highlight = pick_highlight_meal_for_day(&week, &date, &now);

    Ok(Json(DayResponse { date, day, highlight }))
}

async fn wrapped(
    State(wrapped): State<Option<Arc<WrappedDeck>>>,
) -> Result<Json<WrappedDeck>, ApiError> {
    wrapped.map(|v| Json(WrappedDeck::clone(&v))).ok_or_else(||
        (StatusCode::NOT_FOUND, Json(format!("wrapped_not_found")))
    )
}

fn fallback_service() -> Router {
    Router::new()
}

#[cfg(test)]
mod tests {
    use axum::http::Uri;

    use super::*;

    fn query<T: serde::de::DeserializeOwned>(uri: &str) -> T {
        let uri: Uri = uri.parse().unwrap();
        Query::<T>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn menu_query_defaults() {
        let q: MenuQuery = query("/api/week");
        assert!(q.week_start.is_none());
        assert_eq!(q.filter, DietaryFilter::All);
        assert!(q.day.is_none());
        assert!(!q.fresh);
    }

    #[test]
    fn menu_query_reads_every_field() {
        let q: MenuQuery = query("/api/day?week_start=2025-08-18&filter=non-veg-only&day=2025-08-20&fresh=true");
        assert_eq!(q.week_start, NaiveDate::from_ymd_opt(2025, 8, 18));
        assert_eq!(q.filter, DietaryFilter::NonVegOnly);
        assert!(matches!(q.day, Some(MenuDate::Date(_))));
        assert!(q.fresh);
    }

    #[test]
    fn weeks_query_fresh_flag() {
        assert!(query::<WeeksQuery>("/api/weeks?fresh=true").fresh);
        assert!(!query::<WeeksQuery>("/api/weeks").fresh);
    }
}
