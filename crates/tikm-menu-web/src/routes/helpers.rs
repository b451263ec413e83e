use std::{future::Future, path::Path, pin::Pin};

use chrono::{Days, NaiveDate, Weekday};
use mongodb::options::ClientOptions;
use tikm_menu_api::wrapped::{WrappedDeck, WrappedStats};
use tokio_cron_scheduler::{JobScheduler, JobSchedulerError};

use crate::config::DbConfig;

pub trait Pinable: Sized {
    fn pin(self) -> Pin<Box<Self>> { Box::pin(self) }
}

impl<F: Future> Pinable for F {}

pub async fn register_jobs<'a, F>(
    reg: impl FnOnce(JobScheduler) -> F + 'a,
) where F: Future<Output = Result<JobScheduler, JobSchedulerError>>
{
    if let Err(err) = async {
        tracing::info!("starting refresh scheduler");
        let shed = JobScheduler::new().await?;
        let shed = reg(shed).await?;
        shed.start().await?;

        tracing::info!("started refresh scheduler");
        Ok::<_, JobSchedulerError>(())
    }.await {
        tracing::error!("could not start refresh scheduler: {err}");
    }
}

pub async fn connect_db(cfg: &DbConfig) -> Option<mongodb::Database> {
    match async {
        mongodb::Client::with_options(
            ClientOptions::parse(&cfg.url).await?,
        )
    }.await {
        Ok(v) => Some(v.database(&cfg.database)),
        Err(err) => {
            tracing::error!("could not connect to db at {}: {err}", cfg.url);
            None
        },
    }
}

/// Reads the year's statistics file and lays out its slides.
pub async fn load_wrapped(path: &Path) -> Option<WrappedDeck> {
    let stats = match tokio::fs::read_to_string(path).await {
        Ok(v) => v,
        Err(err) => {
            tracing::error!("could not read wrapped stats {path:?}: {err}");
            return None;
        },
    };

    match serde_json::from_str::<WrappedStats>(&stats) {
        Ok(stats) => {
            let deck = WrappedDeck::from_stats(&stats);
            tracing::info!("loaded wrapped stats ({} slides)", deck.len());
            Some(deck)
        },
        Err(err) => {
            tracing::error!("invalid wrapped stats {path:?}: {err}");
            None
        },
    }
}

#[derive(Default, Debug, Clone, Copy, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativeDate {
    #[default] Today, Yesterday, Tomorrow,
}

/// A day as given in a query string: relative, a weekday of the current
/// week or a plain date.
#[derive(Debug, Clone, Copy, serde::Deserialize)]
#[serde(untagged)]
pub enum MenuDate {
    Relative(RelativeDate),
    Weekday(Weekday),
    Date(NaiveDate),
}

impl Default for MenuDate {
    fn default() -> Self { MenuDate::Relative(RelativeDate::Today) }
}

impl MenuDate {
    pub fn resolve(self, today: NaiveDate) -> Option<NaiveDate> {
        Some(match self {
            MenuDate::Relative(RelativeDate::Today) => today,
            MenuDate::Relative(RelativeDate::Yesterday) => today.pred_opt()?,
            MenuDate::Relative(RelativeDate::Tomorrow) => today.succ_opt()?,
            MenuDate::Date(d) => d,
            MenuDate::Weekday(w) => today.week(Weekday::Mon)
                .first_day()
            .checked_add_days(Days::new(w.num_days_from_monday() as _))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> MenuDate {
        serde_json::from_value(serde_json::Value::String(s.into())).unwrap()
    }

    #[test]
    fn resolves_query_dates() {
        // a Wednesday
        let today = NaiveDate::from_ymd_opt(2025, 8, 20).unwrap();
        let day = |d| NaiveDate::from_ymd_opt(2025, 8, d);

        assert_eq!(parse("today").resolve(today), day(20));
        assert_eq!(parse("tomorrow").resolve(today), day(21));
        assert_eq!(parse("yesterday").resolve(today), day(19));
        assert_eq!(parse("Mon").resolve(today), day(18));
        assert_eq!(parse("sunday").resolve(today), day(24));
        assert_eq!(parse("2025-09-01").resolve(today), NaiveDate::from_ymd_opt(2025, 9, 1));
        assert_eq!(MenuDate::default().resolve(today), day(20));
    }
}
