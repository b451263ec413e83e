//! Picks the meal to highlight for a given instant.
//!
//! Menus are published in IST (UTC+05:30, no DST). Every comparison here is
//! done on IST wall-clock time derived from the absolute instant, so the
//! timezone of the host never leaks in.

use std::ops::Bound;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::{DayMenu, MealKey, WeekMenu};

pub const IST_OFFSET_MINUTES: i32 = 5 * 60 + 30;

pub const IST: FixedOffset = match FixedOffset::east_opt(IST_OFFSET_MINUTES * 60) {
    Some(v) => v,
    None => panic!("IST offset out of range"),
};

/// Calendar date and minute of day in IST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IstInstant {
    pub date: NaiveDate,
    /// in `0..1440`
    pub minutes: u16,
}

impl IstInstant {
    pub fn from_instant<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        let local = instant.with_timezone(&IST);
        Self {
            date: local.date_naive(),
            minutes: (local.hour() * 60 + local.minute()) as u16,
        }
    }

    pub fn now() -> Self {
        Self::from_instant(&Utc::now())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentMealPointer {
    #[serde(rename = "dateKey")]
    pub date: NaiveDate,
    #[serde(rename = "mealKey")]
    pub meal: MealKey,
    /// being served right now, otherwise the next one to open
    pub is_ongoing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightedMeal {
    #[serde(rename = "mealKey")]
    pub meal: MealKey,
    pub is_primary_upcoming: bool,
    pub is_live: bool,
}

/// first meal (in key order) whose `[start, end)` contains `minutes`
fn ongoing_meal(day: &DayMenu, minutes: u16) -> Option<MealKey> {
    day.meals()
        .find(|(_, meal)| meal.is_serving_at(minutes))
    .map(|(key, _)| key)
}

fn next_meal(day: &DayMenu, minutes: u16) -> Option<MealKey> {
    day.meals()
        .find(|(_, meal)| meal.starts_after(minutes))
    .map(|(key, _)| key)
}

/// The meal being served at `now`, or else the next one to open.
///
/// Looks at the rest of today first, then the following dates of the week,
/// and finally wraps around to the first meal of the week. Returns `None`
/// only if no date of the week has any meal.
pub fn find_current_or_upcoming_meal<Tz: TimeZone>(
    week: &WeekMenu, now: &DateTime<Tz>,
) -> Option<CurrentMealPointer> {
    let IstInstant { date: today, minutes } = IstInstant::from_instant(now);

    if let Some(day) = week.day(&today) {
        if let Some(meal) = ongoing_meal(day, minutes) {
            return Some(CurrentMealPointer { date: today, meal, is_ongoing: true });
        }
        if let Some(meal) = next_meal(day, minutes) {
            return Some(CurrentMealPointer { date: today, meal, is_ongoing: false });
        }
    }

    week.menu
        .range((Bound::Excluded(today), Bound::Unbounded))
        .chain(week.menu.iter())
        .find_map(|(date, day)| Some(CurrentMealPointer {
            date: *date,
            meal: day.first_meal()?,
            is_ongoing: false,
        }))
}

/// The meal to emphasize when `date` is shown.
///
/// On today's date this is the live meal, else the next one, else the last
/// meal of the day. Any other date gets its first meal.
pub fn pick_highlight_meal_for_day<Tz: TimeZone>(
    week: &WeekMenu, date: &NaiveDate, now: &DateTime<Tz>,
) -> Option<HighlightedMeal> {
    let day = week.day(date)?;
    let IstInstant { date: today, minutes } = IstInstant::from_instant(now);

    if *date != today {
        return Some(HighlightedMeal {
            meal: day.first_meal()?,
            is_primary_upcoming: false,
            is_live: false,
        });
    }

    if let Some(meal) = ongoing_meal(day, minutes) {
        Some(HighlightedMeal { meal, is_primary_upcoming: false, is_live: true })
    } else if let Some(meal) = next_meal(day, minutes) {
        Some(HighlightedMeal { meal, is_primary_upcoming: true, is_live: false })
    } else {
        Some(HighlightedMeal {
            meal: day.last_meal()?,
            is_primary_upcoming: false,
            is_live: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;
    use crate::{ClockTime, Meal, MenuItem};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, d).unwrap()
    }

    fn meal(start: (u16, u16), end: (u16, u16)) -> Meal {
        Meal {
            name: "Meal".into(),
            start_time: ClockTime::new(start.0, start.1).unwrap(),
            end_time: ClockTime::new(end.0, end.1).unwrap(),
            items: vec![MenuItem::Legacy("Rajma Chawal".into())],
            allergens: vec![],
        }
    }

    fn day(meals: Vec<(MealKey, Meal)>) -> DayMenu {
        DayMenu { day: "Someday".into(), meals: meals.into_iter().collect() }
    }

    fn week(days: Vec<(NaiveDate, DayMenu)>) -> WeekMenu {
        WeekMenu {
            food_court: "FC2".into(),
            week: "August 18 - August 24, 2025".into(),
            menu: days.into_iter().collect(),
        }
    }

    /// breakfast 08:00–10:00, lunch 12:00–14:30
    fn two_meal_day() -> DayMenu {
        day(vec![
            (MealKey::Breakfast, meal((8, 0), (10, 0))),
            (MealKey::Lunch, meal((12, 0), (14, 30))),
        ])
    }

    /// `h:m` IST on August `d`
    fn ist(d: u32, h: u32, m: u32) -> DateTime<FixedOffset> {
        IST.with_ymd_and_hms(2025, 8, d, h, m, 0)
        .unwrap()
    }

    #[test]
    fn ist_conversion_ignores_source_zone() {
        let utc = Utc.with_ymd_and_hms(2025, 8, 18, 7, 30, 0).unwrap();
        let new_york = utc.with_timezone(&FixedOffset::west_opt(4 * 3600).unwrap());
        let tokyo = utc.with_timezone(&FixedOffset::east_opt(9 * 3600).unwrap());

        assert_eq!(IST.local_minus_utc(), 19_800);

        let expected = IstInstant { date: date(18), minutes: 13 * 60 };
        assert_eq!(IstInstant::from_instant(&utc), expected);
        assert_eq!(IstInstant::from_instant(&new_york), expected);
        assert_eq!(IstInstant::from_instant(&tokyo), expected);
    }

    #[test]
    fn ist_conversion_rolls_date() {
        // 19:00 UTC is 00:30 the next day in IST
        let utc = Utc.with_ymd_and_hms(2025, 8, 18, 19, 0, 0).unwrap();
        assert_eq!(IstInstant::from_instant(&utc), IstInstant { date: date(19), minutes: 30 });
    }

    #[test]
    fn ongoing_meal_is_current() {
        let w = week(vec![(date(18), two_meal_day())]);
        let ptr = find_current_or_upcoming_meal(&w, &ist(18, 13, 0)).unwrap();
        assert_eq!(ptr, CurrentMealPointer { date: date(18), meal: MealKey::Lunch, is_ongoing: true });
    }

    #[test]
    fn between_meals_points_to_next() {
        let w = week(vec![(date(18), two_meal_day())]);
        let ptr = find_current_or_upcoming_meal(&w, &ist(18, 11, 0)).unwrap();
        assert_eq!(ptr, CurrentMealPointer { date: date(18), meal: MealKey::Lunch, is_ongoing: false });
    }

    #[test]
    fn end_time_is_exclusive() {
        let w = week(vec![(date(18), two_meal_day())]);
        let ptr = find_current_or_upcoming_meal(&w, &ist(18, 10, 0)).unwrap();
        assert_eq!(ptr.meal, MealKey::Lunch);
        assert!(!ptr.is_ongoing);

        let ptr = find_current_or_upcoming_meal(&w, &ist(18, 8, 0)).unwrap();
        assert_eq!(ptr.meal, MealKey::Breakfast);
        assert!(ptr.is_ongoing);
    }

    #[test]
    fn late_night_moves_to_next_date() {
        let w = week(vec![
            (date(18), two_meal_day()),
            (date(20), day(vec![(MealKey::Lunch, meal((12, 0), (14, 0))), (MealKey::Snacks, meal((17, 0), (18, 0)))])),
        ]);
        let ptr = find_current_or_upcoming_meal(&w, &ist(18, 23, 0)).unwrap();
        assert_eq!(ptr, CurrentMealPointer { date: date(20), meal: MealKey::Lunch, is_ongoing: false });
    }

    #[test]
    fn end_of_week_wraps_to_first_date() {
        let w = week(vec![
            (date(17), day(vec![(MealKey::Dinner, meal((19, 30), (21, 30)))])),
            (date(18), two_meal_day()),
        ]);
        let ptr = find_current_or_upcoming_meal(&w, &ist(18, 23, 0)).unwrap();
        assert_eq!(ptr, CurrentMealPointer { date: date(17), meal: MealKey::Dinner, is_ongoing: false });
    }

    #[test]
    fn before_the_week_points_to_its_first_meal() {
        let w = week(vec![(date(20), two_meal_day()), (date(21), two_meal_day())]);
        let ptr = find_current_or_upcoming_meal(&w, &ist(18, 9, 0)).unwrap();
        assert_eq!(ptr, CurrentMealPointer { date: date(20), meal: MealKey::Breakfast, is_ongoing: false });
    }

    #[test]
    fn days_without_meals_are_skipped() {
        let w = week(vec![
            (date(18), two_meal_day()),
            (date(19), day(vec![])),
            (date(20), day(vec![(MealKey::Dinner, meal((19, 30), (21, 30)))])),
        ]);
        let ptr = find_current_or_upcoming_meal(&w, &ist(18, 15, 0)).unwrap();
        assert_eq!(ptr.date, date(20));
        assert_eq!(ptr.meal, MealKey::Dinner);
    }

    #[test]
    fn overlapping_meals_prefer_key_order() {
        let w = week(vec![(date(18), day(vec![
            (MealKey::Lunch, meal((12, 0), (15, 0))),
            (MealKey::Snacks, meal((14, 0), (16, 0))),
        ]))]);
        let ptr = find_current_or_upcoming_meal(&w, &ist(18, 14, 30)).unwrap();
        assert_eq!(ptr.meal, MealKey::Lunch);
        assert!(ptr.is_ongoing);
    }

    #[test]
    fn any_meal_means_a_pointer() {
        let w = week(vec![(date(22), day(vec![(MealKey::Snacks, meal((17, 0), (18, 0)))]))]);
        for d in 15..=28 {
            for h in [0, 6, 12, 17, 23] {
                assert!(find_current_or_upcoming_meal(&w, &ist(d, h, 0)).is_some(), "{d} {h}");
            }
        }
    }

    #[test]
    fn empty_week_has_no_pointer() {
        assert_eq!(find_current_or_upcoming_meal(&week(vec![]), &ist(18, 12, 0)), None);
    }

    #[test]
    fn highlight_today() {
        let w = week(vec![(date(18), two_meal_day())]);

        let live = pick_highlight_meal_for_day(&w, &date(18), &ist(18, 9, 0)).unwrap();
        assert_eq!(live, HighlightedMeal { meal: MealKey::Breakfast, is_primary_upcoming: false, is_live: true });

        let next = pick_highlight_meal_for_day(&w, &date(18), &ist(18, 11, 0)).unwrap();
        assert_eq!(next, HighlightedMeal { meal: MealKey::Lunch, is_primary_upcoming: true, is_live: false });

        let done = pick_highlight_meal_for_day(&w, &date(18), &ist(18, 22, 0)).unwrap();
        assert_eq!(done, HighlightedMeal { meal: MealKey::Lunch, is_primary_upcoming: false, is_live: false });
    }

    #[test]
    fn highlight_other_days_uses_first_meal() {
        let w = week(vec![
            (date(18), two_meal_day()),
            (date(19), day(vec![(MealKey::Snacks, meal((17, 0), (18, 0))), (MealKey::Dinner, meal((19, 0), (21, 0)))])),
        ]);

        let future = pick_highlight_meal_for_day(&w, &date(19), &ist(18, 17, 30)).unwrap();
        assert_eq!(future, HighlightedMeal { meal: MealKey::Snacks, is_primary_upcoming: false, is_live: false });

        let past = pick_highlight_meal_for_day(&w, &date(18), &ist(19, 9, 0)).unwrap();
        assert_eq!(past.meal, MealKey::Breakfast);
        assert!(!past.is_live);
    }

    #[test]
    fn highlight_missing_or_empty_day() {
        let w = week(vec![(date(18), day(vec![]))]);
        assert_eq!(pick_highlight_meal_for_day(&w, &date(18), &ist(18, 12, 0)), None);
        assert_eq!(pick_highlight_meal_for_day(&w, &date(19), &ist(18, 12, 0)), None);
    }

    #[test]
    fn pointer_serializes_with_keys() {
        let ptr = CurrentMealPointer { date: date(18), meal: MealKey::Lunch, is_ongoing: true };
        let json = serde_json::to_value(ptr).unwrap();
        assert_eq!(json, serde_json::json!({
            "dateKey": "2025-08-18", "mealKey": "lunch", "isOngoing": true,
        }));
    }
}
