use std::{collections::{BTreeMap, BTreeSet, HashMap}, fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{filter::MenuType, raw};

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct WeekMenus {
    weeks: HashMap<String, WeekMenu>,
}

impl WeekMenus {
    pub fn get(&self, week_start: &NaiveDate, menu_type: MenuType) -> Option<&WeekMenu> {
        self.weeks.get(&Self::key(week_start, menu_type))
    }

    pub fn insert(
        &mut self, week_start: &NaiveDate,
        menu_type: MenuType, menu: WeekMenu,
    ) -> Option<WeekMenu> {
        self.weeks.insert(Self::key(week_start, menu_type), menu)
    }

    pub fn key(week_start: &NaiveDate, menu_type: MenuType) -> String {
        format!("{menu_type};{week_start}")
    }

    /// every cached (week start, menu type) pair
    pub fn weeks(&self) -> impl Iterator<Item = (NaiveDate, MenuType)> + '_ {
        self.weeks.keys()
            .flat_map(|v| v.split_once(";"))
            .flat_map(|(ty, start)| Some((
                NaiveDate::parse_from_str(start, "%Y-%m-%d").ok()?,
                ty.parse().ok()?,
            )))
    }
}

/// Week ids look like `2025-08-18_<food court>`, the part before the
/// first underscore is the week's start date.
pub fn week_start_of_id(id: &str) -> &str {
    id.split('_').next().unwrap_or(id)
}

/// distinct years mentioned by a list of week ids, newest first
pub fn years_of<'a>(ids: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let years: BTreeSet<&str> = ids.into_iter()
        .flat_map(|id| week_start_of_id(id).get(..4))
        .filter(|y| y.chars().all(|c| c.is_ascii_digit()))
        .collect();

    years.into_iter().rev().map(ToOwned::to_owned).collect()
}

/// Start date of the listed week covering `date` (both ends inclusive),
/// else the newest listed week, else the Monday of `date`.
pub fn week_start_for(weeks: &[raw::ApiWeekSummary], date: NaiveDate) -> NaiveDate {
    let parse = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
    let ranges: Vec<(NaiveDate, NaiveDate)> = weeks.iter()
        .flat_map(|w| Some((parse(&w.start_date)?, parse(&w.end_date)?)))
    .collect();

    ranges.iter()
        .find(|(start, end)| (*start..=*end).contains(&date))
        .or_else(|| ranges.iter().max_by_key(|(start, _)| *start))
        .map(|(start, _)| *start)
    .unwrap_or_else(|| date.week(chrono::Weekday::Mon).first_day())
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeekMenu {
    pub food_court: String,
    pub week: String,
    /// ordered by date, which is also the order of the upstream keys
    pub menu: BTreeMap<NaiveDate, DayMenu>,
}

impl WeekMenu {
    pub fn day(&self, date: &NaiveDate) -> Option<&DayMenu> {
        self.menu.get(date)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DayMenu {
    /// weekday name as sent by the upstream, e.g. "Monday"
    pub day: String,
    pub meals: BTreeMap<MealKey, Meal>,
}

impl DayMenu {
    pub fn meal(&self, key: MealKey) -> Option<&Meal> {
        self.meals.get(&key)
    }

    /// meals in serving order
    pub fn meals(&self) -> impl DoubleEndedIterator<Item = (MealKey, &Meal)> {
        self.meals.iter().map(|(k, v)| (*k, v))
    }

    pub fn first_meal(&self) -> Option<MealKey> {
        self.meals.keys().next().copied()
    }

    pub fn last_meal(&self) -> Option<MealKey> {
        self.meals.keys().next_back().copied()
    }

    pub fn is_empty(&self) -> bool { self.meals.is_empty() }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealKey {
    Breakfast,
    Lunch,
    Snacks,
    Dinner,
}

impl MealKey {
    pub const ALL: [MealKey; 4] = [
        MealKey::Breakfast, MealKey::Lunch,
        MealKey::Snacks, MealKey::Dinner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealKey::Breakfast => "breakfast",
            MealKey::Lunch => "lunch",
            MealKey::Snacks => "snacks",
            MealKey::Dinner => "dinner",
        }
    }
}

impl fmt::Display for MealKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown meal: '{0}'")]
pub struct UnknownMealKey(String);

impl FromStr for MealKey {
    type Err = UnknownMealKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MealKey::ALL.into_iter()
            .find(|k| k.as_str() == s)
        .ok_or_else(|| UnknownMealKey(s.to_owned()))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub name: String,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub items: Vec<MenuItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allergens: Vec<String>,
}

impl Meal {
    /// whether `minutes` (since midnight) falls in `[start, end)`
    pub fn is_serving_at(&self, minutes: u16) -> bool {
        self.start_time.minutes() <= minutes && minutes < self.end_time.minutes()
    }

    pub fn starts_after(&self, minutes: u16) -> bool {
        self.start_time.minutes() > minutes
    }

    pub fn time_range(&self) -> String {
        format!("{} – {} IST", self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MenuItem {
    /// name only, from weeks published before items were tagged
    Legacy(String),
    Tagged {
        name: String,
        #[serde(default)]
        tags: BTreeSet<ItemTag>,
    },
}

impl MenuItem {
    pub fn tagged(name: impl Into<String>, tags: impl IntoIterator<Item = ItemTag>) -> Self {
        MenuItem::Tagged { name: name.into(), tags: tags.into_iter().collect() }
    }

    pub fn name(&self) -> &str {
        match self {
            MenuItem::Legacy(name) | MenuItem::Tagged { name, .. } => name,
        }
    }

    pub fn has_tag(&self, tag: ItemTag) -> bool {
        match self {
            MenuItem::Legacy(_) => false,
            MenuItem::Tagged { tags, .. } => tags.contains(&tag),
        }
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemTag {
    VegSpecial,
    NonVegSpecial,
    OtherSpecial,
    NonVeg,
    Jain,
}

impl ItemTag {
    fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "veg-special" => ItemTag::VegSpecial,
            "non-veg-special" => ItemTag::NonVegSpecial,
            "other-special" => ItemTag::OtherSpecial,
            "non-veg" => ItemTag::NonVeg,
            "jain" => ItemTag::Jain,
            _ => None?,
        })
    }
}

/// Notes the upstream publishes in between the dishes.
pub const MENU_ITEM_EXCEPTIONS: &[&str] = &[
    "If you are allergic to any ingredients.",
    "Note: Items in the menu may change due to non-availabilty of fresh produce.",
    "Double filtered water is used for beverages",
    "Please Inform Our Manager",
];

/// case-insensitive exact match against [`MENU_ITEM_EXCEPTIONS`]
pub fn is_menu_exception(name: &str) -> bool {
    let name = name.trim().to_lowercase();
    MENU_ITEM_EXCEPTIONS.iter().any(|e| e.to_lowercase() == name)
}

#[derive(Debug, thiserror::Error)]
pub enum WeekMenuParseError {
    #[error("InvalidDate: {0}")]
    InvalidDate(#[from] chrono::ParseError),
    #[error("InvalidTime: {0}")]
    InvalidTime(#[from] ClockTimeParseError),
}

impl TryFrom<raw::ApiWeekMenu> for WeekMenu {
    type Error = WeekMenuParseError;

    fn try_from(value: raw::ApiWeekMenu) -> Result<Self, Self::Error> {
        let menu = value.menu.into_iter().map(|(date, day)| {
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")?;

            let mut meals = BTreeMap::new();
            for (key, meal) in day.meals {
                let key = match key.parse::<MealKey>() {
                    Ok(v) => v,
                    Err(err) => {
                        tracing::warn!("skipping {err} on {date}");
                        continue;
                    },
                };

                meals.insert(key, Meal {
                    name: meal.name,
                    start_time: meal.start_time.parse::<ClockTime>()?,
                    end_time: meal.end_time.parse::<ClockTime>()?,
                    items: meal.items.into_iter()
                        .map(MenuItem::from)
                        .filter(|v| !is_menu_exception(v.name()))
                    .collect(),
                    allergens: meal.allergens.unwrap_or_default(),
                });
            }

            Ok((date, DayMenu { day: day.day, meals }))
        }).collect::<Result<BTreeMap<_, _>, WeekMenuParseError>>()?;

        Ok(Self {
            food_court: value.food_court,
            week: value.week,
            menu,
        })
    }
}

impl From<raw::ApiMenuItem> for MenuItem {
    fn from(value: raw::ApiMenuItem) -> Self {
        match value {
            raw::ApiMenuItem::Plain(name) => MenuItem::Legacy(name),
            raw::ApiMenuItem::Tagged { name, tags } => {
                let tags = tags.unwrap_or_default().into_iter().filter_map(|tag| {
                    let parsed = ItemTag::from_tag(&tag);
                    if parsed.is_none() {
                        tracing::warn!("dropping unknown tag '{tag}' on '{name}'");
                    }
                    parsed
                }).collect();

                MenuItem::Tagged { name, tags }
            },
        }
    }
}

/// Wall-clock time of day in IST, minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    minutes: u16,
}

#[derive(Debug, thiserror::Error)]
#[error("could not parse clock time: '{0}'")]
pub struct ClockTimeParseError(String);

impl ClockTime {
    pub fn new(hour: u16, minute: u16) -> Option<Self> {
        (hour < 24 && minute < 60).then(|| Self { minutes: hour * 60 + minute })
    }

    pub fn minutes(&self) -> u16 { self.minutes }

    fn parse(s: &str) -> Option<Self> {
        let (hour, minute) = s.trim().split_once(":")?;
        Self::new(hour.parse().ok()?, minute.parse().ok()?)
    }
}

impl FromStr for ClockTime {
    type Err = ClockTimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            tracing::warn!("could not parse clock time: '{s}'");
            ClockTimeParseError(s.to_owned())
        })
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes / 60, self.minutes % 60)
    }
}

impl Serialize for ClockTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where S: serde::Serializer
    {
        serializer.collect_str(self)
    }
}

struct ClockTimeVisitor;
impl<'de> serde::de::Visitor<'de> for ClockTimeVisitor {
    type Value = ClockTime;

    fn expecting(
        &self, formatter: &mut fmt::Formatter,
    ) -> fmt::Result {
        write!(formatter, "a time of day formatted as HH:MM")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where E: serde::de::Error
    {
        ClockTime::parse(v).ok_or_else(|| {
            serde::de::Error::invalid_value(
                serde::de::Unexpected::Str(v),
                &self,
            )
        })
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where D: serde::Deserializer<'de>
    { deserializer.deserialize_str(ClockTimeVisitor) }
}
