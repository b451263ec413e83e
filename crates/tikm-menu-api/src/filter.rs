use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{DayMenu, ItemTag, Meal, MenuItem, WeekMenu};

/// Dietary preference of the viewer.
///
/// `Jain` does not filter anything itself, it selects the separate Jain
/// dataset (see [`DietaryFilter::menu_type`]).
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DietaryFilter {
    #[default] All,
    VegOnly,
    NonVegOnly,
    Jain,
}

impl DietaryFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            DietaryFilter::All => "all",
            DietaryFilter::VegOnly => "veg-only",
            DietaryFilter::NonVegOnly => "non-veg-only",
            DietaryFilter::Jain => "jain",
        }
    }

    pub fn menu_type(&self) -> MenuType {
        match self {
            DietaryFilter::Jain => MenuType::Jain,
            _ => MenuType::Normal,
        }
    }

    /// whether `item` survives this filter
    pub fn keeps(&self, item: &MenuItem) -> bool {
        match self {
            DietaryFilter::All | DietaryFilter::Jain => true,
            DietaryFilter::VegOnly => !item.has_tag(ItemTag::NonVeg)
                && !item.has_tag(ItemTag::NonVegSpecial),
            // hides the veg specials, plain veg and untagged items stay
            DietaryFilter::NonVegOnly => !item.has_tag(ItemTag::VegSpecial),
        }
    }
}

impl fmt::Display for DietaryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown dietary filter: '{0}'")]
pub struct UnknownFilter(String);

impl FromStr for DietaryFilter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "all" => DietaryFilter::All,
            "veg-only" => DietaryFilter::VegOnly,
            "non-veg-only" => DietaryFilter::NonVegOnly,
            "jain" => DietaryFilter::Jain,
            _ => return Err(UnknownFilter(s.to_owned())),
        })
    }
}

/// Which upstream dataset a week is fetched from.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuType {
    #[default] Normal,
    Jain,
}

impl MenuType {
    /// value of the upstream `type` query parameter, none for the normal menu
    pub fn query_value(&self) -> Option<&'static str> {
        match self {
            MenuType::Normal => None,
            MenuType::Jain => Some("jain"),
        }
    }
}

impl fmt::Display for MenuType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MenuType::Normal => "normal",
            MenuType::Jain => "jain",
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown menu type: '{0}'")]
pub struct UnknownMenuType(String);

impl FromStr for MenuType {
    type Err = UnknownMenuType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(MenuType::Normal),
            "jain" => Ok(MenuType::Jain),
            _ => Err(UnknownMenuType(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpecialType {
    Veg,
    NonVeg,
    Other,
}

impl MenuItem {
    /// The special-of-the-day category, veg checked first, then non-veg,
    /// then other.
    pub fn special_type(&self) -> Option<SpecialType> {
        match self {
            MenuItem::Legacy(_) => None,
            MenuItem::Tagged { tags, .. } => [
                (ItemTag::VegSpecial, SpecialType::Veg),
                (ItemTag::NonVegSpecial, SpecialType::NonVeg),
                (ItemTag::OtherSpecial, SpecialType::Other),
            ].into_iter()
                .find(|(tag, _)| tags.contains(tag))
            .map(|(_, ty)| ty),
        }
    }

    pub fn is_special(&self) -> bool {
        self.special_type().is_some()
    }

    pub fn is_non_veg(&self) -> bool {
        self.has_tag(ItemTag::NonVeg)
    }
}

/// Stable filter over `items`; `all` and `jain` return everything.
pub fn filter_menu_items(items: &[MenuItem], filter: DietaryFilter) -> Vec<MenuItem> {
    items.iter()
        .filter(|item| filter.keeps(item))
        .cloned()
    .collect()
}

pub fn filter_meal(meal: &Meal, filter: DietaryFilter) -> Meal {
    Meal {
        items: filter_menu_items(&meal.items, filter),
        ..meal.clone()
    }
}

/// Filters every meal of the day, meals without surviving items are dropped.
pub fn filter_day_menu(day: &DayMenu, filter: DietaryFilter) -> DayMenu {
    DayMenu {
        day: day.day.clone(),
        meals: day.meals.iter()
            .map(|(key, meal)| (*key, filter_meal(meal, filter)))
            .filter(|(_, meal)| !meal.items.is_empty())
        .collect(),
    }
}

pub fn filter_week_menu(week: &WeekMenu, filter: DietaryFilter) -> WeekMenu {
    WeekMenu {
        food_court: week.food_court.clone(),
        week: week.week.clone(),
        menu: week.menu.iter()
            .map(|(date, day)| (*date, filter_day_menu(day, filter)))
        .collect(),
    }
}
