pub mod raw;
mod processed;
pub mod filter;
pub mod time;
pub mod wrapped;

pub use processed::*;
pub use filter::{
    filter_day_menu, filter_meal, filter_menu_items, filter_week_menu,
    DietaryFilter, MenuType, SpecialType,
};
pub use time::{
    find_current_or_upcoming_meal, pick_highlight_meal_for_day,
    CurrentMealPointer, HighlightedMeal, IstInstant,
};
