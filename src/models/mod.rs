pub mod chat;
pub mod meal_plan;
pub mod recipe;

pub use chat::ChatRequest;
pub use meal_plan::{
    DayPlan, Gender, Goal, MealPlanItem, MealPlanRequest, Period, group_by_day, meal_type_label,
};
pub use recipe::Recipe;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Deserialize the object-shaped records into `T`, dropping the rest
fn object_records<T: DeserializeOwned>(records: &[Value]) -> Vec<T> {
    records
        .iter()
        .filter(|record| record.is_object())
        .filter_map(|record| serde_json::from_value(record.clone()).ok())
        .collect()
}
