use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

use super::object_records;
use crate::error::Result;

/// One meal of a generated plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealPlanItem {
    pub day_no: u32,
    pub meal_type: String,
    pub item: String,
}

impl MealPlanItem {
    /// Keep the records with a numeric `day_no` and string `meal_type`/`item`
    pub fn collect(records: &[Value]) -> Vec<MealPlanItem> {
        object_records(records)
    }

    /// True when at least one record is a meal-plan item
    pub fn is_meal_plan(records: &[Value]) -> bool {
        records
            .iter()
            .filter(|record| record.is_object())
            .any(|record| MealPlanItem::deserialize(record).is_ok())
    }
}

/// Meals of a single day, ordered breakfast to snack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayPlan {
    pub day: u32,
    pub meals: Vec<MealPlanItem>,
}

/// Group items by day in ascending order.
///
/// Within a day, known meal types come in breakfast, lunch, dinner, snack
/// order; unknown types follow, alphabetically. Equal types keep their
/// arrival order.
pub fn group_by_day(items: &[MealPlanItem]) -> Vec<DayPlan> {
    let mut by_day: BTreeMap<u32, Vec<MealPlanItem>> = BTreeMap::new();
    for item in items {
        by_day.entry(item.day_no).or_default().push(item.clone());
    }

    by_day
        .into_iter()
        .map(|(day, mut meals)| {
            meals.sort_by(|a, b| {
                meal_type_order(&a.meal_type)
                    .cmp(&meal_type_order(&b.meal_type))
                    .then_with(|| a.meal_type.cmp(&b.meal_type))
            });
            DayPlan { day, meals }
        })
        .collect()
}

fn meal_type_order(meal_type: &str) -> u8 {
    match meal_type {
        "breakfast" => 0,
        "lunch" => 1,
        "dinner" => 2,
        "snack" => 3,
        _ => 99,
    }
}

/// Display label for a meal type; unknown types are shown as-is
pub fn meal_type_label(meal_type: &str) -> &str {
    match meal_type {
        "breakfast" => "아침",
        "lunch" => "점심",
        "dinner" => "저녁",
        "snack" => "간식",
        other => other,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Period {
    #[default]
    Week,
    Month,
}

impl Period {
    pub fn as_api(&self) -> &'static str {
        match self {
            Period::Week => "weekly",
            Period::Month => "monthly",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Period::Week => "주간 식단 계획",
            Period::Month => "월간 식단 계획",
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "week" | "weekly" => Ok(Period::Week),
            "month" | "monthly" => Ok(Period::Month),
            other => Err(format!("unknown period: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Goal {
    Loss,
    Gain,
    #[default]
    Normal,
}

impl Goal {
    pub fn as_api(&self) -> &'static str {
        match self {
            Goal::Loss => "weight_loss",
            Goal::Gain => "weight_gain",
            Goal::Normal => "balanced",
        }
    }
}

impl FromStr for Goal {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "loss" | "weight_loss" => Ok(Goal::Loss),
            "gain" | "weight_gain" => Ok(Goal::Gain),
            "normal" | "balanced" => Ok(Goal::Normal),
            other => Err(format!("unknown goal: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_api(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "male" | "남" => Ok(Gender::Male),
            "female" | "여" => Ok(Gender::Female),
            other => Err(format!("unknown gender: {}", other)),
        }
    }
}

/// Parameters for meal-plan generation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MealPlanRequest {
    pub period: Period,
    pub goal: Goal,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    /// Basal metabolic rate in kcal
    pub basic_metabolism: Option<u32>,
}

#[derive(Serialize)]
struct MealPlanPayload<'a> {
    title: &'a str,
    period: &'a str,
    goals: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gender: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    basic_metabolism: Option<u32>,
}

impl MealPlanRequest {
    /// The generator expects the parameters JSON-encoded inside the chat message
    pub fn to_message(&self) -> Result<String> {
        let payload = MealPlanPayload {
            title: self.period.title(),
            period: self.period.as_api(),
            goals: self.goal.as_api(),
            age: self.age,
            gender: self.gender.as_ref().map(Gender::as_api),
            basic_metabolism: self.basic_metabolism,
        };
        Ok(serde_json::to_string(&payload)?)
    }
}
