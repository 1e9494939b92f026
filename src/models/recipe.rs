use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::object_records;

/// A recommended recipe as emitted by the generator.
///
/// Every field is optional because the generator's output shape drifts
/// between prompts; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    /// Cooking time in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

impl Recipe {
    /// Keep the records that look like recipes, dropping the rest
    pub fn collect(records: &[Value]) -> Vec<Recipe> {
        object_records(records)
    }

    /// One-line description for terminal output
    pub fn summary(&self) -> String {
        let mut details = Vec::new();
        if let Some(cuisine) = &self.cuisine {
            details.push(cuisine.clone());
        }
        if let Some(time) = self.time {
            details.push(format!("{}분", time));
        }
        if let Some(level) = &self.level {
            details.push(level.clone());
        }
        if let Some(rating) = self.rating {
            details.push(format!("★{:.1}", rating));
        }

        let name = self.name.as_deref().unwrap_or("(이름 없음)");
        if details.is_empty() {
            name.to_string()
        } else {
            format!("{} ({})", name, details.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collect_recipes() {
        let records = vec![
            json!({"id": 1, "name": "김치찌개", "cuisine": "한식", "time": 30, "level": "쉬움", "rating": 4.5}),
            json!({"name": "계란말이", "extra": true}),
            json!("not a recipe"),
            json!([1, 2]),
            json!({"name": 42}),
        ];

        let recipes = Recipe::collect(&records);
        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0].id, Some(1));
        assert_eq!(recipes[0].time, Some(30));
        assert_eq!(recipes[1].name.as_deref(), Some("계란말이"));
        assert_eq!(recipes[1].cuisine, None);
    }

    #[test]
    fn test_summary() {
        let recipe = Recipe {
            name: Some("김치찌개".to_string()),
            cuisine: Some("한식".to_string()),
            time: Some(30),
            rating: Some(4.5),
            ..Default::default()
        };
        assert_eq!(recipe.summary(), "김치찌개 (한식, 30분, ★4.5)");
        assert_eq!(Recipe::default().summary(), "(이름 없음)");
    }
}
