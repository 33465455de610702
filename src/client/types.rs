//! Wire types for the handful of Mealie payloads this crate builds itself.
//!
//! Recipe, meal plan and shopping list bodies returned by Mealie are passed
//! through as [`serde_json::Value`]; only the requests we construct and the
//! token response we must read are typed here.

use serde::{Deserialize, Serialize};

/// Form body for `POST /api/auth/token`.
#[derive(Debug, Serialize)]
pub struct AuthForm<'a> {
    pub username: &'a str,
    pub password: &'a str,
    /// Mealie issues a long-lived token when this is `"true"`.
    pub remember_me: &'a str,
}

/// Response of `POST /api/auth/token`.
///
/// `access_token` is optional so that a 2xx without a token is reported as an
/// authentication failure instead of a decode error.
#[derive(Debug, Deserialize)]
pub struct AuthToken {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Meal slot accepted by Mealie's `entryType` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Side,
}

impl std::str::FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "side" => Ok(MealType::Side),
            other => Err(format!(
                "unknown meal type '{}', expected breakfast, lunch, dinner or side",
                other
            )),
        }
    }
}

/// Body for `POST /api/households/mealplans/random`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomMealRequest {
    pub date: String,
    pub entry_type: MealType,
}

/// Body for `POST /api/households/mealplans`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMealPlanEntryRequest {
    pub date: String,
    pub entry_type: MealType,
    pub recipe_id: String,
}
