//! `mealie://` resource URIs and the Mealie endpoints behind them.

pub const RECIPES_URI: &str = "mealie://recipes";
pub const MEAL_PLANS_URI: &str = "mealie://meal-plans";
pub const SHOPPING_LISTS_URI: &str = "mealie://shopping-lists";

const SCHEME: &str = "mealie://";

/// A resource URI understood by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceRoute {
    Recipes,
    SearchRecipes(String),
    Recipe(String),
    MealPlans,
    ShoppingLists,
    ShoppingList(String),
}

impl ResourceRoute {
    /// Parses a `mealie://` URI. Path parameters are percent-decoded.
    pub fn parse(uri: &str) -> Option<Self> {
        let rest = uri.strip_prefix(SCHEME)?.trim_end_matches('/');
        let segments: Vec<&str> = rest.split('/').collect();

        match segments.as_slice() {
            ["recipes"] => Some(Self::Recipes),
            ["recipes", "search", query] if !query.is_empty() => {
                Some(Self::SearchRecipes(decode(query)?))
            }
            ["recipes", id] if !id.is_empty() => Some(Self::Recipe(decode(id)?)),
            ["meal-plans"] => Some(Self::MealPlans),
            ["shopping-lists"] => Some(Self::ShoppingLists),
            ["shopping-lists", id] if !id.is_empty() => Some(Self::ShoppingList(decode(id)?)),
            _ => None,
        }
    }

    /// Upstream path plus query parameters.
    pub fn endpoint(&self) -> (String, Vec<(&'static str, String)>) {
        match self {
            Self::Recipes => ("/api/recipes".to_string(), vec![]),
            Self::SearchRecipes(query) => {
                ("/api/recipes/search".to_string(), vec![("query", query.clone())])
            }
            Self::Recipe(id) => (format!("/api/recipes/{}", urlencoding::encode(id)), vec![]),
            Self::MealPlans => ("/api/households/mealplans".to_string(), vec![]),
            Self::ShoppingLists => ("/api/households/shopping/lists".to_string(), vec![]),
            Self::ShoppingList(id) => (
                format!("/api/households/shopping/lists/{}", urlencoding::encode(id)),
                vec![],
            ),
        }
    }
}

fn decode(segment: &str) -> Option<String> {
    urlencoding::decode(segment).ok().map(|s| s.into_owned())
}
