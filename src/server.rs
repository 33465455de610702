use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::*,
    schemars,
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use serde_json::{json, Value};

use crate::client::{
    types::{CreateMealPlanEntryRequest, MealType, RandomMealRequest},
    MealieClient, MealieError, OutboundRequest,
};
use crate::resources::{ResourceRoute, MEAL_PLANS_URI, RECIPES_URI, SHOPPING_LISTS_URI};

// Parameter structs for tools
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct ListRecipesParams {
    /// Page number, starting at 1
    #[serde(default)]
    pub page: Option<u32>,
    /// Recipes per page
    #[serde(default)]
    pub per_page: Option<u32>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct SearchRecipesParams {
    /// Text to search for in recipe names and ingredients
    pub query: String,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct GetRecipeParams {
    /// Recipe UUID or slug
    pub recipe_id: String,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct ListMealPlansParams {
    /// First day to include, YYYY-MM-DD
    #[serde(default)]
    pub start_date: Option<String>,
    /// Last day to include, YYYY-MM-DD
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct CreateRandomMealParams {
    /// Day to schedule the meal, YYYY-MM-DD
    pub date: String,
    /// breakfast, lunch, dinner or side
    pub meal_type: String,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct AddRecipeToMealPlanParams {
    /// Day to schedule the recipe, YYYY-MM-DD
    pub date: String,
    /// breakfast, lunch, dinner or side
    pub meal_type: String,
    /// UUID of the recipe
    pub recipe_id: String,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct GetShoppingListParams {
    /// UUID of the shopping list
    pub list_id: String,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct AddRecipeIngredientsParams {
    /// UUID of the target shopping list
    pub shopping_list_id: String,
    /// Mealie ShoppingListAddRecipeParamsBulk payload, e.g.
    /// {"recipeId": "...", "recipeIncrementQuantity": 1}
    pub recipe_params: Value,
}

fn parse_date(field: &str, value: &str) -> Result<String, McpError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map(|date| date.format("%Y-%m-%d").to_string())
        .map_err(|_| {
            McpError::invalid_params(
                format!("{} must be a date in YYYY-MM-DD format, got '{}'", field, value),
                None,
            )
        })
}

fn parse_meal_type(value: &str) -> Result<MealType, McpError> {
    value
        .parse()
        .map_err(|e: String| McpError::invalid_params(e, None))
}

fn to_json_text(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn tool_result(action: &str, result: Result<Value, MealieError>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(value) => Ok(CallToolResult::success(vec![Content::text(to_json_text(&value))])),
        Err(e) => {
            tracing::error!("Failed to {}: {}", action, e);
            let error = json!({
                "error": format!("Failed to {}", action),
                "details": e.to_string()
            });
            Ok(CallToolResult::error(vec![Content::text(error.to_string())]))
        }
    }
}

fn resource(uri: &str, name: &str, description: &str) -> Resource {
    let mut raw = RawResource::new(uri, name.to_string());
    raw.description = Some(description.to_string());
    raw.mime_type = Some("application/json".to_string());
    raw.no_annotation()
}

/// MCP server exposing Mealie recipes, meal plans and shopping lists.
///
/// Every instance shares one [`MealieClient`]; the process that created the
/// client is responsible for closing it.
#[derive(Clone)]
pub struct MealieMcpServer {
    client: Arc<MealieClient>,
    tool_router: ToolRouter<MealieMcpServer>,
}

#[tool_router]
impl MealieMcpServer {
    pub fn new(client: Arc<MealieClient>) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }

    pub fn client(&self) -> &Arc<MealieClient> {
        &self.client
    }

    async fn fetch(&self, request: OutboundRequest) -> Result<Value, MealieError> {
        self.client.request(request).await?.error_for_status()?.json()
    }

    pub fn resources(&self) -> Vec<Resource> {
        vec![
            resource(RECIPES_URI, "recipes", "All recipes in Mealie"),
            resource(MEAL_PLANS_URI, "meal-plans", "Meals scheduled on the household meal plan"),
            resource(SHOPPING_LISTS_URI, "shopping-lists", "Every shopping list in the household"),
        ]
    }

    /// Resolves a `mealie://` URI to the JSON Mealie returns for it.
    pub async fn read_uri(&self, uri: &str) -> Result<ReadResourceResult, McpError> {
        let route = ResourceRoute::parse(uri).ok_or_else(|| {
            McpError::resource_not_found("resource_not_found", Some(json!({ "uri": uri })))
        })?;

        let (path, query) = route.endpoint();
        tracing::debug!("Reading resource {} from {}", uri, path);
        let pairs: Vec<(&str, &str)> = query.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let request = OutboundRequest::new(reqwest::Method::GET, path).query(&pairs);

        match self.fetch(request).await {
            Ok(value) => Ok(ReadResourceResult {
                contents: vec![ResourceContents::text(to_json_text(&value), uri)],
            }),
            Err(e) => {
                tracing::error!("Failed to read resource {}: {}", uri, e);
                Err(McpError::internal_error(
                    format!("Failed to read {}: {}", uri, e),
                    Some(json!({ "uri": uri })),
                ))
            }
        }
    }

    // Recipe tools
    #[tool(description = "List recipe summaries, optionally paginated")]
    async fn list_recipes(
        &self,
        Parameters(params): Parameters<ListRecipesParams>,
    ) -> Result<CallToolResult, McpError> {
        let page = params.page.map(|p| p.to_string());
        let per_page = params.per_page.map(|p| p.to_string());

        let mut query = Vec::new();
        if let Some(page) = page.as_deref() {
            query.push(("page", page));
        }
        if let Some(per_page) = per_page.as_deref() {
            query.push(("perPage", per_page));
        }

        let request = OutboundRequest::new(reqwest::Method::GET, "/api/recipes").query(&query);
        tool_result("list recipes", self.fetch(request).await)
    }

    #[tool(description = "Search recipes by name or ingredient")]
    async fn search_recipes(
        &self,
        Parameters(params): Parameters<SearchRecipesParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("Searching for recipes with query: {}", params.query);
        let request = OutboundRequest::new(reqwest::Method::GET, "/api/recipes/search")
            .query(&[("query", params.query.as_str())]);
        tool_result("search recipes", self.fetch(request).await)
    }

    #[tool(description = "Fetch the details of a single recipe by its ID or slug")]
    async fn get_recipe(
        &self,
        Parameters(params): Parameters<GetRecipeParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = format!("/api/recipes/{}", urlencoding::encode(&params.recipe_id));
        let request = OutboundRequest::new(reqwest::Method::GET, path);
        tool_result("get recipe", self.fetch(request).await)
    }

    // Meal planning tools
    #[tool(description = "List meal plan entries, optionally limited to a date range")]
    async fn list_meal_plans(
        &self,
        Parameters(params): Parameters<ListMealPlansParams>,
    ) -> Result<CallToolResult, McpError> {
        let start = params
            .start_date
            .as_deref()
            .map(|d| parse_date("start_date", d))
            .transpose()?;
        let end = params
            .end_date
            .as_deref()
            .map(|d| parse_date("end_date", d))
            .transpose()?;

        let mut query = Vec::new();
        if let Some(start) = start.as_deref() {
            query.push(("start_date", start));
        }
        if let Some(end) = end.as_deref() {
            query.push(("end_date", end));
        }

        let request =
            OutboundRequest::new(reqwest::Method::GET, "/api/households/mealplans").query(&query);
        tool_result("list meal plans", self.fetch(request).await)
    }

    #[tool(description = "Create a random meal according to the household's meal plan settings")]
    async fn create_random_meal(
        &self,
        Parameters(params): Parameters<CreateRandomMealParams>,
    ) -> Result<CallToolResult, McpError> {
        let payload = RandomMealRequest {
            date: parse_date("date", &params.date)?,
            entry_type: parse_meal_type(&params.meal_type)?,
        };
        let body = serde_json::to_value(&payload)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        let request =
            OutboundRequest::new(reqwest::Method::POST, "/api/households/mealplans/random").json(body);
        tool_result("create random meal", self.fetch(request).await)
    }

    #[tool(description = "Add a recipe entry to the meal plan")]
    async fn add_recipe_to_meal_plan(
        &self,
        Parameters(params): Parameters<AddRecipeToMealPlanParams>,
    ) -> Result<CallToolResult, McpError> {
        let payload = CreateMealPlanEntryRequest {
            date: parse_date("date", &params.date)?,
            entry_type: parse_meal_type(&params.meal_type)?,
            recipe_id: params.recipe_id,
        };
        let body = serde_json::to_value(&payload)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        let request =
            OutboundRequest::new(reqwest::Method::POST, "/api/households/mealplans").json(body);
        tool_result("add recipe to meal plan", self.fetch(request).await)
    }

    // Shopping list tools
    #[tool(description = "Retrieve every shopping list in the household")]
    async fn list_shopping_lists(&self) -> Result<CallToolResult, McpError> {
        let request = OutboundRequest::new(reqwest::Method::GET, "/api/households/shopping/lists");
        tool_result("list shopping lists", self.fetch(request).await)
    }

    #[tool(description = "Fetch the contents of a single shopping list")]
    async fn get_shopping_list(
        &self,
        Parameters(params): Parameters<GetShoppingListParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = format!(
            "/api/households/shopping/lists/{}",
            urlencoding::encode(&params.list_id)
        );
        let request = OutboundRequest::new(reqwest::Method::GET, path);
        tool_result("get shopping list", self.fetch(request).await)
    }

    #[tool(description = "Add the ingredients of a recipe to a shopping list")]
    async fn add_recipe_ingredients_to_list(
        &self,
        Parameters(params): Parameters<AddRecipeIngredientsParams>,
    ) -> Result<CallToolResult, McpError> {
        if !params.recipe_params.is_object() && !params.recipe_params.is_array() {
            return Err(McpError::invalid_params(
                "recipe_params must be a JSON object (or a list of them)",
                None,
            ));
        }

        let path = format!(
            "/api/households/shopping/lists/{}/recipe",
            urlencoding::encode(&params.shopping_list_id)
        );
        let request = OutboundRequest::new(reqwest::Method::POST, path).json(params.recipe_params);
        tool_result("add recipe ingredients to list", self.fetch(request).await)
    }
}

#[tool_handler]
impl ServerHandler for MealieMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some("This server exposes a Mealie recipe manager. Tools cover recipe listing, search and lookup, meal planning (random meals or specific recipes on a date), and shopping lists (listing and adding a recipe's ingredients). Resources under mealie:// return the raw Mealie JSON for recipes, meal plans and shopping lists.".to_string()),
        }
    }

    async fn initialize(
        &self,
        _request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<InitializeResult, McpError> {
        Ok(self.get_info())
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult {
            resources: self.resources(),
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParam { uri }: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        self.read_uri(&uri).await
    }
}
