use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRef, Path, State,
    },
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use barista_auth::Gate;
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::drinks::{DrinkChanges, Menu, MenuError};

mod permission {
    barista_axum::permission_guards! {
        pub permission GetDrinksDetail = "get:drinks-detail";
        pub permission PostDrinks = "post:drinks";
        pub permission PatchDrinks = "patch:drinks";
        pub permission DeleteDrinks = "delete:drinks";
        pub permission AnyCaller = *;
    }
}

/// Shared state handed to every handler
#[derive(Clone, Debug)]
pub struct AppState {
    pub gate: Gate,
    pub menu: Menu,
}

impl FromRef<AppState> for Gate {
    fn from_ref(state: &AppState) -> Self {
        state.gate.clone()
    }
}

impl FromRef<AppState> for Menu {
    fn from_ref(state: &AppState) -> Self {
        state.menu.clone()
    }
}

/// Builds the service router
///
/// `cors` wraps every route, including the fallback, so preflight requests
/// are answered before authorization runs.
pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/drinks", get(list_drinks).post(create_drink))
        .route("/drinks-detail", get(drinks_detail))
        .route("/drinks/:id", patch(update_drink).delete(delete_drink))
        .route("/me", get(me))
        .fallback(not_found)
        .with_state(state)
        .layer(cors)
}

/// Builds the CORS policy for browser clients
///
/// An empty list, or one containing `*`, admits any origin. Otherwise only
/// the listed origins are echoed back.
///
/// # Errors
///
/// Returns an error if an origin is not a valid header value.
pub fn cors(origins: &[String]) -> Result<CorsLayer, header::InvalidHeaderValue> {
    let allow_origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins = origins
            .iter()
            .map(|o| HeaderValue::from_str(o))
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]))
}

enum ApiError {
    NotFound,
    Unprocessable,
}

impl From<MenuError> for ApiError {
    fn from(err: MenuError) -> Self {
        match err {
            MenuError::NotFound(_) => Self::NotFound,
            MenuError::Incomplete | MenuError::DuplicateTitle(_) => Self::Unprocessable,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => barista_axum::json_error(StatusCode::NOT_FOUND, "resource not found"),
            Self::Unprocessable => {
                barista_axum::json_error(StatusCode::UNPROCESSABLE_ENTITY, "unprocessable")
            }
        }
    }
}

fn drink_id(path: Result<Path<u64>, PathRejection>) -> Result<u64, ApiError> {
    path.map(|Path(id)| id).map_err(|_| ApiError::NotFound)
}

fn drink_changes(body: Result<Json<DrinkChanges>, JsonRejection>) -> Result<DrinkChanges, ApiError> {
    body.map(|Json(changes)| changes).map_err(|rejection| {
        tracing::debug!(%rejection, "drink body rejected");
        ApiError::Unprocessable
    })
}

async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": "Welcome to the coffee shop!",
    }))
}

async fn list_drinks(State(menu): State<Menu>) -> Json<serde_json::Value> {
    let drinks = menu.all().await;
    Json(json!({
        "success": true,
        "drinks": drinks.iter().map(|d| d.short()).collect::<Vec<_>>(),
    }))
}

async fn drinks_detail(
    _: permission::GetDrinksDetail,
    State(menu): State<Menu>,
) -> Json<serde_json::Value> {
    let drinks = menu.all().await;
    Json(json!({
        "success": true,
        "drinks": drinks.iter().map(|d| d.long()).collect::<Vec<_>>(),
    }))
}

async fn create_drink(
    permission::PostDrinks(claims): permission::PostDrinks,
    State(menu): State<Menu>,
    body: Result<Json<DrinkChanges>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let drink = menu.create(drink_changes(body)?).await?;
    tracing::info!(drink.id = drink.id, caller = ?claims.subject(), "drink created");

    Ok(Json(json!({
        "success": true,
        "drinks": [drink.long()],
    })))
}

async fn update_drink(
    permission::PatchDrinks(claims): permission::PatchDrinks,
    State(menu): State<Menu>,
    id: Result<Path<u64>, PathRejection>,
    body: Result<Json<DrinkChanges>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = drink_id(id)?;
    let drink = menu.update(id, drink_changes(body)?).await?;
    tracing::info!(drink.id = id, caller = ?claims.subject(), "drink updated");

    Ok(Json(json!({
        "success": true,
        "drinks": [drink.long()],
    })))
}

async fn delete_drink(
    permission::DeleteDrinks(claims): permission::DeleteDrinks,
    State(menu): State<Menu>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = drink_id(id)?;
    menu.delete(id).await?;
    tracing::info!(drink.id = id, caller = ?claims.subject(), "drink deleted");

    Ok(Json(json!({
        "success": true,
        "delete": id,
    })))
}

async fn me(permission::AnyCaller(claims): permission::AnyCaller) -> Json<serde_json::Value> {
    let permissions: Vec<&str> = claims
        .permissions()
        .map(|p| p.iter().map(|p| p.as_str()).collect())
        .unwrap_or_default();

    Json(json!({
        "success": true,
        "subject": claims.subject().map(|s| s.as_str()),
        "permissions": permissions,
    }))
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}
