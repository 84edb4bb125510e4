//! Inventory service routes

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post, put},
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::error;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::ActingUser,
    models::{Sel3aPayload, TakeRequest},
    repositories::ledger::TakeOutcome,
    state::AppState,
};

/// Create the router for the inventory service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/sel3a", get(list_items).post(create_item))
        .route("/sel3a/:id", put(update_item).delete(delete_item))
        .route("/sel3a/take/:id", post(take_item))
        .route("/sel3a/taken-report/all", get(taken_report_all))
        .route("/sel3a/taken-report/summary", get(taken_report_summary))
        .route("/sel3a/taken-report/details/:id", get(taken_report_details))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "inventory-service"
    }))
}

/// Validate an item payload, returning the concrete fields
fn validate_payload(payload: &Sel3aPayload) -> ApiResult<(&str, f64, i32)> {
    let name = payload
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::InvalidInput("Name is required".to_string()))?;

    let price = payload
        .price
        .ok_or_else(|| ApiError::InvalidInput("Price is required".to_string()))?;
    if price < 0.0 {
        return Err(ApiError::InvalidInput(
            "Price must not be negative".to_string(),
        ));
    }

    let quantity = payload
        .quantity
        .ok_or_else(|| ApiError::InvalidInput("Quantity is required".to_string()))?;
    if quantity < 0 {
        return Err(ApiError::InvalidInput(
            "Quantity must not be negative".to_string(),
        ));
    }

    Ok((name, price, quantity))
}

/// List all items with the creator's display name. Public read.
pub async fn list_items(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let items = state.item_repository.list().await.map_err(|e| {
        error!("Failed to list items: {}", e);
        ApiError::Internal
    })?;

    Ok(Json(items))
}

/// Create a new item owned by the acting identity
pub async fn create_item(
    State(state): State<AppState>,
    acting: ActingUser,
    Json(payload): Json<Sel3aPayload>,
) -> ApiResult<impl IntoResponse> {
    let (name, price, quantity) = validate_payload(&payload)?;

    state
        .item_repository
        .create(name, price, quantity, &acting.email)
        .await
        .map_err(|e| {
            error!("Failed to create item: {}", e);
            ApiError::Internal
        })?;

    Ok(Json(json!({"message": "Item added"})))
}

/// Overwrite an item's fields. Creator only.
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    acting: ActingUser,
    Json(payload): Json<Sel3aPayload>,
) -> ApiResult<impl IntoResponse> {
    let item = state
        .item_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            error!("Failed to look up item: {}", e);
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))?;

    if item.added_by != acting.email {
        return Err(ApiError::Forbidden(
            "Only the creator can edit this item".to_string(),
        ));
    }

    let (name, price, quantity) = validate_payload(&payload)?;

    state
        .item_repository
        .update(id, name, price, quantity)
        .await
        .map_err(|e| {
            error!("Failed to update item: {}", e);
            ApiError::Internal
        })?;

    Ok(Json(json!({"message": "Item updated"})))
}

/// Delete an item. Creator only.
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    acting: ActingUser,
) -> ApiResult<impl IntoResponse> {
    let item = state
        .item_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            error!("Failed to look up item: {}", e);
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))?;

    if item.added_by != acting.email {
        return Err(ApiError::Forbidden(
            "Only the creator can delete this item".to_string(),
        ));
    }

    state.item_repository.delete(id).await.map_err(|e| {
        error!("Failed to delete item: {}", e);
        ApiError::Internal
    })?;

    Ok(Json(json!({"message": "Item deleted"})))
}

/// Take a quantity from an item, appending a ledger record
pub async fn take_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    acting: ActingUser,
    Json(payload): Json<TakeRequest>,
) -> ApiResult<impl IntoResponse> {
    let quantity = payload
        .quantity
        .filter(|q| *q > 0)
        .ok_or_else(|| ApiError::InvalidInput("Quantity must be positive".to_string()))?;

    let outcome = state
        .ledger_repository
        .take(id, &acting.email, quantity)
        .await
        .map_err(|e| {
            error!("Take failed: {}", e);
            ApiError::Internal
        })?;

    match outcome {
        TakeOutcome::Taken => Ok(Json(json!({"message": "Quantity taken successfully"}))),
        TakeOutcome::NotFound => Err(ApiError::NotFound("Item not found".to_string())),
        TakeOutcome::InsufficientStock => Err(ApiError::InvalidInput(
            "Requested quantity exceeds remaining stock".to_string(),
        )),
    }
}

/// Full withdrawal history, newest first
pub async fn taken_report_all(
    State(state): State<AppState>,
    _acting: ActingUser,
) -> ApiResult<impl IntoResponse> {
    let report = state.ledger_repository.report_all().await.map_err(|e| {
        error!("Failed to fetch report: {}", e);
        ApiError::Internal
    })?;

    Ok(Json(report))
}

/// Per-item withdrawal totals, including items never taken from
pub async fn taken_report_summary(
    State(state): State<AppState>,
    _acting: ActingUser,
) -> ApiResult<impl IntoResponse> {
    let summary = state.ledger_repository.report_summary().await.map_err(|e| {
        error!("Failed to fetch summary: {}", e);
        ApiError::Internal
    })?;

    Ok(Json(summary))
}

/// Per-item withdrawal details with the derived total ever added
pub async fn taken_report_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _acting: ActingUser,
) -> ApiResult<impl IntoResponse> {
    let details = state
        .ledger_repository
        .report_details(id)
        .await
        .map_err(|e| {
            error!("Failed to fetch details: {}", e);
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))?;

    Ok(Json(details))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{ItemRepository, ledger::LedgerRepository};
    use common::database::{DatabaseConfig, init_pool};

    async fn test_state() -> AppState {
        let pool = init_pool(&DatabaseConfig::from_env().unwrap())
            .await
            .unwrap();

        AppState {
            db_pool: pool.clone(),
            item_repository: ItemRepository::new(pool.clone()),
            ledger_repository: LedgerRepository::new(pool),
        }
    }

    fn acting(email: &str) -> ActingUser {
        ActingUser {
            email: email.to_string(),
        }
    }

    fn item_payload(name: &str, price: f64, quantity: i32) -> Sel3aPayload {
        Sel3aPayload {
            name: Some(name.to_string()),
            price: Some(price),
            quantity: Some(quantity),
        }
    }

    /// Needs a live PostgreSQL with db/schema.sql applied.
    #[tokio::test]
    #[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
    async fn test_update_by_non_creator_is_forbidden() {
        let state = test_state().await;
        let item = state
            .item_repository
            .create("notebook", 2.0, 4, "alice@x")
            .await
            .unwrap();

        let result = update_item(
            State(state.clone()),
            Path(item.id),
            acting("bob@x"),
            Json(item_payload("hijacked", 9.0, 1)),
        )
        .await;
        assert!(matches!(result, Err(ApiError::Forbidden(_))));

        // The rejected update must not change anything.
        let unchanged = state
            .item_repository
            .find_by_id(item.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.name, "notebook");
        assert_eq!(unchanged.quantity, 4);

        let result = update_item(
            State(state.clone()),
            Path(item.id),
            acting("alice@x"),
            Json(item_payload("notebook v2", 2.5, 6)),
        )
        .await;
        assert!(result.is_ok());

        let updated = state
            .item_repository
            .find_by_id(item.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "notebook v2");
        assert_eq!(updated.quantity, 6);

        state.item_repository.delete(item.id).await.unwrap();
    }

    /// Needs a live PostgreSQL with db/schema.sql applied.
    #[tokio::test]
    #[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
    async fn test_delete_by_non_creator_is_forbidden() {
        let state = test_state().await;
        let item = state
            .item_repository
            .create("eraser", 0.5, 3, "alice@x")
            .await
            .unwrap();

        let result = delete_item(State(state.clone()), Path(item.id), acting("bob@x")).await;
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
        assert!(
            state
                .item_repository
                .find_by_id(item.id)
                .await
                .unwrap()
                .is_some()
        );

        let result = delete_item(State(state.clone()), Path(item.id), acting("alice@x")).await;
        assert!(result.is_ok());
        assert!(
            state
                .item_repository
                .find_by_id(item.id)
                .await
                .unwrap()
                .is_none()
        );
    }
}
