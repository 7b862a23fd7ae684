use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use nexo_core::{OrderFilter, Page, PageRequest};
use nexo_order::{CreateOrder, EnrichedOrder, Order, OrderStatus};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct OrderPaginationQuery {
    pub status: Option<OrderStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl OrderPaginationQuery {
    pub fn into_filter(self) -> Result<OrderFilter, AppError> {
        let page = PageRequest::new(
            self.page.unwrap_or(PageRequest::DEFAULT_PAGE),
            self.limit.unwrap_or(PageRequest::DEFAULT_LIMIT),
        )?;

        Ok(OrderFilter {
            status: self.status,
            page,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: OrderStatus,
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/orders", post(create_order).get(list_orders))
        .route("/v1/orders/{id}", get(get_order))
        .route("/v1/orders/{id}/status", patch(change_order_status))
}

/// POST /v1/orders
/// Price the requested lines against the catalog and store the order
async fn create_order(
    State(state): State<AppState>,
    body: Result<Json<CreateOrder>, JsonRejection>,
) -> Result<(StatusCode, Json<EnrichedOrder>), AppError> {
    let Json(req) = body.map_err(|e| AppError::ValidationError(e.body_text()))?;

    let order = state.orders.create(req).await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /v1/orders?status=&page=&limit=
/// Paginated order headers
async fn list_orders(
    State(state): State<AppState>,
    query: Result<Query<OrderPaginationQuery>, QueryRejection>,
) -> Result<Json<Page<Order>>, AppError> {
    let Query(query) = query.map_err(|e| AppError::ValidationError(e.body_text()))?;

    let page = state.orders.find_all(query.into_filter()?).await?;

    Ok(Json(page))
}

/// GET /v1/orders/{id}
/// Order with lines and current product names
async fn get_order(
    State(state): State<AppState>,
    order_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<EnrichedOrder>, AppError> {
    let Path(order_id) = order_id.map_err(|e| AppError::ValidationError(e.body_text()))?;

    let order = state.orders.find_one(order_id).await?;

    Ok(Json(order))
}

/// PATCH /v1/orders/{id}/status
async fn change_order_status(
    State(state): State<AppState>,
    order_id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<ChangeStatusRequest>, JsonRejection>,
) -> Result<Json<Order>, AppError> {
    let Path(order_id) = order_id.map_err(|e| AppError::ValidationError(e.body_text()))?;
    let Json(req) = body.map_err(|e| AppError::ValidationError(e.body_text()))?;

    let order = state.orders.change_status(order_id, req.status).await?;

    Ok(Json(order))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let filter = OrderPaginationQuery { status: None, page: None, limit: None }
            .into_filter()
            .unwrap();
        assert_eq!(filter.page, PageRequest::default());
        assert_eq!(filter.status, None);
    }

    #[test]
    fn test_zero_limit_is_a_validation_error() {
        let result = OrderPaginationQuery { status: None, page: Some(1), limit: Some(0) }.into_filter();
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }
}
