use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{CreateOrderRequest, OrderList, OrderStats, OrderWithItems, RateOrderRequest, WaitTime},
    error::AppResult,
    models::Order,
    response::ApiResponse,
    routes::params::{MyOrdersQuery, PickupQuery, StallQuery, StatusQuery},
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order))
        .route("/live", get(live_orders))
        .route("/history", get(order_history))
        .route("/my-orders", get(my_orders))
        .route("/wait-time", get(wait_time))
        .route("/stats", get(order_stats))
        .route("/{id}", get(get_order))
        .route("/{id}/status", patch(update_status))
        .route("/{id}/verify-pickup", post(verify_pickup))
        .route("/{id}/rate", post(rate_order))
}

#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order placed with a pickup code", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Empty order or bad quantity"),
        (status = 404, description = "Unknown menu item"),
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::create_order(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with its items", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::get_order(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order ID"), StatusQuery),
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<Order>),
        (status = 400, description = "COMPLETED must go through verify-pickup"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Order changed concurrently"),
    ),
    tag = "Orders"
)]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<StatusQuery>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::update_status(&state, id, query.status, query.version).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/orders/{id}/verify-pickup",
    params(("id" = Uuid, Path, description = "Order ID"), PickupQuery),
    responses(
        (status = 200, description = "Order completed", body = ApiResponse<Order>),
        (status = 400, description = "Order not ready or wrong code"),
        (status = 404, description = "Not Found"),
    ),
    tag = "Orders"
)]
pub async fn verify_pickup(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PickupQuery>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::verify_pickup(&state, id, &query.code).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/orders/{id}/rate",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = RateOrderRequest,
    responses(
        (status = 200, description = "Rating stored and menu averages updated", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Order not completed"),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Rating out of range"),
    ),
    tag = "Orders"
)]
pub async fn rate_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RateOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::rate_order(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/orders/live",
    params(StallQuery),
    responses(
        (status = 200, description = "Active orders for the stall", body = ApiResponse<OrderList>)
    ),
    tag = "Orders"
)]
pub async fn live_orders(
    State(state): State<AppState>,
    Query(query): Query<StallQuery>,
) -> Json<ApiResponse<OrderList>> {
    Json(order_service::live_orders(&state, query.stall_name.as_deref()).await)
}

#[utoipa::path(
    get,
    path = "/orders/history",
    params(StallQuery),
    responses(
        (status = 200, description = "Completed and rejected orders for the stall", body = ApiResponse<OrderList>)
    ),
    tag = "Orders"
)]
pub async fn order_history(
    State(state): State<AppState>,
    Query(query): Query<StallQuery>,
) -> Json<ApiResponse<OrderList>> {
    Json(order_service::order_history(&state, query.stall_name.as_deref()).await)
}

#[utoipa::path(
    get,
    path = "/orders/my-orders",
    params(MyOrdersQuery),
    responses(
        (status = 200, description = "Orders placed by the student", body = ApiResponse<OrderList>)
    ),
    tag = "Orders"
)]
pub async fn my_orders(
    State(state): State<AppState>,
    Query(query): Query<MyOrdersQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::my_orders(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/orders/wait-time",
    responses(
        (status = 200, description = "Estimated kitchen wait", body = ApiResponse<WaitTime>)
    ),
    tag = "Orders"
)]
pub async fn wait_time(State(state): State<AppState>) -> AppResult<Json<ApiResponse<WaitTime>>> {
    let resp = order_service::wait_time(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/orders/stats",
    params(StallQuery),
    responses(
        (status = 200, description = "Revenue and best seller for the stall", body = ApiResponse<OrderStats>)
    ),
    tag = "Orders"
)]
pub async fn order_stats(
    State(state): State<AppState>,
    Query(query): Query<StallQuery>,
) -> Json<ApiResponse<OrderStats>> {
    Json(order_service::order_stats(&state, query.stall_name.as_deref()).await)
}
