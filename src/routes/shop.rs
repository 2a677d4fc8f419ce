use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};

use crate::{
    dto::{
        menu::MenuItemList,
        orders::OrderList,
        shop::{ShopStatus, ToggleShopRequest},
        users::UserList,
    },
    error::AppResult,
    response::ApiResponse,
    routes::params::StallQuery,
    services::shop_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(shop_status))
        .route("/toggle", post(toggle_shop))
        .route("/all-orders", get(all_orders))
        .route("/users", get(all_users))
        .route("/menu", get(all_menu))
}

#[utoipa::path(
    get,
    path = "/shop/status",
    params(StallQuery),
    responses((status = 200, description = "Whether the stall is open", body = ApiResponse<ShopStatus>)),
    tag = "Shop"
)]
pub async fn shop_status(
    State(state): State<AppState>,
    Query(query): Query<StallQuery>,
) -> AppResult<Json<ApiResponse<ShopStatus>>> {
    let resp = shop_service::shop_status(&state, query.stall_name.as_deref()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/shop/toggle",
    request_body = ToggleShopRequest,
    responses((status = 200, description = "New open state", body = ApiResponse<ShopStatus>)),
    tag = "Shop"
)]
pub async fn toggle_shop(
    State(state): State<AppState>,
    Json(payload): Json<ToggleShopRequest>,
) -> AppResult<Json<ApiResponse<ShopStatus>>> {
    let resp = shop_service::toggle_shop(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/shop/all-orders",
    responses((status = 200, description = "Every order", body = ApiResponse<OrderList>)),
    tag = "Shop"
)]
pub async fn all_orders(State(state): State<AppState>) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = shop_service::all_orders(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/shop/users",
    responses((status = 200, description = "Every user", body = ApiResponse<UserList>)),
    tag = "Shop"
)]
pub async fn all_users(State(state): State<AppState>) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = shop_service::all_users(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/shop/menu",
    responses((status = 200, description = "Every menu item", body = ApiResponse<MenuItemList>)),
    tag = "Shop"
)]
pub async fn all_menu(State(state): State<AppState>) -> AppResult<Json<ApiResponse<MenuItemList>>> {
    let resp = shop_service::all_menu(&state).await?;
    Ok(Json(resp))
}
