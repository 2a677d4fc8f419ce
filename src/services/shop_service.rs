use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

use crate::{
    dto::{
        menu::MenuItemList,
        orders::OrderList,
        shop::{ShopStatus, ToggleShopRequest},
        users::UserList,
    },
    entity::users::{ActiveModel, Column, Entity as Users, Model as UserModel},
    error::AppResult,
    response::{ApiResponse, Meta},
    services::{menu_service, order_service, user_service},
    state::AppState,
};

/// Open state of the stall called `stall_name`. Unknown stalls count as open.
pub async fn shop_status(
    state: &AppState,
    stall_name: Option<&str>,
) -> AppResult<ApiResponse<ShopStatus>> {
    let is_open = match stall_name.filter(|s| !s.is_empty()) {
        Some(stall) => find_shop(state, stall)
            .await?
            .is_none_or(|owner| owner.is_open),
        None => true,
    };
    Ok(ApiResponse::success("Shop status", ShopStatus { is_open }, None))
}

/// Flip the stall between open and closed. Unknown stalls report closed.
pub async fn toggle_shop(
    state: &AppState,
    payload: ToggleShopRequest,
) -> AppResult<ApiResponse<ShopStatus>> {
    let owner = match payload.stall_name.as_deref() {
        Some(stall) => find_shop(state, stall).await?,
        None => None,
    };
    let Some(owner) = owner else {
        return Ok(ApiResponse::success("Shop not found", ShopStatus { is_open: false }, None));
    };

    let is_open = !owner.is_open;
    let mut active: ActiveModel = owner.into();
    active.is_open = Set(is_open);
    let owner = active.update(&state.orm).await?;

    tracing::info!(shop = ?owner.shop_name, is_open, "shop toggled");

    Ok(ApiResponse::success(
        "Shop toggled",
        ShopStatus { is_open },
        Some(Meta::empty()),
    ))
}

pub async fn all_orders(state: &AppState) -> AppResult<ApiResponse<OrderList>> {
    let items = order_service::all_orders(state).await?;
    let count = items.len();
    Ok(ApiResponse::listed("Orders", OrderList { items }, count))
}

pub async fn all_users(state: &AppState) -> AppResult<ApiResponse<UserList>> {
    let items = user_service::all_users(state).await?;
    let count = items.len();
    Ok(ApiResponse::listed("Users", UserList { items }, count))
}

pub async fn all_menu(state: &AppState) -> AppResult<ApiResponse<MenuItemList>> {
    let items = menu_service::all_menu_items(state).await?;
    let count = items.len();
    Ok(ApiResponse::listed("Menu", MenuItemList { items }, count))
}

async fn find_shop(state: &AppState, stall_name: &str) -> AppResult<Option<UserModel>> {
    Ok(Users::find()
        .filter(Column::ShopName.eq(stall_name))
        .one(&state.orm)
        .await?)
}
