use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, Func};
use uuid::Uuid;

use crate::{
    dto::menu::{CreateMenuItemRequest, MenuItemList, UpdateMenuItemRequest},
    entity::{
        menu_items::{ActiveModel, Column, Entity as MenuItems, Model as MenuItemModel},
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        users::Entity as Users,
    },
    error::{AppError, AppResult, version_conflict},
    models::{MenuItem, Role},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_menu(
    state: &AppState,
    stall_name: Option<&str>,
) -> AppResult<ApiResponse<MenuItemList>> {
    let mut finder = MenuItems::find();
    if let Some(stall) = stall_name.map(str::trim).filter(|s| !s.is_empty()) {
        finder = finder.filter(
            Expr::expr(Func::lower(Expr::col(Column::StallName))).eq(stall.to_lowercase()),
        );
    }

    let items: Vec<MenuItem> = finder
        .order_by_asc(Column::StallName)
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(menu_item_from_entity)
        .collect();

    let count = items.len();
    Ok(ApiResponse::listed("Menu", MenuItemList { items }, count))
}

pub async fn get_menu_item(state: &AppState, id: Uuid) -> AppResult<ApiResponse<MenuItem>> {
    let item = MenuItems::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Menu item", menu_item_from_entity(item), None))
}

pub async fn create_menu_item(
    state: &AppState,
    payload: CreateMenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::ValidationFailed("name is required".into()));
    }
    check_price(payload.price)?;

    let mut stall_name = payload.stall_name.filter(|s| !s.trim().is_empty());
    let mut location = payload.location;

    if let Some(vendor_id) = payload.vendor_id {
        let vendor = Users::find_by_id(vendor_id)
            .one(&state.orm)
            .await?
            .ok_or_else(|| AppError::BadRequest("vendor not found".into()))?;
        if !vendor.role.eq_ignore_ascii_case(Role::Vendor.as_str()) {
            return Err(AppError::BadRequest("vendorId must reference a vendor".into()));
        }
        stall_name = stall_name.or(vendor.shop_name);
        location = location.or(vendor.block);
    }

    let stall_name = stall_name
        .ok_or_else(|| AppError::ValidationFailed("stallName or vendorId is required".into()))?;

    let item = ActiveModel {
        id: Set(Uuid::new_v4()),
        vendor_id: Set(payload.vendor_id),
        name: Set(payload.name),
        price: Set(payload.price),
        category: Set(payload.category),
        image_url: Set(payload.image_url),
        is_available: Set(payload.is_available.unwrap_or(true)),
        is_veg: Set(payload.is_veg.unwrap_or(true)),
        location: Set(location),
        stall_name: Set(stall_name),
        average_rating: Set(0.0),
        total_ratings: Set(0),
        version: Set(0),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(menu_item_id = %item.id, stall = %item.stall_name, "menu item created");

    Ok(ApiResponse::success(
        "Menu item created",
        menu_item_from_entity(item),
        Some(Meta::empty()),
    ))
}

pub async fn update_menu_item(
    state: &AppState,
    id: Uuid,
    payload: UpdateMenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    let existing = MenuItems::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let version = existing.version;
    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(price) = payload.price {
        check_price(price)?;
        active.price = Set(price);
    }
    if let Some(category) = payload.category {
        active.category = Set(category);
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    if let Some(is_available) = payload.is_available {
        active.is_available = Set(is_available);
    }
    if let Some(is_veg) = payload.is_veg {
        active.is_veg = Set(is_veg);
    }
    if let Some(location) = payload.location {
        active.location = Set(Some(location));
    }

    let item = save_menu_item(&state.orm, active, version).await?;

    Ok(ApiResponse::success(
        "Updated",
        menu_item_from_entity(item),
        Some(Meta::empty()),
    ))
}

pub async fn toggle_stock(state: &AppState, id: Uuid) -> AppResult<ApiResponse<MenuItem>> {
    let existing = MenuItems::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let available = !existing.is_available;
    let version = existing.version;
    let mut active: ActiveModel = existing.into();
    active.is_available = Set(available);
    let item = save_menu_item(&state.orm, active, version).await?;

    tracing::info!(menu_item_id = %item.id, available, "stock toggled");

    Ok(ApiResponse::success(
        "Stock toggled",
        menu_item_from_entity(item),
        Some(Meta::empty()),
    ))
}

pub async fn delete_menu_item(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let referenced = OrderItems::find()
        .filter(OrderItemCol::MenuItemId.eq(id))
        .count(&state.orm)
        .await?;
    if referenced > 0 {
        return Err(AppError::BadRequest(
            "menu item is referenced by existing orders".into(),
        ));
    }

    let result = MenuItems::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Highest price a menu item may carry.
pub const MAX_PRICE: i64 = 1_000_000_000;

pub fn check_price(price: i64) -> AppResult<()> {
    if !(0..=MAX_PRICE).contains(&price) {
        return Err(AppError::ValidationFailed(format!(
            "price must be between 0 and {MAX_PRICE}"
        )));
    }
    Ok(())
}

pub(crate) async fn all_menu_items(state: &AppState) -> AppResult<Vec<MenuItem>> {
    Ok(MenuItems::find()
        .order_by_asc(Column::StallName)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(menu_item_from_entity)
        .collect())
}

/// Write `active` only if the row still carries `version`.
pub(crate) async fn save_menu_item<C: ConnectionTrait>(
    conn: &C,
    mut active: ActiveModel,
    version: i32,
) -> AppResult<MenuItemModel> {
    active.version = Set(version + 1);
    MenuItems::update(active)
        .filter(Column::Version.eq(version))
        .exec(conn)
        .await
        .map_err(version_conflict)
}

pub(crate) fn menu_item_from_entity(model: MenuItemModel) -> MenuItem {
    MenuItem {
        id: model.id,
        vendor_id: model.vendor_id,
        name: model.name,
        price: model.price,
        category: model.category,
        image_url: model.image_url,
        is_available: model.is_available,
        is_veg: model.is_veg,
        location: model.location,
        stall_name: model.stall_name,
        average_rating: model.average_rating,
        total_ratings: model.total_ratings,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
