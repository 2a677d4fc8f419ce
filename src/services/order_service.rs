use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::orders::{CreateOrderRequest, OrderList, OrderStats, OrderWithItems, RateOrderRequest, WaitTime},
    entity::{
        menu_items::{ActiveModel as MenuItemActive, Column as MenuCol, Entity as MenuItems, Model as MenuItemModel},
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
    },
    error::{AppError, AppResult, version_conflict},
    lifecycle::{self, Stamps},
    models::{Order, OrderItem, OrderStatus},
    response::{ApiResponse, Meta},
    routes::params::MyOrdersQuery,
    services::menu_service::{menu_item_from_entity, save_menu_item},
    state::AppState,
};

pub async fn create_order(
    state: &AppState,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    if payload.student_id.trim().is_empty() {
        return Err(AppError::BadRequest("studentId is required".into()));
    }
    if payload.items.is_empty() {
        return Err(AppError::BadRequest("Order has no items".into()));
    }
    if payload.items.iter().any(|item| item.quantity <= 0) {
        return Err(AppError::BadRequest("quantity must be greater than 0".into()));
    }

    let txn = state.orm.begin().await?;

    let mut menu_ids: Vec<Uuid> = payload.items.iter().map(|item| item.menu_item_id).collect();
    menu_ids.sort();
    menu_ids.dedup();
    let found = MenuItems::find()
        .filter(MenuCol::Id.is_in(menu_ids.clone()))
        .count(&txn)
        .await?;
    if found != menu_ids.len() as u64 {
        return Err(AppError::NotFound);
    }

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        student_id: Set(payload.student_id),
        total_amount: Set(payload.total_amount),
        status: Set(OrderStatus::Pending.as_str().into()),
        pickup_code: Set(lifecycle::generate_pickup_code()),
        rating: Set(None),
        review: Set(None),
        created_at: Set(Utc::now().into()),
        accepted_at: Set(None),
        ready_at: Set(None),
        completed_at: Set(None),
        version: Set(0),
    }
    .insert(&txn)
    .await?;

    for item in &payload.items {
        OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            menu_item_id: Set(item.menu_item_id),
            quantity: Set(item.quantity),
        }
        .insert(&txn)
        .await?;
    }

    let data = load_one(&txn, order).await?;
    txn.commit().await?;

    tracing::info!(
        order_id = %data.order.id,
        student_id = %data.order.student_id,
        lines = data.items.len(),
        "order created"
    );

    Ok(ApiResponse::success("Order created", data, Some(Meta::empty())))
}

pub async fn get_order(state: &AppState, id: Uuid) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = find_order(&state.orm, id).await?;
    let data = load_one(&state.orm, order).await?;
    Ok(ApiResponse::success("OK", data, Some(Meta::empty())))
}

pub async fn update_status(
    state: &AppState,
    id: Uuid,
    status: OrderStatus,
    expected_version: Option<i32>,
) -> AppResult<ApiResponse<Order>> {
    let existing = find_order(&state.orm, id).await?;
    if expected_version.is_some_and(|v| v != existing.version) {
        return Err(AppError::Conflict);
    }
    let current = Stamps {
        accepted_at: existing.accepted_at.map(|dt| dt.with_timezone(&Utc)),
        ready_at: existing.ready_at.map(|dt| dt.with_timezone(&Utc)),
    };
    let stamps = lifecycle::plan_transition(status, current, Utc::now())?;

    let version = existing.version;
    let mut active: OrderActive = existing.into();
    active.status = Set(status.as_str().into());
    active.accepted_at = Set(stamps.accepted_at.map(Into::into));
    active.ready_at = Set(stamps.ready_at.map(Into::into));
    let order = save_order(&state.orm, active, version).await?;

    tracing::info!(order_id = %order.id, status = %status, "order status updated");

    Ok(ApiResponse::success(
        "Order updated",
        order_from_entity(order)?,
        Some(Meta::empty()),
    ))
}

pub async fn verify_pickup(
    state: &AppState,
    id: Uuid,
    code: &str,
) -> AppResult<ApiResponse<Order>> {
    let existing = find_order(&state.orm, id).await?;
    lifecycle::check_pickup(parse_status(&existing)?, &existing.pickup_code, code)?;

    let version = existing.version;
    let mut active: OrderActive = existing.into();
    active.status = Set(OrderStatus::Completed.as_str().into());
    active.completed_at = Set(Some(Utc::now().into()));
    let order = save_order(&state.orm, active, version).await?;

    tracing::info!(order_id = %order.id, "order picked up");

    Ok(ApiResponse::success(
        "Pickup verified",
        order_from_entity(order)?,
        Some(Meta::empty()),
    ))
}

pub async fn rate_order(
    state: &AppState,
    id: Uuid,
    payload: RateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let txn = state.orm.begin().await?;

    let existing = find_order(&txn, id).await?;
    lifecycle::check_rateable(parse_status(&existing)?, payload.rating)?;

    let version = existing.version;
    let mut active: OrderActive = existing.into();
    active.rating = Set(Some(payload.rating));
    active.review = Set(payload.review);
    let order = save_order(&txn, active, version).await?;

    let lines = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&txn)
        .await?;

    // One increment per line, so an item listed twice is counted twice.
    let mut touched: HashMap<Uuid, MenuItemModel> = HashMap::new();
    for line in &lines {
        let menu_item = match touched.remove(&line.menu_item_id) {
            Some(item) => item,
            None => MenuItems::find_by_id(line.menu_item_id)
                .one(&txn)
                .await?
                .ok_or(AppError::NotFound)?,
        };
        let (average, count) = lifecycle::incremental_mean(
            menu_item.average_rating,
            menu_item.total_ratings,
            payload.rating,
        );
        let version = menu_item.version;
        let mut active: MenuItemActive = menu_item.into();
        active.average_rating = Set(average);
        active.total_ratings = Set(count);
        let updated = save_menu_item(&txn, active, version).await?;
        touched.insert(updated.id, updated);
    }

    let data = load_one(&txn, order).await?;
    txn.commit().await?;

    tracing::info!(order_id = %data.order.id, rating = payload.rating, "order rated");

    Ok(ApiResponse::success("Order rated", data, Some(Meta::empty())))
}

pub async fn my_orders(state: &AppState, query: MyOrdersQuery) -> AppResult<ApiResponse<OrderList>> {
    let ids: Vec<String> = [Some(query.student_id), query.alt_id]
        .into_iter()
        .flatten()
        .filter(|id| !id.is_empty())
        .collect();

    if ids.is_empty() {
        return Ok(ApiResponse::listed("Ok", OrderList { items: Vec::new() }, 0));
    }

    let orders = Orders::find()
        .filter(OrderCol::StudentId.is_in(ids))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?;
    let items = load_with_items(&state.orm, orders).await?;

    let count = items.len();
    Ok(ApiResponse::listed("Ok", OrderList { items }, count))
}

pub async fn live_orders(state: &AppState, stall: Option<&str>) -> ApiResponse<OrderList> {
    let items = stall_view(state, &OrderStatus::LIVE, stall).await;
    let count = items.len();
    ApiResponse::listed("Live orders", OrderList { items }, count)
}

pub async fn order_history(state: &AppState, stall: Option<&str>) -> ApiResponse<OrderList> {
    let items = stall_view(state, &OrderStatus::HISTORY, stall).await;
    let count = items.len();
    ApiResponse::listed("Order history", OrderList { items }, count)
}

pub async fn order_stats(state: &AppState, stall: Option<&str>) -> ApiResponse<OrderStats> {
    let completed = stall_view(state, &[OrderStatus::Completed], stall).await;
    let stats = lifecycle::summarize_stats(&completed).unwrap_or_else(|err| {
        tracing::error!(error = %err, "stall stats failed");
        OrderStats::default()
    });
    ApiResponse::success("Order stats", stats, Some(Meta::empty()))
}

pub async fn wait_time(state: &AppState) -> AppResult<ApiResponse<WaitTime>> {
    let active = Orders::find()
        .filter(OrderCol::Status.is_in(OrderStatus::QUEUED.map(|s| s.as_str())))
        .count(&state.orm)
        .await?;
    Ok(ApiResponse::success(
        "Wait time",
        lifecycle::estimate_wait(active),
        Some(Meta::empty()),
    ))
}

pub(crate) async fn all_orders(state: &AppState) -> AppResult<Vec<OrderWithItems>> {
    let orders = Orders::find()
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?;
    load_with_items(&state.orm, orders).await
}

/// Dashboards stay up when the projection fails: the error is logged and an
/// empty list is returned.
async fn stall_view(
    state: &AppState,
    statuses: &[OrderStatus],
    stall: Option<&str>,
) -> Vec<OrderWithItems> {
    let Some(stall) = stall.map(str::trim).filter(|s| !s.is_empty()) else {
        tracing::debug!("no stall name given, returning empty list");
        return Vec::new();
    };

    let view = orders_for_stall(state, statuses, stall)
        .await
        .and_then(|orders| lifecycle::project_for_stall(orders, stall));
    match view {
        Ok(orders) => orders,
        Err(err) => {
            tracing::error!(error = %err, stall = %stall, "stall order view failed");
            Vec::new()
        }
    }
}

async fn orders_for_stall(
    state: &AppState,
    statuses: &[OrderStatus],
    stall: &str,
) -> AppResult<Vec<OrderWithItems>> {
    let order_ids = order_ids_for_stall(&state.pool, stall).await?;
    if order_ids.is_empty() {
        return Ok(Vec::new());
    }

    let orders = Orders::find()
        .filter(OrderCol::Id.is_in(order_ids))
        .filter(OrderCol::Status.is_in(statuses.iter().map(|s| s.as_str())))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?;
    load_with_items(&state.orm, orders).await
}

async fn order_ids_for_stall(pool: &DbPool, stall: &str) -> AppResult<Vec<Uuid>> {
    let rows: Vec<(Uuid,)> = sqlx::query_as(
        r#"
        SELECT DISTINCT oi.order_id
        FROM order_items oi
        JOIN menu_items m ON m.id = oi.menu_item_id
        WHERE LOWER(m.stall_name) = LOWER($1)
        "#,
    )
    .bind(stall)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

async fn find_order<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<OrderModel> {
    Orders::find_by_id(id).one(conn).await?.ok_or(AppError::NotFound)
}

async fn load_one<C: ConnectionTrait>(conn: &C, order: OrderModel) -> AppResult<OrderWithItems> {
    load_with_items(conn, vec![order])
        .await?
        .pop()
        .ok_or(AppError::NotFound)
}

/// Attach line items and their menu items, keeping the order of `orders`.
pub(crate) async fn load_with_items<C: ConnectionTrait>(
    conn: &C,
    orders: Vec<OrderModel>,
) -> AppResult<Vec<OrderWithItems>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let lines = OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids))
        .all(conn)
        .await?;

    let menu_ids: Vec<Uuid> = lines.iter().map(|l| l.menu_item_id).collect();
    let menu: HashMap<Uuid, MenuItemModel> = if menu_ids.is_empty() {
        HashMap::new()
    } else {
        MenuItems::find()
            .filter(MenuCol::Id.is_in(menu_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect()
    };

    let mut by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for line in lines {
        let menu_item = menu.get(&line.menu_item_id).cloned().ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "order item {} references missing menu item {}",
                line.id,
                line.menu_item_id
            ))
        })?;
        by_order.entry(line.order_id).or_default().push(OrderItem {
            id: line.id,
            quantity: line.quantity,
            menu_item: menu_item_from_entity(menu_item),
        });
    }

    orders
        .into_iter()
        .map(|order| {
            let items = by_order.remove(&order.id).unwrap_or_default();
            Ok(OrderWithItems {
                order: order_from_entity(order)?,
                items,
            })
        })
        .collect()
}

/// Write `active` only if the row still carries `version`.
async fn save_order<C: ConnectionTrait>(
    conn: &C,
    mut active: OrderActive,
    version: i32,
) -> AppResult<OrderModel> {
    active.version = Set(version + 1);
    Orders::update(active)
        .filter(OrderCol::Version.eq(version))
        .exec(conn)
        .await
        .map_err(version_conflict)
}

fn parse_status(model: &OrderModel) -> AppResult<OrderStatus> {
    model
        .status
        .parse()
        .map_err(|e: String| AppError::Internal(anyhow::anyhow!(e)))
}

pub(crate) fn order_from_entity(model: OrderModel) -> AppResult<Order> {
    let status = parse_status(&model)?;
    Ok(Order {
        id: model.id,
        student_id: model.student_id,
        total_amount: model.total_amount,
        status,
        pickup_code: model.pickup_code,
        rating: model.rating,
        review: model.review,
        created_at: model.created_at.with_timezone(&Utc),
        accepted_at: model.accepted_at.map(|dt| dt.with_timezone(&Utc)),
        ready_at: model.ready_at.map(|dt| dt.with_timezone(&Utc)),
        completed_at: model.completed_at.map(|dt| dt.with_timezone(&Utc)),
        version: model.version,
    })
}
