//! Order lifecycle rules that don't touch storage.
//!
//! Services load rows, ask these functions what to do, and persist the result.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::{
    dto::orders::{OrderStats, OrderWithItems, Traffic, WaitTime},
    error::{AppError, AppResult},
    models::OrderStatus,
};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

const MINUTES_PER_ORDER: u64 = 5;
const BASE_MINUTES: u64 = 5;

/// Random zero-padded 4-digit code. Not checked for collisions.
pub fn generate_pickup_code() -> String {
    format!("{:04}", rand::thread_rng().gen_range(0..10_000))
}

/// Timestamps touched by a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stamps {
    pub accepted_at: Option<DateTime<Utc>>,
    pub ready_at: Option<DateTime<Utc>>,
}

/// Validate a kitchen status change and work out the new timestamps.
///
/// Any status may follow any other except COMPLETED, which is only reachable
/// through pickup verification. `accepted_at` and `ready_at` are set the
/// first time their status is reached and kept afterwards.
pub fn plan_transition(target: OrderStatus, current: Stamps, now: DateTime<Utc>) -> AppResult<Stamps> {
    if target == OrderStatus::Completed {
        return Err(AppError::InvalidTransition);
    }

    let mut stamps = current;
    match target {
        OrderStatus::Accepted if stamps.accepted_at.is_none() => stamps.accepted_at = Some(now),
        OrderStatus::Ready if stamps.ready_at.is_none() => stamps.ready_at = Some(now),
        _ => {}
    }
    Ok(stamps)
}

pub fn check_pickup(status: OrderStatus, pickup_code: &str, supplied: &str) -> AppResult<()> {
    if status != OrderStatus::Ready {
        return Err(AppError::NotReady);
    }
    if pickup_code != supplied {
        return Err(AppError::CodeMismatch);
    }
    Ok(())
}

pub fn check_rateable(status: OrderStatus, rating: i32) -> AppResult<()> {
    if status != OrderStatus::Completed {
        return Err(AppError::NotCompleted);
    }
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::ValidationFailed(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }
    Ok(())
}

/// Fold one more rating into a running mean. Returns `(average, count)`.
pub fn incremental_mean(average: f64, count: i32, rating: i32) -> (f64, i32) {
    let new_count = count + 1;
    let total = average * f64::from(count) + f64::from(rating);
    (total / f64::from(new_count), new_count)
}

pub fn estimate_wait(active_orders: u64) -> WaitTime {
    let traffic = match active_orders {
        0..=5 => Traffic::Low,
        6..=10 => Traffic::Moderate,
        _ => Traffic::Busy,
    };
    WaitTime {
        minutes: active_orders * MINUTES_PER_ORDER + BASE_MINUTES,
        traffic,
        active_orders,
    }
}

fn same_stall(stall_name: &str, target: &str) -> bool {
    stall_name.to_lowercase() == target
}

/// Narrow each order down to the lines sold by `stall`.
///
/// Orders without such lines are dropped. The total of each remaining order is
/// recomputed from current menu prices. Never written back. Fails if a total
/// does not fit in an `i64`.
pub fn project_for_stall(orders: Vec<OrderWithItems>, stall: &str) -> AppResult<Vec<OrderWithItems>> {
    let target = stall.trim().to_lowercase();
    if target.is_empty() {
        return Ok(Vec::new());
    }

    let mut projected = Vec::new();
    for mut entry in orders {
        entry
            .items
            .retain(|line| same_stall(&line.menu_item.stall_name, &target));
        if entry.items.is_empty() {
            continue;
        }
        entry.order.total_amount = line_total(&entry)?;
        projected.push(entry);
    }
    Ok(projected)
}

fn line_total(entry: &OrderWithItems) -> AppResult<i64> {
    entry.items.iter().try_fold(0i64, |total, line| {
        line.menu_item
            .price
            .checked_mul(i64::from(line.quantity))
            .and_then(|amount| total.checked_add(amount))
            .ok_or_else(|| overflow(entry.order.id))
    })
}

fn overflow(order_id: uuid::Uuid) -> AppError {
    AppError::Internal(anyhow::anyhow!("amount overflow in order {order_id}"))
}

/// Revenue, order count and best seller over already projected orders.
///
/// The best seller is keyed by item name; on a tie the name seen first wins.
pub fn summarize_stats(orders: &[OrderWithItems]) -> AppResult<OrderStats> {
    let total_revenue = orders.iter().try_fold(0i64, |total, entry| {
        total
            .checked_add(entry.order.total_amount)
            .ok_or_else(|| overflow(entry.order.id))
    })?;

    let mut seen: Vec<(&str, i64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for line in orders.iter().flat_map(|entry| entry.items.iter()) {
        let name = line.menu_item.name.as_str();
        let quantity = i64::from(line.quantity);
        match index.get(name) {
            Some(&pos) => seen[pos].1 = seen[pos].1.saturating_add(quantity),
            None => {
                index.insert(name, seen.len());
                seen.push((name, quantity));
            }
        }
    }

    let mut top: Option<(&str, i64)> = None;
    for &(name, quantity) in &seen {
        if top.is_none_or(|(_, best)| quantity > best) {
            top = Some((name, quantity));
        }
    }

    Ok(OrderStats {
        total_revenue,
        total_orders: orders.len(),
        top_item: top.map(|(name, _)| name.to_string()),
    })
}
