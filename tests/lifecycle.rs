use campus_crave_api::{
    dto::orders::{OrderWithItems, Traffic},
    error::AppError,
    lifecycle::{
        Stamps, check_pickup, check_rateable, estimate_wait, generate_pickup_code,
        incremental_mean, plan_transition, project_for_stall, summarize_stats,
    },
    models::{MenuItem, Order, OrderItem, OrderStatus},
};
use chrono::{Duration, Utc};
use uuid::Uuid;

fn menu_item(name: &str, stall: &str, price: i64) -> MenuItem {
    MenuItem {
        id: Uuid::new_v4(),
        vendor_id: None,
        name: name.into(),
        price,
        category: "Snacks".into(),
        image_url: None,
        is_available: true,
        is_veg: true,
        location: None,
        stall_name: stall.into(),
        average_rating: 0.0,
        total_ratings: 0,
        created_at: Utc::now(),
    }
}

fn order_with(lines: Vec<(MenuItem, i32)>, total_amount: i64) -> OrderWithItems {
    OrderWithItems {
        order: Order {
            id: Uuid::new_v4(),
            student_id: "21BCE0001".into(),
            total_amount,
            status: OrderStatus::Completed,
            pickup_code: "0042".into(),
            rating: None,
            review: None,
            created_at: Utc::now(),
            accepted_at: None,
            ready_at: None,
            completed_at: None,
            version: 0,
        },
        items: lines
            .into_iter()
            .map(|(menu_item, quantity)| OrderItem {
                id: Uuid::new_v4(),
                quantity,
                menu_item,
            })
            .collect(),
    }
}

#[test]
fn pickup_codes_are_four_digits() {
    for _ in 0..100 {
        let code = generate_pickup_code();
        assert_eq!(code.len(), 4);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }
}

#[test]
fn completed_is_not_a_kitchen_transition() {
    let err = plan_transition(OrderStatus::Completed, Stamps::default(), Utc::now()).unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition));
}

#[test]
fn first_accept_and_ready_are_stamped_once() {
    let t0 = Utc::now();
    let accepted = plan_transition(OrderStatus::Accepted, Stamps::default(), t0).unwrap();
    assert_eq!(accepted.accepted_at, Some(t0));
    assert_eq!(accepted.ready_at, None);

    let t1 = t0 + Duration::minutes(3);
    let cooking = plan_transition(OrderStatus::Cooking, accepted, t1).unwrap();
    assert_eq!(cooking, accepted);

    let t2 = t1 + Duration::minutes(5);
    let ready = plan_transition(OrderStatus::Ready, cooking, t2).unwrap();
    assert_eq!(ready.accepted_at, Some(t0));
    assert_eq!(ready.ready_at, Some(t2));

    let again = plan_transition(OrderStatus::Accepted, ready, t2 + Duration::minutes(1)).unwrap();
    assert_eq!(again.accepted_at, Some(t0));
}

#[test]
fn any_status_can_follow_a_terminal_one() {
    let stamps = plan_transition(OrderStatus::Pending, Stamps::default(), Utc::now()).unwrap();
    assert_eq!(stamps, Stamps::default());
    assert!(plan_transition(OrderStatus::Rejected, stamps, Utc::now()).is_ok());
}

#[test]
fn pickup_requires_ready_then_matching_code() {
    assert!(matches!(
        check_pickup(OrderStatus::Cooking, "1234", "1234"),
        Err(AppError::NotReady)
    ));
    assert!(matches!(
        check_pickup(OrderStatus::Ready, "1234", "4321"),
        Err(AppError::CodeMismatch)
    ));
    assert!(check_pickup(OrderStatus::Ready, "1234", "1234").is_ok());
}

#[test]
fn only_completed_orders_with_valid_ratings_are_rateable() {
    assert!(matches!(
        check_rateable(OrderStatus::Ready, 5),
        Err(AppError::NotCompleted)
    ));
    assert!(matches!(
        check_rateable(OrderStatus::Completed, 0),
        Err(AppError::ValidationFailed(_))
    ));
    assert!(matches!(
        check_rateable(OrderStatus::Completed, 6),
        Err(AppError::ValidationFailed(_))
    ));
    assert!(check_rateable(OrderStatus::Completed, 1).is_ok());
    assert!(check_rateable(OrderStatus::Completed, 5).is_ok());
}

#[test]
fn ratings_fold_into_running_mean() {
    assert_eq!(incremental_mean(0.0, 0, 4), (4.0, 1));
    assert_eq!(incremental_mean(4.0, 1, 5), (4.5, 2));

    let (average, count) = incremental_mean(4.0, 10, 5);
    assert_eq!(count, 11);
    assert!((average - 45.0 / 11.0).abs() < 1e-12);

    let (average, count) = incremental_mean(4.5, 2, 3);
    assert_eq!(count, 3);
    assert!((average - 4.0).abs() < f64::EPSILON);
}

#[test]
fn wait_time_scales_with_queue() {
    let quiet = estimate_wait(0);
    assert_eq!(quiet.minutes, 5);
    assert_eq!(quiet.traffic, Traffic::Low);

    let low = estimate_wait(3);
    assert_eq!(low.minutes, 20);
    assert_eq!(low.traffic, Traffic::Low);
    assert_eq!(low.active_orders, 3);

    assert_eq!(estimate_wait(5).traffic, Traffic::Low);
    assert_eq!(estimate_wait(7).traffic, Traffic::Moderate);
    assert_eq!(estimate_wait(10).traffic, Traffic::Moderate);

    let busy = estimate_wait(12);
    assert_eq!(busy.traffic, Traffic::Busy);
    assert_eq!(busy.minutes, 65);
}

#[test]
fn projection_keeps_only_the_stalls_lines() {
    let coffee = menu_item("Cold Coffee", "Amul Parlour", 60);
    let scoop = menu_item("Mud Pie", "Baskin Robbins", 120);

    let mixed = order_with(vec![(coffee.clone(), 2), (scoop.clone(), 1)], 999);
    let other = order_with(vec![(scoop, 3)], 360);

    let projected = project_for_stall(vec![mixed.clone(), other], "  amul PARLOUR ").unwrap();
    assert_eq!(projected.len(), 1);

    let entry = &projected[0];
    assert_eq!(entry.order.id, mixed.order.id);
    assert_eq!(entry.items.len(), 1);
    assert_eq!(entry.items[0].menu_item.name, "Cold Coffee");
    assert_eq!(entry.order.total_amount, 120);
}

#[test]
fn blank_stall_projects_to_nothing() {
    let order = order_with(vec![(menu_item("Dosa", "Canteen", 50), 1)], 50);
    assert!(project_for_stall(vec![order.clone()], "").unwrap().is_empty());
    assert!(project_for_stall(vec![order], "   ").unwrap().is_empty());
}

#[test]
fn stats_sum_revenue_and_pick_best_seller() {
    let a = menu_item("A", "Stall", 10);
    let b = menu_item("B", "Stall", 30);

    let orders = vec![
        order_with(vec![(a.clone(), 2), (b, 1)], 50),
        order_with(vec![(a, 1)], 10),
    ];
    let stats = summarize_stats(&orders).unwrap();
    assert_eq!(stats.total_revenue, 60);
    assert_eq!(stats.total_orders, 2);
    assert_eq!(stats.top_item.as_deref(), Some("A"));
}

#[test]
fn stats_tie_goes_to_first_seen_item() {
    let first = menu_item("First", "Stall", 10);
    let second = menu_item("Second", "Stall", 10);
    let orders = vec![order_with(vec![(first, 2), (second, 2)], 40)];
    assert_eq!(summarize_stats(&orders).unwrap().top_item.as_deref(), Some("First"));
}

#[test]
fn stats_on_no_orders_have_no_top_item() {
    let stats = summarize_stats(&[]).unwrap();
    assert_eq!(stats.total_revenue, 0);
    assert_eq!(stats.total_orders, 0);
    assert!(stats.top_item.is_none());

    let json = serde_json::to_value(&stats).unwrap();
    assert!(json["topItem"].is_null());
}

#[test]
fn projection_overflow_is_an_error() {
    let huge = menu_item("Gold Leaf", "Stall", i64::MAX / 2);
    let order = order_with(vec![(huge, 3)], 1);

    let result = project_for_stall(vec![order], "stall");
    assert!(matches!(result, Err(AppError::Internal(_))));
}

#[test]
fn revenue_overflow_is_an_error() {
    let item = menu_item("A", "Stall", 1);
    let orders = vec![
        order_with(vec![(item.clone(), 1)], i64::MAX),
        order_with(vec![(item, 1)], 1),
    ];
    assert!(matches!(summarize_stats(&orders), Err(AppError::Internal(_))));
}

#[test]
fn order_fields_serialize_beside_items() {
    let order = order_with(vec![(menu_item("Dosa", "Canteen", 50), 2)], 100);
    let json = serde_json::to_value(&order).unwrap();

    assert!(json.get("order").is_none());
    assert_eq!(json["id"], serde_json::json!(order.order.id));
    assert_eq!(json["totalAmount"], 100);
    assert_eq!(json["status"], "COMPLETED");
    assert_eq!(json["items"][0]["quantity"], 2);
    assert_eq!(json["items"][0]["menuItem"]["name"], "Dosa");
}
