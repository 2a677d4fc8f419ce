mod common;

use campus_crave_api::{
    dto::{
        auth::VerifyOtpRequest,
        menu::CreateMenuItemRequest,
        orders::{CreateOrderItem, CreateOrderRequest, RateOrderRequest},
        shop::ToggleShopRequest,
    },
    error::AppError,
    models::{OrderStatus, Role},
    routes::params::MyOrdersQuery,
    services::{
        auth_service, menu_service, menu_service::MAX_PRICE, order_service, shop_service,
    },
};
use uuid::Uuid;

// Vendor registers, lists an item, a student orders it, the kitchen moves it
// through to pickup, the student rates it and the dashboards reflect it.
#[tokio::test]
async fn order_lifecycle_flow() -> anyhow::Result<()> {
    let Some(state) = common::test_state().await? else {
        return Ok(());
    };

    // Vendor signs up through the OTP flow.
    state.otp.insert("9000000001", "1234".into());
    let vendor = auth_service::verify_otp(
        &state,
        VerifyOtpRequest {
            phone_number: "9000000001".into(),
            otp: "1234".into(),
            role: Some("vendor".into()),
            name: Some("Ravi".into()),
            shop_name: Some("Amul Parlour".into()),
            block: Some("Apartment 1".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(vendor.role, Role::Vendor);

    // Same phone through the student app is refused.
    state.otp.insert("9000000001", "5678".into());
    let mismatch = auth_service::verify_otp(
        &state,
        VerifyOtpRequest {
            phone_number: "9000000001".into(),
            otp: "5678".into(),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(mismatch, Err(AppError::RoleMismatch(_))));

    let bad_otp = auth_service::verify_otp(
        &state,
        VerifyOtpRequest {
            phone_number: "9000000001".into(),
            otp: "0000".into(),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(bad_otp, Err(AppError::InvalidOtp)));

    // An unknown role is refused without using up the code.
    state.otp.insert("9000000002", "4321".into());
    let bad_role = auth_service::verify_otp(
        &state,
        VerifyOtpRequest {
            phone_number: "9000000002".into(),
            otp: "4321".into(),
            role: Some("chef".into()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(bad_role, Err(AppError::BadRequest(_))));
    let student = auth_service::verify_otp(
        &state,
        VerifyOtpRequest {
            phone_number: "9000000002".into(),
            otp: "4321".into(),
            role: Some("student".into()),
            name: Some("Asha".into()),
            registration_number: Some("21BCE0001".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(student.role, Role::Student);

    // Stall and location come from the vendor profile.
    let coffee = menu_service::create_menu_item(
        &state,
        CreateMenuItemRequest {
            vendor_id: Some(vendor.id),
            name: "Cold Coffee".into(),
            price: 60,
            category: "Beverages".into(),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(coffee.stall_name, "Amul Parlour");
    assert_eq!(coffee.location.as_deref(), Some("Apartment 1"));
    assert!(coffee.is_available);

    let pricey = menu_service::create_menu_item(
        &state,
        CreateMenuItemRequest {
            vendor_id: Some(vendor.id),
            name: "Gold Leaf Shake".into(),
            price: MAX_PRICE + 1,
            category: "Beverages".into(),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(pricey, Err(AppError::ValidationFailed(_))));

    let empty = order_service::create_order(
        &state,
        CreateOrderRequest {
            student_id: "21BCE0001".into(),
            total_amount: 0,
            items: vec![],
        },
    )
    .await;
    assert!(matches!(empty, Err(AppError::BadRequest(_))));

    let unknown = order_service::create_order(
        &state,
        CreateOrderRequest {
            student_id: "21BCE0001".into(),
            total_amount: 60,
            items: vec![CreateOrderItem {
                menu_item_id: Uuid::new_v4(),
                quantity: 1,
            }],
        },
    )
    .await;
    assert!(matches!(unknown, Err(AppError::NotFound)));

    let placed = order_service::create_order(
        &state,
        CreateOrderRequest {
            student_id: "21BCE0001".into(),
            // Client-supplied; dashboards recompute from menu prices.
            total_amount: 500,
            items: vec![CreateOrderItem {
                menu_item_id: coffee.id,
                quantity: 2,
            }],
        },
    )
    .await?
    .data
    .unwrap();
    let order_id = placed.order.id;
    assert_eq!(placed.order.status, OrderStatus::Pending);
    assert_eq!(placed.order.pickup_code.len(), 4);
    assert_eq!(placed.items.len(), 1);

    let live = order_service::live_orders(&state, Some("amul parlour")).await;
    let live = live.data.unwrap().items;
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].order.total_amount, 120);

    // Projection is presentation only.
    let stored = order_service::get_order(&state, order_id).await?.data.unwrap();
    assert_eq!(stored.order.total_amount, 500);
    assert!(
        order_service::live_orders(&state, None).await.data.unwrap().items.is_empty()
    );

    let wait = order_service::wait_time(&state).await?.data.unwrap();
    assert_eq!(wait.active_orders, 1);
    assert_eq!(wait.minutes, 10);

    // COMPLETED only through pickup verification.
    let skip = order_service::update_status(&state, order_id, OrderStatus::Completed, None).await;
    assert!(matches!(skip, Err(AppError::InvalidTransition)));

    let early = order_service::verify_pickup(&state, order_id, &placed.order.pickup_code).await;
    assert!(matches!(early, Err(AppError::NotReady)));

    let accepted = order_service::update_status(&state, order_id, OrderStatus::Accepted, None)
        .await?
        .data
        .unwrap();
    assert!(accepted.accepted_at.is_some());
    order_service::update_status(&state, order_id, OrderStatus::Cooking, None).await?;
    let ready = order_service::update_status(&state, order_id, OrderStatus::Ready, None)
        .await?
        .data
        .unwrap();
    assert_eq!(ready.accepted_at, accepted.accepted_at);
    assert!(ready.ready_at.is_some());

    let wrong_code = if placed.order.pickup_code == "0000" { "1111" } else { "0000" };
    let mismatch = order_service::verify_pickup(&state, order_id, wrong_code).await;
    assert!(matches!(mismatch, Err(AppError::CodeMismatch)));

    let done = order_service::verify_pickup(&state, order_id, &placed.order.pickup_code)
        .await?
        .data
        .unwrap();
    assert_eq!(done.status, OrderStatus::Completed);
    assert!(done.completed_at.is_some());

    let out_of_range = order_service::rate_order(
        &state,
        order_id,
        RateOrderRequest {
            rating: 9,
            review: None,
        },
    )
    .await;
    assert!(matches!(out_of_range, Err(AppError::ValidationFailed(_))));

    let rated = order_service::rate_order(
        &state,
        order_id,
        RateOrderRequest {
            rating: 4,
            review: Some("Nice and cold".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(rated.order.rating, Some(4));
    assert_eq!(rated.items[0].menu_item.total_ratings, 1);
    assert!((rated.items[0].menu_item.average_rating - 4.0).abs() < f64::EPSILON);

    let history = order_service::order_history(&state, Some("Amul Parlour")).await;
    assert_eq!(history.data.unwrap().items.len(), 1);

    let stats = order_service::order_stats(&state, Some("Amul Parlour"))
        .await
        .data
        .unwrap();
    assert_eq!(stats.total_revenue, 120);
    assert_eq!(stats.total_orders, 1);
    assert_eq!(stats.top_item.as_deref(), Some("Cold Coffee"));

    let mine = order_service::my_orders(
        &state,
        MyOrdersQuery {
            student_id: "9999999999".into(),
            alt_id: Some("21BCE0001".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(mine.items.len(), 1);

    let out = menu_service::toggle_stock(&state, coffee.id).await?.data.unwrap();
    assert!(!out.is_available);
    let back = menu_service::toggle_stock(&state, coffee.id).await?.data.unwrap();
    assert!(back.is_available);

    // Shop toggling.
    let status = shop_service::shop_status(&state, Some("Amul Parlour")).await?;
    assert!(status.data.unwrap().is_open);
    let toggled = shop_service::toggle_shop(
        &state,
        ToggleShopRequest {
            stall_name: Some("Amul Parlour".into()),
        },
    )
    .await?;
    assert!(!toggled.data.unwrap().is_open);

    // Items on existing orders can't be deleted.
    let delete = menu_service::delete_menu_item(&state, coffee.id).await;
    assert!(matches!(delete, Err(AppError::BadRequest(_))));

    Ok(())
}
