use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{SendOtpRequest, VerifyOtpRequest},
        menu::{CreateMenuItemRequest, MenuItemList, UpdateMenuItemRequest},
        orders::{
            CreateOrderItem, CreateOrderRequest, OrderList, OrderStats, OrderWithItems,
            RateOrderRequest, Traffic, WaitTime,
        },
        shop::{ShopStatus, ToggleShopRequest},
        users::{UpdateUserRequest, UserList},
    },
    models::{MenuItem, Order, OrderItem, OrderStatus, Role, User},
    response::{ApiResponse, Meta},
    routes::{auth, health, menu, orders, params, shop, upload, users},
    services::upload_service::UploadResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::send_otp,
        auth::verify_otp,
        menu::list_menu,
        menu::get_menu_item,
        menu::create_menu_item,
        menu::update_menu_item,
        menu::toggle_stock,
        menu::delete_menu_item,
        orders::create_order,
        orders::get_order,
        orders::update_status,
        orders::verify_pickup,
        orders::rate_order,
        orders::live_orders,
        orders::order_history,
        orders::my_orders,
        orders::wait_time,
        orders::order_stats,
        shop::shop_status,
        shop::toggle_shop,
        shop::all_orders,
        shop::all_users,
        shop::all_menu,
        users::update_user,
        users::search_users,
        upload::upload_image
    ),
    components(
        schemas(
            Role,
            OrderStatus,
            User,
            MenuItem,
            Order,
            OrderItem,
            SendOtpRequest,
            VerifyOtpRequest,
            CreateMenuItemRequest,
            UpdateMenuItemRequest,
            MenuItemList,
            CreateOrderRequest,
            CreateOrderItem,
            RateOrderRequest,
            OrderWithItems,
            OrderList,
            Traffic,
            WaitTime,
            OrderStats,
            ShopStatus,
            ToggleShopRequest,
            UpdateUserRequest,
            UserList,
            UploadResponse,
            upload::UploadForm,
            health::HealthData,
            params::StallQuery,
            params::StatusQuery,
            params::PickupQuery,
            params::MyOrdersQuery,
            params::UserQuery,
            Meta,
            ApiResponse<User>,
            ApiResponse<MenuItem>,
            ApiResponse<MenuItemList>,
            ApiResponse<Order>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<OrderStats>,
            ApiResponse<WaitTime>,
            ApiResponse<ShopStatus>,
            ApiResponse<UserList>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Phone OTP login and registration"),
        (name = "Menu", description = "Menu catalog endpoints"),
        (name = "Orders", description = "Order lifecycle and stall dashboards"),
        (name = "Shop", description = "Stall open state and admin listings"),
        (name = "Users", description = "User profile endpoints"),
        (name = "Upload", description = "Image upload"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
