use campus_crave_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::menu::CreateMenuItemRequest,
    models::MenuItem,
    otp::OtpStore,
    services::menu_service,
    state::AppState,
};
use sea_orm::{ConnectionTrait, Statement};
use std::time::Duration;

/// Fresh state on an emptied database, or `None` when no database is configured.
pub async fn test_state() -> anyhow::Result<Option<AppState>> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url).await?;
    run_migrations(&pool).await?;
    let orm = create_orm_conn(&pool);

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, menu_items, users CASCADE",
    ))
    .await?;

    Ok(Some(AppState {
        pool,
        orm,
        otp: OtpStore::new(Duration::from_secs(60)),
        upload_dir: std::env::temp_dir().join("crave-test-uploads"),
    }))
}

#[allow(dead_code)]
pub async fn add_menu_item(
    state: &AppState,
    stall: &str,
    name: &str,
    price: i64,
) -> anyhow::Result<MenuItem> {
    let resp = menu_service::create_menu_item(
        state,
        CreateMenuItemRequest {
            name: name.into(),
            price,
            category: "Snacks".into(),
            stall_name: Some(stall.into()),
            ..Default::default()
        },
    )
    .await?;
    Ok(resp.data.expect("menu item"))
}
