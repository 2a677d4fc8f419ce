use campus_crave_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    models::Role,
};
use uuid::Uuid;

struct Stall {
    owner: &'static str,
    phone: &'static str,
    shop_name: &'static str,
    block: &'static str,
    items: &'static [(&'static str, i64, &'static str, bool)],
}

const STALLS: &[Stall] = &[
    Stall {
        owner: "Ravi",
        phone: "9000000001",
        shop_name: "Amul Parlour",
        block: "Apartment 1",
        items: &[
            ("Cold Coffee", 60, "Beverages", true),
            ("Paneer Sandwich", 80, "Snacks", true),
            ("Chocolate Shake", 70, "Beverages", true),
        ],
    },
    Stall {
        owner: "Meena",
        phone: "9000000002",
        shop_name: "Baskin Robbins",
        block: "Apartment 2",
        items: &[
            ("Mississippi Mud", 120, "Ice Cream", true),
            ("Cotton Candy Scoop", 90, "Ice Cream", true),
        ],
    },
    Stall {
        owner: "Arjun",
        phone: "9000000003",
        shop_name: "Night Canteen",
        block: "Block C",
        items: &[
            ("Chicken Maggi", 70, "Noodles", false),
            ("Masala Dosa", 50, "South Indian", true),
        ],
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    for stall in STALLS {
        let vendor_id = ensure_vendor(&pool, stall).await?;
        seed_menu(&pool, vendor_id, stall).await?;
    }

    println!("Seed completed: {} stalls", STALLS.len());
    Ok(())
}

async fn ensure_vendor(pool: &sqlx::PgPool, stall: &Stall) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, phone_number, role, shop_name, block)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (phone_number) DO UPDATE
            SET shop_name = EXCLUDED.shop_name, block = EXCLUDED.block
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(stall.owner)
    .bind(stall.phone)
    .bind(Role::Vendor.as_str())
    .bind(stall.shop_name)
    .bind(stall.block)
    .fetch_one(pool)
    .await?;

    println!("Ensured vendor {} ({})", stall.shop_name, stall.phone);
    Ok(id)
}

async fn seed_menu(pool: &sqlx::PgPool, vendor_id: Uuid, stall: &Stall) -> anyhow::Result<()> {
    for &(name, price, category, is_veg) in stall.items {
        sqlx::query(
            r#"
            INSERT INTO menu_items (id, vendor_id, name, price, category, is_veg, location, stall_name)
            SELECT $1, $2, $3, $4, $5, $6, $7, $8
            WHERE NOT EXISTS (
                SELECT 1 FROM menu_items WHERE stall_name = $8 AND name = $3
            )
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(vendor_id)
        .bind(name)
        .bind(price)
        .bind(category)
        .bind(is_veg)
        .bind(stall.block)
        .bind(stall.shop_name)
        .execute(pool)
        .await?;
    }

    println!("Seeded menu for {}", stall.shop_name);
    Ok(())
}
