use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    dto::users::{UpdateUserRequest, UserList},
    entity::users::{ActiveModel, Column, Entity as Users, Model as UserModel},
    error::{AppError, AppResult},
    models::{Role, User},
    response::{ApiResponse, Meta},
    routes::params::UserQuery,
    state::AppState,
};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    phone_number: String,
    role: String,
    registration_number: Option<String>,
    shop_name: Option<String>,
    block: Option<String>,
    is_open: bool,
    created_at: chrono::DateTime<Utc>,
}

pub async fn update_user(
    state: &AppState,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    let existing = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(shop_name) = payload.shop_name {
        active.shop_name = Set(Some(shop_name));
    }
    if let Some(block) = payload.block {
        active.block = Set(Some(block));
    }
    let user = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "User updated",
        user_from_entity(user)?,
        Some(Meta::empty()),
    ))
}

/// Users with `role`, whose block contains `block` case-insensitively.
pub async fn search_users(state: &AppState, query: UserQuery) -> AppResult<ApiResponse<UserList>> {
    let role: Role = query.role.parse().map_err(AppError::BadRequest)?;
    let pattern = contains_pattern(query.block.trim());

    let rows = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, name, phone_number, role, registration_number, shop_name, block, is_open, created_at
        FROM users
        WHERE role = $1 AND block ILIKE $2 ESCAPE '\'
        ORDER BY name
        "#,
    )
    .bind(role.as_str())
    .bind(pattern)
    .fetch_all(&state.pool)
    .await?;

    let items = rows
        .into_iter()
        .map(|row| {
            Ok(User {
                id: row.id,
                name: row.name,
                phone_number: row.phone_number,
                role: parse_role(&row.role)?,
                registration_number: row.registration_number,
                shop_name: row.shop_name,
                block: row.block,
                is_open: row.is_open,
                created_at: row.created_at,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    let count = items.len();
    Ok(ApiResponse::listed("Users", UserList { items }, count))
}

/// `LIKE` pattern matching `needle` anywhere, with `%`, `_` and `\` taken
/// literally.
pub fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub(crate) async fn all_users(state: &AppState) -> AppResult<Vec<User>> {
    Users::find()
        .order_by_asc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect()
}

fn parse_role(role: &str) -> AppResult<Role> {
    role.parse()
        .map_err(|e: String| AppError::Internal(anyhow::anyhow!(e)))
}

pub(crate) fn user_from_entity(model: UserModel) -> AppResult<User> {
    Ok(User {
        id: model.id,
        name: model.name,
        phone_number: model.phone_number,
        role: parse_role(&model.role)?,
        registration_number: model.registration_number,
        shop_name: model.shop_name,
        block: model.block,
        is_open: model.is_open,
        created_at: model.created_at.with_timezone(&Utc),
    })
}
