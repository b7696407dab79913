use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use validator::Validate;

use crate::{
    auth::{self, TokenKeys},
    config::SuperuserConfig,
    entities::user,
    error::{BlogError, Result},
    forms::{LoginForm, RegistrationForm},
};

pub async fn find_by_username<C>(db: &C, username: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    Ok(user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?)
}

pub async fn username_taken<C>(db: &C, username: &str) -> Result<bool>
where
    C: ConnectionTrait,
{
    Ok(find_by_username(db, username).await?.is_some())
}

pub async fn register<C>(db: &C, form: &RegistrationForm) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    form.validate()?;
    if username_taken(db, &form.username).await? {
        return Err(BlogError::invalid("username", "a user with that username already exists"));
    }
    let user = user::ActiveModel {
        username: Set(form.username.clone()),
        first_name: Set(form.first_name.clone().unwrap_or_default()),
        last_name: Set(form.last_name.clone().unwrap_or_default()),
        email: Set(form.email.clone()),
        password_hash: Set(auth::hash_password(&form.password)?),
        is_staff: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    tracing::info!(user_id = user.id, username = %user.username, "user registered");
    Ok(user)
}

/// Checks the credentials and issues a bearer token.
pub async fn login<C>(db: &C, tokens: &TokenKeys, form: &LoginForm) -> Result<(user::Model, String)>
where
    C: ConnectionTrait,
{
    let user = find_by_username(db, &form.username)
        .await?
        .filter(|user| auth::verify_password(&user.password_hash, &form.password))
        .ok_or(BlogError::InvalidCredentials)?;
    let token = tokens.issue(&user)?;
    Ok((user, token))
}

/// Makes sure the configured staff account exists and can log in with the
/// configured password.
pub async fn ensure_superuser<C>(db: &C, config: &SuperuserConfig) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    let password_hash = auth::hash_password(&config.password)?;
    let user = match find_by_username(db, &config.username).await? {
        Some(existing) => {
            let mut am: user::ActiveModel = existing.into();
            am.is_staff = Set(true);
            am.password_hash = Set(password_hash);
            am.update(db).await?
        }
        None => {
            user::ActiveModel {
                username: Set(config.username.clone()),
                first_name: Set(String::new()),
                last_name: Set(String::new()),
                email: Set(String::new()),
                password_hash: Set(password_hash),
                is_staff: Set(true),
                created_at: Set(Utc::now()),
                ..Default::default()
            }
            .insert(db)
            .await?
        }
    };
    tracing::info!(username = %user.username, "superuser ready");
    Ok(user)
}
