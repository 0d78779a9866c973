use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use uuid::Uuid;

use crate::config::Config;
use crate::entities::user::{self, UserRole};
use crate::error::{AppError, AppResult};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|e| AppError::Internal(format!("Failed to parse password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

pub async fn create_user(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
    name: &str,
    role: UserRole,
) -> AppResult<user::Model> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(AppError::BadRequest("Email and password are required".to_string()));
    }

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let created = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password(password)?),
        name: Set(name.trim().to_string()),
        role: Set(role),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?;

    Ok(created)
}

/// Who is acting on a user account from the management endpoints.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: Uuid,
    pub role: UserRole,
}

impl Actor {
    fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Only admins may hand out the admin role.
fn ensure_may_grant(actor: &Actor, role: &UserRole) -> AppResult<()> {
    if *role == UserRole::Admin && !actor.is_admin() {
        return Err(AppError::Forbidden("Only an admin can grant the admin role".to_string()));
    }
    Ok(())
}

/// Only admins may touch an admin account.
fn ensure_may_manage(actor: &Actor, target: &user::Model) -> AppResult<()> {
    if target.role == UserRole::Admin && !actor.is_admin() {
        return Err(AppError::Forbidden("Only an admin can change an admin account".to_string()));
    }
    Ok(())
}

async fn find_user(db: &DatabaseConnection, user_id: Uuid) -> AppResult<user::Model> {
    user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
    pub role: Option<UserRole>,
}

/// Staff-created account. Defaults to a customer, like a self-registration.
pub async fn create_account(
    db: &DatabaseConnection,
    actor: &Actor,
    input: &NewAccount,
) -> AppResult<user::Model> {
    let role = input.role.clone().unwrap_or(UserRole::Customer);
    ensure_may_grant(actor, &role)?;

    let created = create_user(db, &input.email, &input.password, &input.name, role).await?;
    tracing::info!(user_id = %created.id, created_by = %actor.id, "User account created");
    Ok(created)
}

/// Partial account update. Absent fields are left alone, a blank password
/// keeps the current one.
#[derive(Debug, Default, Deserialize)]
pub struct AccountChanges {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
}

pub async fn update_account(
    db: &DatabaseConnection,
    actor: &Actor,
    user_id: Uuid,
    changes: &AccountChanges,
) -> AppResult<user::Model> {
    let target = find_user(db, user_id).await?;
    ensure_may_manage(actor, &target)?;
    if let Some(role) = &changes.role {
        ensure_may_grant(actor, role)?;
    }

    let mut active: user::ActiveModel = target.clone().into();

    if let Some(email) = &changes.email {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::BadRequest("Email cannot be blank".to_string()));
        }
        if email != target.email {
            let taken = user::Entity::find()
                .filter(user::Column::Email.eq(email))
                .filter(user::Column::Id.ne(target.id))
                .one(db)
                .await?;
            if taken.is_some() {
                return Err(AppError::Conflict("Email already registered".to_string()));
            }
            active.email = Set(email.to_string());
        }
    }
    if let Some(name) = &changes.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(password) = changes.password.as_deref().filter(|p| !p.is_empty()) {
        active.password_hash = Set(hash_password(password)?);
    }
    if let Some(role) = &changes.role {
        active.role = Set(role.clone());
    }

    let updated = active.update(db).await?;
    tracing::info!(user_id = %updated.id, role = ?updated.role, updated_by = %actor.id, "User account updated");
    Ok(updated)
}

pub async fn change_role(
    db: &DatabaseConnection,
    actor: &Actor,
    user_id: Uuid,
    role: UserRole,
) -> AppResult<user::Model> {
    let changes = AccountChanges {
        role: Some(role),
        ..Default::default()
    };
    update_account(db, actor, user_id, &changes).await
}

pub async fn delete_account(db: &DatabaseConnection, actor: &Actor, user_id: Uuid) -> AppResult<()> {
    let target = find_user(db, user_id).await?;
    if target.role == UserRole::Admin && !actor.is_admin() {
        return Err(AppError::Forbidden("Cannot delete an admin account".to_string()));
    }
    if target.id == actor.id {
        return Err(AppError::Forbidden("You cannot delete your own account".to_string()));
    }

    user::Entity::delete_by_id(target.id).exec(db).await?;
    tracing::info!(user_id = %target.id, deleted_by = %actor.id, "User account deleted");
    Ok(())
}

/// Create the configured admin account unless it already exists.
pub async fn seed_admin(db: &DatabaseConnection, config: &Config) -> AppResult<()> {
    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&config.admin_email))
        .one(db)
        .await?;

    if existing.is_none() {
        create_user(db, &config.admin_email, &config.admin_password, "Admin", UserRole::Admin).await?;
        tracing::info!("Admin account created: {}", config.admin_email);
    }

    Ok(())
}
