//! Leads from the public contact form and the staff follow-up on them.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};

use crate::entities::{contact, contact_action};
use crate::error::{AppError, AppResult};

pub const MISSING_CONTACT_FIELDS: &str = "Please fill in all contact informations";

#[derive(Debug, Deserialize)]
pub struct NewContact {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub detail: String,
}

pub async fn submit_contact(db: &DatabaseConnection, input: &NewContact) -> AppResult<contact::Model> {
    let topic = input.topic.trim();
    let email = input.email.trim();
    let detail = input.detail.trim();

    if topic.is_empty() || email.is_empty() || detail.is_empty() {
        return Err(AppError::BadRequest(MISSING_CONTACT_FIELDS.to_string()));
    }

    let created = contact::ActiveModel {
        topic: Set(topic.to_string()),
        email: Set(email.to_string()),
        detail: Set(detail.to_string()),
        complete: Set(false),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(contact_id = created.id, "Contact message received");
    Ok(created)
}

#[derive(Debug, Serialize)]
pub struct ContactEntry {
    #[serde(flatten)]
    pub contact: contact::Model,
    pub action: Option<String>,
}

/// Newest leads first, each with its follow-up note if one was saved.
pub async fn list_contacts(db: &DatabaseConnection) -> AppResult<Vec<ContactEntry>> {
    let rows = contact::Entity::find()
        .find_also_related(contact_action::Entity)
        .order_by_desc(contact::Column::CreatedAt)
        .order_by_desc(contact::Column::Id)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(contact, action)| ContactEntry {
            contact,
            action: action.map(|a| a.detail),
        })
        .collect())
}

async fn find_contact(db: &DatabaseConnection, contact_id: i32) -> AppResult<contact::Model> {
    contact::Entity::find_by_id(contact_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Contact not found".to_string()))
}

/// Create or overwrite the follow-up note of a lead.
pub async fn save_action(
    db: &DatabaseConnection,
    contact_id: i32,
    detail: &str,
) -> AppResult<contact_action::Model> {
    let contact = find_contact(db, contact_id).await?;
    let existing = contact.find_related(contact_action::Entity).one(db).await?;

    let action = match existing {
        Some(action) => {
            let mut active: contact_action::ActiveModel = action.into();
            active.detail = Set(detail.trim().to_string());
            active.update(db).await?
        }
        None => {
            contact_action::ActiveModel {
                contact_id: Set(contact.id),
                detail: Set(detail.trim().to_string()),
                ..Default::default()
            }
            .insert(db)
            .await?
        }
    };

    Ok(action)
}

pub async fn mark_complete(db: &DatabaseConnection, contact_id: i32) -> AppResult<contact::Model> {
    let contact = find_contact(db, contact_id).await?;
    let mut active: contact::ActiveModel = contact.into();
    active.complete = Set(true);
    Ok(active.update(db).await?)
}

pub async fn delete_contact(db: &DatabaseConnection, contact_id: i32) -> AppResult<()> {
    let txn = db.begin().await?;

    contact_action::Entity::delete_many()
        .filter(contact_action::Column::ContactId.eq(contact_id))
        .exec(&txn)
        .await?;
    let result = contact::Entity::delete_by_id(contact_id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Contact not found".to_string()));
    }

    txn.commit().await?;
    Ok(())
}
