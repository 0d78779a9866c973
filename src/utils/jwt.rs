use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::user::{self, UserRole};
use crate::error::{AppError, AppResult};

/// Identity carried by a bearer token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn is_staff(&self) -> bool {
        self.role.is_elevated()
    }
}

pub fn create_token(user: &user::Model, secret: &str, expiration_hours: i64) -> AppResult<String> {
    let now = Utc::now();
    let exp = now + Duration::hours(expiration_hours);

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role.clone(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
}

pub fn verify_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff_user(role: UserRole) -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            email: "staff@example.com".to_string(),
            password_hash: String::new(),
            name: "Staff".to_string(),
            role,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_token_carries_role() {
        let user = staff_user(UserRole::Staff);
        let token = create_token(&user, "secret", 1).unwrap();

        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, user.id);
        assert!(claims.is_staff());
    }

    #[test]
    fn test_wrong_secret_is_unauthorized() {
        let token = create_token(&staff_user(UserRole::Customer), "secret", 1).unwrap();
        assert!(matches!(
            verify_token(&token, "other").unwrap_err(),
            AppError::Unauthorized(_)
        ));
    }
}
