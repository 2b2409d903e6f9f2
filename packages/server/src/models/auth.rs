use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: i32,
    pub username: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Serialize)]
pub struct MeResponse {
    pub id: i32,
    pub username: String,
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    let username = payload.username.trim();
    if username.is_empty() {
        return Err(AppError::Validation("username cannot be empty".into()));
    }
    if username.len() < 3 || username.len() > 50 {
        return Err(AppError::Validation(
            "username must be between 3 and 50 characters".into(),
        ));
    }
    if !is_plausible_email(&payload.email) {
        return Err(AppError::Validation("invalid email format".into()));
    }
    if payload.password.len() < 8 {
        return Err(AppError::Validation(
            "password must be at least 8 characters long".into(),
        ));
    }
    Ok(())
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "email and password are required".into(),
        ));
    }
    Ok(())
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_plausible_email("alice@example.com"));
        assert!(!is_plausible_email("alice"));
        assert!(!is_plausible_email("alice@com"));
        assert!(!is_plausible_email("@example.com"));
    }
}
