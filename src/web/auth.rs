// src/web/auth.rs
use actix_web::HttpRequest;
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

use crate::domain::{Errors, Role, User};

/// The identity payload carried by clients: issued at login, presented as
/// either an `x-jwt-payload` header (gateway style) or a bearer token.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPayload {
    pub sub: String,
    pub role: Role,
    pub name: String,
}

pub fn issue_token(user: &User) -> String {
    let payload = TokenPayload {
        sub: user.user_id.clone(),
        role: user.role,
        name: user.name.clone(),
    };
    let json = serde_json::to_vec(&payload).unwrap_or_default();
    general_purpose::STANDARD.encode(json)
}

pub fn token_from_request(req: &HttpRequest) -> Option<String> {
    if let Some(header) = req.headers().get("x-jwt-payload") {
        return header.to_str().ok().map(str::to_string);
    }
    let auth = req.headers().get("Authorization")?.to_str().ok()?;
    auth.strip_prefix("Bearer ").map(str::to_string)
}

pub fn parse_token(token: &str) -> Option<TokenPayload> {
    let decoded = general_purpose::STANDARD.decode(token.trim()).ok()?;
    serde_json::from_slice(&decoded).ok()
}

pub fn hash_password(password: &str) -> Result<String, Errors> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Errors::InvalidRequest(format!("could not hash password: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
