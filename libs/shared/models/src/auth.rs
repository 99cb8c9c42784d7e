use std::fmt;

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// The already-authenticated caller, as resolved by the upstream gateway.
/// This service never verifies credentials itself; it trusts the identity
/// headers the gateway injects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: ActorRole,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Admin,
    Staff,
    Patient,
}

impl ActorRole {
    pub fn is_staff(&self) -> bool {
        matches!(self, ActorRole::Admin | ActorRole::Staff)
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorRole::Admin => write!(f, "admin"),
            ActorRole::Staff => write!(f, "staff"),
            ActorRole::Patient => write!(f, "patient"),
        }
    }
}

impl Actor {
    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get("x-actor-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok())
            .ok_or_else(|| AppError::Auth("Missing or invalid x-actor-id header".to_string()))?;

        let role = match parts
            .headers
            .get("x-actor-role")
            .and_then(|value| value.to_str().ok())
        {
            Some("admin") => ActorRole::Admin,
            Some("staff") => ActorRole::Staff,
            Some("patient") => ActorRole::Patient,
            _ => {
                return Err(AppError::Auth(
                    "Missing or invalid x-actor-role header".to_string(),
                ))
            }
        };

        let ip_address = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(|value| value.trim().to_string());

        Ok(Actor {
            id,
            role,
            ip_address,
        })
    }
}
