//! User entity - Village residents and administrators.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::EmergencyQuota;
use crate::{DomainError, UserId};

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Regular,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Regular => "REGULAR",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "REGULAR" => Ok(Self::Regular),
            other => Err(DomainError::parse(format!("Unknown role: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub role: Role,
    /// Emergency submissions left before a cooldown.
    pub emergency_change: u32,
    pub emergency_blocked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(data: NewUser, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            name: data.name,
            email: data.email,
            phone_number: data.phone_number,
            role: data.role,
            emergency_change: data.emergency_change,
            emergency_blocked_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn emergency_quota(&self) -> EmergencyQuota {
        EmergencyQuota {
            remaining: self.emergency_change,
            blocked_until: self.emergency_blocked_until,
        }
    }
}

/// Data for inserting a user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub role: Role,
    pub emergency_change: u32,
}
