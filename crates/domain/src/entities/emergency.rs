//! Emergency entity - An alert filed by a resident.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EmergencyId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emergency {
    pub id: EmergencyId,
    pub user_id: UserId,
    pub phone_number: Option<String>,
    pub message: String,
    /// Decimal degrees, kept as submitted.
    pub latitude: String,
    pub longitude: String,
    pub is_handled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Emergency {
    pub fn new(data: NewEmergency, now: DateTime<Utc>) -> Self {
        Self {
            id: EmergencyId::new(),
            user_id: data.user_id,
            phone_number: data.phone_number,
            message: data.message,
            latitude: data.latitude,
            longitude: data.longitude,
            is_handled: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn mark_handled(&mut self, now: DateTime<Utc>) {
        self.is_handled = true;
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEmergency {
    pub user_id: UserId,
    pub phone_number: Option<String>,
    pub message: String,
    pub latitude: String,
    pub longitude: String,
}

/// Contact details of the reporting user, embedded in admin listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReporterSummary {
    pub id: UserId,
    pub name: String,
    pub phone_number: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyWithReporter {
    #[serde(flatten)]
    pub emergency: Emergency,
    pub user: Option<ReporterSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_emergency_starts_unhandled() {
        let now = Utc::now();
        let emergency = Emergency::new(
            NewEmergency {
                user_id: UserId::new(),
                phone_number: Some("081234567890".to_string()),
                message: "Banjir di RT 02".to_string(),
                latitude: "-7.05".to_string(),
                longitude: "110.42".to_string(),
            },
            now,
        );
        assert!(!emergency.is_handled);
        assert_eq!(emergency.created_at, emergency.updated_at);
    }

    #[test]
    fn reporter_is_embedded_beside_flattened_fields() {
        let now = Utc::now();
        let user_id = UserId::new();
        let row = EmergencyWithReporter {
            emergency: Emergency::new(
                NewEmergency {
                    user_id,
                    phone_number: None,
                    message: "Kebakaran".to_string(),
                    latitude: "1".to_string(),
                    longitude: "2".to_string(),
                },
                now,
            ),
            user: Some(ReporterSummary {
                id: user_id,
                name: "Siti".to_string(),
                phone_number: "081111111111".to_string(),
                email: "siti@example.com".to_string(),
            }),
        };

        let json = serde_json::to_value(&row).expect("serialize");
        assert_eq!(json["message"], "Kebakaran");
        assert_eq!(json["is_handled"], false);
        assert_eq!(json["user"]["name"], "Siti");
    }
}
