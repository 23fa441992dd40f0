//! Regulation entity - A published village regulation and its PDF.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::RegulationId;

/// A stored regulation document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Regulation {
    pub id: RegulationId,
    pub title: String,
    pub year: i32,
    /// Absolute path of the stored PDF.
    pub file_path: String,
    /// Name of the file as uploaded.
    pub file_name: String,
    /// `None` when the upload carried no bytes.
    pub file_size: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for inserting a regulation; the id is assigned by the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRegulation {
    pub title: String,
    pub year: i32,
    pub file_path: String,
    pub file_name: String,
    pub file_size: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Partial update. `None` leaves a column unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegulationChanges {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub file: Option<RegulationFile>,
}

/// Replacement file columns.
#[derive(Debug, Clone, PartialEq)]
pub struct RegulationFile {
    pub file_path: String,
    pub file_name: String,
    pub file_size: Option<i64>,
}

impl RegulationChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.year.is_none() && self.file.is_none()
    }
}

impl Regulation {
    /// Apply `changes`, stamping `updated_at`.
    pub fn apply(&mut self, changes: RegulationChanges, now: DateTime<Utc>) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(year) = changes.year {
            self.year = year;
        }
        if let Some(file) = changes.file {
            self.file_path = file.file_path;
            self.file_name = file.file_name;
            self.file_size = file.file_size;
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(now: DateTime<Utc>) -> Regulation {
        Regulation {
            id: RegulationId::new(1),
            title: "Perdes 1/2024".to_string(),
            year: 2024,
            file_path: "/srv/uploads/regulations/a.pdf".to_string(),
            file_name: "perdes.pdf".to_string(),
            file_size: Some(1024),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(sample(Utc::now())).expect("serialize");
        assert_eq!(json["filePath"], "/srv/uploads/regulations/a.pdf");
        assert_eq!(json["fileName"], "perdes.pdf");
        assert_eq!(json["fileSize"], 1024);
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn apply_keeps_unchanged_columns() {
        let now = Utc::now();
        let mut regulation = sample(now);
        let later = now + chrono::Duration::seconds(5);

        regulation.apply(
            RegulationChanges {
                year: Some(2025),
                ..Default::default()
            },
            later,
        );

        assert_eq!(regulation.title, "Perdes 1/2024");
        assert_eq!(regulation.year, 2025);
        assert_eq!(regulation.file_name, "perdes.pdf");
        assert_eq!(regulation.updated_at, later);
    }
}
