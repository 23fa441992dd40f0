//! Regulation use cases.
//!
//! Regulations are PDF documents stored on local disk with their metadata in
//! the database. Upload handlers write the file first and hand the stored
//! copy to these use cases; any rejection removes that copy again.

use std::sync::Arc;

use chrono::Datelike;
use sidesa_domain::{NewRegulation, Regulation, RegulationChanges, RegulationFile, RegulationId};
use sidesa_shared::RegulationForm;

use crate::infrastructure::ports::{
    ClockPort, FileStorage, RegulationRepo, RepoError, StorageError, UploadedFile,
};
use crate::use_cases::validation::{require_length_range, ValidationFailure};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
const MIN_YEAR: i32 = 1900;
const MAX_YEARS_AHEAD: i32 = 10;

#[derive(Debug, thiserror::Error)]
pub enum RegulationError {
    #[error("Year must be a valid number")]
    InvalidYear,
    #[error("PDF file is required")]
    FileRequired,
    #[error("Only PDF files are allowed")]
    NotPdf,
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
    #[error("Regulation not found")]
    NotFound,
    #[error("File not found")]
    FileNotFound,
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Reject uploads that are not declared as PDF.
pub fn ensure_pdf(content_type: Option<&str>) -> Result<(), RegulationError> {
    let declared = content_type
        .and_then(|ct| ct.split(';').next())
        .map(str::trim);
    match declared {
        Some(ct) if ct.eq_ignore_ascii_case(PDF_CONTENT_TYPE) => Ok(()),
        _ => Err(RegulationError::NotPdf),
    }
}

/// Validated text fields of a regulation form.
#[derive(Debug, Default, PartialEq)]
struct RegulationFields {
    title: Option<String>,
    year: Option<i32>,
}

pub struct RegulationUseCases {
    repo: Arc<dyn RegulationRepo>,
    storage: Arc<dyn FileStorage>,
    clock: Arc<dyn ClockPort>,
}

impl RegulationUseCases {
    pub fn new(
        repo: Arc<dyn RegulationRepo>,
        storage: Arc<dyn FileStorage>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            repo,
            storage,
            clock,
        }
    }

    pub async fn create(
        &self,
        form: RegulationForm,
        file: Option<UploadedFile>,
    ) -> Result<Regulation, RegulationError> {
        let result = self.create_record(form, file.as_ref()).await;
        if result.is_err() {
            self.discard(file.as_ref()).await;
        }
        result
    }

    async fn create_record(
        &self,
        form: RegulationForm,
        file: Option<&UploadedFile>,
    ) -> Result<Regulation, RegulationError> {
        let (title, year) = self.parse_new_form(form)?;
        let file = file.ok_or(RegulationError::FileRequired)?;

        let stored = stored_file(file);
        let regulation = self
            .repo
            .create(&NewRegulation {
                title,
                year,
                file_path: stored.file_path,
                file_name: stored.file_name,
                file_size: stored.file_size,
                created_at: self.clock.now(),
            })
            .await?;

        tracing::info!(
            regulation_id = %regulation.id,
            file_name = %regulation.file_name,
            "Regulation created"
        );
        Ok(regulation)
    }

    pub async fn list(&self) -> Result<Vec<Regulation>, RegulationError> {
        Ok(self.repo.list().await?)
    }

    pub async fn get(&self, id: RegulationId) -> Result<Regulation, RegulationError> {
        self.repo.get(id).await?.ok_or(RegulationError::NotFound)
    }

    pub async fn update(
        &self,
        id: RegulationId,
        form: RegulationForm,
        file: Option<UploadedFile>,
    ) -> Result<Regulation, RegulationError> {
        let result = self.update_record(id, form, file.as_ref()).await;
        match &result {
            Ok((_, Some(old_path))) => {
                if let Err(e) = self.remove_if_present(old_path).await {
                    tracing::warn!(regulation_id = %id, path = %old_path, error = %e, "Failed to remove replaced file");
                }
            }
            Ok((_, None)) => {}
            Err(_) => self.discard(file.as_ref()).await,
        }
        result.map(|(regulation, _)| regulation)
    }

    /// Returns the updated record and, when the file was replaced, the old path.
    async fn update_record(
        &self,
        id: RegulationId,
        form: RegulationForm,
        file: Option<&UploadedFile>,
    ) -> Result<(Regulation, Option<String>), RegulationError> {
        let fields = self.parse_form(form)?;
        let mut regulation = self.get(id).await?;

        let changes = RegulationChanges {
            title: fields.title,
            year: fields.year,
            file: file.map(stored_file),
        };
        let old_path = changes
            .file
            .as_ref()
            .map(|_| regulation.file_path.clone())
            .filter(|old| file.is_some_and(|f| &f.path != old));

        regulation.apply(changes, self.clock.now());
        self.repo.update(&regulation).await.map_err(|e| match e {
            RepoError::NotFound { .. } => RegulationError::NotFound,
            other => other.into(),
        })?;

        tracing::info!(regulation_id = %id, replaced_file = old_path.is_some(), "Regulation updated");
        Ok((regulation, old_path))
    }

    pub async fn delete(&self, id: RegulationId) -> Result<(), RegulationError> {
        let regulation = self.get(id).await?;
        self.remove_if_present(&regulation.file_path).await?;
        self.repo.delete(id).await.map_err(|e| match e {
            RepoError::NotFound { .. } => RegulationError::NotFound,
            other => other.into(),
        })?;

        tracing::info!(regulation_id = %id, "Regulation deleted");
        Ok(())
    }

    /// Look up a regulation whose file is still on disk, for download or preview.
    pub async fn stored_document(&self, id: RegulationId) -> Result<Regulation, RegulationError> {
        let regulation = self.get(id).await?;
        if !self.storage.exists(&regulation.file_path).await {
            tracing::warn!(regulation_id = %id, path = %regulation.file_path, "Regulation file missing on disk");
            return Err(RegulationError::FileNotFound);
        }
        Ok(regulation)
    }

    /// Title and year of a new regulation; both are required.
    fn parse_new_form(&self, form: RegulationForm) -> Result<(String, i32), RegulationError> {
        let year = form.year.as_deref().map(parse_year).transpose()?;

        let mut failure = ValidationFailure { issues: Vec::new() };
        let title = check_title(form.title, true, &mut failure);
        let year = self.check_year(year, true, &mut failure);
        match (title, year) {
            (Some(title), Some(year)) if failure.is_empty() => Ok((title, year)),
            _ => Err(failure.into()),
        }
    }

    /// Fields of an update; absent fields are left unchanged.
    fn parse_form(&self, form: RegulationForm) -> Result<RegulationFields, RegulationError> {
        let year = form.year.as_deref().map(parse_year).transpose()?;

        let mut failure = ValidationFailure { issues: Vec::new() };
        let title = check_title(form.title, false, &mut failure);
        let year = self.check_year(year, false, &mut failure);
        if !failure.is_empty() {
            return Err(failure.into());
        }
        Ok(RegulationFields { title, year })
    }

    fn check_year(
        &self,
        year: Option<i32>,
        required: bool,
        failure: &mut ValidationFailure,
    ) -> Option<i32> {
        let max_year = self.clock.now().year() + MAX_YEARS_AHEAD;
        match year {
            Some(year) if year < MIN_YEAR => failure.extend(ValidationFailure::single(
                "year",
                "too_small",
                format!("year must be {MIN_YEAR} or later"),
            )),
            Some(year) if year > max_year => failure.extend(ValidationFailure::single(
                "year",
                "too_big",
                format!("year must be {max_year} or earlier"),
            )),
            Some(_) => {}
            None if required => failure.extend(ValidationFailure::single(
                "year",
                "required",
                "year is required",
            )),
            None => {}
        }
        year
    }

    async fn remove_if_present(&self, path: &str) -> Result<(), StorageError> {
        if self.storage.exists(path).await {
            self.storage.remove(path).await?;
        }
        Ok(())
    }

    async fn discard(&self, file: Option<&UploadedFile>) {
        let Some(file) = file else {
            return;
        };
        if let Err(e) = self.storage.remove(&file.path).await {
            tracing::warn!(path = %file.path, error = %e, "Failed to discard rejected upload");
        }
    }
}

fn check_title(
    title: Option<String>,
    required: bool,
    failure: &mut ValidationFailure,
) -> Option<String> {
    match &title {
        Some(value) => {
            if let Err(e) = require_length_range(value, 1, 255, "title") {
                failure.extend(e);
            }
        }
        None if required => failure.extend(ValidationFailure::single(
            "title",
            "required",
            "title is required",
        )),
        None => {}
    }
    title
}

/// Multipart values are text. Whole numbers are accepted, with or without a
/// trailing `.0`; fractions fail the integer check.
fn parse_year(raw: &str) -> Result<i32, RegulationError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| RegulationError::InvalidYear)?;
    if !value.is_finite() {
        return Err(RegulationError::InvalidYear);
    }
    if value.fract() != 0.0 || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return Err(
            ValidationFailure::single("year", "invalid_type", "year must be an integer").into(),
        );
    }
    Ok(value as i32)
}

fn stored_file(file: &UploadedFile) -> RegulationFile {
    RegulationFile {
        file_path: file.path.clone(),
        file_name: file.original_name.clone(),
        file_size: match file.size {
            0 => None,
            size => i64::try_from(size).ok(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::{MockFileStorage, MockRegulationRepo};
    use chrono::{DateTime, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 1, 8, 0, 0).single().expect("time")
    }

    fn form(title: Option<&str>, year: Option<&str>) -> RegulationForm {
        RegulationForm {
            title: title.map(str::to_string),
            year: year.map(str::to_string),
        }
    }

    fn upload(path: &str, size: u64) -> UploadedFile {
        UploadedFile {
            path: path.to_string(),
            original_name: "perdes-2025.pdf".to_string(),
            size,
        }
    }

    fn existing(id: i64) -> Regulation {
        Regulation {
            id: RegulationId::new(id),
            title: "Perdes APBDes".to_string(),
            year: 2024,
            file_path: "/srv/uploads/regulations/old.pdf".to_string(),
            file_name: "apbdes.pdf".to_string(),
            file_size: Some(4096),
            created_at: now(),
            updated_at: now(),
        }
    }

    fn use_cases(repo: MockRegulationRepo, storage: MockFileStorage) -> RegulationUseCases {
        RegulationUseCases::new(Arc::new(repo), Arc::new(storage), Arc::new(FixedClock(now())))
    }

    #[test]
    fn ensure_pdf_checks_mime_type() {
        assert!(ensure_pdf(Some("application/pdf")).is_ok());
        assert!(ensure_pdf(Some("Application/PDF; charset=binary")).is_ok());
        assert!(matches!(ensure_pdf(Some("image/png")), Err(RegulationError::NotPdf)));
        assert!(matches!(ensure_pdf(None), Err(RegulationError::NotPdf)));
    }

    #[test]
    fn parse_year_accepts_whole_numbers_only() {
        assert_eq!(parse_year(" 2024 ").expect("year"), 2024);
        assert_eq!(parse_year("2024.0").expect("year"), 2024);
        assert!(matches!(parse_year("tahun"), Err(RegulationError::InvalidYear)));
        assert!(matches!(parse_year("2024.5"), Err(RegulationError::Validation(_))));
    }

    #[test]
    fn empty_upload_has_no_size() {
        assert_eq!(stored_file(&upload("/tmp/a.pdf", 0)).file_size, None);
        assert_eq!(stored_file(&upload("/tmp/a.pdf", 10)).file_size, Some(10));
    }

    #[tokio::test]
    async fn create_stores_metadata_of_upload() {
        let mut repo = MockRegulationRepo::new();
        repo.expect_create()
            .withf(|new| {
                new.title == "Perdes APBDes"
                    && new.year == 2025
                    && new.file_path == "/srv/uploads/regulations/new.pdf"
                    && new.file_name == "perdes-2025.pdf"
                    && new.file_size == Some(2048)
                    && new.created_at == now()
            })
            .returning(|new| {
                Ok(Regulation {
                    id: RegulationId::new(7),
                    title: new.title.clone(),
                    year: new.year,
                    file_path: new.file_path.clone(),
                    file_name: new.file_name.clone(),
                    file_size: new.file_size,
                    created_at: new.created_at,
                    updated_at: new.created_at,
                })
            });
        let storage = MockFileStorage::new();

        let regulation = use_cases(repo, storage)
            .create(
                form(Some("Perdes APBDes"), Some("2025")),
                Some(upload("/srv/uploads/regulations/new.pdf", 2048)),
            )
            .await
            .expect("create");

        assert_eq!(regulation.id, RegulationId::new(7));
    }

    #[tokio::test]
    async fn create_without_file_is_rejected() {
        let repo = MockRegulationRepo::new();
        let storage = MockFileStorage::new();

        let result = use_cases(repo, storage)
            .create(form(Some("Perdes"), Some("2025")), None)
            .await;

        assert!(matches!(result, Err(RegulationError::FileRequired)));
    }

    #[tokio::test]
    async fn invalid_form_discards_written_upload() {
        let repo = MockRegulationRepo::new();
        let mut storage = MockFileStorage::new();
        storage
            .expect_remove()
            .withf(|path| path == "/srv/uploads/regulations/new.pdf")
            .times(1)
            .returning(|_| Ok(()));

        let result = use_cases(repo, storage)
            .create(
                form(None, Some("2040")),
                Some(upload("/srv/uploads/regulations/new.pdf", 10)),
            )
            .await;

        let Err(RegulationError::Validation(failure)) = result else {
            panic!("expected validation failure");
        };
        let fields: Vec<&str> = failure.issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "year"]);
    }

    #[tokio::test]
    async fn non_numeric_year_is_reported_before_other_checks() {
        let repo = MockRegulationRepo::new();
        let storage = MockFileStorage::new();

        let result = use_cases(repo, storage)
            .create(form(None, Some("dua ribu")), None)
            .await;

        assert!(matches!(result, Err(RegulationError::InvalidYear)));
    }

    #[tokio::test]
    async fn update_with_new_file_removes_old_file() {
        let mut repo = MockRegulationRepo::new();
        repo.expect_get()
            .withf(|id| *id == RegulationId::new(3))
            .returning(|id| Ok(Some(existing(id.get()))));
        repo.expect_update()
            .withf(|r| {
                r.file_path == "/srv/uploads/regulations/new.pdf"
                    && r.file_name == "perdes-2025.pdf"
                    && r.title == "Perdes APBDes"
                    && r.year == 2025
            })
            .returning(|_| Ok(()));

        let mut storage = MockFileStorage::new();
        storage
            .expect_exists()
            .withf(|path| path == "/srv/uploads/regulations/old.pdf")
            .returning(|_| true);
        storage
            .expect_remove()
            .withf(|path| path == "/srv/uploads/regulations/old.pdf")
            .times(1)
            .returning(|_| Ok(()));

        let updated = use_cases(repo, storage)
            .update(
                RegulationId::new(3),
                form(None, Some("2025")),
                Some(upload("/srv/uploads/regulations/new.pdf", 512)),
            )
            .await
            .expect("update");

        assert_eq!(updated.file_size, Some(512));
        assert_eq!(updated.updated_at, now());
    }

    #[tokio::test]
    async fn update_of_unknown_regulation_discards_upload() {
        let mut repo = MockRegulationRepo::new();
        repo.expect_get().returning(|_| Ok(None));
        let mut storage = MockFileStorage::new();
        storage
            .expect_remove()
            .withf(|path| path == "/srv/uploads/regulations/new.pdf")
            .times(1)
            .returning(|_| Ok(()));

        let result = use_cases(repo, storage)
            .update(
                RegulationId::new(99),
                RegulationForm::default(),
                Some(upload("/srv/uploads/regulations/new.pdf", 512)),
            )
            .await;

        assert!(matches!(result, Err(RegulationError::NotFound)));
    }

    #[tokio::test]
    async fn delete_removes_file_then_record() {
        let mut repo = MockRegulationRepo::new();
        repo.expect_get().returning(|id| Ok(Some(existing(id.get()))));
        repo.expect_delete()
            .withf(|id| *id == RegulationId::new(4))
            .returning(|_| Ok(()));
        let mut storage = MockFileStorage::new();
        storage.expect_exists().returning(|_| true);
        storage.expect_remove().times(1).returning(|_| Ok(()));

        use_cases(repo, storage)
            .delete(RegulationId::new(4))
            .await
            .expect("delete");
    }

    #[tokio::test]
    async fn stored_document_requires_file_on_disk() {
        let mut repo = MockRegulationRepo::new();
        repo.expect_get().returning(|id| Ok(Some(existing(id.get()))));
        let mut storage = MockFileStorage::new();
        storage.expect_exists().returning(|_| false);

        let result = use_cases(repo, storage)
            .stored_document(RegulationId::new(1))
            .await;

        assert!(matches!(result, Err(RegulationError::FileNotFound)));
    }

    #[tokio::test]
    async fn repo_error_propagates() {
        let mut repo = MockRegulationRepo::new();
        repo.expect_list()
            .returning(|| Err(RepoError::database("regulation.list", "database is locked")));
        let storage = MockFileStorage::new();

        let result = use_cases(repo, storage).list().await;

        assert!(matches!(result, Err(RegulationError::Repo(_))));
    }
}
