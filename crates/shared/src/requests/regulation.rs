/// Text fields of a regulation multipart form. Multipart values are always
/// strings; the use case normalises them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegulationForm {
    pub title: Option<String>,
    pub year: Option<String>,
}
