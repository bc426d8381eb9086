use serde::Deserialize;

/// Generate form fields. The dashboard form marks `data` as required and
/// caps it at 500 characters; the handler passes it through as-is.
#[derive(Debug, Deserialize)]
pub struct GenerateForm {
    pub data: String,
}
