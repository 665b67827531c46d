use serde::{ Serialize, Deserialize };

/// Acknowledgment returned once an upload has been indexed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub cases_indexed: u64,
}

impl UploadResponse {
    pub fn new(message: impl Into<String>, cases_indexed: u64) -> Self {
        Self {
            message: message.into(),
            cases_indexed,
        }
    }

    /// Accepted, but nothing new was indexed.
    pub fn is_empty(&self) -> bool {
        self.cases_indexed == 0
    }
}
