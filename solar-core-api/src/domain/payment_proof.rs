use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ApiError, ApiResult};

/// Largest accepted payment proof, 5 MB.
pub const MAX_PAYMENT_PROOF_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProofFileType {
    Jpeg,
    Png,
    Pdf,
}

impl ProofFileType {
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match mime.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(ProofFileType::Jpeg),
            "image/png" => Some(ProofFileType::Png),
            "application/pdf" => Some(ProofFileType::Pdf),
            _ => None,
        }
    }

    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, extension) = file_name.rsplit_once('.')?;
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ProofFileType::Jpeg),
            "png" => Some(ProofFileType::Png),
            "pdf" => Some(ProofFileType::Pdf),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ProofFileType::Jpeg => "image/jpeg",
            ProofFileType::Png => "image/png",
            ProofFileType::Pdf => "application/pdf",
        }
    }
}

/// An uploaded payment proof, before it is handed to file storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PaymentProofFile {
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
    #[validate(length(min = 1, max = 100))]
    pub content_type: String,
    #[validate(range(min = 1, max = 5242880))]
    pub size_bytes: u64,
    #[serde(skip)]
    pub content: Vec<u8>,
}

impl PaymentProofFile {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            size_bytes: content.len() as u64,
            content,
        }
    }

    /// Accepts jpeg, png and pdf files of at most 5 MB.
    ///
    /// Declared content type and file extension must agree when both are known.
    pub fn validate_proof(&self) -> ApiResult<ProofFileType> {
        self.validate()?;

        if !self.content.is_empty() && self.content.len() as u64 != self.size_bytes {
            return Err(ApiError::ValidationError(format!(
                "Declared size {} does not match content length {}",
                self.size_bytes,
                self.content.len()
            )));
        }

        let by_type = ProofFileType::from_content_type(&self.content_type).ok_or_else(|| {
            ApiError::ValidationError(format!(
                "Unsupported payment proof type '{}', expected jpeg, png or pdf",
                self.content_type
            ))
        })?;

        match ProofFileType::from_file_name(&self.file_name) {
            Some(by_name) if by_name != by_type => Err(ApiError::ValidationError(format!(
                "File name '{}' does not match content type '{}'",
                self.file_name, self.content_type
            ))),
            _ => Ok(by_type),
        }
    }
}
