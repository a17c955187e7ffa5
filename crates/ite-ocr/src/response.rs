use serde::Deserialize;

use crate::OcrError;

/// Body returned by the parse endpoint
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OcrSpaceResponse {
    #[serde(default)]
    pub is_errored_on_processing: bool,
    #[serde(default)]
    pub error_message: Option<ErrorMessage>,
    #[serde(default)]
    pub parsed_results: Option<Vec<ParsedResult>>,
}

/// The service sends either a single string or a list of them
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ErrorMessage {
    pub fn joined(self) -> String {
        match self {
            Self::One(message) => message,
            Self::Many(messages) => messages
                .into_iter()
                .filter(|m| !m.trim().is_empty())
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParsedResult {
    #[serde(default)]
    pub parsed_text: Option<String>,
}

impl OcrSpaceResponse {
    /// Only the first parsed result is used
    pub fn into_text(self) -> Result<Option<String>, OcrError> {
        if self.is_errored_on_processing {
            return Err(OcrError::service(self.error_message.map(ErrorMessage::joined)));
        }

        Ok(self
            .parsed_results
            .and_then(|results| results.into_iter().next())
            .and_then(|first| first.parsed_text))
    }
}
