use thiserror::Error;
use wasm_bindgen::JsValue;

/// A document operation the browser refused
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomError {
    #[error("document unavailable: {0}")]
    Unavailable(String),

    #[error("document operation rejected: {0}")]
    Rejected(String),
}

impl From<JsValue> for DomError {
    fn from(value: JsValue) -> Self {
        let message = value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}"));
        DomError::Rejected(message)
    }
}

/// The host page does not satisfy the form's markup contract
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MountError {
    #[error("host page has no element with id '{0}'")]
    MissingElement(String),

    #[error("host page has no <body>")]
    MissingBody,

    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Missing required input. The message is shown to the user verbatim.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Enter a common name")]
    MissingCommonName,

    #[error("Enter at least one name")]
    MissingName,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid form configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid form configuration: {0}")]
    Invalid(String),
}
