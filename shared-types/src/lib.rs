//! Shared types between the certificate form and the certificate backend
//!
//! These types are used by both:
//! - the browser form controller (WASM)
//! - any native consumer of the `/create-certificate` form post
//!
//! Serializable with serde for JSON carried in a single form field

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ============================================================================
// Endpoint Contract
// ============================================================================

/// Path the generated form posts to
pub const CREATE_CERTIFICATE_PATH: &str = "/create-certificate";

/// HTTP method of the generated form
pub const CREATE_CERTIFICATE_METHOD: &str = "POST";

/// Name of the single hidden form field carrying the JSON payload
pub const DATA_FIELD_NAME: &str = "data";

// ============================================================================
// Payload Schema
// ============================================================================

/// Which payload schema the form produces.
///
/// Both shapes serialize to the same `{commonName, names, ips}` object; they
/// differ in where `commonName` comes from and what is required.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export, export_to = "../../devcerts-ui/static/generated.ts")]
pub enum SchemaVariant {
    /// Common name is typed into its own field and is mandatory.
    /// `names` may be empty and does not include it automatically.
    ExplicitCommonName,
    /// Common name is the first host name; at least one name is mandatory.
    #[default]
    DerivedCommonName,
}

/// Certificate request submitted as the `data` form field
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../../devcerts-ui/static/generated.ts")]
pub struct SubmissionPayload {
    /// Primary subject of the certificate
    pub common_name: String,
    /// DNS subject alternative names, in row order
    pub names: Vec<String>,
    /// IP subject alternative names, in row order
    pub ips: Vec<String>,
}

impl SubmissionPayload {
    /// Encode as the JSON string placed in the `data` field
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decode a `data` field value
    pub fn from_json(data: &str) -> serde_json::Result<Self> {
        serde_json::from_str(data)
    }

    /// True when the common name and every list entry are non-empty
    pub fn has_no_empty_values(&self) -> bool {
        !self.common_name.is_empty()
            && self.names.iter().all(|n| !n.is_empty())
            && self.ips.iter().all(|ip| !ip.is_empty())
    }
}
