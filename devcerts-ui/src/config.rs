use serde::{Deserialize, Serialize};
use shared_types::{SchemaVariant, CREATE_CERTIFICATE_PATH};

use crate::dom::Dom;
use crate::error::ConfigError;

/// Id of the optional `<script type="application/json">` block holding a `FormConfig`
pub const CONFIG_ELEMENT_ID: &str = "devcerts-config";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct FormConfig {
    /// Ids of the elements the host page provides
    pub elements: ElementIds,
    /// Form action the payload is posted to
    pub action: String,
    /// Which payload schema to produce
    pub schema: SchemaVariant,
    /// Row created by the add-host control
    pub host_row: RowTemplate,
    /// Row created by the add-ip control
    pub ip_row: RowTemplate,
    /// Prefix of generated element ids
    pub id_prefix: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            elements: ElementIds::default(),
            action: CREATE_CERTIFICATE_PATH.to_string(),
            schema: SchemaVariant::default(),
            host_row: RowTemplate {
                label: "Domain: ".to_string(),
                placeholder: "example.com".to_string(),
            },
            ip_row: RowTemplate {
                label: "IP: ".to_string(),
                placeholder: "127.0.0.1".to_string(),
            },
            id_prefix: "unique-id".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementIds {
    /// Only read by the explicit-common-name schema
    pub common_name: String,
    pub add_host: String,
    pub add_ip: String,
    pub generate: String,
    pub host_names_list: String,
    pub ips_list: String,
    pub error: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            common_name: "common-name".to_string(),
            add_host: "add-host".to_string(),
            add_ip: "add-ip".to_string(),
            generate: "generate".to_string(),
            host_names_list: "host-names-list".to_string(),
            ips_list: "ips-list".to_string(),
            error: "error".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RowTemplate {
    pub label: String,
    pub placeholder: String,
}

impl FormConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read the host page's config block, falling back to defaults when it
    /// is absent or unusable.
    pub fn from_dom<D: Dom>(dom: &D) -> Self {
        let Some(node) = dom.element_by_id(CONFIG_ELEMENT_ID) else {
            return Self::default();
        };

        let json = dom.text(&node);
        if json.trim().is_empty() {
            return Self::default();
        }

        match Self::from_json(&json) {
            Ok(config) => {
                log::debug!("loaded form config from #{CONFIG_ELEMENT_ID}");
                config
            }
            Err(e) => {
                log::warn!("{e}; using defaults");
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.action.is_empty() {
            return Err(ConfigError::Invalid("action must not be empty".to_string()));
        }
        if self.id_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "idPrefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;

    #[test]
    fn defaults_match_host_page_contract() {
        let config = FormConfig::default();
        assert_eq!(config.action, "/create-certificate");
        assert_eq!(config.elements.host_names_list, "host-names-list");
        assert_eq!(config.host_row.placeholder, "example.com");
        assert_eq!(config.ip_row.label, "IP: ");
        assert_eq!(config.schema, SchemaVariant::DerivedCommonName);
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config = FormConfig::from_json(
            r#"{"schema":"explicit-common-name","elements":{"error":"problem"}}"#,
        )
        .unwrap();

        assert_eq!(config.schema, SchemaVariant::ExplicitCommonName);
        assert_eq!(config.elements.error, "problem");
        assert_eq!(config.elements.generate, "generate");
        assert_eq!(config.id_prefix, "unique-id");
    }

    #[test]
    fn empty_action_is_rejected() {
        let err = FormConfig::from_json(r#"{"action":""}"#).unwrap_err();
        assert!(err.to_string().contains("action"));
    }

    #[test]
    fn from_dom_reads_config_block() {
        let dom = MemoryDom::new();
        let body = dom.body().unwrap();
        let script = dom.insert(&body, "script", CONFIG_ELEMENT_ID, &[]);
        dom.set_text(&script, r#"{"idPrefix":"field"}"#);

        assert_eq!(FormConfig::from_dom(&dom).id_prefix, "field");
    }

    #[test]
    fn from_dom_falls_back_on_malformed_block() {
        let dom = MemoryDom::new();
        let body = dom.body().unwrap();
        let script = dom.insert(&body, "script", CONFIG_ELEMENT_ID, &[]);
        dom.set_text(&script, "{not json");

        assert_eq!(FormConfig::from_dom(&dom), FormConfig::default());
    }

    #[test]
    fn from_dom_without_block_uses_defaults() {
        let dom = MemoryDom::new();
        assert_eq!(FormConfig::from_dom(&dom), FormConfig::default());
    }
}
