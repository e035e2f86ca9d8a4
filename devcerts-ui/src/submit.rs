use std::rc::Rc;

use shared_types::{
    SchemaVariant, SubmissionPayload, CREATE_CERTIFICATE_METHOD, DATA_FIELD_NAME,
};

use crate::dom::Dom;
use crate::error::{DomError, ValidationError};
use crate::error_presenter::ErrorPresenter;
use crate::fields::collect_values;

/// Result of one activation of the generate control
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// The form was built and submitted with this payload
    Submitted(SubmissionPayload),
    /// Required input was missing; the message is on display
    Rejected(ValidationError),
}

/// Validate collected values and shape them into the payload for `variant`.
///
/// `names` and `ips` must already have empty entries removed.
pub fn build_payload(
    variant: SchemaVariant,
    common_name: Option<String>,
    names: Vec<String>,
    ips: Vec<String>,
) -> Result<SubmissionPayload, ValidationError> {
    let common_name = match variant {
        SchemaVariant::ExplicitCommonName => common_name
            .filter(|name| !name.is_empty())
            .ok_or(ValidationError::MissingCommonName)?,
        SchemaVariant::DerivedCommonName => names
            .first()
            .cloned()
            .ok_or(ValidationError::MissingName)?,
    };

    let payload = SubmissionPayload {
        common_name,
        names,
        ips,
    };
    debug_assert!(
        payload.has_no_empty_values(),
        "empty values must be filtered before building the payload"
    );
    Ok(payload)
}

/// Handles the generate action: collect, validate, then post a synthetic form
pub struct SubmissionController<D: Dom> {
    dom: Rc<D>,
    errors: ErrorPresenter<D>,
    variant: SchemaVariant,
    action: String,
    common_name: Option<D::Node>,
    names_list: D::Node,
    ips_list: D::Node,
}

impl<D: Dom> SubmissionController<D> {
    pub fn new(
        dom: Rc<D>,
        errors: ErrorPresenter<D>,
        variant: SchemaVariant,
        action: impl Into<String>,
        common_name: Option<D::Node>,
        names_list: D::Node,
        ips_list: D::Node,
    ) -> Self {
        Self {
            dom,
            errors,
            variant,
            action: action.into(),
            common_name,
            names_list,
            ips_list,
        }
    }

    pub fn on_generate(&self) -> Result<GenerateOutcome, DomError> {
        self.errors.clear();

        let names = collect_values(&*self.dom, &self.names_list);
        let ips = collect_values(&*self.dom, &self.ips_list);
        let common_name = match self.variant {
            SchemaVariant::ExplicitCommonName => {
                self.common_name.as_ref().map(|node| self.dom.value(node))
            }
            SchemaVariant::DerivedCommonName => None,
        };

        let payload = match build_payload(self.variant, common_name, names, ips) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("certificate request rejected: {e}");
                self.errors.set_error(Some(&e.to_string()));
                return Ok(GenerateOutcome::Rejected(e));
            }
        };

        self.submit(&payload)?;
        log::info!(
            "submitted certificate request for {} ({} names, {} ips)",
            payload.common_name,
            payload.names.len(),
            payload.ips.len()
        );
        Ok(GenerateOutcome::Submitted(payload))
    }

    pub fn errors(&self) -> &ErrorPresenter<D> {
        &self.errors
    }

    fn submit(&self, payload: &SubmissionPayload) -> Result<(), DomError> {
        let dom = &*self.dom;
        let data = payload
            .to_json()
            .map_err(|e| DomError::Rejected(format!("payload encoding failed: {e}")))?;

        let input = dom.create_element("input")?;
        dom.set_attribute(&input, "type", "hidden")?;
        dom.set_attribute(&input, "name", DATA_FIELD_NAME)?;
        dom.set_attribute(&input, "value", &data)?;

        let form = dom.create_element("form")?;
        dom.set_attribute(&form, "action", &self.action)?;
        dom.set_attribute(&form, "method", CREATE_CERTIFICATE_METHOD)?;
        dom.append_child(&form, &input)?;

        let body = dom
            .body()
            .ok_or_else(|| DomError::Unavailable("document has no <body>".to_string()))?;
        dom.append_child(&body, &form)?;
        if let Err(e) = dom.submit_form(&form) {
            dom.detach(&form);
            return Err(e);
        }
        Ok(())
    }
}
