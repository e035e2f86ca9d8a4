use std::rc::{Rc, Weak};

use shared_types::SchemaVariant;

use crate::config::{FormConfig, RowTemplate};
use crate::dom::Dom;
use crate::error::{DomError, MountError};
use crate::error_presenter::ErrorPresenter;
use crate::fields::FieldListManager;
use crate::ids::IdentifierAssigner;
use crate::submit::{GenerateOutcome, SubmissionController};

/// What a page control does when activated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AddHost,
    AddIp,
    Generate,
}

/// The certificate request form mounted on a host page
pub struct FormApp<D: Dom> {
    fields: FieldListManager<D>,
    controller: SubmissionController<D>,
    host_names_list: D::Node,
    ips_list: D::Node,
    host_row: RowTemplate,
    ip_row: RowTemplate,
}

impl<D: Dom + 'static> FormApp<D> {
    /// Resolve the host page's elements and bind each control to its action
    pub fn mount(dom: Rc<D>, config: FormConfig) -> Result<Rc<Self>, MountError> {
        let ids = &config.elements;
        let find = |id: &str| {
            dom.element_by_id(id)
                .ok_or_else(|| MountError::MissingElement(id.to_string()))
        };

        let add_host = find(&ids.add_host)?;
        let add_ip = find(&ids.add_ip)?;
        let generate = find(&ids.generate)?;
        let host_names_list = find(&ids.host_names_list)?;
        let ips_list = find(&ids.ips_list)?;
        let error_region = find(&ids.error)?;
        let common_name = match config.schema {
            SchemaVariant::ExplicitCommonName => Some(find(&ids.common_name)?),
            SchemaVariant::DerivedCommonName => None,
        };
        // The derived schema takes the common name from the first host, so a
        // separate field on the page would be ignored
        show_common_name_field(&*dom, &ids.common_name, common_name.is_some());
        if dom.body().is_none() {
            return Err(MountError::MissingBody);
        }

        let errors = ErrorPresenter::new(dom.clone(), error_region);
        let controller = SubmissionController::new(
            dom.clone(),
            errors,
            config.schema,
            config.action,
            common_name,
            host_names_list.clone(),
            ips_list.clone(),
        );
        let fields = FieldListManager::new(dom.clone(), IdentifierAssigner::new(config.id_prefix));

        let app = Rc::new(Self {
            fields,
            controller,
            host_names_list,
            ips_list,
            host_row: config.host_row,
            ip_row: config.ip_row,
        });

        let weak = Rc::downgrade(&app);
        dom.bind_click(&add_host, handler(&weak, Action::AddHost));
        dom.bind_click(&add_ip, handler(&weak, Action::AddIp));
        dom.bind_click(&generate, handler(&weak, Action::Generate));

        log::info!("certificate form mounted ({:?})", config.schema);
        Ok(app)
    }

    pub fn dispatch(&self, action: Action) -> Result<(), DomError> {
        match action {
            Action::AddHost => self.add_host().map(|_| ()),
            Action::AddIp => self.add_ip().map(|_| ()),
            Action::Generate => self.generate().map(|_| ()),
        }
    }

    /// Append an empty host-name row and return its input
    pub fn add_host(&self) -> Result<D::Node, DomError> {
        self.fields.add_field(
            &self.host_names_list,
            &self.host_row.label,
            &self.host_row.placeholder,
        )
    }

    /// Append an empty IP row and return its input
    pub fn add_ip(&self) -> Result<D::Node, DomError> {
        self.fields
            .add_field(&self.ips_list, &self.ip_row.label, &self.ip_row.placeholder)
    }

    pub fn generate(&self) -> Result<GenerateOutcome, DomError> {
        self.controller.on_generate()
    }

    pub fn current_error(&self) -> Option<String> {
        self.controller.errors().current()
    }
}

fn show_common_name_field<D: Dom>(dom: &D, id: &str, visible: bool) {
    let Some(field) = dom.element_by_id(id) else {
        return;
    };
    dom.set_visible(&field, visible);
    for label in dom.labels_for(id) {
        dom.set_visible(&label, visible);
    }
}

fn handler<D: Dom + 'static>(app: &Weak<FormApp<D>>, action: Action) -> Box<dyn FnMut()> {
    let app = app.clone();
    Box::new(move || {
        let Some(app) = app.upgrade() else {
            return;
        };
        if let Err(e) = app.dispatch(action) {
            log::error!("{action:?} failed: {e}");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ElementIds;
    use crate::dom::MemoryDom;

    fn mounted(config: FormConfig) -> (Rc<MemoryDom>, Rc<FormApp<MemoryDom>>) {
        let dom = Rc::new(MemoryDom::with_host_page(&config.elements));
        let app = FormApp::mount(dom.clone(), config).unwrap();
        (dom, app)
    }

    #[test]
    fn controls_are_bound_once_each() {
        let config = FormConfig::default();
        let (dom, _app) = mounted(config.clone());

        for id in [
            &config.elements.add_host,
            &config.elements.add_ip,
            &config.elements.generate,
        ] {
            let control = dom.element_by_id(id).unwrap();
            assert!(dom.has_click_handler(&control), "#{id} not bound");
        }
    }

    #[test]
    fn add_controls_append_to_their_lists() {
        let config = FormConfig::default();
        let (dom, _app) = mounted(config.clone());
        let hosts = dom.element_by_id(&config.elements.host_names_list).unwrap();
        let ips = dom.element_by_id(&config.elements.ips_list).unwrap();

        dom.click(&dom.element_by_id("add-host").unwrap());
        dom.click(&dom.element_by_id("add-host").unwrap());
        dom.click(&dom.element_by_id("add-ip").unwrap());

        assert_eq!(dom.children(&hosts).len(), 2);
        assert_eq!(dom.children(&ips).len(), 1);
        let ip_input = &dom.inputs_with_class(&ips, "value-input")[0];
        assert_eq!(dom.attribute(ip_input, "placeholder").as_deref(), Some("127.0.0.1"));
    }

    #[test]
    fn missing_element_fails_mount() {
        let dom = Rc::new(MemoryDom::new());
        let err = FormApp::mount(dom, FormConfig::default()).err().unwrap();
        assert_eq!(err, MountError::MissingElement("add-host".to_string()));
    }

    #[test]
    fn common_name_field_only_required_for_explicit_schema() {
        let dom = Rc::new(MemoryDom::new());
        let body = dom.body().unwrap();
        let ids = ElementIds::default();
        for id in [&ids.add_host, &ids.add_ip, &ids.generate] {
            dom.insert(&body, "input", id, &[("type", "button")]);
        }
        for id in [&ids.host_names_list, &ids.ips_list, &ids.error] {
            dom.insert(&body, "div", id, &[]);
        }

        assert!(FormApp::mount(dom.clone(), FormConfig::default()).is_ok());

        let explicit = FormConfig {
            schema: SchemaVariant::ExplicitCommonName,
            ..FormConfig::default()
        };
        let err = FormApp::mount(dom, explicit).err().unwrap();
        assert_eq!(err, MountError::MissingElement("common-name".to_string()));
    }

    #[test]
    fn derived_schema_hides_common_name_field() {
        let config = FormConfig::default();
        let (dom, _app) = mounted(config.clone());

        let field = dom.element_by_id(&config.elements.common_name).unwrap();
        assert!(!dom.is_visible(&field));
        let labels = dom.labels_for(&config.elements.common_name);
        assert_eq!(labels.len(), 1);
        assert!(labels.iter().all(|label| !dom.is_visible(label)));
    }

    #[test]
    fn explicit_schema_shows_common_name_field() {
        let config = FormConfig {
            schema: SchemaVariant::ExplicitCommonName,
            ..FormConfig::default()
        };
        let dom = Rc::new(MemoryDom::with_host_page(&config.elements));
        let field = dom.element_by_id(&config.elements.common_name).unwrap();
        dom.set_visible(&field, false);

        let _app = FormApp::mount(dom.clone(), config.clone()).unwrap();

        assert!(dom.is_visible(&field));
        let label = dom.labels_for(&config.elements.common_name)[0];
        assert!(dom.is_visible(&label));
    }

    #[test]
    fn dropped_app_ignores_clicks() {
        let config = FormConfig::default();
        let (dom, app) = mounted(config.clone());
        drop(app);

        let add_host = dom.element_by_id(&config.elements.add_host).unwrap();
        dom.click(&add_host);

        let hosts = dom.element_by_id(&config.elements.host_names_list).unwrap();
        assert!(dom.children(&hosts).is_empty());
    }
}
