use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, HtmlFormElement, HtmlInputElement, MouseEvent};

use super::{ClickHandler, Dom, OnceClickHandler};
use crate::error::DomError;

/// Browser document accessed through web-sys
pub struct WebDom {
    document: Document,
}

impl WebDom {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// The document of the global `window`
    pub fn from_window() -> Result<Self, DomError> {
        let document = web_sys::window()
            .ok_or_else(|| DomError::Unavailable("no global `window` exists".to_string()))?
            .document()
            .ok_or_else(|| DomError::Unavailable("no document on window".to_string()))?;
        Ok(Self::new(document))
    }
}

impl Dom for WebDom {
    type Node = Element;

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn create_element(&self, tag: &str) -> Result<Element, DomError> {
        Ok(self.document.create_element(tag)?)
    }

    fn id(&self, node: &Element) -> String {
        node.id()
    }

    fn set_id(&self, node: &Element, id: &str) {
        node.set_id(id);
    }

    fn set_attribute(&self, node: &Element, name: &str, value: &str) -> Result<(), DomError> {
        Ok(node.set_attribute(name, value)?)
    }

    fn text(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn set_text(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn value(&self, node: &Element) -> String {
        match node.dyn_ref::<HtmlInputElement>() {
            Some(input) => input.value(),
            None => node.get_attribute("value").unwrap_or_default(),
        }
    }

    fn append_child(&self, parent: &Element, child: &Element) -> Result<(), DomError> {
        parent.append_child(child)?;
        Ok(())
    }

    fn detach(&self, node: &Element) {
        node.remove();
    }

    fn set_visible(&self, node: &Element, visible: bool) {
        if let Some(element) = node.dyn_ref::<HtmlElement>() {
            element.set_hidden(!visible);
        }
    }

    fn inputs_with_class(&self, container: &Element, class: &str) -> Vec<Element> {
        let Ok(list) = container.query_selector_all(&format!("input.{class}")) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn labels_for(&self, id: &str) -> Vec<Element> {
        let Ok(list) = self.document.query_selector_all("label") else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .filter(|label| label.get_attribute("for").as_deref() == Some(id))
            .collect()
    }

    fn bind_click(&self, node: &Element, mut handler: ClickHandler) {
        let Some(element) = node.dyn_ref::<HtmlElement>() else {
            log::warn!("click binding skipped for non-HTML element <{}>", node.tag_name());
            return;
        };
        let closure = Closure::wrap(Box::new(move |e: MouseEvent| {
            e.prevent_default();
            handler();
        }) as Box<dyn FnMut(MouseEvent)>);
        element.set_onclick(Some(closure.as_ref().unchecked_ref()));

        // The element owns the only reference to the handler; it lives as long as the page
        closure.forget();
    }

    fn bind_click_once(&self, node: &Element, handler: OnceClickHandler) {
        let Some(element) = node.dyn_ref::<HtmlElement>() else {
            log::warn!("click binding skipped for non-HTML element <{}>", node.tag_name());
            return;
        };
        let target = element.clone();
        // Freed by wasm-bindgen after its single invocation
        let callback = Closure::once_into_js(move |e: MouseEvent| {
            e.prevent_default();
            target.set_onclick(None);
            handler();
        });
        element.set_onclick(Some(callback.unchecked_ref()));
    }

    fn submit_form(&self, form: &Element) -> Result<(), DomError> {
        let form = form
            .dyn_ref::<HtmlFormElement>()
            .ok_or_else(|| DomError::Rejected(format!("cannot submit a <{}>", form.tag_name())))?;
        Ok(form.submit()?)
    }
}
