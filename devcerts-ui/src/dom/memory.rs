use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::{ClickHandler, Dom, OnceClickHandler};
use crate::config::ElementIds;
use crate::error::DomError;

/// Handle to an element owned by a [`MemoryDom`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryNode(usize);

/// A form submission captured instead of navigating
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedForm {
    pub action: String,
    pub method: String,
    /// Named input values in document order
    pub fields: Vec<(String, String)>,
    /// Whether the form was attached to the document when submitted
    pub attached: bool,
}

impl SubmittedForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Default)]
struct NodeData {
    tag: String,
    id: String,
    attributes: Vec<(String, String)>,
    text: String,
    value: Option<String>,
    visible: bool,
    parent: Option<usize>,
    children: Vec<usize>,
}

impl NodeData {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }
}

enum Handler {
    Repeat(ClickHandler),
    Once(OnceClickHandler),
}

/// In-memory document with a `<html><body>` root.
pub struct MemoryDom {
    nodes: RefCell<Vec<NodeData>>,
    handlers: RefCell<HashMap<usize, Handler>>,
    submissions: RefCell<Vec<SubmittedForm>>,
    reject_submissions: Cell<bool>,
    root: usize,
    body: usize,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    pub fn new() -> Self {
        let html = NodeData {
            tag: "html".to_string(),
            visible: true,
            children: vec![1],
            ..NodeData::default()
        };
        let body = NodeData {
            tag: "body".to_string(),
            visible: true,
            parent: Some(0),
            ..NodeData::default()
        };

        Self {
            nodes: RefCell::new(vec![html, body]),
            handlers: RefCell::new(HashMap::new()),
            submissions: RefCell::new(Vec::new()),
            reject_submissions: Cell::new(false),
            root: 0,
            body: 1,
        }
    }

    /// Document carrying every element the form controller expects,
    /// with the error region initially hidden.
    pub fn with_host_page(ids: &ElementIds) -> Self {
        let dom = Self::new();
        let body = MemoryNode(dom.body);

        dom.insert(&body, "label", "", &[("for", ids.common_name.as_str())]);
        dom.insert(&body, "input", &ids.common_name, &[("type", "text")]);
        dom.insert(&body, "input", &ids.add_host, &[("type", "button")]);
        dom.insert(&body, "input", &ids.add_ip, &[("type", "button")]);
        dom.insert(&body, "div", &ids.host_names_list, &[]);
        dom.insert(&body, "div", &ids.ips_list, &[]);
        dom.insert(&body, "input", &ids.generate, &[("type", "button")]);
        let error = dom.insert(&body, "div", &ids.error, &[]);
        dom.set_visible(&error, false);

        dom
    }

    /// Append a new element with `id` under `parent`
    pub fn insert(
        &self,
        parent: &MemoryNode,
        tag: &str,
        id: &str,
        attributes: &[(&str, &str)],
    ) -> MemoryNode {
        let node = self.alloc(tag);
        {
            let mut nodes = self.nodes.borrow_mut();
            let data = &mut nodes[node.0];
            data.id = id.to_string();
            data.attributes = attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
        }
        self.link(parent.0, node.0);
        node
    }

    /// Simulate a user click. Returns whether a handler ran; detached
    /// elements cannot be clicked.
    pub fn click(&self, node: &MemoryNode) -> bool {
        if !self.is_connected(node) {
            return false;
        }
        // Take the handler out so it may touch the document while running.
        let Some(handler) = self.handlers.borrow_mut().remove(&node.0) else {
            return false;
        };
        match handler {
            Handler::Repeat(mut handler) => {
                handler();
                // A node the handler detached keeps no handler
                if self.is_connected(node) {
                    self.handlers
                        .borrow_mut()
                        .entry(node.0)
                        .or_insert(Handler::Repeat(handler));
                }
            }
            Handler::Once(handler) => handler(),
        }
        true
    }

    /// Simulate typing into an input
    pub fn set_value(&self, node: &MemoryNode, value: &str) {
        self.nodes.borrow_mut()[node.0].value = Some(value.to_string());
    }

    pub fn is_connected(&self, node: &MemoryNode) -> bool {
        let nodes = self.nodes.borrow();
        let mut current = node.0;
        loop {
            if current == self.root {
                return true;
            }
            match nodes[current].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    pub fn is_visible(&self, node: &MemoryNode) -> bool {
        self.nodes.borrow()[node.0].visible
    }

    pub fn tag(&self, node: &MemoryNode) -> String {
        self.nodes.borrow()[node.0].tag.clone()
    }

    pub fn attribute(&self, node: &MemoryNode, name: &str) -> Option<String> {
        self.nodes.borrow()[node.0].attribute(name).map(str::to_string)
    }

    pub fn parent(&self, node: &MemoryNode) -> Option<MemoryNode> {
        self.nodes.borrow()[node.0].parent.map(MemoryNode)
    }

    pub fn children(&self, node: &MemoryNode) -> Vec<MemoryNode> {
        self.nodes.borrow()[node.0]
            .children
            .iter()
            .copied()
            .map(MemoryNode)
            .collect()
    }

    pub fn has_click_handler(&self, node: &MemoryNode) -> bool {
        self.handlers.borrow().contains_key(&node.0)
    }

    /// Number of click handlers still held by the document
    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Make every later `submit_form` fail, as a browser blocking navigation would
    pub fn reject_submissions(&self, reject: bool) {
        self.reject_submissions.set(reject);
    }

    pub fn submissions(&self) -> Vec<SubmittedForm> {
        self.submissions.borrow().clone()
    }

    fn alloc(&self, tag: &str) -> MemoryNode {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(NodeData {
            tag: tag.to_ascii_lowercase(),
            visible: true,
            ..NodeData::default()
        });
        MemoryNode(nodes.len() - 1)
    }

    fn link(&self, parent: usize, child: usize) {
        self.unlink(child);
        let mut nodes = self.nodes.borrow_mut();
        nodes[child].parent = Some(parent);
        nodes[parent].children.push(child);
    }

    fn unlink(&self, child: usize) {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(parent) = nodes[child].parent.take() {
            nodes[parent].children.retain(|&c| c != child);
        }
    }

    fn is_ancestor(&self, ancestor: usize, node: usize) -> bool {
        let nodes = self.nodes.borrow();
        let mut current = Some(node);
        while let Some(index) = current {
            if index == ancestor {
                return true;
            }
            current = nodes[index].parent;
        }
        false
    }

    fn descendants(&self, node: usize) -> Vec<usize> {
        let nodes = self.nodes.borrow();
        let mut out = Vec::new();
        let mut stack: Vec<usize> = nodes[node].children.iter().rev().copied().collect();
        while let Some(index) = stack.pop() {
            out.push(index);
            stack.extend(nodes[index].children.iter().rev().copied());
        }
        out
    }
}

impl Dom for MemoryDom {
    type Node = MemoryNode;

    fn element_by_id(&self, id: &str) -> Option<MemoryNode> {
        if id.is_empty() {
            return None;
        }
        let root = self.root;
        let found = self
            .descendants(root)
            .into_iter()
            .find(|&index| self.nodes.borrow()[index].id == id);
        found.map(MemoryNode)
    }

    fn body(&self) -> Option<MemoryNode> {
        Some(MemoryNode(self.body))
    }

    fn create_element(&self, tag: &str) -> Result<MemoryNode, DomError> {
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomError::Rejected(format!("invalid tag name '{tag}'")));
        }
        Ok(self.alloc(tag))
    }

    fn id(&self, node: &MemoryNode) -> String {
        self.nodes.borrow()[node.0].id.clone()
    }

    fn set_id(&self, node: &MemoryNode, id: &str) {
        self.nodes.borrow_mut()[node.0].id = id.to_string();
    }

    fn set_attribute(&self, node: &MemoryNode, name: &str, value: &str) -> Result<(), DomError> {
        if name.is_empty() {
            return Err(DomError::Rejected("empty attribute name".to_string()));
        }
        let mut nodes = self.nodes.borrow_mut();
        let data = &mut nodes[node.0];
        match data.attributes.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => data.attributes.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn text(&self, node: &MemoryNode) -> String {
        self.nodes.borrow()[node.0].text.clone()
    }

    fn set_text(&self, node: &MemoryNode, text: &str) {
        self.nodes.borrow_mut()[node.0].text = text.to_string();
    }

    fn value(&self, node: &MemoryNode) -> String {
        let nodes = self.nodes.borrow();
        let data = &nodes[node.0];
        data.value
            .clone()
            .or_else(|| data.attribute("value").map(str::to_string))
            .unwrap_or_default()
    }

    fn append_child(&self, parent: &MemoryNode, child: &MemoryNode) -> Result<(), DomError> {
        if self.is_ancestor(child.0, parent.0) {
            return Err(DomError::Rejected(
                "cannot append a node to its own subtree".to_string(),
            ));
        }
        self.link(parent.0, child.0);
        Ok(())
    }

    fn detach(&self, node: &MemoryNode) {
        self.unlink(node.0);
    }

    fn set_visible(&self, node: &MemoryNode, visible: bool) {
        self.nodes.borrow_mut()[node.0].visible = visible;
    }

    fn inputs_with_class(&self, container: &MemoryNode, class: &str) -> Vec<MemoryNode> {
        let descendants = self.descendants(container.0);
        let nodes = self.nodes.borrow();
        descendants
            .into_iter()
            .filter(|&index| nodes[index].tag == "input" && nodes[index].has_class(class))
            .map(MemoryNode)
            .collect()
    }

    fn labels_for(&self, id: &str) -> Vec<MemoryNode> {
        let root = self.root;
        let descendants = self.descendants(root);
        let nodes = self.nodes.borrow();
        descendants
            .into_iter()
            .filter(|&index| nodes[index].tag == "label" && nodes[index].attribute("for") == Some(id))
            .map(MemoryNode)
            .collect()
    }

    fn bind_click(&self, node: &MemoryNode, handler: ClickHandler) {
        self.handlers
            .borrow_mut()
            .insert(node.0, Handler::Repeat(handler));
    }

    fn bind_click_once(&self, node: &MemoryNode, handler: OnceClickHandler) {
        self.handlers
            .borrow_mut()
            .insert(node.0, Handler::Once(handler));
    }

    fn submit_form(&self, form: &MemoryNode) -> Result<(), DomError> {
        if self.reject_submissions.get() {
            return Err(DomError::Rejected("form submission blocked".to_string()));
        }
        let (action, method) = {
            let nodes = self.nodes.borrow();
            let data = &nodes[form.0];
            if data.tag != "form" {
                return Err(DomError::Rejected(format!(
                    "cannot submit a <{}> element",
                    data.tag
                )));
            }
            (
                data.attribute("action").unwrap_or_default().to_string(),
                data.attribute("method").unwrap_or("GET").to_ascii_uppercase(),
            )
        };

        let fields = self
            .descendants(form.0)
            .into_iter()
            .filter_map(|index| {
                let node = MemoryNode(index);
                let name = self.attribute(&node, "name")?;
                (self.tag(&node) == "input").then(|| (name, self.value(&node)))
            })
            .collect();

        let attached = self.is_connected(form);
        self.submissions.borrow_mut().push(SubmittedForm {
            action,
            method,
            fields,
            attached,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn host_page_exposes_contract_elements() {
        let ids = ElementIds::default();
        let dom = MemoryDom::with_host_page(&ids);

        for id in [
            &ids.common_name,
            &ids.add_host,
            &ids.add_ip,
            &ids.generate,
            &ids.host_names_list,
            &ids.ips_list,
            &ids.error,
        ] {
            assert!(dom.element_by_id(id).is_some(), "missing #{id}");
        }
        let error = dom.element_by_id(&ids.error).unwrap();
        assert!(!dom.is_visible(&error));
    }

    #[test]
    fn detached_elements_are_not_found_or_clickable() {
        let dom = MemoryDom::new();
        let body = dom.body().unwrap();
        let button = dom.insert(&body, "input", "btn", &[("type", "button")]);

        let clicks = Rc::new(Cell::new(0));
        let counter = clicks.clone();
        dom.bind_click(&button, Box::new(move || counter.set(counter.get() + 1)));

        assert!(dom.click(&button));
        dom.detach(&button);
        assert!(!dom.click(&button));
        assert_eq!(clicks.get(), 1);
        assert!(dom.element_by_id("btn").is_none());
    }

    #[test]
    fn once_handler_runs_a_single_time() {
        let dom = MemoryDom::new();
        let body = dom.body().unwrap();
        let button = dom.insert(&body, "input", "once", &[("type", "button")]);
        let clicks = Rc::new(Cell::new(0));

        let counter = clicks.clone();
        dom.bind_click_once(&button, Box::new(move || counter.set(counter.get() + 1)));

        assert!(dom.click(&button));
        assert!(!dom.click(&button));
        assert_eq!(clicks.get(), 1);
        assert_eq!(dom.handler_count(), 0);
    }

    #[test]
    fn handler_of_self_detaching_node_is_dropped() {
        let dom = Rc::new(MemoryDom::new());
        let body = dom.body().unwrap();
        let button = dom.insert(&body, "input", "self-remove", &[("type", "button")]);

        let weak = Rc::downgrade(&dom);
        dom.bind_click(
            &button,
            Box::new(move || {
                if let Some(dom) = weak.upgrade() {
                    dom.detach(&button);
                }
            }),
        );

        assert!(dom.click(&button));
        assert!(!dom.has_click_handler(&button));
        assert_eq!(dom.handler_count(), 0);
    }

    #[test]
    fn labels_are_found_by_target_id() {
        let dom = MemoryDom::with_host_page(&ElementIds::default());

        let labels = dom.labels_for("common-name");

        assert_eq!(labels.len(), 1);
        assert_eq!(dom.tag(&labels[0]), "label");
        assert!(dom.labels_for("ips-list").is_empty());
    }

    #[test]
    fn rejected_submission_is_not_recorded() {
        let dom = MemoryDom::new();
        let form = dom.create_element("form").unwrap();
        dom.reject_submissions(true);

        assert!(dom.submit_form(&form).is_err());
        assert!(dom.submissions().is_empty());
    }

    #[test]
    fn rebinding_replaces_handler() {
        let dom = MemoryDom::new();
        let body = dom.body().unwrap();
        let button = dom.insert(&body, "button", "b", &[]);
        let hits = Rc::new(RefCell::new(Vec::new()));

        let first = hits.clone();
        dom.bind_click(&button, Box::new(move || first.borrow_mut().push("first")));
        let second = hits.clone();
        dom.bind_click(&button, Box::new(move || second.borrow_mut().push("second")));

        dom.click(&button);
        assert_eq!(*hits.borrow(), vec!["second"]);
    }

    #[test]
    fn inputs_with_class_follow_document_order() {
        let dom = MemoryDom::new();
        let body = dom.body().unwrap();
        let list = dom.insert(&body, "div", "list", &[]);
        let row_a = dom.insert(&list, "div", "", &[]);
        let a = dom.insert(&row_a, "input", "", &[("class", "value-input")]);
        dom.insert(&row_a, "input", "", &[("class", "other")]);
        let row_b = dom.insert(&list, "div", "", &[]);
        let b = dom.insert(&row_b, "input", "", &[("class", "wide value-input")]);

        assert_eq!(dom.inputs_with_class(&list, "value-input"), vec![a, b]);
    }

    #[test]
    fn submit_records_named_inputs() {
        let dom = MemoryDom::new();
        let form = dom.create_element("form").unwrap();
        dom.set_attribute(&form, "action", "/post").unwrap();
        dom.set_attribute(&form, "method", "post").unwrap();
        let input = dom.create_element("input").unwrap();
        dom.set_attribute(&input, "name", "data").unwrap();
        dom.set_attribute(&input, "value", "{}").unwrap();
        dom.append_child(&form, &input).unwrap();

        dom.submit_form(&form).unwrap();

        let submitted = dom.submissions();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].method, "POST");
        assert_eq!(submitted[0].field("data"), Some("{}"));
        assert!(!submitted[0].attached);
    }

    #[test]
    fn append_into_own_subtree_is_rejected() {
        let dom = MemoryDom::new();
        let outer = dom.create_element("div").unwrap();
        let inner = dom.create_element("div").unwrap();
        dom.append_child(&outer, &inner).unwrap();

        assert!(dom.append_child(&inner, &outer).is_err());
    }

    #[test]
    fn typed_value_overrides_attribute() {
        let dom = MemoryDom::new();
        let input = dom.create_element("input").unwrap();
        dom.set_attribute(&input, "value", "initial").unwrap();
        assert_eq!(dom.value(&input), "initial");

        dom.set_value(&input, "typed");
        assert_eq!(dom.value(&input), "typed");
    }
}
