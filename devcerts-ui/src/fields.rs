//! Repeatable labeled input rows.
//!
//! Each row is `div.input-container > label + input.value-input + input[type=button]`.
//! Rows are appended in order and the order of `.value-input` elements under a
//! list container is the order of the submitted values.

use std::rc::Rc;

use crate::dom::Dom;
use crate::error::DomError;
use crate::ids::IdentifierAssigner;

/// Class carried by every value-bearing input
pub const VALUE_INPUT_CLASS: &str = "value-input";

/// Class of the wrapper around a row
pub const ROW_CLASS: &str = "input-container";

const REMOVE_LABEL: &str = "X";

/// The elements of one row. Removing the row detaches all of them.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRow<N> {
    wrapper: N,
    label: N,
    input: N,
    remove: N,
}

impl<N: Clone + PartialEq + std::fmt::Debug> FieldRow<N> {
    pub fn label(&self) -> &N {
        &self.label
    }

    pub fn input(&self) -> &N {
        &self.input
    }

    pub fn remove_control(&self) -> &N {
        &self.remove
    }

    pub fn wrapper(&self) -> &N {
        &self.wrapper
    }

    pub fn remove<D: Dom<Node = N>>(&self, dom: &D) {
        dom.detach(&self.remove);
        dom.detach(&self.label);
        dom.detach(&self.input);
        dom.detach(&self.wrapper);
    }
}

pub struct FieldListManager<D: Dom> {
    dom: Rc<D>,
    ids: IdentifierAssigner,
}

impl<D: Dom + 'static> FieldListManager<D> {
    pub fn new(dom: Rc<D>, ids: IdentifierAssigner) -> Self {
        Self { dom, ids }
    }

    /// Append a row to `container` and return its input
    pub fn add_field(
        &self,
        container: &D::Node,
        label: &str,
        placeholder: &str,
    ) -> Result<D::Node, DomError> {
        let row = self.add_row(container, label, placeholder)?;
        Ok(row.input)
    }

    pub fn add_row(
        &self,
        container: &D::Node,
        label: &str,
        placeholder: &str,
    ) -> Result<FieldRow<D::Node>, DomError> {
        let dom = &*self.dom;

        let input = dom.create_element("input")?;
        dom.set_attribute(&input, "type", "text")?;
        dom.set_attribute(&input, "class", VALUE_INPUT_CLASS)?;
        dom.set_attribute(&input, "placeholder", placeholder)?;

        let label_node = dom.create_element("label")?;
        dom.set_text(&label_node, label);
        let input_id = self.ids.ensure_id(dom, &input);
        dom.set_attribute(&label_node, "for", &input_id)?;

        let remove = dom.create_element("input")?;
        dom.set_attribute(&remove, "type", "button")?;
        dom.set_attribute(&remove, "value", REMOVE_LABEL)?;

        let wrapper = dom.create_element("div")?;
        dom.set_attribute(&wrapper, "class", ROW_CLASS)?;
        dom.append_child(&wrapper, &label_node)?;
        dom.append_child(&wrapper, &input)?;
        dom.append_child(&wrapper, &remove)?;

        let row = FieldRow {
            wrapper,
            label: label_node,
            input,
            remove,
        };

        // Weak so the document's handler table does not keep itself alive.
        // One-shot: the handler and its captured row are released on removal.
        let weak_dom = Rc::downgrade(&self.dom);
        let teardown = row.clone();
        dom.bind_click_once(
            &row.remove,
            Box::new(move || {
                if let Some(dom) = weak_dom.upgrade() {
                    teardown.remove(&*dom);
                    log::debug!("removed row {}", dom.id(&teardown.input));
                }
            }),
        );

        dom.append_child(container, &row.wrapper)?;
        log::debug!("added row {input_id}");
        Ok(row)
    }

    /// Non-empty values of the rows under `container`, in row order
    pub fn collect_values(&self, container: &D::Node) -> Vec<String> {
        collect_values(&*self.dom, container)
    }

    pub fn ids(&self) -> &IdentifierAssigner {
        &self.ids
    }
}

/// Read every value-bearing input under `container`, dropping empty strings
pub fn collect_values<D: Dom>(dom: &D, container: &D::Node) -> Vec<String> {
    dom.inputs_with_class(container, VALUE_INPUT_CLASS)
        .iter()
        .map(|input| dom.value(input))
        .filter(|value| !value.is_empty())
        .collect()
}
