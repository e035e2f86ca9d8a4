//! Document abstraction the form controller is written against.
//!
//! `WebDom` drives a real browser document through web-sys; `MemoryDom`
//! keeps an in-memory tree with the same semantics so every behavior can be
//! exercised natively.

pub mod memory;
pub mod web;

use std::fmt::Debug;

use crate::error::DomError;

pub use memory::{MemoryDom, MemoryNode, SubmittedForm};
pub use web::WebDom;

/// Handler installed on an element's click. One per element.
pub type ClickHandler = Box<dyn FnMut()>;

/// Handler that runs on the first click only and is then released
pub type OnceClickHandler = Box<dyn FnOnce()>;

pub trait Dom {
    type Node: Clone + PartialEq + Debug;

    /// Look up an element attached to the document by its id
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    fn body(&self) -> Option<Self::Node>;

    /// Create a detached element
    fn create_element(&self, tag: &str) -> Result<Self::Node, DomError>;

    /// The element's id property, empty when unset
    fn id(&self, node: &Self::Node) -> String;

    fn set_id(&self, node: &Self::Node, id: &str);

    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str) -> Result<(), DomError>;

    fn text(&self, node: &Self::Node) -> String;

    fn set_text(&self, node: &Self::Node, text: &str);

    /// Current value of an input element
    fn value(&self, node: &Self::Node) -> String;

    fn append_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<(), DomError>;

    /// Detach a node from its parent. No-op when already detached.
    fn detach(&self, node: &Self::Node);

    fn set_visible(&self, node: &Self::Node, visible: bool);

    /// Every `<input>` under `container` carrying `class`, in document order
    fn inputs_with_class(&self, container: &Self::Node, class: &str) -> Vec<Self::Node>;

    /// `<label>` elements whose `for` names `id`
    fn labels_for(&self, id: &str) -> Vec<Self::Node>;

    /// Bind `handler` as the element's click action, replacing any earlier one
    fn bind_click(&self, node: &Self::Node, handler: ClickHandler);

    /// Bind a handler that is dropped after its first run, along with
    /// everything it captured
    fn bind_click_once(&self, node: &Self::Node, handler: OnceClickHandler);

    /// Submit a form element through the native submission mechanism
    fn submit_form(&self, form: &Self::Node) -> Result<(), DomError>;
}
