use std::cell::RefCell;
use std::rc::Rc;

use crate::dom::Dom;

/// Shows a single error message in the host page's error region.
/// Last call wins.
pub struct ErrorPresenter<D: Dom> {
    dom: Rc<D>,
    region: D::Node,
    current: RefCell<Option<String>>,
}

impl<D: Dom> ErrorPresenter<D> {
    pub fn new(dom: Rc<D>, region: D::Node) -> Self {
        Self {
            dom,
            region,
            current: RefCell::new(None),
        }
    }

    /// Show `message`, or hide the region when it is `None` or empty
    pub fn set_error(&self, message: Option<&str>) {
        match message.filter(|m| !m.is_empty()) {
            Some(message) => {
                self.dom.set_text(&self.region, message);
                self.dom.set_visible(&self.region, true);
                *self.current.borrow_mut() = Some(message.to_string());
            }
            None => {
                self.dom.set_text(&self.region, "");
                self.dom.set_visible(&self.region, false);
                *self.current.borrow_mut() = None;
            }
        }
    }

    pub fn clear(&self) {
        self.set_error(None);
    }

    /// The message currently on display
    pub fn current(&self) -> Option<String> {
        self.current.borrow().clone()
    }
}
