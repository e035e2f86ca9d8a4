use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::app::FormApp;
use crate::config::FormConfig;
use crate::dom::WebDom;

thread_local! {
    // Keeps the mounted form alive for the lifetime of the page
    static APP: RefCell<Option<Rc<FormApp<WebDom>>>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() {
    // Initialize logging for WASM
    wasm_logger::init(wasm_logger::Config::default());

    let dom = match WebDom::from_window() {
        Ok(dom) => Rc::new(dom),
        Err(e) => {
            log::error!("certificate form not started: {e}");
            return;
        }
    };

    let config = FormConfig::from_dom(&*dom);
    match FormApp::mount(dom, config) {
        Ok(app) => APP.with(|slot| *slot.borrow_mut() = Some(app)),
        Err(e) => log::error!("certificate form not mounted: {e}"),
    }
}
