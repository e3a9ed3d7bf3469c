//! WASM bindings for the sidebar renderer
//!
//! The page defines its sidebar custom element in a few lines of JavaScript
//! and calls `mountSidebar(this, config)` from `connectedCallback`, passing
//! the chapter markup and the page's path to the site root as JSON.

use std::rc::Rc;

use log::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    console, AddEventListenerOptions, Element, Event, HtmlElement, ScrollIntoViewOptions,
    ScrollLogicalPosition, Storage, Window,
};

use crate::config::SidebarConfig;
use crate::dom::SidebarDom;
use crate::error::{SidebarError, SidebarResult};
use crate::events::{handle_click, Sidebar};
use crate::links::CurrentPage;
use crate::render::{render, EventBinding};
use crate::storage::{MemoryStore, SessionStore};

// Use wee_alloc for smaller WASM binary
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(value: JsValue) -> SidebarError {
    SidebarError::Browser(format!("{value:?}"))
}

fn to_js(error: SidebarError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Report a failure in the browser console; no logger is installed in the page
fn console_warn(message: &str) {
    warn!("{message}");
    console::warn_1(&JsValue::from_str(message));
}

// ========================
// Live document access
// ========================

/// [`SidebarDom`] over the live sidebar element
#[derive(Debug, Clone)]
pub struct WebDom {
    root: Element,
}

impl WebDom {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    fn select(&self, selector: &str) -> Vec<Element> {
        match self.root.query_selector_all(selector) {
            Ok(list) => (0..list.length())
                .filter_map(|i| list.get(i))
                .filter_map(|node| node.dyn_into::<Element>().ok())
                .collect(),
            Err(e) => {
                warn!("Sidebar query {selector:?} failed: {e:?}");
                Vec::new()
            }
        }
    }
}

impl SidebarDom for WebDom {
    type Node = Element;

    fn root(&self) -> Element {
        self.root.clone()
    }

    fn replace_content(&mut self, markup: &str) {
        self.root.set_inner_html(markup);
    }

    fn descendants(&self) -> Vec<Element> {
        self.select("*")
    }

    fn anchors(&self) -> Vec<Element> {
        self.select("a")
    }

    fn parent(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }

    fn previous_element_sibling(&self, node: &Element) -> Option<Element> {
        node.previous_element_sibling()
    }

    fn tag_name(&self, node: &Element) -> String {
        node.tag_name().to_ascii_lowercase()
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&mut self, node: &Element, name: &str, value: &str) {
        if let Err(e) = node.set_attribute(name, value) {
            warn!("Could not set {name} on sidebar element: {e:?}");
        }
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn add_class(&mut self, node: &Element, class: &str) {
        if let Err(e) = node.class_list().add_1(class) {
            warn!("Could not add class {class}: {e:?}");
        }
    }

    fn toggle_class(&mut self, node: &Element, class: &str) -> bool {
        node.class_list().toggle(class).unwrap_or_else(|e| {
            warn!("Could not toggle class {class}: {e:?}");
            false
        })
    }

    fn scroll_top(&self) -> f64 {
        f64::from(self.root.scroll_top())
    }

    fn set_scroll_top(&mut self, offset: f64) {
        self.root.set_scroll_top(offset.round() as i32);
    }

    fn scroll_into_view_centered(&mut self, node: &Element) {
        let options = ScrollIntoViewOptions::new();
        options.set_block(ScrollLogicalPosition::Center);
        node.scroll_into_view_with_scroll_into_view_options(&options);
    }
}

/// [`SessionStore`] over `window.sessionStorage`
#[derive(Debug, Clone)]
pub struct WebSessionStore {
    storage: Storage,
}

impl WebSessionStore {
    pub fn from_window(window: &Window) -> SidebarResult<Self> {
        let storage = window
            .session_storage()
            .map_err(js_error)?
            .ok_or_else(|| SidebarError::Storage("sessionStorage is not available".to_string()))?;
        Ok(Self { storage })
    }
}

impl SessionStore for WebSessionStore {
    fn get(&self, key: &str) -> SidebarResult<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| SidebarError::Storage(format!("{e:?}")))
    }

    fn set(&mut self, key: &str, value: &str) -> SidebarResult<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| SidebarError::Storage(format!("{e:?}")))
    }

    fn remove(&mut self, key: &str) -> SidebarResult<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| SidebarError::Storage(format!("{e:?}")))
    }
}

/// Session storage, or a throwaway store when the browser refuses access
fn session_store() -> Box<dyn SessionStore> {
    let store = web_sys::window()
        .ok_or_else(|| SidebarError::Browser("no window".to_string()))
        .and_then(|window| WebSessionStore::from_window(&window));
    match store {
        Ok(store) => Box::new(store),
        Err(e) => {
            console_warn(&format!("Sidebar scroll position will not persist: {e}"));
            Box::new(MemoryStore::new())
        }
    }
}

// ========================
// Entry points
// ========================

/// Render the sidebar into `host` and install its click listeners.
///
/// `config_json` is a serialised [`SidebarConfig`].
#[wasm_bindgen(js_name = mountSidebar)]
pub fn mount_sidebar(host: HtmlElement, config_json: &str) -> Result<(), JsValue> {
    mount(host.into(), config_json).map_err(to_js)
}

fn mount(host: Element, config_json: &str) -> SidebarResult<()> {
    let config = SidebarConfig::from_json(config_json)?;
    let window = web_sys::window().ok_or_else(|| SidebarError::Browser("no window".to_string()))?;
    let location = window.location().href().map_err(js_error)?;
    let page = CurrentPage::parse(&location)?;

    let start = js_sys::Date::now();
    let mut dom = WebDom::new(host.clone());
    let mut store = session_store();
    let outcome = render(&mut dom, &page, &config, &mut *store);
    console::debug_1(&JsValue::from_str(&format!(
        "Sidebar rendered in {:.1} ms",
        js_sys::Date::now() - start
    )));

    let config = Rc::new(config);
    for binding in outcome.bindings {
        attach(binding, Rc::clone(&config), host.clone())?;
    }
    Ok(())
}

fn attach(
    binding: EventBinding<Element>,
    config: Rc<SidebarConfig>,
    host: Element,
) -> SidebarResult<()> {
    let target = binding.target.clone();
    let passive = binding.passive;

    let handler = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        let Some(clicked) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        let mut dom = WebDom::new(host.clone());
        let mut store = session_store();
        if let Err(e) = handle_click(&mut dom, &mut *store, &config, &binding, &clicked) {
            console_warn(&format!("Sidebar click handler failed: {e}"));
        }
    });

    let options = AddEventListenerOptions::new();
    options.set_passive(passive);
    target
        .add_event_listener_with_callback_and_add_event_listener_options(
            "click",
            handler.as_ref().unchecked_ref(),
            &options,
        )
        .map_err(js_error)?;
    // Listeners live as long as the page
    handler.forget();
    Ok(())
}

/// Render the sidebar for `location` without a browser and return its HTML.
///
/// Used to pre-render the sidebar into pages for readers without scripting.
#[wasm_bindgen(js_name = renderStatic)]
pub fn render_static(config_json: &str, location: &str) -> Result<String, JsValue> {
    let config = SidebarConfig::from_json(config_json).map_err(to_js)?;
    let sidebar = Sidebar::mount(config, location, MemoryStore::new()).map_err(to_js)?;
    Ok(sidebar.tree().to_html())
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
