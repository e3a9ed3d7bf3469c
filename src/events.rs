//! Click handling for a rendered sidebar
//!
//! [`handle_click`] is the body of every listener [`render`] asks for and is
//! shared by the browser bindings. [`Sidebar`] owns an in-memory tree and a
//! store and dispatches clicks the way a browser would, so a whole
//! render / click / navigate cycle can run without a page.

use log::{debug, warn};

use crate::config::SidebarConfig;
use crate::dom::SidebarDom;
use crate::error::SidebarResult;
use crate::links::{CurrentPage, LinkTarget};
use crate::render::{render, EventBinding, Listener, RenderOutcome};
use crate::storage::{ScrollMemory, SessionStore};
use crate::tree::{NodeId, SidebarTree};

/// Run the listener of `binding` for a click whose original target is
/// `target`
pub fn handle_click<D, S>(
    dom: &mut D,
    store: &mut S,
    config: &SidebarConfig,
    binding: &EventBinding<D::Node>,
    target: &D::Node,
) -> SidebarResult<()>
where
    D: SidebarDom,
    S: SessionStore + ?Sized,
{
    match binding.listener {
        Listener::RememberScroll => {
            if dom.is_tag(target, "a") {
                let offset = dom.scroll_top();
                ScrollMemory::new(&config.scroll_key).save(store, offset)?;
                debug!("Remembered sidebar scroll offset {offset}");
            }
        }
        Listener::ToggleSection => {
            if let Some(section) = dom.parent(&binding.target) {
                let open = dom.toggle_class(&section, &config.classes.expanded);
                debug!("Section {:?} {}", section, if open { "expanded" } else { "collapsed" });
            }
        }
    }
    Ok(())
}

/// What a simulated click did
#[derive(Debug, Clone, PartialEq)]
pub struct ClickOutcome {
    /// Listeners that ran, innermost first
    pub fired: Vec<Listener>,
    /// Absolute URL the browser would navigate to next
    pub navigation: Option<String>,
}

/// A sidebar rendered into an in-memory tree
#[derive(Debug, Clone)]
pub struct Sidebar<S: SessionStore> {
    tree: SidebarTree,
    store: S,
    config: SidebarConfig,
    page: CurrentPage,
    outcome: RenderOutcome<NodeId>,
}

impl<S: SessionStore> Sidebar<S> {
    /// Attach a fresh sidebar to the page at `location`
    pub fn mount(config: SidebarConfig, location: &str, mut store: S) -> SidebarResult<Self> {
        config.validate()?;
        let page = CurrentPage::parse(location)?;
        let mut tree = SidebarTree::new();
        let outcome = render(&mut tree, &page, &config, &mut store);
        Ok(Self {
            tree,
            store,
            config,
            page,
            outcome,
        })
    }

    /// Leave this page for `location`, keeping the session store
    pub fn navigate(self, location: &str) -> SidebarResult<Self> {
        Self::mount(self.config, location, self.store)
    }

    /// Leave this page for `location` with a new root path, for pages at a
    /// different depth
    pub fn navigate_with_root(self, location: &str, root_path: &str) -> SidebarResult<Self> {
        let config = self.config.with_root_path(root_path);
        Self::mount(config, location, self.store)
    }

    /// Dispatch a click on `target`, bubbling from the target up to the host.
    ///
    /// Listener failures are logged and dispatch carries on; only an unknown
    /// `target` is an error.
    pub fn click(&mut self, target: NodeId) -> SidebarResult<ClickOutcome> {
        let target = self.tree.check(target)?;

        let mut path = vec![target];
        let mut cursor = self.tree.parent(&target);
        while let Some(node) = cursor {
            path.push(node);
            cursor = self.tree.parent(&node);
        }

        let mut fired = Vec::new();
        for node in &path {
            for binding in self.outcome.bindings.iter().filter(|b| b.target == *node) {
                // A failing listener does not stop the others or the navigation
                if let Err(e) =
                    handle_click(&mut self.tree, &mut self.store, &self.config, binding, &target)
                {
                    warn!("Sidebar {:?} listener failed: {e}", binding.listener);
                }
                fired.push(binding.listener);
            }
        }

        let navigation = path
            .iter()
            .find(|node| self.tree.is_tag(node, "a"))
            .and_then(|anchor| self.tree.attribute(anchor, "href"))
            .filter(|href| LinkTarget::classify(href).is_some())
            .and_then(|href| self.page.resolve(&href))
            .map(|url| url.to_string());

        Ok(ClickOutcome { fired, navigation })
    }

    /// Simulate the user scrolling the sidebar
    pub fn scroll_to(&mut self, offset: f64) {
        self.tree.set_scroll_top(offset);
    }

    pub fn tree(&self) -> &SidebarTree {
        &self.tree
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &SidebarConfig {
        &self.config
    }

    pub fn page(&self) -> &CurrentPage {
        &self.page
    }

    pub fn outcome(&self) -> &RenderOutcome<NodeId> {
        &self.outcome
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
