//! Sidebar render
//!
//! [`render`] is the attach-time routine of the sidebar element: it fills the
//! host with the chapter list, points relative links at the site root, marks
//! and reveals the current page, settles the scroll position and reports
//! which click listeners the host has to install.

use log::{debug, warn};
use serde::Serialize;

use crate::config::SidebarConfig;
use crate::dom::SidebarDom;
use crate::links::{CurrentPage, LinkTarget};
use crate::storage::{ScrollMemory, SessionStore};

/// Behaviour attached to a click listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Listener {
    /// Save the sidebar scroll offset when an anchor is clicked
    RememberScroll,
    /// Flip the expanded marker on the control's parent
    ToggleSection,
}

/// A click listener the host must install on `target`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventBinding<N> {
    pub target: N,
    pub listener: Listener,
    /// Passive listeners never delay the navigation that follows the click
    pub passive: bool,
}

/// How the sidebar scroll position was settled
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ScrollAction<N> {
    /// A remembered offset was applied
    Restored(f64),
    /// No offset was remembered; the active entry was centered
    Centered(N),
    /// Nothing remembered and nothing active
    Unchanged,
}

/// Everything a render changed or asks the host to do
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderOutcome<N> {
    /// Anchor carrying the active marker
    pub active: Option<N>,
    /// Elements given the expanded marker, in the order they were marked
    pub expanded: Vec<N>,
    /// Number of anchors whose target was prefixed with the root path
    pub rewritten: usize,
    pub scroll: ScrollAction<N>,
    pub bindings: Vec<EventBinding<N>>,
}

/// Anchor state settled by one pass over the chapter list
#[derive(Debug, Clone, PartialEq)]
pub struct Marking<N> {
    pub active: Option<N>,
    pub expanded: Vec<N>,
    pub rewritten: usize,
}

/// Render the sidebar into `dom` for `page`.
///
/// Never fails: storage errors are logged and treated as an empty store.
pub fn render<D, S>(
    dom: &mut D,
    page: &CurrentPage,
    config: &SidebarConfig,
    store: &mut S,
) -> RenderOutcome<D::Node>
where
    D: SidebarDom,
    S: SessionStore + ?Sized,
{
    dom.replace_content(&config.markup);
    let marking = mark_current_page(dom, page, config);

    let root = dom.root();
    let mut bindings = vec![EventBinding {
        target: root,
        listener: Listener::RememberScroll,
        passive: true,
    }];

    let scroll = settle_scroll(dom, config, store);

    for node in dom.anchors() {
        if dom.has_class(&node, &config.classes.toggle) {
            bindings.push(EventBinding {
                target: node,
                listener: Listener::ToggleSection,
                passive: false,
            });
        }
    }

    debug!(
        "Rendered sidebar for {}: {} links rewritten, {} sections expanded, {} listeners",
        page.canonical(),
        marking.rewritten,
        marking.expanded.len(),
        bindings.len()
    );

    RenderOutcome {
        active: marking.active,
        expanded: marking.expanded,
        rewritten: marking.rewritten,
        scroll,
        bindings,
    }
}

/// Rewrite relative anchors against the root path, then mark the anchor for
/// `page` active and expand every section that contains it.
///
/// The first anchor also stands for the site's default document when the
/// page sits at the site root. Only the first matching anchor is marked.
pub fn mark_current_page<D: SidebarDom>(
    dom: &mut D,
    page: &CurrentPage,
    config: &SidebarConfig,
) -> Marking<D::Node> {
    let mut marking = Marking {
        active: None,
        expanded: Vec::new(),
        rewritten: 0,
    };
    let index_alias = config.root_path.is_empty() && page.is_default_document();

    for (index, link) in dom.anchors().into_iter().enumerate() {
        let mut href = dom.attribute(&link, "href");
        if let Some(target) = href.as_deref().and_then(LinkTarget::classify) {
            if target.is_relative() {
                let rewritten = target.rewrite(&config.root_path).into_owned();
                dom.set_attribute(&link, "href", &rewritten);
                href = Some(rewritten);
                marking.rewritten += 1;
            }
        }

        if marking.active.is_some() {
            continue;
        }
        if page.matches(href.as_deref()) || (index == 0 && index_alias) {
            debug!("Active sidebar entry: {:?}", href);
            reveal(dom, &link, config, &mut marking.expanded);
            marking.active = Some(link);
        }
    }

    marking
}

fn reveal<D: SidebarDom>(
    dom: &mut D,
    link: &D::Node,
    config: &SidebarConfig,
    expanded: &mut Vec<D::Node>,
) {
    let classes = &config.classes;
    dom.add_class(link, &classes.active);

    let mut parent = dom.parent(link);
    if let Some(item) = parent.as_ref() {
        if dom.has_class(item, &classes.chapter_item) {
            expand(dom, item, &classes.expanded, expanded);
        }
    }

    // A nested section lives in its own `li` right after the chapter item
    // that owns it
    while let Some(node) = parent {
        if dom.is_tag(&node, "li") {
            if let Some(owner) = dom.previous_element_sibling(&node) {
                if dom.has_class(&owner, &classes.chapter_item) {
                    expand(dom, &owner, &classes.expanded, expanded);
                }
            }
        }
        parent = dom.parent(&node);
    }
}

fn expand<D: SidebarDom>(dom: &mut D, node: &D::Node, class: &str, expanded: &mut Vec<D::Node>) {
    dom.add_class(node, class);
    if !expanded.contains(node) {
        expanded.push(node.clone());
    }
}

fn settle_scroll<D, S>(dom: &mut D, config: &SidebarConfig, store: &mut S) -> ScrollAction<D::Node>
where
    D: SidebarDom,
    S: SessionStore + ?Sized,
{
    let memory = ScrollMemory::new(&config.scroll_key);
    let remembered = memory.take(store).unwrap_or_else(|e| {
        warn!("Could not read sidebar scroll offset: {e}");
        None
    });

    if let Some(offset) = remembered {
        dom.set_scroll_top(offset);
        return ScrollAction::Restored(offset);
    }

    match dom.first_with_class(&config.classes.active) {
        Some(active) => {
            dom.scroll_into_view_centered(&active);
            ScrollAction::Centered(active)
        }
        None => ScrollAction::Unchanged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SidebarError, SidebarResult};
    use crate::storage::{MemoryStore, SCROLL_KEY};
    use crate::tree::{NodeId, SidebarTree};

    /// Storage that fails every operation
    struct BrokenStore;

    impl SessionStore for BrokenStore {
        fn get(&self, _key: &str) -> SidebarResult<Option<String>> {
            Err(SidebarError::Storage("quota exceeded".to_string()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> SidebarResult<()> {
            Err(SidebarError::Storage("quota exceeded".to_string()))
        }

        fn remove(&mut self, _key: &str) -> SidebarResult<()> {
            Err(SidebarError::Storage("quota exceeded".to_string()))
        }
    }

    const TOC: &str = concat!(
        r#"<ol class="chapter">"#,
        r#"<li class="chapter-item "><a href="intro.html">Intro</a></li>"#,
        r#"<li class="chapter-item "><a href="guide/index.html">Guide</a><a class="toggle"><div>❱</div></a></li>"#,
        r#"<li><ol class="section">"#,
        r#"<li class="chapter-item "><a href="guide/setup.html">Setup</a></li>"#,
        r#"<li class="chapter-item "><a href="guide/usage.html#flags">Usage</a></li>"#,
        r#"</ol></li>"#,
        r#"<li class="chapter-item "><a href="https://example.org/blog/">Blog</a></li>"#,
        r##"<li class="chapter-item "><a href="#top">Top</a></li>"##,
        r#"</ol>"#
    );

    fn render_page(
        location: &str,
        root_path: &str,
        store: &mut MemoryStore,
    ) -> (SidebarTree, RenderOutcome<NodeId>) {
        let mut tree = SidebarTree::new();
        let page = CurrentPage::parse(location).unwrap();
        let config = SidebarConfig::new(TOC).with_root_path(root_path);
        let outcome = render(&mut tree, &page, &config, store);
        (tree, outcome)
    }

    #[test]
    fn test_rewrites_only_relative_targets() {
        let (tree, outcome) =
            render_page("https://docs.example/guide/setup.html", "../", &mut MemoryStore::new());
        assert_eq!(outcome.rewritten, 4);
        assert!(tree.find_by_href("../intro.html").is_some());
        assert!(tree.find_by_href("../guide/usage.html#flags").is_some());
        assert!(tree.find_by_href("https://example.org/blog/").is_some());
        assert!(tree.find_by_href("#top").is_some());
    }

    #[test]
    fn test_marks_nested_entry_and_expands_owner() {
        let (tree, outcome) =
            render_page("https://docs.example/guide/setup.html", "../", &mut MemoryStore::new());
        let setup = tree.find_by_href("../guide/setup.html").unwrap();
        let guide = tree.find_by_text("li", "Guide").unwrap();

        assert_eq!(outcome.active, Some(setup));
        assert_eq!(tree.elements_with_class("active"), vec![setup]);
        assert!(tree.has_class(&guide, "expanded"));
        let setup_item = tree.parent(&setup).unwrap();
        assert!(tree.has_class(&setup_item, "expanded"));
        assert_eq!(outcome.expanded, vec![setup_item, guide]);
    }

    #[test]
    fn test_no_match_leaves_tree_unmarked() {
        let (tree, outcome) =
            render_page("https://docs.example/missing.html", "", &mut MemoryStore::new());
        assert_eq!(outcome.active, None);
        assert!(outcome.expanded.is_empty());
        assert!(tree.elements_with_class("active").is_empty());
        assert_eq!(outcome.scroll, ScrollAction::Unchanged);
        assert_eq!(tree.scrolled_into_view(), None);
    }

    #[test]
    fn test_index_alias_marks_first_anchor() {
        let (tree, outcome) = render_page("https://docs.example/", "", &mut MemoryStore::new());
        let intro = tree.find_by_href("intro.html").unwrap();
        assert_eq!(outcome.active, Some(intro));
    }

    #[test]
    fn test_index_alias_needs_empty_root_path() {
        let (_, outcome) = render_page("https://docs.example/sub/", "../", &mut MemoryStore::new());
        assert_eq!(outcome.active, None);
    }

    #[test]
    fn test_fragment_in_location_prevents_match() {
        let (_, outcome) =
            render_page("https://docs.example/intro.html#history", "", &mut MemoryStore::new());
        assert_eq!(outcome.active, None);
    }

    #[test]
    fn test_centers_active_without_saved_offset() {
        let (tree, outcome) = render_page("https://docs.example/intro.html", "", &mut MemoryStore::new());
        let intro = tree.find_by_href("intro.html").unwrap();
        assert_eq!(outcome.scroll, ScrollAction::Centered(intro));
        assert_eq!(tree.scrolled_into_view(), Some(intro));
        assert_eq!(tree.scroll_top(), 0.0);
    }

    #[test]
    fn test_restores_saved_offset_once() {
        let mut store = MemoryStore::new();
        store.set(SCROLL_KEY, "312").unwrap();

        let (tree, outcome) = render_page("https://docs.example/intro.html", "", &mut store);
        assert_eq!(outcome.scroll, ScrollAction::Restored(312.0));
        assert_eq!(tree.scroll_top(), 312.0);
        assert_eq!(tree.scrolled_into_view(), None);
        assert!(store.is_empty());

        let (_, again) = render_page("https://docs.example/intro.html", "", &mut store);
        assert!(matches!(again.scroll, ScrollAction::Centered(_)));
    }

    #[test]
    fn test_bindings_cover_root_and_toggles() {
        let (tree, outcome) = render_page("https://docs.example/intro.html", "", &mut MemoryStore::new());
        assert_eq!(outcome.bindings.len(), 2);
        assert_eq!(
            outcome.bindings[0],
            EventBinding {
                target: tree.root_id(),
                listener: Listener::RememberScroll,
                passive: true,
            }
        );
        let toggle = tree.elements_with_class("toggle")[0];
        assert_eq!(outcome.bindings[1].target, toggle);
        assert_eq!(outcome.bindings[1].listener, Listener::ToggleSection);
        assert!(!outcome.bindings[1].passive);
    }

    #[test]
    fn test_marking_is_idempotent() {
        let page = CurrentPage::parse("https://docs.example/guide/setup.html").unwrap();
        let config = SidebarConfig::new(TOC).with_root_path("../");
        let mut tree = SidebarTree::new();

        render(&mut tree, &page, &config, &mut MemoryStore::new());
        let first = tree.to_html();
        render(&mut tree, &page, &config, &mut MemoryStore::new());
        assert_eq!(tree.to_html(), first);
    }

    #[test]
    fn test_custom_class_names() {
        let page = CurrentPage::parse("https://docs.example/guide/setup.html").unwrap();
        let classes = crate::config::ClassNames {
            active: "current".to_string(),
            expanded: "open".to_string(),
            ..Default::default()
        };
        let config = SidebarConfig::new(TOC).with_root_path("../").with_classes(classes);
        let mut tree = SidebarTree::new();
        let outcome = render(&mut tree, &page, &config, &mut MemoryStore::new());

        assert_eq!(tree.elements_with_class("current"), vec![outcome.active.unwrap()]);
        assert!(tree.elements_with_class("active").is_empty());
        assert_eq!(tree.elements_with_class("open").len(), 2);
    }

    #[test]
    fn test_only_first_match_is_active() {
        let markup = concat!(
            r#"<ol class="chapter">"#,
            r#"<li class="chapter-item "><a href="intro.html">Intro</a></li>"#,
            r#"<li class="chapter-item "><a href="guide.html">Guide</a></li>"#,
            r#"<li class="chapter-item "><a href="guide.html">Guide again</a></li>"#,
            r#"<li class="chapter-item "><a href="index.html">Home</a></li>"#,
            r#"</ol>"#
        );
        let config = SidebarConfig::new(markup);

        let page = CurrentPage::parse("https://docs.example/guide.html").unwrap();
        let mut tree = SidebarTree::new();
        let outcome = render(&mut tree, &page, &config, &mut MemoryStore::new());
        let guide = tree.find_by_text("a", "Guide").unwrap();
        assert_eq!(outcome.active, Some(guide));
        assert_eq!(tree.elements_with_class("active"), vec![guide]);
        assert_eq!(outcome.rewritten, 4);

        // The index alias claims the first anchor before the real index link
        let page = CurrentPage::parse("https://docs.example/").unwrap();
        let outcome = render(&mut tree, &page, &config, &mut MemoryStore::new());
        let intro = tree.find_by_href("intro.html").unwrap();
        assert_eq!(outcome.active, Some(intro));
        assert_eq!(tree.elements_with_class("active"), vec![intro]);
    }

    #[test]
    fn test_failing_store_falls_back_to_centering() {
        let page = CurrentPage::parse("https://docs.example/intro.html").unwrap();
        let config = SidebarConfig::new(TOC);
        let mut tree = SidebarTree::new();

        let outcome = render(&mut tree, &page, &config, &mut BrokenStore);
        let intro = tree.find_by_href("intro.html").unwrap();
        assert_eq!(outcome.active, Some(intro));
        assert_eq!(outcome.scroll, ScrollAction::Centered(intro));
        assert_eq!(tree.scrolled_into_view(), Some(intro));
        assert_eq!(outcome.bindings.len(), 2);
    }
}
