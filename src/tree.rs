//! In-memory sidebar tree
//!
//! An arena of elements and text nodes rooted at the sidebar host element.
//! Markup is parsed with HTML5 tree-construction rules, so a generator that
//! leaves `<li>` elements implicitly closed produces the same nesting a
//! browser would.

use std::fmt;

use quick_xml::escape::escape;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};

use crate::dom::SidebarDom;
use crate::error::{SidebarError, SidebarResult};

/// Tag name of the host element the sidebar renders into
pub const HOST_TAG: &str = "mdbook-sidebar-scrollbox";

const VOID_TAGS: [&str; 8] = ["area", "br", "col", "embed", "hr", "img", "input", "wbr"];

/// Index of a node in a [`SidebarTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct ElementData {
    tag: String,
    attrs: Vec<(String, String)>,
}

impl ElementData {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn set_attr(&mut self, name: &str, value: String) {
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_ascii_whitespace()
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Rewrites the class attribute from a token list, the way `classList`
    /// serialises it after a mutation.
    fn store_classes(&mut self, classes: Vec<String>) {
        self.set_attr("class", classes.join(" "));
    }

    fn class_tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = Vec::new();
        for class in self.classes() {
            if !tokens.iter().any(|t| t == class) {
                tokens.push(class.to_string());
            }
        }
        tokens
    }
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// Arena-backed element tree for one sidebar instance
#[derive(Debug, Clone)]
pub struct SidebarTree {
    nodes: Vec<Node>,
    scroll_top: f64,
    scrolled_into_view: Option<NodeId>,
}

impl Default for SidebarTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SidebarTree {
    /// Create an empty host element
    pub fn new() -> Self {
        let host = Node {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Element(ElementData {
                tag: HOST_TAG.to_string(),
                attrs: Vec::new(),
            }),
        };
        Self {
            nodes: vec![host],
            scroll_top: 0.0,
            scrolled_into_view: None,
        }
    }

    /// Create a host element already holding `markup`
    pub fn from_markup(markup: &str) -> Self {
        let mut tree = Self::new();
        tree.load(markup);
        tree
    }

    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes below the host, text nodes included
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Last node passed to a scroll-into-view request
    pub fn scrolled_into_view(&self) -> Option<NodeId> {
        self.scrolled_into_view
    }

    /// Validate a node id coming from outside the tree
    pub fn check(&self, node: NodeId) -> SidebarResult<NodeId> {
        if node.0 < self.nodes.len() {
            Ok(node)
        } else {
            Err(SidebarError::NodeNotFound(node.0))
        }
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// Concatenated text of `node` and everything below it
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element(_) => {
                for child in &self.nodes[node.0].children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// All elements carrying `class`, in document order
    pub fn elements_with_class(&self, class: &str) -> Vec<NodeId> {
        self.descendants()
            .into_iter()
            .filter(|node| self.has_class(node, class))
            .collect()
    }

    /// First anchor whose `href` attribute equals `href`
    pub fn find_by_href(&self, href: &str) -> Option<NodeId> {
        self.anchors()
            .into_iter()
            .find(|node| self.attribute(node, "href").as_deref() == Some(href))
    }

    /// First `tag` element whose text content contains `needle`
    pub fn find_by_text(&self, tag: &str, needle: &str) -> Option<NodeId> {
        self.descendants()
            .into_iter()
            .find(|node| self.is_tag(node, tag) && self.text_content(*node).contains(needle))
    }

    /// Serialise the host's content back to HTML
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for child in &self.nodes[0].children {
            self.write_html(*child, &mut out);
        }
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => out.push_str(&escape(text.as_str())),
            NodeKind::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                for (name, value) in &element.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape(value.as_str()));
                    out.push('"');
                }
                out.push('>');
                if VOID_TAGS.contains(&element.tag.as_str()) {
                    return;
                }
                for child in &self.nodes[node.0].children {
                    self.write_html(*child, out);
                }
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
        }
    }

    fn load(&mut self, markup: &str) {
        // Every node past the host belongs to the old content
        self.nodes.truncate(1);
        self.nodes[0].children.clear();
        self.scrolled_into_view = None;

        let fragment = Html::parse_fragment(markup);
        let root = self.root_id();
        self.import_children(root, fragment.root_element());
    }

    fn import_children(&mut self, parent: NodeId, source: ElementRef<'_>) {
        for child in source.children() {
            if let Some(element) = ElementRef::wrap(child) {
                let mut attrs: Vec<(String, String)> = element
                    .value()
                    .attrs()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect();
                attrs.sort_by(|a, b| a.0.cmp(&b.0));
                let id = self.push(
                    parent,
                    NodeKind::Element(ElementData {
                        tag: element.value().name().to_ascii_lowercase(),
                        attrs,
                    }),
                );
                self.import_children(id, element);
            } else if let Some(text) = child.value().as_text() {
                self.push(parent, NodeKind::Text(String::from(&**text)));
            }
        }
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            kind,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    fn element(&self, node: NodeId) -> Option<&ElementData> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element(element) => Some(element),
            NodeKind::Text(_) => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(node.0)?.kind {
            NodeKind::Element(element) => Some(element),
            NodeKind::Text(_) => None,
        }
    }

    fn walk(&self, node: NodeId, out: &mut Vec<NodeId>) {
        for child in &self.nodes[node.0].children {
            if self.element(*child).is_some() {
                out.push(*child);
                self.walk(*child, out);
            }
        }
    }
}

impl SidebarDom for SidebarTree {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        self.root_id()
    }

    fn replace_content(&mut self, markup: &str) {
        self.load(markup);
    }

    fn descendants(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(self.root_id(), &mut out);
        out
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    fn previous_element_sibling(&self, node: &NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = &self.nodes[parent.0].children;
        let position = siblings.iter().position(|id| id == node)?;
        siblings[..position]
            .iter()
            .rev()
            .find(|id| self.element(**id).is_some())
            .copied()
    }

    fn tag_name(&self, node: &NodeId) -> String {
        self.element(*node)
            .map(|element| element.tag.clone())
            .unwrap_or_default()
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.element(*node)?.attr(name).map(str::to_string)
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        if let Some(element) = self.element_mut(*node) {
            element.set_attr(name, value.to_string());
        }
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.element(*node)
            .map(|element| element.has_class(class))
            .unwrap_or(false)
    }

    fn add_class(&mut self, node: &NodeId, class: &str) {
        if let Some(element) = self.element_mut(*node) {
            let mut tokens = element.class_tokens();
            if !tokens.iter().any(|t| t == class) {
                tokens.push(class.to_string());
            }
            element.store_classes(tokens);
        }
    }

    fn toggle_class(&mut self, node: &NodeId, class: &str) -> bool {
        let Some(element) = self.element_mut(*node) else {
            return false;
        };
        let mut tokens = element.class_tokens();
        let present = match tokens.iter().position(|t| t == class) {
            Some(index) => {
                tokens.remove(index);
                false
            }
            None => {
                tokens.push(class.to_string());
                true
            }
        };
        element.store_classes(tokens);
        present
    }

    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn set_scroll_top(&mut self, offset: f64) {
        // Element.scrollTop clamps negative offsets to zero
        self.scroll_top = offset.max(0.0);
    }

    fn scroll_into_view_centered(&mut self, node: &NodeId) {
        self.scrolled_into_view = Some(*node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implicit_list_items_become_siblings() {
        let tree = SidebarTree::from_markup(
            r#"<ol class="chapter"><li class="chapter-item affix "><li class="spacer"></li></ol>"#,
        );
        let list = tree.children(tree.root_id())[0];
        assert_eq!(tree.tag_name(&list), "ol");
        let items = tree.children(list);
        assert_eq!(items.len(), 2);
        assert!(tree.has_class(&items[0], "affix"));
        assert!(tree.has_class(&items[1], "spacer"));
        assert_eq!(tree.previous_element_sibling(&items[1]), Some(items[0]));
    }

    #[test]
    fn test_descendants_in_document_order() {
        let tree = SidebarTree::from_markup(r#"<ol><li><a href="a.html">A</a></li><li><a href="b.html">B</a></li></ol>"#);
        let anchors = tree.anchors();
        assert_eq!(anchors.len(), 2);
        assert_eq!(tree.attribute(&anchors[0], "href").as_deref(), Some("a.html"));
        assert_eq!(tree.attribute(&anchors[1], "href").as_deref(), Some("b.html"));
    }

    #[test]
    fn test_class_mutation_normalises_attribute() {
        let mut tree = SidebarTree::from_markup(r#"<ol><li class="chapter-item ">x</li></ol>"#);
        let item = tree.first_with_class("chapter-item").unwrap();
        tree.add_class(&item, "expanded");
        tree.add_class(&item, "expanded");
        assert_eq!(
            tree.attribute(&item, "class").as_deref(),
            Some("chapter-item expanded")
        );
        assert!(!tree.toggle_class(&item, "expanded"));
        assert!(tree.toggle_class(&item, "expanded"));
        assert!(tree.has_class(&item, "expanded"));
    }

    #[test]
    fn test_replace_content_discards_previous_nodes() {
        let mut tree = SidebarTree::from_markup("<ol><li>one</li><li>two</li></ol>");
        tree.replace_content("<ol><li>three</li></ol>");
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.text_content(tree.root_id()), "three");
    }

    #[test]
    fn test_to_html_preserves_structure() {
        let tree = SidebarTree::from_markup(
            r#"<ol class="chapter"><li class="chapter-item"><a href="a.html">A &amp; B</a></li></ol>"#,
        );
        assert_eq!(
            tree.to_html(),
            r#"<ol class="chapter"><li class="chapter-item"><a href="a.html">A &amp; B</a></li></ol>"#
        );
    }

    #[test]
    fn test_scroll_top_clamps_negative() {
        let mut tree = SidebarTree::new();
        tree.set_scroll_top(-12.0);
        assert_eq!(tree.scroll_top(), 0.0);
        tree.set_scroll_top(120.5);
        assert_eq!(tree.scroll_top(), 120.5);
    }

    #[test]
    fn test_check_rejects_unknown_node() {
        let tree = SidebarTree::new();
        assert!(tree.check(NodeId(0)).is_ok());
        assert!(matches!(
            tree.check(NodeId(7)),
            Err(SidebarError::NodeNotFound(7))
        ));
    }

    #[test]
    fn test_first_with_class_matches_tokens_literally() {
        let tree = SidebarTree::from_markup(
            r#"<ol><li class="item"><a class="1st" href="a.html">A</a><a class="a.b" href="b.html">B</a></li></ol>"#,
        );
        let a = tree.find_by_href("a.html").unwrap();
        let b = tree.find_by_href("b.html").unwrap();
        assert_eq!(tree.first_with_class("1st"), Some(a));
        assert_eq!(tree.first_with_class("a.b"), Some(b));
        assert_eq!(tree.first_with_class("a"), None);
    }
}
