//! Tree traversal and mutation interface used by the renderer
//!
//! The renderer never touches a browser document directly. Everything it
//! needs from the page goes through [`SidebarDom`], which is implemented by the
//! in-memory [`SidebarTree`](crate::tree::SidebarTree) and, under the `wasm`
//! feature, by a thin wrapper around `web_sys::Element`.

use std::fmt::Debug;

/// Element-level access to the sidebar host and everything rendered into it.
///
/// Tag names are reported in lowercase. Class operations follow `classList`
/// semantics: adding a present class is a no-op, toggling returns whether the
/// class is present afterwards.
pub trait SidebarDom {
    /// Handle to one element of the tree
    type Node: Clone + PartialEq + Debug;

    /// The sidebar host element
    fn root(&self) -> Self::Node;

    /// Replace everything inside the host element with `markup`
    fn replace_content(&mut self, markup: &str);

    /// Every element below the host, in document order
    fn descendants(&self) -> Vec<Self::Node>;

    /// Parent element, `None` above the topmost element
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Closest preceding sibling that is an element
    fn previous_element_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

    fn tag_name(&self, node: &Self::Node) -> String;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    fn add_class(&mut self, node: &Self::Node, class: &str);

    fn toggle_class(&mut self, node: &Self::Node, class: &str) -> bool;

    /// Current vertical scroll offset of the host element
    fn scroll_top(&self) -> f64;

    fn set_scroll_top(&mut self, offset: f64);

    /// Scroll `node` into the vertical center of the viewport
    fn scroll_into_view_centered(&mut self, node: &Self::Node);

    /// Anchors below the host, in document order
    fn anchors(&self) -> Vec<Self::Node> {
        self.descendants()
            .into_iter()
            .filter(|node| self.tag_name(node) == "a")
            .collect()
    }

    /// First element below the host carrying `class`
    fn first_with_class(&self, class: &str) -> Option<Self::Node> {
        self.descendants()
            .into_iter()
            .find(|node| self.has_class(node, class))
    }

    /// Whether `node` is an element with tag `tag`
    fn is_tag(&self, node: &Self::Node, tag: &str) -> bool {
        self.tag_name(node).eq_ignore_ascii_case(tag)
    }
}
