//! Read-only listing of a rendered sidebar

use serde::Serialize;

use crate::config::ClassNames;
use crate::dom::SidebarDom;
use crate::tree::{NodeId, SidebarTree};

/// Kind of a visible sidebar row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// A page or heading, with or without a link
    Chapter,
    /// Heading that groups the chapters below it
    PartTitle,
}

/// One visible row of the sidebar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineEntry {
    pub kind: EntryKind,
    /// Section number such as `14.1.`, when the row has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    pub title: String,
    /// Link target after rendering; draft chapters have none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Nesting level, 0 for the top-level list
    pub depth: usize,
    pub active: bool,
    pub expanded: bool,
}

/// List the rows of `tree` in document order
pub fn outline(tree: &SidebarTree, classes: &ClassNames) -> Vec<OutlineEntry> {
    tree.descendants()
        .into_iter()
        .filter(|node| tree.is_tag(node, "li"))
        .filter_map(|item| entry(tree, item, classes))
        .collect()
}

fn entry(tree: &SidebarTree, item: NodeId, classes: &ClassNames) -> Option<OutlineEntry> {
    let depth = list_depth(tree, item);

    if tree.has_class(&item, "part-title") {
        return Some(OutlineEntry {
            kind: EntryKind::PartTitle,
            number: None,
            title: tree.text_content(item).trim().to_string(),
            href: None,
            depth,
            active: false,
            expanded: false,
        });
    }
    if !tree.has_class(&item, &classes.chapter_item) {
        return None;
    }

    // The label is the first child that is not a toggle control
    let label = tree
        .children(item)
        .iter()
        .copied()
        .find(|child| !tree.tag_name(child).is_empty() && !tree.has_class(child, &classes.toggle))?;

    let number = tree
        .children(label)
        .iter()
        .copied()
        .find(|child| tree.is_tag(child, "strong"))
        .map(|strong| tree.text_content(strong).trim().to_string());
    let full = tree.text_content(label);
    let title = match &number {
        Some(number) => full.trim().trim_start_matches(number.as_str()).trim(),
        None => full.trim(),
    }
    .to_string();

    let is_link = tree.is_tag(&label, "a");
    Some(OutlineEntry {
        kind: EntryKind::Chapter,
        number,
        title,
        href: if is_link { tree.attribute(&label, "href") } else { None },
        depth,
        active: is_link && tree.has_class(&label, &classes.active),
        expanded: tree.has_class(&item, &classes.expanded),
    })
}

fn list_depth(tree: &SidebarTree, node: NodeId) -> usize {
    let mut lists: usize = 0;
    let mut cursor = tree.parent(&node);
    while let Some(parent) = cursor {
        if tree.is_tag(&parent, "ol") || tree.is_tag(&parent, "ul") {
            lists += 1;
        }
        cursor = tree.parent(&parent);
    }
    lists.saturating_sub(1)
}
