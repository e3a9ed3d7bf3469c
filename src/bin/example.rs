//! TOC Sidebar Example - render a book's sidebar for one page
//!
//! Environment:
//! - `TOC_PAGE_URL`  page the sidebar is rendered on
//! - `TOC_ROOT_PATH` relative path from that page back to the book root
//! - `TOC_MARKUP`    file holding the chapter list (defaults to the bundled book)

use anyhow::Context;
use log::info;
use toc_sidebar::prelude::*;

const BOOK_TOC: &str = include_str!("../../fixtures/book_toc.html");

fn env_or(name: &str, default_val: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default_val.to_string())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let page_url = env_or(
        "TOC_PAGE_URL",
        "https://docs.example/book/ADCLibrary/ADCContinous.html",
    );
    let root_path = env_or("TOC_ROOT_PATH", "../");
    let markup = match std::env::var("TOC_MARKUP") {
        Ok(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read chapter list from {path}"))?,
        Err(_) => BOOK_TOC.to_string(),
    };

    println!("=== TOC Sidebar Example ===\n");
    println!("Page:      {page_url}");
    println!("Root path: {root_path:?}\n");

    let config = SidebarConfig::new(markup).with_root_path(root_path);
    let mut sidebar = Sidebar::mount(config, &page_url, MemoryStore::new())
        .context("Failed to render sidebar")?;

    let outcome = sidebar.outcome().clone();
    info!(
        "{} links rewritten, {} listeners",
        outcome.rewritten,
        outcome.bindings.len()
    );

    println!("--- Sidebar ---");
    for entry in outline(sidebar.tree(), &sidebar.config().classes) {
        let indent = "  ".repeat(entry.depth);
        match entry.kind {
            EntryKind::PartTitle => println!("\n{indent}# {}", entry.title),
            EntryKind::Chapter => {
                let marker = if entry.active {
                    "=>"
                } else if entry.expanded {
                    " v"
                } else {
                    "  "
                };
                let number = entry.number.as_deref().unwrap_or("");
                let href = entry.href.as_deref().unwrap_or("(draft)");
                println!("{marker} {indent}{number} {}  [{href}]", entry.title);
            }
        }
    }

    println!("\n--- Scroll ---");
    match &outcome.scroll {
        ScrollAction::Restored(offset) => println!("Restored offset {offset}"),
        ScrollAction::Centered(node) => println!("Centered active entry {node}"),
        ScrollAction::Unchanged => println!("No active entry on this page"),
    }

    // Follow the next chapter link the way a reader would
    let Some(active) = outcome.active else {
        return Ok(());
    };
    let anchors = sidebar.tree().anchors();
    let next = anchors
        .iter()
        .skip_while(|node| **node != active)
        .skip(1)
        .find(|node| sidebar.tree().attribute(node, "href").is_some())
        .copied();

    if let Some(next) = next {
        sidebar.scroll_to(240.0);
        let click = sidebar.click(next)?;
        println!("\n--- Click ---");
        println!("Listeners fired: {:?}", click.fired);
        if let Some(url) = click.navigation {
            println!("Navigating to {url}");
            let sidebar = sidebar.navigate(&url)?;
            println!("Scroll after navigation: {:?}", sidebar.outcome().scroll);
        }
    }

    Ok(())
}
