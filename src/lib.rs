//! TOC Sidebar - table-of-contents sidebar for static documentation sites
//!
//! Every page of a generated book carries the same chapter list. This crate
//! renders that list into the page's sidebar element and makes it fit the
//! page being viewed:
//! - relative links are rewritten against the page's path to the site root
//! - the entry for the current page is marked active
//! - every collapsed section containing it is expanded
//! - the sidebar scroll position survives navigation through sidebar links
//! - section toggles expand and collapse their section
//!
//! The render logic runs against the [`dom::SidebarDom`] trait, so it works on
//! the in-memory [`tree::SidebarTree`] as well as, with the `wasm` feature, on
//! the live browser element.
//!
//! ## Example
//! ```rust
//! use toc_sidebar::prelude::*;
//!
//! let markup = r#"<ol class="chapter">
//!     <li class="chapter-item "><a href="intro.html">Intro</a></li>
//!     <li class="chapter-item "><a href="guide/setup.html">Setup</a></li>
//! </ol>"#;
//!
//! let config = SidebarConfig::new(markup).with_root_path("../");
//! let mut sidebar = Sidebar::mount(
//!     config,
//!     "https://docs.example/guide/setup.html",
//!     MemoryStore::new(),
//! )
//! .unwrap();
//!
//! let setup = sidebar.tree().find_by_href("../guide/setup.html").unwrap();
//! assert_eq!(sidebar.outcome().active, Some(setup));
//!
//! // Following a sidebar link remembers where the sidebar was scrolled to
//! sidebar.scroll_to(120.0);
//! let intro = sidebar.tree().find_by_href("../intro.html").unwrap();
//! let next = sidebar.click(intro).unwrap().navigation.unwrap();
//! let sidebar = sidebar.navigate_with_root(&next, "").unwrap();
//! assert_eq!(sidebar.tree().scroll_top(), 120.0);
//! ```

pub mod config;
pub mod dom;
pub mod error;
pub mod events;
pub mod links;
pub mod outline;
pub mod render;
pub mod storage;
pub mod tree;

// Re-export common types
pub mod prelude {
    pub use crate::config::{ClassNames, SidebarConfig};
    pub use crate::dom::SidebarDom;
    pub use crate::error::{SidebarError, SidebarResult};
    pub use crate::events::{handle_click, ClickOutcome, Sidebar};
    pub use crate::links::{CurrentPage, LinkTarget};
    pub use crate::outline::{outline, EntryKind, OutlineEntry};
    pub use crate::render::{render, EventBinding, Listener, RenderOutcome, ScrollAction};
    pub use crate::storage::{MemoryStore, ScrollMemory, SessionStore, SCROLL_KEY};
    pub use crate::tree::{NodeId, SidebarTree};
}

#[cfg(feature = "wasm")]
pub mod wasm;
