//! Link classification, root-path rewriting and current-page matching

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::error::{SidebarError, SidebarResult};

/// Name of the document a directory URL stands for
pub const DEFAULT_DOCUMENT: &str = "index.html";

/// Scheme-qualified (`https://`) or protocol-relative (`//`) targets
static ABSOLUTE_TARGET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[a-z+]+:)?//").expect("absolute target pattern"));

/// What an anchor's `href` attribute points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget<'a> {
    /// Same-page reference such as `#usage`
    Fragment(&'a str),
    /// `https://...` or `//host/...`
    Absolute(&'a str),
    /// Path relative to the site root
    Relative(&'a str),
}

impl<'a> LinkTarget<'a> {
    /// Classify an `href` value. Empty values have no target.
    pub fn classify(href: &'a str) -> Option<Self> {
        if href.is_empty() {
            None
        } else if href.starts_with('#') {
            Some(LinkTarget::Fragment(href))
        } else if ABSOLUTE_TARGET.is_match(href) {
            Some(LinkTarget::Absolute(href))
        } else {
            Some(LinkTarget::Relative(href))
        }
    }

    pub fn as_str(&self) -> &'a str {
        match self {
            LinkTarget::Fragment(href) | LinkTarget::Absolute(href) | LinkTarget::Relative(href) => {
                href
            }
        }
    }

    pub fn is_relative(&self) -> bool {
        matches!(self, LinkTarget::Relative(_))
    }

    /// Prefix relative targets with `root_path`; other targets are returned
    /// as they are.
    pub fn rewrite(&self, root_path: &str) -> Cow<'a, str> {
        match self {
            LinkTarget::Relative(href) => Cow::Owned(format!("{root_path}{href}")),
            LinkTarget::Fragment(href) | LinkTarget::Absolute(href) => Cow::Borrowed(href),
        }
    }
}

/// The page the sidebar is being rendered on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentPage {
    location: Url,
    canonical: String,
}

impl CurrentPage {
    /// Parse the document location. A location ending in `/` is identified
    /// with the default document of that directory.
    pub fn parse(location: &str) -> SidebarResult<Self> {
        let location = Url::parse(location).map_err(|source| SidebarError::InvalidPageUrl {
            url: location.to_string(),
            source,
        })?;
        let mut canonical = location.to_string();
        if canonical.ends_with('/') {
            canonical.push_str(DEFAULT_DOCUMENT);
        }
        Ok(Self {
            location,
            canonical,
        })
    }

    /// The document location as the browser reports it
    pub fn location(&self) -> &Url {
        &self.location
    }

    /// Identifier anchors are compared against
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Whether this page is a directory's default document
    pub fn is_default_document(&self) -> bool {
        self.canonical.ends_with(&format!("/{DEFAULT_DOCUMENT}"))
    }

    /// Resolve an `href` against the document location, the way an anchor's
    /// `href` property does
    pub fn resolve(&self, href: &str) -> Option<Url> {
        self.location.join(href).ok()
    }

    /// Whether an anchor with this (already rewritten) `href` points here.
    /// Missing and fragment-only targets never match.
    pub fn matches(&self, href: Option<&str>) -> bool {
        match href.and_then(LinkTarget::classify) {
            None | Some(LinkTarget::Fragment(_)) => false,
            Some(target) => self
                .resolve(target.as_str())
                .is_some_and(|resolved| resolved.as_str() == self.canonical),
        }
    }
}
