//! Session-scoped key/value storage and the sidebar scroll memory

use std::collections::HashMap;

use log::warn;

use crate::error::SidebarResult;

/// Storage key the sidebar scroll offset is kept under
pub const SCROLL_KEY: &str = "sidebar-scroll";

/// Short-lived string storage scoped to one browsing session
pub trait SessionStore {
    fn get(&self, key: &str) -> SidebarResult<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> SidebarResult<()>;

    fn remove(&mut self, key: &str) -> SidebarResult<()>;

    /// Read a value and delete it in one step
    fn take(&mut self, key: &str) -> SidebarResult<Option<String>> {
        let value = self.get(key)?;
        self.remove(key)?;
        Ok(value)
    }
}

/// `HashMap`-backed store for tests and static rendering
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> SidebarResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> SidebarResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> SidebarResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Remembers the sidebar scroll offset across one navigation
#[derive(Debug, Clone, Copy)]
pub struct ScrollMemory<'k> {
    key: &'k str,
}

impl Default for ScrollMemory<'static> {
    fn default() -> Self {
        Self { key: SCROLL_KEY }
    }
}

impl<'k> ScrollMemory<'k> {
    pub fn new(key: &'k str) -> Self {
        Self { key }
    }

    pub fn key(&self) -> &'k str {
        self.key
    }

    /// Store `offset`, replacing any earlier value
    pub fn save<S: SessionStore + ?Sized>(&self, store: &mut S, offset: f64) -> SidebarResult<()> {
        store.set(self.key, &offset.to_string())
    }

    /// Consume the stored offset. The entry is removed whether or not it
    /// holds a usable number.
    pub fn take<S: SessionStore + ?Sized>(&self, store: &mut S) -> SidebarResult<Option<f64>> {
        let Some(raw) = store.take(self.key)? else {
            return Ok(None);
        };
        if raw.is_empty() {
            return Ok(None);
        }
        match raw.trim().parse::<f64>() {
            Ok(offset) if offset.is_finite() => Ok(Some(offset)),
            _ => {
                warn!("Ignoring unreadable sidebar scroll offset {raw:?}");
                Ok(None)
            }
        }
    }
}
