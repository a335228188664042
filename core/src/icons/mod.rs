//! Icon registry for phase icon lookups.
//!
//! Icons are decoded elsewhere (see the overlay crate's loader) into fixed
//! size RGBA buffers and registered here by name. Lookups never fail: names
//! without a loaded icon are simply left out.

use std::sync::Arc;

use hashbrown::HashMap;

/// Decoded RGBA icon data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconData {
    pub name: String,
    /// RGBA pixel data (width * height * 4 bytes)
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl IconData {
    pub fn new(name: impl Into<String>, rgba: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            rgba,
            width,
            height,
        }
    }

    /// A single-color icon (used as a placeholder and in tests)
    pub fn solid(name: impl Into<String>, width: u32, height: u32, color: [u8; 4]) -> Self {
        let rgba = color
            .iter()
            .copied()
            .cycle()
            .take((width * height * 4) as usize)
            .collect();
        Self::new(name, rgba, width, height)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Source of icons for a list of names
pub trait IconProvider {
    /// Resolve names to icons, in order, silently skipping unknown names
    fn resolve(&self, names: &[String]) -> Vec<Arc<IconData>>;
}

/// In-memory icon registry keyed by icon name
#[derive(Debug, Clone, Default)]
pub struct IconSet {
    icons: HashMap<String, Arc<IconData>>,
}

impl IconSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, icon: IconData) {
        self.icons.insert(icon.name.clone(), Arc::new(icon));
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Arc<IconData>> {
        self.icons.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.icons.contains_key(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.icons.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

impl IconProvider for IconSet {
    fn resolve(&self, names: &[String]) -> Vec<Arc<IconData>> {
        names
            .iter()
            .filter_map(|name| self.icons.get(name).cloned())
            .collect()
    }
}

impl<T: IconProvider + ?Sized> IconProvider for Arc<T> {
    fn resolve(&self, names: &[String]) -> Vec<Arc<IconData>> {
        (**self).resolve(names)
    }
}
