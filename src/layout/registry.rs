// Registry of resolved struct layouts

use super::{LayoutError, LookupError, StructLayout};
use rustc_hash::FxHashMap;

/// Resolved layouts by name, including aliases.
///
/// Entries are never removed or replaced. Iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct StructRegistry {
    layouts: FxHashMap<String, StructLayout>,
    order: Vec<String>,
}

impl StructRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resolved layout. Fails if the name is taken.
    pub fn insert(&mut self, layout: StructLayout) -> Result<&StructLayout, LayoutError> {
        if self.layouts.contains_key(&layout.name) {
            return Err(LayoutError::Duplicate { name: layout.name });
        }

        let name = layout.name.clone();
        self.order.push(name.clone());
        Ok(self.layouts.entry(name).or_insert(layout))
    }

    /// Register `alias` as a copy of the layout of `target`
    pub fn register_alias(&mut self, target: &str, alias: &str) -> Result<&StructLayout, LayoutError> {
        let layout = self
            .layouts
            .get(target)
            .ok_or_else(|| LookupError {
                name: target.to_string(),
                structure: Some(alias.to_string()),
                field: None,
            })?
            .renamed(alias);

        self.insert(layout)
    }

    pub fn get(&self, name: &str) -> Option<&StructLayout> {
        self.layouts.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.layouts.contains_key(name)
    }

    pub fn size_of_struct(&self, name: &str) -> Option<usize> {
        self.layouts.get(name).map(|layout| layout.size)
    }

    /// Layouts in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &StructLayout> {
        self.order.iter().filter_map(|name| self.layouts.get(name))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
