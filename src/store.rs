//! The set of placed items, kept in paint order.
//!
//! Items are stored in a `Vec` that is re-sorted by layer after every
//! insertion or layer change. The sort is stable, so items sharing a layer
//! paint in insertion order.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use uuid::Uuid;

use crate::actions::{Action, ActionValue};
use crate::io::ImageSource;
use crate::item::{Item, ItemId};

#[derive(Debug, Default)]
pub struct ItemStore {
    items: Vec<Item>,
    selection: Option<ItemId>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `item`, assigning an id if it has none. Placing an id that is
    /// already stored is a no-op. Returns the item's id either way.
    pub fn place(&mut self, mut item: Item) -> ItemId {
        if item.id.is_nil() {
            item.id = Uuid::new_v4();
        }
        let id = item.id;
        if self.contains(id) {
            return id;
        }
        self.items.push(item);
        self.sort();
        id
    }

    /// Remove every item with `id` and return the remaining ordered items.
    /// Clears the selection when it pointed at the removed item.
    pub fn remove(&mut self, id: ItemId) -> &[Item] {
        self.items.retain(|item| item.id != id);
        if self.selection == Some(id) {
            self.selection = None;
        }
        &self.items
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// All items, ascending by layer.
    pub fn ordered_items(&self) -> &[Item] {
        &self.items
    }

    /// Ids of items that take part in a full render pass, in paint order.
    pub fn paint_order(&self) -> Vec<ItemId> {
        self.items.iter().filter(|item| item.layer >= 0).map(|item| item.id).collect()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Item> {
        self.items.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn selection(&self) -> Option<ItemId> {
        self.selection
    }

    /// Make `id` the active selection. Unknown ids leave the selection as is.
    pub fn select(&mut self, id: ItemId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.selection = Some(id);
        true
    }

    pub fn clear_selection(&mut self) -> Option<ItemId> {
        self.selection.take()
    }

    // ========================================================================
    // Mutation helpers
    // ========================================================================

    /// Write an action value onto the item with `id`.
    pub fn set_action(&mut self, id: ItemId, value: ActionValue) -> Option<&mut Action> {
        self.get_mut(id).map(|item| item.actions.set(value))
    }

    pub fn set_layer(&mut self, id: ItemId, layer: i32) -> bool {
        let Some(item) = self.get_mut(id) else {
            return false;
        };
        item.layer = layer;
        self.sort();
        true
    }

    /// An item already holding a decoded bitmap for `source`.
    pub fn find_by_source(&self, source: &ImageSource) -> Option<&Item> {
        self.items
            .iter()
            .find(|item| item.bitmap.is_some() && item.source() == Some(source))
    }

    fn sort(&mut self) {
        self.items.sort_by_key(|item| item.layer);
    }
}
