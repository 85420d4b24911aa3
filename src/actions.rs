//! Per-item action log.
//!
//! Every item carries at most one action per [`ActionKind`]. The kinds are a
//! closed enum whose declaration order is the render precedence, so a
//! `BTreeMap` keyed on the kind iterates slots in exactly the order the
//! renderer must replay them.

#[cfg(test)]
#[path = "actions_test.rs"]
mod actions_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::{Anchor, Direction};
use crate::io::ImageSource;
use crate::ops::color_removal::MaskParams;

/// Operation kinds in render precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Align,
    Move,
    Resize,
    Rotate,
    DrawImage,
    MaskColor,
    DrawText,
}

impl ActionKind {
    pub const ORDER: [ActionKind; 7] = [
        ActionKind::Align,
        ActionKind::Move,
        ActionKind::Resize,
        ActionKind::Rotate,
        ActionKind::DrawImage,
        ActionKind::MaskColor,
        ActionKind::DrawText,
    ];

    /// Human-readable name stamped on the slot.
    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Align => "Align",
            ActionKind::Move => "Move",
            ActionKind::Resize => "Resize",
            ActionKind::Rotate => "Rotate",
            ActionKind::DrawImage => "DrawImage",
            ActionKind::MaskColor => "MaskColor",
            ActionKind::DrawText => "DrawText",
        }
    }

    /// Geometry kinds mutate position or size once per new value. Replaying
    /// them on every pass would drift the item.
    pub fn is_geometry(self) -> bool {
        matches!(self, ActionKind::Align | ActionKind::Move | ActionKind::Resize)
    }
}

/// Parameter of an action. The variant determines the slot it lives in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionValue {
    Align(Anchor),
    Move(Direction),
    /// Pixel delta for images, absolute font size for text.
    Resize(f64),
    /// Degrees.
    Rotate(f64),
    DrawImage(ImageSource),
    MaskColor(MaskParams),
    DrawText(String),
}

impl ActionValue {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionValue::Align(_) => ActionKind::Align,
            ActionValue::Move(_) => ActionKind::Move,
            ActionValue::Resize(_) => ActionKind::Resize,
            ActionValue::Rotate(_) => ActionKind::Rotate,
            ActionValue::DrawImage(_) => ActionKind::DrawImage,
            ActionValue::MaskColor(_) => ActionKind::MaskColor,
            ActionValue::DrawText(_) => ActionKind::DrawText,
        }
    }

    /// Numeric payload of Resize and Rotate.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ActionValue::Resize(v) | ActionValue::Rotate(v) => Some(*v),
            _ => None,
        }
    }
}

/// State of one operation on one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    pub value: ActionValue,
    pub previous_value: Option<ActionValue>,
    /// `None` means the slot was written without bookkeeping; rendering such
    /// a slot is an error.
    pub is_painted: Option<bool>,
    #[serde(default)]
    pub is_rendered: bool,
}

impl Action {
    pub fn new(value: ActionValue) -> Self {
        Self {
            name: value.kind().name().to_string(),
            value,
            previous_value: None,
            is_painted: Some(false),
            is_rendered: false,
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.value.kind()
    }

    /// The value has not been applied to the item yet.
    pub fn is_pending(&self) -> bool {
        self.is_painted == Some(false)
    }

    pub fn previous_number(&self) -> Option<f64> {
        self.previous_value.as_ref().and_then(ActionValue::as_number)
    }
}

/// Sparse, kind-indexed collection of actions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionLog {
    slots: BTreeMap<ActionKind, Action>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: ActionKind) -> Option<&Action> {
        self.slots.get(&kind)
    }

    pub fn get_mut(&mut self, kind: ActionKind) -> Option<&mut Action> {
        self.slots.get_mut(&kind)
    }

    pub fn contains(&self, kind: ActionKind) -> bool {
        self.slots.contains_key(&kind)
    }

    /// Write `value` into its slot, creating the slot if absent. The old
    /// value moves to `previous_value` and the new one is pending until the
    /// renderer applies it.
    pub fn set(&mut self, value: ActionValue) -> &mut Action {
        let kind = value.kind();
        let action = self
            .slots
            .entry(kind)
            .and_modify(|a| {
                a.previous_value = Some(a.value.clone());
            })
            .or_insert_with(|| Action::new(value.clone()));
        action.value = value;
        action.name = kind.name().to_string();
        action.is_painted = Some(false);
        action.is_rendered = false;
        action
    }

    /// Insert a slot verbatim, bookkeeping included.
    pub fn insert(&mut self, action: Action) {
        self.slots.insert(action.kind(), action);
    }

    pub fn remove(&mut self, kind: ActionKind) -> Option<Action> {
        self.slots.remove(&kind)
    }

    /// Slots in render precedence order.
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.slots.values()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Forget that anything was rendered this frame.
    pub fn clear_rendered(&mut self) {
        for action in self.slots.values_mut() {
            action.is_rendered = false;
        }
    }
}
