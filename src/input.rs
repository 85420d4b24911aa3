//! Pointer input: a queue of events drained into editor commands.
//!
//! Collaborators push `InputEvent`s as they arrive; `Interaction::poll`
//! drains the queue in order, maps client coordinates onto the display
//! surface, and drives selection and drag through the editor. Each handled
//! event yields an `Effect` describing what changed.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::collections::VecDeque;

use crate::canvas::Surface;
use crate::editor::Editor;
use crate::error::RenderError;
use crate::geometry::Point;
use crate::hit::{cursor_to_surface, is_inside, is_pickable, topmost_at, ScreenRect};
use crate::item::ItemId;

/// Pointer events in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp(Point),
}

/// What an event changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    None,
    Selected(ItemId),
    Deselected(ItemId),
    /// The selection now sits at this surface point.
    Dragged(ItemId, Point),
}

#[derive(Debug)]
pub struct Interaction {
    queue: VecDeque<InputEvent>,
    viewport: ScreenRect,
    pressed: bool,
}

impl Interaction {
    /// `viewport` is where the display surface is shown on screen.
    pub fn new(viewport: ScreenRect) -> Self {
        Self { queue: VecDeque::new(), viewport, pressed: false }
    }

    pub fn set_viewport(&mut self, viewport: ScreenRect) {
        self.viewport = viewport;
    }

    pub fn push(&mut self, event: InputEvent) {
        self.queue.push_back(event);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Handle every queued event in arrival order.
    pub fn poll<S: Surface>(&mut self, editor: &mut Editor<S>) -> Result<Vec<Effect>, RenderError> {
        let mut effects = Vec::with_capacity(self.queue.len());
        while let Some(event) = self.queue.pop_front() {
            effects.push(self.handle(editor, event)?);
        }
        Ok(effects)
    }

    fn to_surface<S: Surface>(&self, editor: &Editor<S>, client: Point) -> Point {
        let display = editor.display();
        cursor_to_surface(client, self.viewport, display.width(), display.height())
    }

    fn handle<S: Surface>(&mut self, editor: &mut Editor<S>, event: InputEvent) -> Result<Effect, RenderError> {
        match event {
            InputEvent::PointerDown(client) => {
                self.pressed = true;
                let point = self.to_surface(editor, client);
                self.pointer_down(editor, point)
            }
            InputEvent::PointerMove(client) => {
                if !self.pressed {
                    return Ok(Effect::None);
                }
                let point = self.to_surface(editor, client);
                Self::pointer_move(editor, point)
            }
            InputEvent::PointerUp(client) => {
                self.pressed = false;
                let point = self.to_surface(editor, client);
                Self::pointer_up(editor, point)
            }
        }
    }

    /// Pressing on empty space settles an active selection: its Align and
    /// Move slots are dropped and it is deselected. A press on another item
    /// leaves it to the release to switch the selection.
    fn pointer_down<S: Surface>(&self, editor: &mut Editor<S>, point: Point) -> Result<Effect, RenderError> {
        let Some(id) = editor.selection() else {
            return Ok(Effect::None);
        };
        let Some(item) = editor.item(id) else {
            return Ok(Effect::None);
        };
        if !is_pickable(item) || is_inside(item, point) || topmost_at(editor.store(), point, Some(id)).is_some() {
            return Ok(Effect::None);
        }
        editor.clear_motion(id);
        editor.deselect()?;
        tracing::debug!(item = %id, "deselected");
        Ok(Effect::Deselected(id))
    }

    /// Dragging inside the selection moves its visual center to the pointer.
    fn pointer_move<S: Surface>(editor: &mut Editor<S>, point: Point) -> Result<Effect, RenderError> {
        let Some(id) = editor.selection() else {
            return Ok(Effect::None);
        };
        match editor.item(id) {
            Some(item) if is_pickable(item) && is_inside(item, point) => {}
            _ => return Ok(Effect::None),
        }
        editor.drag_to(id, point)?;
        Ok(Effect::Dragged(id, point))
    }

    /// Releasing over another item selects the topmost one.
    fn pointer_up<S: Surface>(editor: &mut Editor<S>, point: Point) -> Result<Effect, RenderError> {
        let current = editor.selection();
        let Some(id) = topmost_at(editor.store(), point, current) else {
            return Ok(Effect::None);
        };
        editor.select(id)?;
        tracing::debug!(item = %id, "selected");
        Ok(Effect::Selected(id))
    }
}
