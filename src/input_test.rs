use super::*;

use std::sync::Arc;

use image::RgbaImage;

use crate::actions::ActionKind;
use crate::geometry::{Anchor, Direction};
use crate::io::ImageSource;
use crate::item::Item;
use crate::settings::EditorSettings;

fn image(w: u32, h: u32, layer: i32) -> Item {
    Item::with_bitmap(ImageSource::Bytes(Vec::new()), Arc::new(RgbaImage::new(w, h))).with_layer(layer)
}

/// 500x500 editor shown at 1:1 from the client origin.
fn setup() -> (Editor, Interaction) {
    let editor = Editor::new(EditorSettings::default());
    (editor, Interaction::new(ScreenRect::new(0.0, 0.0, 500.0, 500.0)))
}

fn click(input: &mut Interaction, x: f64, y: f64) {
    input.push(InputEvent::PointerDown(Point::new(x, y)));
    input.push(InputEvent::PointerUp(Point::new(x, y)));
}

#[test]
fn click_selects_topmost_item() {
    let (mut ed, mut input) = setup();
    ed.place(image(100, 100, 0));
    let top = ed.place(image(100, 100, 2));

    click(&mut input, 50.0, 50.0);
    assert_eq!(input.pending(), 2);
    let effects = input.poll(&mut ed).expect("poll");
    assert_eq!(effects, vec![Effect::None, Effect::Selected(top)]);
    assert_eq!(ed.selection(), Some(top));
    assert_eq!(input.pending(), 0);
}

#[test]
fn click_on_empty_space_does_nothing() {
    let (mut ed, mut input) = setup();
    ed.place(image(10, 10, 0));
    click(&mut input, 300.0, 300.0);
    let effects = input.poll(&mut ed).expect("poll");
    assert_eq!(effects, vec![Effect::None, Effect::None]);
    assert_eq!(ed.selection(), None);
}

#[test]
fn press_outside_selection_deselects_and_drops_motion() {
    let (mut ed, mut input) = setup();
    let id = ed.place(image(50, 50, 0));
    ed.align(id, Anchor::UpLeft).expect("render");
    ed.nudge(id, Direction::Right).expect("render");
    ed.select(id).expect("render");

    input.push(InputEvent::PointerDown(Point::new(400.0, 400.0)));
    let effects = input.poll(&mut ed).expect("poll");
    assert_eq!(effects, vec![Effect::Deselected(id)]);
    assert_eq!(ed.selection(), None);
    let item = ed.item(id).expect("placed");
    assert!(!item.actions.contains(ActionKind::Align));
    assert!(!item.actions.contains(ActionKind::Move));
}

#[test]
fn press_on_another_item_keeps_motion_until_release_switches() {
    let (mut ed, mut input) = setup();
    let first = ed.place(image(50, 50, 0));
    let second = ed.place(image(50, 50, 1).with_position(200.0, 200.0));
    ed.nudge(first, Direction::Right).expect("render");
    ed.select(first).expect("render");

    click(&mut input, 220.0, 220.0);
    let effects = input.poll(&mut ed).expect("poll");
    assert_eq!(effects, vec![Effect::None, Effect::Selected(second)]);
    assert_eq!(ed.selection(), Some(second));
    assert!(ed.item(first).is_some_and(|i| i.actions.contains(ActionKind::Move)));
}

#[test]
fn dragging_inside_selection_moves_it() {
    let (mut ed, mut input) = setup();
    let id = ed.place(image(40, 40, 0).with_position(100.0, 100.0));
    ed.select(id).expect("render");

    input.push(InputEvent::PointerDown(Point::new(120.0, 120.0)));
    input.push(InputEvent::PointerMove(Point::new(125.0, 130.0)));
    let effects = input.poll(&mut ed).expect("poll");
    assert_eq!(effects, vec![Effect::None, Effect::Dragged(id, Point::new(125.0, 130.0))]);
    assert!(input.is_pressed());
    assert_eq!(ed.item(id).map(|i| (i.dx, i.dy)), Some((105.0, 110.0)));
}

#[test]
fn moves_without_press_are_ignored() {
    let (mut ed, mut input) = setup();
    let id = ed.place(image(40, 40, 0));
    ed.select(id).expect("render");

    input.push(InputEvent::PointerMove(Point::new(20.0, 20.0)));
    assert_eq!(input.poll(&mut ed).expect("poll"), vec![Effect::None]);
    assert_eq!(ed.item(id).map(|i| (i.dx, i.dy)), Some((0.0, 0.0)));
}

#[test]
fn release_over_current_selection_keeps_it() {
    let (mut ed, mut input) = setup();
    let id = ed.place(image(40, 40, 0));
    ed.select(id).expect("render");

    click(&mut input, 10.0, 10.0);
    let effects = input.poll(&mut ed).expect("poll");
    assert_eq!(effects, vec![Effect::None, Effect::None]);
    assert_eq!(ed.selection(), Some(id));
    assert!(!input.is_pressed());
}

#[test]
fn scaled_viewport_maps_into_surface_space() {
    let (mut ed, mut input) = setup();
    let id = ed.place(image(40, 40, 0).with_position(400.0, 400.0));
    input.set_viewport(ScreenRect::new(0.0, 0.0, 250.0, 250.0));

    click(&mut input, 210.0, 210.0);
    let effects = input.poll(&mut ed).expect("poll");
    assert_eq!(effects.last(), Some(&Effect::Selected(id)));
}

#[test]
fn locked_items_cannot_be_picked() {
    let (mut ed, mut input) = setup();
    let id = ed.place(image(40, 40, 0));
    ed.set_selectable(id, false).expect("render");
    click(&mut input, 5.0, 5.0);
    input.poll(&mut ed).expect("poll");
    assert_eq!(ed.selection(), None);
}
