//! End-to-end behavior through the public editor API.

use std::sync::Arc;

use composefe::{
    ActionKind, Anchor, Editor, EditorSettings, Effect, ImageSource, InputEvent, Interaction, Item, Point, Surface,
};
use composefe::hit::ScreenRect;
use image::{Rgba, RgbaImage};

const DEJAVU: &[u8] = include_bytes!("fixtures/DejaVuSans.ttf");

fn image_item(w: u32, h: u32, layer: i32) -> Item {
    let bitmap = Arc::new(RgbaImage::from_pixel(w, h, Rgba([0, 128, 0, 255])));
    Item::with_bitmap(ImageSource::Bytes(Vec::new()), bitmap).with_layer(layer)
}

#[test]
fn align_center_image() {
    let mut editor = Editor::new(EditorSettings::default());
    let id = editor.place(image_item(120, 80, 2));
    editor.align(id, Anchor::Center).expect("render");

    let (sw, sh) = (editor.display().width() as f64, editor.display().height() as f64);
    let item = editor.item(id).expect("placed");
    assert_eq!(item.dx, sw / 2.0 - item.width / 2.0);
    assert_eq!(item.dy, sh / 2.0 - item.height / 2.0);
}

#[test]
fn resize_text_to_160px() {
    let mut editor = Editor::new(EditorSettings::default());
    editor.fonts().register("Arial", DEJAVU.to_vec()).expect("fixture font");
    let id = editor.place_text("Apple", 0);
    editor.resize(id, 160.0).expect("render");

    let item = editor.item(id).expect("placed");
    assert_eq!(item.height, 160.0);
    assert_eq!(item.font.size_px, 160.0);
    assert!(item.width > 0.0);
    assert_eq!(item.width, editor.display().measure_text("Apple", &item.font));

    let first = editor.display().pixels().clone();
    assert!(first.pixels().any(|p| p.0[3] > 0));
    editor.render_all().expect("render");
    assert_eq!(editor.display().pixels(), &first);
}

#[test]
fn lower_layer_comes_first() {
    let mut editor = Editor::new(EditorSettings::default());
    let upper = editor.place(image_item(10, 10, 3));
    let lower = editor.place(image_item(10, 10, 1));

    let order: Vec<_> = editor.store().ordered_items().iter().map(|i| i.id).collect();
    assert_eq!(order, vec![lower, upper]);
}

#[test]
fn removing_the_selection_empties_it() {
    let mut editor = Editor::new(EditorSettings::default());
    let id = editor.place(image_item(10, 10, 0));
    editor.select(id).expect("render");
    editor.remove(id).expect("render");

    assert_eq!(editor.selection(), None);
    assert!(editor.store().ordered_items().iter().all(|i| i.id != id));
}

#[test]
fn pick_drag_and_release() {
    let mut editor = Editor::new(EditorSettings::default());
    let id = editor.place(image_item(100, 100, 0));
    editor.rotate(id, 45.0).expect("render");
    let mut input = Interaction::new(ScreenRect::new(0.0, 0.0, 500.0, 500.0));

    input.push(InputEvent::PointerDown(Point::new(10.0, 10.0)));
    input.push(InputEvent::PointerUp(Point::new(10.0, 10.0)));
    input.push(InputEvent::PointerDown(Point::new(50.0, 50.0)));
    input.push(InputEvent::PointerMove(Point::new(60.0, 70.0)));
    input.push(InputEvent::PointerUp(Point::new(60.0, 70.0)));
    let effects = input.poll(&mut editor).expect("poll");

    assert_eq!(effects[1], Effect::Selected(id));
    assert_eq!(effects[3], Effect::Dragged(id, Point::new(60.0, 70.0)));
    let item = editor.item(id).expect("placed");
    assert_eq!((item.dx, item.dy), (10.0, 20.0));
    // The rotation follows the item to its new center.
    assert_eq!(item.transform_pivot, Some(Point::new(60.0, 70.0)));
    assert!(item.actions.contains(ActionKind::Rotate));
}

#[test]
fn render_is_stable_across_passes() {
    let mut editor = Editor::new(EditorSettings::default());
    let id = editor.place(image_item(50, 30, 0));
    editor.align(id, Anchor::DownRight).expect("render");
    editor.rotate(id, 10.0).expect("render");
    let first = editor.display().pixels().clone();

    editor.render_all().expect("render");
    editor.render_all().expect("render");
    assert_eq!(editor.display().pixels(), &first);
}
