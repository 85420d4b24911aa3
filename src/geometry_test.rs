use super::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

// ============================================================================
// Rect
// ============================================================================

#[test]
fn centered_rect_puts_center_at_given_point() {
    let r = Rect::centered(100.0, 50.0, 40.0, 20.0);
    assert_eq!(r, Rect::new(80.0, 40.0, 40.0, 20.0));
    assert_eq!(r.center(), Point::new(100.0, 50.0));
}

#[test]
fn contains_is_inclusive_on_all_edges() {
    let r = Rect::new(10.0, 10.0, 20.0, 20.0);
    assert!(r.contains(Point::new(10.0, 10.0)));
    assert!(r.contains(Point::new(30.0, 30.0)));
    assert!(!r.contains(Point::new(30.1, 20.0)));
    assert!(!r.contains(Point::new(20.0, 9.9)));
}

#[test]
fn handles_are_corners_and_midpoints() {
    let h = Rect::new(0.0, 0.0, 10.0, 20.0).handles();
    assert_eq!(h[0], Point::new(0.0, 0.0));
    assert_eq!(h[1], Point::new(5.0, 0.0));
    assert_eq!(h[4], Point::new(10.0, 20.0));
    assert_eq!(h[7], Point::new(0.0, 10.0));
}

#[test]
fn pixel_span_clips_to_grid() {
    assert_eq!(Rect::new(-5.0, 2.5, 20.0, 4.0).pixel_span(10, 10), Some((0, 2, 10, 7)));
    assert_eq!(Rect::new(12.0, 0.0, 5.0, 5.0).pixel_span(10, 10), None);
    assert_eq!(Rect::new(0.0, 0.0, 0.0, 5.0).pixel_span(10, 10), None);
}

#[test]
fn inflate_never_goes_negative() {
    let r = Rect::new(0.0, 0.0, 4.0, 4.0).inflate(-5.0);
    assert_eq!(r.width, 0.0);
    assert_eq!(r.height, 0.0);
}

// ============================================================================
// Transform
// ============================================================================

#[test]
fn rotation_about_keeps_pivot_fixed() {
    let pivot = Point::new(50.0, 30.0);
    let t = Transform::rotation_about(pivot, 37.0);
    let p = t.apply(pivot);
    assert!(close(p.x, pivot.x) && close(p.y, pivot.y));
}

#[test]
fn quarter_turn_maps_right_to_down() {
    let t = Transform::rotation_about(Point::new(0.0, 0.0), 90.0);
    let p = t.apply(Point::new(1.0, 0.0));
    assert!(close(p.x, 0.0) && close(p.y, 1.0));
}

#[test]
fn full_turn_is_identity() {
    let t = Transform::rotation_about(Point::new(123.0, 45.0), 360.0);
    assert!(t.approx_eq(&Transform::IDENTITY, 1e-9));
    assert!(t.is_identity());
}

#[test]
fn invert_round_trips_points() {
    let t = Transform::rotation_about(Point::new(10.0, 20.0), 33.0).multiply(&Transform::translation(4.0, -2.0));
    let inv = t.invert().expect("rotation is invertible");
    let p = Point::new(7.0, 9.0);
    let back = inv.apply(t.apply(p));
    assert!(close(back.x, p.x) && close(back.y, p.y));
}

#[test]
fn singular_transform_has_no_inverse() {
    let t = Transform { a: 0.0, b: 0.0, c: 0.0, d: 0.0, e: 1.0, f: 1.0 };
    assert!(t.invert().is_none());
}

#[test]
fn transformed_bounds_of_square_rotated_45() {
    let r = Rect::new(-1.0, -1.0, 2.0, 2.0);
    let b = r.transformed_bounds(&Transform::rotation(45f64.to_radians()));
    let half_diag = 2f64.sqrt();
    assert!(close(b.x, -half_diag) && close(b.width, 2.0 * half_diag));
}

// ============================================================================
// Align
// ============================================================================

const SURFACE: (f64, f64) = (500.0, 400.0);

#[test]
fn image_center_uses_top_left_origin() {
    let p = align_position(Anchor::Center, Origin::TopLeft, Point::new(7.0, 9.0), (100.0, 50.0), SURFACE);
    assert_eq!(p, Point::new(200.0, 175.0));
}

#[test]
fn text_center_is_surface_center() {
    let p = align_position(Anchor::Center, Origin::Center, Point::new(7.0, 9.0), (100.0, 50.0), SURFACE);
    assert_eq!(p, Point::new(250.0, 200.0));
}

#[test]
fn edge_anchors_only_touch_named_axis() {
    let current = Point::new(33.0, 44.0);
    let size = (100.0, 50.0);
    assert_eq!(align_position(Anchor::Up, Origin::TopLeft, current, size, SURFACE), Point::new(33.0, 0.0));
    assert_eq!(align_position(Anchor::Down, Origin::TopLeft, current, size, SURFACE), Point::new(33.0, 350.0));
    assert_eq!(align_position(Anchor::Left, Origin::TopLeft, current, size, SURFACE), Point::new(0.0, 44.0));
    assert_eq!(align_position(Anchor::Right, Origin::TopLeft, current, size, SURFACE), Point::new(400.0, 44.0));
}

#[test]
fn corner_anchors_for_text_keep_box_inside() {
    let size = (100.0, 50.0);
    let p = align_position(Anchor::DownRight, Origin::Center, Point::default(), size, SURFACE);
    assert_eq!(p, Point::new(450.0, 375.0));
    let box_ = Origin::Center.bounds(p.x, p.y, size.0, size.1);
    assert_eq!((box_.right(), box_.bottom()), SURFACE);

    let p = align_position(Anchor::UpLeft, Origin::Center, Point::default(), size, SURFACE);
    assert_eq!(p, Point::new(50.0, 25.0));
}

#[test]
fn anchor_parses_common_spellings() {
    assert_eq!("up-right".parse::<Anchor>(), Ok(Anchor::UpRight));
    assert_eq!("down_left".parse::<Anchor>(), Ok(Anchor::DownLeft));
    assert_eq!("TopLeft".parse::<Anchor>(), Ok(Anchor::UpLeft));
    assert_eq!("center".parse::<Anchor>(), Ok(Anchor::Center));
    assert!("middle-ish".parse::<Anchor>().is_err());
}

// ============================================================================
// Move
// ============================================================================

#[test]
fn diagonal_steps_change_both_axes() {
    assert_eq!(Direction::DownLeft.delta(), (-1.0, 1.0));
    assert_eq!(Direction::UpRight.delta(), (1.0, -1.0));
}

#[test]
fn opposite_steps_cancel() {
    for &d in Direction::all() {
        let (ax, ay) = d.delta();
        let (bx, by) = d.opposite().delta();
        assert_eq!((ax + bx, ay + by), (0.0, 0.0), "{d:?}");
    }
}

#[test]
fn direction_rejects_center() {
    assert!("center".parse::<Direction>().is_err());
    assert_eq!("left".parse::<Direction>(), Ok(Direction::Left));
}

// ============================================================================
// Resize
// ============================================================================

#[test]
fn first_resize_grows_by_value() {
    assert_eq!(resized_dimensions((100.0, 50.0), (100.0, 50.0), 20.0, None), (120.0, 70.0));
}

#[test]
fn smaller_value_than_previous_shrinks() {
    assert_eq!(resized_dimensions((120.0, 70.0), (100.0, 50.0), 10.0, Some(20.0)), (110.0, 60.0));
}

#[test]
fn same_value_is_a_no_op() {
    assert_eq!(resized_dimensions((120.0, 70.0), (100.0, 50.0), 20.0, Some(20.0)), (120.0, 70.0));
}

#[test]
fn zero_restores_original() {
    assert_eq!(resized_dimensions((180.0, 130.0), (100.0, 50.0), 0.0, Some(80.0)), (100.0, 50.0));
}

#[test]
fn shrink_clamps_at_zero() {
    assert_eq!(resized_dimensions((10.0, 5.0), (10.0, 5.0), 20.0, Some(30.0)), (0.0, 0.0));
}

#[test]
fn zero_and_full_turn_normalize_to_full_turn() {
    assert_eq!(normalized_turn(0.0), 360.0);
    assert_eq!(normalized_turn(360.0), 360.0);
    assert_eq!(normalized_turn(45.0), 45.0);
}
