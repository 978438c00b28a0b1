use spinekit_core::config::ImplantConfig;
use spinekit_core::draw::Primitive;
use spinekit_core::implants::{rod, ImplantSet, Key, RodPath};
use spinekit_core::{DrawList, Point, SpineError};
use std::f64::consts::PI;

fn close(expected: f64, actual: f64) {
    assert!((expected - actual).abs() < 1e-9, "expected {expected}, got {actual}");
}

#[test]
fn screw_drag_then_rotate_with_arrows() {
    let mut set = ImplantSet::new(ImplantConfig::default());
    set.add_screw(Point::new(100.0, 100.0));

    assert!(set.pointer_down(Point::new(105.0, 100.0)));
    assert!(set.screws()[0].selected);
    assert!(set.pointer_move(Point::new(200.0, 150.0)));
    set.pointer_up();
    assert_eq!(Point::new(200.0, 150.0), set.screws()[0].center());

    assert!(set.key(Key::ArrowRight));
    assert!(set.key(Key::ArrowRight));
    assert!(set.key(Key::ArrowLeft));
    close(0.1, set.screws()[0].angle);
    assert!(!set.pointer_move(Point::new(0.0, 0.0)));
}

#[test]
fn screw_head_sits_on_first_endpoint() {
    let mut set = ImplantSet::new(ImplantConfig::default());
    set.add_screw(Point::new(50.0, 50.0));
    let (head, tip) = set.screws()[0].endpoints();
    assert_eq!(Point::new(20.0, 50.0), head);
    assert_eq!(Point::new(80.0, 50.0), tip);
}

#[test]
fn cage_keeps_grab_offset_while_dragged() {
    let mut set = ImplantSet::new(ImplantConfig::default());
    set.add_cage(Point::new(300.0, 300.0));

    assert!(set.pointer_down(Point::new(310.0, 302.0)));
    set.pointer_move(Point::new(410.0, 402.0));
    set.pointer_up();
    assert_eq!(Point::new(400.0, 400.0), set.cages()[0].center());
    assert!(set.cages()[0].selected);

    let bounds = set.cages()[0].bounds();
    assert_eq!(Point::new(400.0, 400.0), bounds.center());
    assert_eq!(40.0, bounds.width());
    assert_eq!(15.0, bounds.height());
}

#[test]
fn cage_resize_is_clamped() {
    let cfg = ImplantConfig::default();
    let mut set = ImplantSet::new(cfg.clone());
    set.add_cage(Point::new(0.0, 0.0));
    set.pointer_down(Point::new(0.0, 0.0));

    assert!(set.key(Key::Char('+')));
    close(45.0, set.cages()[0].width);
    close(17.0, set.cages()[0].height);
    for _ in 0..20 {
        set.key(Key::Char('='));
    }
    close(cfg.cage_max_width, set.cages()[0].width);
    close(cfg.cage_max_height, set.cages()[0].height);
    for _ in 0..40 {
        set.key(Key::Char('-'));
    }
    close(cfg.cage_min_width, set.cages()[0].width);
    close(cfg.cage_min_height, set.cages()[0].height);

    assert!(set.key(Key::Char('r')));
    close(PI / 12.0, set.cages()[0].angle);
    assert!(!set.key(Key::Char('x')));
}

#[test]
fn delete_removes_only_the_selected_cage() {
    let mut set = ImplantSet::new(ImplantConfig::default());
    set.add_cage(Point::new(0.0, 0.0));
    set.add_cage(Point::new(200.0, 0.0));
    set.pointer_down(Point::new(200.0, 0.0));

    assert!(set.key(Key::Backspace));
    assert_eq!(1, set.cages().len());
    assert_eq!(Point::new(0.0, 0.0), set.cages()[0].center());
    assert!(!set.key(Key::Delete));
}

#[test]
fn screws_win_over_cages_and_misses_deselect() {
    let mut set = ImplantSet::new(ImplantConfig::default());
    set.add_cage(Point::new(100.0, 100.0));
    set.add_screw(Point::new(100.0, 100.0));

    assert!(set.pointer_down(Point::new(101.0, 101.0)));
    assert!(set.screws()[0].selected);
    assert!(!set.cages()[0].selected);

    assert!(!set.pointer_down(Point::new(900.0, 900.0)));
    assert!(!set.screws()[0].selected);
    assert!(!set.key(Key::ArrowLeft));
}

#[test]
fn topmost_cage_is_picked() {
    let mut set = ImplantSet::new(ImplantConfig::default());
    set.add_cage(Point::new(100.0, 100.0));
    set.add_cage(Point::new(105.0, 100.0));
    set.pointer_down(Point::new(103.0, 100.0));
    assert!(!set.cages()[0].selected);
    assert!(set.cages()[1].selected);
}

#[test]
fn key_names() {
    assert_eq!(Some(Key::ArrowLeft), Key::from_name("ArrowLeft"));
    assert_eq!(Some(Key::Delete), Key::from_name("Delete"));
    assert_eq!(Some(Key::Char('R')), Key::from_name("R"));
    assert_eq!(None, Key::from_name("Shift"));
    assert_eq!(None, Key::from_name(""));
}

#[test]
fn drawing_covers_every_implant() {
    let mut set = ImplantSet::new(ImplantConfig::default());
    set.add_screw(Point::new(10.0, 10.0));
    set.add_cage(Point::new(100.0, 100.0));
    let mut d = DrawList::new(200.0, 200.0);
    set.draw(&mut d);
    assert!(d.items.iter().any(|p| matches!(p, Primitive::Polygon { closed: true, .. })));
    assert!(d.items.iter().any(|p| matches!(p, Primitive::Marker { .. })));

    set.clear();
    assert!(set.is_empty());
}

#[test]
fn two_point_rod_is_straight() {
    let mut path = RodPath::new(0.25);
    path.push(Point::new(0.0, 0.0));
    path.push(Point::new(30.0, 40.0));
    let curve = path.curve();
    assert_eq!(1, curve.len());
    assert_eq!(curve[0].from, curve[0].c1);
    assert_eq!(curve[0].to, curve[0].c2);
    close(50.0, path.measure(None).unwrap().total_length);
}

#[test]
fn rod_controls_follow_neighbours() {
    let points = [Point::new(0.0, 0.0), Point::new(100.0, 0.0), Point::new(200.0, 100.0)];
    let mut d = DrawList::new(300.0, 300.0);
    let m = rod(&points, 0.25, Some(&mut d)).unwrap();
    assert_eq!(2, m.segments);
    close(100.0 + 2.0f64.sqrt() * 100.0, m.total_length);

    let path = RodPath {
        points: points.to_vec(),
        curvature: 0.25,
    };
    let curve = path.curve();
    assert_eq!(Point::new(25.0, 0.0), curve[0].c1);
    assert_eq!(Point::new(50.0, -25.0), curve[0].c2);
    assert_eq!(Point::new(150.0, 25.0), curve[1].c1);
    assert_eq!(Point::new(175.0, 75.0), curve[1].c2);
    assert_eq!(2, d.items.iter().filter(|p| matches!(p, Primitive::CubicCurve { .. })).count());
}

#[test]
fn rod_needs_two_points() {
    let err = rod(&[Point::new(1.0, 1.0)], 0.25, None).unwrap_err();
    assert_eq!(SpineError::InsufficientPoints { required: 2, got: 1 }, err);
}
