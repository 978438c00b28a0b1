use proptest::prelude::*;
use spinekit_core::classify::{
    cobb_table, meyerding_table, stenosis_table, CurveSeverity, MeyerdingGrade, StenosisSeverity,
};
use spinekit_core::geom::{
    angle_abc, angle_with_horizontal, cobb_angle, distance, distance_point_to_line, inclination, line_intersection, midpoint,
    wedge_angle, y_at_x, Point,
};
use spinekit_core::polygon::{polygon_area, polygon_centroid};
use spinekit_core::SpineError;

fn close(expected: f64, actual: f64) {
    assert!((expected - actual).abs() < 1e-6, "expected {expected}, got {actual}");
}

fn coord() -> impl Strategy<Value = f64> {
    -1000.0..1000.0f64
}

fn point() -> impl Strategy<Value = Point> {
    (coord(), coord()).prop_map(|(x, y)| Point::new(x, y))
}

#[test]
fn right_angle_wedge() {
    let a = Point::new(100.0, 0.0);
    let b = Point::new(0.0, 0.0);
    let c = Point::new(0.0, 100.0);
    close(90.0, wedge_angle(a, b, c));
    close(90.0, angle_abc(a, b, c));

    let hinge = Point::new(100.0, 100.0);
    close(90.0, wedge_angle(Point::new(100.0, 50.0), hinge, Point::new(150.0, 100.0)));
}

#[test]
fn meyerding_grades() {
    let table = meyerding_table();
    assert_eq!(Some(MeyerdingGrade::I), table.classify(24.9));
    assert_eq!(Some(MeyerdingGrade::II), table.classify(25.0));
    assert_eq!(Some(MeyerdingGrade::IV), table.classify(99.9));
    assert_eq!(Some(MeyerdingGrade::V), table.classify(100.1));
}

#[test]
fn parallel_lines_do_not_intersect() {
    let err = line_intersection(
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(0.0, 5.0),
        Point::new(10.0, 5.0),
    )
    .unwrap_err();
    assert!(matches!(err, SpineError::DegenerateGeometry(_)));
}

#[test]
fn crossing_lines_meet_at_expected_point() {
    let at = line_intersection(
        Point::new(0.0, 0.0),
        Point::new(10.0, 10.0),
        Point::new(0.0, 10.0),
        Point::new(10.0, 0.0),
    )
    .unwrap();
    close(5.0, at.x);
    close(5.0, at.y);
}

#[test]
fn cobb_of_horizontal_and_diagonal_is_45() {
    let upper = (Point::new(0.0, 0.0), Point::new(100.0, 0.0));
    let lower = (Point::new(0.0, 100.0), Point::new(100.0, 200.0));
    close(45.0, cobb_angle(upper, lower));
}

#[test]
fn unit_square_area_and_centroid() {
    let square = [
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(10.0, 10.0),
        Point::new(0.0, 10.0),
    ];
    close(100.0, polygon_area(&square).unwrap());
    let c = polygon_centroid(&square).unwrap();
    close(5.0, c.x);
    close(5.0, c.y);
}

#[test]
fn polygon_needs_three_vertices() {
    let err = polygon_area(&[Point::new(0.0, 0.0), Point::new(1.0, 1.0)]).unwrap_err();
    assert_eq!(SpineError::InsufficientPoints { required: 3, got: 2 }, err);
}

#[test]
fn collinear_outline_has_no_centroid() {
    let line = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(20.0, 0.0)];
    close(0.0, polygon_area(&line).unwrap());
    assert!(polygon_centroid(&line).is_err());
}

#[test]
fn band_edges_go_up() {
    let cobb = cobb_table();
    assert_eq!(Some(CurveSeverity::Normal), cobb.classify(9.999));
    assert_eq!(Some(CurveSeverity::Mild), cobb.classify(10.0));
    assert_eq!(Some(CurveSeverity::Severe), cobb.classify(40.0));
    assert_eq!(Some(CurveSeverity::VerySevere), cobb.classify(50.0));

    let stenosis = stenosis_table();
    assert_eq!(Some(StenosisSeverity::Severe), stenosis.classify(0.0));
    assert_eq!(Some(StenosisSeverity::Moderate), stenosis.classify(100.0));
    assert_eq!(Some(StenosisSeverity::Normal), stenosis.classify(300.0));
}

proptest! {
    #[test]
    fn interior_angle_stays_in_range(a in point(), b in point(), c in point()) {
        prop_assume!(distance(a, b) > 1e-3 && distance(c, b) > 1e-3);
        let angle = angle_abc(a, b, c);
        prop_assert!((0.0..=180.0).contains(&angle));
        prop_assert!((angle - angle_abc(c, b, a)).abs() < 1e-9);
        prop_assert!((wedge_angle(a, b, c) - angle).abs() < 1e-9);
    }

    #[test]
    fn horizontal_angle_ignores_direction(a in point(), b in point()) {
        prop_assume!(distance(a, b) > 1e-3);
        let forward = angle_with_horizontal(a, b);
        prop_assert!((0.0..=90.0).contains(&forward));
        prop_assert!((forward - angle_with_horizontal(b, a)).abs() < 1e-9);
    }

    #[test]
    fn cobb_is_acute_and_symmetric(a1 in point(), a2 in point(), b1 in point(), b2 in point()) {
        prop_assume!(distance(a1, a2) > 1e-3 && distance(b1, b2) > 1e-3);
        let angle = cobb_angle((a1, a2), (b1, b2));
        prop_assert!((0.0..=90.0).contains(&angle));
        prop_assert!((angle - cobb_angle((b1, b2), (a1, a2))).abs() < 1e-9);
    }

    #[test]
    fn intersection_lies_on_both_lines(p1 in point(), p2 in point(), p3 in point(), p4 in point()) {
        prop_assume!(distance(p1, p2) > 1.0 && distance(p3, p4) > 1.0);
        prop_assume!(cobb_angle((p1, p2), (p3, p4)) > 5.0);
        let at = line_intersection(p1, p2, p3, p4).unwrap();
        let tolerance = 1e-6 * (1.0 + at.length());
        prop_assert!(distance_point_to_line(at, p1, p2) < tolerance);
        prop_assert!(distance_point_to_line(at, p3, p4) < tolerance);
    }

    #[test]
    fn area_ignores_starting_vertex(pts in prop::collection::vec(point(), 3..8), shift in 0usize..8) {
        let mut rotated = pts.clone();
        rotated.rotate_left(shift % pts.len());
        let a = polygon_area(&pts).unwrap();
        let b = polygon_area(&rotated).unwrap();
        prop_assert!((a - b).abs() < 1e-6 * (1.0 + a));
    }

    #[test]
    fn line_passes_through_its_endpoints(a in point(), b in point()) {
        prop_assume!((a.x - b.x).abs() > 0.5);
        prop_assert!((y_at_x(a, b, a.x) - a.y).abs() < 1e-6);
        prop_assert!((y_at_x(a, b, b.x) - b.y).abs() < 1e-6);
        let m = midpoint(a, b);
        prop_assert!((y_at_x(a, b, m.x) - m.y).abs() < 1e-6);
    }

    #[test]
    fn inclination_reverses_by_half_turn(a in point(), b in point()) {
        prop_assume!(distance(a, b) > 1e-3);
        let turn = (inclination(a, b) - inclination(b, a)).abs();
        prop_assert!((turn - 180.0).abs() < 1e-6);
    }

    #[test]
    fn translated_polygon_keeps_its_area(dx in coord(), dy in coord(), w in 1.0..200.0f64, h in 1.0..200.0f64) {
        let rect = [
            Point::new(dx, dy),
            Point::new(dx + w, dy),
            Point::new(dx + w, dy + h),
            Point::new(dx, dy + h),
        ];
        let area = polygon_area(&rect).unwrap();
        prop_assert!((area - w * h).abs() < 1e-6 * (1.0 + w * h));
        let mut reversed = rect;
        reversed.reverse();
        prop_assert!((polygon_area(&reversed).unwrap() - area).abs() < 1e-6 * (1.0 + area));
    }
}
