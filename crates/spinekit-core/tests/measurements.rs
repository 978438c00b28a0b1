use spinekit_core::abnormality::{
    apical_tilt, scoliosis, slip_angle, slip_distance, slip_percentage, spondylolisthesis, stenosis,
    ScoliosisCurveType, SlipLandmarks, StenosisType,
};
use spinekit_core::classify::{
    CurveSeverity, MeyerdingGrade, SagittalBalance, StenosisSeverity, TrunkShiftSeverity,
};
use spinekit_core::coronal::{avt, pelvic_obliquity, rvad, trunk_shift};
use spinekit_core::curvature::{curve_type, spinal_curvature, CurveShape, SpinalRegion};
use spinekit_core::generic;
use spinekit_core::sagittal::{cbva, cervical_sva, sva, t1_pelvic_angle, t1_spi};
use spinekit_core::spinopelvic::spinopelvic_params;
use spinekit_core::vbm::{vbm, VbmOutline};
use spinekit_core::{DrawList, Point, SpineConfig, SpineError};

fn close(expected: f64, actual: f64) {
    assert!((expected - actual).abs() < 1e-6, "expected {expected}, got {actual}");
}

fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn half_mm() -> SpineConfig {
    SpineConfig {
        mm_per_pixel: 0.5,
        ..SpineConfig::default()
    }
}

#[test]
fn spinopelvic_parameters_add_up() {
    let cfg = SpineConfig::default();
    let mut draw = DrawList::new(400.0, 400.0);
    let params = spinopelvic_params(
        p(100.0, 300.0),
        p(120.0, 300.0),
        p(150.0, 200.0),
        p(190.0, 180.0),
        &cfg,
        Some(&mut draw),
    );
    close(55.175510843, params.pi);
    close(28.610459666, params.pt);
    close(26.565051177, params.ss);
    assert!(params.difference.abs() < 1e-6);
    assert!(params.valid);
    assert_eq!(Some(SagittalBalance::PositiveImbalance), params.pt_balance);
    assert!(!draw.is_empty());
}

#[test]
fn swapped_sacral_corners_fail_the_consistency_check() {
    let params = spinopelvic_params(
        p(100.0, 300.0),
        p(120.0, 300.0),
        p(190.0, 180.0),
        p(150.0, 200.0),
        &SpineConfig::default(),
        None,
    );
    assert!(!params.valid);
    assert!(params.difference > 60.0);
}

#[test]
fn sva_is_signed_and_scaled() {
    let cfg = half_mm();
    let forward = sva(p(130.0, 100.0), p(100.0, 400.0), &cfg, None);
    close(15.0, forward.offset_mm);
    assert_eq!(Some(SagittalBalance::Balanced), forward.balance);

    let behind = sva(p(0.0, 100.0), p(210.0, 400.0), &cfg, None);
    close(-105.0, behind.offset_mm);
    close(105.0, behind.magnitude());
    assert_eq!(Some(SagittalBalance::NegativeImbalance), behind.balance);

    let edge = sva(p(200.0, 100.0), p(100.0, 400.0), &cfg, None);
    assert_eq!(Some(SagittalBalance::PositiveImbalance), edge.balance);
}

#[test]
fn cervical_sva_uses_its_own_limit() {
    let offset = cervical_sva(p(145.0, 0.0), p(100.0, 200.0), &SpineConfig::default(), None);
    close(45.0, offset.offset_mm);
    assert_eq!(Some(SagittalBalance::PositiveImbalance), offset.balance);
}

#[test]
fn offsets_at_the_limit_are_imbalanced_on_both_sides() {
    let cfg = SpineConfig::default();
    let ahead = sva(p(150.0, 0.0), p(100.0, 300.0), &cfg, None);
    let behind = sva(p(50.0, 0.0), p(100.0, 300.0), &cfg, None);
    assert_eq!(Some(SagittalBalance::PositiveImbalance), ahead.balance);
    assert_eq!(Some(SagittalBalance::NegativeImbalance), behind.balance);

    let ahead = cervical_sva(p(140.0, 0.0), p(100.0, 200.0), &cfg, None);
    let behind = cervical_sva(p(60.0, 0.0), p(100.0, 200.0), &cfg, None);
    assert_eq!(Some(SagittalBalance::PositiveImbalance), ahead.balance);
    assert_eq!(Some(SagittalBalance::NegativeImbalance), behind.balance);

    let inside = cervical_sva(p(61.0, 0.0), p(100.0, 200.0), &cfg, None);
    assert_eq!(Some(SagittalBalance::Balanced), inside.balance);
}

#[test]
fn t1_pelvic_angle_vertex_is_femoral_centre() {
    let tpa = t1_pelvic_angle(
        p(110.0, 0.0),
        p(100.0, 300.0),
        p(120.0, 300.0),
        p(150.0, 200.0),
        p(190.0, 180.0),
        &SpineConfig::default(),
        None,
    );
    close(28.610459666, tpa.degrees);
    assert_eq!(Some(SagittalBalance::PositiveImbalance), tpa.balance);
}

#[test]
fn hip_axis_and_chin_brow_are_measured_from_vertical() {
    close(0.0, t1_spi(p(100.0, 0.0), p(90.0, 100.0), p(110.0, 100.0), None));
    close(45.0, t1_spi(p(200.0, 0.0), p(90.0, 100.0), p(110.0, 100.0), None));
    close(45.0, cbva(p(0.0, 100.0), p(100.0, 0.0), None));
}

#[test]
fn trunk_shift_grades_at_band_edge() {
    let shift = trunk_shift(p(120.0, 50.0), p(80.0, 400.0), p(100.0, 400.0), &SpineConfig::default(), None);
    close(30.0, shift.shift_mm);
    assert_eq!(Some(TrunkShiftSeverity::Severe), shift.severity);
}

#[test]
fn apical_translation_and_obliquity() {
    close(20.0, avt(p(130.0, 200.0), p(80.0, 400.0), p(100.0, 400.0), &half_mm(), None));
    close(45.0, pelvic_obliquity(p(0.0, 0.0), p(50.0, 50.0), None));
}

#[test]
fn rib_vertebral_angle_difference() {
    let result = rvad(
        (p(0.0, 0.0), p(100.0, 0.0)),
        (p(0.0, 0.0), p(100.0, 100.0)),
        (p(0.0, 50.0), p(40.0, 50.0)),
        None,
    );
    close(90.0, result.left_angle);
    close(45.0, result.right_angle);
    close(45.0, result.difference);
}

#[test]
fn curvature_uses_catalog_entry() {
    let points = [p(0.0, 0.0), p(100.0, 0.0), p(0.0, 100.0), p(100.0, 120.0)];
    let lordosis = spinal_curvature(points, curve_type("LL_L1_S1"), &SpineConfig::default(), None);
    assert_eq!("LL", lordosis.abbreviation);
    assert_eq!(SpinalRegion::Lumbar, lordosis.region);
    assert_eq!(CurveShape::Lordosis, lordosis.shape);
    close(11.309932474, lordosis.angle);
    assert_eq!(Some(CurveSeverity::Mild), lordosis.severity);
    assert!(lordosis.apex.is_some());

    let fallback = curve_type("no-such-curve");
    assert_eq!("CUSTOM", fallback.key);
}

#[test]
fn parallel_endplates_have_no_apex() {
    let points = [p(0.0, 0.0), p(100.0, 0.0), p(0.0, 50.0), p(100.0, 50.0)];
    let flat = spinal_curvature(points, curve_type("CUSTOM"), &SpineConfig::default(), None);
    close(0.0, flat.angle);
    assert_eq!(None, flat.apex);
}

#[test]
fn stenosis_area_grades() {
    let cfg = SpineConfig::default();
    let square = [p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)];
    let moderate = stenosis(&square, StenosisType::Foraminal, &cfg, None).unwrap();
    close(100.0, moderate.area_mm2);
    assert_eq!(Some(StenosisSeverity::Moderate), moderate.severity);
    assert_eq!(StenosisType::Foraminal, moderate.stenosis_type);

    let wide = [p(0.0, 0.0), p(20.0, 0.0), p(20.0, 20.0), p(0.0, 20.0)];
    let normal = stenosis(&wide, StenosisType::Central, &cfg, None).unwrap();
    assert_eq!(Some(StenosisSeverity::Normal), normal.severity);
}

#[test]
fn collinear_stenosis_outline_falls_back_to_vertex_mean() {
    let flat = [p(0.0, 0.0), p(10.0, 0.0), p(20.0, 0.0)];
    let m = stenosis(&flat, StenosisType::Central, &SpineConfig::default(), None).unwrap();
    close(0.0, m.area_mm2);
    assert_eq!(p(10.0, 0.0), m.centroid);
    assert_eq!(Some(StenosisSeverity::Severe), m.severity);
}

#[test]
fn stenosis_type_parses_from_label_keys() {
    assert_eq!(StenosisType::LateralRecess, "lateral_recess".parse::<StenosisType>().unwrap());
    assert_eq!(ScoliosisCurveType::DoubleMajor, "double_major".parse::<ScoliosisCurveType>().unwrap());
}

#[test]
fn slip_on_level_endplates() {
    let cfg = SpineConfig::default();
    let l = SlipLandmarks::from_points(&[p(110.0, 100.0), p(150.0, 100.0), p(100.0, 140.0), p(140.0, 140.0)]).unwrap();
    close(10.0, slip_distance(&l, &cfg, None));
    close(0.0, slip_angle(&l, None));
    let pct = slip_percentage(&l, &cfg, None).unwrap();
    close(25.0, pct.percentage);
    close(40.0, pct.ap_diameter_mm);
    assert_eq!(Some(MeyerdingGrade::II), pct.grade);
}

#[test]
fn level_endplate_slip_is_the_horizontal_offset() {
    let l = SlipLandmarks::from_points(&[p(73.0, 90.0), p(120.0, 95.0), p(100.0, 140.0), p(150.0, 140.0)]).unwrap();
    close((l.upper_posterior.x - l.lower_posterior.x).abs(), slip_distance(&l, &SpineConfig::default(), None));
}

#[test]
fn slip_is_measured_along_tilted_endplate() {
    let l = SlipLandmarks {
        upper_posterior: p(-10.0, 20.0),
        upper_anterior: p(20.0, 60.0),
        lower_posterior: p(0.0, 0.0),
        lower_anterior: p(30.0, 40.0),
    };
    let full = spondylolisthesis(&l, &half_mm(), None).unwrap();
    close(5.0, full.slip_mm);
    close(25.0, full.ap_diameter_mm);
    close(20.0, full.percentage);
    assert_eq!(Some(MeyerdingGrade::I), full.grade);
}

#[test]
fn zero_ap_diameter_is_degenerate() {
    let l = SlipLandmarks::from_points(&[p(0.0, 0.0), p(10.0, 0.0), p(5.0, 5.0), p(5.0, 5.0)]).unwrap();
    let err = slip_percentage(&l, &SpineConfig::default(), None).unwrap_err();
    assert!(matches!(err, SpineError::DegenerateGeometry(_)));
}

#[test]
fn scoliosis_combines_cobb_and_shift() {
    let points = [
        p(0.0, 0.0),
        p(100.0, 0.0),
        p(0.0, 100.0),
        p(100.0, 200.0),
        p(115.0, 0.0),
        p(80.0, 400.0),
        p(100.0, 400.0),
    ];
    let s = scoliosis(&points, ScoliosisCurveType::Lumbar, &SpineConfig::default(), None).unwrap();
    close(45.0, s.cobb.angle);
    assert_eq!(Some(CurveSeverity::Severe), s.cobb.severity);
    assert_eq!(ScoliosisCurveType::Lumbar, s.cobb.curve_type);
    close(25.0, s.trunk_shift_mm);
    assert_eq!(Some(TrunkShiftSeverity::Moderate), s.trunk_shift_severity);

    let err = scoliosis(&points[..6], ScoliosisCurveType::Lumbar, &SpineConfig::default(), None).unwrap_err();
    assert_eq!(SpineError::InsufficientPoints { required: 7, got: 6 }, err);
}

#[test]
fn apical_tilt_between_vertebral_lines() {
    close(45.0, apical_tilt((p(0.0, 0.0), p(0.0, 100.0)), (p(50.0, 0.0), p(150.0, 100.0)), None));
}

#[test]
fn vertebral_body_metrics() {
    let outline = VbmOutline::from_points(&[p(0.0, 0.0), p(40.0, 0.0), p(0.0, 30.0), p(40.0, 20.0)]).unwrap();
    let m = vbm(&outline, &half_mm(), None);
    close(15.0, m.anterior_height_mm);
    close(10.0, m.posterior_height_mm);
    close(14.036243468, m.wedge_angle);
    close(250.0, m.area_mm2);
}

#[test]
fn generic_tools() {
    close(5.0, generic::line_length(&[p(0.0, 0.0), p(3.0, 4.0)], None).unwrap());

    let (h, v) = generic::angle_2pt(&[p(0.0, 0.0), p(10.0, 10.0)], None).unwrap();
    close(45.0, h);
    close(45.0, v);

    close(90.0, generic::angle_3pt(&[p(10.0, 0.0), p(0.0, 0.0), p(0.0, 10.0)], None).unwrap());

    let (segments, total) = generic::multi_line(&[p(0.0, 0.0), p(3.0, 4.0), p(3.0, 10.0)], None).unwrap();
    assert_eq!(2, segments);
    close(11.0, total);

    let (center, radius) = generic::circle(&[p(5.0, 5.0), p(5.0, 15.0)], None).unwrap();
    assert_eq!(p(5.0, 5.0), center);
    close(10.0, radius);

    let (center, rx, ry) = generic::ellipse(&[p(0.0, 0.0), p(10.0, 4.0)], None).unwrap();
    assert_eq!(p(5.0, 2.0), center);
    close(5.0, rx);
    close(2.0, ry);

    assert_eq!(3, generic::pencil(&[p(0.0, 0.0), p(1.0, 1.0), p(2.0, 1.0), p(3.0, 0.0)], None).unwrap());
}
