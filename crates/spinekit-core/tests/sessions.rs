use spinekit_core::classify::{Band, MeyerdingGrade, StenosisSeverity, ThresholdTable};
use spinekit_core::polygon::{PolygonAction, PolygonSession, PolygonState};
use spinekit_core::session::Progress;
use spinekit_core::tools::{evaluate, find_tool, tools_in, ToolCategory, ToolOptions, TOOLS};
use spinekit_core::{MeasureSession, Measurement, Point, SpineConfig, SpineError, ToolSession, ToolShape};

fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn session(key: &str) -> MeasureSession {
    MeasureSession::new(key, SpineConfig::default(), 800.0, 600.0).unwrap()
}

struct Fixed(usize);

impl ToolShape for Fixed {
    fn key(&self) -> &str {
        "fixed"
    }

    fn required_points(&self) -> Option<usize> {
        Some(self.0)
    }
}

#[test]
fn tool_session_restarts_when_full() {
    let mut tool = ToolSession::new(Fixed(2));
    assert_eq!(Progress::Collecting { have: 1, need: Some(2) }, tool.push(p(0.0, 0.0)));
    assert_eq!(Progress::Ready, tool.push(p(1.0, 0.0)));
    assert_eq!(Progress::Collecting { have: 1, need: Some(2) }, tool.push(p(5.0, 5.0)));
    assert_eq!(&[p(5.0, 5.0)], tool.points());
    tool.reset();
    assert!(tool.points().is_empty());
}

#[test]
fn catalog_keys_are_unique_and_resolvable() {
    for (i, tool) in TOOLS.iter().enumerate() {
        assert!(TOOLS[i + 1..].iter().all(|other| other.key != tool.key), "duplicate {}", tool.key);
        assert_eq!(tool.key, find_tool(tool.key).unwrap().key);
    }
    assert_eq!(4, tools_in(ToolCategory::Spondylolisthesis).count());
    assert_eq!(
        SpineError::UnknownTool("nope".to_string()),
        find_tool("nope").unwrap_err()
    );
}

#[test]
fn every_fixed_tool_runs_on_a_generic_click_set() {
    let clicks = [
        p(100.0, 100.0),
        p(160.0, 110.0),
        p(120.0, 220.0),
        p(190.0, 240.0),
        p(140.0, 320.0),
        p(210.0, 330.0),
        p(150.0, 420.0),
    ];
    let cfg = SpineConfig::default();
    for tool in TOOLS.iter().filter(|t| t.required_points.is_some()) {
        let m = evaluate(tool.key, &clicks, &ToolOptions::default(), &cfg, None)
            .unwrap_or_else(|e| panic!("{} failed: {e}", tool.key));
        assert!(m.value().is_finite(), "{} gave {}", tool.key, m.value());
        assert!(!m.summary().is_empty());
    }
}

#[test]
fn too_few_points_is_reported() {
    let err = evaluate("tpa", &[p(0.0, 0.0); 4], &ToolOptions::default(), &SpineConfig::default(), None)
        .unwrap_err();
    assert_eq!(SpineError::InsufficientPoints { required: 5, got: 4 }, err);
}

#[test]
fn fixed_tool_completes_on_last_click() {
    let mut s = session("line");
    assert_eq!(None, s.click(p(0.0, 0.0)).unwrap());
    assert_eq!(Progress::Collecting { have: 1, need: Some(2) }, s.progress());

    let outcome = s.click(p(3.0, 4.0)).unwrap().unwrap();
    assert_eq!(Measurement::Line { length: 5.0 }, outcome.measurement);
    assert!(!outcome.draw.is_empty());
    assert_eq!(Progress::Collecting { have: 0, need: Some(2) }, s.progress());
}

#[test]
fn open_ended_tool_recomputes_and_finishes() {
    let mut s = session("multi");
    assert_eq!(None, s.click(p(0.0, 0.0)).unwrap());
    let first = s.click(p(3.0, 4.0)).unwrap().unwrap();
    assert_eq!(
        Measurement::MultiLine {
            segments: 1,
            total_length: 5.0
        },
        first.measurement
    );
    s.click(p(3.0, 10.0)).unwrap();
    let done = s.finish().unwrap().unwrap();
    assert_eq!(
        Measurement::MultiLine {
            segments: 2,
            total_length: 11.0
        },
        done.measurement
    );
    assert_eq!(None, s.finish().unwrap());
}

#[test]
fn polygon_closes_near_first_vertex() {
    let mut poly = PolygonSession::new(15.0);
    assert_eq!(PolygonAction::Start, poly.add_point(p(0.0, 0.0)).action);
    assert_eq!(PolygonAction::Continue, poly.add_point(p(100.0, 0.0)).action);
    assert_eq!(PolygonAction::Continue, poly.add_point(p(5.0, 5.0)).action);
    assert_eq!(PolygonAction::Continue, poly.add_point(p(100.0, 100.0)).action);

    let step = poly.add_point(p(3.0, 3.0));
    assert_eq!(PolygonAction::Complete, step.action);
    assert_eq!(4, step.points.len());
    assert_eq!(PolygonState::Closed, poly.state());
    assert!(poly.polygon().is_some());

    assert_eq!(PolygonAction::Start, poly.add_point(p(50.0, 50.0)).action);
    assert_eq!(1, poly.vertices().len());
}

#[test]
fn polygon_tool_reports_area_on_close() {
    let mut s = session("polygon");
    for pt in [p(0.0, 0.0), p(100.0, 0.0), p(100.0, 100.0)] {
        assert_eq!(None, s.click(pt).unwrap());
    }
    let outcome = s.click(p(2.0, 2.0)).unwrap().unwrap();
    match outcome.measurement {
        Measurement::Polygon { vertices, area } => {
            assert_eq!(3, vertices.len());
            assert_eq!(5000.0, area);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn stenosis_closes_on_double_click() {
    let mut s = session("stenosis");
    s.click(p(0.0, 0.0)).unwrap();
    s.click(p(10.0, 0.0)).unwrap();
    let outcome = s.double_click(p(10.0, 10.0)).unwrap().unwrap();
    match outcome.measurement {
        Measurement::Stenosis(m) => {
            assert_eq!(50.0, m.area_mm2);
            assert_eq!(Some(StenosisSeverity::Severe), m.severity);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn vbm_leaves_an_editable_outline() {
    let mut s = session("vbm");
    for pt in [p(0.0, 0.0), p(40.0, 0.0), p(0.0, 30.0)] {
        assert_eq!(None, s.click(pt).unwrap());
    }
    let outcome = s.click(p(40.0, 20.0)).unwrap().unwrap();
    assert!(matches!(outcome.measurement, Measurement::VertebralBody(_)));

    let cfg = SpineConfig::default();
    let editor = s.vbm_editor().unwrap();
    assert!(!editor.pointer_down(p(200.0, 200.0)));
    assert!(editor.pointer_down(p(41.0, 19.0)));
    let live = editor.pointer_move(p(40.0, 30.0), &cfg, None).unwrap();
    assert_eq!(30.0, live.posterior_height_mm);
    assert_eq!(0.0, live.wedge_angle);
    assert!(editor.pointer_up(&cfg, None).is_some());
    assert!(!editor.is_dragging());
    assert_eq!(None, editor.pointer_up(&cfg, None));

    s.set_tool("line").unwrap();
    assert!(s.vbm_editor().is_none());
}

#[test]
fn curvature_option_selects_catalog_curve() {
    let options = ToolOptions {
        curve: "TK_T1_T12".to_string(),
        ..ToolOptions::default()
    };
    let mut s = session("curvature").with_options(options);
    let mut last = None;
    for pt in [p(0.0, 0.0), p(100.0, 0.0), p(0.0, 100.0), p(100.0, 200.0)] {
        last = s.click(pt).unwrap();
    }
    match last.unwrap().measurement {
        Measurement::SpinalCurvature(c) => {
            assert_eq!("TK_T1_T12", c.curve_key);
            assert_eq!("TK", c.abbreviation);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn measurement_serializes_with_type_tag() {
    let json = serde_json::to_value(Measurement::WedgeAngle { angle: 12.5 }).unwrap();
    assert_eq!("wedge_angle", json["type"]);
    assert_eq!(12.5, json["angle"]);
}

#[test]
fn config_round_trips_through_json() {
    let cfg = SpineConfig {
        mm_per_pixel: 0.3,
        ..SpineConfig::default()
    };
    let text = serde_json::to_string(&cfg).unwrap();
    let back: SpineConfig = serde_json::from_str(&text).unwrap();
    assert_eq!(cfg, back);

    let partial: SpineConfig = serde_json::from_str(r#"{"mm_per_pixel": 0.2}"#).unwrap();
    assert_eq!(0.2, partial.mm_per_pixel);
    assert_eq!(SpineConfig::default().implants, partial.implants);
}

#[test]
fn config_bands_are_sorted_on_load() {
    let json = r#"{"thresholds": {"meyerding": [
        {"from": 75.0, "grade": "IV"},
        {"from": -1000.0, "grade": "I"},
        {"from": 25.0, "grade": "II"},
        {"from": 50.0, "grade": "III"}
    ]}}"#;
    let cfg: SpineConfig = serde_json::from_str(json).unwrap();
    let table = &cfg.thresholds.meyerding;
    assert_eq!(Some(MeyerdingGrade::IV), table.classify(80.0));
    assert_eq!(Some(MeyerdingGrade::II), table.classify(30.0));
    assert!(table.bands().windows(2).all(|w| w[0].from <= w[1].from));

    let back: SpineConfig = serde_json::from_str(&serde_json::to_string(&cfg).unwrap()).unwrap();
    assert_eq!(cfg, back);
}

#[test]
fn nan_band_edge_is_rejected() {
    let bands = vec![
        Band { from: 0.0, grade: StenosisSeverity::Severe },
        Band { from: f64::NAN, grade: StenosisSeverity::Normal },
    ];
    let err = ThresholdTable::try_from(bands).unwrap_err();
    assert!(matches!(err, SpineError::InvalidConfig(_)));
}
