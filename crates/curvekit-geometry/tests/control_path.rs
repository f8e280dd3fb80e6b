use approx::assert_relative_eq;
use curvekit_core::CurveError;
use curvekit_geometry::{
    BezierCurve, CatmullRomSpline, ControlPath, Curve, IndexSequencer, Point, Polyline,
};
use curvekit_math::{Aabb2, DVec2};
use curvekit_path::{MultiPath, PointKind, ShapePath, WindingRule};

fn wave() -> ControlPath {
    let mut path = ControlPath::new();
    for (x, y) in [(0.0, 0.0), (1.0, 2.0), (2.0, 0.0), (3.0, 2.0), (4.0, 0.0)] {
        path.add_point(Point::new([x, y]));
    }
    path
}

fn all(n: usize) -> IndexSequencer {
    IndexSequencer::all(n).unwrap()
}

#[test]
fn test_curves_follow_point_edits() {
    let mut path = wave();
    path.add_curve(Polyline::new(path.points().clone(), all(5)));

    let mut out = MultiPath::new(2).unwrap();
    path.append_curves_to(&mut out).unwrap();
    assert_eq!(out.point(2), Some(&[2.0, 0.0][..]));

    // edit through a handle obtained from the store
    let handle = path.point(2).unwrap();
    handle.set_location(&[2.0, 10.0]);
    out.clear();
    path.append_curves_to(&mut out).unwrap();
    assert_eq!(out.point(2), Some(&[2.0, 10.0][..]));

    // structural edits shift indices under the same sequencer
    path.remove_point_ref(&handle).unwrap();
    path.add_point(Point::new([5.0, 5.0]));
    out.clear();
    path.append_curves_to(&mut out).unwrap();
    assert_eq!(out.point(2), Some(&[3.0, 2.0][..]));
    assert_eq!(out.last_point(), Some(&[5.0, 5.0][..]));
}

#[test]
fn test_connected_curves_share_a_sub_path() {
    let mut path = wave();
    path.add_curve(CatmullRomSpline::new(path.points().clone(), all(5)));
    let mut tail = Polyline::new(path.points().clone(), IndexSequencer::range(3, 4));
    tail.set_connect(true);
    path.add_curve(tail);
    assert_eq!(path.num_curves(), 2);

    let mut out = MultiPath::new(2).unwrap();
    out.set_flatness(0.05).unwrap();
    path.append_curves_to(&mut out).unwrap();

    let moves = out.iter().filter(|(k, _)| *k == PointKind::Move).count();
    assert_eq!(moves, 1);
    assert_eq!(out.last_point(), Some(&[4.0, 0.0][..]));
}

#[test]
fn test_parallel_matches_sequential() {
    let mut path = wave();
    path.add_curve(CatmullRomSpline::new(path.points().clone(), all(5)));
    path.add_curve(BezierCurve::new(path.points().clone(), all(5)));
    path.add_curve(BezierCurve::new(path.points().clone(), IndexSequencer::range(0, 9)));

    let mut template = MultiPath::new(2).unwrap();
    template.set_flatness(0.02).unwrap();
    let results = path.par_append_curves(&template);
    assert_eq!(results.len(), 3);

    for (i, result) in results.iter().take(2).enumerate() {
        let mut out = template.clone();
        path.curve_mut(i).unwrap().append_to(&mut out).unwrap();
        assert_eq!(result.as_ref().unwrap(), &out);
    }
    assert!(matches!(results[2], Err(CurveError::InvalidCurveState(_))));

    let mut out = template.clone();
    assert!(path.append_curves_to(&mut out).is_err());
}

#[test]
fn test_flattened_arch_hit_testing() {
    let mut path = ControlPath::new();
    for (x, y) in [(10.0, 10.0), (10.0, 200.0), (290.0, 200.0), (290.0, 10.0)] {
        path.add_point(Point::new([x, y]));
    }
    let mut arch = BezierCurve::new(path.points().clone(), all(4));

    let mut shape = ShapePath::new();
    shape.path_mut().set_flatness(0.25).unwrap();
    arch.append_to(shape.path_mut()).unwrap();

    for (x, y) in [(100.0, 100.0), (150.0, 140.0), (50.0, 50.0), (280.0, 12.0)] {
        assert!(shape.contains(DVec2::new(x, y)), "({x}, {y}) should be inside");
    }
    for (x, y) in [(0.0, 0.0), (9.0, 9.0), (30.0, 180.0), (280.0, 180.0), (12.0, 50.0)] {
        assert!(!shape.contains(DVec2::new(x, y)), "({x}, {y}) should be outside");
    }
    shape.set_winding_rule(WindingRule::NonZero);
    assert!(shape.contains(DVec2::new(100.0, 100.0)));

    let bounds = shape.bounds().unwrap();
    assert_relative_eq!(bounds.min.x, 10.0, epsilon = 1e-9);
    assert_relative_eq!(bounds.min.y, 10.0, epsilon = 1e-9);
    assert_relative_eq!(bounds.max.x, 290.0, epsilon = 1e-9);
    assert_relative_eq!(bounds.max.y, 152.5, epsilon = 1e-9);

    assert!(shape.contains_rect(&Aabb2::from_origin_size(100.0, 50.0, 100.0, 50.0)));
    assert!(!shape.contains_rect(&Aabb2::from_origin_size(100.0, 100.0, 100.0, 100.0)));
    assert!(shape.intersects_rect(&Aabb2::from_origin_size(100.0, 100.0, 100.0, 100.0)));
    assert!(!shape.intersects_rect(&Aabb2::from_origin_size(0.0, 160.0, 300.0, 40.0)));
}
