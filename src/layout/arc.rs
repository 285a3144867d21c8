use super::Point2D;

/// Control point of the quadratic Bézier joining `from` and `to` with curvature `rad`.
///
/// The control point sits on the chord's perpendicular bisector, `rad` chord
/// lengths away from the midpoint. Positive `rad` bends to the right of the
/// direction of travel, negative to the left; zero is the midpoint.
pub fn arc_control_point(from: Point2D, to: Point2D, rad: f64) -> Point2D {
    let mid_x = (from.x + to.x) / 2.0;
    let mid_y = (from.y + to.y) / 2.0;
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    Point2D::new(mid_x + rad * dy, mid_y - rad * dx)
}

/// Sample the arc into `segments + 1` points. Endpoints are returned exactly.
pub fn arc_points(from: Point2D, to: Point2D, rad: f64, segments: usize) -> Vec<Point2D> {
    let segments = segments.max(1);
    let control = arc_control_point(from, to, rad);
    let mut points = Vec::with_capacity(segments + 1);
    points.push(from);
    for step in 1..segments {
        let t = step as f64 / segments as f64;
        let u = 1.0 - t;
        let x = u * u * from.x + 2.0 * u * t * control.x + t * t * to.x;
        let y = u * u * from.y + 2.0 * u * t * control.y + t * t * to.y;
        points.push(Point2D::new(x, y));
    }
    points.push(to);
    points
}
