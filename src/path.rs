/// Shape of a routed edge: a straight chord or a quadratic curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeShape {
    Line {
        from: (f32, f32),
        to: (f32, f32),
    },
    Quadratic {
        from: (f32, f32),
        control: (f32, f32),
        to: (f32, f32),
    },
}

impl EdgeShape {
    pub fn from(&self) -> (f32, f32) {
        match *self {
            EdgeShape::Line { from, .. } | EdgeShape::Quadratic { from, .. } => from,
        }
    }

    pub fn to(&self) -> (f32, f32) {
        match *self {
            EdgeShape::Line { to, .. } | EdgeShape::Quadratic { to, .. } => to,
        }
    }

    pub fn is_straight(&self) -> bool {
        matches!(self, EdgeShape::Line { .. })
    }

    /// Evaluate the shape at parameter t (0.0 to 1.0)
    pub fn eval(&self, t: f32) -> (f32, f32) {
        match *self {
            EdgeShape::Line { from, to } => lerp_point(from, to, t),
            EdgeShape::Quadratic { from, control, to } => {
                let mt = 1.0 - t;
                let a = mt * mt;
                let b = 2.0 * mt * t;
                let c = t * t;
                (
                    a * from.0 + b * control.0 + c * to.0,
                    a * from.1 + b * control.1 + c * to.1,
                )
            }
        }
    }

    /// Derivative at parameter t. Not normalised.
    pub fn tangent(&self, t: f32) -> (f32, f32) {
        match *self {
            EdgeShape::Line { from, to } => (to.0 - from.0, to.1 - from.1),
            EdgeShape::Quadratic { from, control, to } => {
                let mt = 1.0 - t;
                (
                    2.0 * mt * (control.0 - from.0) + 2.0 * t * (to.0 - control.0),
                    2.0 * mt * (control.1 - from.1) + 2.0 * t * (to.1 - control.1),
                )
            }
        }
    }

    /// Map every point through `f` (e.g. world → screen).
    pub fn map(&self, f: impl Fn((f32, f32)) -> (f32, f32)) -> Self {
        match *self {
            EdgeShape::Line { from, to } => EdgeShape::Line { from: f(from), to: f(to) },
            EdgeShape::Quadratic { from, control, to } => EdgeShape::Quadratic {
                from: f(from),
                control: f(control),
                to: f(to),
            },
        }
    }

    /// SVG path command for this shape.
    ///
    /// e.g. `"M 0 0 L 100 0"` or `"M 0 0 Q 50 45 100 0"`.
    pub fn to_svg_path(&self) -> String {
        match *self {
            EdgeShape::Line { from, to } => {
                format!("M {} {} L {} {}", from.0, from.1, to.0, to.1)
            }
            EdgeShape::Quadratic { from, control, to } => format!(
                "M {} {} Q {} {} {} {}",
                from.0, from.1, control.0, control.1, to.0, to.1
            ),
        }
    }
}

/// Linear interpolation between two points
fn lerp_point(a: (f32, f32), b: (f32, f32), t: f32) -> (f32, f32) {
    (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t)
}

/// Calculate squared distance from a point to a line segment
fn distance_to_line_segment_sq(point: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let ab = (b.0 - a.0, b.1 - a.1);
    let ap = (point.0 - a.0, point.1 - a.1);

    let ab_len_sq = ab.0 * ab.0 + ab.1 * ab.1;

    if ab_len_sq < f32::EPSILON {
        // Degenerate segment (a == b)
        return ap.0 * ap.0 + ap.1 * ap.1;
    }

    let t = ((ap.0 * ab.0 + ap.1 * ab.1) / ab_len_sq).clamp(0.0, 1.0);
    let closest = (a.0 + t * ab.0, a.1 + t * ab.1);

    let dx = point.0 - closest.0;
    let dy = point.1 - closest.1;
    dx * dx + dy * dy
}

/// Calculate the minimum distance from a point to an edge shape
///
/// Lines are measured exactly; curves are sampled at `num_samples`
/// segments (0 means the default of 20).
pub fn distance_to_shape(point: (f32, f32), shape: &EdgeShape, num_samples: usize) -> f32 {
    if let EdgeShape::Line { from, to } = *shape {
        return distance_to_line_segment_sq(point, from, to).sqrt();
    }

    let num_samples = if num_samples == 0 { 20 } else { num_samples };

    let mut min_dist_sq = f32::MAX;
    let mut prev_point = shape.eval(0.0);

    for i in 1..=num_samples {
        let t = i as f32 / num_samples as f32;
        let curr_point = shape.eval(t);

        let dist_sq = distance_to_line_segment_sq(point, prev_point, curr_point);
        if dist_sq < min_dist_sq {
            min_dist_sq = dist_sq;
        }

        prev_point = curr_point;
    }

    min_dist_sq.sqrt()
}
