use serde::{Deserialize, Serialize};

// Piecewise-linear channel ramps of the "jet" colormap: (position, value).
const JET_RED: [(f64, f64); 5] = [(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)];
const JET_GREEN: [(f64, f64); 6] = [
    (0.0, 0.0),
    (0.125, 0.0),
    (0.375, 1.0),
    (0.64, 1.0),
    (0.91, 0.0),
    (1.0, 0.0),
];
const JET_BLUE: [(f64, f64); 5] = [(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)];

/// An RGB color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )
    }

    /// Sum of the channels; dark fills (below 1.3) get white text.
    pub fn brightness(self) -> f64 {
        self.r + self.g + self.b
    }

    pub fn to_hsv(self) -> (f64, f64, f64) {
        rgb_to_hsv(self.r, self.g, self.b)
    }
}

/// Linear map of `[vmin, vmax]` onto `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalize {
    pub vmin: f64,
    pub vmax: f64,
}

impl Normalize {
    pub fn new(vmin: f64, vmax: f64) -> Self {
        Self { vmin, vmax }
    }

    /// A degenerate range maps everything to 0.
    pub fn apply(&self, value: f64) -> f64 {
        let span = self.vmax - self.vmin;
        if span.abs() < f64::EPSILON {
            return 0.0;
        }
        (value - self.vmin) / span
    }
}

fn ramp(segments: &[(f64, f64)], t: f64) -> f64 {
    for pair in segments.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if t <= x1 {
            if x1 - x0 <= f64::EPSILON {
                return y1;
            }
            return y0 + (y1 - y0) * (t - x0) / (x1 - x0);
        }
    }
    segments.last().map(|(_, y)| *y).unwrap_or(0.0)
}

/// The jet colormap (dark blue through cyan, yellow, to dark red). `t` is clamped to `[0, 1]`.
pub fn jet(t: f64) -> Rgb {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    Rgb::new(ramp(&JET_RED, t), ramp(&JET_GREEN, t), ramp(&JET_BLUE, t))
}

/// Hue, saturation and value, each in `[0, 1]`.
pub fn rgb_to_hsv(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let v = max;
    if (max - min).abs() < f64::EPSILON {
        return (0.0, 0.0, v);
    }
    let s = (max - min) / max;
    let rc = (max - r) / (max - min);
    let gc = (max - g) / (max - min);
    let bc = (max - b) / (max - min);
    let h = if r == max {
        bc - gc
    } else if g == max {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };
    let h = (h / 6.0).rem_euclid(1.0);
    (h, s, v)
}
