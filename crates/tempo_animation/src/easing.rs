//! Cubic bezier timing curves
//!
//! A timing curve maps a linear time fraction onto an eased progress fraction.
//! The curve is parameterized as `t ↦ (X(t), Y(t))` with implicit endpoints
//! `(0, 0)` and `(1, 1)`, so evaluating it for a given time fraction means
//! inverting `X` numerically and sampling `Y` at the found parameter.

/// Named timing curves
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    EaseIn,
    EaseOut,
    EaseInOut,
    #[default]
    Default,
    CubicBezier(f64, f64, f64, f64),
}

impl Easing {
    /// Build the bezier curve for this easing
    pub fn curve(&self) -> BezierCurve {
        match *self {
            Easing::EaseIn => BezierCurve::ease_in(),
            Easing::EaseOut => BezierCurve::ease_out(),
            Easing::EaseInOut => BezierCurve::ease_in_out(),
            Easing::Default => BezierCurve::standard(),
            Easing::CubicBezier(c1x, c1y, c2x, c2y) => BezierCurve::new(c1x, c1y, c2x, c2y),
        }
    }
}

impl From<Easing> for BezierCurve {
    fn from(easing: Easing) -> Self {
        easing.curve()
    }
}

/// A cubic bezier timing curve with precomputed polynomial coefficients
///
/// Control point coordinates are expected in `[0, 1]` but are not validated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BezierCurve {
    c1x: f64,
    c1y: f64,
    c2x: f64,
    c2y: f64,

    ax: f64,
    bx: f64,
    cx: f64,
    ay: f64,
    by: f64,
    cy: f64,
}

impl BezierCurve {
    /// Slope below which Newton iteration is abandoned for bisection
    const MIN_SLOPE: f64 = 1e-6;

    /// Newton iterations attempted before falling back to bisection
    const NEWTON_ITERATIONS: usize = 8;

    pub fn new(c1x: f64, c1y: f64, c2x: f64, c2y: f64) -> Self {
        let cx = 3.0 * c1x;
        let bx = 3.0 * (c2x - c1x) - cx;
        let ax = 1.0 - cx - bx;

        let cy = 3.0 * c1y;
        let by = 3.0 * (c2y - c1y) - cy;
        let ay = 1.0 - cy - by;

        Self {
            c1x,
            c1y,
            c2x,
            c2y,
            ax,
            bx,
            cx,
            ay,
            by,
            cy,
        }
    }

    pub fn ease_in() -> Self {
        Self::new(0.42, 0.0, 1.0, 1.0)
    }

    pub fn ease_out() -> Self {
        Self::new(0.0, 0.0, 0.58, 1.0)
    }

    pub fn ease_in_out() -> Self {
        Self::new(0.42, 0.0, 0.58, 1.0)
    }

    /// The platform "default" curve: a fast start with a long gentle tail
    pub fn standard() -> Self {
        Self::new(0.25, 0.01, 0.25, 1.0)
    }

    /// Control points as `(c1x, c1y, c2x, c2y)`
    pub fn control_points(&self) -> (f64, f64, f64, f64) {
        (self.c1x, self.c1y, self.c2x, self.c2y)
    }

    /// Map a time fraction `x` to eased progress, with `epsilon` as the
    /// tolerance on `|X(t) - x|`.
    ///
    /// Never fails: if neither Newton's method nor bisection converges, the
    /// last parameter estimate is used.
    pub fn solve(&self, x: f64, epsilon: f64) -> f64 {
        self.sample_y(self.solve_x(x, epsilon))
    }

    #[inline]
    fn sample_x(&self, t: f64) -> f64 {
        // ax t^3 + bx t^2 + cx t, Horner form
        ((self.ax * t + self.bx) * t + self.cx) * t
    }

    #[inline]
    fn sample_y(&self, t: f64) -> f64 {
        ((self.ay * t + self.by) * t + self.cy) * t
    }

    #[inline]
    fn sample_dx(&self, t: f64) -> f64 {
        (3.0 * self.ax * t + 2.0 * self.bx) * t + self.cx
    }

    /// Find the curve parameter whose X coordinate is `x`
    fn solve_x(&self, x: f64, epsilon: f64) -> f64 {
        let mut t = x;
        for _ in 0..Self::NEWTON_ITERATIONS {
            let err = self.sample_x(t) - x;
            if err.abs() < epsilon {
                return t;
            }
            let slope = self.sample_dx(t);
            if slope.abs() < Self::MIN_SLOPE {
                break;
            }
            t -= err / slope;
        }

        let mut lo = 0.0_f64;
        let mut hi = 1.0_f64;
        t = x;

        if t < lo {
            return lo;
        }
        if t > hi {
            return hi;
        }

        while lo < hi {
            let value = self.sample_x(t);
            if (value - x).abs() < epsilon {
                return t;
            }
            if x > value {
                lo = t;
            } else {
                hi = t;
            }
            let mid = (hi - lo) * 0.5 + lo;
            if mid == t {
                // Interval collapsed to float resolution
                break;
            }
            t = mid;
        }

        t
    }
}

impl Default for BezierCurve {
    fn default() -> Self {
        Self::standard()
    }
}
