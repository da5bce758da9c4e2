use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::Color;

/// Sentinel written into the value lane of padded geometry entries.
///
/// Geometry consumers must suppress any segment that touches an entry whose
/// value lane is non-finite; the interpolator jumps such entries straight to
/// their end value instead of sweeping them through the plot area.
pub const DUMMY_COORDINATE: f64 = f64::INFINITY;

/// Inline capacity for animatable numeric arrays; most geometry vectors
/// (rects, slice parameter blocks, candle bodies) fit without spilling.
pub type GeometryVec = SmallVec<[f64; 8]>;

/// One animatable property value on a [`crate::core::Shape`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnimValue {
    Scalar(f64),
    Array(GeometryVec),
    Color(Color),
}

impl AnimValue {
    #[must_use]
    pub fn array(values: impl IntoIterator<Item = f64>) -> Self {
        Self::Array(values.into_iter().collect())
    }

    #[must_use]
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[f64]> {
        match self {
            Self::Array(values) => Some(values),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(color) => Some(*color),
            _ => None,
        }
    }

    /// Interpolates between `self` (start) and `end` at progress `t`.
    ///
    /// Returns `None` when the two values are structurally incompatible
    /// (different variants, or arrays of different length); callers treat
    /// that as a recoverable fault and snap to the end value.
    ///
    /// Non-finite start entries are dummy coordinates: they adopt the end
    /// value immediately rather than interpolating from infinity.
    #[must_use]
    pub fn lerp(&self, end: &Self, t: f64) -> Option<Self> {
        match (self, end) {
            (Self::Scalar(from), Self::Scalar(to)) => {
                Some(Self::Scalar(lerp_component(*from, *to, t)))
            }
            (Self::Array(from), Self::Array(to)) => {
                if from.len() != to.len() {
                    return None;
                }
                Some(Self::Array(
                    from.iter()
                        .zip(to.iter())
                        .map(|(&a, &b)| lerp_component(a, b, t))
                        .collect(),
                ))
            }
            (Self::Color(from), Self::Color(to)) => Some(Self::Color(from.lerp(*to, t))),
            _ => None,
        }
    }
}

fn lerp_component(from: f64, to: f64, t: f64) -> f64 {
    if !from.is_finite() {
        return to;
    }
    from + (to - from) * t
}

/// Pads the shorter of two strided point arrays so both have the same number
/// of entries, cloning each padded entry's coordinates from the nearest real
/// neighbor and writing [`DUMMY_COORDINATE`] into `value_lane`.
///
/// Padding entries are placed positionally, not appended at the tail: the
/// shorter array's points are matched, in order, to the closest points of
/// the longer array along the position lane, and the unmatched positions
/// receive the pads. A point dropped from the head or interior of a line
/// therefore collapses in place instead of shifting every surviving point
/// onto its neighbor's index.
///
/// `stride` is the number of floats per logical point (e.g. 2 for `[x, y]`,
/// 4 for `[x, y1, y2, group]` quadruples); `value_lane` indexes the float
/// within one point that carries the data value. Arrays whose length is not
/// a multiple of `stride` are returned unchanged so the caller can degrade.
#[must_use]
pub fn align_point_arrays(
    old: &[f64],
    new: &[f64],
    stride: usize,
    value_lane: usize,
) -> (GeometryVec, GeometryVec) {
    let old_out: GeometryVec = old.iter().copied().collect();
    let new_out: GeometryVec = new.iter().copied().collect();

    if stride == 0
        || value_lane >= stride
        || old.len() % stride != 0
        || new.len() % stride != 0
        || old.len() == new.len()
    {
        return (old_out, new_out);
    }

    // Match along the first lane that is not the data value; single-lane
    // points carry no position and keep index order.
    let pos_lane = usize::from(value_lane == 0);
    if pos_lane >= stride {
        return pad_at_tail(old, new, stride, value_lane);
    }

    let old_is_short = old.len() < new.len();
    let (short, long) = if old_is_short { (old, new) } else { (new, old) };
    let short_pts: Vec<&[f64]> = short.chunks(stride).collect();
    let long_pts: Vec<&[f64]> = long.chunks(stride).collect();

    // Greedy monotone matching: each short point takes the closest long
    // point on the position lane that still leaves room for the rest.
    let mut match_of_long: Vec<Option<usize>> = vec![None; long_pts.len()];
    let mut j = 0;
    for (i, point) in short_pts.iter().enumerate() {
        let pos = point[pos_lane];
        while long_pts.len() - (j + 1) >= short_pts.len() - i
            && (long_pts[j + 1][pos_lane] - pos).abs() < (long_pts[j][pos_lane] - pos).abs()
        {
            j += 1;
        }
        match_of_long[j] = Some(i);
        j += 1;
    }

    let mut short_out = GeometryVec::new();
    let mut long_out = GeometryVec::new();
    let mut last_short: Option<usize> = None;
    for (j, point) in long_pts.iter().enumerate() {
        long_out.extend_from_slice(point);
        match match_of_long[j] {
            Some(i) => {
                short_out.extend_from_slice(short_pts[i]);
                last_short = Some(i);
            }
            None => {
                // Clone the short side's nearest real point; a fully empty
                // side borrows the peer so the animation stays local.
                let source = match last_short {
                    Some(i) => short_pts[i],
                    None => short_pts.first().copied().unwrap_or(*point),
                };
                let mut entry: GeometryVec = source.iter().copied().collect();
                entry[value_lane] = DUMMY_COORDINATE;
                short_out.extend(entry);
            }
        }
    }

    if old_is_short {
        (short_out, long_out)
    } else {
        (long_out, short_out)
    }
}

fn pad_at_tail(
    old: &[f64],
    new: &[f64],
    stride: usize,
    value_lane: usize,
) -> (GeometryVec, GeometryVec) {
    let mut old_out: GeometryVec = old.iter().copied().collect();
    let mut new_out: GeometryVec = new.iter().copied().collect();
    let (shorter, longer) = if old.len() < new.len() {
        (&mut old_out, new)
    } else {
        (&mut new_out, old)
    };
    while shorter.len() < longer.len() {
        let at = shorter.len();
        let mut entry: GeometryVec = if at >= stride {
            shorter[at - stride..at].iter().copied().collect()
        } else {
            longer[at..at + stride].iter().copied().collect()
        };
        entry[value_lane] = DUMMY_COORDINATE;
        shorter.extend(entry);
    }
    (old_out, new_out)
}
