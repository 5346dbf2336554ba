//! Geometry value types.
//!
//! A [`Rect`] is the only geometry the core ever sees: the observable shape
//! of a bounding-box query against the host. Rects are plain immutable
//! values — the tracking layer never mutates one in place, it replaces the
//! whole snapshot whenever the host reports new geometry.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle, positioned by its top-left corner.
///
/// `top` and `left` are distances from the host's coordinate origin (for a
/// browser host, the viewport origin — which is why scrolling moves a
/// target's rect while leaving the root's own rect untouched). `width` and
/// `height` are non-negative extents.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a rect from its top-left corner and extents.
    ///
    /// Negative extents are clamped to zero; a host reporting a collapsed
    /// box yields an empty rect rather than an inverted one.
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Bottom edge (`top + height`).
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Right edge (`left + width`).
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Whether the rect encloses no area.
    pub fn is_empty(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }
}
