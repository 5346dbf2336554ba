//! Scroll targets.
//!
//! A ScrollTarget is the per-element singleton holding the element's
//! registered viewports and its dedup state. Targets are shared, not owned:
//! the same target may be attached to several roots, and each root notifies
//! it synchronously on every scroll tick.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use smallvec::SmallVec;
use tracing::trace;

use crate::error::PlacementError;
use crate::geometry::Rect;
use crate::host::{DomHost, DomNode};
use crate::track::root::RootId;
use crate::viewport::{CalculatedViewport, EvalContext, Viewport, ViewportSpec};

/// Marker attribute carrying a target's registry id.
///
/// Distinct from the root namespace so one element can be a root for its
/// descendants and a target of an ancestor root at the same time.
pub(crate) const TARGET_ID_ATTR: &str = "data-scroll-t-id";

/// Unique identifier for a scroll target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId(u64);

impl TargetId {
    /// Get the raw id value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl From<u64> for TargetId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One scroll notification, as fanned out by a root.
///
/// Every target attached to the same root in the same tick receives an
/// identical `root_rect` value and a strictly increasing `seq`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollTick {
    pub root_id: RootId,
    pub root_rect: Rect,
    pub seq: u64,
}

pub(crate) struct TargetInner {
    id: TargetId,
    element: Arc<dyn DomNode>,
    host: Arc<dyn DomHost>,
    /// Most recent `(root, seq)` pair processed. A root notifies each
    /// attached target once per tick, so a single slot deduplicates
    /// redelivery without colliding across roots' independent counters.
    last_tick: Mutex<Option<(RootId, u64)>>,
    viewports: RwLock<SmallVec<[Arc<Viewport>; 2]>>,
}

impl TargetInner {
    pub(crate) fn new(id: TargetId, element: Arc<dyn DomNode>, host: Arc<dyn DomHost>) -> Self {
        Self {
            id,
            element,
            host,
            last_tick: Mutex::new(None),
            viewports: RwLock::new(SmallVec::new()),
        }
    }

    pub(crate) fn id(&self) -> TargetId {
        self.id
    }

    pub(crate) fn element(&self) -> &Arc<dyn DomNode> {
        &self.element
    }

    pub(crate) fn add_viewport(&self, spec: ViewportSpec) -> Result<(), PlacementError> {
        let viewport = Viewport::resolve(spec)?;
        self.viewports.write().push(Arc::new(viewport));
        Ok(())
    }

    pub(crate) fn viewport_count(&self) -> usize {
        self.viewports.read().len()
    }

    /// Process one scroll notification.
    ///
    /// Dedup gate first: a tick already processed returns immediately with
    /// no geometry read and no scheduling. A surviving tick snapshots the
    /// target's rect once and defers evaluation of the currently registered
    /// viewports to the host's next-frame queue. Viewports added while that
    /// batch is in flight are absent from it and picked up next tick.
    pub(crate) fn on_scroll(&self, tick: ScrollTick) {
        {
            let mut last = self.last_tick.lock();
            if *last == Some((tick.root_id, tick.seq)) {
                trace!(target_id = %self.id, root_id = %tick.root_id, seq = tick.seq,
                    "duplicate scroll tick suppressed");
                return;
            }
            *last = Some((tick.root_id, tick.seq));
        }

        let target_rect = self.element.bounding_rect();
        let batch: Vec<(Arc<Viewport>, CalculatedViewport)> = self
            .viewports
            .read()
            .iter()
            .map(|viewport| {
                (
                    Arc::clone(viewport),
                    viewport.calculate(&tick.root_rect, &target_rect),
                )
            })
            .collect();
        if batch.is_empty() {
            return;
        }

        let ctx = EvalContext {
            offset: target_rect.top - tick.root_rect.top,
            root_rect: tick.root_rect,
            target_rect,
            seq: tick.seq,
            target: Arc::clone(&self.element),
        };
        trace!(target_id = %self.id, seq = tick.seq, viewports = batch.len(),
            "deferring viewport batch to next frame");
        self.host.request_frame(Box::new(move || {
            for (viewport, calc) in batch {
                viewport.evaluate(calc, &ctx);
            }
        }));
    }
}

/// Handle to a scroll target. Clones share the same underlying state.
#[derive(Clone)]
pub struct ScrollTarget {
    inner: Arc<TargetInner>,
}

impl ScrollTarget {
    pub(crate) fn from_inner(inner: Arc<TargetInner>) -> Self {
        Self { inner }
    }

    /// The target's registry id.
    pub fn id(&self) -> TargetId {
        self.inner.id
    }

    /// The tracked element.
    pub fn element(&self) -> &Arc<dyn DomNode> {
        self.inner.element()
    }

    /// The element's current bounding rect (fresh host query, not cached —
    /// scrolling moves a target, unlike a root).
    pub fn rect(&self) -> Rect {
        self.inner.element.bounding_rect()
    }

    /// Register another trigger zone on this target.
    ///
    /// Placements resolve exactly once, here; malformed shorthand fails now
    /// rather than producing thresholds that never trigger.
    pub fn add_viewport(&self, spec: ViewportSpec) -> Result<(), PlacementError> {
        self.inner.add_viewport(spec)
    }

    /// Number of registered viewports.
    pub fn viewport_count(&self) -> usize {
        self.inner.viewport_count()
    }

    /// Deliver one scroll notification.
    ///
    /// Normally invoked by the owning root's fan-out; exposed so hosts and
    /// tests can drive a target directly.
    pub fn on_scroll(&self, tick: ScrollTick) {
        self.inner.on_scroll(tick)
    }
}

impl PartialEq for ScrollTarget {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ScrollTarget {}

impl fmt::Debug for ScrollTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollTarget")
            .field("id", &self.inner.id)
            .field("viewports", &self.viewport_count())
            .finish()
    }
}
