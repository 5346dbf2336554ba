//! Scroll roots.
//!
//! A ScrollRoot is the per-container singleton that owns the scroll event
//! subscription, the cached container rect, and the sequence counter. It is
//! the sole producer of sequence numbers and rect snapshots: on every native
//! scroll event it bumps `seq`, snapshots its rect, and notifies every
//! attached target synchronously, in attachment order.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::PlacementError;
use crate::geometry::Rect;
use crate::host::{Container, DomHost, DomNode, Listener, Subscription};
use crate::track::target::{ScrollTarget, ScrollTick, TargetInner};
use crate::track::tracker::TargetRegistry;
use crate::viewport::ViewportSpec;

/// Marker attribute carrying an element root's registry id.
pub(crate) const ROOT_ID_ATTR: &str = "data-scroll-r-id";

/// Unique identifier for a scroll root.
///
/// The page viewport is the single sentinel `Window` identity — the window,
/// the document, the document element, and the body all collapse to it.
/// Element roots get incrementing counter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootId {
    Window,
    Element(u64),
}

impl fmt::Display for RootId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RootId::Window => f.write_str("window"),
            RootId::Element(id) => write!(f, "{id}"),
        }
    }
}

pub(crate) struct RootInner {
    id: RootId,
    container: Container,
    host: Arc<dyn DomHost>,
    registry: Arc<TargetRegistry>,
    /// Back-reference handed to host listeners, so a subscription outliving
    /// the registry cannot keep the root alive.
    weak_self: Weak<RootInner>,
    /// Attached targets, in attachment order. Shared with other roots, not
    /// owned.
    targets: RwLock<SmallVec<[Arc<TargetInner>; 4]>>,
    seq: AtomicU64,
    /// Cached container rect. Lazily filled on first access, recomputed on
    /// size-change notifications. Scrolling never invalidates it — scroll
    /// does not change a container's own size.
    rect: RwLock<Option<Rect>>,
    scroll_sub: Mutex<Option<Subscription>>,
    resize_sub: Mutex<Option<Subscription>>,
    destroyed: AtomicBool,
}

impl RootInner {
    /// Allocate a root and attach its scroll listener.
    pub(crate) fn create(
        id: RootId,
        container: Container,
        host: Arc<dyn DomHost>,
        registry: Arc<TargetRegistry>,
    ) -> Arc<Self> {
        let inner = Arc::new_cyclic(|weak_self| Self {
            id,
            container,
            host,
            registry,
            weak_self: Weak::clone(weak_self),
            targets: RwLock::new(SmallVec::new()),
            seq: AtomicU64::new(0),
            rect: RwLock::new(None),
            scroll_sub: Mutex::new(None),
            resize_sub: Mutex::new(None),
            destroyed: AtomicBool::new(false),
        });

        let weak = Weak::clone(&inner.weak_self);
        let listener: Listener = Arc::new(move || {
            if let Some(root) = weak.upgrade() {
                root.handle_scroll();
            }
        });
        let sub = inner.host.on_scroll(&inner.container, listener);
        *inner.scroll_sub.lock() = Some(sub);

        debug!(root_id = %inner.id, "scroll root allocated");
        inner
    }

    fn query_rect(&self) -> Rect {
        match &self.container {
            Container::Window => self.host.viewport_rect(),
            Container::Node(node) => node.bounding_rect(),
        }
    }

    /// Cached rect, computed on first access. The first access also hooks
    /// the size-change stream that keeps the cache fresh: the fine-grained
    /// observer when the host has one, the coarse page-resize signal
    /// otherwise.
    pub(crate) fn rect(&self) -> Rect {
        if let Some(rect) = *self.rect.read() {
            return rect;
        }
        let rect = self.query_rect();
        *self.rect.write() = Some(rect);
        self.ensure_resize_subscription();
        rect
    }

    fn ensure_resize_subscription(&self) {
        let mut slot = self.resize_sub.lock();
        if slot.is_some() || self.destroyed.load(Ordering::SeqCst) {
            return;
        }

        let weak = Weak::clone(&self.weak_self);
        let listener: Listener = Arc::new(move || {
            if let Some(root) = weak.upgrade() {
                let fresh = root.query_rect();
                *root.rect.write() = Some(fresh);
                trace!(root_id = %root.id, "root rect recomputed on size change");
            }
        });
        let sub = match &self.container {
            Container::Node(node) => self
                .host
                .observe_size(node, Arc::clone(&listener))
                .unwrap_or_else(|| self.host.on_page_resize(listener)),
            Container::Window => self.host.on_page_resize(listener),
        };
        *slot = Some(sub);
    }

    /// One scroll tick: bump `seq`, snapshot the rect, fan out.
    pub(crate) fn handle_scroll(&self) {
        if self.destroyed.load(Ordering::SeqCst) {
            return;
        }
        let rect = self.rect();
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        // Snapshot the attachment list so no lock is held while targets
        // run (and possibly re-enter the tracker from a callback).
        let targets: SmallVec<[Arc<TargetInner>; 4]> =
            self.targets.read().iter().cloned().collect();
        trace!(root_id = %self.id, seq, targets = targets.len(), "scroll tick");
        for target in &targets {
            target.on_scroll(ScrollTick {
                root_id: self.id,
                root_rect: rect,
                seq,
            });
        }
    }

    fn attach(&self, target: &Arc<TargetInner>) {
        let mut targets = self.targets.write();
        if !targets.iter().any(|t| t.id() == target.id()) {
            targets.push(Arc::clone(target));
        }
    }

    fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(sub) = self.scroll_sub.lock().take() {
            sub.unsubscribe();
        }
        if let Some(sub) = self.resize_sub.lock().take() {
            sub.unsubscribe();
        }
        debug!(root_id = %self.id, "scroll root destroyed");
    }
}

/// Handle to a scroll root. Clones share the same underlying state.
#[derive(Clone)]
pub struct ScrollRoot {
    inner: Arc<RootInner>,
}

impl ScrollRoot {
    pub(crate) fn from_inner(inner: Arc<RootInner>) -> Self {
        Self { inner }
    }

    /// The root's registry id (`window` or a counter value).
    pub fn id(&self) -> RootId {
        self.inner.id
    }

    /// The container's cached rect.
    pub fn rect(&self) -> Rect {
        self.inner.rect()
    }

    /// Register a trigger zone for `element` against this root.
    ///
    /// Fetches (or creates) the element's singleton target, appends the
    /// resolved viewport to it, and attaches the target to this root. The
    /// registry side is idempotent; the viewport side appends on every call
    /// — multiple zones per element-root pair are the point.
    pub fn add_element(
        &self,
        element: Arc<dyn DomNode>,
        spec: ViewportSpec,
    ) -> Result<ScrollTarget, PlacementError> {
        let target = self.inner.registry.get_or_add(element);
        target.add_viewport(spec)?;
        self.inner.attach(&target);
        Ok(ScrollTarget::from_inner(target))
    }

    /// Number of targets attached to this root.
    pub fn target_count(&self) -> usize {
        self.inner.targets.read().len()
    }

    /// Deliver one scroll tick, as the native listener would.
    ///
    /// Exposed so hosts and tests can drive a root directly; after
    /// [`ScrollRoot::destroy`] this is a no-op.
    pub fn on_scroll(&self) {
        self.inner.handle_scroll()
    }

    /// Release the scroll listener and the size-change subscription.
    ///
    /// Idempotent: repeated calls are no-ops, and scroll notifications
    /// delivered afterwards notify zero targets. Attached targets and their
    /// state are left in place.
    pub fn destroy(&self) {
        self.inner.destroy()
    }
}

impl PartialEq for ScrollRoot {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ScrollRoot {}

impl fmt::Debug for ScrollRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollRoot")
            .field("id", &self.inner.id)
            .field("targets", &self.target_count())
            .finish()
    }
}
