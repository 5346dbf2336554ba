//! The tracking coordinator.
//!
//! A [`ScrollTracker`] owns both registries — roots keyed by container
//! identity, targets keyed by element identity — instead of hanging them off
//! module-global state, so independent tracker instances coexist without
//! shared mutable state. Identity is made idempotent through reserved marker
//! attributes written onto elements on first sight; the id counters live
//! here too.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::host::{Container, DomHost, DomNode};
use crate::track::root::{RootId, RootInner, ScrollRoot, ROOT_ID_ATTR};
use crate::track::target::{ScrollTarget, TargetId, TargetInner, TARGET_ID_ATTR};

/// The target registry, shared by the tracker and every root it creates.
///
/// Targets never reference roots or the registry back, so sharing this by
/// `Arc` forms no cycle.
pub(crate) struct TargetRegistry {
    host: Arc<dyn DomHost>,
    targets: RwLock<IndexMap<TargetId, Arc<TargetInner>>>,
    counter: AtomicU64,
}

impl TargetRegistry {
    fn new(host: Arc<dyn DomHost>) -> Self {
        Self {
            host,
            targets: RwLock::new(IndexMap::new()),
            counter: AtomicU64::new(0),
        }
    }

    /// Fetch the element's singleton target, allocating on first sight.
    ///
    /// Identity goes through the element's marker attribute, so repeated
    /// calls from unrelated call sites converge on one instance.
    pub(crate) fn get_or_add(&self, element: Arc<dyn DomNode>) -> Arc<TargetInner> {
        if let Some(attr) = element.marker(TARGET_ID_ATTR) {
            if let Ok(raw) = attr.parse::<u64>() {
                if let Some(existing) = self.targets.read().get(&TargetId::from(raw)) {
                    return Arc::clone(existing);
                }
            }
        }

        let id = TargetId::from(self.counter.fetch_add(1, Ordering::Relaxed) + 1);
        element.set_marker(TARGET_ID_ATTR, &id.raw().to_string());
        let target = Arc::new(TargetInner::new(id, element, Arc::clone(&self.host)));
        self.targets.write().insert(id, Arc::clone(&target));
        debug!(target_id = %id, "scroll target allocated");
        target
    }

    fn len(&self) -> usize {
        self.targets.read().len()
    }
}

/// Coordinator owning the root and target registries for one host.
///
/// Clones share the same registries.
#[derive(Clone)]
pub struct ScrollTracker {
    inner: Arc<TrackerInner>,
}

struct TrackerInner {
    host: Arc<dyn DomHost>,
    registry: Arc<TargetRegistry>,
    roots: RwLock<IndexMap<RootId, Arc<RootInner>>>,
    root_counter: AtomicU64,
}

impl ScrollTracker {
    /// Build a tracker over a host.
    pub fn new(host: Arc<dyn DomHost>) -> Self {
        let registry = Arc::new(TargetRegistry::new(Arc::clone(&host)));
        Self {
            inner: Arc::new(TrackerInner {
                host,
                registry,
                roots: RwLock::new(IndexMap::new()),
                root_counter: AtomicU64::new(0),
            }),
        }
    }

    /// Fetch the singleton root for a container, allocating on first sight.
    ///
    /// Window-equivalent containers (window, document, document element,
    /// body) all collapse to the one `window` root. First sight allocates
    /// the instance and attaches its passive scroll listener.
    pub fn root(&self, container: impl Into<Container>) -> ScrollRoot {
        let mut container = container.into();

        let id = if container.is_window_equivalent() {
            // Document, document element, and body all scroll the page
            // viewport; normalize so the listener lands on the window.
            container = Container::Window;
            RootId::Window
        } else {
            let Container::Node(node) = &container else {
                unreachable!("non-window container is always a node");
            };
            match existing_element_id(node) {
                Some(id) if self.inner.roots.read().contains_key(&id) => id,
                _ => {
                    let raw = self.inner.root_counter.fetch_add(1, Ordering::Relaxed) + 1;
                    node.set_marker(ROOT_ID_ATTR, &raw.to_string());
                    RootId::Element(raw)
                }
            }
        };

        if let Some(existing) = self.inner.roots.read().get(&id) {
            return ScrollRoot::from_inner(Arc::clone(existing));
        }

        let root = RootInner::create(
            id,
            container,
            Arc::clone(&self.inner.host),
            Arc::clone(&self.inner.registry),
        );
        self.inner.roots.write().insert(id, Arc::clone(&root));
        ScrollRoot::from_inner(root)
    }

    /// The root registered for `id`, if any.
    pub fn get_root(&self, id: RootId) -> Option<ScrollRoot> {
        self.inner
            .roots
            .read()
            .get(&id)
            .map(|inner| ScrollRoot::from_inner(Arc::clone(inner)))
    }

    /// Fetch the element's singleton target, allocating on first sight.
    ///
    /// Same identity-via-marker pattern as roots, under the target
    /// attribute namespace — an element can be both a root and a target
    /// without id collision.
    pub fn target(&self, element: Arc<dyn DomNode>) -> ScrollTarget {
        ScrollTarget::from_inner(self.inner.registry.get_or_add(element))
    }

    /// Number of registered roots.
    pub fn root_count(&self) -> usize {
        self.inner.roots.read().len()
    }

    /// Number of registered targets.
    pub fn target_count(&self) -> usize {
        self.inner.registry.len()
    }
}

fn existing_element_id(node: &Arc<dyn DomNode>) -> Option<RootId> {
    let raw = node.marker(ROOT_ID_ATTR)?.parse::<u64>().ok()?;
    Some(RootId::Element(raw))
}

impl fmt::Debug for ScrollTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollTracker")
            .field("roots", &self.root_count())
            .field("targets", &self.target_count())
            .finish()
    }
}
