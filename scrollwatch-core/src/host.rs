//! Host abstraction.
//!
//! The core never touches a real document. Everything it needs from the
//! embedder — bounding-rect queries, marker attributes for stable identity,
//! scroll and size-change subscriptions, and render-aligned task scheduling —
//! goes through the two traits in this module. A browser host backs them
//! with the DOM; tests back them with an in-memory mock.
//!
//! # Capabilities required of the host
//!
//! - Read/write a reserved marker attribute on an element. This is how the
//!   registries make `getOrAdd` idempotent across unrelated call sites.
//! - Report each element's bounding rectangle relative to the viewport
//!   origin, and the viewport's own rectangle.
//! - Deliver scroll events per container. Listeners are expected to be
//!   registered passive and non-capturing.
//! - Deliver size-change notifications: a fine-grained per-element observer
//!   when available, and a coarse page-resize signal always. A host without
//!   the fine-grained observer degrades to the coarse signal; registration
//!   never fails over it.
//! - Run a one-shot task after the current scroll handler returns and
//!   before the next paint.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::geometry::Rect;

/// What role a node plays as a scroll container.
///
/// The window, the document, the document's root element, and the body all
/// denote the page viewport to a caller, so the root registry collapses them
/// into one root. Plain elements scroll on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Window,
    Document,
    DocumentElement,
    Body,
    Element,
}

/// Handle to a host element.
///
/// The core holds these non-owning: element lifetime is governed by the host
/// document, not by the registries.
pub trait DomNode: Send + Sync {
    /// Which container role this node plays. Plain elements return
    /// [`ContainerKind::Element`].
    fn container_kind(&self) -> ContainerKind;

    /// Read a marker attribute previously written with [`DomNode::set_marker`].
    fn marker(&self, attr: &str) -> Option<String>;

    /// Write a marker attribute onto the node.
    fn set_marker(&self, attr: &str, value: &str);

    /// The node's current bounding rectangle, relative to the viewport
    /// origin.
    fn bounding_rect(&self) -> Rect;
}

/// A scroll container: the page viewport, or a host element.
#[derive(Clone)]
pub enum Container {
    /// The page viewport.
    Window,
    /// A scrollable host element (or a window-equivalent node such as the
    /// document or body, which the root registry folds into `Window`).
    Node(Arc<dyn DomNode>),
}

impl Container {
    /// Whether this container denotes the page viewport.
    ///
    /// True for [`Container::Window`] and for nodes whose kind is window,
    /// document, document element, or body.
    pub fn is_window_equivalent(&self) -> bool {
        match self {
            Container::Window => true,
            Container::Node(node) => !matches!(node.container_kind(), ContainerKind::Element),
        }
    }
}

impl From<Arc<dyn DomNode>> for Container {
    fn from(node: Arc<dyn DomNode>) -> Self {
        Container::Node(node)
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Container::Window => f.write_str("Container::Window"),
            Container::Node(node) => f
                .debug_tuple("Container::Node")
                .field(&node.container_kind())
                .finish(),
        }
    }
}

/// Notification callback shared with the host.
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// One-shot task scheduled onto the host's next-frame queue.
pub type FrameTask = Box<dyn FnOnce() + Send>;

/// The embedder-facing service surface.
pub trait DomHost: Send + Sync {
    /// Rectangle of the page viewport.
    fn viewport_rect(&self) -> Rect;

    /// Subscribe to scroll events on a container.
    ///
    /// The listener should be registered passive and non-capturing; it must
    /// run fast and never block.
    fn on_scroll(&self, container: &Container, listener: Listener) -> Subscription;

    /// Subscribe to size changes of a single element.
    ///
    /// Hosts without a fine-grained observer return `None`; callers fall
    /// back to [`DomHost::on_page_resize`].
    fn observe_size(&self, node: &Arc<dyn DomNode>, listener: Listener) -> Option<Subscription> {
        let _ = (node, listener);
        None
    }

    /// Subscribe to the coarse page-resize signal.
    fn on_page_resize(&self, listener: Listener) -> Subscription;

    /// Schedule a one-shot task to run after the current scroll handler
    /// returns and before the next paint.
    fn request_frame(&self, task: FrameTask);
}

/// Handle to an active listener registration.
///
/// Unsubscribing is idempotent: the cancel action runs at most once, and
/// further calls are no-ops.
pub struct Subscription {
    cancel: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl Subscription {
    /// Wrap a cancel action supplied by the host.
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            cancel: Mutex::new(Some(Box::new(cancel))),
        }
    }

    /// Release the underlying registration.
    pub fn unsubscribe(&self) {
        if let Some(cancel) = self.cancel.lock().take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.lock().is_some())
            .finish()
    }
}
