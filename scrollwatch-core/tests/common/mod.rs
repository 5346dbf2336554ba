//! In-memory host used by the integration tests.
//!
//! Implements the core's host traits over plain shared state: scroll events
//! fire on demand, the next-frame queue drains when the test says so, and
//! size-change signals come from either a per-element observer or the
//! coarse page-resize stream depending on how the host was built.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use scrollwatch_core::{Container, ContainerKind, DomHost, DomNode, FrameTask, Listener, Rect, Subscription};

/// Identity key for containers: the window, or one node's allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerKey {
    Window,
    Node(usize),
}

fn container_key(container: &Container) -> ContainerKey {
    match container {
        Container::Window => ContainerKey::Window,
        Container::Node(node) => ContainerKey::Node(Arc::as_ptr(node) as *const () as usize),
    }
}

fn node_key(node: &Arc<dyn DomNode>) -> usize {
    Arc::as_ptr(node) as *const () as usize
}

struct Registration {
    key: ContainerKey,
    listener: Listener,
    active: Arc<AtomicBool>,
}

pub struct MockHost {
    viewport: RwLock<Rect>,
    scroll_listeners: Mutex<Vec<Registration>>,
    resize_listeners: Mutex<Vec<(Listener, Arc<AtomicBool>)>>,
    size_observers: Mutex<Vec<(usize, Listener, Arc<AtomicBool>)>>,
    frames: Mutex<Vec<FrameTask>>,
    has_size_observer: bool,
}

impl MockHost {
    fn build(has_size_observer: bool) -> Arc<Self> {
        Arc::new(Self {
            viewport: RwLock::new(Rect::new(0.0, 0.0, 800.0, 1000.0)),
            scroll_listeners: Mutex::new(Vec::new()),
            resize_listeners: Mutex::new(Vec::new()),
            size_observers: Mutex::new(Vec::new()),
            frames: Mutex::new(Vec::new()),
            has_size_observer,
        })
    }

    /// Host with only the coarse page-resize signal.
    pub fn new() -> Arc<Self> {
        Self::build(false)
    }

    /// Host that also offers the fine-grained per-element size observer.
    pub fn with_size_observer() -> Arc<Self> {
        Self::build(true)
    }

    /// Fire a native scroll event on the given container.
    pub fn scroll(&self, container: &Container) {
        let listeners: Vec<Listener> = self
            .scroll_listeners
            .lock()
            .iter()
            .filter(|reg| reg.key == container_key(container) && reg.active.load(Ordering::SeqCst))
            .map(|reg| Arc::clone(&reg.listener))
            .collect();
        for listener in listeners {
            listener();
        }
    }

    /// Fire a native scroll event on the page viewport.
    pub fn scroll_window(&self) {
        self.scroll(&Container::Window);
    }

    /// Drain the next-frame queue, running every scheduled task once.
    pub fn run_frames(&self) -> usize {
        let tasks: Vec<FrameTask> = self.frames.lock().drain(..).collect();
        let count = tasks.len();
        for task in tasks {
            task();
        }
        count
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.lock().len()
    }

    /// Fire the coarse page-resize signal.
    pub fn resize(&self) {
        let listeners: Vec<Listener> = self
            .resize_listeners
            .lock()
            .iter()
            .filter(|(_, active)| active.load(Ordering::SeqCst))
            .map(|(listener, _)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener();
        }
    }

    /// Fire every active per-element size observer.
    pub fn fire_size_observers(&self) {
        let listeners: Vec<Listener> = self
            .size_observers
            .lock()
            .iter()
            .filter(|(_, _, active)| active.load(Ordering::SeqCst))
            .map(|(_, listener, _)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener();
        }
    }

    /// Number of scroll registrations that have not been unsubscribed.
    pub fn active_scroll_listeners(&self) -> usize {
        self.scroll_listeners
            .lock()
            .iter()
            .filter(|reg| reg.active.load(Ordering::SeqCst))
            .count()
    }

    pub fn active_resize_listeners(&self) -> usize {
        self.resize_listeners
            .lock()
            .iter()
            .filter(|(_, active)| active.load(Ordering::SeqCst))
            .count()
    }
}

impl DomHost for MockHost {
    fn viewport_rect(&self) -> Rect {
        *self.viewport.read()
    }

    fn on_scroll(&self, container: &Container, listener: Listener) -> Subscription {
        let active = Arc::new(AtomicBool::new(true));
        self.scroll_listeners.lock().push(Registration {
            key: container_key(container),
            listener,
            active: Arc::clone(&active),
        });
        Subscription::new(move || active.store(false, Ordering::SeqCst))
    }

    fn observe_size(&self, node: &Arc<dyn DomNode>, listener: Listener) -> Option<Subscription> {
        if !self.has_size_observer {
            return None;
        }
        let active = Arc::new(AtomicBool::new(true));
        self.size_observers
            .lock()
            .push((node_key(node), listener, Arc::clone(&active)));
        Some(Subscription::new(move || active.store(false, Ordering::SeqCst)))
    }

    fn on_page_resize(&self, listener: Listener) -> Subscription {
        let active = Arc::new(AtomicBool::new(true));
        self.resize_listeners
            .lock()
            .push((listener, Arc::clone(&active)));
        Subscription::new(move || active.store(false, Ordering::SeqCst))
    }

    fn request_frame(&self, task: FrameTask) {
        self.frames.lock().push(task);
    }
}

/// An in-memory element: attributes, a settable rect, and a query counter.
pub struct MockNode {
    kind: ContainerKind,
    attrs: Mutex<HashMap<String, String>>,
    rect: RwLock<Rect>,
    rect_queries: AtomicUsize,
}

impl MockNode {
    pub fn element(rect: Rect) -> Arc<Self> {
        Self::with_kind(ContainerKind::Element, rect)
    }

    pub fn with_kind(kind: ContainerKind, rect: Rect) -> Arc<Self> {
        Arc::new(Self {
            kind,
            attrs: Mutex::new(HashMap::new()),
            rect: RwLock::new(rect),
            rect_queries: AtomicUsize::new(0),
        })
    }

    /// Move/resize the element, as layout would.
    pub fn set_rect(&self, rect: Rect) {
        *self.rect.write() = rect;
    }

    /// How many times the core asked for this element's bounding rect.
    pub fn rect_queries(&self) -> usize {
        self.rect_queries.load(Ordering::SeqCst)
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        self.attrs.lock().get(name).cloned()
    }

    /// Upcast helper: the core's APIs take `Arc<dyn DomNode>`.
    pub fn as_dom(self: &Arc<Self>) -> Arc<dyn DomNode> {
        Arc::clone(self) as Arc<dyn DomNode>
    }
}

impl DomNode for MockNode {
    fn container_kind(&self) -> ContainerKind {
        self.kind
    }

    fn marker(&self, attr: &str) -> Option<String> {
        self.attrs.lock().get(attr).cloned()
    }

    fn set_marker(&self, attr: &str, value: &str) {
        self.attrs.lock().insert(attr.to_owned(), value.to_owned());
    }

    fn bounding_rect(&self) -> Rect {
        self.rect_queries.fetch_add(1, Ordering::SeqCst);
        *self.rect.read()
    }
}
