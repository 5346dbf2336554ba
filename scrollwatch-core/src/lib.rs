//! Scrollwatch Core
//!
//! This crate provides the core runtime for the scrollwatch viewport
//! tracking library. It implements:
//!
//! - Per-container scroll roots with monotonic sequencing and cached
//!   geometry
//! - Per-element scroll targets with idempotent identity and deduplicated
//!   notification handling
//! - Placement resolution (shorthand expressions to canonical triples)
//! - Edge-triggered Before/During/After trigger zones with deferred,
//!   render-aligned batch evaluation
//!
//! The crate is host-agnostic: everything it needs from a document — rect
//! queries, marker attributes, scroll/resize subscriptions, next-frame
//! scheduling — goes through the traits in [`host`].
//!
//! # Architecture
//!
//! - `geometry`: the [`Rect`] value type
//! - `placement`: shorthand parsing and the canonical placement triple
//! - `host`: the embedder-facing service traits
//! - `viewport`: trigger zones and the three-state classifier
//! - `track`: roots, targets, and the registry-owning coordinator
//!
//! # Example
//!
//! ```rust,ignore
//! use scrollwatch_core::{Container, ScrollTracker, ViewportSpec};
//!
//! let tracker = ScrollTracker::new(host);
//! let root = tracker.root(Container::Window);
//!
//! root.add_element(
//!     banner,
//!     ViewportSpec::new("bottom", "top - 25%target")
//!         .on_during(|event| println!("banner entered at seq {}", event.seq))
//!         .on_after(|_| println!("banner gone")),
//! )?;
//! // Every native scroll event now drives the banner's trigger zone.
//! ```

pub mod error;
pub mod geometry;
pub mod host;
pub mod placement;
pub mod track;
pub mod viewport;

pub use error::PlacementError;
pub use geometry::Rect;
pub use host::{Container, ContainerKind, DomHost, DomNode, FrameTask, Listener, Subscription};
pub use placement::{Placement, PlacementSpec};
pub use track::{RootId, ScrollRoot, ScrollTarget, ScrollTick, ScrollTracker, TargetId};
pub use viewport::{Handler, TriggerState, ViewportSpec, ZoneEvent};
