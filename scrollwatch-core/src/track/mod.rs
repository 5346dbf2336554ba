//! Scroll tracking: registries, roots, and targets.
//!
//! The flow on every native scroll event:
//!
//! 1. The root bumps its sequence counter and snapshots its cached rect.
//! 2. It notifies every attached target synchronously, in attachment order,
//!    with the identical `{root_rect, seq}` payload.
//! 3. Each target deduplicates by `(root, seq)`, snapshots its own rect
//!    once, and defers a batched viewport evaluation to the host's
//!    next-frame queue.
//! 4. On that frame, each viewport's thresholds classify the target's
//!    offset and fire transition callbacks, edge-triggered.

mod root;
mod target;
mod tracker;

pub use root::{RootId, ScrollRoot};
pub use target::{ScrollTarget, ScrollTick, TargetId};
pub use tracker::ScrollTracker;
