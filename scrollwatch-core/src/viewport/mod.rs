//! Viewport trigger zones.
//!
//! A viewport is a `[start, end]` pair of placements plus the callbacks to
//! fire as the target moves through the zone. It progresses through three
//! representations: the user-supplied [`ViewportSpec`] (shorthand allowed),
//! the resolved [`Viewport`] owned by one target (placements canonical,
//! trigger state attached), and the per-tick [`CalculatedViewport`]
//! (thresholds reduced to absolute numbers against one rect snapshot pair).

mod state;

pub use state::{classify, TriggerState, TriggerZone};

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use crate::error::PlacementError;
use crate::geometry::Rect;
use crate::host::DomNode;
use crate::placement::{Placement, PlacementSpec};

/// Callback invoked when a viewport's trigger state changes.
pub type Handler = Arc<dyn Fn(&ZoneEvent) + Send + Sync>;

/// Everything a callback gets to see about the crossing.
pub struct ZoneEvent {
    /// The state just entered (or re-asserted under `force_boundary`).
    pub state: TriggerState,
    /// Absolute start threshold for this tick.
    pub start: f64,
    /// Absolute end threshold for this tick.
    pub end: f64,
    /// The target's top edge relative to the root's top edge.
    pub offset: f64,
    /// Root rect snapshot shared by every target in this tick's fan-out.
    pub root_rect: Rect,
    /// Target rect snapshot taken once for this tick's batch.
    pub target_rect: Rect,
    /// The root's sequence number for this tick.
    pub seq: u64,
    /// The tracked element.
    pub target: Arc<dyn DomNode>,
}

/// User-facing viewport configuration.
///
/// Built with [`ViewportSpec::new`] and chained setters:
///
/// ```ignore
/// ViewportSpec::new("bottom", "top - 25%target")
///     .force_boundary(true)
///     .on_during(|event| println!("entered at seq {}", event.seq))
/// ```
pub struct ViewportSpec {
    start: PlacementSpec,
    end: PlacementSpec,
    force_boundary: bool,
    on_before: Option<Handler>,
    on_during: Option<Handler>,
    on_after: Option<Handler>,
}

impl ViewportSpec {
    /// A zone spanning the two placements, with no callbacks yet.
    pub fn new(start: impl Into<PlacementSpec>, end: impl Into<PlacementSpec>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            force_boundary: false,
            on_before: None,
            on_during: None,
            on_after: None,
        }
    }

    /// Re-fire the current state's callback whenever the offset sits
    /// exactly on a threshold, not only on crossings.
    pub fn force_boundary(mut self, force: bool) -> Self {
        self.force_boundary = force;
        self
    }

    /// Callback for entering [`TriggerState::Before`].
    pub fn on_before<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ZoneEvent) + Send + Sync + 'static,
    {
        self.on_before = Some(Arc::new(handler));
        self
    }

    /// Callback for entering [`TriggerState::During`].
    pub fn on_during<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ZoneEvent) + Send + Sync + 'static,
    {
        self.on_during = Some(Arc::new(handler));
        self
    }

    /// Callback for entering [`TriggerState::After`].
    pub fn on_after<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ZoneEvent) + Send + Sync + 'static,
    {
        self.on_after = Some(Arc::new(handler));
        self
    }
}

/// A viewport's thresholds reduced to absolute offsets for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalculatedViewport {
    pub start: f64,
    pub end: f64,
}

/// Shared per-batch context: one rect snapshot pair, one offset, one seq.
pub(crate) struct EvalContext {
    pub offset: f64,
    pub root_rect: Rect,
    pub target_rect: Rect,
    pub seq: u64,
    pub target: Arc<dyn DomNode>,
}

/// A resolved viewport owned by exactly one target.
///
/// Placements are immutable once resolved; the only mutable piece is the
/// trigger state used for edge-triggering.
pub struct Viewport {
    start: Placement,
    end: Placement,
    force_boundary: bool,
    on_before: Option<Handler>,
    on_during: Option<Handler>,
    on_after: Option<Handler>,
    zone: Mutex<TriggerZone>,
}

impl Viewport {
    /// Normalize a spec's placements exactly once.
    pub(crate) fn resolve(spec: ViewportSpec) -> Result<Self, PlacementError> {
        Ok(Self {
            start: spec.start.resolve()?,
            end: spec.end.resolve()?,
            force_boundary: spec.force_boundary,
            on_before: spec.on_before,
            on_during: spec.on_during,
            on_after: spec.on_after,
            zone: Mutex::new(TriggerZone::new()),
        })
    }

    /// The resolved start placement.
    pub fn start(&self) -> Placement {
        self.start
    }

    /// The resolved end placement.
    pub fn end(&self) -> Placement {
        self.end
    }

    /// Reduce both placements to absolute thresholds against one rect
    /// snapshot pair. Heights scale the fractions: this tracks vertical
    /// scrolling only.
    pub(crate) fn calculate(&self, root_rect: &Rect, target_rect: &Rect) -> CalculatedViewport {
        CalculatedViewport {
            start: self.start.resolve(root_rect.height, target_rect.height),
            end: self.end.resolve(root_rect.height, target_rect.height),
        }
    }

    /// Advance the trigger state for one tick and dispatch the due callback.
    ///
    /// The state lock is released before the callback runs, so a callback
    /// that re-enters the tracker (forcing a rescroll) sees consistent
    /// state and cannot deadlock. A panicking callback is logged and
    /// swallowed; it never aborts the rest of the batch.
    pub(crate) fn evaluate(&self, calc: CalculatedViewport, ctx: &EvalContext) {
        let fired = self
            .zone
            .lock()
            .step(ctx.offset, calc.start, calc.end, self.force_boundary);

        let Some(state) = fired else { return };
        let handler = match state {
            TriggerState::Before => self.on_before.as_ref(),
            TriggerState::During => self.on_during.as_ref(),
            TriggerState::After => self.on_after.as_ref(),
        };
        let Some(handler) = handler else { return };

        let event = ZoneEvent {
            state,
            start: calc.start,
            end: calc.end,
            offset: ctx.offset,
            root_rect: ctx.root_rect,
            target_rect: ctx.target_rect,
            seq: ctx.seq,
            target: Arc::clone(&ctx.target),
        };
        if panic::catch_unwind(AssertUnwindSafe(|| handler(&event))).is_err() {
            warn!(seq = ctx.seq, state = ?state, "viewport callback panicked; batch continues");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ContainerKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct BareNode;

    impl DomNode for BareNode {
        fn container_kind(&self) -> ContainerKind {
            ContainerKind::Element
        }
        fn marker(&self, _attr: &str) -> Option<String> {
            None
        }
        fn set_marker(&self, _attr: &str, _value: &str) {}
        fn bounding_rect(&self) -> Rect {
            Rect::default()
        }
    }

    fn context(offset: f64) -> EvalContext {
        EvalContext {
            offset,
            root_rect: Rect::new(0.0, 0.0, 800.0, 1000.0),
            target_rect: Rect::new(offset, 0.0, 100.0, 200.0),
            seq: 1,
            target: Arc::new(BareNode),
        }
    }

    #[test]
    fn calculate_reduces_placements_against_heights() {
        let viewport = Viewport::resolve(ViewportSpec::new(
            Placement {
                percent: 0.5,
                distance: 10.0,
                target_percent: 0.25,
            },
            0.0,
        ))
        .unwrap();

        let calc = viewport.calculate(
            &Rect::new(0.0, 0.0, 800.0, 1000.0),
            &Rect::new(0.0, 0.0, 100.0, 200.0),
        );
        assert_eq!(calc.start, 560.0);
        assert_eq!(calc.end, 0.0);
    }

    #[test]
    fn resolve_rejects_malformed_shorthand() {
        assert!(Viewport::resolve(ViewportSpec::new("10meters", 0.0)).is_err());
        assert!(Viewport::resolve(ViewportSpec::new(0.0, "")).is_err());
    }

    #[test]
    fn evaluate_dispatches_the_entered_state_only() {
        let befores = Arc::new(AtomicUsize::new(0));
        let afters = Arc::new(AtomicUsize::new(0));
        let befores_clone = befores.clone();
        let afters_clone = afters.clone();

        let viewport = Viewport::resolve(
            ViewportSpec::new(Placement::px(800.0), Placement::px(200.0))
                .on_before(move |_| {
                    befores_clone.fetch_add(1, Ordering::SeqCst);
                })
                .on_after(move |_| {
                    afters_clone.fetch_add(1, Ordering::SeqCst);
                }),
        )
        .unwrap();

        let calc = CalculatedViewport {
            start: 800.0,
            end: 200.0,
        };
        viewport.evaluate(calc, &context(900.0));
        viewport.evaluate(calc, &context(100.0));
        viewport.evaluate(calc, &context(50.0));

        assert_eq!(befores.load(Ordering::SeqCst), 1);
        assert_eq!(afters.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn panicking_callback_is_contained() {
        let viewport = Viewport::resolve(
            ViewportSpec::new(Placement::px(800.0), Placement::px(200.0))
                .on_before(|_| panic!("callback blew up")),
        )
        .unwrap();

        let calc = CalculatedViewport {
            start: 800.0,
            end: 200.0,
        };
        // Must not propagate.
        viewport.evaluate(calc, &context(900.0));
    }
}
