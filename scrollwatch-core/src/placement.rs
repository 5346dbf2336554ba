//! Placement resolution.
//!
//! A placement names a horizontal line inside a scroll root, expressed as a
//! combination of three components: a fraction of the root's extent, an
//! absolute pixel offset, and a fraction of the target's extent. Shorthand
//! input (a bare fraction, a percentage string, a pixel literal, or a
//! combined expression) is normalized into the canonical [`Placement`]
//! triple exactly once at registration — the per-tick path only ever
//! multiplies and adds.
//!
//! # Shorthand grammar
//!
//! An expression is a sequence of signed terms joined by `+`/`-` (plain
//! whitespace between terms implies `+`):
//!
//! - `0.5` — bare number, fraction of the root extent
//! - `50%` — percentage of the root extent
//! - `10px` — absolute pixel offset
//! - `0.25target` — fraction of the target extent
//! - `25%target` — percentage of the target extent
//! - `top` / `middle` / `bottom` — 0%, 50%, 100% of the root extent
//!
//! Example: `"bottom - 10px + 25%target"`.

use serde::{Deserialize, Serialize};

use crate::error::PlacementError;

/// A resolved placement: the canonical `(percent, distance, target_percent)`
/// triple. Immutable once resolved.
///
/// The absolute threshold it denotes is
/// `root_extent * percent + distance + target_extent * target_percent`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Placement {
    /// Fraction of the root's extent.
    pub percent: f64,
    /// Absolute pixel offset.
    pub distance: f64,
    /// Fraction of the target's extent.
    pub target_percent: f64,
}

impl Placement {
    /// A placement at the root's origin with no offsets.
    pub const ZERO: Placement = Placement {
        percent: 0.0,
        distance: 0.0,
        target_percent: 0.0,
    };

    /// Placement at a fraction of the root's extent.
    pub fn root_fraction(fraction: f64) -> Self {
        Placement {
            percent: fraction,
            ..Placement::ZERO
        }
    }

    /// Placement at an absolute pixel offset.
    pub fn px(distance: f64) -> Self {
        Placement {
            distance,
            ..Placement::ZERO
        }
    }

    /// Placement at a fraction of the target's extent.
    pub fn target_fraction(fraction: f64) -> Self {
        Placement {
            target_percent: fraction,
            ..Placement::ZERO
        }
    }

    /// Replace the root-fraction component.
    pub fn with_root_fraction(mut self, fraction: f64) -> Self {
        self.percent = fraction;
        self
    }

    /// Replace the pixel-offset component.
    pub fn with_px(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }

    /// Replace the target-fraction component.
    pub fn with_target_fraction(mut self, fraction: f64) -> Self {
        self.target_percent = fraction;
        self
    }

    /// Resolve the triple against concrete extents into an absolute offset.
    pub fn resolve(&self, root_extent: f64, target_extent: f64) -> f64 {
        root_extent * self.percent + self.distance + target_extent * self.target_percent
    }

    fn validated(self) -> Result<Self, PlacementError> {
        for component in [self.percent, self.distance, self.target_percent] {
            if !component.is_finite() {
                return Err(PlacementError::NonFinite(component));
            }
        }
        Ok(self)
    }
}

/// Accepted input forms for a placement, normalized via [`PlacementSpec::resolve`].
#[derive(Debug, Clone)]
pub enum PlacementSpec {
    /// A bare fraction of the root's extent.
    Fraction(f64),
    /// A shorthand expression (see module docs for the grammar).
    Shorthand(String),
    /// An already-resolved triple; passes through after a finiteness check.
    Resolved(Placement),
}

impl PlacementSpec {
    /// Normalize into a canonical [`Placement`].
    pub fn resolve(&self) -> Result<Placement, PlacementError> {
        match self {
            PlacementSpec::Fraction(fraction) => {
                Placement::root_fraction(*fraction).validated()
            }
            PlacementSpec::Shorthand(expr) => parse_expression(expr),
            PlacementSpec::Resolved(placement) => placement.validated(),
        }
    }
}

impl From<f64> for PlacementSpec {
    fn from(fraction: f64) -> Self {
        PlacementSpec::Fraction(fraction)
    }
}

impl From<&str> for PlacementSpec {
    fn from(expr: &str) -> Self {
        PlacementSpec::Shorthand(expr.to_owned())
    }
}

impl From<String> for PlacementSpec {
    fn from(expr: String) -> Self {
        PlacementSpec::Shorthand(expr)
    }
}

impl From<Placement> for PlacementSpec {
    fn from(placement: Placement) -> Self {
        PlacementSpec::Resolved(placement)
    }
}

/// One parsed term, already scaled to the canonical triple's units.
enum Term {
    Root(f64),
    Px(f64),
    Target(f64),
}

fn parse_expression(input: &str) -> Result<Placement, PlacementError> {
    let mut acc = Placement::ZERO;
    let mut sign = 1.0;
    let mut pending_operator = false;
    let mut term_start: Option<usize> = None;
    let mut terms = 0usize;

    let push = |acc: &mut Placement, sign: f64, term: &str| -> Result<(), PlacementError> {
        match parse_term(term)? {
            Term::Root(fraction) => acc.percent += sign * fraction,
            Term::Px(distance) => acc.distance += sign * distance,
            Term::Target(fraction) => acc.target_percent += sign * fraction,
        }
        Ok(())
    };

    for (i, c) in input.char_indices() {
        match c {
            '+' | '-' if term_start.is_none() => {
                if c == '-' {
                    sign = -sign;
                }
                pending_operator = true;
            }
            '+' | '-' => {
                push(&mut acc, sign, &input[term_start.take().unwrap()..i])?;
                terms += 1;
                sign = if c == '-' { -1.0 } else { 1.0 };
                pending_operator = true;
            }
            c if c.is_whitespace() => {
                if let Some(start) = term_start.take() {
                    push(&mut acc, sign, &input[start..i])?;
                    terms += 1;
                    sign = 1.0;
                    pending_operator = false;
                }
            }
            _ => {
                if term_start.is_none() {
                    term_start = Some(i);
                    pending_operator = false;
                }
            }
        }
    }

    if let Some(start) = term_start {
        push(&mut acc, sign, &input[start..])?;
        terms += 1;
    } else if pending_operator {
        return Err(PlacementError::TrailingOperator(input.trim().to_owned()));
    }

    if terms == 0 {
        return Err(PlacementError::Empty);
    }
    acc.validated()
}

fn parse_term(term: &str) -> Result<Term, PlacementError> {
    match term {
        "top" => return Ok(Term::Root(0.0)),
        "middle" => return Ok(Term::Root(0.5)),
        "bottom" => return Ok(Term::Root(1.0)),
        _ => {}
    }

    // Split the numeric prefix from the unit suffix.
    let unit_start = term
        .char_indices()
        .find(|&(_, c)| !(c.is_ascii_digit() || c == '.'))
        .map(|(i, _)| i)
        .unwrap_or(term.len());
    let (number, unit) = term.split_at(unit_start);

    let value: f64 = number
        .parse()
        .map_err(|_| PlacementError::InvalidNumber(number.to_owned()))?;
    if !value.is_finite() {
        return Err(PlacementError::NonFinite(value));
    }

    match unit {
        "%target" => Ok(Term::Target(value / 100.0)),
        "target" => Ok(Term::Target(value)),
        "px" => Ok(Term::Px(value)),
        "%" => Ok(Term::Root(value / 100.0)),
        "" => Ok(Term::Root(value)),
        other => Err(PlacementError::UnknownUnit {
            term: term.to_owned(),
            unit: other.to_owned(),
        }),
    }
}
