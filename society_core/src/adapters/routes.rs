//! Route visibility and accessible paths.
//!
//! Guard narrows the routes on offer but opens segments that need a stable
//! stance. Cushion-assisted segments stay open in every mode.

use serde::{Deserialize, Serialize};
use society_rules::{guard, ValueSource, WindprintMode};

use super::{resolve, AdapterKey};

/// Alternative routes a fully flexible area can show.
pub const MAX_ALTERNATIVE_ROUTES: u32 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    pub id: String,
    /// 0.0 - 1.0.
    pub difficulty: f64,
    pub requires_timing: bool,
    pub requires_precision: bool,
    pub has_safe_pocket: bool,
    pub is_accessible: bool,
    /// Passable only while Guard is active.
    pub requires_guard: bool,
    /// Meant to be crossed with Cushion, passable without it.
    pub requires_cushion: bool,
}

impl RouteSegment {
    pub fn new(id: impl Into<String>, difficulty: f64) -> Self {
        Self {
            id: id.into(),
            difficulty,
            requires_timing: false,
            requires_precision: false,
            has_safe_pocket: false,
            is_accessible: true,
            requires_guard: false,
            requires_cushion: false,
        }
    }

    pub fn with_timing(mut self) -> Self {
        self.requires_timing = true;
        self
    }

    pub fn with_precision(mut self) -> Self {
        self.requires_precision = true;
        self
    }

    pub fn with_safe_pocket(mut self) -> Self {
        self.has_safe_pocket = true;
        self
    }

    pub fn locked(mut self) -> Self {
        self.is_accessible = false;
        self
    }

    pub fn with_guard(mut self) -> Self {
        self.requires_guard = true;
        self
    }

    pub fn with_cushion(mut self) -> Self {
        self.requires_cushion = true;
        self
    }

    /// Whether the segment can be crossed in `mode`.
    pub fn is_open_in(&self, mode: Option<WindprintMode>) -> bool {
        self.is_accessible && (!self.requires_guard || mode == Some(WindprintMode::Guard))
    }
}

/// A named path through an area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub name: String,
    pub segments: Vec<RouteSegment>,
    pub is_primary: bool,
}

impl Route {
    pub fn new(name: impl Into<String>, segments: Vec<RouteSegment>) -> Self {
        Self {
            name: name.into(),
            segments,
            is_primary: false,
        }
    }

    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }

    /// Segments that can be crossed in `mode`.
    pub fn accessible_segments(
        &self,
        mode: Option<WindprintMode>,
    ) -> impl Iterator<Item = &RouteSegment> {
        self.segments.iter().filter(move |s| s.is_open_in(mode))
    }

    /// Every segment can be crossed in `mode`.
    pub fn is_traversable(&self, mode: Option<WindprintMode>) -> bool {
        self.segments.iter().all(|s| s.is_open_in(mode))
    }

    /// Every segment is open without a mode and none demands tight timing.
    pub fn is_safe(&self) -> bool {
        self.segments
            .iter()
            .all(|s| s.is_open_in(None) && !s.requires_timing)
    }

    pub fn average_difficulty(&self) -> f64 {
        if self.segments.is_empty() {
            return 0.0;
        }
        self.segments.iter().map(|s| s.difficulty).sum::<f64>() / self.segments.len() as f64
    }
}

/// Share of alternative routes open in `mode`, halved under Guard.
pub fn route_flexibility<S>(source: &S, mode: Option<WindprintMode>) -> f64
where
    S: ValueSource + ?Sized,
{
    let base = (1.0 - resolve(source, AdapterKey::RouteStrictness)).clamp(0.0, 1.0);
    if mode == Some(WindprintMode::Guard) {
        base * guard::ROUTE_FLEXIBILITY
    } else {
        base
    }
}

/// Which routes the level should present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteVisibility {
    pub alternative_routes: u32,
    pub show_safe_routes: bool,
    pub mode: Option<WindprintMode>,
}

impl RouteVisibility {
    pub fn derive<S>(source: &S, mode: Option<WindprintMode>) -> Self
    where
        S: ValueSource + ?Sized,
    {
        let flexibility = route_flexibility(source, mode);
        Self {
            alternative_routes: (flexibility * f64::from(MAX_ALTERNATIVE_ROUTES)).round() as u32,
            show_safe_routes: resolve(source, AdapterKey::SafeRouteVisibility) >= 0.5,
            mode,
        }
    }

    /// Routes the player may see, primary first.
    ///
    /// Alternatives that cannot be crossed in the current mode are hidden.
    pub fn visible<'r>(&self, routes: &'r [Route]) -> Vec<&'r Route> {
        let mut shown: Vec<&Route> = routes.iter().filter(|r| r.is_primary).collect();
        let mut alternatives = 0;
        let open = routes
            .iter()
            .filter(|r| !r.is_primary && r.is_traversable(self.mode));
        for route in open {
            if self.show_safe_routes && route.is_safe() {
                shown.push(route);
            } else if alternatives < self.alternative_routes {
                alternatives += 1;
                shown.push(route);
            }
        }
        shown
    }
}
