//! Strategy selection from the pair of travel modes.

use serde::Serialize;

use crate::domain::TravelMode;

/// One of the two people meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    A,
    B,
}

impl Party {
    pub fn other(self) -> Party {
        match self {
            Party::A => Party::B,
            Party::B => Party::A,
        }
    }

    /// Order a pair of role values as `(for A, for B)`.
    ///
    /// `mine` belongs to `self`, `theirs` to the other party.
    pub fn assign<T>(self, mine: T, theirs: T) -> (T, T) {
        match self {
            Party::A => (mine, theirs),
            Party::B => (theirs, mine),
        }
    }

    /// Pick this party's value out of an `(A, B)` pair.
    pub fn pick<T>(self, a: T, b: T) -> T {
        match self {
            Party::A => a,
            Party::B => b,
        }
    }
}

/// How a meeting point is resolved for a pair of travel modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    /// Both travel the same way: balance times along or near the direct route.
    SameMode { mode: TravelMode },

    /// One walks, the other drives: meet where the walker is.
    StationaryWalker { walker: Party },

    /// One takes transit, the other drives: meet at a stop on the transit route.
    TransitStopMatching { transit: Party },

    /// One walks, the other takes transit: meet at the walker, unless a stop
    /// partway along a long transit trip is within walking distance.
    WalkerWithTransitProbe { walker: Party },
}

impl Strategy {
    /// Select the strategy for `(mode_a, mode_b)`. Every pair has one.
    pub fn select(mode_a: TravelMode, mode_b: TravelMode) -> Strategy {
        use TravelMode::{Driving, Transit, Walking};

        match (mode_a, mode_b) {
            (Driving, Driving) | (Walking, Walking) | (Transit, Transit) => {
                Strategy::SameMode { mode: mode_a }
            }
            (Walking, Driving) => Strategy::StationaryWalker { walker: Party::A },
            (Driving, Walking) => Strategy::StationaryWalker { walker: Party::B },
            (Transit, Driving) => Strategy::TransitStopMatching { transit: Party::A },
            (Driving, Transit) => Strategy::TransitStopMatching { transit: Party::B },
            (Walking, Transit) => Strategy::WalkerWithTransitProbe { walker: Party::A },
            (Transit, Walking) => Strategy::WalkerWithTransitProbe { walker: Party::B },
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::SameMode { .. } => "same_mode",
            Strategy::StationaryWalker { .. } => "stationary_walker",
            Strategy::TransitStopMatching { .. } => "transit_stop_matching",
            Strategy::WalkerWithTransitProbe { .. } => "walker_with_transit_probe",
        }
    }
}
