//! Event type codes
//!
//! PTRAC event type codes pack a coarse category into the thousands and, for
//! bank events only, a sub-reason into the low three digits (`2000 + reason`).
//! [`EventTypeCode::decompose`] is the only place that arithmetic happens.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse event category (the band of an event type code)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum EventCategory {
    #[default]
    HistoryStart,
    Source,
    Bank,
    Surface,
    Collision,
    Termination,
    EndOfHistory,
}

impl EventCategory {
    /// All categories in band order
    pub const ALL: [EventCategory; 7] = [
        EventCategory::HistoryStart,
        EventCategory::Source,
        EventCategory::Bank,
        EventCategory::Surface,
        EventCategory::Collision,
        EventCategory::Termination,
        EventCategory::EndOfHistory,
    ];

    /// Base code of the band
    pub fn code(self) -> i64 {
        match self {
            EventCategory::HistoryStart => 0,
            EventCategory::Source => 1000,
            EventCategory::Bank => 2000,
            EventCategory::Surface => 3000,
            EventCategory::Collision => 4000,
            EventCategory::Termination => 5000,
            EventCategory::EndOfHistory => 9000,
        }
    }

    /// Category whose base code is exactly `band`
    pub fn from_band(band: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == band)
    }

    /// Short lowercase name used in logs and reports
    pub fn name(self) -> &'static str {
        match self {
            EventCategory::HistoryStart => "start",
            EventCategory::Source => "source",
            EventCategory::Bank => "bank",
            EventCategory::Surface => "surface",
            EventCategory::Collision => "collision",
            EventCategory::Termination => "termination",
            EventCategory::EndOfHistory => "end",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Raw event type code as written in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventTypeCode(pub i64);

impl EventTypeCode {
    /// Split the code into its category and bank sub-reason
    ///
    /// The category is `(code / 1000) * 1000`. When that band is the bank band
    /// the sub-reason is `code % 1000`; for every other band it is `None`.
    /// Returns `None` for negative codes and for bands outside the table.
    ///
    /// Sub-reasons are not checked against the documented bank reasons:
    /// `2500` is a bank event with sub-reason `500`.
    pub fn decompose(self) -> Option<(EventCategory, Option<u32>)> {
        if self.0 < 0 {
            return None;
        }

        let category = EventCategory::from_band((self.0 / 1000) * 1000)?;
        let sub_reason = match category {
            EventCategory::Bank => Some((self.0 % 1000) as u32),
            _ => None,
        };

        Some((category, sub_reason))
    }

    /// Category only, see [`decompose`](Self::decompose)
    pub fn category(self) -> Option<EventCategory> {
        self.decompose().map(|(category, _)| category)
    }
}

impl From<i64> for EventTypeCode {
    fn from(code: i64) -> Self {
        Self(code)
    }
}

/// Name of a documented bank sub-reason
///
/// Purely informational. Codes outside the table are still valid bank events.
pub fn bank_reason_description(reason: u32) -> Option<&'static str> {
    let description = match reason {
        1 => "DXTRAN track",
        2 => "Energy split",
        3 => "Weight window surface split",
        4 => "Weight window collision split",
        5 => "Forced collision, uncollided part",
        6 => "Importance split",
        7 => "Neutron from neutron (n,xn) (n,f)",
        8 => "Photon from neutron",
        9 => "Photon from double fluorescence",
        10 => "Photon from annihilation",
        11 => "Electron from photoelectric",
        12 => "Electron from Compton",
        13 => "Electron from pair production",
        14 => "Auger electron from photon/x-ray",
        15 => "Positron from pair production",
        16 => "Bremsstrahlung from electron",
        17 => "Knock-on electron",
        18 => "X-rays from electron",
        19 => "Photon from neutron, multigroup",
        20 => "Neutron (n,f), multigroup",
        21 => "Neutron (n,xn) k, multigroup",
        22 => "Photon from photon, multigroup",
        23 => "Adjoint weight split, multigroup",
        24 => "Weight window pseudo-collision split",
        25 => "Secondary particles from photonuclear",
        _ => return None,
    };
    Some(description)
}
