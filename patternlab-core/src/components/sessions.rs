//! Builtin session windows (UTC).
//!
//! Sessions OR their time-of-day window into `session_ok`. Combining several
//! sessions goes through [`apply_sessions`], which clears the column first so
//! the result is exactly the union of the applied windows.

use chrono::Timelike;

use super::{ComponentMeta, SessionWindow};
use crate::domain::Bar;

/// Applies a set of sessions as a union.
///
/// With no sessions the column is left untouched (all bars tradeable by
/// default); otherwise it is reset and each session ORs its window in.
pub fn apply_sessions(bars: &mut [Bar], sessions: &[&dyn SessionWindow]) {
    if sessions.is_empty() {
        return;
    }
    for bar in bars.iter_mut() {
        bar.session_ok = false;
    }
    for session in sessions {
        session.apply(bars);
    }
}

macro_rules! session_type {
    ($ty:ident, $name:literal, $display:literal, $desc:literal) => {
        pub struct $ty {
            meta: ComponentMeta,
        }

        impl $ty {
            pub fn new() -> Self {
                Self {
                    meta: ComponentMeta {
                        name: $name,
                        display_name: $display,
                        description: $desc,
                        params: Vec::new(),
                        enabled_by_default: true,
                    },
                }
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

session_type!(
    LondonSession,
    "london",
    "London Session",
    "London trading hours, 01:00-08:15 UTC."
);

session_type!(
    NewYorkSession,
    "newyork",
    "New York Session",
    "New York trading hours, 08:15-15:45 UTC."
);

session_type!(
    TokyoSession,
    "tokyo",
    "Tokyo Session",
    "Tokyo trading hours, 15:45-01:00 UTC (wraps midnight)."
);

impl SessionWindow for LondonSession {
    fn meta(&self) -> &ComponentMeta {
        &self.meta
    }

    fn contains(&self, bar: &Bar) -> bool {
        let (h, m) = (bar.timestamp.hour(), bar.timestamp.minute());
        (1..8).contains(&h) || (h == 8 && m <= 15)
    }
}

impl SessionWindow for NewYorkSession {
    fn meta(&self) -> &ComponentMeta {
        &self.meta
    }

    fn contains(&self, bar: &Bar) -> bool {
        let (h, m) = (bar.timestamp.hour(), bar.timestamp.minute());
        (h == 8 && m >= 15) || (9..15).contains(&h) || (h == 15 && m <= 45)
    }
}

impl SessionWindow for TokyoSession {
    fn meta(&self) -> &ComponentMeta {
        &self.meta
    }

    fn contains(&self, bar: &Bar) -> bool {
        let (h, m) = (bar.timestamp.hour(), bar.timestamp.minute());
        (h == 15 && m >= 45) || h > 15 || h == 0 || (h == 1 && m == 0)
    }
}
