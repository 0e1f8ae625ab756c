//! Supported page-view windows.

use crate::errors::GapError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A trailing page-view window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ViewWindow {
    /// The last 30 days.
    Days30,
    /// The last 60 days.
    Days60,
    /// The last 90 days.
    Days90,
}

impl ViewWindow {
    /// Number of days covered.
    #[must_use]
    pub const fn days(self) -> u32 {
        match self {
            Self::Days30 => 30,
            Self::Days60 => 60,
            Self::Days90 => 90,
        }
    }
}

impl Default for ViewWindow {
    fn default() -> Self {
        Self::Days90
    }
}

impl TryFrom<u32> for ViewWindow {
    type Error = GapError;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        match days {
            30 => Ok(Self::Days30),
            60 => Ok(Self::Days60),
            90 => Ok(Self::Days90),
            other => Err(GapError::invalid_configuration(format!(
                "Expected 30, 60 or 90 instead of {other}"
            ))),
        }
    }
}

impl From<ViewWindow> for u32 {
    fn from(window: ViewWindow) -> Self {
        window.days()
    }
}

impl fmt::Display for ViewWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} days", self.days())
    }
}
