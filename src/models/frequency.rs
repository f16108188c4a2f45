use serde::{Deserialize, Serialize};
use std::fmt;

/// Resampling frequency for the price table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    /// One row per trading day (no resampling)
    Daily,
    /// Last observation per ISO calendar week
    Weekly,
    /// Last observation per calendar month
    Monthly,
}

impl Frequency {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "daily" | "d" => Ok(Frequency::Daily),
            "weekly" | "w" => Ok(Frequency::Weekly),
            "monthly" | "m" => Ok(Frequency::Monthly),
            _ => Err(format!(
                "Invalid frequency: {}. Valid options: daily, weekly, monthly",
                s
            )),
        }
    }

    /// Suffix appended to chart titles, e.g. " (Weekly)"
    pub fn title_suffix(&self) -> &'static str {
        match self {
            Frequency::Daily => " (Daily)",
            Frequency::Weekly => " (Weekly)",
            Frequency::Monthly => " (Monthly)",
        }
    }

    /// Get all frequencies
    pub fn all() -> Vec<Frequency> {
        vec![Frequency::Daily, Frequency::Weekly, Frequency::Monthly]
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
        };
        write!(f, "{}", name)
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency::Daily
    }
}
