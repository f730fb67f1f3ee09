use serde::Deserialize;

/// Severity band for a percentage-style metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Band {
    Nominal,
    Elevated,
    Critical,
}

/// Lower bounds (inclusive) of the elevated and critical bands.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub elevated: f64,
    pub critical: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            elevated: 60.0,
            critical: 85.0,
        }
    }
}

impl Thresholds {
    pub fn band(&self, value: f64) -> Band {
        if value >= self.critical {
            Band::Critical
        } else if value >= self.elevated {
            Band::Elevated
        } else {
            Band::Nominal
        }
    }

    /// Config files may list the bounds out of order; keep `elevated <= critical`.
    pub fn normalized(self) -> Self {
        if self.elevated <= self.critical {
            self
        } else {
            Thresholds {
                elevated: self.critical,
                critical: self.elevated,
            }
        }
    }
}

/// Band with the default 60/85 bounds.
pub fn band(value: f64) -> Band {
    Thresholds::default().band(value)
}

/// Battery gauges show depletion urgency: `100 - percent` while running on
/// battery, `0` while plugged in.
pub fn battery_urgency(percent: f64, plugged: bool) -> f64 {
    if plugged {
        0.0
    } else {
        (100.0 - percent).clamp(0.0, 100.0)
    }
}
