use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::system::snapshot::BatteryTime;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

pub fn truncate_unicode(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width.saturating_sub(1) {
            result.push('\u{2026}');
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result
}

pub fn bytes_to_gb(bytes: u64) -> f64 {
    bytes as f64 / GIB
}

/// `"7.8 GB / 15.5 GB"`
pub fn format_used_total_gb(used: u64, total: u64) -> String {
    format!("{:.1} GB / {:.1} GB", bytes_to_gb(used), bytes_to_gb(total))
}

/// Whole hours and minutes, seconds dropped.
pub fn format_uptime(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    format!("{hours}h {minutes}m")
}

pub fn format_battery_time(time: BatteryTime) -> String {
    match time {
        BatteryTime::PluggedIn => "Plugged In".to_string(),
        BatteryTime::Unknown => "Calculating...".to_string(),
        BatteryTime::Remaining(left) => format_uptime(left.as_secs()),
    }
}
