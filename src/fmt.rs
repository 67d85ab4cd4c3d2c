//! Shared formatting helpers for dashboard widgets.
//!
//! Pure functions only: no ratatui styles, no layout. Functions that differ
//! between compact table cells and the verbose detail popup take a
//! [`FmtStyle`].

/// Controls compact (table cells) vs verbose (popups, system info) output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FmtStyle {
    /// No spaces, short suffixes: `"1.5G"`, `"3m5s"`.
    Compact,
    /// Spaces and full suffixes: `"1.5 GiB"`, `"3m 5s"`.
    Detail,
}

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Format byte count as human-readable size.
///
/// Compact: `"1.5G"`, `"100.3M"`, `"50.0K"`, `"512B"`
/// Detail:  `"1.5 GiB"`, `"100.3 MiB"`, `"50.0 KiB"`, `"512 B"`
pub fn format_bytes(bytes: u64, style: FmtStyle) -> String {
    let (g, m, k, b) = match style {
        FmtStyle::Compact => ("G", "M", "K", "B"),
        FmtStyle::Detail => (" GiB", " MiB", " KiB", " B"),
    };
    let f = bytes as f64;
    if f >= GIB {
        format!("{:.1}{}", f / GIB, g)
    } else if f >= MIB {
        format!("{:.1}{}", f / MIB, m)
    } else if f >= KIB {
        format!("{:.1}{}", f / KIB, k)
    } else {
        format!("{}{}", bytes, b)
    }
}

/// Format a duration in seconds.
///
/// Compact: `"3m5s"` (`"-"` for negative)
/// Detail:  `"3m 5s"` (`"0s"` for `<= 0`)
pub fn format_duration(secs: i64, style: FmtStyle) -> String {
    if secs < 0 && style == FmtStyle::Compact {
        return "-".to_string();
    }
    let secs = secs.max(0);
    let sep = match style {
        FmtStyle::Compact => "",
        FmtStyle::Detail => " ",
    };
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m{}{}s", secs / 60, sep, secs % 60)
    } else if secs < 86400 {
        format!("{}h{}{}m", secs / 3600, sep, (secs % 3600) / 60)
    } else {
        format!("{}d{}{}h", secs / 86400, sep, (secs % 86400) / 3600)
    }
}

/// Format a percentage with one decimal: `"37.5%"`.
pub fn format_percent(pct: f64) -> String {
    if !pct.is_finite() {
        return "0.0%".to_string();
    }
    format!("{:.1}%", pct)
}

/// Format a MiB/s disk rate: `"1.9 MB/s"`, `"0"` below 0.05.
pub fn format_mbs(rate: f64) -> String {
    if !rate.is_finite() || rate < 0.05 {
        return "0".to_string();
    }
    if rate >= 1024.0 {
        format!("{:.1} GB/s", rate / 1024.0)
    } else {
        format!("{:.1} MB/s", rate)
    }
}

/// Format a decimal megabit rate: `"8.0 Mb/s"`, `"1.2 Gb/s"`.
pub fn format_mbps(rate: f64) -> String {
    if !rate.is_finite() || rate < 0.05 {
        return "0".to_string();
    }
    if rate >= 1000.0 {
        format!("{:.1} Gb/s", rate / 1000.0)
    } else {
        format!("{:.1} Mb/s", rate)
    }
}

/// Format a KiB/s rate for table cells: `"512"`, `"1.5M"`, `"-"` for zero.
pub fn format_kbs(rate: f64) -> String {
    if !rate.is_finite() || rate < 0.05 {
        return "-".to_string();
    }
    if rate >= KIB * KIB {
        format!("{:.1}G", rate / (KIB * KIB))
    } else if rate >= KIB {
        format!("{:.1}M", rate / KIB)
    } else if rate >= 10.0 {
        format!("{:.0}", rate)
    } else {
        format!("{:.1}", rate)
    }
}

/// Format a signed delta with explicit sign, `"0"` for zero.
pub fn format_delta(delta: i64) -> String {
    match delta {
        0 => "0".to_string(),
        d if d > 0 => format!("+{}", d),
        d => d.to_string(),
    }
}

/// Format CPU-seconds accumulated by a command: `"12.3s"`, `"4m 10s"`.
pub fn format_cpu_seconds(secs: f64) -> String {
    if !secs.is_finite() || secs <= 0.0 {
        return "0s".to_string();
    }
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format_duration(secs as i64, FmtStyle::Detail)
    }
}

/// Battery time remaining, `"-"` when unknown.
pub fn format_remaining(secs: i64) -> String {
    if secs <= 0 {
        "-".to_string()
    } else {
        format_duration(secs, FmtStyle::Detail)
    }
}

/// Truncate to `max_chars` characters with a trailing `…`.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512, FmtStyle::Compact), "512B");
        assert_eq!(format_bytes(1536, FmtStyle::Compact), "1.5K");
        assert_eq!(format_bytes(16_384_000_000, FmtStyle::Compact), "15.3G");
        assert_eq!(format_bytes(1 << 30, FmtStyle::Detail), "1.0 GiB");
        assert_eq!(format_bytes(0, FmtStyle::Detail), "0 B");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(45, FmtStyle::Compact), "45s");
        assert_eq!(format_duration(185, FmtStyle::Compact), "3m5s");
        assert_eq!(format_duration(185, FmtStyle::Detail), "3m 5s");
        assert_eq!(format_duration(7260, FmtStyle::Detail), "2h 1m");
        assert_eq!(format_duration(90000, FmtStyle::Compact), "1d1h");
        assert_eq!(format_duration(-5, FmtStyle::Compact), "-");
        assert_eq!(format_duration(-5, FmtStyle::Detail), "0s");
    }

    #[test]
    fn test_rates() {
        assert_eq!(format_mbs(1.9073486328125), "1.9 MB/s");
        assert_eq!(format_mbs(0.01), "0");
        assert_eq!(format_mbs(2048.0), "2.0 GB/s");
        assert_eq!(format_mbps(8.0), "8.0 Mb/s");
        assert_eq!(format_mbps(2500.0), "2.5 Gb/s");
        assert_eq!(format_kbs(0.0), "-");
        assert_eq!(format_kbs(2.0), "2.0");
        assert_eq!(format_kbs(512.0), "512");
        assert_eq!(format_kbs(1536.0), "1.5M");
        assert_eq!(format_mbs(f64::NAN), "0");
    }

    #[test]
    fn test_small_helpers() {
        assert_eq!(format_percent(37.24), "37.2%");
        assert_eq!(format_percent(f64::INFINITY), "0.0%");
        assert_eq!(format_delta(3), "+3");
        assert_eq!(format_delta(-2), "-2");
        assert_eq!(format_delta(0), "0");
        assert_eq!(format_cpu_seconds(12.34), "12.3s");
        assert_eq!(format_cpu_seconds(250.0), "4m 10s");
        assert_eq!(format_remaining(0), "-");
        assert_eq!(format_remaining(14400), "4h 0m");
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("nginx", 10), "nginx");
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("ääää", 3), "ää…");
    }
}
