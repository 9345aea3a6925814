//! Download progress formatting.

/// Format bytes as a human-readable size.
pub fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;

    if bytes >= MIB {
        format!("{}.{} MiB", bytes / MIB, (bytes % MIB) * 10 / MIB)
    } else if bytes >= KIB {
        format!("{}.{} KiB", bytes / KIB, (bytes % KIB) * 10 / KIB)
    } else {
        format!("{bytes} B")
    }
}

/// Format a fixed-width progress bar using ▓ (filled) and ░ (empty).
pub fn format_progress_bar(current: u64, total: u64, width: usize) -> String {
    let filled = if total > 0 {
        let width_u64 = u64::try_from(width).unwrap_or(u64::MAX);
        usize::try_from(current.min(total).saturating_mul(width_u64) / total).unwrap_or(width)
    } else {
        0
    };
    let empty = width.saturating_sub(filled);
    format!("{}{}", "▓".repeat(filled), "░".repeat(empty))
}

/// One progress line: bar and percentage when the size is known, bytes so far otherwise.
pub fn format_download_progress(current: u64, total: Option<u64>) -> String {
    match total {
        Some(total) if total > 0 => {
            let pct = (current.saturating_mul(100) / total).min(100);
            let bar = format_progress_bar(current, total, 24);
            format!("{bar}  {pct:>3}%  {}", format_size(total))
        }
        _ => format_size(current),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KiB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MiB");
    }

    #[test]
    fn test_progress_bar_bounds() {
        assert_eq!(format_progress_bar(0, 100, 4), "░░░░");
        assert_eq!(format_progress_bar(50, 100, 4), "▓▓░░");
        assert_eq!(format_progress_bar(200, 100, 4), "▓▓▓▓");
        assert_eq!(format_progress_bar(10, 0, 4), "░░░░");
    }

    #[test]
    fn test_progress_without_length() {
        assert_eq!(format_download_progress(2048, None), "2.0 KiB");
        assert!(format_download_progress(50, Some(100)).contains(" 50%"));
    }
}
