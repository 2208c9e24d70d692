#[doc(hidden)]
pub use alloc::format as __format;

#[macro_export]
macro_rules! error_with_location {
    ($msg:expr) => {
        ::anyhow::anyhow!("{} at {}:{}", $msg, file!(), line!())
    };
    ($fmt:expr, $($arg:tt)*) => {
        ::anyhow::anyhow!("{} at {}:{}", $crate::util::__format!($fmt, $($arg)*), file!(), line!())
    };
}

/// Integer linear remap of `x` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// Truncates toward zero and does not clamp, so inputs outside the source range
/// land outside the target range. A degenerate source range maps everything to `out_min`.
pub fn map_range(x: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    if in_max == in_min {
        return out_min;
    }
    (x - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// Scale an 8-bit value by `scale / 256`.
pub fn scale8(value: u8, scale: u8) -> u8 {
    ((value as u16 * (1 + scale as u16)) >> 8) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_range_matches_integer_remap() {
        assert_eq!(map_range(0, 0, 30, 1, 256), 1);
        assert_eq!(map_range(29, 0, 30, 1, 256), 247);
        assert_eq!(map_range(150, 150, 900, 0, 240), 0);
        assert_eq!(map_range(900, 150, 900, 0, 240), 240);
        // below the source range, not clamped
        assert_eq!(map_range(100, 150, 900, 0, 240), -16);
    }

    #[test]
    fn map_range_degenerate_source() {
        assert_eq!(map_range(5, 3, 3, 7, 10), 7);
    }

    #[test]
    fn scale8_endpoints() {
        assert_eq!(scale8(255, 255), 255);
        assert_eq!(scale8(255, 0), 0);
        assert_eq!(scale8(200, 235), 184);
        assert_eq!(scale8(0, 235), 0);
    }

    #[test]
    fn error_with_location_mentions_file() {
        let err = error_with_location!("Failed to read {}: {}", "key", 3);
        let text = std::format!("{err}");
        assert!(text.starts_with("Failed to read key: 3 at "));
        assert!(text.contains("util.rs"));
    }
}
