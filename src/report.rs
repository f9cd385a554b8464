//! Text rendering for collection reports.
//!
//! Builds the per-file message block that gets delivered to webhooks:
//! display name, counters with signed deltas, and a compact reference to the
//! observation the deltas compare against.

use crate::diff::Diff;
use std::fmt::Write;

/// Render the report block for one file.
///
/// ```text
/// Design Handbook
/// users:12345 (+45)
/// likes:678 (+8)
/// vs 12/05 09:30
/// ```
///
/// On a first observation the parenthesised deltas are omitted and the
/// comparison line reads `first record`.
#[must_use]
pub fn render_file_report(name: &str, diff: &Diff) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{name}");

    match diff.user_delta {
        Some(delta) => {
            let _ = writeln!(out, "users:{} ({delta:+})", diff.user_count);
        }
        None => {
            let _ = writeln!(out, "users:{}", diff.user_count);
        }
    }

    match diff.like_delta {
        Some(delta) => {
            let _ = writeln!(out, "likes:{} ({delta:+})", diff.like_count);
        }
        None => {
            let _ = writeln!(out, "likes:{}", diff.like_count);
        }
    }

    match &diff.compared_against {
        Some(reference) => {
            let _ = write!(out, "vs {}", compact_timestamp(reference));
        }
        None => {
            let _ = write!(out, "first record");
        }
    }

    out
}

/// Compress a stored sample reference for display.
///
/// `2025-12-05` becomes `12/05`; `2025-12-05 09:30:15` becomes `12/05 09:30`.
/// Anything that does not match those two shapes is returned unchanged, so an
/// odd stored value still renders rather than erroring.
#[must_use]
pub fn compact_timestamp(reference: &str) -> String {
    if is_date(reference) {
        return format!("{}/{}", &reference[5..7], &reference[8..10]);
    }

    // The ASCII check keeps the byte-indexed slicing below on char boundaries.
    if reference.len() == 19
        && reference.is_ascii()
        && is_date(&reference[..10])
        && reference.as_bytes()[10] == b' '
        && reference.as_bytes()[13] == b':'
        && reference.as_bytes()[16] == b':'
        && all_digits(&reference[11..13])
        && all_digits(&reference[14..16])
        && all_digits(&reference[17..19])
    {
        return format!(
            "{}/{} {}:{}",
            &reference[5..7],
            &reference[8..10],
            &reference[11..13],
            &reference[14..16]
        );
    }

    reference.to_owned()
}

/// Returns `true` for a strict `YYYY-MM-DD` shape.
fn is_date(s: &str) -> bool {
    s.len() == 10
        && s.is_ascii()
        && all_digits(&s[..4])
        && s.as_bytes()[4] == b'-'
        && all_digits(&s[5..7])
        && s.as_bytes()[7] == b'-'
        && all_digits(&s[8..10])
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn diff_with_deltas() -> Diff {
        Diff {
            date: "2025-12-05".to_owned(),
            user_count: 12_345,
            like_count: 678,
            user_delta: Some(45),
            like_delta: Some(8),
            compared_against: Some("2025-12-05 09:30:15".to_owned()),
        }
    }

    #[test]
    fn report_contains_counts_and_signed_deltas() {
        let report = render_file_report("Design Handbook", &diff_with_deltas());
        assert!(report.starts_with("Design Handbook\n"));
        assert!(report.contains("users:12345 (+45)"));
        assert!(report.contains("likes:678 (+8)"));
        assert!(report.ends_with("vs 12/05 09:30"));
    }

    #[test]
    fn zero_delta_still_shows_plus_sign() {
        let mut diff = diff_with_deltas();
        diff.user_delta = Some(0);
        let report = render_file_report("f", &diff);
        assert!(report.contains("users:12345 (+0)"));
    }

    #[test]
    fn negative_delta_is_rendered() {
        let mut diff = diff_with_deltas();
        diff.user_delta = Some(-3);
        let report = render_file_report("f", &diff);
        assert!(report.contains("users:12345 (-3)"));
    }

    #[test]
    fn first_observation_omits_deltas() {
        let diff = Diff {
            date: "2025-12-05".to_owned(),
            user_count: 12_345,
            like_count: 678,
            user_delta: None,
            like_delta: None,
            compared_against: None,
        };
        let report = render_file_report("Design Handbook", &diff);
        assert!(report.contains("users:12345\n"));
        assert!(report.contains("likes:678\n"));
        assert!(!report.contains('('));
        assert!(report.ends_with("first record"));
    }

    #[test]
    fn compact_timestamp_date_only() {
        assert_eq!(compact_timestamp("2025-12-05"), "12/05");
    }

    #[test]
    fn compact_timestamp_full() {
        assert_eq!(compact_timestamp("2025-12-05 09:30:15"), "12/05 09:30");
    }

    #[test]
    fn compact_timestamp_unrecognized_passes_through() {
        assert_eq!(compact_timestamp("yesterday"), "yesterday");
        assert_eq!(compact_timestamp("2025-12-05T09:30:15"), "2025-12-05T09:30:15");
        assert_eq!(compact_timestamp(""), "");
    }

    #[test]
    fn compact_timestamp_tolerates_non_ascii_input() {
        // Multibyte chars straddling the shape's byte offsets must pass
        // through rather than panic on a char boundary.
        assert_eq!(compact_timestamp("1234-5α67"), "1234-5α67");
        assert_eq!(compact_timestamp("123456789α23456789"), "123456789α23456789");
    }
}
