// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use termcolor::Buffer;

use super::*;
use crate::test_utils::sample_report;

fn render(buffer: &mut Buffer) -> String {
    TextFormatter.write_report(buffer, &sample_report()).unwrap();
    String::from_utf8(buffer.as_slice().to_vec()).unwrap()
}

#[test]
fn lists_units_with_outcomes() {
    let text = render(&mut Buffer::no_color());
    assert!(text.contains("PASS  src/math.test.js (12 ms)"), "{text}");
    assert!(text.contains("FAIL  src/parse.test.js (1.50 s)"), "{text}");
    assert!(text.contains("  parses numbers: values differ (expected 1, received 2)"), "{text}");
    assert!(text.contains("SKIP  src/slow.test.js (abandoned)"), "{text}");
}

#[test]
fn shows_coverage_table_and_violation() {
    let text = render(&mut Buffer::no_color());
    assert!(text.contains("Coverage:"), "{text}");
    assert!(text.contains("lines           50% (10/20)  below 80% threshold"), "{text}");
    assert!(text.contains("branches       100% (0/0)\n"), "{text}");
}

#[test]
fn shows_summary_line() {
    let text = render(&mut Buffer::no_color());
    assert!(text.contains("Units: 1 passed, 1 failed, 1 abandoned, 3 total"), "{text}");
    assert!(text.contains("Time:  2.35 s"), "{text}");
}

#[test]
fn no_color_buffer_has_no_escapes() {
    let text = render(&mut Buffer::no_color());
    assert!(!text.contains('\u{1b}'));
}

#[test]
fn ansi_buffer_colors_outcomes() {
    let text = render(&mut Buffer::ansi());
    assert!(text.contains('\u{1b}'));
}

#[test]
fn full_report_layout() {
    let text = render(&mut Buffer::no_color());
    let expected = [
        "PASS  src/math.test.js (12 ms)",
        "FAIL  src/parse.test.js (1.50 s)",
        "  parses numbers: values differ (expected 1, received 2)",
        "SKIP  src/slow.test.js (abandoned)",
        "",
        "Coverage:",
        "  statements     100% (0/0)",
        "  branches       100% (0/0)",
        "  functions      100% (0/0)",
        "  lines           50% (10/20)  below 80% threshold",
        "",
        "Units: 1 passed, 1 failed, 1 abandoned, 3 total",
        "Time:  2.35 s",
        "",
    ]
    .join("\n");
    similar_asserts::assert_eq!(text, expected);
}
