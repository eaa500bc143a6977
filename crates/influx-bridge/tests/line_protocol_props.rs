// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::needless_pass_by_value)] // Test functions

//! Property tests for the Line Protocol validator.
//!
//! The composite pattern is kept here as an independent oracle: the
//! scanner must agree with it on every input.

use influx_bridge::line_protocol::{is_valid, validate};
use influx_bridge::ExtraTags;
use proptest::prelude::*;
use regex::Regex;
use std::sync::OnceLock;

fn oracle() -> &'static Regex {
    static ORACLE: OnceLock<Regex> = OnceLock::new();
    ORACLE.get_or_init(|| {
        Regex::new(r"^(?:[^, =\\\r\n]|\\[, =])+ value=(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+) [0-9]+$")
            .expect("oracle pattern")
    })
}

fn series() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            6 => "[a-zA-Z0-9_.-]",
            1 => Just(r"\ ".to_string()),
            1 => Just(r"\,".to_string()),
            1 => Just(r"\=".to_string()),
        ],
        1..12,
    )
    .prop_map(|parts| parts.concat())
}

fn number() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{1,8}",
        "[0-9]{1,6}\\.[0-9]{0,6}",
        "\\.[0-9]{1,6}",
    ]
}

fn valid_line() -> impl Strategy<Value = String> {
    (series(), number(), "[0-9]{1,19}")
        .prop_map(|(s, n, ts)| format!("{} value={} {}", s, n, ts))
}

proptest! {
    #[test]
    fn test_generated_lines_are_accepted(line in valid_line()) {
        let parsed = validate(&line);
        prop_assert!(parsed.is_ok(), "{:?} rejected: {:?}", line, parsed);
        prop_assert!(oracle().is_match(&line));
    }

    #[test]
    fn test_segments_cover_the_line(line in valid_line()) {
        let parsed = validate(&line).expect("valid");
        let rebuilt = format!("{} {} {}", parsed.series(), parsed.field(), parsed.timestamp());
        prop_assert_eq!(rebuilt, line.clone());
        prop_assert!(parsed.field().starts_with("value="));
    }

    #[test]
    fn test_scanner_agrees_with_oracle(line in "[a-z ,=.0-9\\\\]{0,24}") {
        prop_assert_eq!(is_valid(&line), oracle().is_match(&line));
    }

    #[test]
    fn test_scanner_agrees_with_oracle_on_mutations(
        line in valid_line(),
        pos in any::<prop::sample::Index>(),
        replacement in prop::sample::select(vec![' ', ',', '=', '\\', '.', 'x', '7', '\n', '\t']),
        insert in any::<bool>(),
    ) {
        let mut mutated = line.clone();
        let at = pos.index(mutated.len());
        if insert {
            mutated.insert(at, replacement);
        } else {
            mutated.replace_range(at..at + 1, &replacement.to_string());
        }
        prop_assert_eq!(is_valid(&mutated), oracle().is_match(&mutated), "{:?}", mutated);
    }

    #[test]
    fn test_tag_injection_keeps_lines_valid(
        line in valid_line(),
        tags in prop::collection::vec("[a-z=, ]{1,8}", 1..4),
    ) {
        let tags = ExtraTags::parse(&tags.join(",")).expect("tags");
        let out = tags.apply(&line).expect("apply");
        let original = validate(&line).expect("valid");
        if tags.is_empty() {
            prop_assert_eq!(out, line.clone());
        } else {
            let head = format!("{},tag_0=", original.series());
            let tail = format!(" {} {}", original.field(), original.timestamp());
            prop_assert!(out.starts_with(&head), "{:?} does not start with {:?}", out, head);
            prop_assert!(out.ends_with(&tail), "{:?} does not end with {:?}", out, tail);
        }
    }
}
