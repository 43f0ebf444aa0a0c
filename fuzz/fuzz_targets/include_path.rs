//! Fuzz target for the dotted include-path parser.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_include_path
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use navtree_query::PathParser;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Parsing never panics; an accepted path has no empty segments.
        if let Ok(chain) = PathParser::new().parse_str(input) {
            assert!(!chain.is_empty());
            assert!(chain.segments().iter().all(|segment| !segment.is_empty()));
            assert_eq!(chain.segments().join("."), input);
        }
    }
});
