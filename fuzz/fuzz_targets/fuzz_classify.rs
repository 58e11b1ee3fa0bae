//! Fuzz target for notation classification and identifier parsing
//!
//! Feeds arbitrary strings to the classifier and the other-IDs parser. Neither
//! should panic; unclassifiable input must come back as an error.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if input.len() > 1000 {
            return;
        }

        // Split off an optional variant type: "<type>\t<notation>"
        let (variant_type, coding) = input.split_once('\t').unwrap_or(("", input));
        if let Ok(variant) =
            ferro_varload::classify_notation(coding, variant_type, "1", "100", "200")
        {
            assert!(variant.canonical_id().as_str().starts_with("chr1:g."));
        }

        let _ = ferro_varload::parse_other_ids(input);
    }
});
