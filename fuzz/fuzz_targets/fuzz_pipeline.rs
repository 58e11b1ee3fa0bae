//! Fuzz target for the full TSV pipeline
//!
//! Arbitrary bytes are read as a variant summary file. The pipeline may
//! return a structural error but must never panic, and it must stop after
//! the first error.

#![no_main]

use ferro_varload::config::PipelineConfig;
use ferro_varload::VariantPipeline;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }

    let mut errors = 0;
    for result in VariantPipeline::new(data, &PipelineConfig::default()) {
        if result.is_err() {
            errors += 1;
        }
    }
    assert!(errors <= 1);
});
