//! Fuzz target for the redaction and sensitivity tables.
//!
//! Checks that redaction:
//! 1. Never panics on any input
//! 2. Reaches a fixed point (redacting twice equals redacting once)
//! 3. Leaves no rule that would still fire

#![no_main]

use libfuzzer_sys::fuzz_target;
use labsieve::{RedactionTable, SensitivityTable};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    let table = RedactionTable::standard();
    let once = table.redact(&text);
    assert_eq!(table.redact(&once), once);
    assert!(table.triggered(&once).is_empty());

    let _ = SensitivityTable::standard().classify(&text);
});
