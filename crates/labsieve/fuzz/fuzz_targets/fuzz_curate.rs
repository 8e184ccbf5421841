//! Fuzz target for per-record curation.
//!
//! Feeds arbitrary raw records through the curator and checks that a record
//! is only curated when no sensitivity rule fires on its text.

#![no_main]

use arbitrary::Arbitrary;
use chrono::Utc;
use libfuzzer_sys::fuzz_target;
use labsieve::record::RawLine;
use labsieve::{CuratorConfig, Curator, Disposition, SensitivityTable};

#[derive(Debug, Arbitrary)]
struct Input {
    id: Option<String>,
    source: Option<String>,
    collected_at: Option<String>,
    text: Option<String>,
    excerpt_chars: u16,
}

fuzz_target!(|input: Input| {
    let config = CuratorConfig {
        excerpt_chars: usize::from(input.excerpt_chars).max(1),
        ..Default::default()
    };
    let curator = Curator::new(&config);
    let raw = RawLine {
        id: input.id,
        source: input.source,
        collected_at: input.collected_at,
        text: input.text,
    };

    match curator.dispose(&raw, Utc::now()) {
        Disposition::Dropped => {}
        Disposition::Curated(record) => {
            let text = raw.text.as_deref().unwrap_or_default();
            assert!(!SensitivityTable::standard().is_sensitive(text));
            let _ = serde_json::to_string(&record);
        }
        Disposition::Reviewed(record) => {
            assert!(record.raw_excerpt.chars().count() <= config.excerpt_chars);
            let _ = serde_json::to_string(&record);
        }
    }
});
