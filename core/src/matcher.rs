//! Message matching against obituary and flag-alert templates
//!
//! Each template becomes a wildcard pattern around its escaped literals:
//!
//! ```text
//! Message1 only:        (.*)M1(.*)
//! Message1 + Message2:  (.*)M1(.*)M2
//! ```
//!
//! Group 1 becomes `x` and group 2 becomes `y`. Templates are tried in file
//! order across all keys, so the first matching definition in the fragfile
//! wins even when several could match.

use regex::{Captures, Regex};
use serde::Serialize;

use crate::error::FragfileError;
use crate::loader::Result;
use crate::rules::Fragfile;
use crate::schema::{FlagAlert, Obituary};

/// A message decomposed by an obituary template
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FragMessage {
    /// Text before the first literal
    pub x: String,
    /// Text after the first literal (up to the second one, if any)
    pub y: String,
    /// Key of the matching obituary
    #[serde(rename = "type")]
    pub kind: String,
    /// Weapon field of the matching obituary
    pub weapon: String,
}

/// A message decomposed by a flag-alert template
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FlagEvent {
    /// Text before the literal
    pub player: String,
    /// Text after the literal
    pub detail: String,
    /// Key of the matching flag alert
    #[serde(rename = "type")]
    pub kind: String,
}

impl Obituary {
    /// Pattern source for this template
    pub fn pattern(&self) -> String {
        template_pattern(&self.message1, self.second_literal())
    }

    fn to_message(&self, caps: &Captures<'_>) -> FragMessage {
        FragMessage {
            x: group(caps, 1),
            y: group(caps, 2),
            kind: self.kind.clone(),
            weapon: self.weapon.clone(),
        }
    }
}

impl FlagAlert {
    /// Pattern source for this template
    pub fn pattern(&self) -> String {
        template_pattern(&self.message1, None)
    }

    fn to_event(&self, caps: &Captures<'_>) -> FlagEvent {
        FlagEvent {
            player: group(caps, 1),
            detail: group(caps, 2),
            kind: self.kind.clone(),
        }
    }
}

fn template_pattern(message1: &str, message2: Option<&str>) -> String {
    match message2 {
        Some(message2) => format!("(.*){message1}(.*){message2}"),
        None => format!("(.*){message1}(.*)"),
    }
}

fn compile(pattern: String) -> Result<Regex> {
    Regex::new(&pattern).map_err(|source| FragfileError::PatternCompilation { pattern, source })
}

fn group(caps: &Captures<'_>, index: usize) -> String {
    caps.get(index)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

// ═══════════════════════════════════════════════════════════════════════════
// One-shot matching
// ═══════════════════════════════════════════════════════════════════════════

impl Fragfile {
    /// Match a message against every obituary, compiling patterns as it goes
    ///
    /// Returns `Ok(None)` when nothing matches. A pattern that fails to
    /// compile aborts the scan.
    pub fn parse_message(&self, message: &str) -> Result<Option<FragMessage>> {
        for obituary in self.obituaries.iter() {
            let regex = compile(obituary.pattern())?;
            if let Some(caps) = regex.captures(message) {
                return Ok(Some(obituary.to_message(&caps)));
            }
        }
        Ok(None)
    }

    /// Match a message against every flag alert
    pub fn parse_flag_alert(&self, message: &str) -> Result<Option<FlagEvent>> {
        for alert in self.flag_alerts.iter() {
            let regex = compile(alert.pattern())?;
            if let Some(caps) = regex.captures(message) {
                return Ok(Some(alert.to_event(&caps)));
            }
        }
        Ok(None)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Precompiled matcher
// ═══════════════════════════════════════════════════════════════════════════

/// All templates of a fragfile, compiled once
///
/// Matching borrows the fragfile and never mutates it, so one matcher can
/// be shared between threads.
#[derive(Debug, Clone)]
pub struct Matcher<'a> {
    obituaries: Vec<(Regex, &'a Obituary)>,
    flag_alerts: Vec<(Regex, &'a FlagAlert)>,
}

impl<'a> Matcher<'a> {
    pub fn new(fragfile: &'a Fragfile) -> Result<Self> {
        let obituaries = fragfile
            .obituaries
            .iter()
            .map(|obit| Ok((compile(obit.pattern())?, obit)))
            .collect::<Result<Vec<_>>>()?;

        let flag_alerts = fragfile
            .flag_alerts
            .iter()
            .map(|alert| Ok((compile(alert.pattern())?, alert)))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            obituaries = obituaries.len(),
            flag_alerts = flag_alerts.len(),
            "Compiled templates"
        );

        Ok(Self {
            obituaries,
            flag_alerts,
        })
    }

    pub fn parse_message(&self, message: &str) -> Option<FragMessage> {
        self.obituaries.iter().find_map(|(regex, obituary)| {
            regex
                .captures(message)
                .map(|caps| obituary.to_message(&caps))
        })
    }

    pub fn parse_flag_alert(&self, message: &str) -> Option<FlagEvent> {
        self.flag_alerts
            .iter()
            .find_map(|(regex, alert)| regex.captures(message).map(|caps| alert.to_event(&caps)))
    }

    /// Number of compiled templates
    pub fn len(&self) -> usize {
        self.obituaries.len() + self.flag_alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(source: &str) -> Fragfile {
        Fragfile::load_bytes(source.as_bytes()).unwrap()
    }

    #[test]
    fn test_single_literal() {
        let fragfile = load(r#"#DEFINE OBITUARY "frag" "rocket" "fragged" """#);
        let msg = fragfile.parse_message("Alice fragged Bob").unwrap().unwrap();

        assert_eq!(msg.x, "Alice ");
        assert_eq!(msg.y, " Bob");
        assert_eq!(msg.kind, "frag");
        assert_eq!(msg.weapon, "rocket");
    }

    #[test]
    fn test_two_literals() {
        let fragfile = load(r#"#DEFINE OBIT kill rg "was annihilated by" "using""#);
        let msg = fragfile
            .parse_message("Carol was annihilated by Dave using railgun")
            .unwrap()
            .unwrap();

        assert_eq!(msg.x, "Carol ");
        assert_eq!(msg.y, " Dave ");
        assert_eq!(msg.kind, "kill");
        assert_eq!(msg.weapon, "rg");
    }

    #[test]
    fn test_trailing_newline_not_captured() {
        let fragfile = load(r#"#DEFINE OBIT PLAYER_DEATH rl " rides " "'s rocket""#);
        let msg = fragfile
            .parse_message("Alice rides Bob's rocket\n")
            .unwrap()
            .unwrap();

        assert_eq!(msg.x, "Alice");
        assert_eq!(msg.y, "Bob");
    }

    #[test]
    fn test_metacharacters_match_literally() {
        let fragfile = load(r#"#DEFINE OBIT odd x "a.b(c)*""#);

        let msg = fragfile.parse_message("one a.b(c)* two").unwrap().unwrap();
        assert_eq!(msg.x, "one ");
        assert_eq!(msg.y, " two");

        assert!(fragfile.parse_message("one aXb(c) two").unwrap().is_none());
        assert!(fragfile.parse_message("one a.bccc two").unwrap().is_none());
        assert!(fragfile.parse_message("one a.bc two").unwrap().is_none());
    }

    #[test]
    fn test_no_match_is_not_an_error() {
        let fragfile = load("#DEFINE OBIT frag rl \" fragged \"\n");
        assert_eq!(fragfile.parse_message("Alice says hi").unwrap(), None);
        assert!(fragfile.parse_message("Alice fragged Bob").unwrap().is_some());
    }

    #[test]
    fn test_empty_fragfile_matches_nothing() {
        let fragfile = Fragfile::default();
        assert_eq!(fragfile.parse_message("anything").unwrap(), None);
        assert_eq!(fragfile.parse_flag_alert("anything").unwrap(), None);
    }

    #[test]
    fn test_first_definition_in_file_wins() {
        // "aaa" sorts before "zzz" but every template matches;
        // file order decides
        let fragfile = load(
            "#DEFINE OBIT zzz w1 \" died\"\n\
             #DEFINE OBIT aaa w2 \" died\"\n\
             #DEFINE OBIT zzz w3 \" died\"\n",
        );
        let msg = fragfile.parse_message("Alice died").unwrap().unwrap();
        assert_eq!(msg.kind, "zzz");
        assert_eq!(msg.weapon, "w1");
    }

    #[test]
    fn test_more_specific_template_first() {
        let fragfile = load(
            "#DEFINE OBIT PLAYER_DEATH rl \" rides \" \"'s rocket\"\n\
             #DEFINE OBIT PLAYER_DEATH gl \" eats \" \"'s pineapple\"\n",
        );
        let msg = fragfile
            .parse_message("Alice eats Bob's pineapple")
            .unwrap()
            .unwrap();
        assert_eq!(msg.weapon, "gl");
        assert_eq!(msg.x, "Alice");
        assert_eq!(msg.y, "Bob");
    }

    #[test]
    fn test_flag_alert() {
        let fragfile = load("#DEFINE FLAG_ALERT TOOK \" got the \"\n");
        let event = fragfile
            .parse_flag_alert("Alice got the RED flag")
            .unwrap()
            .unwrap();

        assert_eq!(event.player, "Alice");
        assert_eq!(event.detail, "RED flag");
        assert_eq!(event.kind, "TOOK");

        assert!(fragfile.parse_message("Alice got the RED flag").unwrap().is_none());
    }

    #[test]
    fn test_matcher_agrees_with_one_shot() {
        let fragfile = load(
            "#DEFINE OBIT PLAYER_DEATH rl \" rides \" \"'s rocket\"\n\
             #DEFINE OBIT PLAYER_SUICIDE rl \" becomes bored with life\"\n\
             #DEFINE FLAG_MSG CAPTURED \" captured the \"\n",
        );
        let matcher = Matcher::new(&fragfile).unwrap();
        assert_eq!(matcher.len(), 3);

        for message in [
            "Alice rides Bob's rocket",
            "Carol becomes bored with life",
            "Dave captured the flag",
            "unrelated chatter",
        ] {
            assert_eq!(
                matcher.parse_message(message),
                fragfile.parse_message(message).unwrap()
            );
            assert_eq!(
                matcher.parse_flag_alert(message),
                fragfile.parse_flag_alert(message).unwrap()
            );
        }
    }

    #[test]
    fn test_invalid_pattern_reported() {
        // Templates are always escaped on load; build one by hand to
        // exercise the compile failure path
        let mut fragfile = Fragfile::default();
        fragfile.obituaries.push(Obituary {
            kind: "bad".to_string(),
            weapon: "x".to_string(),
            message1: "(unclosed".to_string(),
            message2: None,
        });

        let err = fragfile.parse_message("anything").unwrap_err();
        match err {
            FragfileError::PatternCompilation { pattern, .. } => {
                assert_eq!(pattern, "(.*)(unclosed(.*)");
            }
            other => panic!("expected PatternCompilation, got {:?}", other),
        }
        assert!(Matcher::new(&fragfile).is_err());
    }

    #[test]
    fn test_matcher_is_shareable() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<Matcher<'static>>();
        assert_sync::<Fragfile>();
    }
}
