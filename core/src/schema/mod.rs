//! Record schemas for `#DEFINE` directives
//!
//! Every record kind declares an ordered table of fields. A directive's
//! positional values are walked against that table:
//!
//! ```text
//! #DEFINE OBITUARY  PLAYER_DEATH  rl  " rides "  "'s rocket"
//!                   ────────────  ──  ─────────  ───────────
//!                   Type (key)    Weapon  Message1   Message2 (optional)
//! ```
//!
//! Template fields are regex-escaped on the way in so that message text is
//! always matched literally by the matcher.

mod records;

use serde::Serialize;

use crate::error::SchemaError;

pub use records::{FlagAlert, Obituary, WeaponClass};

/// Values starting with this marker end the directive
pub const COMMENT_MARKER: &str = "//";

// ═══════════════════════════════════════════════════════════════════════════
// Record Kinds
// ═══════════════════════════════════════════════════════════════════════════

/// The three kinds of record a fragfile can define
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    WeaponClass,
    Obituary,
    FlagAlert,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [Self::WeaponClass, Self::Obituary, Self::FlagAlert];

    /// Resolve a `#DEFINE` kind name, folding synonyms
    pub fn from_directive(name: &str) -> Result<Self, SchemaError> {
        match name {
            "WEAPON_CLASS" | "WC" => Ok(Self::WeaponClass),
            "OBITUARY" | "OBIT" => Ok(Self::Obituary),
            "FLAG_ALERT" | "FLAG_MSG" => Ok(Self::FlagAlert),
            _ => Err(SchemaError::UnknownDirective(name.to_string())),
        }
    }

    /// Canonical directive name
    pub fn directive_name(&self) -> &'static str {
        match self {
            Self::WeaponClass => "WEAPON_CLASS",
            Self::Obituary => "OBITUARY",
            Self::FlagAlert => "FLAG_ALERT",
        }
    }

    /// Ordered field list for this kind
    pub fn fields(&self) -> Vec<FieldInfo> {
        match self {
            Self::WeaponClass => describe::<WeaponClass>(),
            Self::Obituary => describe::<Obituary>(),
            Self::FlagAlert => describe::<FlagAlert>(),
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.directive_name())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Field Tables
// ═══════════════════════════════════════════════════════════════════════════

/// What a field is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRole {
    /// First field; also the group key of the record
    Key,
    /// Stored as written
    Plain,
    /// Message text, escaped to a literal pattern fragment
    Template,
}

/// One entry in a record's field table
pub struct Field<R> {
    pub name: &'static str,
    pub required: bool,
    pub role: FieldRole,
    set: fn(&mut R, String),
}

impl<R> Field<R> {
    pub const fn required(name: &'static str, role: FieldRole, set: fn(&mut R, String)) -> Self {
        Self {
            name,
            required: true,
            role,
            set,
        }
    }

    pub const fn optional(name: &'static str, role: FieldRole, set: fn(&mut R, String)) -> Self {
        Self {
            name,
            required: false,
            role,
            set,
        }
    }

    fn info(&self) -> FieldInfo {
        FieldInfo {
            name: self.name,
            required: self.required,
            role: self.role,
        }
    }
}

/// Field table entry without the setter, for inspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldInfo {
    pub name: &'static str,
    pub required: bool,
    pub role: FieldRole,
}

/// A record type that can be built from `#DEFINE` values
pub trait Record: Default + 'static {
    const KIND: RecordKind;

    /// Ordered field table; the first entry is the key field
    const FIELDS: &'static [Field<Self>];

    /// Value of the key field
    fn key(&self) -> &str;
}

fn describe<R: Record>() -> Vec<FieldInfo> {
    R::FIELDS.iter().map(Field::info).collect()
}

/// Build a record from positional directive values
///
/// `directive` is the kind name as written in the file and is only used
/// for error reporting.
pub fn assign<R: Record>(directive: &str, values: &[String]) -> Result<R, SchemaError> {
    let mut record = R::default();

    for (index, field) in R::FIELDS.iter().enumerate() {
        let Some(value) = values.get(index) else {
            if field.required {
                return Err(SchemaError::MissingRequiredField {
                    field: field.name,
                    directive: directive.to_string(),
                    values: values.to_vec(),
                });
            }
            break;
        };

        let value = match field.role {
            FieldRole::Template => regex::escape(value),
            FieldRole::Key | FieldRole::Plain => value.clone(),
        };

        if value.starts_with(COMMENT_MARKER) {
            if field.required {
                return Err(SchemaError::RequiredFieldIsComment {
                    field: field.name,
                    directive: directive.to_string(),
                });
            }
            break;
        }

        (field.set)(&mut record, value);
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_kind_synonyms() {
        assert_eq!(RecordKind::from_directive("WEAPON_CLASS").unwrap(), RecordKind::WeaponClass);
        assert_eq!(RecordKind::from_directive("WC").unwrap(), RecordKind::WeaponClass);
        assert_eq!(RecordKind::from_directive("OBITUARY").unwrap(), RecordKind::Obituary);
        assert_eq!(RecordKind::from_directive("OBIT").unwrap(), RecordKind::Obituary);
        assert_eq!(RecordKind::from_directive("FLAG_ALERT").unwrap(), RecordKind::FlagAlert);
        assert_eq!(RecordKind::from_directive("FLAG_MSG").unwrap(), RecordKind::FlagAlert);
    }

    #[test]
    fn test_unknown_kind() {
        match RecordKind::from_directive("FOO") {
            Err(SchemaError::UnknownDirective(name)) => assert_eq!(name, "FOO"),
            other => panic!("expected UnknownDirective, got {:?}", other),
        }
        // Kind names are case sensitive
        assert!(RecordKind::from_directive("obit").is_err());
    }

    #[test]
    fn test_field_tables() {
        let names: Vec<_> = RecordKind::Obituary.fields().iter().map(|f| f.name).collect();
        assert_eq!(names, ["Type", "Weapon", "Message1", "Message2"]);

        let fields = RecordKind::WeaponClass.fields();
        assert_eq!(fields[0].role, FieldRole::Key);
        assert!(fields[1].required);
        assert!(!fields[2].required);

        let fields = RecordKind::FlagAlert.fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].role, FieldRole::Template);
    }

    #[test]
    fn test_missing_required_field() {
        let err = assign::<Obituary>("OBIT", &values(&["frag", "rl"])).unwrap_err();
        match err {
            SchemaError::MissingRequiredField {
                field,
                directive,
                values,
            } => {
                assert_eq!(field, "Message1");
                assert_eq!(directive, "OBIT");
                assert_eq!(values, ["frag", "rl"]);
            }
            other => panic!("expected MissingRequiredField, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_key_field() {
        let err = assign::<WeaponClass>("WC", &[]).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::MissingRequiredField { field: "Keyword", .. }
        ));
    }

    #[test]
    fn test_optional_fields_may_be_omitted() {
        let wc: WeaponClass = assign("WC", &values(&["rl", "rocket launcher"])).unwrap();
        assert_eq!(wc.keyword, "rl");
        assert_eq!(wc.name, "rocket launcher");
        assert_eq!(wc.short_name, None);
    }

    #[test]
    fn test_comment_in_required_field() {
        let err = assign::<Obituary>("OBITUARY", &values(&["frag", "//rl"])).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::RequiredFieldIsComment { field: "Weapon", .. }
        ));
    }

    #[test]
    fn test_comment_in_optional_field_halts() {
        let obit: Obituary = assign(
            "OBIT",
            &values(&["frag", "rl", " rides ", "// trailing", "ignored"]),
        )
        .unwrap();
        assert_eq!(obit.message1, " rides ");
        assert_eq!(obit.message2, None);
    }

    #[test]
    fn test_template_fields_escaped() {
        let obit: Obituary = assign("OBIT", &values(&["frag", "rl", "a.b(c)*", "[x]"])).unwrap();
        assert_eq!(obit.message1, r"a\.b\(c\)\*");
        assert_eq!(obit.message2.as_deref(), Some(r"\[x\]"));
        // Non-template fields are stored as written
        let obit: Obituary = assign("OBIT", &values(&["a.b", "c*", "x"])).unwrap();
        assert_eq!(obit.kind, "a.b");
        assert_eq!(obit.weapon, "c*");
    }

    #[test]
    fn test_extended_escapes_still_match_literally() {
        let obit: Obituary = assign("OBIT", &values(&["frag", "rl", " -#&~ "])).unwrap();
        assert_eq!(obit.message1, r" \-\#\&\~ ");

        let re = regex::Regex::new(&obit.message1).unwrap();
        assert!(re.is_match("a -#&~ b"));
    }

    #[test]
    fn test_extra_values_ignored() {
        let alert: FlagAlert =
            assign("FLAG_MSG", &values(&["TOOK", " got the flag", "extra", "more"])).unwrap();
        assert_eq!(alert.kind, "TOOK");
        assert_eq!(alert.message1, " got the flag");
    }
}
