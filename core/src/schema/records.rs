//! Record types defined by fragfiles

use serde::Serialize;

use super::{Field, FieldRole, Record, RecordKind};

/// A weapon class: `#DEFINE WEAPON_CLASS <keyword> <name> [short name]`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct WeaponClass {
    pub keyword: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
}

impl WeaponClass {
    /// Short name if set, full name otherwise
    pub fn display_name(&self) -> &str {
        self.short_name.as_deref().unwrap_or(&self.name)
    }
}

impl Record for WeaponClass {
    const KIND: RecordKind = RecordKind::WeaponClass;
    const FIELDS: &'static [Field<Self>] = &[
        Field::<Self>::required("Keyword", FieldRole::Key, |r, v| r.keyword = v),
        Field::<Self>::required("Name", FieldRole::Plain, |r, v| r.name = v),
        Field::<Self>::optional("ShortName", FieldRole::Plain, |r, v| r.short_name = Some(v)),
    ];

    fn key(&self) -> &str {
        &self.keyword
    }
}

/// A kill-message template: `#DEFINE OBITUARY <type> <weapon> <msg1> [msg2]`
///
/// `message1` and `message2` hold regex-escaped text, so dumps show them
/// escaped. `regex::escape` also escapes `#`, `&`, `-` and `~` (`a-b` is
/// stored as `a\-b`); the escaped form still matches the literal text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Obituary {
    #[serde(rename = "type")]
    pub kind: String,
    pub weapon: String,
    pub message1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message2: Option<String>,
}

impl Obituary {
    /// Second literal, if one was given and is non-empty
    pub fn second_literal(&self) -> Option<&str> {
        self.message2.as_deref().filter(|m| !m.is_empty())
    }
}

impl Record for Obituary {
    const KIND: RecordKind = RecordKind::Obituary;
    const FIELDS: &'static [Field<Self>] = &[
        Field::<Self>::required("Type", FieldRole::Key, |r, v| r.kind = v),
        Field::<Self>::required("Weapon", FieldRole::Plain, |r, v| r.weapon = v),
        Field::<Self>::required("Message1", FieldRole::Template, |r, v| r.message1 = v),
        Field::<Self>::optional("Message2", FieldRole::Template, |r, v| r.message2 = Some(v)),
    ];

    fn key(&self) -> &str {
        &self.kind
    }
}

/// A flag event template: `#DEFINE FLAG_ALERT <type> <msg1>`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FlagAlert {
    #[serde(rename = "type")]
    pub kind: String,
    pub message1: String,
}

impl Record for FlagAlert {
    const KIND: RecordKind = RecordKind::FlagAlert;
    const FIELDS: &'static [Field<Self>] = &[
        Field::<Self>::required("Type", FieldRole::Key, |r, v| r.kind = v),
        Field::<Self>::required("Message1", FieldRole::Template, |r, v| r.message1 = v),
    ];

    fn key(&self) -> &str {
        &self.kind
    }
}
