//! Fragfile directive loader
//!
//! Fragfiles are line oriented, one directive per line:
//!
//! ```text
//! // comment
//! #FRAGFILE VERSION 2
//! #META     TITLE   "Default fragfile"
//! #DEFINE   WC      rl  "rocket launcher"  rl
//! #DEFINE   OBIT    PLAYER_DEATH  rl  " rides "  "'s rocket"
//! ```
//!
//! Loading never exits the process. What happens on a bad line is decided
//! by the caller through [`LoadPolicy`].

mod tokenize;


use std::borrow::Cow;
use std::fs;
use std::path::Path;

use encoding_rs::WINDOWS_1252;
use fragscan_types::{ErrorPolicy, LoadPolicy};
use memchr::memchr_iter;

use crate::error::{FragfileError, SchemaError};
use crate::rules::Fragfile;
use crate::schema::{self, COMMENT_MARKER, RecordKind};

pub use tokenize::tokenize;

/// Result alias for loader operations.
pub type Result<T> = std::result::Result<T, FragfileError>;

const INFO_DIRECTIVE: &str = "#FRAGFILE";
const META_DIRECTIVE: &str = "#META";
const DEFINE_DIRECTIVE: &str = "#DEFINE";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Loads fragfiles under a [`LoadPolicy`]
#[derive(Debug, Clone, Copy, Default)]
pub struct FragfileLoader {
    policy: LoadPolicy,
}

impl FragfileLoader {
    pub fn new(policy: LoadPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> LoadPolicy {
        self.policy
    }

    /// Read a whole file, then load its bytes
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Fragfile> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|e| FragfileError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        tracing::debug!(path = %path.display(), bytes = data.len(), "Read fragfile");
        self.load_bytes(&data)
    }

    /// Load fragfile source text
    pub fn load_bytes(&self, data: &[u8]) -> Result<Fragfile> {
        let mut fragfile = Fragfile::default();
        let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);

        for (index, raw) in split_lines(data).enumerate() {
            let line = index + 1;
            let text = decode_line(raw);

            let Err(err) = apply_line(&mut fragfile, line, &text) else {
                continue;
            };

            let policy = if err.is_define_error() {
                self.policy.define_errors
            } else {
                self.policy.malformed_lines
            };

            if !policy.is_recoverable() {
                return Err(err);
            }
            if policy == ErrorPolicy::Warn {
                tracing::warn!(line, error = %err, "Skipping fragfile line");
            } else {
                tracing::debug!(line, error = %err, "Skipping fragfile line");
            }
            fragfile.skipped_lines += 1;
        }

        tracing::info!(
            info = fragfile.info.len(),
            meta = fragfile.meta.len(),
            weapon_classes = fragfile.weapon_classes.len(),
            obituaries = fragfile.obituaries.len(),
            flag_alerts = fragfile.flag_alerts.len(),
            skipped = fragfile.skipped_lines,
            "Loaded fragfile"
        );

        Ok(fragfile)
    }
}

impl Fragfile {
    /// Load source text, aborting on the first bad line
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        FragfileLoader::default().load_bytes(data)
    }

    /// Load a file, aborting on the first bad line
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        FragfileLoader::default().load_file(path)
    }

    /// Build a record of the named kind and file it under its key
    fn define(
        &mut self,
        kind_name: &str,
        values: &[String],
    ) -> std::result::Result<RecordKind, SchemaError> {
        let kind = RecordKind::from_directive(kind_name)?;
        match kind {
            RecordKind::WeaponClass => {
                let record = schema::assign(kind_name, values)?;
                self.weapon_classes.push(record);
            }
            RecordKind::Obituary => {
                let record = schema::assign(kind_name, values)?;
                self.obituaries.push(record);
            }
            RecordKind::FlagAlert => {
                let record = schema::assign(kind_name, values)?;
                self.flag_alerts.push(record);
            }
        }
        Ok(kind)
    }
}

/// Apply one decoded line
///
/// Only lines whose first two characters are `//` are comments. An indented
/// `//` is tokenized like any other line and fails as an unknown directive.
fn apply_line(fragfile: &mut Fragfile, line: usize, text: &str) -> Result<()> {
    if text.starts_with(COMMENT_MARKER) {
        return Ok(());
    }

    let tokens = tokenize(text);
    let Some((directive, args)) = tokens.split_first() else {
        return Ok(());
    };

    match directive.as_str() {
        INFO_DIRECTIVE => {
            let (key, value) = metadata_pair(line, directive, args)?;
            fragfile.info.insert(key, value);
        }
        META_DIRECTIVE => {
            let (key, value) = metadata_pair(line, directive, args)?;
            fragfile.meta.insert(key, value);
        }
        DEFINE_DIRECTIVE => {
            let Some((kind_name, values)) = args.split_first() else {
                return Err(FragfileError::MissingArgument {
                    line,
                    directive: directive.clone(),
                });
            };
            let kind = fragfile
                .define(kind_name, values)
                .map_err(|source| FragfileError::Define { line, source })?;
            tracing::trace!(line, %kind, "Defined record");
        }
        _ => {
            return Err(FragfileError::UnrecognizedDirective {
                line,
                token: directive.clone(),
            });
        }
    }

    Ok(())
}

fn metadata_pair(line: usize, directive: &str, args: &[String]) -> Result<(String, String)> {
    match args {
        [key, value, ..] => Ok((key.clone(), value.clone())),
        _ => Err(FragfileError::MissingArgument {
            line,
            directive: directive.to_string(),
        }),
    }
}

/// Split on `\n`, dropping a trailing `\r` from each line
fn split_lines(data: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut start = 0;
    memchr_iter(b'\n', data)
        .chain(std::iter::once(data.len()))
        .map(move |end| {
            let line = &data[start..end];
            start = end + 1;
            line.strip_suffix(b"\r").unwrap_or(line)
        })
}

/// Decode one line of text: UTF-8 when valid, Windows-1252 otherwise
///
/// Messages matched against a loaded fragfile should be decoded the same
/// way so that high-bit bytes in templates and messages agree.
pub fn decode_line(raw: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(raw) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => WINDOWS_1252.decode(raw).0,
    }
}
