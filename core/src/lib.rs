pub mod error;
pub mod loader;
pub mod matcher;
pub mod rules;
pub mod schema;

// Re-exports for convenience
pub use error::{FragfileError, SchemaError};
pub use loader::{FragfileLoader, decode_line};
pub use matcher::{FlagEvent, FragMessage, Matcher};
pub use rules::{Fragfile, RuleGroup};
pub use schema::{FlagAlert, Obituary, RecordKind, WeaponClass};
pub use fragscan_types::{ErrorPolicy, LoadPolicy};
