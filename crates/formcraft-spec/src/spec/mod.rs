pub mod field;
pub mod form;
pub mod section;

use serde::{Deserialize, Deserializer};

pub use field::{FieldOption, FieldSpec, FieldType, OptionSpec};
pub use form::FormSpec;
pub use section::SectionSpec;

pub type FormId = i64;
pub type SectionId = i64;
pub type FieldId = i64;

/// Stored forms sometimes carry `null` where a list is expected.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
