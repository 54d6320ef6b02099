pub mod user;
pub mod announcement;
pub mod course;
pub mod partner;
pub mod portal_link;

pub use user::*;
pub use announcement::*;
pub use course::*;
pub use partner::*;
pub use portal_link::*;

use serde::{Deserialize, Deserializer};

/// Lets `Option<Option<T>>` fields tell "absent" apart from an explicit `null`.
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}
