//! Tri-state field for partial updates

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A field of a partial update.
///
/// `Absent` means "leave unchanged", `Null` is an explicit JSON `null` and
/// `Value` overwrites, even when the value is empty. Fields of this type
/// must carry `#[serde(default)]` so a missing key deserializes to
/// `Absent`, and `#[serde(skip_serializing_if = "Patch::is_absent")]` so
/// it serializes back to a missing key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    /// The value, if one was given
    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(opt: Option<T>) -> Patch<T> {
        match opt {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Into::into)
    }
}

impl<T> Serialize for Patch<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::Value(v) => v.serialize(serializer),
            // Absent is skipped by the containing struct
            Patch::Absent | Patch::Null => serializer.serialize_none(),
        }
    }
}
