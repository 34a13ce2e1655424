//! Serialize `Duration` values as whole milliseconds
//!
//! Use with `#[serde(with = "crate::utils::serde_millis")]` and the
//! `option` / `vec` submodules for wrapped values. Serialize only.

use std::time::Duration;

use serde::Serializer;

pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(as_millis(value))
}

fn as_millis(value: &Duration) -> u64 {
    u64::try_from(value.as_millis()).unwrap_or(u64::MAX)
}

pub mod option {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&super::as_millis(duration)),
            None => serializer.serialize_none(),
        }
    }
}

pub mod vec {
    use std::time::Duration;

    use serde::{ser::SerializeSeq, Serializer};

    pub fn serialize<S: Serializer>(values: &[Duration], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            seq.serialize_element(&super::as_millis(value))?;
        }
        seq.end()
    }
}
