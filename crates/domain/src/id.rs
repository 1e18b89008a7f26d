//! Typed identifier newtypes backed by store string keys.
//!
//! Unlike synthetic UUIDs, these identifiers come from the shared store:
//! relay keys are assigned at device provisioning time and schedule keys are
//! generated by the store on insert. The newtypes only prevent mixing them up.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing store key.
            #[must_use]
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            /// Access the raw key.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(key: &str) -> Self {
                Self(key.to_string())
            }
        }

        impl From<String> for $name {
            fn from(key: String) -> Self {
                Self(key)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Unique identifier for a physical controller device.
    DeviceId
);

define_id!(
    /// Identifier for a [`Relay`](crate::relay::Relay), unique within a device.
    RelayId
);

define_id!(
    /// Store-generated identifier for a [`Schedule`](crate::schedule::Schedule).
    ScheduleId
);
