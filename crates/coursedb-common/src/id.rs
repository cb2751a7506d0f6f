use std::fmt;

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

macro_rules! opaque_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                $name(id.into())
            }

            /// A fresh, never-reused identifier.
            pub fn fresh() -> Self {
                $name(ObjectId::new().to_hex())
            }

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
            fn from(id: &str) -> Self {
                $name(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                $name(id)
            }
        }
    };
}

opaque_id!(
    /// Identifier of a course document. Stable for the document's lifetime;
    /// the engine never interprets its contents.
    CourseId
);

opaque_id!(
    /// Identifier of a comment within its course. Assigned once at creation
    /// and stable across edits and reordering.
    CommentId
);

opaque_id!(
    /// Reference to a comment author. Used for equality checks only; the
    /// engine performs no ownership decisions with it.
    UserId
);
