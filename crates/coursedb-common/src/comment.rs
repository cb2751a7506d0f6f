use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CommentId, UserId};

/// A user-authored note embedded in a course document. Comments have no
/// existence outside their parent course.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub user_id: UserId,
    pub text: String,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub likes: Vec<UserId>,
    #[serde(default)]
    pub dislikes: Vec<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(user_id: UserId, text: String, rating: Option<u8>, now: DateTime<Utc>) -> Self {
        Comment {
            id: CommentId::fresh(),
            user_id,
            text,
            rating,
            likes: Vec::new(),
            dislikes: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this comment contributes to the derived course rating.
    pub fn has_rating(&self) -> bool {
        matches!(self.rating, Some(1..=5))
    }
}

/// Rating change requested alongside a text edit. `Keep` leaves the stored
/// rating untouched; `Set(None)` explicitly clears it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RatingPatch {
    Keep,
    Set(Option<u8>),
}

impl RatingPatch {
    pub fn touches_rating(&self) -> bool {
        !matches!(self, RatingPatch::Keep)
    }
}

/// A like or dislike on a comment. Applying one always clears the same
/// user's membership in the opposite set in the same storage step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reaction {
    Like,
    Dislike,
}
