use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Comment, CommentId, CourseId, UserId};

/// A catalog entry with scalar metadata and an embedded, insertion-ordered
/// comment collection. One document per `course_code`, globally unique.
///
/// `course_rating` and `rating_count` are derived from the rating-bearing
/// subset of `comments` and are only ever written by the aggregator.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: CourseId,
    pub admin_id: UserId,
    pub course_code: String,
    pub course_name: String,
    pub course_description: String,
    pub meeting_time: String,
    pub img_link: String,
    pub professor: String,
    #[serde(default)]
    pub course_rating: Option<f64>,
    #[serde(default)]
    pub rating_count: u32,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// A new course with no comments and no derived rating yet.
    pub fn new(fields: CourseFields, now: DateTime<Utc>) -> Self {
        Course {
            id: CourseId::fresh(),
            admin_id: fields.admin_id,
            course_code: fields.course_code,
            course_name: fields.course_name,
            course_description: fields.course_description,
            meeting_time: fields.meeting_time,
            img_link: fields.img_link,
            professor: fields.professor,
            course_rating: None,
            rating_count: 0,
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn comment(&self, id: &CommentId) -> Option<&Comment> {
        self.comments.iter().find(|c| &c.id == id)
    }

    /// Comments carrying a numeric rating, the aggregator's input set.
    pub fn rated_comments(&self) -> impl Iterator<Item = &Comment> {
        self.comments.iter().filter(|c| c.has_rating())
    }

    /// Number of rating-bearing comments, not the raw comment count.
    pub fn review_count(&self) -> usize {
        self.rated_comments().count()
    }

    /// The derived rating with `None` treated as 0, the form ranking and
    /// display paths consume.
    pub fn effective_rating(&self) -> f64 {
        self.course_rating.unwrap_or(0.0)
    }
}

/// The validated scalar attributes of a course, shared by create and update.
#[derive(Clone, Debug)]
pub struct CourseFields {
    pub admin_id: UserId,
    pub course_code: String,
    pub course_name: String,
    pub course_description: String,
    pub meeting_time: String,
    pub img_link: String,
    pub professor: String,
}
