//! Storage abstraction for the course catalog.
//!
//! Course documents are the unit of isolation: every trait method below is
//! one atomic single-document operation, so two concurrent mutations on the
//! same course never interleave into a corrupted comment array. Comments
//! are always addressed by id, never by array index.

mod collections;
mod error;
mod memory;
mod mongo;

pub use error::DatabaseError;
pub use memory::MemoryCollection;
pub use mongo::Database;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use coursedb_common::{
    Comment, CommentId, Course, CourseFields, CourseId, RatingPatch, Reaction, UserId,
};

/// Outcome of a comment-addressed write, so callers can raise the precise
/// not-found error without a second lookup on the success path.
#[derive(Clone, Debug)]
pub enum CommentWrite {
    /// The write applied; carries the post-mutation comment list.
    Applied(Vec<Comment>),
    CourseMissing,
    CommentMissing,
}

/// One collection of course documents with embedded comments.
///
/// Implementations must make each method atomic at document granularity.
/// `apply_reaction` in particular performs the add-to-target and
/// remove-from-opposite in the same step; there is no observable state
/// where a user sits in both sets.
#[async_trait]
pub trait CourseCollection: Send + Sync {
    /// Inserts a fully-formed course. Uniqueness of the course code is the
    /// caller's check; backends may additionally enforce it with an index.
    async fn insert_course(&self, course: Course) -> Result<CourseId, DatabaseError>;

    async fn course_by_id(&self, id: &CourseId) -> Result<Option<Course>, DatabaseError>;

    /// Case-insensitive exact lookup by course code.
    async fn course_by_code(&self, code: &str) -> Result<Option<Course>, DatabaseError>;

    /// Full scan, for the read-only search and stats paths.
    async fn all_courses(&self) -> Result<Vec<Course>, DatabaseError>;

    /// Code-ordered page scan.
    async fn list_courses(&self, skip: u64, limit: u64) -> Result<Vec<Course>, DatabaseError>;

    async fn count_courses(&self) -> Result<u64, DatabaseError>;

    /// Replaces the validated scalar attributes, leaving comments and the
    /// derived rating fields untouched. Returns false when the course is
    /// missing.
    async fn update_course_fields(
        &self,
        id: &CourseId,
        fields: &CourseFields,
        now: DateTime<Utc>,
    ) -> Result<bool, DatabaseError>;

    /// Deletes the course document and, with it, every embedded comment.
    async fn delete_course(&self, id: &CourseId) -> Result<bool, DatabaseError>;

    /// Appends a comment to the embedded array. Returns false when the
    /// course is missing.
    async fn push_comment(&self, course_id: &CourseId, comment: Comment)
        -> Result<bool, DatabaseError>;

    /// Id-addressed update of one comment's text, `updated_at` and,
    /// depending on the patch, its rating.
    async fn edit_comment(
        &self,
        course_id: &CourseId,
        comment_id: &CommentId,
        text: &str,
        patch: RatingPatch,
        now: DateTime<Utc>,
    ) -> Result<CommentWrite, DatabaseError>;

    /// Id-addressed removal of one comment.
    async fn remove_comment(
        &self,
        course_id: &CourseId,
        comment_id: &CommentId,
    ) -> Result<CommentWrite, DatabaseError>;

    /// Adds the user to the reaction's target set and removes them from the
    /// opposite set in one atomic step.
    async fn apply_reaction(
        &self,
        course_id: &CourseId,
        comment_id: &CommentId,
        user_id: &UserId,
        reaction: Reaction,
    ) -> Result<CommentWrite, DatabaseError>;

    /// Persists the derived rating pair. Returns false when the course is
    /// missing (deleted between mutation and recompute, which is fine).
    async fn set_rating_aggregate(
        &self,
        course_id: &CourseId,
        rating: Option<f64>,
        count: u32,
    ) -> Result<bool, DatabaseError>;
}
