use coursedb_common::ValidationError;
use coursedb_db::DatabaseError;
use thiserror::Error;

/// Everything the engine can refuse or fail with. Ownership and role checks
/// live in the caller, so no permission variant exists here.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("course code {0} is already taken")]
    DuplicateCourseCode(String),
    #[error("no course {0}")]
    CourseNotFound(String),
    #[error("no comment {comment_id} on course {course_id}")]
    CommentNotFound {
        course_id: String,
        comment_id: String,
    },
    #[error("image at {url} could not be fetched: {reason}")]
    UnreachableImage { url: String, reason: String },
    #[error(transparent)]
    Storage(#[from] DatabaseError),
}
