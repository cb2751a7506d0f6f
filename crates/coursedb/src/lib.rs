//! Comment and rating engine for a course catalog.
//!
//! Courses are stored as single documents with their comments embedded in
//! order. The components here mutate that comment list, keep the derived
//! `courseRating`/`ratingCount` pair converged on the comment contents, and
//! answer literal search and tie-preserving extremal queries. Everything
//! above (HTTP, sessions, ownership checks) and below (the wire protocol)
//! lives elsewhere; callers pass type-checked primitives in and get typed
//! records or a closed [`Error`] back.

mod catalog;
mod comments;
mod config;
mod error;
mod probe;
mod rating;
mod search;
mod stats;
mod store;

pub use catalog::Catalog;
pub use comments::CommentManager;
pub use config::Config;
pub use error::Error;
pub use probe::{HttpProbe, ImageProbe, ProbeError};
pub use rating::RatingAggregator;
pub use search::CourseSearch;
pub use stats::{CourseRanking, CourseStats, StatKind};
pub use store::{CourseStore, NewCourse};

pub use coursedb_common::{
    Comment, CommentId, Course, CourseFields, CourseId, Page, RatingPatch, UserId, ValidationError,
};
pub use coursedb_db::{CourseCollection, Database, DatabaseError, MemoryCollection};
