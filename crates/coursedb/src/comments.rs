use std::sync::Arc;

use chrono::Utc;
use coursedb_common::{validate, Comment, CommentId, CourseId, RatingPatch, Reaction};
use coursedb_db::{CommentWrite, CourseCollection};

use crate::{rating::RatingAggregator, Error};

/// Mutations on a course's embedded comment list.
///
/// Comments are always addressed by id. Every rating-affecting mutation
/// triggers an eager aggregate recompute; the recompute is idempotent, so a
/// concurrent interleaving at worst produces a stale value the next trigger
/// overwrites.
pub struct CommentManager {
    collection: Arc<dyn CourseCollection>,
    aggregator: RatingAggregator,
}

fn written(
    write: CommentWrite,
    course_id: &CourseId,
    comment_id: &CommentId,
) -> Result<Vec<Comment>, Error> {
    match write {
        CommentWrite::Applied(comments) => Ok(comments),
        CommentWrite::CourseMissing => Err(Error::CourseNotFound(course_id.to_string())),
        CommentWrite::CommentMissing => Err(Error::CommentNotFound {
            course_id: course_id.to_string(),
            comment_id: comment_id.to_string(),
        }),
    }
}

impl CommentManager {
    pub fn new(collection: Arc<dyn CourseCollection>, aggregator: RatingAggregator) -> Self {
        CommentManager {
            collection,
            aggregator,
        }
    }

    /// Appends a fresh comment. The new comment starts with empty reaction
    /// sets and `created_at == updated_at`.
    pub async fn create_comment(
        &self,
        course_id: &CourseId,
        user_id: &str,
        text: &str,
        rating: Option<u8>,
    ) -> Result<Comment, Error> {
        let user_id = validate::user_id("userId", user_id)?;
        let text = validate::comment_text(text)?;
        let rating = validate::rating(rating)?;
        let comment = Comment::new(user_id, text, rating, Utc::now());
        let pushed = self
            .collection
            .push_comment(course_id, comment.clone())
            .await?;
        if !pushed {
            return Err(Error::CourseNotFound(course_id.to_string()));
        }
        if comment.has_rating() {
            self.aggregator.recompute(course_id).await?;
        }
        Ok(comment)
    }

    /// Rewrites a comment's text and, when the patch says so, its rating.
    /// `RatingPatch::Keep` never touches the stored rating.
    pub async fn update_comment(
        &self,
        course_id: &CourseId,
        comment_id: &CommentId,
        text: &str,
        patch: RatingPatch,
    ) -> Result<Vec<Comment>, Error> {
        let text = validate::comment_text(text)?;
        let patch = match patch {
            RatingPatch::Keep => RatingPatch::Keep,
            RatingPatch::Set(rating) => RatingPatch::Set(validate::rating(rating)?),
        };
        let write = self
            .collection
            .edit_comment(course_id, comment_id, &text, patch, Utc::now())
            .await?;
        let comments = written(write, course_id, comment_id)?;
        if patch.touches_rating() {
            self.aggregator.recompute(course_id).await?;
        }
        Ok(comments)
    }

    pub async fn like_comment(
        &self,
        course_id: &CourseId,
        comment_id: &CommentId,
        user_id: &str,
    ) -> Result<Vec<Comment>, Error> {
        self.react(course_id, comment_id, user_id, Reaction::Like)
            .await
    }

    pub async fn dislike_comment(
        &self,
        course_id: &CourseId,
        comment_id: &CommentId,
        user_id: &str,
    ) -> Result<Vec<Comment>, Error> {
        self.react(course_id, comment_id, user_id, Reaction::Dislike)
            .await
    }

    async fn react(
        &self,
        course_id: &CourseId,
        comment_id: &CommentId,
        user_id: &str,
        reaction: Reaction,
    ) -> Result<Vec<Comment>, Error> {
        let user_id = validate::user_id("userId", user_id)?;
        let write = self
            .collection
            .apply_reaction(course_id, comment_id, &user_id, reaction)
            .await?;
        written(write, course_id, comment_id)
    }

    /// Removes one comment and re-derives the aggregate, whether or not the
    /// removed comment carried a rating.
    pub async fn delete_comment(
        &self,
        course_id: &CourseId,
        comment_id: &CommentId,
    ) -> Result<(), Error> {
        let write = self.collection.remove_comment(course_id, comment_id).await?;
        written(write, course_id, comment_id)?;
        self.aggregator.recompute(course_id).await?;
        Ok(())
    }

    pub async fn get_comment(
        &self,
        course_id: &CourseId,
        comment_id: &CommentId,
    ) -> Result<Comment, Error> {
        let course = self
            .collection
            .course_by_id(course_id)
            .await?
            .ok_or_else(|| Error::CourseNotFound(course_id.to_string()))?;
        course
            .comment(comment_id)
            .cloned()
            .ok_or_else(|| Error::CommentNotFound {
                course_id: course_id.to_string(),
                comment_id: comment_id.to_string(),
            })
    }

    /// The embedded sequence in insertion order.
    pub async fn comments_for_course(&self, course_id: &CourseId) -> Result<Vec<Comment>, Error> {
        let course = self
            .collection
            .course_by_id(course_id)
            .await?
            .ok_or_else(|| Error::CourseNotFound(course_id.to_string()))?;
        Ok(course.comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use coursedb_common::{Course, CourseFields, UserId};
    use coursedb_db::MemoryCollection;

    struct Fixture {
        collection: Arc<MemoryCollection>,
        manager: CommentManager,
    }

    impl Fixture {
        fn new() -> Self {
            let collection = Arc::new(MemoryCollection::new());
            let aggregator = RatingAggregator::new(collection.clone());
            let manager = CommentManager::new(collection.clone(), aggregator);
            Fixture {
                collection,
                manager,
            }
        }

        async fn seed_course(&self) -> CourseId {
            let course = Course::new(
                CourseFields {
                    admin_id: UserId::new("admin"),
                    course_code: "CS-546".to_string(),
                    course_name: "Web Programming".to_string(),
                    course_description: "desc".to_string(),
                    meeting_time: "MW 10:00".to_string(),
                    img_link: "https://example.com/a.jpg".to_string(),
                    professor: "Jane Doe".to_string(),
                },
                Utc::now(),
            );
            self.collection.insert_course(course).await.unwrap()
        }

        async fn course(&self, id: &CourseId) -> Course {
            self.collection.course_by_id(id).await.unwrap().unwrap()
        }
    }

    #[tokio::test]
    async fn rated_comment_updates_the_aggregate() {
        let fx = Fixture::new();
        let course_id = fx.seed_course().await;

        fx.manager
            .create_comment(&course_id, "u1", "solid", Some(4))
            .await
            .unwrap();
        fx.manager
            .create_comment(&course_id, "u2", "meh", Some(2))
            .await
            .unwrap();
        fx.manager
            .create_comment(&course_id, "u3", "no rating", None)
            .await
            .unwrap();

        let course = fx.course(&course_id).await;
        assert!((course.course_rating.unwrap() - 3.0).abs() < 1e-9);
        assert_eq!(course.rating_count, 2);
        assert_eq!(course.comments.len(), 3);
    }

    #[tokio::test]
    async fn create_rejects_invalid_input_without_writing() {
        let fx = Fixture::new();
        let course_id = fx.seed_course().await;

        assert!(matches!(
            fx.manager
                .create_comment(&course_id, "u1", "   ", None)
                .await
                .unwrap_err(),
            Error::Validation(_)
        ));
        assert!(matches!(
            fx.manager
                .create_comment(&course_id, "u1", "text", Some(6))
                .await
                .unwrap_err(),
            Error::Validation(_)
        ));
        assert!(fx.course(&course_id).await.comments.is_empty());
    }

    #[tokio::test]
    async fn keep_patch_preserves_rating_and_set_none_clears_it() {
        let fx = Fixture::new();
        let course_id = fx.seed_course().await;
        let comment = fx
            .manager
            .create_comment(&course_id, "u1", "solid", Some(4))
            .await
            .unwrap();

        fx.manager
            .update_comment(&course_id, &comment.id, "edited", RatingPatch::Keep)
            .await
            .unwrap();
        let course = fx.course(&course_id).await;
        assert_eq!(course.comments[0].text, "edited");
        assert_eq!(course.comments[0].rating, Some(4));
        assert_eq!(course.course_rating, Some(4.0));

        fx.manager
            .update_comment(&course_id, &comment.id, "edited again", RatingPatch::Set(None))
            .await
            .unwrap();
        let course = fx.course(&course_id).await;
        assert_eq!(course.comments[0].rating, None);
        assert_eq!(course.course_rating, None);
        assert_eq!(course.rating_count, 0);
        // the id survives every edit
        assert_eq!(course.comments[0].id, comment.id);
    }

    #[tokio::test]
    async fn delete_recomputes_even_for_unrated_comments() {
        let fx = Fixture::new();
        let course_id = fx.seed_course().await;
        let rated = fx
            .manager
            .create_comment(&course_id, "u1", "solid", Some(4))
            .await
            .unwrap();
        fx.manager
            .create_comment(&course_id, "u2", "note", None)
            .await
            .unwrap();

        fx.manager
            .delete_comment(&course_id, &rated.id)
            .await
            .unwrap();
        let course = fx.course(&course_id).await;
        assert_eq!(course.comments.len(), 1);
        assert_eq!(course.course_rating, None);
        assert_eq!(course.rating_count, 0);
    }

    #[tokio::test]
    async fn reactions_stay_mutually_exclusive() {
        let fx = Fixture::new();
        let course_id = fx.seed_course().await;
        let comment = fx
            .manager
            .create_comment(&course_id, "u1", "solid", None)
            .await
            .unwrap();

        fx.manager
            .like_comment(&course_id, &comment.id, "u2")
            .await
            .unwrap();
        let comments = fx
            .manager
            .dislike_comment(&course_id, &comment.id, "u2")
            .await
            .unwrap();
        assert!(comments[0].likes.is_empty());
        assert_eq!(comments[0].dislikes, vec![UserId::new("u2")]);
    }

    #[tokio::test]
    async fn missing_course_and_comment_are_distinct_errors() {
        let fx = Fixture::new();
        let course_id = fx.seed_course().await;
        let ghost = CommentId::fresh();

        assert!(matches!(
            fx.manager
                .get_comment(&course_id, &ghost)
                .await
                .unwrap_err(),
            Error::CommentNotFound { .. }
        ));
        assert!(matches!(
            fx.manager
                .get_comment(&CourseId::fresh(), &ghost)
                .await
                .unwrap_err(),
            Error::CourseNotFound(_)
        ));
        assert!(matches!(
            fx.manager
                .update_comment(&course_id, &ghost, "text", RatingPatch::Keep)
                .await
                .unwrap_err(),
            Error::CommentNotFound { .. }
        ));
    }
}
