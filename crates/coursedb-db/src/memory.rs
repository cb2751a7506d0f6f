use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use coursedb_common::{
    Comment, CommentId, Course, CourseFields, CourseId, RatingPatch, Reaction, UserId,
};
use parking_lot::RwLock;

use crate::{CommentWrite, CourseCollection, DatabaseError};

/// In-process backend keyed by course id.
///
/// One lock around the course map gives every call the same
/// document-granular atomicity the positional update operators give the
/// MongoDB backend. Used by the test suite and for embedded runs.
#[derive(Default)]
pub struct MemoryCollection {
    courses: RwLock<BTreeMap<String, Course>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

fn react(comment: &mut Comment, user_id: &UserId, reaction: Reaction) {
    let (target, opposite) = match reaction {
        Reaction::Like => (&mut comment.likes, &mut comment.dislikes),
        Reaction::Dislike => (&mut comment.dislikes, &mut comment.likes),
    };
    if !target.contains(user_id) {
        target.push(user_id.clone());
    }
    opposite.retain(|u| u != user_id);
}

#[async_trait]
impl CourseCollection for MemoryCollection {
    async fn insert_course(&self, course: Course) -> Result<CourseId, DatabaseError> {
        let id = course.id.clone();
        self.courses
            .write()
            .insert(id.as_str().to_string(), course);
        Ok(id)
    }

    async fn course_by_id(&self, id: &CourseId) -> Result<Option<Course>, DatabaseError> {
        Ok(self.courses.read().get(id.as_str()).cloned())
    }

    async fn course_by_code(&self, code: &str) -> Result<Option<Course>, DatabaseError> {
        Ok(self
            .courses
            .read()
            .values()
            .find(|c| c.course_code.eq_ignore_ascii_case(code))
            .cloned())
    }

    async fn all_courses(&self) -> Result<Vec<Course>, DatabaseError> {
        Ok(self.courses.read().values().cloned().collect())
    }

    async fn list_courses(&self, skip: u64, limit: u64) -> Result<Vec<Course>, DatabaseError> {
        let mut courses: Vec<Course> = self.courses.read().values().cloned().collect();
        courses.sort_by(|a, b| a.course_code.cmp(&b.course_code));
        Ok(courses
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_courses(&self) -> Result<u64, DatabaseError> {
        Ok(self.courses.read().len() as u64)
    }

    async fn update_course_fields(
        &self,
        id: &CourseId,
        fields: &CourseFields,
        now: DateTime<Utc>,
    ) -> Result<bool, DatabaseError> {
        let mut courses = self.courses.write();
        match courses.get_mut(id.as_str()) {
            Some(course) => {
                course.admin_id = fields.admin_id.clone();
                course.course_code = fields.course_code.clone();
                course.course_name = fields.course_name.clone();
                course.course_description = fields.course_description.clone();
                course.meeting_time = fields.meeting_time.clone();
                course.img_link = fields.img_link.clone();
                course.professor = fields.professor.clone();
                course.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_course(&self, id: &CourseId) -> Result<bool, DatabaseError> {
        Ok(self.courses.write().remove(id.as_str()).is_some())
    }

    async fn push_comment(
        &self,
        course_id: &CourseId,
        comment: Comment,
    ) -> Result<bool, DatabaseError> {
        let mut courses = self.courses.write();
        match courses.get_mut(course_id.as_str()) {
            Some(course) => {
                course.comments.push(comment);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn edit_comment(
        &self,
        course_id: &CourseId,
        comment_id: &CommentId,
        text: &str,
        patch: RatingPatch,
        now: DateTime<Utc>,
    ) -> Result<CommentWrite, DatabaseError> {
        let mut courses = self.courses.write();
        let course = match courses.get_mut(course_id.as_str()) {
            Some(course) => course,
            None => return Ok(CommentWrite::CourseMissing),
        };
        let comment = match course.comments.iter_mut().find(|c| &c.id == comment_id) {
            Some(comment) => comment,
            None => return Ok(CommentWrite::CommentMissing),
        };
        comment.text = text.to_string();
        comment.updated_at = now;
        if let RatingPatch::Set(rating) = patch {
            comment.rating = rating;
        }
        Ok(CommentWrite::Applied(course.comments.clone()))
    }

    async fn remove_comment(
        &self,
        course_id: &CourseId,
        comment_id: &CommentId,
    ) -> Result<CommentWrite, DatabaseError> {
        let mut courses = self.courses.write();
        let course = match courses.get_mut(course_id.as_str()) {
            Some(course) => course,
            None => return Ok(CommentWrite::CourseMissing),
        };
        let before = course.comments.len();
        course.comments.retain(|c| &c.id != comment_id);
        if course.comments.len() == before {
            Ok(CommentWrite::CommentMissing)
        } else {
            Ok(CommentWrite::Applied(course.comments.clone()))
        }
    }

    async fn apply_reaction(
        &self,
        course_id: &CourseId,
        comment_id: &CommentId,
        user_id: &UserId,
        reaction: Reaction,
    ) -> Result<CommentWrite, DatabaseError> {
        let mut courses = self.courses.write();
        let course = match courses.get_mut(course_id.as_str()) {
            Some(course) => course,
            None => return Ok(CommentWrite::CourseMissing),
        };
        let comment = match course.comments.iter_mut().find(|c| &c.id == comment_id) {
            Some(comment) => comment,
            None => return Ok(CommentWrite::CommentMissing),
        };
        react(comment, user_id, reaction);
        Ok(CommentWrite::Applied(course.comments.clone()))
    }

    async fn set_rating_aggregate(
        &self,
        course_id: &CourseId,
        rating: Option<f64>,
        count: u32,
    ) -> Result<bool, DatabaseError> {
        let mut courses = self.courses.write();
        match courses.get_mut(course_id.as_str()) {
            Some(course) => {
                course.course_rating = rating;
                course.rating_count = count;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use coursedb_common::{Comment, Course, CourseFields, UserId};

    fn course(code: &str) -> Course {
        Course::new(
            CourseFields {
                admin_id: UserId::new("admin"),
                course_code: code.to_string(),
                course_name: format!("{} lecture", code),
                course_description: "desc".to_string(),
                meeting_time: "MW 10:00".to_string(),
                img_link: "https://example.com/a.jpg".to_string(),
                professor: "Jane Doe".to_string(),
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn reaction_is_one_step_and_exclusive() {
        let store = MemoryCollection::new();
        let mut c = course("CS-546");
        let comment = Comment::new(UserId::new("u1"), "nice".into(), None, Utc::now());
        let comment_id = comment.id.clone();
        c.comments.push(comment);
        let course_id = store.insert_course(c).await.unwrap();

        let user = UserId::new("u2");
        store
            .apply_reaction(&course_id, &comment_id, &user, Reaction::Like)
            .await
            .unwrap();
        let write = store
            .apply_reaction(&course_id, &comment_id, &user, Reaction::Dislike)
            .await
            .unwrap();

        let comments = match write {
            CommentWrite::Applied(comments) => comments,
            other => panic!("unexpected outcome: {:?}", other),
        };
        assert!(!comments[0].likes.contains(&user));
        assert_eq!(comments[0].dislikes, vec![user.clone()]);

        // repeating the winning reaction must not duplicate the entry
        let write = store
            .apply_reaction(&course_id, &comment_id, &user, Reaction::Dislike)
            .await
            .unwrap();
        if let CommentWrite::Applied(comments) = write {
            assert_eq!(comments[0].dislikes, vec![user]);
        }
    }

    #[tokio::test]
    async fn comment_writes_distinguish_missing_course_and_comment() {
        let store = MemoryCollection::new();
        let course_id = store.insert_course(course("CS-546")).await.unwrap();

        let ghost = CommentId::fresh();
        let write = store
            .remove_comment(&course_id, &ghost)
            .await
            .unwrap();
        assert!(matches!(write, CommentWrite::CommentMissing));

        let write = store
            .remove_comment(&CourseId::fresh(), &ghost)
            .await
            .unwrap();
        assert!(matches!(write, CommentWrite::CourseMissing));
    }

    #[tokio::test]
    async fn list_is_code_ordered() {
        let store = MemoryCollection::new();
        for code in ["EE-210", "CS-546", "BIO-110"] {
            store.insert_course(course(code)).await.unwrap();
        }
        let page = store.list_courses(0, 10).await.unwrap();
        let codes: Vec<_> = page.iter().map(|c| c.course_code.as_str()).collect();
        assert_eq!(codes, ["BIO-110", "CS-546", "EE-210"]);
    }
}
