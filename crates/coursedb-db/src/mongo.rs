use async_trait::async_trait;
use bson::{doc, Bson, Document};
use chrono::{DateTime, Utc};
use coursedb_common::{
    Comment, CommentId, Course, CourseFields, CourseId, RatingPatch, Reaction, UserId,
};
use futures::TryStreamExt;
use mongodb::{
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
    Client, Collection, IndexModel,
};

use crate::{collections::Collections, CommentWrite, CourseCollection, DatabaseError};

/// MongoDB backend. One collection of course documents, comments embedded.
pub struct Database {
    courses: Collection<Document>,
}

impl Database {
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, DatabaseError> {
        log::info!("connecting to database at {}", uri);
        let client = Client::with_uri_str(uri).await?;
        Ok(Self::new(&client, db_name))
    }

    pub fn new(client: &Client, db_name: &str) -> Self {
        let courses = client
            .database(db_name)
            .collection(Collections::Courses.as_str());
        Database { courses }
    }

    /// Backstop for the application-level duplicate check.
    pub async fn ensure_indexes(&self) -> Result<(), DatabaseError> {
        let index = IndexModel::builder()
            .keys(doc! { "courseCode": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.courses.create_index(index, None).await?;
        Ok(())
    }

    fn id_filter(id: &CourseId) -> Document {
        doc! { "_id": id.as_str() }
    }

    fn comment_filter(course_id: &CourseId, comment_id: &CommentId) -> Document {
        doc! { "_id": course_id.as_str(), "comments.id": comment_id.as_str() }
    }

    fn to_course(document: Document) -> Result<Course, DatabaseError> {
        Ok(bson::from_document(document)?)
    }

    /// A comment-addressed update matched nothing. Decide which half of the
    /// address was missing.
    async fn missing_kind(&self, course_id: &CourseId) -> Result<CommentWrite, DatabaseError> {
        match self.course_by_id(course_id).await? {
            Some(_) => Ok(CommentWrite::CommentMissing),
            None => Ok(CommentWrite::CourseMissing),
        }
    }

    async fn comment_update(
        &self,
        filter: Document,
        update: Document,
        course_id: &CourseId,
    ) -> Result<CommentWrite, DatabaseError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        match self
            .courses
            .find_one_and_update(filter, update, options)
            .await?
        {
            Some(document) => {
                let course = Self::to_course(document)?;
                Ok(CommentWrite::Applied(course.comments))
            }
            None => self.missing_kind(course_id).await,
        }
    }
}

#[async_trait]
impl CourseCollection for Database {
    async fn insert_course(&self, course: Course) -> Result<CourseId, DatabaseError> {
        let id = course.id.clone();
        let document = bson::to_document(&course)?;
        self.courses.insert_one(document, None).await?;
        Ok(id)
    }

    async fn course_by_id(&self, id: &CourseId) -> Result<Option<Course>, DatabaseError> {
        match self.courses.find_one(Self::id_filter(id), None).await? {
            Some(document) => Ok(Some(Self::to_course(document)?)),
            None => Ok(None),
        }
    }

    async fn course_by_code(&self, code: &str) -> Result<Option<Course>, DatabaseError> {
        let filter = doc! {
            "courseCode": Bson::RegularExpression(bson::Regex {
                pattern: format!("^{}$", regex::escape(code)),
                options: "i".to_string(),
            })
        };
        match self.courses.find_one(filter, None).await? {
            Some(document) => Ok(Some(Self::to_course(document)?)),
            None => Ok(None),
        }
    }

    async fn all_courses(&self) -> Result<Vec<Course>, DatabaseError> {
        let mut cursor = self.courses.find(None, None).await?;
        let mut courses = vec![];
        while let Some(document) = cursor.try_next().await? {
            courses.push(Self::to_course(document)?);
        }
        Ok(courses)
    }

    async fn list_courses(&self, skip: u64, limit: u64) -> Result<Vec<Course>, DatabaseError> {
        let options = FindOptions::builder()
            .sort(doc! { "courseCode": 1 })
            .skip(skip)
            .limit(limit as i64)
            .build();
        let mut cursor = self.courses.find(None, options).await?;
        let mut courses = vec![];
        while let Some(document) = cursor.try_next().await? {
            courses.push(Self::to_course(document)?);
        }
        Ok(courses)
    }

    async fn count_courses(&self) -> Result<u64, DatabaseError> {
        Ok(self.courses.count_documents(None, None).await?)
    }

    async fn update_course_fields(
        &self,
        id: &CourseId,
        fields: &CourseFields,
        now: DateTime<Utc>,
    ) -> Result<bool, DatabaseError> {
        let update = doc! {
            "$set": {
                "adminId": fields.admin_id.as_str(),
                "courseCode": &fields.course_code,
                "courseName": &fields.course_name,
                "courseDescription": &fields.course_description,
                "meetingTime": &fields.meeting_time,
                "imgLink": &fields.img_link,
                "professor": &fields.professor,
                "updatedAt": bson::to_bson(&now)?,
            }
        };
        let result = self
            .courses
            .update_one(Self::id_filter(id), update, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_course(&self, id: &CourseId) -> Result<bool, DatabaseError> {
        let result = self.courses.delete_one(Self::id_filter(id), None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn push_comment(
        &self,
        course_id: &CourseId,
        comment: Comment,
    ) -> Result<bool, DatabaseError> {
        let update = doc! {
            "$push": { "comments": bson::to_bson(&comment)? }
        };
        let result = self
            .courses
            .update_one(Self::id_filter(course_id), update, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn edit_comment(
        &self,
        course_id: &CourseId,
        comment_id: &CommentId,
        text: &str,
        patch: RatingPatch,
        now: DateTime<Utc>,
    ) -> Result<CommentWrite, DatabaseError> {
        let mut set = doc! {
            "comments.$.text": text,
            "comments.$.updatedAt": bson::to_bson(&now)?,
        };
        if let RatingPatch::Set(rating) = patch {
            let value = match rating {
                Some(rating) => Bson::Int32(rating as i32),
                None => Bson::Null,
            };
            set.insert("comments.$.rating", value);
        }
        self.comment_update(
            Self::comment_filter(course_id, comment_id),
            doc! { "$set": set },
            course_id,
        )
        .await
    }

    async fn remove_comment(
        &self,
        course_id: &CourseId,
        comment_id: &CommentId,
    ) -> Result<CommentWrite, DatabaseError> {
        // The filter requires the comment to exist so a matched course with
        // no such comment falls through to the missing lookup.
        self.comment_update(
            Self::comment_filter(course_id, comment_id),
            doc! { "$pull": { "comments": { "id": comment_id.as_str() } } },
            course_id,
        )
        .await
    }

    async fn apply_reaction(
        &self,
        course_id: &CourseId,
        comment_id: &CommentId,
        user_id: &UserId,
        reaction: Reaction,
    ) -> Result<CommentWrite, DatabaseError> {
        let (target, opposite) = match reaction {
            Reaction::Like => ("comments.$.likes", "comments.$.dislikes"),
            Reaction::Dislike => ("comments.$.dislikes", "comments.$.likes"),
        };
        // Single update document: the add and the opposite-set removal land
        // in the same atomic write.
        let update = doc! {
            "$addToSet": { (target): user_id.as_str() },
            "$pull": { (opposite): user_id.as_str() },
        };
        self.comment_update(
            Self::comment_filter(course_id, comment_id),
            update,
            course_id,
        )
        .await
    }

    async fn set_rating_aggregate(
        &self,
        course_id: &CourseId,
        rating: Option<f64>,
        count: u32,
    ) -> Result<bool, DatabaseError> {
        let update = doc! {
            "$set": {
                "courseRating": rating.map(Bson::Double).unwrap_or(Bson::Null),
                "ratingCount": count as i32,
            }
        };
        let result = self
            .courses
            .update_one(Self::id_filter(course_id), update, None)
            .await?;
        Ok(result.matched_count > 0)
    }
}
