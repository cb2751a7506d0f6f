use std::sync::Arc;

use chrono::Utc;
use coursedb_common::{validate, Course, CourseFields, CourseId, Page, UserId};
use coursedb_db::CourseCollection;

use crate::{config::Config, probe::ImageProbe, Error};

/// Raw course attributes as the caller hands them over, before any
/// validation or normalization.
#[derive(Clone, Debug)]
pub struct NewCourse {
    pub admin_id: String,
    pub course_code: String,
    pub course_name: String,
    pub course_description: String,
    pub meeting_time: String,
    pub img_link: String,
    pub professor: String,
}

/// Course document lifecycle: create, read, page, update, delete.
///
/// Validation, the duplicate-code check and the image probe all run before
/// the storage write, so a refused call leaves no partial state behind.
pub struct CourseStore {
    collection: Arc<dyn CourseCollection>,
    probe: Arc<dyn ImageProbe>,
    config: Config,
}

impl CourseStore {
    pub fn new(
        collection: Arc<dyn CourseCollection>,
        probe: Arc<dyn ImageProbe>,
        config: Config,
    ) -> Self {
        CourseStore {
            collection,
            probe,
            config,
        }
    }

    pub async fn create(&self, input: NewCourse) -> Result<Course, Error> {
        let fields = self.admit(input, None).await?;
        let course = Course::new(fields, Utc::now());
        log::info!("creating course {} ({})", course.course_code, course.id);
        self.collection.insert_course(course.clone()).await?;
        Ok(course)
    }

    pub async fn get_by_id(&self, id: &CourseId) -> Result<Course, Error> {
        self.collection
            .course_by_id(id)
            .await?
            .ok_or_else(|| Error::CourseNotFound(id.to_string()))
    }

    /// Code-keyed lookup, case-insensitive.
    pub async fn get_by_code(&self, code: &str) -> Result<Course, Error> {
        self.collection
            .course_by_code(code.trim())
            .await?
            .ok_or_else(|| Error::CourseNotFound(code.trim().to_string()))
    }

    /// Code-ordered page of the whole catalog.
    pub async fn list(&self, page: i64, page_size: i64) -> Result<Page<Course>, Error> {
        let page = self.config.clamp_page(page);
        let page_size = self.config.clamp_page_size(page_size);
        let skip = u64::from(page - 1) * u64::from(page_size);
        let total = self.collection.count_courses().await?;
        let items = self
            .collection
            .list_courses(skip, u64::from(page_size))
            .await?;
        Ok(Page {
            page,
            page_size,
            total,
            items,
        })
    }

    /// Replaces the scalar attributes; comments and the derived rating pair
    /// stay as they are.
    pub async fn update(&self, id: &CourseId, input: NewCourse) -> Result<Course, Error> {
        let fields = self.admit(input, Some(id)).await?;
        let updated = self
            .collection
            .update_course_fields(id, &fields, Utc::now())
            .await?;
        if !updated {
            return Err(Error::CourseNotFound(id.to_string()));
        }
        self.get_by_id(id).await
    }

    /// Deletes the course and every embedded comment with it.
    pub async fn remove(&self, id: &CourseId) -> Result<(), Error> {
        if self.collection.delete_course(id).await? {
            log::info!("removed course {}", id);
            Ok(())
        } else {
            Err(Error::CourseNotFound(id.to_string()))
        }
    }

    /// Runs every pre-write check: field validation, duplicate course code
    /// (the course under `exempt` may keep its own code) and the image
    /// probe. Nothing is written here.
    async fn admit(
        &self,
        input: NewCourse,
        exempt: Option<&CourseId>,
    ) -> Result<CourseFields, Error> {
        let fields = validate::course_fields(CourseFields {
            admin_id: UserId::new(input.admin_id),
            course_code: input.course_code,
            course_name: input.course_name,
            course_description: input.course_description,
            meeting_time: input.meeting_time,
            img_link: input.img_link,
            professor: input.professor,
        })?;
        if let Some(existing) = self.collection.course_by_code(&fields.course_code).await? {
            if exempt != Some(&existing.id) {
                return Err(Error::DuplicateCourseCode(fields.course_code));
            }
        }
        self.probe
            .verify(&fields.img_link)
            .await
            .map_err(|err| Error::UnreachableImage {
                url: fields.img_link.clone(),
                reason: err.to_string(),
            })?;
        Ok(fields)
    }
}
