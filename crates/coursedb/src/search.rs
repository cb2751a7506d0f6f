use std::sync::Arc;

use coursedb_common::{Course, Page};
use coursedb_db::CourseCollection;
use regex::RegexBuilder;

use crate::{config::Config, Error};

/// Literal substring search over course code, name and professor.
pub struct CourseSearch {
    collection: Arc<dyn CourseCollection>,
    config: Config,
}

impl CourseSearch {
    pub fn new(collection: Arc<dyn CourseCollection>, config: Config) -> Self {
        CourseSearch { collection, config }
    }

    /// Case-insensitive match of the pattern taken literally. The pattern is
    /// escaped before compilation, so `+`, `%`, `.` and friends only ever
    /// match themselves. A blank pattern matches every course. Results are
    /// code-ordered; `total` counts all matches before pagination.
    pub async fn find_courses(
        &self,
        pattern: &str,
        page: i64,
        page_size: i64,
    ) -> Result<Page<Course>, Error> {
        let matcher = RegexBuilder::new(&regex::escape(pattern.trim()))
            .case_insensitive(true)
            .build()
            .expect("escaped literal is a valid pattern");
        let mut matches: Vec<Course> = self
            .collection
            .all_courses()
            .await?
            .into_iter()
            .filter(|course| {
                matcher.is_match(&course.course_code)
                    || matcher.is_match(&course.course_name)
                    || matcher.is_match(&course.professor)
            })
            .collect();
        matches.sort_by(|a, b| a.course_code.cmp(&b.course_code));

        let page = self.config.clamp_page(page);
        let page_size = self.config.clamp_page_size(page_size);
        let total = matches.len() as u64;
        let items = matches
            .into_iter()
            .skip((page as usize - 1) * page_size as usize)
            .take(page_size as usize)
            .collect();
        Ok(Page {
            page,
            page_size,
            total,
            items,
        })
    }
}
