use std::sync::Arc;

use coursedb_common::{Course, CourseId};
use coursedb_db::CourseCollection;

use crate::Error;

/// Re-derives `course_rating`/`rating_count` from the comment list.
///
/// The recompute is pure: it reads the current comments, averages the
/// ratings in [1,5] and writes the pair back in one step. Re-running it at
/// any time converges on the same values, which is why mutation and
/// recompute need no shared transaction.
#[derive(Clone)]
pub struct RatingAggregator {
    collection: Arc<dyn CourseCollection>,
}

fn derive(course: &Course) -> (Option<f64>, u32) {
    let ratings: Vec<f64> = course
        .rated_comments()
        .filter_map(|c| c.rating)
        .map(f64::from)
        .collect();
    if ratings.is_empty() {
        (None, 0)
    } else {
        let mean = ratings.iter().sum::<f64>() / ratings.len() as f64;
        (Some(mean), ratings.len() as u32)
    }
}

impl RatingAggregator {
    pub fn new(collection: Arc<dyn CourseCollection>) -> Self {
        RatingAggregator { collection }
    }

    /// Recomputes one course. A course deleted since the triggering
    /// mutation is not an error; there is nothing left to aggregate.
    pub async fn recompute(&self, course_id: &CourseId) -> Result<(), Error> {
        let course = match self.collection.course_by_id(course_id).await? {
            Some(course) => course,
            None => return Ok(()),
        };
        let (rating, count) = derive(&course);
        log::debug!(
            "course {}: rating {:?} over {} reviews",
            course_id,
            rating,
            count
        );
        self.collection
            .set_rating_aggregate(course_id, rating, count)
            .await?;
        Ok(())
    }

    /// Backfill over the whole catalog, for bulk imports or healing an
    /// interrupted recompute. Returns the number of courses touched.
    pub async fn recompute_all(&self) -> Result<usize, Error> {
        let courses = self.collection.all_courses().await?;
        let mut touched = 0;
        for course in courses {
            let (rating, count) = derive(&course);
            if self
                .collection
                .set_rating_aggregate(&course.id, rating, count)
                .await?
            {
                touched += 1;
            }
        }
        log::info!("recomputed ratings for {} courses", touched);
        Ok(touched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use coursedb_common::{Comment, Course, CourseFields, UserId};
    use coursedb_db::MemoryCollection;

    fn course_with_ratings(code: &str, ratings: &[Option<u8>]) -> Course {
        let mut course = Course::new(
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
        );
        for (i, rating) in ratings.iter().enumerate() {
            course.comments.push(Comment::new(
                UserId::new(format!("u{}", i)),
                "text".to_string(),
                *rating,
                Utc::now(),
            ));
        }
        course
    }

    #[tokio::test]
    async fn mean_ignores_unrated_comments() {
        let collection = Arc::new(MemoryCollection::new());
        let course = course_with_ratings("CS-546", &[Some(5), None, Some(2)]);
        let id = collection.insert_course(course).await.unwrap();

        let aggregator = RatingAggregator::new(collection.clone());
        aggregator.recompute(&id).await.unwrap();

        let course = collection.course_by_id(&id).await.unwrap().unwrap();
        assert!((course.course_rating.unwrap() - 3.5).abs() < 1e-9);
        assert_eq!(course.rating_count, 2);
    }

    #[tokio::test]
    async fn empty_rating_set_clears_the_aggregate() {
        let collection = Arc::new(MemoryCollection::new());
        let course = course_with_ratings("CS-546", &[None, None]);
        let id = collection.insert_course(course).await.unwrap();
        collection
            .set_rating_aggregate(&id, Some(4.0), 3)
            .await
            .unwrap();

        RatingAggregator::new(collection.clone())
            .recompute(&id)
            .await
            .unwrap();

        let course = collection.course_by_id(&id).await.unwrap().unwrap();
        assert_eq!(course.course_rating, None);
        assert_eq!(course.rating_count, 0);
    }

    #[tokio::test]
    async fn recompute_is_idempotent_and_tolerates_missing_courses() {
        let collection = Arc::new(MemoryCollection::new());
        let course = course_with_ratings("CS-546", &[Some(3), Some(4)]);
        let id = collection.insert_course(course).await.unwrap();

        let aggregator = RatingAggregator::new(collection.clone());
        aggregator.recompute(&id).await.unwrap();
        let first = collection.course_by_id(&id).await.unwrap().unwrap();
        aggregator.recompute(&id).await.unwrap();
        let second = collection.course_by_id(&id).await.unwrap().unwrap();
        assert_eq!(first.course_rating, second.course_rating);
        assert_eq!(first.rating_count, second.rating_count);

        // deleted mid-flight: silently a no-op
        collection.delete_course(&id).await.unwrap();
        aggregator.recompute(&id).await.unwrap();
    }

    #[tokio::test]
    async fn backfill_touches_every_course() {
        let collection = Arc::new(MemoryCollection::new());
        collection
            .insert_course(course_with_ratings("CS-546", &[Some(5)]))
            .await
            .unwrap();
        collection
            .insert_course(course_with_ratings("EE-210", &[]))
            .await
            .unwrap();

        let touched = RatingAggregator::new(collection.clone())
            .recompute_all()
            .await
            .unwrap();
        assert_eq!(touched, 2);
    }
}
