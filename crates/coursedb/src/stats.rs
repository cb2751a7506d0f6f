use std::sync::Arc;

use coursedb_common::{Course, CourseId};
use coursedb_db::CourseCollection;
use serde::Serialize;

use crate::{config::Config, Error};

/// Ranking projection of a course: the display scalars plus the two stat
/// metrics. Unrated courses rank with a rating of 0.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRanking {
    pub course_id: CourseId,
    pub course_code: String,
    pub course_name: String,
    pub professor: String,
    pub meeting_time: String,
    pub img_link: String,
    pub course_rating: f64,
    pub review_count: u32,
}

impl From<&Course> for CourseRanking {
    fn from(course: &Course) -> Self {
        CourseRanking {
            course_id: course.id.clone(),
            course_code: course.course_code.clone(),
            course_name: course.course_name.clone(),
            professor: course.professor.clone(),
            meeting_time: course.meeting_time.clone(),
            img_link: course.img_link.clone(),
            course_rating: course.effective_rating(),
            review_count: course.review_count() as u32,
        }
    }
}

/// Which extremal view a stats caller wants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatKind {
    HighestRated,
    LowestRated,
    MostReviewed,
    LeastReviewed,
}

/// Tie-preserving extremal queries over the catalog.
///
/// Each query finds the single best (or worst) value of its metric and
/// returns every course holding exactly that value, never a naive
/// sort-and-limit that would cut a tie in half arbitrarily. The limit only
/// applies after the tie group is complete and ordered.
pub struct CourseStats {
    collection: Arc<dyn CourseCollection>,
    config: Config,
}

fn rating_of(ranking: &CourseRanking) -> f64 {
    ranking.course_rating
}

fn reviews_of(ranking: &CourseRanking) -> f64 {
    f64::from(ranking.review_count)
}

/// Keeps the courses tied at the extreme of `primary`, ordered by
/// `secondary` descending then name ascending, cut to `limit`.
fn extremal(
    rankings: Vec<CourseRanking>,
    primary: fn(&CourseRanking) -> f64,
    secondary: fn(&CourseRanking) -> f64,
    want_max: bool,
    limit: usize,
) -> Vec<CourseRanking> {
    let extreme = match rankings
        .iter()
        .map(primary)
        .reduce(|best, next| if (next > best) == want_max { next } else { best })
    {
        Some(extreme) => extreme,
        None => return Vec::new(),
    };
    let mut ties: Vec<CourseRanking> = rankings
        .into_iter()
        .filter(|r| primary(r).total_cmp(&extreme).is_eq())
        .collect();
    ties.sort_by(|a, b| {
        secondary(b)
            .total_cmp(&secondary(a))
            .then_with(|| a.course_name.cmp(&b.course_name))
    });
    ties.truncate(limit);
    ties
}

impl CourseStats {
    pub fn new(collection: Arc<dyn CourseCollection>, config: Config) -> Self {
        CourseStats { collection, config }
    }

    pub async fn query(&self, kind: StatKind, limit: i64) -> Result<Vec<CourseRanking>, Error> {
        match kind {
            StatKind::HighestRated => self.highest_rated(limit).await,
            StatKind::LowestRated => self.lowest_rated(limit).await,
            StatKind::MostReviewed => self.most_reviewed(limit).await,
            StatKind::LeastReviewed => self.least_reviewed(limit).await,
        }
    }

    pub async fn highest_rated(&self, limit: i64) -> Result<Vec<CourseRanking>, Error> {
        let rankings = self.rankings().await?;
        Ok(extremal(rankings, rating_of, reviews_of, true, self.limit(limit)))
    }

    pub async fn lowest_rated(&self, limit: i64) -> Result<Vec<CourseRanking>, Error> {
        let rankings = self.rankings().await?;
        Ok(extremal(rankings, rating_of, reviews_of, false, self.limit(limit)))
    }

    pub async fn most_reviewed(&self, limit: i64) -> Result<Vec<CourseRanking>, Error> {
        let rankings = self.rankings().await?;
        Ok(extremal(rankings, reviews_of, rating_of, true, self.limit(limit)))
    }

    pub async fn least_reviewed(&self, limit: i64) -> Result<Vec<CourseRanking>, Error> {
        let rankings = self.rankings().await?;
        Ok(extremal(rankings, reviews_of, rating_of, false, self.limit(limit)))
    }

    async fn rankings(&self) -> Result<Vec<CourseRanking>, Error> {
        let courses = self.collection.all_courses().await?;
        Ok(courses.iter().map(CourseRanking::from).collect())
    }

    fn limit(&self, limit: i64) -> usize {
        self.config.clamp_page_size(limit) as usize
    }
}
