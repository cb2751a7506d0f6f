use std::sync::Arc;

use coursedb_db::CourseCollection;

use crate::{
    comments::CommentManager, config::Config, probe::ImageProbe, rating::RatingAggregator,
    search::CourseSearch, stats::CourseStats, store::CourseStore,
};

/// The engine components wired over one shared collection handle. The
/// embedding layer constructs this once and hands it around.
pub struct Catalog {
    pub store: CourseStore,
    pub comments: CommentManager,
    pub rating: RatingAggregator,
    pub search: CourseSearch,
    pub stats: CourseStats,
}

impl Catalog {
    pub fn new(
        collection: Arc<dyn CourseCollection>,
        probe: Arc<dyn ImageProbe>,
        config: Config,
    ) -> Self {
        let rating = RatingAggregator::new(collection.clone());
        Catalog {
            store: CourseStore::new(collection.clone(), probe, config.clone()),
            comments: CommentManager::new(collection.clone(), rating.clone()),
            rating,
            search: CourseSearch::new(collection.clone(), config.clone()),
            stats: CourseStats::new(collection, config),
        }
    }
}
