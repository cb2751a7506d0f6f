use serde::Serialize;

/// One page of a deterministic, stably-ordered result set. `total` counts
/// all matches before pagination was applied.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub items: Vec<T>,
}
