use std::time::Duration;

/// Engine tunables, passed by value at construction. Reading these from the
/// environment is the bootstrap layer's job.
#[derive(Clone, Debug)]
pub struct Config {
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub probe_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_page_size: 10,
            max_page_size: 100,
            probe_timeout: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// Pages are 1-indexed; anything non-positive means the first page.
    pub fn clamp_page(&self, page: i64) -> u32 {
        if page < 1 {
            1
        } else {
            page.min(i64::from(u32::MAX)) as u32
        }
    }

    /// Non-positive sizes fall back to the default, oversized ones are
    /// capped.
    pub fn clamp_page_size(&self, page_size: i64) -> u32 {
        if page_size < 1 {
            self.default_page_size
        } else if page_size > i64::from(self.max_page_size) {
            self.max_page_size
        } else {
            page_size as u32
        }
    }
}
