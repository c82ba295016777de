use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    /// City whose calendar drives time filters when no city is requested.
    #[serde(default = "default_fallback_city")]
    pub fallback_city: String,
    #[serde(default = "default_cluster")]
    pub cluster: String,
    /// Substitute curated city for cluster members with none nearby.
    #[serde(default = "default_cluster_anchor")]
    pub cluster_anchor: String,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_refresh_queue_capacity")]
    pub refresh_queue_capacity: usize,
    /// Serve `mile-100-plus` as 150 miles instead of unbounded.
    #[serde(default = "default_alias_hundred_plus")]
    pub alias_hundred_plus: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            fallback_city: default_fallback_city(),
            cluster: default_cluster(),
            cluster_anchor: default_cluster_anchor(),
            cache_ttl_secs: default_cache_ttl_secs(),
            refresh_queue_capacity: default_refresh_queue_capacity(),
            alias_hundred_plus: default_alias_hundred_plus(),
        }
    }
}

fn default_fallback_city() -> String { "tampa-bay-florida-united-states".into() }

fn default_cluster() -> String { "tampa-bay".into() }

fn default_cluster_anchor() -> String { "tampa-bay-florida-united-states".into() }

fn default_cache_ttl_secs() -> u64 { 3600 }

fn default_refresh_queue_capacity() -> usize { 1024 }

fn default_alias_hundred_plus() -> bool { true }
