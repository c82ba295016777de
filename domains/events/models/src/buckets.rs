use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{PriceTier, UnknownToken, WhenToken};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum BucketType {
    When,
    Price,
}

impl BucketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BucketType::When => "when",
            BucketType::Price => "price",
        }
    }
}

/// Row driving a paginated tab UI. The `bucket` column holds the token the
/// tab filters by; it carries no query logic of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EventBucket {
    pub id: i64,
    pub bucket_type: BucketType,
    pub bucket: String,
    pub name: String,
    pub sort_order: i32,
    pub is_active: bool,
}

impl EventBucket {
    pub fn when_token(&self) -> Result<WhenToken, UnknownToken> {
        WhenToken::from_str(&self.bucket)
    }

    pub fn price_tier(&self) -> Result<PriceTier, UnknownToken> {
        PriceTier::from_str(&self.bucket)
    }
}
