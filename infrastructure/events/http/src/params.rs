use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use common_errors::AppError;
use events_filters::EventFilterParams;
use events_models::WhenToken;
use events_queries::PageRequest;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Raw discovery query string. Every value arrives as text so malformed
/// input is reported as `INVALID_QUERY_PARAMS` instead of a bare
/// extractor rejection. List parameters accept repeated keys
/// (`when=today&when=weekend`), comma-separated values, or both.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventsQueryParams {
    /// City slug, e.g. `tampa-bay-florida-united-states`.
    pub city: Option<String>,
    /// When tokens: `now`, `today`, `weekend`, `past`, ...
    #[serde(default)]
    pub when: Vec<String>,
    pub since: Option<String>,
    pub until: Option<String>,
    /// `YYYY-MM-DD`, in the city's local time.
    pub date: Option<String>,
    /// Price tier, matched cumulatively (`price_25` includes cheaper tiers).
    pub price: Option<String>,
    /// Price tier, matched exclusively.
    pub price_sections: Option<String>,
    /// Radius token, e.g. `mile-25`.
    pub radius: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub map_radius: Option<String>,
    pub is_featured: Option<String>,
    pub is_curated: Option<String>,
    pub has_location: Option<String>,
    pub search: Option<String>,
    /// Category slugs.
    #[serde(default)]
    pub what: Vec<String>,
    pub venue: Option<String>,
    /// State slug or two-letter code.
    pub state: Option<String>,
    pub upcoming: Option<String>,
    pub ongoing: Option<String>,
    pub recent: Option<String>,
    pub registered_user: Option<String>,
    /// `desktop` (default), `mobile` or `pwa`.
    pub platform: Option<String>,
    pub created_after: Option<String>,
    pub updated_after: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

fn present(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

fn invalid(field: &str, value: &str, reason: impl Display) -> AppError {
    AppError::invalid_query_params(&format!("{field}={value}: {reason}"))
}

fn parse<T>(field: &str, raw: &Option<String>) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    present(raw)
        .map(|value| value.parse::<T>().map_err(|e| invalid(field, value, e)))
        .transpose()
}

fn parse_bool(field: &str, raw: &Option<String>) -> Result<Option<bool>, AppError> {
    present(raw)
        .map(|value| match value.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(invalid(field, value, "expected a boolean")),
        })
        .transpose()
}

fn parse_list<T>(field: &str, raw: &[String]) -> Result<Vec<T>, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| item.parse::<T>().map_err(|e| invalid(field, item, e)))
        .collect()
}

/// `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM:SS` or a bare date (midnight).
fn parse_local_datetime(
    field: &str, raw: &Option<String>,
) -> Result<Option<NaiveDateTime>, AppError> {
    let Some(value) = present(raw)
    else {
        return Ok(None);
    };
    if let Ok(at) = value.parse::<NaiveDateTime>() {
        return Ok(Some(at));
    }
    if let Ok(at) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(Some(at));
    }
    value
        .parse::<NaiveDate>()
        .map(|date| Some(date.and_time(chrono::NaiveTime::MIN)))
        .map_err(|e| invalid(field, value, e))
}

impl EventsQueryParams {
    pub fn filters(&self) -> Result<EventFilterParams, AppError> {
        Ok(EventFilterParams {
            city: present(&self.city).map(str::to_string),
            when: parse_list::<WhenToken>("when", &self.when)?,
            since: parse_local_datetime("since", &self.since)?,
            until: parse_local_datetime("until", &self.until)?,
            date: parse("date", &self.date)?,
            price: parse("price", &self.price)?,
            price_sections: parse("price_sections", &self.price_sections)?,
            radius: parse("radius", &self.radius)?,
            latitude: parse("latitude", &self.latitude)?,
            longitude: parse("longitude", &self.longitude)?,
            map_radius: parse("map_radius", &self.map_radius)?,
            is_featured: parse_bool("is_featured", &self.is_featured)?,
            is_curated: parse_bool("is_curated", &self.is_curated)?,
            has_location: parse_bool("has_location", &self.has_location)?,
            search: present(&self.search).map(str::to_string),
            what: parse_list::<String>("what", &self.what)?,
            venue: present(&self.venue).map(str::to_string),
            state: present(&self.state).map(str::to_string),
            upcoming: parse_bool("upcoming", &self.upcoming)?,
            ongoing: parse_bool("ongoing", &self.ongoing)?,
            recent: parse_bool("recent", &self.recent)?,
            registered_user: parse_bool("registered_user", &self.registered_user)?
                .unwrap_or(false),
            platform: parse("platform", &self.platform)?,
            created_after: parse::<DateTime<Utc>>("created_after", &self.created_after)?,
            updated_after: parse::<DateTime<Utc>>("updated_after", &self.updated_after)?,
            limit: parse("limit", &self.limit)?,
        })
    }

    pub fn page_request(&self, default_size: u64) -> Result<PageRequest, AppError> {
        Ok(PageRequest::new(
            parse("page", &self.page)?,
            parse("page_size", &self.page_size)?,
            default_size,
        ))
    }
}
