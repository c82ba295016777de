use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} token: {value}")]
pub struct UnknownToken {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! token_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $token:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            Serialize, Deserialize, ToSchema,
        )]
        pub enum $name {
            $(
                #[serde(rename = $token)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $token,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownToken;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($token => Ok($name::$variant),)+
                    other => Err(UnknownToken {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

token_enum!(
    /// Temporal buckets, in the order the "when" tab displays them.
    WhenToken, "when" {
        Now => "now",
        Today => "today",
        Tomorrow => "tomorrow",
        ThisWeek => "this-week",
        Weekend => "weekend",
        NextWeek => "next-week",
        NextWeekend => "next-weekend",
        HappeningLater => "happening-later",
        Past => "past",
    }
);

token_enum!(
    /// Price bands. Events are tagged with every tier they qualify for, so
    /// the declaration order doubles as the "cheaper than" order.
    PriceTier, "price" {
        Free => "free",
        Price10 => "price_10",
        Price25 => "price_25",
        Price50 => "price_50",
        Price100 => "price_100",
        Price100Plus => "price_100_plus",
    }
);

token_enum!(
    RadiusToken, "radius" {
        Mile5 => "mile-5",
        Mile25 => "mile-25",
        Mile50 => "mile-50",
        Mile100 => "mile-100",
        Mile100Plus => "mile-100-plus",
        Mile150 => "mile-150",
        Mile200 => "mile-200",
        Mile250 => "mile-250",
        Mile300 => "mile-300",
        Mile350 => "mile-350",
    }
);

token_enum!(
    /// Client the cached page was rendered for.
    Platform, "platform" {
        Desktop => "desktop",
        Mobile => "mobile",
        Pwa => "pwa",
    }
);

token_enum!(
    PageType, "page type" {
        CityPage => "city_page",
        StatePage => "state_page",
    }
);

token_enum!(
    Tab, "tab" {
        Date => "date",
        Price => "price",
        Interests => "interests",
    }
);

impl PriceTier {
    pub fn label(&self) -> &'static str {
        match self {
            PriceTier::Free => "Free",
            PriceTier::Price10 => "Up to $10",
            PriceTier::Price25 => "Up to $25",
            PriceTier::Price50 => "Up to $50",
            PriceTier::Price100 => "Up to $100",
            PriceTier::Price100Plus => "$100+",
        }
    }

    /// Tiers strictly cheaper than `self`.
    pub fn below(&self) -> impl Iterator<Item = PriceTier> + '_ {
        PriceTier::ALL.iter().copied().filter(move |tier| tier < self)
    }
}

impl WhenToken {
    pub fn label(&self) -> &'static str {
        match self {
            WhenToken::Now => "Happening Now",
            WhenToken::Today => "Today",
            WhenToken::Tomorrow => "Tomorrow",
            WhenToken::ThisWeek => "This Week",
            WhenToken::Weekend => "This Weekend",
            WhenToken::NextWeek => "Next Week",
            WhenToken::NextWeekend => "Next Weekend",
            WhenToken::HappeningLater => "Happening Later",
            WhenToken::Past => "Past",
        }
    }
}

impl RadiusToken {
    /// Nominal bound of the radius filter in miles. `None` means unbounded.
    ///
    /// `mile-100-plus` is served as 150 miles unless `alias_hundred_plus` is
    /// turned off, in which case it does not restrict distance at all.
    pub fn filter_miles(&self, alias_hundred_plus: bool) -> Option<f64> {
        let miles = match self {
            RadiusToken::Mile5 => 5.0,
            RadiusToken::Mile25 => 25.0,
            RadiusToken::Mile50 => 50.0,
            RadiusToken::Mile100 => 100.0,
            RadiusToken::Mile100Plus if alias_hundred_plus => 150.0,
            RadiusToken::Mile100Plus => return None,
            RadiusToken::Mile150 => 150.0,
            RadiusToken::Mile200 => 200.0,
            RadiusToken::Mile250 => 250.0,
            RadiusToken::Mile300 => 300.0,
            RadiusToken::Mile350 => 350.0,
        };
        Some(miles)
    }

    /// Search bound used when looking for a substitute curated city. Only
    /// the small radii participate.
    pub fn curated_search_miles(&self) -> Option<f64> {
        match self {
            RadiusToken::Mile5 => Some(5.0),
            RadiusToken::Mile25 => Some(25.0),
            RadiusToken::Mile50 => Some(50.0),
            RadiusToken::Mile100 => Some(100.0),
            RadiusToken::Mile100Plus => Some(10_000.0),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_parse_from_wire_names() {
        assert_eq!("next-weekend".parse::<WhenToken>(), Ok(WhenToken::NextWeekend));
        assert_eq!("price_100_plus".parse::<PriceTier>(), Ok(PriceTier::Price100Plus));
        assert_eq!("mile-100-plus".parse::<RadiusToken>(), Ok(RadiusToken::Mile100Plus));

        let err = "soon".parse::<WhenToken>().unwrap_err();
        assert_eq!(err.kind, "when");
        assert_eq!(err.to_string(), "unknown when token: soon");
    }

    #[test]
    fn test_price_tiers_below() {
        let below: Vec<_> = PriceTier::Price50.below().collect();
        assert_eq!(
            below,
            vec![PriceTier::Free, PriceTier::Price10, PriceTier::Price25]
        );
        assert_eq!(PriceTier::Free.below().count(), 0);
    }

    #[test]
    fn test_hundred_plus_alias() {
        assert_eq!(RadiusToken::Mile100Plus.filter_miles(true), Some(150.0));
        assert_eq!(RadiusToken::Mile100Plus.filter_miles(false), None);
        assert_eq!(RadiusToken::Mile150.curated_search_miles(), None);
    }

    #[test]
    fn test_serde_uses_token_names() {
        let json = serde_json::to_string(&WhenToken::HappeningLater).unwrap();
        assert_eq!(json, "\"happening-later\"");
    }
}
