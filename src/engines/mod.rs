//! Search engine destinations
//!
//! Defines the closed set of engines a query may be routed to and builds
//! the concrete destination URL for each. Adding an engine is a
//! compile-time-checked change: every match on [`EngineName`] is
//! exhaustive, so a missing URL builder cannot slip through.

mod domains;

pub use domains::{google_domain_for, DEFAULT_GOOGLE_DOMAIN, GOOGLE_DOMAINS};

use crate::geo::CountryCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of engines a query may be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineName {
    Google,
    Bing,
    DuckDuckGo,
    Perplexity,
}

impl EngineName {
    /// Base domain for redirect allow-listing.
    pub fn base_domain(&self) -> &'static str {
        match self {
            Self::Google => "google.com",
            Self::Bing => "bing.com",
            Self::DuckDuckGo => "duckduckgo.com",
            Self::Perplexity => "perplexity.ai",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Bing => "bing",
            Self::DuckDuckGo => "duckduckgo",
            Self::Perplexity => "perplexity",
        }
    }

    /// All members of the closed set.
    pub fn all() -> [EngineName; 4] {
        [Self::Google, Self::Bing, Self::DuckDuckGo, Self::Perplexity]
    }
}

impl fmt::Display for EngineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EngineName {
    type Err = UnknownEngine;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(Self::Google),
            "bing" => Ok(Self::Bing),
            "duckduckgo" => Ok(Self::DuckDuckGo),
            "perplexity" => Ok(Self::Perplexity),
            _ => Err(UnknownEngine),
        }
    }
}

/// The selector named an engine outside the closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownEngine;

/// Build the destination URL for an engine.
///
/// `encoded_query` must already be percent-encoded and `country` validated;
/// the dispatcher guarantees both before calling here. Only Google varies
/// by country, through the domain allow-list.
pub fn resolve(engine: EngineName, encoded_query: &str, country: &CountryCode) -> String {
    match engine {
        EngineName::Google => {
            let domain = google_domain_for(country.as_str());
            format!(
                "https://www.{}/search?q={}&gl={}",
                domain, encoded_query, country
            )
        }
        EngineName::Bing => format!("https://www.bing.com/search?q={}", encoded_query),
        EngineName::DuckDuckGo => format!("https://duckduckgo.com/?q={}", encoded_query),
        EngineName::Perplexity => {
            format!("https://www.perplexity.ai/search?q={}", encoded_query)
        }
    }
}
