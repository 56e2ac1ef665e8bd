use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const US_COLLECTOR: &str = "https://insights-collector.newrelic.com/v1/accounts/";
const EU_COLLECTOR: &str = "https://insights-collector.eu01.nr-data.net/v1/accounts/";

/// Geographic selector for the ingestion host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    #[default]
    #[serde(alias = "us")]
    Us,
    #[serde(alias = "eu")]
    Eu,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Us => "US",
            Region::Eu => "EU",
        }
    }

    fn collector_base(&self) -> &'static str {
        match self {
            Region::Us => US_COLLECTOR,
            Region::Eu => EU_COLLECTOR,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "us" => Ok(Region::Us),
            "eu" => Ok(Region::Eu),
            other => Err(format!("Invalid region: {other}. Valid values: US, EU")),
        }
    }
}

/// Insights insert endpoint for an account. Pure function of its inputs.
pub fn endpoint_url(region: Region, account_id: &str) -> String {
    format!("{}{}/events", region.collector_base(), account_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn us_endpoint() {
        assert_eq!(
            endpoint_url(Region::Us, "123"),
            "https://insights-collector.newrelic.com/v1/accounts/123/events"
        );
    }

    #[test]
    fn eu_endpoint() {
        assert_eq!(
            endpoint_url(Region::Eu, "123"),
            "https://insights-collector.eu01.nr-data.net/v1/accounts/123/events"
        );
    }

    #[test]
    fn region_parsing_is_case_insensitive() {
        assert_eq!("us".parse::<Region>().unwrap(), Region::Us);
        assert_eq!("EU".parse::<Region>().unwrap(), Region::Eu);
        assert!("apac".parse::<Region>().is_err());
    }
}
