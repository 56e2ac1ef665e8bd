use super::error::DestinationError;
use super::region::{Region, endpoint_url};
use std::fmt;

/// Editable destination settings as captured from the user.
///
/// `endpoint_url` is derived from `region` and `account_id` and is recomputed
/// on every change to either; there is no setter for it.
#[derive(Clone, PartialEq, Eq)]
pub struct DestinationForm {
    region: Region,
    account_id: String,
    api_key: String,
    event_name: String,
    endpoint_url: String,
}

impl DestinationForm {
    pub fn new() -> Self {
        let region = Region::default();
        Self {
            region,
            account_id: String::new(),
            api_key: String::new(),
            event_name: String::new(),
            endpoint_url: endpoint_url(region, ""),
        }
    }

    pub fn set_region(&mut self, region: Region) -> &mut Self {
        self.region = region;
        self.refresh_endpoint();
        self
    }

    pub fn set_account_id(&mut self, account_id: impl Into<String>) -> &mut Self {
        self.account_id = account_id.into();
        self.refresh_endpoint();
        self
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) -> &mut Self {
        self.api_key = api_key.into();
        self
    }

    pub fn set_event_name(&mut self, event_name: impl Into<String>) -> &mut Self {
        self.event_name = event_name.into();
        self
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    fn refresh_endpoint(&mut self) {
        self.endpoint_url = endpoint_url(self.region, &self.account_id);
    }

    /// Names of required fields that are still blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.account_id.trim().is_empty() {
            missing.push("account_id");
        }
        if self.api_key.trim().is_empty() {
            missing.push("api_key");
        }
        if self.event_name.trim().is_empty() {
            missing.push("event_name");
        }
        missing
    }

    /// Confirm the form. Blank required fields block confirmation.
    pub fn submit(&self) -> Result<Destination, DestinationError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(DestinationError::MissingFields(missing.join(", ")));
        }

        Ok(Destination {
            region: self.region,
            account_id: self.account_id.trim().to_string(),
            api_key: self.api_key.trim().to_string(),
            event_name: self.event_name.trim().to_string(),
            endpoint_url: endpoint_url(self.region, self.account_id.trim()),
        })
    }
}

impl Default for DestinationForm {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DestinationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DestinationForm")
            .field("region", &self.region)
            .field("account_id", &self.account_id)
            .field("api_key", &redact(&self.api_key))
            .field("event_name", &self.event_name)
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

/// Confirmed, immutable destination snapshot handed to the sender.
#[derive(Clone, PartialEq, Eq)]
pub struct Destination {
    region: Region,
    account_id: String,
    api_key: String,
    event_name: String,
    endpoint_url: String,
}

impl Destination {
    pub fn region(&self) -> Region {
        self.region
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    /// Same destination posting to another URL. Used to point the sender at a
    /// local collector.
    pub fn with_endpoint_override(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = endpoint_url.into();
        self
    }
}

impl fmt::Debug for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Destination")
            .field("region", &self.region)
            .field("account_id", &self.account_id)
            .field("api_key", &redact(&self.api_key))
            .field("event_name", &self.event_name)
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() { "<empty>" } else { "<redacted>" }
}
