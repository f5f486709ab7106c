use crate::{error::ExplorerError, source::SourceCode};
use ethers::{types::Address, utils::to_checksum};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use std::{fmt, time::Duration};

/// Which of the two deployments an explorer serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Origin,
    Fork,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Origin => "origin",
            Side::Fork => "fork",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Envelope shared by all Etherscan-compatible API responses. On failure `result` is a plain
/// string such as "Max rate limit reached" or "Invalid API Key".
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: Value,
}

/// Client for the `getsourcecode` endpoint of one Etherscan-compatible explorer.
#[derive(Clone, Debug)]
pub struct ExplorerClient {
    name: String,
    base_url: Url,
    api_key: String,
    http: Client,
}

impl ExplorerClient {
    pub fn new(
        name: impl Into<String>,
        base_url: Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { name: name.into(), base_url, api_key: api_key.into(), http })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fetches and decodes the verified source of the contract at `address`.
    #[tracing::instrument(
        name = "Fetching verified source",
        skip(self, address),
        fields(explorer = %self.name, address = %to_checksum(&address, None))
    )]
    pub async fn get_source_code(&self, address: Address) -> Result<SourceCode, ExplorerError> {
        let address = to_checksum(&address, None);
        let response = self
            .http
            .get(self.base_url.clone())
            .query(&[
                ("module", "contract"),
                ("action", "getsourcecode"),
                ("address", address.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let raw = extract_source_code(&body)?;
        tracing::debug!(bytes = raw.len(), "Received source code");
        SourceCode::parse(&raw)
    }
}

/// Pulls `result[0].SourceCode` out of a `getsourcecode` response body.
pub fn extract_source_code(body: &str) -> Result<String, ExplorerError> {
    let response: ApiResponse = serde_json::from_str(body)
        .map_err(|err| ExplorerError::ResponseFormat(format!("body is not JSON ({err})")))?;

    let entry = match &response.result {
        Value::Array(entries) => entries.first().ok_or_else(|| {
            ExplorerError::ResponseFormat("`result` is an empty list".into())
        })?,
        Value::String(reason) => return Err(ExplorerError::ResponseFormat(explorer_reason(
            response.message.as_deref(),
            reason,
        ))),
        _ => return Err(ExplorerError::ResponseFormat("`result` is not a list".into())),
    };

    match entry.get("SourceCode") {
        Some(Value::String(source)) if source.is_empty() => Err(ExplorerError::ResponseFormat(
            "contract source code is not verified".into(),
        )),
        Some(Value::String(source)) => Ok(source.clone()),
        Some(_) => Err(ExplorerError::ResponseFormat("`SourceCode` is not a string".into())),
        None => Err(ExplorerError::ResponseFormat("`result[0]` has no `SourceCode` field".into())),
    }
}

fn explorer_reason(message: Option<&str>, result: &str) -> String {
    match message {
        Some(message) if !message.is_empty() => format!("{message}: {result}"),
        _ => result.to_string(),
    }
}
