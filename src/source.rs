use crate::error::ExplorerError;
use serde::Serialize;
use serde_json::{Map, Value};

/// Path to content record, in the order the explorer listed the files.
pub type SourceBundle = Map<String, Value>;

/// The decoded `SourceCode` field of a verified contract: the standard-json input the contract
/// was compiled from. Only `sources` is interpreted; every other field is kept so the object can
/// be written back out.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SourceCode {
    sources: SourceBundle,
    #[serde(flatten)]
    other: Map<String, Value>,
}

impl SourceCode {
    /// Unescapes and parses the raw `SourceCode` text returned by an explorer.
    pub fn parse(raw: &str) -> Result<Self, ExplorerError> {
        let value: Value = serde_json::from_str(unescape(raw))
            .map_err(|err| ExplorerError::SourceParse(format!("not valid JSON ({err})")))?;
        let Value::Object(mut other) = value else {
            return Err(ExplorerError::SourceParse("not a JSON object".into()))
        };
        match other.remove("sources") {
            Some(Value::Object(sources)) => Ok(Self { sources, other }),
            Some(_) => Err(ExplorerError::SourceParse("`sources` is not an object".into())),
            None => Err(ExplorerError::SourceParse("missing `sources` key".into())),
        }
    }

    pub fn sources(&self) -> &SourceBundle {
        &self.sources
    }
}

/// Removes the extra brace layer explorers wrap around multi-file standard-json input
/// (`{{ ... }}`). Anything that is not wrapped twice is returned as is.
pub fn unescape(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.len() >= 4 && trimmed.starts_with("{{") && trimmed.ends_with("}}") {
        &trimmed[1..trimmed.len() - 1]
    } else {
        raw
    }
}
