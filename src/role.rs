use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// A logical contract position that is deployed under a different address on each side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContractRole {
    Vault,
    ProtocolFeesCollector,
    Authorizer,
    WeightedPoolFactory,
    WeightedPool2TokensFactory,
    StablePoolFactory,
    LiquidityBootstrappingPoolFactory,
    MetaStablePoolFactory,
}

impl ContractRole {
    /// Every role, in the order they are compared and reported.
    pub const ALL: [ContractRole; 8] = [
        ContractRole::Vault,
        ContractRole::ProtocolFeesCollector,
        ContractRole::Authorizer,
        ContractRole::WeightedPoolFactory,
        ContractRole::WeightedPool2TokensFactory,
        ContractRole::StablePoolFactory,
        ContractRole::LiquidityBootstrappingPoolFactory,
        ContractRole::MetaStablePoolFactory,
    ];

    /// Returns the canonical camelCase label, which is also used for output file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractRole::Vault => "vault",
            ContractRole::ProtocolFeesCollector => "protocolFeesCollector",
            ContractRole::Authorizer => "authorizer",
            ContractRole::WeightedPoolFactory => "weightedPoolFactory",
            ContractRole::WeightedPool2TokensFactory => "weightedPool2TokensFactory",
            ContractRole::StablePoolFactory => "stablePoolFactory",
            ContractRole::LiquidityBootstrappingPoolFactory => "liquidityBootstrappingPoolFactory",
            ContractRole::MetaStablePoolFactory => "metaStablePoolFactory",
        }
    }
}

impl fmt::Display for ContractRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the canonical label as well as snake_case and any ASCII casing. The `config` crate
/// lowercases keys, so `protocolfeescollector` must resolve too.
impl FromStr for ContractRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.chars().filter(|c| *c != '_' && *c != '-').collect();
        ContractRole::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| {
                let known = ContractRole::ALL.map(|role| role.as_str()).join(", ");
                format!("{s} is not a known contract role. Must be one of: {known}")
            })
    }
}

impl Serialize for ContractRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ContractRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
