use crate::error::{AbiError, AbiResult};

/// Which `version` strings an ABI document may declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VersionPolicy {
    /// Only `eosio::abi/1.x` documents.
    AbiV1,
    /// Skip the version check entirely.
    Any,
}

impl VersionPolicy {
    pub const ABI_V1_PREFIX: &'static str = "eosio::abi/1.";

    pub fn check(&self, version: &str) -> AbiResult<()> {
        match self {
            VersionPolicy::AbiV1 if !version.starts_with(Self::ABI_V1_PREFIX) => {
                Err(AbiError::UnsupportedVersion(version.to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// Limits applied while registering schemas and converting values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AbiOptions {
    /// Bound on alias, base, and field resolution depth during registration.
    pub max_type_depth: usize,
    /// Bound on value nesting during binary and JSON conversion.
    pub max_value_depth: usize,
    pub version_policy: VersionPolicy,
}

impl Default for AbiOptions {
    fn default() -> Self {
        Self {
            max_type_depth: 32,
            max_value_depth: 128,
            version_policy: VersionPolicy::AbiV1,
        }
    }
}

impl AbiOptions {
    /// Tighter limits for schemas and payloads from untrusted peers.
    pub fn strict() -> Self {
        Self {
            max_type_depth: 16,
            max_value_depth: 64,
            version_policy: VersionPolicy::AbiV1,
        }
    }

    pub fn with_version_policy(mut self, policy: VersionPolicy) -> Self {
        self.version_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v1_policy_rejects_other_versions() {
        let policy = VersionPolicy::AbiV1;
        assert!(policy.check("eosio::abi/1.1").is_ok());
        assert!(policy.check("eosio::abi/1.0").is_ok());
        assert_eq!(
            policy.check("eosio::abi/2.0"),
            Err(AbiError::UnsupportedVersion("eosio::abi/2.0".into()))
        );
        assert!(VersionPolicy::Any.check("").is_ok());
    }
}
