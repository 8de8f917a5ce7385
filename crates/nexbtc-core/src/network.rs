//! Backend deployment configuration and wire-size constants.

/// Where the backend canister is deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Deployment {
    /// The Internet Computer mainnet.
    Ic,
    /// A local development replica.
    #[default]
    Local,
}

impl Deployment {
    /// Parse from a dfx network name. Anything other than exactly `ic` is local.
    pub fn from_name(name: &str) -> Self {
        match name {
            "ic" => Deployment::Ic,
            _ => Deployment::Local,
        }
    }

    /// Get the deployment name as used by dfx.
    pub fn name(&self) -> &'static str {
        match self {
            Deployment::Ic => "ic",
            Deployment::Local => "local",
        }
    }

    /// Get the agent host for this deployment.
    pub fn host(&self) -> &'static str {
        match self {
            Deployment::Ic => IC_HOST,
            Deployment::Local => LOCAL_HOST,
        }
    }

    /// Local replicas use a throwaway root key that the agent must fetch.
    pub fn fetch_root_key(&self) -> bool {
        matches!(self, Deployment::Local)
    }
}

impl core::fmt::Display for Deployment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Everything the JS side needs to construct an agent and actor.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct BackendConfig {
    /// Deployment name (`ic` or `local`).
    pub network: String,
    /// Agent host URL.
    pub host: String,
    /// Backend canister principal, textual form.
    pub canister_id: String,
    /// Whether the agent must fetch the replica root key before calls.
    pub fetch_root_key: bool,
}

impl BackendConfig {
    /// Resolve the backend configuration.
    ///
    /// An explicit canister id always wins. Local deployments fall back to the
    /// default dfx canister id; on the IC there is no fallback and `None` is
    /// returned, meaning no backend is available.
    pub fn resolve(deployment: Deployment, canister_id: Option<&str>) -> Option<Self> {
        let explicit = canister_id.map(str::trim).filter(|id| !id.is_empty());

        let canister_id = match (explicit, deployment) {
            (Some(id), _) => id.to_string(),
            (None, Deployment::Local) => LOCAL_BACKEND_CANISTER_ID.to_string(),
            (None, Deployment::Ic) => return None,
        };

        log::debug!("backend canister {} on {}", canister_id, deployment);

        Some(BackendConfig {
            network: deployment.name().to_string(),
            host: deployment.host().to_string(),
            canister_id,
            fetch_root_key: deployment.fetch_root_key(),
        })
    }
}

/// Agent host for the Internet Computer mainnet.
pub const IC_HOST: &str = "https://ic0.app";

/// Agent host for a local dfx replica.
pub const LOCAL_HOST: &str = "http://127.0.0.1:4943";

/// Canister id dfx assigns to the first canister on a fresh local replica.
pub const LOCAL_BACKEND_CANISTER_ID: &str = "bkyz2-fmaaa-aaaaa-qaaaq-cai";

/// Size of a block header in bytes.
pub const BLOCK_HEADER_SIZE: usize = 80;

/// Size of a hash, Merkle root, or txid in bytes.
pub const HASH_SIZE: usize = 32;

/// Satoshis in one bitcoin.
pub const SATOSHIS_PER_BTC: u64 = 100_000_000;

/// Total supply cap in satoshis (21 million BTC).
pub const MAX_MONEY: u64 = 21_000_000 * SATOSHIS_PER_BTC;

/// Outputs below this many satoshis are non-standard.
pub const DUST_LIMIT: u64 = 546;

/// Percentile ranks shown in the fee summary.
pub const SUMMARY_PERCENTILES: [usize; 5] = [10, 25, 50, 75, 90];
