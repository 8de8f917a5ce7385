//! Backend capabilities and the operations built on them.
//!
//! Two capabilities exist: [`PublicClient`] works with an anonymous identity,
//! [`AuthenticatedClient`] acts on behalf of the signed-in user. Callers pass
//! whichever one an operation needs; nothing selects a backend implicitly.
//!
//! Implementations report backend failures as [`Error::BackendRejected`]
//! with the original message, and values of the wrong type as
//! [`Error::UnexpectedResponseShape`]. They never retry.
//!
//! [`Error::BackendRejected`]: crate::Error::BackendRejected
//! [`Error::UnexpectedResponseShape`]: crate::Error::UnexpectedResponseShape

use serde_json::Value;

use crate::error::Result;
use crate::network::HASH_SIZE;
use crate::path::DerivationPath;
use crate::request::{AddressKind, BitcoinAddress, SchnorrAux, SendRequest, SendSource};
use crate::response::{RawBlockHeadersResponse, RawUtxosResponse};

/// Queries and signing available to any caller.
#[allow(async_fn_in_trait)]
pub trait PublicClient {
    /// Confirmed balance of `address` in satoshis.
    async fn get_balance(&self, address: &BitcoinAddress) -> Result<u64>;

    async fn get_utxos(&self, address: &BitcoinAddress) -> Result<RawUtxosResponse>;

    /// Raw fee percentile response, decoded by [`FeePercentileTable::from_json`].
    ///
    /// [`FeePercentileTable::from_json`]: crate::fees::FeePercentileTable::from_json
    async fn get_current_fee_percentiles(&self) -> Result<Value>;

    /// Raw headers for `[start, end]`, or just `start` when `end` is `None`.
    async fn get_block_headers(&self, start: u32, end: Option<u32>) -> Result<RawBlockHeadersResponse>;

    async fn sign_with_ecdsa(&self, message_hash: &[u8; HASH_SIZE], path: &DerivationPath) -> Result<Vec<u8>>;

    async fn get_ecdsa_public_key(&self, path: &DerivationPath) -> Result<Vec<u8>>;

    async fn sign_with_schnorr(
        &self,
        message: &[u8; HASH_SIZE],
        path: &DerivationPath,
        aux: &SchnorrAux,
    ) -> Result<Vec<u8>>;

    async fn get_schnorr_public_key(&self, path: &DerivationPath) -> Result<Vec<u8>>;

    /// One of the backend's own receiving addresses.
    async fn get_address(&self, kind: AddressKind) -> Result<String>;

    /// Send from a backend-held address. Returns the transaction id.
    async fn send(&self, source: SendSource, request: &SendRequest) -> Result<String>;
}

/// Vault operations bound to the caller's identity.
#[allow(async_fn_in_trait)]
pub trait AuthenticatedClient {
    async fn get_my_deposit_address(&self) -> Result<String>;

    async fn get_my_vault_balance(&self) -> Result<u64>;

    async fn get_my_vault_utxos(&self) -> Result<RawUtxosResponse>;

    /// Withdraw from the vault. Returns the transaction id.
    async fn withdraw(&self, destination: &BitcoinAddress, amount_sat: u64) -> Result<String>;
}

/// Validate-then-call operations taking raw form input.
///
/// Each function rejects bad input before touching the client.
pub mod ops {
    use super::{AuthenticatedClient, PublicClient};
    use crate::amount::SatoshiAmount;
    use crate::error::Result;
    use crate::fees::FeePercentileTable;
    use crate::header::HeaderBatch;
    use crate::path::DerivationPath;
    use crate::request::{
        AddressKind, BitcoinAddress, EcdsaSignRequest, HeightRange, SchnorrSignRequest,
        SendRequest, SendSource,
    };
    use crate::response::UtxoSet;

    pub async fn get_balance<C: PublicClient>(client: &C, address: &str) -> Result<SatoshiAmount> {
        let address = BitcoinAddress::parse("Bitcoin address", address)?;
        log::debug!("balance query for {}", address);
        client.get_balance(&address).await.map(SatoshiAmount::from_sat)
    }

    pub async fn get_utxos<C: PublicClient>(client: &C, address: &str) -> Result<UtxoSet> {
        let address = BitcoinAddress::parse("Bitcoin address", address)?;
        log::debug!("utxo query for {}", address);
        UtxoSet::from_raw(client.get_utxos(&address).await?)
    }

    pub async fn get_fee_percentiles<C: PublicClient>(client: &C) -> Result<FeePercentileTable> {
        let response = client.get_current_fee_percentiles().await?;
        let table = FeePercentileTable::from_json(&response)?;
        if !table.anomalies().is_empty() {
            log::warn!("{} fee percentile(s) could not be normalized", table.anomalies().len());
        }
        Ok(table)
    }

    /// Fetch headers for the start/end form fields. A blank end fetches one.
    pub async fn get_block_headers<C: PublicClient>(client: &C, start: &str, end: &str) -> Result<HeaderBatch> {
        let range = HeightRange::parse(start, end)?;
        log::debug!("requesting {} header(s) from height {}", range.len(), range.start());
        let response = client.get_block_headers(range.start(), range.end()).await?;
        HeaderBatch::from_response(&range, response)
    }

    pub async fn sign_with_ecdsa<C: PublicClient>(client: &C, message_hash: &str, path: &str) -> Result<Vec<u8>> {
        let request = EcdsaSignRequest::parse(message_hash, path)?;
        log::debug!("ecdsa signature with path {}", request.derivation_path);
        client
            .sign_with_ecdsa(&request.message_hash, &request.derivation_path)
            .await
    }

    pub async fn get_ecdsa_public_key<C: PublicClient>(client: &C, path: &str) -> Result<Vec<u8>> {
        let path = DerivationPath::parse(path)?;
        client.get_ecdsa_public_key(&path).await
    }

    pub async fn sign_with_schnorr<C: PublicClient>(
        client: &C,
        message: &str,
        path: &str,
        use_bip341: bool,
        merkle_root_hash: &str,
    ) -> Result<Vec<u8>> {
        let request = SchnorrSignRequest::parse(message, path, use_bip341, merkle_root_hash)?;
        log::debug!(
            "schnorr signature with path {} (bip341: {})",
            request.derivation_path,
            request.aux.merkle_root_hash().is_some()
        );
        client
            .sign_with_schnorr(&request.message, &request.derivation_path, &request.aux)
            .await
    }

    pub async fn get_schnorr_public_key<C: PublicClient>(client: &C, path: &str) -> Result<Vec<u8>> {
        let path = DerivationPath::parse(path)?;
        client.get_schnorr_public_key(&path).await
    }

    /// Fetch every backend address kind, in [`AddressKind::ALL`] order.
    pub async fn get_addresses<C: PublicClient>(client: &C) -> Result<Vec<(AddressKind, String)>> {
        let mut addresses = Vec::with_capacity(AddressKind::ALL.len());
        for kind in AddressKind::ALL {
            addresses.push((kind, client.get_address(kind).await?));
        }
        Ok(addresses)
    }

    pub async fn send<C: PublicClient>(
        client: &C,
        source: SendSource,
        destination: &str,
        amount_btc: &str,
    ) -> Result<String> {
        let request = SendRequest::parse(destination, amount_btc)?;
        if request.amount.is_dust() {
            log::warn!("sending {} which is below the dust limit", request.amount);
        }
        log::info!("{} of {} to {}", source.method(), request.amount, request.destination_address);
        client.send(source, &request).await
    }

    pub async fn get_deposit_address<C: AuthenticatedClient>(client: &C) -> Result<String> {
        client.get_my_deposit_address().await
    }

    pub async fn get_vault_balance<C: AuthenticatedClient>(client: &C) -> Result<SatoshiAmount> {
        client.get_my_vault_balance().await.map(SatoshiAmount::from_sat)
    }

    pub async fn get_vault_utxos<C: AuthenticatedClient>(client: &C) -> Result<UtxoSet> {
        UtxoSet::from_raw(client.get_my_vault_utxos().await?)
    }

    pub async fn withdraw<C: AuthenticatedClient>(client: &C, destination: &str, amount_btc: &str) -> Result<String> {
        let request = SendRequest::parse(destination, amount_btc)?;
        if request.amount.is_dust() {
            log::warn!("withdrawing {} which is below the dust limit", request.amount);
        }
        log::info!("vault withdrawal of {} to {}", request.amount, request.destination_address);
        client
            .withdraw(&request.destination_address, request.amount.to_sat())
            .await
    }
}
