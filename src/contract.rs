//! Mint contract handle - ABI encoding and transaction submission

use crate::error::ProviderResult;
use crate::provider::Library;
use alloy_primitives::{Address, Bytes, TxHash};
use alloy_sol_types::{sol, SolCall};
use serde::{Deserialize, Serialize};

sol! {
    /// Mint entrypoint of the deployed ERC-721 collection.
    interface IMintableNft {
        function safeMint(address to, string uri) external;
    }
}

/// Unsigned transaction handed to the wallet for signing and broadcast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub from: String,
    pub to: Address,
    pub data: Bytes,
}

/// Confirmation of a mined transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: TxHash,
    /// `true` when the execution succeeded (`status == 0x1`)
    pub status: bool,
    pub block_number: Option<u64>,
}

/// Contract handle bound to `(library, signer)`.
///
/// Cheap to clone; rebuilt whenever the signer account or the library changes.
#[derive(Clone)]
pub struct MintContract {
    address: Address,
    signer: String,
    library: Library,
}

impl MintContract {
    pub fn new(address: Address, library: Library, signer: impl Into<String>) -> Self {
        Self { address, signer: signer.into(), library }
    }

    pub fn address(&self) -> Address { self.address }
    pub fn signer(&self) -> &str { &self.signer }

    /// `safeMint(to, uri)` calldata
    pub fn encode_safe_mint(to: Address, uri: &str) -> Bytes {
        IMintableNft::safeMintCall { to, uri: uri.to_string() }.abi_encode().into()
    }

    pub fn safe_mint_request(&self, to: Address, uri: &str) -> TransactionRequest {
        TransactionRequest {
            from: self.signer.clone(),
            to: self.address,
            data: Self::encode_safe_mint(to, uri),
        }
    }

    /// Submit `safeMint(to, uri)`. Resolves as soon as the wallet returns the hash.
    pub async fn safe_mint(&self, to: Address, uri: &str) -> ProviderResult<PendingMint> {
        let request = self.safe_mint_request(to, uri);
        let transaction_hash = self.library.provider().send_transaction(&request).await?;
        Ok(PendingMint { transaction_hash, library: self.library.clone() })
    }
}

/// Submitted, not yet confirmed
pub struct PendingMint {
    transaction_hash: TxHash,
    library: Library,
}

impl PendingMint {
    pub fn transaction_hash(&self) -> TxHash { self.transaction_hash }

    /// Wait for the transaction to be mined.
    pub async fn wait(self) -> ProviderResult<TransactionReceipt> {
        self.library.provider().transaction_receipt(self.transaction_hash).await
    }
}
