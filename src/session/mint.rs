//! Minter - submits one `safeMint` and tracks it through confirmation
//!
//! At most one mint is pending at a time. Each mint gets an operation token;
//! its completion only writes back while the store still carries that token,
//! so a reset (or a newer session) is never clobbered by a late confirmation.

use super::store::{MintState, MintStatus, SessionStore};
use crate::contract::TransactionReceipt;
use crate::error::MintError;
use alloy_primitives::Address;

#[derive(Clone)]
pub struct Minter {
    store: SessionStore,
}

impl Minter {
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    /// Mint `uri` to `address_to` through the session's contract handle.
    ///
    /// `Reverted` is returned when the transaction was mined with a failure
    /// status; the snapshot records `result = failure` in that case too.
    pub async fn mint(&self, address_to: &str, uri: &str) -> Result<TransactionReceipt, MintError> {
        self.store.read(|s| {
            if !s.session.connected || s.session.mint_contract.is_none() {
                return Err(MintError::NotConnected);
            }
            if s.mint.pending {
                return Err(MintError::MintPending);
            }
            Ok(())
        })?;
        let to = parse_inputs(address_to, uri)?;

        let (id, contract) = self.store.update(|s| {
            s.mint_seq += 1;
            s.mint = MintState {
                id: s.mint_seq,
                pending: true,
                address_to: address_to.to_string(),
                uri: uri.to_string(),
                ..MintState::default()
            };
            (s.mint_seq, s.session.mint_contract.clone())
        });
        let Some(contract) = contract else {
            return Err(MintError::NotConnected);
        };
        tracing::info!("mint {} submitting safeMint({}, {})", id, to, uri);

        let pending = match contract.safe_mint(to, uri).await {
            Ok(pending) => pending,
            Err(e) => {
                self.finish(id, MintStatus::Failure, Some(e.to_string()));
                tracing::warn!("mint {} submission failed: {}", id, e);
                return Err(MintError::SubmissionFailed(e.to_string()));
            }
        };

        let transaction_hash = pending.transaction_hash();
        self.apply(id, |mint| mint.transaction_hash = Some(transaction_hash));
        tracing::info!("mint {} submitted as {}", id, transaction_hash);

        match pending.wait().await {
            Err(e) => {
                self.finish(id, MintStatus::Failure, Some(e.to_string()));
                tracing::warn!("mint {} confirmation failed: {}", id, e);
                Err(MintError::SubmissionFailed(e.to_string()))
            }
            Ok(receipt) if !receipt.status => {
                self.finish(id, MintStatus::Failure, Some(format!("transaction {} reverted", transaction_hash)));
                tracing::warn!("mint {} reverted", id);
                Err(MintError::Reverted { transaction_hash })
            }
            Ok(receipt) => {
                self.finish(id, MintStatus::Success, None);
                tracing::info!("mint {} confirmed in block {:?}", id, receipt.block_number);
                Ok(receipt)
            }
        }
    }

    /// Mint using the `addressTo` / `uri` form fields held in the session.
    pub async fn mint_from_form(&self) -> Result<TransactionReceipt, MintError> {
        let (address_to, uri) = self.store.read(|s| (s.mint.address_to.clone(), s.mint.uri.clone()));
        self.mint(&address_to, &uri).await
    }

    fn finish(&self, id: u64, result: MintStatus, error: Option<String>) {
        self.apply(id, |mint| {
            mint.pending = false;
            mint.result = result;
            mint.error = error;
        });
    }

    /// Write back only while operation `id` still owns the mint state.
    fn apply(&self, id: u64, f: impl FnOnce(&mut MintState)) -> bool {
        if self.store.read(|s| s.mint.id != id) {
            tracing::debug!("mint {} finished after its session was reset", id);
            return false;
        }
        self.store.update(|s| f(&mut s.mint));
        true
    }
}

fn parse_inputs(address_to: &str, uri: &str) -> Result<Address, MintError> {
    let address_to = address_to.trim();
    if address_to.is_empty() {
        return Err(MintError::InvalidInput("recipient address is empty".into()));
    }
    if uri.trim().is_empty() {
        return Err(MintError::InvalidInput("token uri is empty".into()));
    }
    address_to
        .parse::<Address>()
        .map_err(|e| MintError::InvalidInput(format!("recipient {:?} is not an address: {}", address_to, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inputs_must_be_present_and_well_formed() {
        assert!(matches!(parse_inputs("", "ipfs://x"), Err(MintError::InvalidInput(_))));
        assert!(matches!(parse_inputs("0x00000000000000000000000000000000000000de", " "), Err(MintError::InvalidInput(_))));
        assert!(matches!(parse_inputs("0xDEF", "ipfs://x"), Err(MintError::InvalidInput(_))));
        let to = parse_inputs(" 0x00000000000000000000000000000000000000de ", "ipfs://x").unwrap();
        assert_eq!(to, Address::with_last_byte(0xde));
    }
}
