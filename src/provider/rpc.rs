//! JSON-RPC response decoding shared by provider adapters

use crate::contract::TransactionReceipt;
use crate::error::{ProviderError, ProviderResult};
use alloy_primitives::TxHash;
use serde_json::Value;

/// Hex (`0x1a`) or decimal quantity.
pub fn parse_quantity(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) if !hex.is_empty() => u64::from_str_radix(hex, 16).ok(),
        Some(_) => None,
        None => raw.parse().ok(),
    }
}

/// Quantity given either as a JSON number or a string.
pub fn quantity(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => parse_quantity(s),
        _ => None,
    }
}

pub fn parse_hash(raw: &str) -> ProviderResult<TxHash> {
    raw.trim()
        .parse::<TxHash>()
        .map_err(|e| ProviderError::InvalidResponse(format!("transaction hash {:?}: {}", raw, e)))
}

/// String entries of a JSON array; anything else yields an empty list.
pub fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

/// `eth_getTransactionReceipt` result. `Ok(None)` while still pending.
pub fn parse_receipt(value: &Value) -> ProviderResult<Option<TransactionReceipt>> {
    if value.is_null() {
        return Ok(None);
    }
    let hash = value
        .get("transactionHash")
        .and_then(Value::as_str)
        .ok_or_else(|| ProviderError::InvalidResponse("receipt without transactionHash".into()))?;
    let status = value
        .get("status")
        .and_then(quantity)
        .ok_or_else(|| ProviderError::InvalidResponse("receipt without status".into()))?;
    Ok(Some(TransactionReceipt {
        transaction_hash: parse_hash(hash)?,
        status: status == 1,
        block_number: value.get("blockNumber").and_then(quantity),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const HASH: &str = "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b";

    #[test]
    fn quantities_accept_hex_and_decimal() {
        assert_eq!(parse_quantity("0x4"), Some(4));
        assert_eq!(parse_quantity("137"), Some(137));
        assert_eq!(parse_quantity("0x"), None);
        assert_eq!(quantity(&json!(5)), Some(5));
        assert_eq!(quantity(&json!("0xa")), Some(10));
        assert_eq!(quantity(&json!(null)), None);
    }

    #[test]
    fn receipt_status_decodes() {
        let ok = parse_receipt(&json!({"transactionHash": HASH, "status": "0x1", "blockNumber": "0x10"}))
            .unwrap()
            .unwrap();
        assert!(ok.status);
        assert_eq!(ok.block_number, Some(16));
        assert_eq!(ok.transaction_hash, parse_hash(HASH).unwrap());

        let reverted = parse_receipt(&json!({"transactionHash": HASH, "status": "0x0"})).unwrap().unwrap();
        assert!(!reverted.status);
        assert!(parse_receipt(&Value::Null).unwrap().is_none());
        assert!(parse_receipt(&json!({"status": "0x1"})).is_err());
    }

    #[test]
    fn string_list_skips_non_strings() {
        assert_eq!(string_list(&json!(["0xabc", 1, "0xdef"])), vec!["0xabc", "0xdef"]);
        assert!(string_list(&json!("0xabc")).is_empty());
    }
}
