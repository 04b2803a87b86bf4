//! Account balance record.

use serde::{Deserialize, Serialize};

use crate::decimal::Quantity;

/// Balance of one currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    #[serde(rename = "Currency")]
    pub currency: String,
    #[serde(rename = "Balance", default = "zero")]
    pub balance: Quantity,
    #[serde(rename = "Available", default = "zero")]
    pub available: Quantity,
    #[serde(rename = "Pending", default = "zero")]
    pub pending: Quantity,
}

fn zero() -> Quantity {
    Quantity::ZERO
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_balance() {
        let json = r#"{
            "Currency": "DOGE",
            "Balance": 4.21549076,
            "Available": 4.21549076,
            "Pending": 0.0,
            "CryptoAddress": "DLxcEt3AatMyr2NTatzjsfHNoB9NT62HiF",
            "Requested": false,
            "Uuid": null
        }"#;
        let balance: Balance = serde_json::from_str(json).unwrap();
        assert_eq!(balance.currency, "DOGE");
        assert_eq!(balance.available.0, dec!(4.21549076));
        assert_eq!(balance.pending, Quantity::ZERO);
    }
}
