//! Order-related types.
//!
//! `Order` wraps the exchange's order record. The fields the refresher acts
//! on are typed views over that record, and the record itself is what gets
//! serialized, so a backup file holds exactly what the exchange returned.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use crate::decimal::{Quantity, Rate};
use crate::error::{CoreError, Result};
use crate::time::{format_exchange_timestamp, parse_exchange_timestamp};

/// Order type as reported by the exchange.
///
/// Anything other than `LIMIT_BUY`/`LIMIT_SELL` is kept as-is in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderType {
    LimitBuy,
    LimitSell,
    Other(String),
}

impl OrderType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::LimitBuy => "LIMIT_BUY",
            Self::LimitSell => "LIMIT_SELL",
            Self::Other(s) => s,
        }
    }

    /// Returns the limit side, or `None` for non-limit orders.
    pub fn limit_side(&self) -> Option<LimitSide> {
        match self {
            Self::LimitBuy => Some(LimitSide::Buy),
            Self::LimitSell => Some(LimitSide::Sell),
            Self::Other(_) => None,
        }
    }

    pub fn is_limit(&self) -> bool {
        self.limit_side().is_some()
    }
}

impl From<String> for OrderType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "LIMIT_BUY" => Self::LimitBuy,
            "LIMIT_SELL" => Self::LimitSell,
            _ => Self::Other(s),
        }
    }
}

impl From<OrderType> for String {
    fn from(t: OrderType) -> Self {
        match t {
            OrderType::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side of a limit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitSide {
    Buy,
    Sell,
}

impl LimitSide {
    pub fn order_type(&self) -> OrderType {
        match self {
            Self::Buy => OrderType::LimitBuy,
            Self::Sell => OrderType::LimitSell,
        }
    }
}

impl fmt::Display for LimitSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// An exchange order record exactly as received.
///
/// Field names and raw JSON values are kept in arrival order, so
/// serializing the record reproduces the exchange's own text for every
/// value (numbers such as `0.00000001` and timestamps such as
/// `2014-07-09T03:55:48.77` are not re-rendered).
#[derive(Debug, Clone, Default)]
pub struct OrderRecord {
    fields: Vec<(String, Box<RawValue>)>,
}

impl OrderRecord {
    /// Raw value of `key`, if present.
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| &**v)
    }

    /// Replace `key` in place, or append it when absent.
    fn set(&mut self, key: &str, value: Box<RawValue>) {
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key.to_string(), value)),
        }
    }

    /// Decode `key` as `T`.
    fn decode<T: DeserializeOwned>(&self, key: &'static str) -> Result<T> {
        let raw = self.get(key).ok_or_else(|| CoreError::MalformedOrder {
            field: key,
            reason: "missing".to_string(),
        })?;
        serde_json::from_str(raw.get()).map_err(|e| CoreError::MalformedOrder {
            field: key,
            reason: e.to_string(),
        })
    }
}

impl PartialEq for OrderRecord {
    fn eq(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(&other.fields)
                .all(|((ka, va), (kb, vb))| ka == kb && va.get() == vb.get())
    }
}

impl Serialize for OrderRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for OrderRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = OrderRecord;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an order object")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<OrderRecord, A::Error> {
                let mut fields = Vec::with_capacity(access.size_hint().unwrap_or(16));
                while let Some(entry) = access.next_entry::<String, Box<RawValue>>()? {
                    fields.push(entry);
                }
                Ok(OrderRecord { fields })
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

fn raw_json<T: Serialize + ?Sized>(key: &'static str, value: &T) -> Result<Box<RawValue>> {
    serde_json::value::to_raw_value(value).map_err(|e| CoreError::MalformedOrder {
        field: key,
        reason: e.to_string(),
    })
}

/// Decimals are written with their own digits, never in exponent form.
fn raw_decimal(key: &'static str, value: Decimal) -> Result<Box<RawValue>> {
    RawValue::from_string(value.to_string()).map_err(|e| CoreError::MalformedOrder {
        field: key,
        reason: e.to_string(),
    })
}

/// An order as returned by the exchange.
///
/// The typed accessors are read from the underlying [`OrderRecord`], which
/// is what gets serialized. Open-order listings name the type field
/// `OrderType`; single-order lookups name it `Type` and also carry `IsOpen`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OrderRecord", into = "OrderRecord")]
pub struct Order {
    record: OrderRecord,
    uuid: Uuid,
    market: String,
    order_type: OrderType,
    quantity_remaining: Quantity,
    limit: Rate,
    opened: DateTime<Utc>,
    is_open: Option<bool>,
}

impl Order {
    /// Build a record with the fields the refresher reads, in the order the
    /// exchange lists them.
    pub fn new(
        uuid: Uuid,
        market: impl Into<String>,
        order_type: OrderType,
        quantity_remaining: Quantity,
        limit: Rate,
        opened: DateTime<Utc>,
    ) -> Result<Self> {
        let market = market.into();
        let fields = vec![
            ("OrderUuid".to_string(), raw_json("OrderUuid", &uuid)?),
            ("Exchange".to_string(), raw_json("Exchange", &market)?),
            ("OrderType".to_string(), raw_json("OrderType", order_type.as_str())?),
            (
                "QuantityRemaining".to_string(),
                raw_decimal("QuantityRemaining", quantity_remaining.0)?,
            ),
            ("Limit".to_string(), raw_decimal("Limit", limit.0)?),
            (
                "Opened".to_string(),
                raw_json("Opened", &format_exchange_timestamp(&opened))?,
            ),
        ];
        Self::try_from(OrderRecord { fields })
    }

    /// Set `key` to `value` (appending it if absent) and re-read the typed
    /// fields.
    pub fn with_field(self, key: &'static str, value: Value) -> Result<Self> {
        let mut record = self.record;
        record.set(key, raw_json(key, &value)?);
        Self::try_from(record)
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Market symbol, e.g. `BTC-LTC`.
    pub fn market(&self) -> &str {
        &self.market
    }

    pub fn order_type(&self) -> &OrderType {
        &self.order_type
    }

    pub fn quantity_remaining(&self) -> Quantity {
        self.quantity_remaining
    }

    pub fn limit(&self) -> Rate {
        self.limit
    }

    pub fn opened(&self) -> DateTime<Utc> {
        self.opened
    }

    /// `IsOpen`, present on single-order lookups only.
    pub fn is_open(&self) -> Option<bool> {
        self.is_open
    }

    pub fn is_limit(&self) -> bool {
        self.order_type.is_limit()
    }

    /// Build the replacement for this order.
    pub fn replacement(&self) -> Result<ReplacementSpec> {
        ReplacementSpec::try_from(self)
    }
}

impl TryFrom<OrderRecord> for Order {
    type Error = CoreError;

    fn try_from(record: OrderRecord) -> Result<Self> {
        let type_key = if record.get("OrderType").is_some() {
            "OrderType"
        } else {
            "Type"
        };
        let opened: String = record.decode("Opened")?;
        let is_open = match record.get("IsOpen") {
            Some(_) => record.decode::<Option<bool>>("IsOpen")?,
            None => None,
        };

        Ok(Self {
            uuid: record.decode("OrderUuid")?,
            market: record.decode("Exchange")?,
            order_type: record.decode(type_key)?,
            quantity_remaining: record.decode("QuantityRemaining")?,
            limit: record.decode("Limit")?,
            opened: parse_exchange_timestamp(&opened)?,
            is_open,
            record,
        })
    }
}

impl From<Order> for OrderRecord {
    fn from(order: Order) -> Self {
        order.record
    }
}

/// A limit order to place in place of a cancelled one.
///
/// Market, side, and rate are carried over unchanged; the quantity is the
/// original order's remaining quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementSpec {
    pub market: String,
    pub side: LimitSide,
    pub quantity: Quantity,
    pub rate: Rate,
}

impl ReplacementSpec {
    pub fn order_type(&self) -> OrderType {
        self.side.order_type()
    }
}

impl TryFrom<&Order> for ReplacementSpec {
    type Error = CoreError;

    fn try_from(order: &Order) -> Result<Self> {
        let side = order
            .order_type
            .limit_side()
            .ok_or_else(|| CoreError::NotALimitOrder {
                uuid: order.uuid,
                order_type: order.order_type.to_string(),
            })?;

        Ok(Self {
            market: order.market.clone(),
            side,
            quantity: order.quantity_remaining,
            rate: order.limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const OPEN_ORDER_JSON: &str = r#"{
        "Uuid": null,
        "OrderUuid": "09aa5bb6-8232-41aa-9b78-a5a1093e0211",
        "Exchange": "BTC-LTC",
        "OrderType": "LIMIT_SELL",
        "Quantity": 5.0,
        "QuantityRemaining": 4.5,
        "Limit": 0.0125,
        "CommissionPaid": 0.0,
        "Price": 0.0,
        "PricePerUnit": null,
        "Opened": "2014-07-09T03:55:48.77",
        "Closed": null,
        "CancelInitiated": false,
        "ImmediateOrCancel": false,
        "IsConditional": false,
        "Condition": null,
        "ConditionTarget": null
    }"#;

    const GET_ORDER_JSON: &str = r#"{
        "AccountId": null,
        "OrderUuid": "0cb4c4e4-bdc7-4e13-8c13-430e587d2cc1",
        "Exchange": "BTC-SHLD",
        "Type": "LIMIT_BUY",
        "Quantity": 1000.0,
        "QuantityRemaining": 1000.0,
        "Limit": 0.00000001,
        "Opened": "2014-07-13T07:45:46.27",
        "Closed": null,
        "IsOpen": true
    }"#;

    #[test]
    fn test_order_type_round_trips_unknown() {
        let t = OrderType::from("MARKET_BUY".to_string());
        assert_eq!(t, OrderType::Other("MARKET_BUY".to_string()));
        assert!(!t.is_limit());
        assert_eq!(String::from(t), "MARKET_BUY");
    }

    #[test]
    fn test_parse_open_order_listing() {
        let order: Order = serde_json::from_str(OPEN_ORDER_JSON).unwrap();
        assert_eq!(order.market(), "BTC-LTC");
        assert_eq!(order.order_type(), &OrderType::LimitSell);
        assert_eq!(order.quantity_remaining().0, dec!(4.5));
        assert_eq!(order.limit().0, dec!(0.0125));
        assert_eq!(order.is_open(), None);
        let json = serde_json::to_string(&order).unwrap();
        assert!(json.contains(r#""CommissionPaid":0.0,"Price":0.0"#));
        assert!(!json.contains("IsOpen"));
    }

    #[test]
    fn test_parse_single_order_lookup() {
        let order: Order = serde_json::from_str(GET_ORDER_JSON).unwrap();
        assert_eq!(order.order_type(), &OrderType::LimitBuy);
        assert_eq!(order.limit().0, dec!(0.00000001));
        assert_eq!(order.is_open(), Some(true));
    }

    #[test]
    fn test_serialization_is_verbatim() {
        let compact = r#"{"Uuid":null,"OrderUuid":"09aa5bb6-8232-41aa-9b78-a5a1093e0211","Exchange":"BTC-LTC","OrderType":"LIMIT_SELL","Quantity":5.0,"QuantityRemaining":4.5,"Limit":0.00000001,"CommissionPaid":0.0,"Price":0.0,"PricePerUnit":null,"Opened":"2014-07-09T03:55:48.77","Closed":null,"CancelInitiated":false,"ImmediateOrCancel":false,"IsConditional":false,"Condition":null,"ConditionTarget":null}"#;
        let order: Order = serde_json::from_str(compact).unwrap();

        assert_eq!(serde_json::to_string(&order).unwrap(), compact);
    }

    #[test]
    fn test_pretty_serialization_keeps_field_order() {
        let order: Order = serde_json::from_str(OPEN_ORDER_JSON).unwrap();

        let pretty = serde_json::to_string_pretty(&order).unwrap();
        let reparsed: Order = serde_json::from_str(&pretty).unwrap();
        assert_eq!(reparsed, order);
        assert!(pretty.contains(r#""Opened": "2014-07-09T03:55:48.77""#));
        assert!(pretty.starts_with("{\n  \"Uuid\": null,\n  \"OrderUuid\""));
    }

    #[test]
    fn test_new_writes_plain_decimals() {
        let order = Order::new(
            Uuid::nil(),
            "BTC-SHLD",
            OrderType::LimitBuy,
            Quantity::new(dec!(1000)),
            Rate::new(dec!(0.00000001)),
            parse_exchange_timestamp("2014-07-13T07:45:46.27").unwrap(),
        )
        .unwrap();

        let json = serde_json::to_string(&order).unwrap();
        assert!(json.contains(r#""Limit":0.00000001"#));
        assert!(json.contains(r#""OrderType":"LIMIT_BUY""#));
        assert_eq!(order.limit(), Rate::new(dec!(0.00000001)));
        assert_eq!(order.is_open(), None);
    }

    #[test]
    fn test_with_field_replaces_in_place() {
        let order: Order = serde_json::from_str(OPEN_ORDER_JSON).unwrap();
        let order = order
            .with_field("OrderType", serde_json::json!("MARKET_SELL"))
            .unwrap()
            .with_field("IsOpen", serde_json::json!(false))
            .unwrap();

        assert_eq!(order.order_type(), &OrderType::Other("MARKET_SELL".to_string()));
        assert_eq!(order.is_open(), Some(false));
        let json = serde_json::to_string(&order).unwrap();
        assert!(json.contains(r#""Exchange":"BTC-LTC","OrderType":"MARKET_SELL","Quantity""#));
        assert!(json.ends_with(r#""ConditionTarget":null,"IsOpen":false}"#));
    }

    #[test]
    fn test_missing_typed_field_is_malformed() {
        let without_market = OPEN_ORDER_JSON.replace(r#""Exchange": "BTC-LTC","#, "");
        let err = serde_json::from_str::<Order>(&without_market)
            .unwrap_err()
            .to_string();
        assert!(err.contains("Exchange") && err.contains("missing"), "{err}");
    }

    #[test]
    fn test_replacement_preserves_market_side_rate_and_remaining() {
        let order: Order = serde_json::from_str(OPEN_ORDER_JSON).unwrap();
        let spec = order.replacement().unwrap();

        assert_eq!(spec.market, order.market());
        assert_eq!(spec.side, LimitSide::Sell);
        assert_eq!(&spec.order_type(), order.order_type());
        assert_eq!(spec.quantity, order.quantity_remaining());
        assert_eq!(spec.rate, order.limit());
    }

    #[test]
    fn test_replacement_rejects_non_limit() {
        let order: Order = serde_json::from_str(OPEN_ORDER_JSON).unwrap();
        let order = order
            .with_field("OrderType", serde_json::json!("MARKET_SELL"))
            .unwrap();

        let err = order.replacement().unwrap_err();
        assert!(matches!(err, CoreError::NotALimitOrder { .. }));
    }
}
