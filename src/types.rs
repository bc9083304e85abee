use crate::error::InputError;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

impl FromStr for OrderSide {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(OrderSide::Buy),
            "SELL" => Ok(OrderSide::Sell),
            _ => Err(InputError::InvalidSide(s.to_string())),
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderType {
    Market,
    Limit,
    StopLimit,
}

impl OrderType {
    /// Parses the name a user types at the prompt.
    pub fn from_input(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "MARKET" => Some(OrderType::Market),
            "LIMIT" => Some(OrderType::Limit),
            "STOP_LIMIT" => Some(OrderType::StopLimit),
            _ => None,
        }
    }

    /// Name sent in the `type` parameter. Futures calls a stop-limit order `STOP`.
    pub fn wire_name(&self) -> &'static str {
        match self {
            OrderType::Market => "MARKET",
            OrderType::Limit => "LIMIT",
            OrderType::StopLimit => "STOP",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderType::Market => "MARKET",
            OrderType::Limit => "LIMIT",
            OrderType::StopLimit => "STOP_LIMIT",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeInForce {
    Gtc,
}

impl TimeInForce {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInForce::Gtc => "GTC",
        }
    }
}

/// A single futures order, built through the constructor for its type so the
/// price fields present always match the order type.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    symbol: String,
    side: OrderSide,
    order_type: OrderType,
    quantity: Decimal,
    price: Option<Decimal>,
    stop_price: Option<Decimal>,
    time_in_force: Option<TimeInForce>,
}

impl OrderRequest {
    pub fn market(symbol: &str, side: OrderSide, quantity: Decimal) -> Result<Self, InputError> {
        Ok(Self {
            symbol: symbol.trim().to_uppercase(),
            side,
            order_type: OrderType::Market,
            quantity: ensure_positive("quantity", quantity)?,
            price: None,
            stop_price: None,
            time_in_force: None,
        })
    }

    pub fn limit(
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<Self, InputError> {
        Ok(Self {
            symbol: symbol.trim().to_uppercase(),
            side,
            order_type: OrderType::Limit,
            quantity: ensure_positive("quantity", quantity)?,
            price: Some(ensure_positive("price", price)?),
            stop_price: None,
            time_in_force: Some(TimeInForce::Gtc),
        })
    }

    pub fn stop_limit(
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
        stop_price: Decimal,
        price: Decimal,
    ) -> Result<Self, InputError> {
        Ok(Self {
            symbol: symbol.trim().to_uppercase(),
            side,
            order_type: OrderType::StopLimit,
            quantity: ensure_positive("quantity", quantity)?,
            price: Some(ensure_positive("price", price)?),
            stop_price: Some(ensure_positive("stop price", stop_price)?),
            time_in_force: Some(TimeInForce::Gtc),
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn side(&self) -> OrderSide {
        self.side
    }

    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn price(&self) -> Option<Decimal> {
        self.price
    }

    pub fn stop_price(&self) -> Option<Decimal> {
        self.stop_price
    }

    /// Order parameters as sent to the exchange, before timestamp and signature.
    pub fn to_params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert("symbol".to_string(), self.symbol.clone());
        params.insert("side".to_string(), self.side.as_str().to_string());
        params.insert("type".to_string(), self.order_type.wire_name().to_string());
        params.insert("quantity".to_string(), self.quantity.to_string());

        if let Some(price) = self.price {
            params.insert("price".to_string(), price.to_string());
        }
        if let Some(stop_price) = self.stop_price {
            params.insert("stopPrice".to_string(), stop_price.to_string());
        }
        if let Some(tif) = self.time_in_force {
            params.insert("timeInForce".to_string(), tif.as_str().to_string());
        }

        params
    }
}

pub(crate) fn ensure_positive(
    field: &'static str,
    value: Decimal,
) -> Result<Decimal, InputError> {
    if value <= Decimal::ZERO {
        return Err(InputError::NotPositive {
            field,
            value: value.to_string(),
        });
    }
    Ok(value)
}

/// The part of the order response that gets reported back to the user.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResult {
    pub order_id: i64,
    pub status: String,
    pub executed_qty: Decimal,
}

/// Error body returned by the futures API on a rejected request.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub code: i64,
    pub msg: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn side_accepts_buy_and_sell_in_any_case() {
        assert_eq!("BUY".parse::<OrderSide>().unwrap(), OrderSide::Buy);
        assert_eq!("sell".parse::<OrderSide>().unwrap(), OrderSide::Sell);
        assert_eq!(" Buy \n".parse::<OrderSide>().unwrap(), OrderSide::Buy);
    }

    #[test]
    fn side_rejects_anything_else() {
        for bad in ["", "LONG", "SHORT", "B", "BUYY", "HOLD"] {
            let err = bad.parse::<OrderSide>().unwrap_err();
            assert!(matches!(err, InputError::InvalidSide(_)), "{bad}");
            assert_eq!(err.to_string(), "Side must be BUY or SELL");
        }
    }

    #[test]
    fn order_type_from_input() {
        assert_eq!(OrderType::from_input("market"), Some(OrderType::Market));
        assert_eq!(OrderType::from_input("LIMIT"), Some(OrderType::Limit));
        assert_eq!(OrderType::from_input("stop_limit"), Some(OrderType::StopLimit));
        assert_eq!(OrderType::from_input("STOP"), None);
        assert_eq!(OrderType::from_input("OCO"), None);
    }

    #[test]
    fn market_order_sends_only_symbol_side_type_quantity() {
        let order = OrderRequest::market("btcusdt", OrderSide::Buy, dec("0.01")).unwrap();
        let params = order.to_params();

        assert_eq!(params.len(), 4);
        assert_eq!(params["symbol"], "BTCUSDT");
        assert_eq!(params["side"], "BUY");
        assert_eq!(params["type"], "MARKET");
        assert_eq!(params["quantity"], "0.01");
        assert!(!params.contains_key("price"));
        assert!(!params.contains_key("stopPrice"));
        assert!(!params.contains_key("timeInForce"));
    }

    #[test]
    fn limit_order_carries_price_and_gtc() {
        let order =
            OrderRequest::limit("ETHUSDT", OrderSide::Sell, dec("1.5"), dec("3200.25")).unwrap();
        let params = order.to_params();

        assert_eq!(params["type"], "LIMIT");
        assert_eq!(params["price"], "3200.25");
        assert_eq!(params["timeInForce"], "GTC");
        assert!(!params.contains_key("stopPrice"));
    }

    #[test]
    fn stop_limit_order_carries_both_prices() {
        let order = OrderRequest::stop_limit(
            "BTCUSDT",
            OrderSide::Buy,
            dec("0.002"),
            dec("65000"),
            dec("65100.5"),
        )
        .unwrap();
        let params = order.to_params();

        assert_eq!(order.order_type(), OrderType::StopLimit);
        assert_eq!(params["type"], "STOP");
        assert_eq!(params["stopPrice"], "65000");
        assert_eq!(params["price"], "65100.5");
        assert_eq!(params["timeInForce"], "GTC");
    }

    #[test]
    fn non_positive_values_are_rejected() {
        assert!(matches!(
            OrderRequest::market("BTCUSDT", OrderSide::Buy, Decimal::ZERO),
            Err(InputError::NotPositive { field: "quantity", .. })
        ));
        assert!(matches!(
            OrderRequest::limit("BTCUSDT", OrderSide::Buy, dec("1"), dec("-5")),
            Err(InputError::NotPositive { field: "price", .. })
        ));
        assert!(matches!(
            OrderRequest::stop_limit("BTCUSDT", OrderSide::Buy, dec("1"), dec("0"), dec("5")),
            Err(InputError::NotPositive { field: "stop price", .. })
        ));
    }

    #[test]
    fn order_result_keeps_executed_qty_as_sent() {
        let body = r#"{
            "orderId": 123,
            "symbol": "BTCUSDT",
            "status": "FILLED",
            "clientOrderId": "abc",
            "price": "0",
            "origQty": "0.010",
            "executedQty": "0.010",
            "type": "MARKET",
            "side": "BUY"
        }"#;
        let result: OrderResult = serde_json::from_str(body).unwrap();

        assert_eq!(result.order_id, 123);
        assert_eq!(result.status, "FILLED");
        assert_eq!(result.executed_qty.to_string(), "0.010");
    }
}
