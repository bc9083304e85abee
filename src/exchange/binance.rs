use super::FuturesApi;
use crate::config::Config;
use crate::error::{ConfigError, ExchangeError};
use crate::types::{ApiErrorBody, OrderRequest, OrderResult};
use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use log::debug;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use sha2::Sha256;
use std::collections::BTreeMap;
use std::error::Error;

const ORDER_PATH: &str = "/fapi/v1/order";

// Unreserved characters stay literal so decimals go out as typed.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'.')
    .remove(b'-')
    .remove(b'_')
    .remove(b'~');

/// Signed REST client for the USDⓈ-M futures order endpoint.
pub struct BinanceFuturesClient {
    client: Client,
    base_url: String,
    api_secret: String,
    recv_window: u64,
}

impl BinanceFuturesClient {
    pub fn new(config: &Config) -> Result<Self, Box<dyn Error>> {
        let api_key = HeaderValue::from_str(&config.api_key).map_err(|e| ConfigError::Invalid {
            key: "BINANCE_API_KEY",
            value: "<redacted>".to_string(),
            reason: e.to_string(),
        })?;

        let mut headers = HeaderMap::new();
        headers.insert("x-mbx-apikey", api_key);
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_secret: config.api_secret.clone(),
            recv_window: config.recv_window,
        })
    }

    /// Query string for `order` with `timestamp`, `recvWindow` and a trailing `signature`.
    fn signed_query(&self, order: &OrderRequest, timestamp: i64) -> String {
        let mut params: BTreeMap<String, String> = order.to_params();
        params.insert("timestamp".to_string(), timestamp.to_string());
        params.insert("recvWindow".to_string(), self.recv_window.to_string());

        let query = encode_query(&params);
        let signature = sign(&self.api_secret, &query);
        format!("{}&signature={}", query, signature)
    }
}

#[async_trait]
impl FuturesApi for BinanceFuturesClient {
    async fn create_order(&self, order: &OrderRequest) -> Result<OrderResult, ExchangeError> {
        let query = self.signed_query(order, Utc::now().timestamp_millis());
        let url = format!("{}{}?{}", self.base_url, ORDER_PATH, query);

        debug!("POST {}{} {:?}", self.base_url, ORDER_PATH, order.to_params());

        let response = self.client.post(&url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!("order response {}: {}", status, body);

        parse_order_response(status, &body)
    }
}

fn encode_query(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, utf8_percent_encode(v, QUERY_VALUE)))
        .collect::<Vec<String>>()
        .join("&")
}

/// Hex HMAC-SHA256 of `payload` keyed with the API secret.
pub fn sign(secret: &str, payload: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn parse_order_response(status: u16, body: &str) -> Result<OrderResult, ExchangeError> {
    if (200..300).contains(&status) {
        return Ok(serde_json::from_str(body)?);
    }

    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(err) => Err(ExchangeError::Api {
            code: err.code,
            msg: err.msg,
        }),
        Err(_) => Err(ExchangeError::Http {
            status,
            body: body.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderSide;
    use rust_decimal::Decimal;

    const DOC_SECRET: &str = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";

    fn client(secret: &str) -> BinanceFuturesClient {
        let config = Config {
            api_key: "test-key".to_string(),
            api_secret: secret.to_string(),
            base_url: "http://127.0.0.1:1".to_string(),
            testnet: true,
            recv_window: 5000,
            log_file: None,
        };
        BinanceFuturesClient::new(&config).unwrap()
    }

    #[test]
    fn sign_matches_published_example() {
        let payload = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1\
                       &recvWindow=5000&timestamp=1499827319559";
        assert_eq!(
            sign(DOC_SECRET, payload),
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn signed_query_is_sorted_and_signed_last() {
        let order = OrderRequest::limit(
            "LTCBTC",
            OrderSide::Buy,
            Decimal::from(1),
            "0.1".parse().unwrap(),
        )
        .unwrap();

        let query = client(DOC_SECRET).signed_query(&order, 1499827319559);

        assert_eq!(
            query,
            "price=0.1&quantity=1&recvWindow=5000&side=BUY&symbol=LTCBTC&timeInForce=GTC\
             &timestamp=1499827319559&type=LIMIT\
             &signature=70fd30433bc3a2e3b5ff17d075e50538dde3734841da6dc28d79113dd37fa9c7"
        );
    }

    #[test]
    fn market_query_has_no_price_fields() {
        let order =
            OrderRequest::market("BTCUSDT", OrderSide::Sell, "0.01".parse().unwrap()).unwrap();
        let query = client("secret").signed_query(&order, 1);

        assert!(query.starts_with("quantity=0.01&recvWindow=5000&side=SELL&symbol=BTCUSDT"));
        assert!(!query.contains("price"));
        assert!(!query.contains("timeInForce"));
    }

    #[test]
    fn success_body_decodes() {
        let result = parse_order_response(
            200,
            r#"{"orderId":123,"status":"FILLED","executedQty":"0.01","symbol":"BTCUSDT"}"#,
        )
        .unwrap();

        assert_eq!(result.order_id, 123);
        assert_eq!(result.status, "FILLED");
        assert_eq!(result.executed_qty.to_string(), "0.01");
    }

    #[test]
    fn error_body_maps_to_api_error() {
        let err = parse_order_response(400, r#"{"code":-2019,"msg":"Margin is insufficient."}"#)
            .unwrap_err();

        match err {
            ExchangeError::Api { code, msg } => {
                assert_eq!(code, -2019);
                assert_eq!(msg, "Margin is insufficient.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_error_body_keeps_status() {
        let err = parse_order_response(502, "<html>Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, ExchangeError::Http { status: 502, .. }));
    }

    #[test]
    fn garbage_success_body_is_decode_error() {
        let err = parse_order_response(200, "{}").unwrap_err();
        assert!(matches!(err, ExchangeError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let order =
            OrderRequest::market("BTCUSDT", OrderSide::Buy, "0.01".parse().unwrap()).unwrap();
        let err = client("secret").create_order(&order).await.unwrap_err();
        assert!(matches!(err, ExchangeError::Transport(_)));
    }
}
