pub mod binance;

use crate::error::ExchangeError;
use crate::types::{OrderRequest, OrderResult};
use async_trait::async_trait;

pub use binance::BinanceFuturesClient;

/// Order-creation endpoint of a futures exchange.
#[async_trait]
pub trait FuturesApi: Send + Sync {
    async fn create_order(&self, order: &OrderRequest) -> Result<OrderResult, ExchangeError>;
}
