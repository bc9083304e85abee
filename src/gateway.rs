use crate::error::{ExchangeError, InputError};
use crate::exchange::FuturesApi;
use crate::types::{OrderRequest, OrderResult, OrderSide, OrderType};
use log::{error, info};
use rust_decimal::Decimal;
use thiserror::Error;

/// Why an order placement produced no result.
#[derive(Debug, Error)]
pub enum OrderFailure {
    #[error(transparent)]
    Rejected(#[from] InputError),
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
}

/// Places futures orders through an exchange client. Every outcome is logged
/// here and handed back as a `Result`; nothing is retried.
pub struct OrderGateway<A> {
    api: A,
}

impl<A: FuturesApi> OrderGateway<A> {
    pub fn new(api: A) -> Self {
        info!("Trading Bot Initialized");
        Self { api }
    }

    pub async fn place_market_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
    ) -> Result<OrderResult, OrderFailure> {
        let order = OrderRequest::market(symbol, side, quantity)
            .map_err(|e| rejected("Market", e))?;
        self.place_order(&order).await
    }

    pub async fn place_limit_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<OrderResult, OrderFailure> {
        let order = OrderRequest::limit(symbol, side, quantity, price)
            .map_err(|e| rejected("Limit", e))?;
        self.place_order(&order).await
    }

    pub async fn place_stop_limit_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
        stop_price: Decimal,
        price: Decimal,
    ) -> Result<OrderResult, OrderFailure> {
        let order = OrderRequest::stop_limit(symbol, side, quantity, stop_price, price)
            .map_err(|e| rejected("Stop-Limit", e))?;
        self.place_order(&order).await
    }

    #[cfg(test)]
    pub(crate) fn into_api(self) -> A {
        self.api
    }

    pub async fn place_order(&self, order: &OrderRequest) -> Result<OrderResult, OrderFailure> {
        let label = label(order);
        match self.api.create_order(order).await {
            Ok(result) => {
                info!(
                    "{} Order Response: symbol={} side={} quantity={} price={:?} stopPrice={:?} \
                     orderId={} status={} executedQty={}",
                    label,
                    order.symbol(),
                    order.side(),
                    order.quantity(),
                    order.price(),
                    order.stop_price(),
                    result.order_id,
                    result.status,
                    result.executed_qty
                );
                Ok(result)
            }
            Err(e) => {
                error!("{} Order Error: {}", label, e);
                Err(e.into())
            }
        }
    }
}

fn label(order: &OrderRequest) -> &'static str {
    match order.order_type() {
        OrderType::Market => "Market",
        OrderType::Limit => "Limit",
        OrderType::StopLimit => "Stop-Limit",
    }
}

fn rejected(label: &str, e: InputError) -> OrderFailure {
    error!("{} Order Error: {}", label, e);
    OrderFailure::Rejected(e)
}
