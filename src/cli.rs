use crate::error::InputError;
use crate::exchange::FuturesApi;
use crate::gateway::OrderGateway;
use crate::types::{ensure_positive, OrderSide, OrderType};
use rust_decimal::Decimal;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

pub fn validate_side(side: &str) -> Result<OrderSide, InputError> {
    side.parse()
}

struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    fn ask(&mut self, prompt: &str) -> Result<String, InputError> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed").into());
        }
        Ok(line.trim().to_string())
    }

    fn ask_upper(&mut self, prompt: &str) -> Result<String, InputError> {
        Ok(self.ask(prompt)?.to_uppercase())
    }

    fn ask_decimal(&mut self, prompt: &str, field: &'static str) -> Result<Decimal, InputError> {
        let raw = self.ask(prompt)?;
        parse_positive(field, &raw)
    }
}

fn parse_positive(field: &'static str, raw: &str) -> Result<Decimal, InputError> {
    let value = Decimal::from_str(raw).map_err(|_| InputError::InvalidNumber {
        field,
        value: raw.to_string(),
    })?;
    ensure_positive(field, value)
}

/// Runs one prompt session: reads the order, places it, reports the outcome.
///
/// Returns an error only for bad input; exchange failures are reported to
/// `output` and end the session normally.
pub async fn run<R, W, A>(
    input: R,
    output: W,
    gateway: &OrderGateway<A>,
    testnet: bool,
) -> Result<(), InputError>
where
    R: BufRead,
    W: Write,
    A: FuturesApi,
{
    let mut prompt = Prompter { input, output };

    let network = if testnet { "Testnet" } else { "Mainnet" };
    writeln!(prompt.output, "\n--- Binance Futures {} Trading Bot ---", network)?;

    let symbol = prompt.ask_upper("Enter symbol (e.g. BTCUSDT): ")?;
    let side = validate_side(&prompt.ask_upper("Order side (BUY/SELL): ")?)?;
    let order_type = prompt.ask_upper("Order type (MARKET / LIMIT / STOP_LIMIT): ")?;
    let quantity = prompt.ask_decimal("Quantity: ", "quantity")?;

    let result = match OrderType::from_input(&order_type) {
        Some(OrderType::Market) => gateway.place_market_order(&symbol, side, quantity).await,
        Some(OrderType::Limit) => {
            let price = prompt.ask_decimal("Limit price: ", "price")?;
            gateway
                .place_limit_order(&symbol, side, quantity, price)
                .await
        }
        Some(OrderType::StopLimit) => {
            let stop_price = prompt.ask_decimal("Stop price: ", "stop price")?;
            let price = prompt.ask_decimal("Limit price: ", "price")?;
            gateway
                .place_stop_limit_order(&symbol, side, quantity, stop_price, price)
                .await
        }
        None => {
            writeln!(prompt.output, "Invalid order type")?;
            return Ok(());
        }
    };

    match result {
        Ok(order) => {
            writeln!(prompt.output, "\nOrder Placed Successfully!")?;
            writeln!(prompt.output, "Order ID: {}", order.order_id)?;
            writeln!(prompt.output, "Status: {}", order.status)?;
            writeln!(prompt.output, "Executed Qty: {}", order.executed_qty)?;
        }
        Err(_) => writeln!(prompt.output, "Order Failed. Check logs for details.")?,
    }

    Ok(())
}
