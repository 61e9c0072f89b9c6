//! Full trading-cycle test: intents are built into orders, filled on the
//! paper exchange, applied to the portfolio, and snapshotted losslessly.

use chrono::{DateTime, Duration, TimeZone, Utc};
use configuration::{Config, PaperParams};
use core_types::{Asset, OrderStatus};
use executor::{Exchange, OrderManager, PaperExchange};
use ledger::{Portfolio, Record};
use rust_decimal_macros::dec;
use std::collections::HashMap;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn config() -> Config {
    Config {
        cash_currency: "USDT".to_string(),
        deposits: HashMap::from([("USDT".to_string(), dec!(10000))]),
        paper: PaperParams { fee_pct: dec!(0) },
    }
}

#[tokio::test]
async fn buy_mark_sell_cycle_keeps_ledger_and_exchange_in_agreement() {
    let config = config();
    let asset = Asset::new("BTC", "USDT");
    let manager = OrderManager::new();

    let mut paper = PaperExchange::new(&config.paper, t0());
    paper.deposit("USDT", dec!(10000)).unwrap();
    let mut portfolio = Portfolio::new("USDT", dec!(10000)).unwrap();

    // Cycle 1: buy 1 BTC at 10000.
    let buy = manager
        .build_limit_buy_order(&mut portfolio.balance, &paper, &asset, dec!(1), dec!(10000), t0())
        .unwrap();
    let mut orders = manager.process_orders(&mut paper, vec![buy]).await.unwrap();
    assert_eq!(orders[0].status, OrderStatus::Filled);

    let mut prices = HashMap::from([("BTC/USDT".to_string(), dec!(10000))]);
    portfolio.update(t0(), &orders, &prices).unwrap();
    portfolio.record_period(t0(), t0()).unwrap();

    assert_eq!(portfolio.total_value().unwrap(), dec!(10000));
    assert_eq!(portfolio.performance.latest().unwrap().pnl, dec!(0));

    // Cycle 2: price moves to 11000, sell the position.
    let t1 = t0() + Duration::minutes(1);
    paper.set_time(t1);
    let sell = manager
        .build_limit_sell_order(&mut portfolio.balance, &paper, &asset, dec!(1), dec!(11000), t1)
        .unwrap();
    orders.push(sell);
    orders = manager.process_orders(&mut paper, orders).await.unwrap();

    prices.insert("BTC/USDT".to_string(), dec!(11000));
    portfolio.update(t1, &orders, &prices).unwrap();
    portfolio.record_period(t0(), t1).unwrap();

    // Position closed and pruned, profit realized into cash.
    assert!(portfolio.positions.is_empty());
    assert_eq!(portfolio.cash().unwrap(), dec!(11000));
    let period = portfolio.performance.latest().unwrap();
    assert_eq!(period.pnl, dec!(1000));
    assert_eq!(period.returns, dec!(0.1));

    // The exchange-side account saw the same flows.
    let exchange_balance = paper.fetch_balance().await.unwrap();
    assert_eq!(exchange_balance.get("USDT").unwrap().free, dec!(11000));
    assert_eq!(exchange_balance.get("BTC").unwrap().free, dec!(0));

    // The whole session snapshots and rehydrates without loss.
    let record = Record {
        config,
        balance: exchange_balance,
        portfolio,
        orders,
    };
    let json = serde_json::to_string(&record).unwrap();
    let back: Record = serde_json::from_str(&json).unwrap();
    assert_eq!(back, record);
}

#[tokio::test]
async fn a_failed_order_does_not_stop_the_cycle() {
    let config = config();
    let asset = Asset::new("BTC", "USDT");
    let manager = OrderManager::new();

    let mut paper = PaperExchange::new(&config.paper, t0());
    paper.deposit("USDT", dec!(10000)).unwrap();
    let mut portfolio = Portfolio::new("USDT", dec!(10000)).unwrap();

    // One affordable order, one not.
    let small = manager
        .build_limit_buy_order(&mut portfolio.balance, &paper, &asset, dec!(0.5), dec!(10000), t0())
        .unwrap();
    let too_big = manager
        .build_limit_buy_order(&mut portfolio.balance, &paper, &asset, dec!(10), dec!(10000), t0())
        .unwrap();
    assert_eq!(too_big.status, OrderStatus::Failed);

    let orders = manager
        .process_orders(&mut paper, vec![small, too_big])
        .await
        .unwrap();
    assert_eq!(manager.get_filled_orders(&orders).len(), 1);
    assert_eq!(manager.get_failed_orders(&orders).len(), 1);

    let prices = HashMap::from([("BTC/USDT".to_string(), dec!(10000))]);
    portfolio.update(t0(), &orders, &prices).unwrap();

    // Only the filled order moved funds.
    assert_eq!(portfolio.balance.get("USDT").unwrap().free, dec!(5000));
    assert_eq!(portfolio.positions["BTC/USDT"].quantity, dec!(0.5));
}
