use anyhow::{bail, Context};
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use configuration::Config;
use core_types::Asset;
use executor::{Exchange, OrderManager, PaperExchange};
use ledger::{Portfolio, Record};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// A crypto-trading research ledger: order lifecycle, fund accounting,
/// cost-basis positions, and period performance over a simulated exchange.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one buy(/sell) cycle through the paper exchange and report the
    /// resulting portfolio.
    Simulate(SimulateArgs),
    /// Print the contents of a previously saved Record snapshot.
    Show(ShowArgs),
}

#[derive(Parser)]
struct SimulateArgs {
    /// Path to the session configuration file.
    #[arg(long, default_value = "config")]
    config: String,

    /// The pair to trade (e.g. "BTC/USDT").
    #[arg(long)]
    symbol: String,

    /// Quantity to buy, in base-currency units.
    #[arg(long)]
    quantity: Decimal,

    /// Limit price for the buy.
    #[arg(long)]
    buy_price: Decimal,

    /// Optional limit price to sell the same quantity back.
    #[arg(long)]
    sell_price: Option<Decimal>,

    /// Write the final Record snapshot to this JSON file.
    #[arg(long)]
    snapshot: Option<String>,
}

#[derive(Parser)]
struct ShowArgs {
    /// Path to a Record snapshot written by `simulate`.
    #[arg(long)]
    snapshot: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Simulate(args) => simulate(args).await,
        Commands::Show(args) => show(args),
    }
}

fn parse_symbol(symbol: &str) -> anyhow::Result<Asset> {
    match symbol.split_once('/') {
        Some((base, quote)) if !base.is_empty() && !quote.is_empty() => {
            Ok(Asset::new(base, quote))
        }
        _ => bail!("invalid symbol {symbol:?}, expected BASE/QUOTE"),
    }
}

async fn simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let config = configuration::load_config(&args.config)
        .with_context(|| format!("loading configuration from {:?}", args.config))?;
    let asset = parse_symbol(&args.symbol)?;

    let start = Utc::now();
    let mut now = start;

    // The exchange-side account and the ledger-side portfolio are funded
    // identically; the cycle below should keep them in agreement.
    let mut paper = PaperExchange::new(&config.paper, now);
    let mut portfolio = Portfolio::new(&config.cash_currency, config.starting_cash())?;
    for (currency, amount) in &config.deposits {
        paper.deposit(currency, *amount)?;
        if currency != &config.cash_currency {
            portfolio.deposit(currency, *amount)?;
        }
    }

    let manager = OrderManager::new();
    let mut orders = Vec::new();

    let buy = manager.build_limit_buy_order(
        &mut portfolio.balance,
        &paper,
        &asset,
        args.quantity,
        args.buy_price,
        now,
    )?;
    orders.push(buy);
    orders = manager.process_orders(&mut paper, orders).await?;
    tracing::info!(
        filled = manager.get_filled_orders(&orders).len(),
        failed = manager.get_failed_orders(&orders).len(),
        "buy cycle processed"
    );

    let mut prices = HashMap::from([(asset.symbol(), args.buy_price)]);
    portfolio.update(now, &orders, &prices)?;
    portfolio.record_period(start, now)?;

    if let Some(sell_price) = args.sell_price {
        let period_start = now;
        now += Duration::minutes(1);
        paper.set_time(now);

        let sell = manager.build_limit_sell_order(
            &mut portfolio.balance,
            &paper,
            &asset,
            args.quantity,
            sell_price,
            now,
        )?;
        orders.push(sell);
        orders = manager.process_orders(&mut paper, orders).await?;

        prices.insert(asset.symbol(), sell_price);
        portfolio.update(now, &orders, &prices)?;
        portfolio.record_period(period_start, now)?;
    }

    let record = Record {
        config,
        balance: paper.fetch_balance().await?,
        portfolio,
        orders,
    };
    print_record(&record)?;

    if let Some(path) = args.snapshot {
        let json = serde_json::to_string_pretty(&record)?;
        std::fs::write(&path, json).with_context(|| format!("writing snapshot to {path:?}"))?;
        println!("\nSnapshot written to {path}");
    }
    Ok(())
}

fn show(args: ShowArgs) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(&args.snapshot)
        .with_context(|| format!("reading snapshot from {:?}", args.snapshot))?;
    let record: Record = serde_json::from_str(&json).context("parsing Record snapshot")?;
    print_record(&record)
}

fn print_record(record: &Record) -> anyhow::Result<()> {
    let portfolio = &record.portfolio;

    let mut balances = Table::new();
    balances.set_header(vec!["Currency", "Free", "Used", "Total"]);
    for currency in portfolio.balance.currencies() {
        let entry = portfolio.balance.get(currency)?;
        balances.add_row(vec![
            currency.to_string(),
            entry.free.to_string(),
            entry.used.to_string(),
            entry.total.to_string(),
        ]);
    }
    println!("Balances ({} is cash)\n{balances}", portfolio.cash_currency);

    if !portfolio.positions.is_empty() {
        let mut positions = Table::new();
        positions.set_header(vec![
            "Symbol",
            "Quantity",
            "Cost Price",
            "Latest Price",
            "Market Value",
            "Unrealized PnL",
        ]);
        for symbol in portfolio.symbols() {
            let position = &portfolio.positions[symbol];
            positions.add_row(vec![
                symbol.to_string(),
                position.quantity.to_string(),
                position.cost_price.to_string(),
                position.latest_price.to_string(),
                position.market_value().to_string(),
                position.unrealized_pnl().to_string(),
            ]);
        }
        println!("\nPositions\n{positions}");
    }

    let mut periods = Table::new();
    periods.set_header(vec!["Start", "End", "End Cash", "End Value", "PnL", "Returns"]);
    for period in portfolio.performance.periods() {
        periods.add_row(vec![
            fmt_time(period.start_time),
            fmt_time(period.end_time),
            period.end_cash.to_string(),
            period.end_value.to_string(),
            period.pnl.to_string(),
            period.returns.to_string(),
        ]);
    }
    println!("\nPerformance\n{periods}");

    let mut orders = Table::new();
    orders.set_header(vec!["Id", "Symbol", "Type", "Status", "Price", "Filled", "Fee"]);
    for order in &record.orders {
        orders.add_row(vec![
            order.id.to_string(),
            order.asset.symbol(),
            format!("{:?}", order.order_type),
            format!("{:?}", order.status),
            order.price.to_string(),
            order.filled_quantity.to_string(),
            order.fee.to_string(),
        ]);
    }
    println!("\nOrders\n{orders}");

    println!("\nTotal value: {}", portfolio.total_value()?);
    Ok(())
}

fn fmt_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}
