use anyhow::{bail, Result};
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use shop_ops::{
    amount, average_ticket, corrected_average_ticket, deliveries_from_table, value_inventory,
    CourierMatcher, Settings, Table,
};

const USAGE: &str = "\
usage: shop-ops <command> [args]

  parse <text>                       parse a Brazilian amount
  format <number> [--qty]            format as R$ / quantity
  normalize <name>                   resolve a product name
  stock <csv>                        inventory valuation
  ticket <csv> [total_col] [fee_col] average ticket (net of fees when fee_col given)
  payout <csv> <courier>             courier payout by distance

settings: $SHOP_OPS_CONFIG (JSON)";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();

    // Settings are only read by the commands that use them
    match args.first().map(String::as_str) {
        Some("parse") => run_parse(&args[1..]),
        Some("format") => run_format(&args[1..]),
        Some("normalize") => run_normalize(&Settings::from_env()?, &args[1..]),
        Some("stock") => run_stock(&Settings::from_env()?, &args[1..]),
        Some("ticket") => run_ticket(&args[1..]),
        Some("payout") => run_payout(&Settings::from_env()?, &args[1..]),
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }
}

fn arg<'a>(args: &'a [String], i: usize, name: &str) -> Result<&'a str> {
    match args.get(i) {
        Some(value) => Ok(value.as_str()),
        None => bail!("missing argument <{}>\n\n{}", name, USAGE),
    }
}

/// First argument that is not a `--flag`
fn positional<'a>(args: &'a [String], name: &str) -> Result<&'a str> {
    match args.iter().find(|a| !a.starts_with("--")) {
        Some(value) => Ok(value.as_str()),
        None => bail!("missing argument <{}>\n\n{}", name, USAGE),
    }
}

fn run_parse(args: &[String]) -> Result<()> {
    let raw = arg(args, 0, "text")?;
    match amount::parse_outcome(&raw.into()) {
        amount::AmountOutcome::Parsed(v) => println!("{}", v),
        amount::AmountOutcome::Defaulted(reason) => println!("0 ({})", reason.as_str()),
    }
    Ok(())
}

fn run_format(args: &[String]) -> Result<()> {
    let raw = positional(args, "number")?;
    let is_quantity = args.iter().any(|a| a == "--qty");
    let value = amount::parse_strict(raw)?;
    println!("{}", amount::format(value, is_quantity));
    Ok(())
}

fn run_normalize(settings: &Settings, args: &[String]) -> Result<()> {
    let name = arg(args, 0, "name")?;
    println!("{}", settings.resolver().normalize(name));
    Ok(())
}

fn run_stock(settings: &Settings, args: &[String]) -> Result<()> {
    let table = Table::from_path(Path::new(arg(args, 0, "csv")?))?;
    let valuation = value_inventory(&table, &settings.resolver(), &settings.inventory_columns)?;

    println!("📦 Inventory ({} products)", valuation.lines.len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for line in &valuation.lines {
        println!(
            "{:<28} {:>12}  x {:>12}  = {:>14}",
            line.product,
            amount::format(line.quantity, true),
            amount::format(line.unit_cost, false),
            amount::format(line.value, false),
        );
    }
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Total: {}", amount::format(valuation.total_value, false));
    Ok(())
}

fn run_ticket(args: &[String]) -> Result<()> {
    let table = Table::from_path(Path::new(arg(args, 0, "csv")?))?;
    let total_col = args.get(1).map(String::as_str).unwrap_or("Total");
    let totals = table.column_values(total_col)?;

    let summary = match args.get(2) {
        Some(fee_col) => corrected_average_ticket(&totals, &table.column_values(fee_col)?),
        None => average_ticket(&totals),
    };

    println!("Orders:  {}", summary.orders);
    println!("Revenue: {}", amount::format(summary.revenue, false));
    println!("Average: {}", amount::format(summary.average, false));
    Ok(())
}

fn run_payout(settings: &Settings, args: &[String]) -> Result<()> {
    let table = Table::from_path(Path::new(arg(args, 0, "csv")?))?;
    let matcher = CourierMatcher::new(arg(args, 1, "courier")?);

    let rows = matcher.filter_rows(&table, &settings.courier_column)?;
    let deliveries = deliveries_from_table(
        &table,
        &settings.courier_column,
        &settings.distance_column,
        Some(rows.as_slice()),
    )?;
    let summary = settings.payout.summarize(&deliveries);

    println!("🛵 {}", matcher.name());
    println!("Deliveries: {}", summary.deliveries);
    println!("Distance:   {} km", amount::format(summary.total_km, true));
    println!("Payout:     {}", amount::format(summary.total_fee, false));
    Ok(())
}
