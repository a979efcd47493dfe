// Shop Ops - Core Library
// Number/name cleanup and calculators behind the shop dashboard reports

pub mod amount;
pub mod aliases;
pub mod table;
pub mod courier;
pub mod payout;
pub mod reports;
pub mod config;

// Re-export commonly used types
pub use amount::{
    AmountError, AmountOutcome, AmountStyle, DefaultReason, RawAmount,
    format, format_amount, format_raw, parse, parse_outcome, parse_strict,
};
pub use aliases::{
    AliasResolver, AliasRule, Normalization, Resolution, default_rules,
};
pub use table::{Table, TableError, parse_date};
pub use courier::{CourierMatcher, MatchStrategy};
pub use payout::{Delivery, PayoutSchedule, PayoutSummary, PayoutTier, deliveries_from_table};
pub use reports::{
    InventoryColumns, InventoryValuation, StockLine, TicketSummary,
    average_ticket, corrected_average_ticket, value_inventory,
};
pub use config::{Settings, CONFIG_ENV_VAR};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
