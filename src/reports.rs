// 📊 Report Calculators - average ticket, inventory valuation
// Every figure goes through amount::parse, so bad cells count as zero

use crate::aliases::AliasResolver;
use crate::amount;
use crate::table::Table;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// AVERAGE TICKET
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketSummary {
    /// Orders with a positive total
    pub orders: usize,
    pub revenue: f64,
    pub average: f64,
}

impl TicketSummary {
    fn from_values(values: impl Iterator<Item = f64>) -> Self {
        let mut summary = TicketSummary::default();
        for value in values {
            summary.orders += 1;
            summary.revenue += value;
        }
        if summary.orders > 0 {
            summary.average = summary.revenue / summary.orders as f64;
        }
        summary
    }
}

/// Average order value. Zero or blank totals (cancelled orders) are left out.
pub fn average_ticket(totals: &[&str]) -> TicketSummary {
    TicketSummary::from_values(
        totals
            .iter()
            .map(|t| amount::parse(*t))
            .filter(|v| *v > 0.0),
    )
}

/// Average ticket net of delivery fees
///
/// `fees[i]` belongs to `totals[i]`; a missing fee counts as zero and a
/// fee larger than its order never makes the net negative.
pub fn corrected_average_ticket(totals: &[&str], fees: &[&str]) -> TicketSummary {
    TicketSummary::from_values(totals.iter().enumerate().filter_map(|(i, t)| {
        let total = amount::parse(*t);
        if total <= 0.0 {
            return None;
        }
        let fee = fees.get(i).map(|f| amount::parse(*f)).unwrap_or(0.0);
        Some((total - fee).max(0.0))
    }))
}

// ============================================================================
// INVENTORY VALUATION
// ============================================================================

/// Column names of the stock sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryColumns {
    pub product: String,
    pub quantity: String,
    pub unit_cost: String,
}

impl Default for InventoryColumns {
    fn default() -> Self {
        InventoryColumns {
            product: "Produto".to_string(),
            quantity: "Quantidade".to_string(),
            unit_cost: "Custo".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLine {
    /// Canonical name, or the raw cell when no alias matched
    pub product: String,
    pub quantity: f64,
    /// Value-weighted average cost
    pub unit_cost: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryValuation {
    /// In first-seen order
    pub lines: Vec<StockLine>,
    pub total_value: f64,
}

impl InventoryValuation {
    /// Look up a noisy product name through the resolver
    pub fn stock_for(&self, resolver: &AliasResolver, raw_name: &str) -> Option<&StockLine> {
        let key = resolver.normalize(raw_name);
        self.lines.iter().find(|line| line.product == key)
    }
}

pub fn value_inventory(
    table: &Table,
    resolver: &AliasResolver,
    columns: &InventoryColumns,
) -> Result<InventoryValuation> {
    let product_col = table.column(&columns.product)?;
    let quantity_col = table.column(&columns.quantity)?;
    let cost_col = table.column(&columns.unit_cost)?;

    let mut valuation = InventoryValuation::default();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in 0..table.len() {
        let raw_name = table.cell(row, product_col);
        if raw_name.trim().is_empty() {
            continue;
        }

        let product = resolver.normalize(raw_name);
        let quantity = amount::parse(table.cell(row, quantity_col));
        let unit_cost = amount::parse(table.cell(row, cost_col));

        let slot = *index.entry(product.clone()).or_insert_with(|| {
            valuation.lines.push(StockLine {
                product,
                quantity: 0.0,
                unit_cost: 0.0,
                value: 0.0,
            });
            valuation.lines.len() - 1
        });

        let line = &mut valuation.lines[slot];
        line.quantity += quantity;
        line.value += quantity * unit_cost;
        line.unit_cost = if line.quantity > 0.0 {
            line.value / line.quantity
        } else {
            unit_cost
        };
    }

    valuation.total_value = valuation.lines.iter().map(|l| l.value).sum();

    tracing::debug!(
        products = valuation.lines.len(),
        total = %amount::format(valuation.total_value, false),
        "inventory valued"
    );
    Ok(valuation)
}

// ============================================================================
// TESTS
// ============================================================================
