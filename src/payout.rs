// 🧾 Courier Payout - tiered by delivery distance

use crate::amount;
use crate::table::Table;
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutTier {
    /// Inclusive upper bound of the tier, in km
    pub up_to_km: f64,

    /// Flat fee paid for a delivery in this tier
    pub fee: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ScheduleFile")]
pub struct PayoutSchedule {
    tiers: Vec<PayoutTier>,

    /// Charged per started km beyond the last tier
    extra_per_km: f64,
}

impl PayoutSchedule {
    /// Tiers are sorted by distance; order given does not matter
    pub fn new(mut tiers: Vec<PayoutTier>, extra_per_km: f64) -> Self {
        tiers.retain(|t| t.up_to_km.is_finite() && t.fee.is_finite());
        tiers.sort_by(|a, b| a.up_to_km.total_cmp(&b.up_to_km));
        PayoutSchedule {
            tiers,
            extra_per_km,
        }
    }

    pub fn tiers(&self) -> &[PayoutTier] {
        &self.tiers
    }

    pub fn fee_for(&self, distance_km: f64) -> f64 {
        let distance = if distance_km.is_finite() && distance_km > 0.0 {
            distance_km
        } else {
            if distance_km != 0.0 {
                tracing::warn!(distance_km, "invalid delivery distance, paying first tier");
            }
            0.0
        };

        if let Some(tier) = self.tiers.iter().find(|t| distance <= t.up_to_km) {
            return tier.fee;
        }

        match self.tiers.last() {
            Some(last) => {
                let extra_km = (distance - last.up_to_km).ceil();
                last.fee + extra_km * self.extra_per_km
            }
            None => 0.0,
        }
    }

    pub fn summarize(&self, deliveries: &[Delivery]) -> PayoutSummary {
        let mut summary = PayoutSummary::default();
        for delivery in deliveries {
            summary.deliveries += 1;
            summary.total_km += delivery.distance_km.max(0.0);
            summary.total_fee += self.fee_for(delivery.distance_km);
        }
        summary
    }
}

/// On-disk shape; goes through `PayoutSchedule::new` so tiers get sorted
#[derive(Deserialize)]
struct ScheduleFile {
    tiers: Vec<PayoutTier>,
    #[serde(default)]
    extra_per_km: f64,
}

impl From<ScheduleFile> for PayoutSchedule {
    fn from(file: ScheduleFile) -> Self {
        PayoutSchedule::new(file.tiers, file.extra_per_km)
    }
}

impl Default for PayoutSchedule {
    fn default() -> Self {
        PayoutSchedule::new(
            vec![
                PayoutTier { up_to_km: 3.0, fee: 7.0 },
                PayoutTier { up_to_km: 5.0, fee: 9.0 },
                PayoutTier { up_to_km: 8.0, fee: 12.0 },
                PayoutTier { up_to_km: 12.0, fee: 16.0 },
            ],
            1.5,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub courier: String,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayoutSummary {
    pub deliveries: usize,
    pub total_km: f64,
    pub total_fee: f64,
}

/// Read deliveries from a sheet, optionally keeping only `rows`
pub fn deliveries_from_table(
    table: &Table,
    courier_column: &str,
    distance_column: &str,
    rows: Option<&[usize]>,
) -> Result<Vec<Delivery>> {
    let courier_col = table.column(courier_column)?;
    let distance_col = table.column(distance_column)?;

    let to_delivery = |row: usize| Delivery {
        courier: table.cell(row, courier_col).trim().to_string(),
        distance_km: amount::parse(table.cell(row, distance_col)),
    };

    Ok(match rows {
        Some(rows) => rows.iter().copied().map(to_delivery).collect(),
        None => (0..table.len()).map(to_delivery).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_tiers_inclusive() {
        let schedule = PayoutSchedule::default();
        assert_eq!(schedule.fee_for(0.5), 7.0);
        assert_eq!(schedule.fee_for(3.0), 7.0);
        assert_eq!(schedule.fee_for(3.01), 9.0);
        assert_eq!(schedule.fee_for(8.0), 12.0);
        assert_eq!(schedule.fee_for(12.0), 16.0);
    }

    #[test]
    fn test_fee_beyond_last_tier() {
        let schedule = PayoutSchedule::default();
        // 12.2 km → one started km over
        assert_eq!(schedule.fee_for(12.2), 17.5);
        assert_eq!(schedule.fee_for(15.0), 20.5);
    }

    #[test]
    fn test_invalid_distance_pays_first_tier() {
        let schedule = PayoutSchedule::default();
        assert_eq!(schedule.fee_for(-2.0), 7.0);
        assert_eq!(schedule.fee_for(f64::NAN), 7.0);
    }

    #[test]
    fn test_unsorted_tiers_are_sorted() {
        let schedule = PayoutSchedule::new(
            vec![
                PayoutTier { up_to_km: 10.0, fee: 20.0 },
                PayoutTier { up_to_km: 2.0, fee: 5.0 },
            ],
            0.0,
        );
        assert_eq!(schedule.tiers()[0].up_to_km, 2.0);
        assert_eq!(schedule.fee_for(1.0), 5.0);
        assert_eq!(schedule.fee_for(50.0), 20.0);
    }

    #[test]
    fn test_deserialize_sorts_tiers() {
        let schedule: PayoutSchedule = serde_json::from_str(
            r#"{ "tiers": [{ "up_to_km": 6, "fee": 10 }, { "up_to_km": 2, "fee": 4 }] }"#,
        )
        .unwrap();
        assert_eq!(schedule.fee_for(1.0), 4.0);
        assert_eq!(schedule.fee_for(7.0), 10.0);
    }

    #[test]
    fn test_empty_schedule_pays_nothing() {
        let schedule = PayoutSchedule::new(Vec::new(), 2.0);
        assert_eq!(schedule.fee_for(4.0), 0.0);
    }

    #[test]
    fn test_summarize_from_table() {
        let table = Table::new(
            vec!["Entregador".to_string(), "Distância".to_string()],
            vec![
                vec!["Ana".to_string(), "2,5 km".to_string()],
                vec!["Ana".to_string(), "4,0".to_string()],
                vec!["Bruno".to_string(), "".to_string()],
            ],
        );

        let deliveries = deliveries_from_table(&table, "entregador", "distância", Some(&[0, 1][..])).unwrap();
        assert_eq!(deliveries.len(), 2);

        let summary = PayoutSchedule::default().summarize(&deliveries);
        assert_eq!(summary.deliveries, 2);
        assert!((summary.total_km - 6.5).abs() < 1e-9);
        assert_eq!(summary.total_fee, 16.0);

        let all = deliveries_from_table(&table, "Entregador", "Distância", None).unwrap();
        assert_eq!(all[2].distance_km, 0.0);
    }
}
