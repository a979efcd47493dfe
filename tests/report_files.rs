use shop_ops::{
    average_ticket, deliveries_from_table, value_inventory, AliasResolver, CourierMatcher,
    InventoryColumns, Normalization, Settings, Table,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_stock_sheet_with_alias_file() {
    let aliases = write_temp(
        r#"[
            { "pattern": "agua com gas", "canonical": "agua com gas" },
            { "pattern": "agua", "canonical": "agua sem gas" }
        ]"#,
    );
    let sheet = write_temp(
        "Produto,Quantidade,Custo\n\
         Água com gás 500ml,12,\"R$ 1,80\"\n\
         agua mineral,\"1.000\",\"0,90\"\n\
         Água c/ gás,x,\"1,80\"\n",
    );

    let resolver = AliasResolver::from_file(aliases.path(), Normalization::FoldDiacritics).unwrap();
    assert_eq!(resolver.rule_count(), 2);

    let table = Table::from_path(sheet.path()).unwrap();
    let valuation = value_inventory(&table, &resolver, &InventoryColumns::default()).unwrap();

    // "Água c/ gás" only hits the generic "agua" rule
    assert_eq!(valuation.lines.len(), 2);
    assert_eq!(valuation.lines[0].product, "agua com gas");
    assert!((valuation.lines[0].value - 21.6).abs() < 1e-9);
    // "1.000" is a decimal point under the rightmost-separator rule
    assert!((valuation.lines[1].quantity - 1.0).abs() < 1e-9);
}

#[test]
fn test_alias_file_errors_are_reported() {
    let bad = write_temp("{ not json");
    assert!(AliasResolver::from_file(bad.path(), Normalization::Lowercase).is_err());
    assert!(AliasResolver::from_file("/nonexistent/aliases.json", Normalization::Lowercase).is_err());
}

#[test]
fn test_courier_payout_from_settings_file() {
    let settings_file = write_temp(
        r#"{
            "courier_column": "Motoboy",
            "distance_column": "Km",
            "payout": {
                "tiers": [{ "up_to_km": 4, "fee": 6 }, { "up_to_km": 10, "fee": 11 }],
                "extra_per_km": 1
            }
        }"#,
    );
    let sheet = write_temp(
        "Pedido,Motoboy,Km,Total\n\
         1,João Silva,\"2,5\",\"R$ 58,00\"\n\
         2,Marcos,\"7,0\",\"R$ 120,00\"\n\
         3,joao,\"11,2\",\"R$ 35,50\"\n\
         4,João Silva,\"3,9\",0\n",
    );

    let settings = Settings::load(settings_file.path()).unwrap();
    let table = Table::from_path(sheet.path()).unwrap();

    let matcher = CourierMatcher::new("João Silva");
    let rows = matcher.filter_rows(&table, &settings.courier_column).unwrap();
    assert_eq!(rows, vec![0, 2, 3]);

    let deliveries =
        deliveries_from_table(&table, &settings.courier_column, &settings.distance_column, Some(rows.as_slice())).unwrap();
    let summary = settings.payout.summarize(&deliveries);

    // 6 + (11 + 2 started km) + 6
    assert_eq!(summary.deliveries, 3);
    assert!((summary.total_fee - 25.0).abs() < 1e-9);

    let ticket = average_ticket(&table.column_values("Total").unwrap());
    assert_eq!(ticket.orders, 3);
    assert!((ticket.revenue - 213.5).abs() < 1e-9);
    assert!((ticket.average - 213.5 / 3.0).abs() < 1e-9);
}

#[test]
fn test_settings_load_missing_file() {
    assert!(Settings::load("/nonexistent/settings.json").is_err());
}
