//! 每日餘額重建範例
//!
//! 從三張 CSV 表開始：驗證 → 重建 → 切視窗 → 異常分析 → 物料概要
//!
//! 執行：`RUST_LOG=debug cargo run --example daily_balance`

use stockflow::prelude::*;
use tracing_subscriber::EnvFilter;

const STOCK_CSV: &str = "\
Item,Site,CurrentStock,LeadTime,StockSeguridad
BOLT-M8,PLANT-01,100,4,20
NUT-M8,PLANT-02,40,2,abc
";

const MOVEMENT_CSV: &str = "\
Item,Site,Fecha,Movimientos
BOLT-M8,PLANT-01,2023-01-01,-30
BOLT-M8,PLANT-01,2023-01-02,-5
BOLT-M8,PLANT-03,2023-01-02,-4
BOLT-M8,PLANT-01,2023-01-03,10
BOLT-M8,PLANT-01,2023-01-04,-6
BOLT-M8,PLANT-01,2023-01-05,-5
BOLT-M8,PLANT-01,2023-01-06,-80
NUT-M8,PLANT-02,2023-01-02,-3
WASHER-8,PLANT-04,2023-01-03,25
WASHER-8,PLANT-04,not-a-date,7
";

const CHARACTERISTICS_CSV: &str = "\
Item,Site,Descripcion,ADI,CV,Metodo,ABC Class
BOLT-M8,PLANT-01,Hex bolt M8,1.2,0.45,SBA,A
";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("===== 每日餘額重建範例 =====\n");

    // 步驟 1: 配置
    let config = LedgerConfig::default();
    println!(
        "[1] 期初日 {}，顯示起始日 {}",
        config.initial_balance_date, config.display_start_date
    );

    // 步驟 2: 驗證輸入表
    let validator = RecordValidator::new(&config);
    let stock = validator.stock(&RawTable::from_csv_bytes(
        TableKind::Stock,
        STOCK_CSV.as_bytes(),
    )?)?;
    let movements = validator.movements(&RawTable::from_csv_bytes(
        TableKind::Movement,
        MOVEMENT_CSV.as_bytes(),
    )?)?;
    let characteristics = validator.characteristics(&RawTable::from_csv_bytes(
        TableKind::Characteristics,
        CHARACTERISTICS_CSV.as_bytes(),
    )?)?;

    println!(
        "[2] 庫存 {} 筆，異動 {} 筆，特性 {} 筆",
        stock.records.len(),
        movements.records.len(),
        characteristics.records.len()
    );
    for warning in stock.warnings.iter().chain(&movements.warnings) {
        println!(
            "    轉型警告: {} 第 {} 列 {} = {:?} ({:?})",
            warning.table, warning.row, warning.column, warning.raw, warning.action
        );
    }

    // 步驟 3: 重建（同內容第二次直接命中快取）
    let mut cache = LedgerCache::new();
    let key = CacheKey::new(
        STOCK_CSV.as_bytes(),
        MOVEMENT_CSV.as_bytes(),
        config.initial_balance_date,
    );
    let reconstructor = BalanceReconstructor::new(config.clone());
    for _ in 0..2 {
        cache.get_or_try_insert_with(key, || {
            reconstructor.reconstruct(&stock.records, &movements.records)
        })?;
    }
    let ledger = cache
        .get(&key)
        .ok_or_else(|| anyhow::anyhow!("快取中找不到重建結果"))?;
    let (hits, misses) = cache.stats();
    println!(
        "[3] 物料 {} 個，每日列 {} 筆（快取命中 {}，未命中 {}）",
        ledger.series.len(),
        ledger.row_count(),
        hits,
        misses
    );
    for warning in &ledger.warnings {
        println!("    重建警告: {:?}", warning);
    }

    // 步驟 4: 逐物料分析
    println!("\n[4] 物料分析");
    let analyzer = OutlierAnalyzer::from_config(&config)?;
    for item_id in ledger.items() {
        let Some(series) = ledger.item(item_id) else {
            continue;
        };
        let shown = window(series, config.display_start_date);
        let analysis = analyzer.analyze(shown)?;

        println!("\n--- {} ---", item_id);
        if shown.is_empty() {
            if let Some(last) = last_balance_before(series, config.display_start_date) {
                println!("  視窗內無資料，最後結存 {} ({})", last.balance, last.date);
            }
            continue;
        }

        println!("  日期         據點       入庫    出庫    淨額    結存");
        for row in shown {
            let mark = if analysis.is_outlier(row) { " *" } else { "" };
            println!(
                "  {}  {:<9} {:>6} {:>7} {:>7} {:>7}{}",
                row.date, row.site, row.inflow, row.outflow, row.net_movement, row.balance, mark
            );
        }

        println!(
            "  上界 {}，平均出庫（不含異常）{}，異常 {} 筆",
            analysis.upper_bound.round_dp(2),
            analysis.mean_excluding_outliers.round_dp(2),
            analysis.outliers().len()
        );

        if let Some(profile) = ItemProfile::build(
            item_id,
            &stock.records,
            &characteristics.records,
            shown,
            &analysis,
        )? {
            println!(
                "  概要: 期初 {}，出庫合計 {}，ABC {:?}",
                profile.initial_balance, profile.total_outflow, profile.abc_class
            );
        }

        let breakdown = site_breakdown(&movements.records, item_id)?;
        let multi_site_days = breakdown
            .keys()
            .filter(|(date, _)| breakdown.keys().filter(|(d, _)| d == date).count() > 1)
            .count();
        if multi_site_days > 0 {
            println!("  多據點明細 {} 筆", multi_site_days);
        }
    }

    Ok(())
}
