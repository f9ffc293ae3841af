//! 餘額重建主計算器

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use rayon::prelude::*;
use rust_decimal::Decimal;
use stockflow_core::{
    DailyBalanceRow, DateSpan, LedgerConfig, MovementRecord, StockRecord, StockflowError,
    TableKind,
};

use crate::bucketing::BucketingCalculator;
use crate::rolling::RollingCalculator;
use crate::{BalanceLedger, LedgerWarning};

/// 以預設配置重建，僅指定期初餘額日
pub fn reconstruct(
    stock_records: &[StockRecord],
    movement_records: &[MovementRecord],
    initial_balance_date: NaiveDate,
) -> stockflow_core::Result<BalanceLedger> {
    BalanceReconstructor::new(LedgerConfig::new(initial_balance_date))
        .reconstruct(stock_records, movement_records)
}

/// 餘額重建器
pub struct BalanceReconstructor {
    config: LedgerConfig,
}

/// 單物料的重建輸出
struct ItemSeries {
    item_id: String,
    rows: Vec<DailyBalanceRow>,
    warnings: Vec<LedgerWarning>,
}

impl BalanceReconstructor {
    /// 創建新的重建器
    pub fn new(config: LedgerConfig) -> Self {
        Self { config }
    }

    /// 主重建入口
    pub fn reconstruct(
        &self,
        stock_records: &[StockRecord],
        movement_records: &[MovementRecord],
    ) -> stockflow_core::Result<BalanceLedger> {
        tracing::info!(
            "開始餘額重建：庫存 {} 筆，異動 {} 筆，期初日 {}",
            stock_records.len(),
            movement_records.len(),
            self.config.initial_balance_date
        );

        let start_time = std::time::Instant::now();
        let mut ledger = BalanceLedger::empty();

        // Step 1: 期初餘額（重複物料直接失敗）
        tracing::debug!("Step 1: 期初餘額");
        let stock_map = self.create_stock_map(stock_records)?;

        // Step 2: 按物料分組異動
        tracing::debug!("Step 2: 物料分組");
        let grouped_movements = self.group_movements_by_item(movement_records);

        // 經由 RecordValidator 的輸入已先捨棄空白物料ID（記為 CoercionWarning）；
        // 這裡只會在呼叫端直接建構記錄時觸發
        let skipped = stock_records.iter().filter(|s| s.item_id.is_empty()).count()
            + movement_records.iter().filter(|m| m.item_id.is_empty()).count();
        if skipped > 0 {
            tracing::warn!("略過物料ID 為空的記錄 {} 筆", skipped);
            ledger.add_warning(LedgerWarning::EmptyItemId { count: skipped });
        }

        // Step 3: 庫存物料 ∪ 異動物料
        let items: BTreeSet<&str> = stock_map
            .keys()
            .copied()
            .chain(grouped_movements.keys().copied())
            .collect();
        tracing::debug!("物料數量: {}", items.len());

        // Step 4: 逐物料重建
        tracing::debug!("Step 4: 逐物料重建（並行: {}）", self.config.parallel);
        let empty: Vec<&MovementRecord> = Vec::new();
        let build = |item_id: &&str| {
            let movements = grouped_movements.get(*item_id).unwrap_or(&empty);
            self.reconstruct_item(item_id, stock_map.get(*item_id).copied(), movements)
        };

        let items: Vec<&str> = items.into_iter().collect();
        let outputs: Vec<ItemSeries> = if self.config.parallel {
            items.par_iter().map(build).collect::<stockflow_core::Result<_>>()?
        } else {
            items.iter().map(build).collect::<stockflow_core::Result<_>>()?
        };

        for output in outputs {
            ledger.warnings.extend(output.warnings);
            ledger.series.insert(output.item_id, output.rows);
        }

        ledger.calculation_time_ms = Some(start_time.elapsed().as_millis());

        tracing::info!("餘額重建完成，耗時 {:?}", start_time.elapsed());
        tracing::info!(
            "物料 {} 個，每日列 {} 筆",
            ledger.series.len(),
            ledger.row_count()
        );

        Ok(ledger)
    }

    /// 單物料重建
    fn reconstruct_item(
        &self,
        item_id: &str,
        stock: Option<&StockRecord>,
        movements: &[&MovementRecord],
    ) -> stockflow_core::Result<ItemSeries> {
        let anchor = self.config.initial_balance_date;
        let initial_balance = stock
            .map(StockRecord::initial_balance)
            .transpose()?
            .unwrap_or(Decimal::ZERO);
        let site = self.resolve_site(stock, movements);

        let mut warnings = Vec::new();
        for movement in movements.iter().filter(|m| m.date < anchor) {
            tracing::warn!(
                "物料 {} 的異動日期 {} 早於期初日 {}，不納入重建",
                item_id,
                movement.date,
                anchor
            );
            warnings.push(LedgerWarning::MovementBeforeAnchor {
                item_id: item_id.to_string(),
                date: movement.date,
                quantity: movement.quantity,
            });
        }

        let span = DateSpan::anchored(anchor, movements.iter().map(|m| m.date));
        let buckets = BucketingCalculator::aggregate_by_day(
            movements.iter().copied().filter(|m| m.date >= anchor),
        )?;
        let days = BucketingCalculator::fill_span(&span, &buckets);

        tracing::debug!(
            "物料 {}: 期初 {}，區間 {} ~ {}（{} 天），據點 {}",
            item_id,
            initial_balance,
            span.start(),
            span.end(),
            span.len(),
            site
        );

        let rows = RollingCalculator::roll(item_id, &site, &days, initial_balance)?;

        Ok(ItemSeries {
            item_id: item_id.to_string(),
            rows,
            warnings,
        })
    }

    /// 決定物料的顯示據點
    ///
    /// 庫存表據點優先；否則取異動中字典序最小的據點；都沒有時使用 `unknown_site`。
    fn resolve_site(&self, stock: Option<&StockRecord>, movements: &[&MovementRecord]) -> String {
        if let Some(stock) = stock.filter(|s| !s.site.is_empty()) {
            return stock.site.clone();
        }

        movements
            .iter()
            .map(|m| m.site.as_str())
            .filter(|s| !s.is_empty())
            .min()
            .map(str::to_string)
            .unwrap_or_else(|| self.config.unknown_site.clone())
    }

    /// 創建期初庫存映射；物料重複時回傳錯誤
    fn create_stock_map<'a>(
        &self,
        stock_records: &'a [StockRecord],
    ) -> stockflow_core::Result<HashMap<&'a str, &'a StockRecord>> {
        let mut map = HashMap::with_capacity(stock_records.len());
        for record in stock_records.iter().filter(|s| !s.item_id.is_empty()) {
            if map.insert(record.item_id.as_str(), record).is_some() {
                return Err(StockflowError::DuplicateKey {
                    table: TableKind::Stock,
                    item_id: record.item_id.clone(),
                });
            }
        }
        Ok(map)
    }

    /// 按物料分組異動
    fn group_movements_by_item<'a>(
        &self,
        movements: &'a [MovementRecord],
    ) -> HashMap<&'a str, Vec<&'a MovementRecord>> {
        let mut grouped: HashMap<&str, Vec<&MovementRecord>> = HashMap::new();
        for movement in movements.iter().filter(|m| !m.item_id.is_empty()) {
            grouped
                .entry(movement.item_id.as_str())
                .or_default()
                .push(movement);
        }
        grouped
    }

    /// 獲取配置引用
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }
}

/// 將重建結果串接成單一列表（物料ID 升冪，其次日期升冪）
pub fn flatten(series: &BTreeMap<String, Vec<DailyBalanceRow>>) -> Vec<DailyBalanceRow> {
    series.values().flatten().cloned().collect()
}
