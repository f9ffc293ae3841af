//! 顯示用資料組裝（視窗切片、物料概要、據點明細）

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockflow_core::{
    CharacteristicRecord, DailyBalanceRow, MovementRecord, StockRecord, StockflowError,
};

use crate::bucketing::{BucketingCalculator, DayTotals};
use crate::outlier::OutlierAnalysis;

/// 取日期 >= `from` 的子序列（輸入須依日期升冪）
pub fn window(rows: &[DailyBalanceRow], from: NaiveDate) -> &[DailyBalanceRow] {
    let start = rows.partition_point(|r| r.date < from);
    &rows[start..]
}

/// 截止日之前最後一列（視窗為空時用來顯示最後結存）
pub fn last_balance_before(rows: &[DailyBalanceRow], cutoff: NaiveDate) -> Option<&DailyBalanceRow> {
    rows.iter().take_while(|r| r.date < cutoff).last()
}

/// 單一物料的 (日期, 據點) 出入庫明細
pub fn site_breakdown(
    movements: &[MovementRecord],
    item_id: &str,
) -> stockflow_core::Result<BTreeMap<(NaiveDate, String), DayTotals>> {
    BucketingCalculator::aggregate_by_day_and_site(
        movements.iter().filter(|m| m.item_id == item_id),
    )
}

/// 物料概要（特性 + 庫存參數 + 視窗統計）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemProfile {
    pub item_id: String,

    /// 庫存表據點
    pub site: Option<String>,

    pub description: Option<String>,
    pub adi: Option<Decimal>,
    pub cv: Option<Decimal>,
    pub method: Option<String>,
    pub abc_class: Option<String>,
    pub lead_time: Option<Decimal>,
    pub safety_stock: Option<Decimal>,

    /// 現有庫存 + 安全庫存；不在庫存表時為 0
    pub initial_balance: Decimal,

    /// 視窗內出庫合計（絕對值）
    pub total_outflow: Decimal,

    pub mean_excluding_outliers: Decimal,
    pub upper_bound: Decimal,
}

impl ItemProfile {
    /// 組裝物料概要；庫存表與特性表都找不到時回傳 `Ok(None)`
    pub fn build(
        item_id: &str,
        stock_records: &[StockRecord],
        characteristics: &[CharacteristicRecord],
        window_rows: &[DailyBalanceRow],
        analysis: &OutlierAnalysis,
    ) -> stockflow_core::Result<Option<Self>> {
        let stock = stock_records.iter().find(|s| s.item_id == item_id);
        let characteristic = characteristics.iter().find(|c| c.item_id == item_id);

        if stock.is_none() && characteristic.is_none() {
            return Ok(None);
        }

        let total_outflow = window_rows
            .iter()
            .try_fold(Decimal::ZERO, |acc, r| acc.checked_add(r.outflow.abs()))
            .ok_or_else(|| StockflowError::Overflow {
                item_id: item_id.to_string(),
            })?;
        let initial_balance = stock
            .map(StockRecord::initial_balance)
            .transpose()?
            .unwrap_or(Decimal::ZERO);

        Ok(Some(Self {
            item_id: item_id.to_string(),
            site: stock.map(|s| s.site.clone()),
            description: characteristic.map(|c| c.description.clone()),
            adi: characteristic.map(|c| c.adi),
            cv: characteristic.map(|c| c.cv),
            method: characteristic.map(|c| c.method.clone()),
            abc_class: characteristic.map(|c| c.abc_class.clone()),
            lead_time: stock.map(|s| s.lead_time),
            safety_stock: stock.map(|s| s.safety_stock),
            initial_balance,
            total_outflow,
            mean_excluding_outliers: analysis.mean_excluding_outliers,
            upper_bound: analysis.upper_bound,
        }))
    }
}
