//! 每日分桶（同日異動彙總）

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockflow_core::{DateSpan, MovementRecord, StockflowError};

/// 單桶的出入庫合計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTotals {
    /// 入庫合計（≥ 0）
    pub inflow: Decimal,
    /// 出庫合計（≤ 0）
    pub outflow: Decimal,
}

impl DayTotals {
    /// 累加一筆異動；數量為 0 時兩邊都不變
    pub fn add(&mut self, movement: &MovementRecord) -> stockflow_core::Result<()> {
        let overflow = || StockflowError::Overflow {
            item_id: movement.item_id.clone(),
        };
        self.inflow = self.inflow.checked_add(movement.inflow()).ok_or_else(overflow)?;
        self.outflow = self.outflow.checked_add(movement.outflow()).ok_or_else(overflow)?;
        Ok(())
    }

    /// 淨異動
    pub fn net(&self) -> Decimal {
        self.inflow + self.outflow
    }
}

/// 時間分桶計算器
pub struct BucketingCalculator;

impl BucketingCalculator {
    /// 依日期彙總（跨據點合併，粒度為 物料+日期）
    pub fn aggregate_by_day<'a, I>(
        movements: I,
    ) -> stockflow_core::Result<BTreeMap<NaiveDate, DayTotals>>
    where
        I: IntoIterator<Item = &'a MovementRecord>,
    {
        let mut buckets: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
        for movement in movements {
            buckets.entry(movement.date).or_default().add(movement)?;
        }
        Ok(buckets)
    }

    /// 依 (日期, 據點) 彙總，僅供顯示明細
    pub fn aggregate_by_day_and_site<'a, I>(
        movements: I,
    ) -> stockflow_core::Result<BTreeMap<(NaiveDate, String), DayTotals>>
    where
        I: IntoIterator<Item = &'a MovementRecord>,
    {
        let mut buckets: BTreeMap<(NaiveDate, String), DayTotals> = BTreeMap::new();
        for movement in movements {
            buckets
                .entry((movement.date, movement.site.clone()))
                .or_default()
                .add(movement)?;
        }
        Ok(buckets)
    }

    /// 以區間逐日展開，無異動的日子補 0；區間外的桶被捨棄
    pub fn fill_span(
        span: &DateSpan,
        buckets: &BTreeMap<NaiveDate, DayTotals>,
    ) -> Vec<(NaiveDate, DayTotals)> {
        span.days()
            .map(|date| (date, buckets.get(&date).copied().unwrap_or_default()))
            .collect()
    }
}
