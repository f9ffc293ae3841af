//! 結存推算（錨定後逐日累加）

use chrono::NaiveDate;
use rust_decimal::Decimal;
use stockflow_core::{DailyBalanceRow, StockflowError};

use crate::bucketing::DayTotals;

/// 結存推算器
pub struct RollingCalculator;

impl RollingCalculator {
    /// 由逐日桶產生餘額列
    ///
    /// # 參數
    /// * `days` - 已補齊、日期升冪的逐日出入庫；第一天為期初餘額日
    /// * `initial_balance` - 期初餘額日的結存
    ///
    /// 第一天的結存直接設為 `initial_balance`（覆寫，不累加當日異動），
    /// 之後每日 `balance[d] = balance[d-1] + net[d]`。超出 Decimal 範圍時回傳 `Overflow`。
    pub fn roll(
        item_id: &str,
        site: &str,
        days: &[(NaiveDate, DayTotals)],
        initial_balance: Decimal,
    ) -> stockflow_core::Result<Vec<DailyBalanceRow>> {
        let mut rows = Vec::with_capacity(days.len());
        let mut running = initial_balance;

        for (i, (date, totals)) in days.iter().enumerate() {
            let row = DailyBalanceRow::empty(item_id.to_string(), *date, site.to_string())
                .with_flows(totals.inflow, totals.outflow);

            if i > 0 {
                running = running.checked_add(row.net_movement).ok_or_else(|| {
                    StockflowError::Overflow {
                        item_id: item_id.to_string(),
                    }
                })?;
            }
            rows.push(row.with_balance(running));
        }

        Ok(rows)
    }
}
