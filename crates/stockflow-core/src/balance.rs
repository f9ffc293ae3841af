//! 每日餘額模型（重建結果）

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 單一物料單日的餘額列
///
/// 每個 (物料, 日期) 恰好一列；同日多個據點的異動會先彙總成一列。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBalanceRow {
    /// 物料ID
    pub item_id: String,

    /// 日期
    pub date: NaiveDate,

    /// 顯示用據點（非分組鍵）
    pub site: String,

    /// 當日入庫合計（≥ 0）
    pub inflow: Decimal,

    /// 當日出庫合計（≤ 0）
    pub outflow: Decimal,

    /// 當日淨異動 = 入庫 + 出庫
    pub net_movement: Decimal,

    /// 當日結存
    pub balance: Decimal,
}

impl DailyBalanceRow {
    /// 創建無異動的空白列
    pub fn empty(item_id: String, date: NaiveDate, site: String) -> Self {
        Self {
            item_id,
            date,
            site,
            inflow: Decimal::ZERO,
            outflow: Decimal::ZERO,
            net_movement: Decimal::ZERO,
            balance: Decimal::ZERO,
        }
    }

    /// 建構器模式：設置當日出入庫，淨異動隨之更新
    pub fn with_flows(mut self, inflow: Decimal, outflow: Decimal) -> Self {
        self.inflow = inflow;
        self.outflow = outflow;
        self.net_movement = inflow + outflow;
        self
    }

    /// 建構器模式：設置結存
    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.balance = balance;
        self
    }

    /// 當日是否為淨出庫日
    pub fn is_outflow_day(&self) -> bool {
        self.net_movement < Decimal::ZERO
    }

    /// 淨出庫量（絕對值）；非出庫日為 0
    pub fn outflow_magnitude(&self) -> Decimal {
        if self.is_outflow_day() {
            self.net_movement.abs()
        } else {
            Decimal::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, d).unwrap()
    }

    #[test]
    fn test_empty_row() {
        let row = DailyBalanceRow::empty("X".to_string(), day(1), "PLANT-01".to_string());

        assert_eq!(row.inflow, Decimal::ZERO);
        assert_eq!(row.outflow, Decimal::ZERO);
        assert_eq!(row.net_movement, Decimal::ZERO);
        assert!(!row.is_outflow_day());
    }

    #[test]
    fn test_with_flows_sets_net() {
        let row = DailyBalanceRow::empty("X".to_string(), day(2), "PLANT-01".to_string())
            .with_flows(Decimal::from(10), Decimal::from(-40))
            .with_balance(Decimal::from(70));

        assert_eq!(row.net_movement, Decimal::from(-30));
        assert!(row.is_outflow_day());
        assert_eq!(row.outflow_magnitude(), Decimal::from(30));
        assert_eq!(row.balance, Decimal::from(70));
    }

    #[test]
    fn test_net_inflow_day_has_no_outflow_magnitude() {
        // 同日有出庫但淨額為正，不算出庫日
        let row = DailyBalanceRow::empty("X".to_string(), day(3), String::new())
            .with_flows(Decimal::from(50), Decimal::from(-20));

        assert!(!row.is_outflow_day());
        assert_eq!(row.outflow_magnitude(), Decimal::ZERO);
    }
}
