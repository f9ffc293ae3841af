//! # Stockflow Calculation Engine
//!
//! 餘額重建與出庫異常分析引擎

pub mod bucketing;
pub mod outlier;
pub mod profile;
pub mod reconstruct;
pub mod rolling;
pub mod validation;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockflow_core::DailyBalanceRow;

// Re-export 主要類型
pub use bucketing::{BucketingCalculator, DayTotals};
pub use outlier::{analyze, OutlierAnalysis, OutlierAnalyzer, Quartiles};
pub use profile::{last_balance_before, site_breakdown, window, ItemProfile};
pub use reconstruct::{reconstruct, BalanceReconstructor};
pub use validation::{RecordValidator, Validated};

/// 餘額重建結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceLedger {
    /// 各物料的每日餘額序列（物料ID 升冪，序列內日期升冪）
    pub series: BTreeMap<String, Vec<DailyBalanceRow>>,

    /// 警告信息
    pub warnings: Vec<LedgerWarning>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl BalanceLedger {
    /// 創建空的重建結果
    pub fn empty() -> Self {
        Self {
            series: BTreeMap::new(),
            warnings: Vec::new(),
            calculation_time_ms: None,
        }
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: LedgerWarning) {
        self.warnings.push(warning);
    }

    /// 單一物料的序列
    pub fn item(&self, item_id: &str) -> Option<&[DailyBalanceRow]> {
        self.series.get(item_id).map(Vec::as_slice)
    }

    /// 所有物料ID（升冪）
    pub fn items(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// 串接所有物料的列：物料ID 升冪，其次日期升冪
    pub fn rows(&self) -> impl Iterator<Item = &DailyBalanceRow> {
        self.series.values().flatten()
    }

    /// 總列數
    pub fn row_count(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }
}

/// 重建過程中的非致命警告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LedgerWarning {
    /// 異動日期早於期初餘額日，不在重建區間內
    MovementBeforeAnchor {
        item_id: String,
        date: NaiveDate,
        quantity: Decimal,
    },

    /// 物料ID 為空的異動或庫存列被略過
    ///
    /// 只在直接傳入記錄時出現；`RecordValidator` 已在驗證階段捨棄這些列。
    EmptyItemId { count: usize },
}

impl LedgerWarning {
    /// 相關物料ID
    pub fn item_id(&self) -> Option<&str> {
        match self {
            LedgerWarning::MovementBeforeAnchor { item_id, .. } => Some(item_id),
            LedgerWarning::EmptyItemId { .. } => None,
        }
    }
}
