//! 資料轉型警告（不中斷處理）

use serde::{Deserialize, Serialize};

use crate::TableKind;

/// 轉型失敗時採取的處置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoercionAction {
    /// 數值無法解析，以 0 代替
    DefaultedToZero,
    /// 日期或物料無法解析，整列捨棄
    RowDropped,
}

/// 儲存格轉型警告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoercionWarning {
    pub table: TableKind,

    /// 資料列索引（不含標題列，從 0 起算）
    pub row: usize,

    pub column: String,

    /// 原始儲存格內容
    pub raw: String,

    pub action: CoercionAction,
}

impl CoercionWarning {
    pub fn new(
        table: TableKind,
        row: usize,
        column: &str,
        raw: &str,
        action: CoercionAction,
    ) -> Self {
        Self {
            table,
            row,
            column: column.to_string(),
            raw: raw.to_string(),
            action,
        }
    }

    pub fn defaulted(table: TableKind, row: usize, column: &str, raw: &str) -> Self {
        Self::new(table, row, column, raw, CoercionAction::DefaultedToZero)
    }

    pub fn dropped(table: TableKind, row: usize, column: &str, raw: &str) -> Self {
        Self::new(table, row, column, raw, CoercionAction::RowDropped)
    }

    /// 是否捨棄了整列
    pub fn is_row_drop(&self) -> bool {
        self.action == CoercionAction::RowDropped
    }
}
