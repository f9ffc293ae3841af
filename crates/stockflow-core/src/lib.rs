//! # Stockflow Core
//!
//! 庫存流水的核心資料模型與類型定義

pub mod balance;
pub mod calendar;
pub mod characteristics;
pub mod config;
pub mod movement;
pub mod stock;
pub mod table;
pub mod warning;

// Re-export 主要類型
pub use balance::DailyBalanceRow;
pub use calendar::DateSpan;
pub use characteristics::CharacteristicRecord;
pub use config::LedgerConfig;
pub use movement::MovementRecord;
pub use stock::StockRecord;
pub use table::{RawTable, TableKind};
pub use warning::{CoercionAction, CoercionWarning};

/// 庫存流水錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum StockflowError {
    #[error("{table} 缺少必要欄位: {missing:?}（找到的欄位: {found:?}）")]
    MissingColumn {
        table: TableKind,
        missing: Vec<String>,
        found: Vec<String>,
    },

    #[error("{table} 中物料重複: {item_id}")]
    DuplicateKey { table: TableKind, item_id: String },

    #[error("CSV 解析錯誤: {0}")]
    Csv(String),

    #[error("無效的配置: {0}")]
    InvalidConfig(String),

    #[error("無效的日期: {0}")]
    InvalidDate(String),

    #[error("物料 {item_id} 數值溢位")]
    Overflow { item_id: String },

    #[error("其他錯誤: {0}")]
    Other(String),
}

impl StockflowError {
    /// 是否屬於輸入驗證錯誤（缺欄位或重複鍵）
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StockflowError::MissingColumn { .. } | StockflowError::DuplicateKey { .. }
        )
    }
}

impl From<csv::Error> for StockflowError {
    fn from(err: csv::Error) -> Self {
        StockflowError::Csv(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StockflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        let missing = StockflowError::MissingColumn {
            table: TableKind::Stock,
            missing: vec!["Item".to_string()],
            found: vec![],
        };
        let duplicate = StockflowError::DuplicateKey {
            table: TableKind::Stock,
            item_id: "X".to_string(),
        };

        assert!(missing.is_validation());
        assert!(duplicate.is_validation());
        assert!(!StockflowError::Csv("bad quote".to_string()).is_validation());
        assert!(!StockflowError::Overflow {
            item_id: "X".to_string()
        }
        .is_validation());
    }

    #[test]
    fn test_error_message_names_table() {
        let err = StockflowError::MissingColumn {
            table: TableKind::Movement,
            missing: vec!["Fecha".to_string()],
            found: vec!["Item".to_string()],
        };

        let message = err.to_string();
        assert!(message.contains("movement"));
        assert!(message.contains("Fecha"));
    }
}
