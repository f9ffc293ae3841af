//! # Stockflow
//!
//! 每日庫存餘額重建與出庫異常分析
//!
//! - [`stockflow_core`]: 資料模型、配置、錯誤類型
//! - [`stockflow_calc`]: 驗證、重建、異常分析
//! - [`stockflow_cache`]: 呼叫端的重建結果快取

pub use stockflow_cache;
pub use stockflow_calc;
pub use stockflow_core;

pub use stockflow_calc::{
    analyze, reconstruct, BalanceLedger, BalanceReconstructor, ItemProfile, LedgerWarning,
    OutlierAnalysis, OutlierAnalyzer, RecordValidator,
};
pub use stockflow_core::{
    DailyBalanceRow, LedgerConfig, MovementRecord, RawTable, Result, StockRecord, StockflowError,
    TableKind,
};

/// 常用類型
pub mod prelude {
    pub use stockflow_cache::{CacheKey, ContentHash, LedgerCache};
    pub use stockflow_calc::{
        analyze, last_balance_before, reconstruct, site_breakdown, window, BalanceLedger,
        BalanceReconstructor, ItemProfile, LedgerWarning, OutlierAnalysis, OutlierAnalyzer,
        RecordValidator, Validated,
    };
    pub use stockflow_core::{
        CharacteristicRecord, CoercionWarning, DailyBalanceRow, LedgerConfig, MovementRecord,
        RawTable, StockRecord, StockflowError, TableKind,
    };
}
