//! 庫存流水配置模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Result, StockflowError};

/// 餘額重建與異常分析的參數配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// 期初餘額日（錨定日）
    pub initial_balance_date: NaiveDate,

    /// 顯示視窗起始日（由呈現層用來切片）
    pub display_start_date: NaiveDate,

    /// 庫存表缺少據點時使用的據點
    pub stock_site_default: String,

    /// 物料不在庫存表、也沒有異動據點時使用的據點
    pub unknown_site: String,

    /// IQR 上界倍數（Tukey fence）
    pub outlier_multiplier: Decimal,

    /// 是否以 rayon 並行重建各物料
    /// - false: 單執行緒（預設）
    /// - true: 逐物料並行，結果與單執行緒完全相同
    pub parallel: bool,
}

impl LedgerConfig {
    /// 創建新的配置
    pub fn new(initial_balance_date: NaiveDate) -> Self {
        Self {
            initial_balance_date,
            display_start_date: initial_balance_date
                .succ_opt()
                .unwrap_or(initial_balance_date),
            stock_site_default: "N/A_Inventario".to_string(),
            unknown_site: "N/A".to_string(),
            outlier_multiplier: Decimal::new(15, 1),
            parallel: false,
        }
    }

    /// 建構器模式：設置顯示視窗起始日
    pub fn with_display_start_date(mut self, date: NaiveDate) -> Self {
        self.display_start_date = date;
        self
    }

    /// 建構器模式：設置庫存表預設據點
    pub fn with_stock_site_default(mut self, site: String) -> Self {
        self.stock_site_default = site;
        self
    }

    /// 建構器模式：設置未知物料的據點
    pub fn with_unknown_site(mut self, site: String) -> Self {
        self.unknown_site = site;
        self
    }

    /// 建構器模式：設置 IQR 倍數
    pub fn with_outlier_multiplier(mut self, multiplier: Decimal) -> Self {
        self.outlier_multiplier = multiplier;
        self
    }

    /// 建構器模式：設置是否並行
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// 從 JSON 載入配置（缺少的欄位使用預設值）
    ///
    /// # 範例
    /// ```
    /// # use stockflow_core::LedgerConfig;
    /// let config = LedgerConfig::from_json_str(r#"{"initial_balance_date": "2023-06-30"}"#).unwrap();
    /// assert_eq!(config.initial_balance_date.to_string(), "2023-06-30");
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| StockflowError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 驗證配置
    pub fn validate(&self) -> Result<()> {
        if self.outlier_multiplier <= Decimal::ZERO {
            return Err(StockflowError::InvalidConfig(format!(
                "outlier_multiplier 必須為正數，目前為 {}",
                self.outlier_multiplier
            )));
        }
        Ok(())
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        let initial = NaiveDate::from_ymd_opt(2022, 12, 31).unwrap_or(NaiveDate::MIN);
        Self::new(initial)
    }
}
