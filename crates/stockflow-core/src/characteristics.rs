//! 物料特性模型（僅供顯示，不參與餘額計算）

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 物料特性
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacteristicRecord {
    pub item_id: String,
    pub site: String,
    pub description: String,

    /// 平均需求間隔（Average Demand Interval）
    pub adi: Decimal,

    /// 需求變異係數
    pub cv: Decimal,

    /// 預測/補貨方法
    pub method: String,

    pub abc_class: String,
}

impl CharacteristicRecord {
    /// 創建新的物料特性（其餘欄位為空）
    pub fn new(item_id: String, site: String) -> Self {
        Self {
            item_id,
            site,
            description: String::new(),
            adi: Decimal::ZERO,
            cv: Decimal::ZERO,
            method: String::new(),
            abc_class: String::new(),
        }
    }

    /// 建構器模式：設置描述
    pub fn with_description(mut self, description: String) -> Self {
        self.description = description;
        self
    }

    /// 建構器模式：設置需求型態指標
    pub fn with_demand_pattern(mut self, adi: Decimal, cv: Decimal) -> Self {
        self.adi = adi;
        self.cv = cv;
        self
    }

    /// 建構器模式：設置方法
    pub fn with_method(mut self, method: String) -> Self {
        self.method = method;
        self
    }

    /// 建構器模式：設置 ABC 分類
    pub fn with_abc_class(mut self, abc_class: String) -> Self {
        self.abc_class = abc_class;
        self
    }
}
