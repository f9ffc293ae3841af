//! 庫存異動模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 庫存異動記錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementRecord {
    /// 物料ID
    pub item_id: String,

    /// 倉庫/據點
    pub site: String,

    /// 異動日期
    pub date: NaiveDate,

    /// 帶符號的異動數量
    pub quantity: Decimal,
}

impl MovementRecord {
    /// 創建新的異動記錄
    pub fn new(item_id: String, site: String, date: NaiveDate, quantity: Decimal) -> Self {
        Self {
            item_id,
            site,
            date,
            quantity,
        }
    }

    /// 入庫部分（正數部分，否則為 0）
    pub fn inflow(&self) -> Decimal {
        self.quantity.max(Decimal::ZERO)
    }

    /// 出庫部分（負數部分，否則為 0）
    pub fn outflow(&self) -> Decimal {
        self.quantity.min(Decimal::ZERO)
    }
}
