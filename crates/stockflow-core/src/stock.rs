//! 庫存快照模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Result, StockflowError};

/// 庫存快照（期初庫存的來源）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    /// 物料ID
    pub item_id: String,

    /// 倉庫/據點
    pub site: String,

    /// 現有庫存
    pub current_stock: Decimal,

    /// 提前期（天）
    pub lead_time: Decimal,

    /// 安全庫存
    pub safety_stock: Decimal,
}

impl StockRecord {
    /// 創建新的庫存快照
    pub fn new(item_id: String, current_stock: Decimal, safety_stock: Decimal) -> Self {
        Self {
            item_id,
            site: String::new(),
            current_stock,
            lead_time: Decimal::ZERO,
            safety_stock,
        }
    }

    /// 建構器模式：設置據點
    pub fn with_site(mut self, site: String) -> Self {
        self.site = site;
        self
    }

    /// 建構器模式：設置提前期
    pub fn with_lead_time(mut self, lead_time: Decimal) -> Self {
        self.lead_time = lead_time;
        self
    }

    /// 期初餘額 = 現有庫存 + 安全庫存；超出 Decimal 範圍時回傳 `Overflow`
    pub fn initial_balance(&self) -> Result<Decimal> {
        self.current_stock
            .checked_add(self.safety_stock)
            .ok_or_else(|| StockflowError::Overflow {
                item_id: self.item_id.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_stock_record() {
        let record = StockRecord::new("X".to_string(), Decimal::from(100), Decimal::from(20));

        assert_eq!(record.item_id, "X");
        assert_eq!(record.lead_time, Decimal::ZERO);
        assert_eq!(record.initial_balance().unwrap(), Decimal::from(120));
    }

    #[test]
    fn test_stock_record_builder() {
        let record = StockRecord::new("FRAME-001".to_string(), Decimal::new(105, 1), Decimal::ZERO)
            .with_site("PLANT-01".to_string())
            .with_lead_time(Decimal::from(7));

        assert_eq!(record.site, "PLANT-01");
        assert_eq!(record.lead_time, Decimal::from(7));
        assert_eq!(record.initial_balance().unwrap(), Decimal::new(105, 1));
    }

    #[test]
    fn test_negative_stock_keeps_exact_sum() {
        let record = StockRecord::new("WHEEL-001".to_string(), Decimal::from(-5), Decimal::from(20));
        assert_eq!(record.initial_balance().unwrap(), Decimal::from(15));
    }

    #[test]
    fn test_initial_balance_overflow() {
        let record = StockRecord::new("BIG".to_string(), Decimal::MAX, Decimal::ONE);

        match record.initial_balance() {
            Err(StockflowError::Overflow { item_id }) => assert_eq!(item_id, "BIG"),
            other => panic!("expected Overflow, got {:?}", other),
        }
    }
}
