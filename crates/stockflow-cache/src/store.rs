//! 重建結果快取

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use stockflow_calc::BalanceLedger;

use crate::fingerprint::ContentHash;

/// 快取鍵：庫存表雜湊 + 異動表雜湊 + 期初餘額日
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub stock: ContentHash,
    pub movements: ContentHash,
    pub initial_balance_date: NaiveDate,
}

impl CacheKey {
    /// 由原始檔案內容建立快取鍵
    pub fn new(stock_bytes: &[u8], movement_bytes: &[u8], initial_balance_date: NaiveDate) -> Self {
        Self {
            stock: ContentHash::of(stock_bytes),
            movements: ContentHash::of(movement_bytes),
            initial_balance_date,
        }
    }
}

/// 重建結果快取（純呼叫端使用，計算引擎不會查詢）
#[derive(Debug, Default)]
pub struct LedgerCache {
    entries: HashMap<CacheKey, Arc<BalanceLedger>>,
    hits: u64,
    misses: u64,
}

impl LedgerCache {
    /// 創建空的快取
    pub fn new() -> Self {
        Self::default()
    }

    /// 查詢快取
    pub fn get(&self, key: &CacheKey) -> Option<Arc<BalanceLedger>> {
        self.entries.get(key).cloned()
    }

    /// 命中則回傳快取結果；否則執行 `compute`，成功時寫入快取
    ///
    /// `compute` 失敗時不寫入，錯誤原樣回傳。
    pub fn get_or_try_insert_with<F, E>(
        &mut self,
        key: CacheKey,
        compute: F,
    ) -> Result<Arc<BalanceLedger>, E>
    where
        F: FnOnce() -> Result<BalanceLedger, E>,
    {
        if let Some(ledger) = self.entries.get(&key) {
            self.hits += 1;
            tracing::debug!("快取命中: stock={} movements={}", key.stock, key.movements);
            return Ok(Arc::clone(ledger));
        }

        self.misses += 1;
        tracing::debug!("快取未命中: stock={} movements={}", key.stock, key.movements);

        let ledger = Arc::new(compute()?);
        self.entries.insert(key, Arc::clone(&ledger));
        Ok(ledger)
    }

    /// 移除單一項目
    pub fn invalidate(&mut self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// 清除所有項目
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (命中次數, 未命中次數)
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockflow_core::StockflowError;

    fn anchor() -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 12, 31).unwrap()
    }

    #[test]
    fn test_compute_once_per_key() {
        let mut cache = LedgerCache::new();
        let key = CacheKey::new(b"stock-v1", b"movements-v1", anchor());
        let mut calls = 0;

        for _ in 0..3 {
            let ledger = cache
                .get_or_try_insert_with(key, || {
                    calls += 1;
                    Ok::<_, StockflowError>(BalanceLedger::empty())
                })
                .unwrap();
            assert!(ledger.series.is_empty());
        }

        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats(), (2, 1));
    }

    #[test]
    fn test_changed_content_is_new_key() {
        let a = CacheKey::new(b"stock-v1", b"movements-v1", anchor());
        let b = CacheKey::new(b"stock-v1", b"movements-v2", anchor());
        let c = CacheKey::new(b"stock-v1", b"movements-v1", anchor().succ_opt().unwrap());

        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_errors_not_cached() {
        let mut cache = LedgerCache::new();
        let key = CacheKey::new(b"dup", b"", anchor());

        let result = cache.get_or_try_insert_with(key, || {
            Err(StockflowError::DuplicateKey {
                table: stockflow_core::TableKind::Stock,
                item_id: "X".to_string(),
            })
        });

        assert!(result.is_err());
        assert!(cache.is_empty());
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn test_invalidate_and_clear() {
        let mut cache = LedgerCache::new();
        let key = CacheKey::new(b"s", b"m", anchor());
        cache
            .get_or_try_insert_with(key, || Ok::<_, StockflowError>(BalanceLedger::empty()))
            .unwrap();

        assert!(cache.invalidate(&key));
        assert!(!cache.invalidate(&key));

        cache
            .get_or_try_insert_with(key, || Ok::<_, StockflowError>(BalanceLedger::empty()))
            .unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }
}
