//! # Stockflow Cache
//!
//! 呼叫端快取：以輸入檔內容雜湊為鍵，避免重複驗證與重建

pub mod fingerprint;
pub mod store;

// Re-export 主要類型
pub use fingerprint::ContentHash;
pub use store::{CacheKey, LedgerCache};
