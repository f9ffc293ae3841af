//! 日曆區間（每日粒度）

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Result, StockflowError};

/// 含頭含尾的連續日期區間
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateSpan {
    /// 創建新的日期區間，結束日不可早於開始日
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(StockflowError::InvalidDate(format!(
                "結束日 {} 早於開始日 {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// 單日區間
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// 從錨定日延伸到最後日期；較早的日期不會縮短區間
    pub fn anchored<I>(anchor: NaiveDate, dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let end = dates.into_iter().fold(anchor, NaiveDate::max);
        Self { start: anchor, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// 區間內天數
    pub fn len(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// 區間內是否沒有任何一天
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 檢查日期是否在區間內
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// 日期在區間內的位置（第幾天，從 0 起算）
    pub fn offset_of(&self, date: NaiveDate) -> Option<usize> {
        if self.contains(date) {
            Some((date - self.start).num_days() as usize)
        } else {
            None
        }
    }

    /// 逐日迭代
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}
