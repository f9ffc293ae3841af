//! 出庫異常分析（IQR 上界）

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockflow_core::{DailyBalanceRow, LedgerConfig, StockflowError};

/// 以預設倍數（1.5）分析
pub fn analyze(rows: &[DailyBalanceRow]) -> stockflow_core::Result<OutlierAnalysis> {
    OutlierAnalyzer::default().analyze(rows)
}

/// 第一、第三四分位數
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quartiles {
    pub q1: Decimal,
    pub q3: Decimal,
}

impl Quartiles {
    /// 四分位距
    pub fn iqr(&self) -> Decimal {
        self.q3 - self.q1
    }
}

/// 分析結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierAnalysis {
    /// 出庫量（絕對值）的異常上界
    pub upper_bound: Decimal,

    /// 不含異常值的平均出庫量（絕對值）
    pub mean_excluding_outliers: Decimal,

    /// 少於兩個相異值時為 None
    pub quartiles: Option<Quartiles>,

    /// 視窗內的淨出庫日（保持輸入順序）
    pub outflow_rows: Vec<DailyBalanceRow>,
}

impl OutlierAnalysis {
    fn empty() -> Self {
        Self {
            upper_bound: Decimal::ZERO,
            mean_excluding_outliers: Decimal::ZERO,
            quartiles: None,
            outflow_rows: Vec::new(),
        }
    }

    /// 出庫量嚴格大於上界即為異常
    pub fn is_outlier(&self, row: &DailyBalanceRow) -> bool {
        row.is_outflow_day() && row.outflow_magnitude() > self.upper_bound
    }

    /// 異常的出庫日，依日期排序
    pub fn outliers(&self) -> Vec<&DailyBalanceRow> {
        let mut outliers: Vec<&DailyBalanceRow> = self
            .outflow_rows
            .iter()
            .filter(|r| self.is_outlier(r))
            .collect();
        outliers.sort_by_key(|r| r.date);
        outliers
    }

    /// 視窗內是否有出庫日
    pub fn has_outflows(&self) -> bool {
        !self.outflow_rows.is_empty()
    }
}

/// IQR 異常分析器
#[derive(Debug, Clone)]
pub struct OutlierAnalyzer {
    multiplier: Decimal,
}

impl OutlierAnalyzer {
    /// 創建分析器
    ///
    /// # 參數
    /// * `multiplier` - IQR 倍數（通常為 1.5），必須為正數
    pub fn new(multiplier: Decimal) -> stockflow_core::Result<Self> {
        if multiplier <= Decimal::ZERO {
            return Err(StockflowError::InvalidConfig(format!(
                "IQR 倍數必須為正數，目前為 {}",
                multiplier
            )));
        }
        Ok(Self { multiplier })
    }

    /// 依配置創建分析器
    pub fn from_config(config: &LedgerConfig) -> stockflow_core::Result<Self> {
        Self::new(config.outlier_multiplier)
    }

    pub fn multiplier(&self) -> Decimal {
        self.multiplier
    }

    /// 分析已切好視窗的單一物料序列
    ///
    /// 上界或平均值超出 Decimal 範圍時回傳 `Overflow`。
    pub fn analyze(&self, rows: &[DailyBalanceRow]) -> stockflow_core::Result<OutlierAnalysis> {
        let outflow_rows: Vec<DailyBalanceRow> =
            rows.iter().filter(|r| r.is_outflow_day()).cloned().collect();

        let Some(first) = outflow_rows.first() else {
            return Ok(OutlierAnalysis::empty());
        };
        let overflow = || StockflowError::Overflow {
            item_id: first.item_id.clone(),
        };

        let mut magnitudes: Vec<Decimal> =
            outflow_rows.iter().map(|r| r.net_movement.abs()).collect();
        magnitudes.sort();

        let distinct = magnitudes.windows(2).filter(|w| w[0] != w[1]).count() + 1;
        if distinct < 2 {
            // 沒有變異，上界取最大值
            let upper_bound = magnitudes.last().copied().unwrap_or(Decimal::ZERO);
            let mean_excluding_outliers = mean(&magnitudes).ok_or_else(overflow)?;
            return Ok(OutlierAnalysis {
                upper_bound,
                mean_excluding_outliers,
                quartiles: None,
                outflow_rows,
            });
        }

        let quartiles = Quartiles {
            q1: quantile(&magnitudes, 1, 4),
            q3: quantile(&magnitudes, 3, 4),
        };
        let upper_bound = self
            .multiplier
            .checked_mul(quartiles.iqr())
            .and_then(|spread| quartiles.q3.checked_add(spread))
            .ok_or_else(overflow)?;

        let kept: Vec<Decimal> = magnitudes
            .iter()
            .copied()
            .filter(|m| *m <= upper_bound)
            .collect();

        tracing::debug!(
            "出庫 {} 筆，Q1 {}，Q3 {}，上界 {}，異常 {} 筆",
            magnitudes.len(),
            quartiles.q1,
            quartiles.q3,
            upper_bound,
            magnitudes.len() - kept.len()
        );

        let mean_excluding_outliers = mean(&kept).ok_or_else(overflow)?;
        Ok(OutlierAnalysis {
            upper_bound,
            mean_excluding_outliers,
            quartiles: Some(quartiles),
            outflow_rows,
        })
    }
}

impl Default for OutlierAnalyzer {
    fn default() -> Self {
        Self {
            multiplier: Decimal::new(15, 1),
        }
    }
}

/// 平均值；空集合為 0，加總溢位時為 None
fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return Some(Decimal::ZERO);
    }
    let total = values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))?;
    Some(total / Decimal::from(values.len()))
}

/// 線性插值分位數，位置 = (n - 1) × numerator / denominator
///
/// `sorted` 必須已排序且非空。
fn quantile(sorted: &[Decimal], numerator: usize, denominator: usize) -> Decimal {
    let scaled = (sorted.len() - 1) * numerator;
    let lower = scaled / denominator;
    let remainder = scaled % denominator;

    match (sorted.get(lower), sorted.get(lower + 1)) {
        (Some(&low), Some(&high)) if remainder > 0 => {
            let fraction = Decimal::from(remainder) / Decimal::from(denominator);
            low + (high - low) * fraction
        }
        (Some(&low), _) => low,
        _ => Decimal::ZERO,
    }
}
