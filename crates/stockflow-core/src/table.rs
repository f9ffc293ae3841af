//! 原始表格輸入（所有儲存格皆為文字）

use std::fmt;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::Result;

/// 輸入表格種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableKind {
    /// 庫存快照
    Stock,
    /// 異動紀錄
    Movement,
    /// 物料特性
    Characteristics,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TableKind::Stock => "stock table",
            TableKind::Movement => "movement table",
            TableKind::Characteristics => "characteristics table",
        };
        f.write_str(name)
    }
}

/// 尚未驗證的表格
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub kind: TableKind,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// 創建新的表格，標題會去除前後空白
    pub fn new(kind: TableKind, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let headers = headers.into_iter().map(|h| h.trim().to_string()).collect();
        Self {
            kind,
            headers,
            rows,
        }
    }

    /// 從 CSV 讀取（第一列為標題）
    pub fn from_csv_reader<R: Read>(kind: TableKind, reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self::new(kind, headers, rows))
    }

    /// 從 CSV 位元組讀取
    pub fn from_csv_bytes(kind: TableKind, bytes: &[u8]) -> Result<Self> {
        Self::from_csv_reader(kind, bytes)
    }

    /// 依名稱（含別名）尋找欄位索引
    pub fn column_index(&self, names: &[&str]) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
    }

    /// 取得儲存格；列長度不足時視為空字串
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(|c| c.trim())
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_csv_bytes() {
        let csv = "Item,Site,Fecha,Movimientos\nX,PLANT-01,2023-01-02,-30\nY, PLANT-02 ,2023-01-03,10\n";
        let table = RawTable::from_csv_bytes(TableKind::Movement, csv.as_bytes()).unwrap();

        assert_eq!(table.kind, TableKind::Movement);
        assert_eq!(table.headers, vec!["Item", "Site", "Fecha", "Movimientos"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(1, 1), "PLANT-02");
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let csv = "Item,CurrentStock,LeadTime,StockSeguridad\nX,100\n";
        let table = RawTable::from_csv_bytes(TableKind::Stock, csv.as_bytes()).unwrap();

        assert_eq!(table.cell(0, 1), "100");
        assert_eq!(table.cell(0, 3), "");
        assert_eq!(table.cell(5, 0), "");
    }

    #[test]
    fn test_column_lookup_with_alias() {
        let table = RawTable::new(
            TableKind::Stock,
            vec![" Item ".to_string(), "SafetyStock".to_string()],
            vec![],
        );

        assert_eq!(table.column_index(&["Item"]), Some(0));
        assert_eq!(table.column_index(&["StockSeguridad", "SafetyStock"]), Some(1));
        assert_eq!(table.column_index(&["LeadTime"]), None);
        assert!(table.is_empty());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(TableKind::Stock.to_string(), "stock table");
        assert_eq!(TableKind::Characteristics.to_string(), "characteristics table");
    }
}
