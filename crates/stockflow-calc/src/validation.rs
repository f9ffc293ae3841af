//! 輸入表格驗證與轉型

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use stockflow_core::{
    CharacteristicRecord, CoercionWarning, LedgerConfig, MovementRecord, RawTable, StockRecord,
    StockflowError, TableKind,
};

// 欄位名稱（第一個為標準名稱，其餘為別名）
const ITEM: &[&str] = &["Item"];
const SITE: &[&str] = &["Site"];
const CURRENT_STOCK: &[&str] = &["CurrentStock"];
const LEAD_TIME: &[&str] = &["LeadTime"];
const SAFETY_STOCK: &[&str] = &["StockSeguridad", "SafetyStock"];
const DATE: &[&str] = &["Fecha", "Date"];
const QUANTITY: &[&str] = &["Movimientos", "Quantity"];
const DESCRIPTION: &[&str] = &["Descripcion", "Descripción", "Description"];
const ADI: &[&str] = &["ADI"];
const CV: &[&str] = &["CV"];
const METHOD: &[&str] = &["Metodo", "Método", "Method"];
const ABC_CLASS: &[&str] = &["ABC Class", "AbcClass"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// 驗證後的記錄與轉型警告
#[derive(Debug, Clone)]
pub struct Validated<T> {
    pub records: Vec<T>,
    pub warnings: Vec<CoercionWarning>,
}

impl<T> Validated<T> {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// 輸入記錄驗證器
pub struct RecordValidator {
    stock_site_default: String,
    unknown_site: String,
}

impl RecordValidator {
    /// 創建新的驗證器
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            stock_site_default: config.stock_site_default.clone(),
            unknown_site: config.unknown_site.clone(),
        }
    }

    /// 驗證庫存快照
    ///
    /// 必要欄位：Item、CurrentStock、LeadTime、StockSeguridad；Site 可省略。
    /// 物料重複時回傳 `DuplicateKey`。
    pub fn stock(&self, table: &RawTable) -> stockflow_core::Result<Validated<StockRecord>> {
        expect_kind(table, TableKind::Stock)?;
        let cols = resolve_columns(table, &[ITEM, CURRENT_STOCK, LEAD_TIME, SAFETY_STOCK])?;
        let (item, current, lead, safety) = (cols[0], cols[1], cols[2], cols[3]);
        let site_col = table.column_index(SITE);

        let mut out = Validated::new();
        let mut seen = HashSet::new();

        for row in 0..table.len() {
            let Some(item_id) = item_cell(table, row, item, &mut out.warnings) else {
                continue;
            };
            if !seen.insert(item_id.clone()) {
                return Err(StockflowError::DuplicateKey {
                    table: TableKind::Stock,
                    item_id,
                });
            }

            let site = site_col
                .map(|c| table.cell(row, c))
                .filter(|s| !s.is_empty())
                .unwrap_or(self.stock_site_default.as_str())
                .to_string();

            let current_stock =
                number_cell(table, row, current, CURRENT_STOCK[0], &mut out.warnings);
            let lead_time = number_cell(table, row, lead, LEAD_TIME[0], &mut out.warnings);
            let safety_stock =
                number_cell(table, row, safety, SAFETY_STOCK[0], &mut out.warnings);

            out.records.push(
                StockRecord::new(item_id, current_stock, safety_stock)
                    .with_site(site)
                    .with_lead_time(lead_time),
            );
        }

        log_summary(table, &out);
        Ok(out)
    }

    /// 驗證異動紀錄
    ///
    /// 日期無法解析的列會被捨棄；數量無法解析時以 0 代替。
    pub fn movements(&self, table: &RawTable) -> stockflow_core::Result<Validated<MovementRecord>> {
        expect_kind(table, TableKind::Movement)?;
        let cols = resolve_columns(table, &[ITEM, SITE, DATE, QUANTITY])?;
        let (item, site_col, date, quantity) = (cols[0], cols[1], cols[2], cols[3]);

        let mut out = Validated::new();

        for row in 0..table.len() {
            let Some(item_id) = item_cell(table, row, item, &mut out.warnings) else {
                continue;
            };

            let raw_date = table.cell(row, date);
            let Some(parsed) = parse_date(raw_date) else {
                out.warnings
                    .push(CoercionWarning::dropped(table.kind, row, DATE[0], raw_date));
                continue;
            };

            let site = match table.cell(row, site_col) {
                "" => self.unknown_site.clone(),
                s => s.to_string(),
            };
            let qty = number_cell(table, row, quantity, QUANTITY[0], &mut out.warnings);

            out.records.push(MovementRecord::new(item_id, site, parsed, qty));
        }

        log_summary(table, &out);
        Ok(out)
    }

    /// 驗證物料特性
    pub fn characteristics(
        &self,
        table: &RawTable,
    ) -> stockflow_core::Result<Validated<CharacteristicRecord>> {
        expect_kind(table, TableKind::Characteristics)?;
        let cols = resolve_columns(
            table,
            &[ITEM, SITE, DESCRIPTION, ADI, CV, METHOD, ABC_CLASS],
        )?;

        let mut out = Validated::new();

        for row in 0..table.len() {
            let Some(item_id) = item_cell(table, row, cols[0], &mut out.warnings) else {
                continue;
            };

            let adi = number_cell(table, row, cols[3], ADI[0], &mut out.warnings);
            let cv = number_cell(table, row, cols[4], CV[0], &mut out.warnings);

            out.records.push(
                CharacteristicRecord::new(item_id, table.cell(row, cols[1]).to_string())
                    .with_description(table.cell(row, cols[2]).to_string())
                    .with_demand_pattern(adi, cv)
                    .with_method(table.cell(row, cols[5]).to_string())
                    .with_abc_class(table.cell(row, cols[6]).to_string()),
            );
        }

        log_summary(table, &out);
        Ok(out)
    }
}

fn expect_kind(table: &RawTable, expected: TableKind) -> stockflow_core::Result<()> {
    if table.kind != expected {
        return Err(StockflowError::Other(format!(
            "預期 {}，收到 {}",
            expected, table.kind
        )));
    }
    Ok(())
}

/// 找出所有必要欄位；一次回報全部缺少的欄位
fn resolve_columns(table: &RawTable, required: &[&[&str]]) -> stockflow_core::Result<Vec<usize>> {
    let mut indices = Vec::with_capacity(required.len());
    let mut missing = Vec::new();

    for names in required {
        match table.column_index(names) {
            Some(idx) => indices.push(idx),
            None => missing.push(names[0].to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(StockflowError::MissingColumn {
            table: table.kind,
            missing,
            found: table.headers.clone(),
        });
    }

    Ok(indices)
}

/// 物料ID；空白時捨棄整列
fn item_cell(
    table: &RawTable,
    row: usize,
    column: usize,
    warnings: &mut Vec<CoercionWarning>,
) -> Option<String> {
    let raw = table.cell(row, column);
    if raw.is_empty() {
        tracing::warn!("{} 第 {} 列物料ID 為空，捨棄", table.kind, row);
        warnings.push(CoercionWarning::dropped(table.kind, row, ITEM[0], raw));
        return None;
    }
    Some(raw.to_string())
}

/// 數值儲存格；無法解析時以 0 代替並記錄警告
fn number_cell(
    table: &RawTable,
    row: usize,
    column: usize,
    name: &str,
    warnings: &mut Vec<CoercionWarning>,
) -> Decimal {
    let raw = table.cell(row, column);
    match parse_decimal(raw) {
        Some(value) => value,
        None => {
            tracing::warn!("{} 第 {} 列 {} 無法轉為數值: {:?}", table.kind, row, name, raw);
            warnings.push(CoercionWarning::defaulted(table.kind, row, name, raw));
            Decimal::ZERO
        }
    }
}

/// 解析數值（支援科學記號）
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// 解析日期；含時間的格式只取日期部分
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn log_summary<T>(table: &RawTable, out: &Validated<T>) {
    tracing::debug!(
        "{} 驗證完成：{} 列輸入，{} 筆記錄，{} 個警告",
        table.kind,
        table.len(),
        out.records.len(),
        out.warnings.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use stockflow_core::CoercionAction;

    fn table(kind: TableKind, csv: &str) -> RawTable {
        RawTable::from_csv_bytes(kind, csv.as_bytes()).unwrap()
    }

    fn validator() -> RecordValidator {
        RecordValidator::new(&LedgerConfig::default())
    }

    #[test]
    fn test_stock_table() {
        let t = table(
            TableKind::Stock,
            "Item,CurrentStock,LeadTime,StockSeguridad,Site\nX,100,5,20,PLANT-01\nY,abc,3,1.5,\n",
        );

        let out = validator().stock(&t).unwrap();

        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[0].initial_balance().unwrap(), Decimal::from(120));
        assert_eq!(out.records[0].site, "PLANT-01");
        assert_eq!(out.records[0].lead_time, Decimal::from(5));

        // 無法解析的數值以 0 代替
        assert_eq!(out.records[1].current_stock, Decimal::ZERO);
        assert_eq!(out.records[1].initial_balance().unwrap(), Decimal::new(15, 1));
        assert_eq!(out.records[1].site, "N/A_Inventario");

        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].column, "CurrentStock");
        assert_eq!(out.warnings[0].raw, "abc");
        assert_eq!(out.warnings[0].action, CoercionAction::DefaultedToZero);
    }

    #[test]
    fn test_stock_without_site_column() {
        let t = table(
            TableKind::Stock,
            "Item,CurrentStock,LeadTime,SafetyStock\nX,10,0,0\n",
        );

        let out = validator().stock(&t).unwrap();
        assert_eq!(out.records[0].site, "N/A_Inventario");
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_stock_duplicate_item() {
        let t = table(
            TableKind::Stock,
            "Item,CurrentStock,LeadTime,StockSeguridad\nX,1,0,0\nY,2,0,0\nX,3,0,0\n",
        );

        let err = validator().stock(&t).unwrap_err();
        assert!(err.is_validation());
        assert!(matches!(
            err,
            StockflowError::DuplicateKey { ref item_id, .. } if item_id == "X"
        ));
    }

    #[test]
    fn test_missing_columns_reported_together() {
        let t = table(TableKind::Movement, "Item,Qty\nX,1\n");

        match validator().movements(&t) {
            Err(StockflowError::MissingColumn {
                table,
                missing,
                found,
            }) => {
                assert_eq!(table, TableKind::Movement);
                assert_eq!(missing, vec!["Site", "Fecha", "Movimientos"]);
                assert_eq!(found, vec!["Item", "Qty"]);
            }
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_movements_coercion() {
        let t = table(
            TableKind::Movement,
            "Item,Site,Fecha,Movimientos\n\
             X,PLANT-01,2023-01-02,-30\n\
             X,PLANT-01,not-a-date,-5\n\
             X,,2023-01-03 08:15:00,oops\n\
             ,PLANT-01,2023-01-04,1\n",
        );

        let out = validator().movements(&t).unwrap();

        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[0].quantity, Decimal::from(-30));
        assert_eq!(
            out.records[1].date,
            NaiveDate::from_ymd_opt(2023, 1, 3).unwrap()
        );
        assert_eq!(out.records[1].quantity, Decimal::ZERO);
        assert_eq!(out.records[1].site, "N/A");

        let actions: Vec<(usize, CoercionAction)> =
            out.warnings.iter().map(|w| (w.row, w.action)).collect();
        assert_eq!(
            actions,
            vec![
                (1, CoercionAction::RowDropped),
                (2, CoercionAction::DefaultedToZero),
                (3, CoercionAction::RowDropped),
            ]
        );
    }

    #[test]
    fn test_characteristics_table() {
        let t = table(
            TableKind::Characteristics,
            "Item,Site,Descripcion,ADI,CV,Metodo,ABC Class\nX,PLANT-01,Rodamiento,1.32,n/a,Croston,A\n",
        );

        let out = validator().characteristics(&t).unwrap();

        let record = &out.records[0];
        assert_eq!(record.description, "Rodamiento");
        assert_eq!(record.adi, Decimal::new(132, 2));
        assert_eq!(record.cv, Decimal::ZERO);
        assert_eq!(record.abc_class, "A");
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].column, "CV");
    }

    #[test]
    fn test_wrong_table_kind() {
        let t = table(TableKind::Movement, "Item,Site,Fecha,Movimientos\n");
        assert!(validator().stock(&t).is_err());
    }

    #[rstest]
    #[case("2023-01-02", Some((2023, 1, 2)))]
    #[case("2023/01/02", Some((2023, 1, 2)))]
    #[case("02/01/2023", Some((2023, 1, 2)))]
    #[case("2023-01-02 23:59:59", Some((2023, 1, 2)))]
    #[case("2023-01-02T00:00:00", Some((2023, 1, 2)))]
    #[case("2023-02-30", None)]
    #[case("", None)]
    fn test_parse_date(#[case] raw: &str, #[case] expected: Option<(i32, u32, u32)>) {
        let expected = expected.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap());
        assert_eq!(parse_date(raw), expected);
    }

    #[rstest]
    #[case("100", Some(Decimal::from(100)))]
    #[case("-30.5", Some(Decimal::new(-305, 1)))]
    #[case("1e3", Some(Decimal::from(1000)))]
    #[case(" 7 ", Some(Decimal::from(7)))]
    #[case("", None)]
    #[case("abc", None)]
    fn test_parse_decimal(#[case] raw: &str, #[case] expected: Option<Decimal>) {
        assert_eq!(parse_decimal(raw), expected);
    }
}
