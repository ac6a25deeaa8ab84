use crate::model::date::{date_from_serial, days_since_epoch};
use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column labels of every monthly sheet, in wire order. Every reader and
/// writer of the yearly spreadsheets depends on exactly this order.
pub const TRANSACTION_HEADERS: [&str; 11] = [
    "Date",
    "Type",
    "Source Account",
    "Destination Account",
    "Group",
    "Category",
    "Notes",
    "Details",
    "Currency",
    "Amount",
    "Transaction id",
];

/// Currency written by the single-movement entry path.
pub(crate) const DEFAULT_CURRENCY: &str = "EUR";

/// The direction of a money movement. The sign of a transaction is carried
/// here, never by the amount.
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[default]
    Expense,
    Income,
    Transfer,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

/// A single dated money movement.
///
/// The amount is kept non-negative: constructors take the absolute value, so
/// the invariant holds no matter how the value was produced upstream.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Transaction {
    pub(crate) date: NaiveDate,
    pub(crate) notes: String,
    pub(crate) details: String,
    pub(crate) source_account: Option<String>,
    pub(crate) dest_account: Option<String>,
    pub(crate) group: Option<String>,
    pub(crate) category: String,
    pub(crate) currency: String,
    pub(crate) kind: TransactionType,
    amount: Decimal,
}

impl Transaction {
    /// Creates a transaction with empty notes and details, no accounts or
    /// group, and the default currency. Use the `with_*` methods to fill in
    /// the rest.
    pub fn new(
        date: NaiveDate,
        kind: TransactionType,
        category: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            date,
            notes: String::new(),
            details: String::new(),
            source_account: None,
            dest_account: None,
            group: None,
            category: category.into(),
            currency: DEFAULT_CURRENCY.to_string(),
            kind,
            amount: amount.abs(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    pub fn with_source_account(mut self, account: impl Into<String>) -> Self {
        self.source_account = Some(account.into());
        self
    }

    pub fn with_dest_account(mut self, account: impl Into<String>) -> Self {
        self.dest_account = Some(account.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    pub fn source_account(&self) -> Option<&str> {
        self.source_account.as_deref()
    }

    pub fn dest_account(&self) -> Option<&str> {
        self.dest_account.as_deref()
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    /// The non-negative amount of the movement.
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// The 4-digit year key of the spreadsheet this transaction belongs to.
    pub(crate) fn year_key(&self) -> String {
        self.date.year().to_string()
    }

    /// The 0-based calendar month of the sheet this transaction belongs to.
    pub(crate) fn month0(&self) -> u32 {
        self.date.month0()
    }

    /// Derives the pseudo-unique row id: the day count since 1900-01-01 and
    /// the amount in rounded cents, each as 6 uppercase hex digits, joined
    /// with a fixed `-0000` suffix.
    ///
    /// Two transactions on the same day with the same rounded amount collide.
    /// The id is decorative traceability data, not a key, and no uniqueness
    /// check is performed before appending.
    pub fn transaction_id(&self) -> String {
        let days = days_since_epoch(self.date);
        let cents = (self.amount * Decimal::from(100))
            .round()
            .to_i64()
            .unwrap_or_default();
        format!("{days:06X}-{cents:06X}-0000")
    }

    /// Encodes the transaction as a sheet row, columns per
    /// [`TRANSACTION_HEADERS`]. Absent optional fields become empty strings
    /// and the amount is written as a bare number.
    pub(crate) fn to_row(&self) -> Vec<Value> {
        vec![
            Value::from(self.date.format("%Y-%m-%d").to_string()),
            Value::from(self.kind.to_string()),
            Value::from(self.source_account.clone().unwrap_or_default()),
            Value::from(self.dest_account.clone().unwrap_or_default()),
            Value::from(self.group.clone().unwrap_or_default()),
            Value::from(self.category.clone()),
            Value::from(self.notes.clone()),
            Value::from(self.details.clone()),
            Value::from(self.currency.clone()),
            Value::from(self.amount.to_f64().unwrap_or_default()),
            Value::from(self.transaction_id()),
        ]
    }

    /// Decodes a sheet row back into a transaction, or `None` if the row does
    /// not have the expected shape. The shape check is what filters out the
    /// header row and malformed trailing rows, so a failure here is never an
    /// error.
    ///
    /// Accepted rows have at least 10 cells: a string or numeric date, a
    /// recognized type, seven string cells, and a numeric amount. String
    /// dates are `YYYY-MM-DD`; numeric dates are a 1-based day serial counted
    /// from 1900-01-01.
    pub(crate) fn from_row(row: &[Value]) -> Option<Self> {
        if row.len() < 10 {
            return None;
        }
        let date = match &row[0] {
            Value::String(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?,
            Value::Number(n) => date_from_serial(n.as_f64()? as i64),
            _ => return None,
        };
        let kind: TransactionType = row[1].as_str()?.parse().ok()?;
        let mut text = Vec::with_capacity(7);
        for cell in &row[2..9] {
            text.push(cell.as_str()?.to_string());
        }
        let amount = Decimal::from_f64(row[9].as_f64()?)?;

        let optional = |s: &String| {
            if s.is_empty() {
                None
            } else {
                Some(s.clone())
            }
        };
        Some(Self {
            date,
            kind,
            source_account: optional(&text[0]),
            dest_account: optional(&text[1]),
            group: optional(&text[2]),
            category: text[3].clone(),
            notes: text[4].clone(),
            details: text[5].clone(),
            currency: text[6].clone(),
            amount: amount.abs(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_transaction_id_derivation() {
        let t = Transaction::new(
            date(2024, 3, 15),
            TransactionType::Expense,
            "Home",
            dec!(42.50),
        );
        assert_eq!(t.transaction_id(), "00B134-00109A-0000");
    }

    #[test]
    fn test_transaction_id_collides_for_same_day_and_amount() {
        let a = Transaction::new(
            date(2024, 3, 15),
            TransactionType::Expense,
            "Home",
            dec!(42.50),
        );
        let b = Transaction::new(
            date(2024, 3, 15),
            TransactionType::Income,
            "Other",
            dec!(42.50),
        )
        .with_notes("different movement, same id");
        assert_eq!(a.transaction_id(), b.transaction_id());
    }

    #[test]
    fn test_amount_is_never_negative() {
        let t = Transaction::new(
            date(2024, 1, 1),
            TransactionType::Expense,
            "Home",
            dec!(-12.30),
        );
        assert_eq!(t.amount(), dec!(12.30));
    }

    #[test]
    fn test_to_row_column_order() {
        let t = Transaction::new(
            date(2024, 3, 15),
            TransactionType::Expense,
            "Shopping",
            dec!(42.50),
        )
        .with_notes("groceries")
        .with_details("weekly run")
        .with_source_account("Checking")
        .with_group("Necessities");
        let row = t.to_row();
        assert_eq!(row.len(), TRANSACTION_HEADERS.len());
        assert_eq!(row[0], json!("2024-03-15"));
        assert_eq!(row[1], json!("expense"));
        assert_eq!(row[2], json!("Checking"));
        assert_eq!(row[3], json!(""));
        assert_eq!(row[4], json!("Necessities"));
        assert_eq!(row[5], json!("Shopping"));
        assert_eq!(row[6], json!("groceries"));
        assert_eq!(row[7], json!("weekly run"));
        assert_eq!(row[8], json!("EUR"));
        assert_eq!(row[9], json!(42.5));
        assert_eq!(row[10], json!("00B134-00109A-0000"));
    }

    #[test]
    fn test_from_row_accepts_well_formed_row() {
        let row = vec![
            json!("2024-03-15"),
            json!("expense"),
            json!("Checking"),
            json!(""),
            json!("Necessities"),
            json!("Shopping"),
            json!("groceries"),
            json!(""),
            json!("EUR"),
            json!(42.5),
            json!("00B134-00109A-0000"),
        ];
        let t = Transaction::from_row(&row).unwrap();
        assert_eq!(t.date(), date(2024, 3, 15));
        assert_eq!(t.kind(), TransactionType::Expense);
        assert_eq!(t.source_account(), Some("Checking"));
        assert_eq!(t.dest_account(), None);
        assert_eq!(t.group(), Some("Necessities"));
        assert_eq!(t.category(), "Shopping");
        assert_eq!(t.amount(), dec!(42.5));
    }

    #[test]
    fn test_from_row_drops_short_row() {
        let row = vec![json!("2024-03-15"), json!("expense"), json!("a"), json!("b"), json!("c")];
        assert!(Transaction::from_row(&row).is_none());
    }

    #[test]
    fn test_from_row_drops_header_row() {
        let row: Vec<Value> = TRANSACTION_HEADERS.iter().map(|h| json!(h)).collect();
        assert!(Transaction::from_row(&row).is_none());
    }

    #[test]
    fn test_from_row_drops_unknown_type() {
        let mut row: Vec<Value> = vec![json!("2024-03-15"), json!("refund")];
        row.extend((0..7).map(|_| json!("")));
        row.push(json!(1.0));
        assert!(Transaction::from_row(&row).is_none());
    }

    #[test]
    fn test_from_row_reads_serial_date() {
        let mut row: Vec<Value> = vec![json!(45365), json!("income")];
        row.extend((0..7).map(|_| json!("")));
        row.push(json!(10.0));
        let t = Transaction::from_row(&row).unwrap();
        assert_eq!(t.date(), date(2024, 3, 15));
        assert_eq!(t.kind(), TransactionType::Income);
    }

    #[test]
    fn test_from_row_normalizes_negative_amount() {
        let mut row: Vec<Value> = vec![json!("2024-03-15"), json!("expense")];
        row.extend((0..7).map(|_| json!("")));
        row.push(json!(-5.5));
        let t = Transaction::from_row(&row).unwrap();
        assert_eq!(t.amount(), dec!(5.5));
    }

    #[test]
    fn test_transaction_type_strings() {
        assert_eq!(TransactionType::Expense.to_string(), "expense");
        assert_eq!(
            "transfer".parse::<TransactionType>().unwrap(),
            TransactionType::Transfer
        );
        assert!("refund".parse::<TransactionType>().is_err());
    }
}
