//! Types that represent the core data model, such as `Transaction` and the
//! calendar helpers the monthly sheets are built around.
mod date;
mod transaction;

pub use date::MONTH_NAMES;
pub(crate) use date::month_from_sheet_title;
pub use transaction::{Transaction, TransactionType, TRANSACTION_HEADERS};
