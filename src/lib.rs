//! Maps a personal-finance ledger onto a cloud drive: a tagged root folder,
//! a JSON configuration file, and one spreadsheet per calendar year with a
//! sheet per month. Start with a [`BootstrapResolver`] to find or create the
//! remote layout, then use the [`LedgerStore`] it produces for every read
//! and write.

pub mod api;
mod config;
mod error;
pub mod import;
pub mod model;
mod storage;

pub use config::{
    default_app_configuration, AppConfig, CategoryKind, ImportConfig, RewritePatch, RewriteQuery,
    TransactionCategory, TransactionRewrite,
};
pub use error::{Error, ErrorContext, RemoteApiError, Result};
pub use storage::{
    BootstrapResolver, LedgerStore, MonthData, MonthRef, RemoteStorage, StorageState,
};
