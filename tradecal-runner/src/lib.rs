//! TradeCal Runner: loading, configuration, journal storage and export.
//!
//! This crate builds on `tradecal-core` to provide:
//! - TOML application config
//! - Loading broker export files into one batch
//! - Report orchestration and note saving
//! - File-backed trade journal
//! - JSON/CSV artifact export

pub mod config;
pub mod export;
pub mod journal_store;
pub mod loader;
pub mod runner;

pub use config::{AppConfig, ConfigError, ImportConfig, JournalConfig};
pub use export::{
    export_daily_csv, export_report_json, export_trades_csv, import_report_json, load_artifacts,
    save_artifacts,
};
pub use journal_store::JournalFile;
pub use loader::{load_batch, LoadError, LoadedBatch};
pub use runner::{find_trade, run_report, save_note, RunError};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<AppConfig>();
        assert_sync::<AppConfig>();
    }

    #[test]
    fn loaded_batch_is_send_sync() {
        assert_send::<LoadedBatch>();
        assert_sync::<LoadedBatch>();
    }

    #[test]
    fn journal_file_is_send_sync() {
        assert_send::<JournalFile>();
        assert_sync::<JournalFile>();
    }

    #[test]
    fn error_types_are_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
        assert_send::<ConfigError>();
        assert_sync::<ConfigError>();
    }
}
