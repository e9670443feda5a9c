//! filefold - AI-assisted directory organization with undo
//!
//! This library asks a text-generation model to assign a category label to
//! every file in a target directory, moves each file into a folder named
//! after its category, and records each successful move in a per-run undo
//! ledger so the whole run can be reverted later.

pub mod classify;
pub mod cli;
pub mod config;
pub mod ledger;
pub mod organizer;
pub mod output;
pub mod planner;
pub mod session;
pub mod undo;

pub use classify::{CategoryMapping, ClassificationSupplier, SupplierError, supplier_for};
pub use config::{ApiConfig, ConfigError, ModelKind};
pub use ledger::{LedgerError, MoveRecord, UndoLedger};
pub use organizer::{MoveExecutor, OrganizeError, RunReport};
pub use planner::{MoveIntent, plan_moves};
pub use session::SessionLog;
pub use undo::{UndoExecutor, UndoReport};

pub use cli::{Cli, Command, run_cli};
