pub use tasktab_cli::cli;
pub use tasktab_cli::commands;
pub use tasktab_cli::config;
pub use tasktab_cli::console;
pub use tasktab_cli::{init_tracing, run_blocking};

pub use tasktab_core as core;
pub use tasktab_core::model;
pub use tasktab_core::{AppConfig, TaskRepository};

pub use tasktab_panes as panes;
pub use tasktab_panes::TabletCoordinator;
