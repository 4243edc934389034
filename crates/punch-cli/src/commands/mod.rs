//! CLI subcommand implementations.

pub mod export;
pub mod init;
pub mod me;
pub mod recent;
pub mod record;
pub mod status;
pub mod today;
pub mod util;
