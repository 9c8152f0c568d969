//! Database initialization, schema sync and settings

pub mod init;
pub mod schema_sync;
pub mod settings;
pub mod table_schemas;

pub use init::*;
pub use settings::{get_setting, set_setting};
