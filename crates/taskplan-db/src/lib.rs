//! SQLite storage layer for taskplan: connection pool, migrations, row
//! models, and query functions for the `plans` and `tasks` tables.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
