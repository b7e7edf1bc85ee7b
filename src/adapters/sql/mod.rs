//! SQL engine test doubles.

mod mock_sql_engine;

pub use mock_sql_engine::MockSqlEngine;
