//! athena-frame - Run SQL on Amazon Athena and load the result as a table.
//!
//! A [`Connector`] submits a query, waits for it to finish, then reads the
//! CSV result Athena wrote to S3 into a [`ResultTable`].

pub mod config;
pub mod connector;
pub mod error;
pub mod location;
pub mod output;
pub mod services;
pub mod table;

pub use config::{Config, ConnectorConfig};
pub use connector::{Connector, PollOptions};
pub use error::{AthenaError, Result};
pub use location::OutputLocation;
pub use table::{ColumnInfo, ResultTable, Row, Value};
