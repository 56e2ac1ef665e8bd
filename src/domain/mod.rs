//! Domain layer for feedrelic.
//!
//! Contains the types shared across all modules:
//! - `Region` and the endpoint derivation rule
//! - `DestinationForm` / `Destination`: captured and confirmed settings
//! - `Row`, `RowSet`, `CellValue`: parsed tabular content
//! - `Event`: a row tagged with its event type, as sent on the wire

pub mod destination;
pub mod error;
pub mod event;
pub mod region;
pub mod row;

pub use destination::{Destination, DestinationForm};
pub use error::DestinationError;
pub use event::{EVENT_TYPE_KEY, Event};
pub use region::{Region, endpoint_url};
pub use row::{CellValue, Row, RowSet};
