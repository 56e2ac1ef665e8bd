// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::cast_possible_truncation, // Percentages and millisecond counts stay in range
    clippy::missing_errors_doc,       // Internal API
    clippy::module_name_repetitions,  // e.g. ParseError in parser module
    clippy::must_use_candidate,       // Annotated selectively on critical APIs
    clippy::doc_markdown              // Internal API
)]

pub mod app;
pub mod buffer;
pub mod domain;
pub mod parser;
pub mod sender;

// Re-export main types for easy access
pub use app::{App, Config, Session};
pub use domain::{Destination, DestinationForm, Region, Row, RowSet};
pub use sender::{EventSender, SendOutcome};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
