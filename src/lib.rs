pub mod chip;
pub mod circuit_builder;
pub mod command;
pub mod error;
pub mod session;

mod circuit;
pub use chip::{Chip, ChipId, ChipKind, Scalar, Slot};
pub use circuit::{Circuit, Connection, Diagnostic};
pub use command::{Command, Script};
pub use error::{CircuitError, ParseError, SessionError};
pub use session::SessionOptions;
