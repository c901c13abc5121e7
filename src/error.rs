use thiserror::Error;

use crate::chip::Slot;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CircuitError {
    #[error("cannot derive a chip kind from identifier `{0}`")]
    UnknownKind(String),
    #[error("chip `{0}` is already declared")]
    DuplicateId(String),
    #[error("unknown chip identifier `{0}`")]
    UnknownId(String),
    #[error("input chip `{target}` cannot be the target of a connection from `{source_chip}`")]
    InvalidTarget { source_chip: String, target: String },
    #[error("chip `{chip}` has nothing wired to {slot}")]
    Unwired { chip: String, slot: Slot },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected end of input while reading {expected}")]
    UnexpectedEnd { expected: &'static str },
    #[error("invalid {what} count `{token}`")]
    InvalidCount { what: &'static str, token: String },
    #[error("invalid value `{token}` for chip `{chip}`")]
    InvalidValue { chip: String, token: String },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Circuit(#[from] CircuitError),
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}
