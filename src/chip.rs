use std::fmt::{self, Debug, Display};
use std::str::FromStr;

use num_traits::Float;

use crate::error::CircuitError;

/// Numeric type a circuit computes with.
pub trait Scalar: Float + Debug + Display + FromStr {}

impl<T: Float + Debug + Display + FromStr> Scalar for T {}

/// Handle into the chip arena of a [`Circuit`](crate::Circuit).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChipId(pub(crate) u32);

impl ChipId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChipKind {
    Input,
    Output,
    Add,
    Subtract,
    Multiply,
    Divide,
    Negate,
}

impl ChipKind {
    pub const ALL: [ChipKind; 7] = [
        ChipKind::Input,
        ChipKind::Output,
        ChipKind::Add,
        ChipKind::Subtract,
        ChipKind::Multiply,
        ChipKind::Divide,
        ChipKind::Negate,
    ];

    pub fn from_prefix(prefix: char) -> Option<Self> {
        match prefix {
            'I' => Some(ChipKind::Input),
            'O' => Some(ChipKind::Output),
            'A' => Some(ChipKind::Add),
            'S' => Some(ChipKind::Subtract),
            'M' => Some(ChipKind::Multiply),
            'D' => Some(ChipKind::Divide),
            'N' => Some(ChipKind::Negate),
            _ => None,
        }
    }

    /// The kind named by the first character of a chip identifier.
    pub fn from_id(id: &str) -> Result<Self, CircuitError> {
        id.chars()
            .next()
            .and_then(Self::from_prefix)
            .ok_or_else(|| CircuitError::UnknownKind(id.to_string()))
    }

    pub fn prefix(self) -> char {
        match self {
            ChipKind::Input => 'I',
            ChipKind::Output => 'O',
            ChipKind::Add => 'A',
            ChipKind::Subtract => 'S',
            ChipKind::Multiply => 'M',
            ChipKind::Divide => 'D',
            ChipKind::Negate => 'N',
        }
    }

    /// Add, subtract, multiply and divide read both input slots.
    pub fn is_binary(self) -> bool {
        matches!(
            self,
            ChipKind::Add | ChipKind::Subtract | ChipKind::Multiply | ChipKind::Divide
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    Input1,
    Input2,
}

impl Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Input1 => write!(f, "input 1"),
            Slot::Input2 => write!(f, "input 2"),
        }
    }
}

/// A single circuit element. Relations are handles into the owning circuit.
#[derive(Clone, Debug)]
pub struct Chip<T> {
    pub(crate) kind: ChipKind,
    pub(crate) id: String,
    pub(crate) input1: Option<ChipId>,
    pub(crate) input2: Option<ChipId>,
    pub(crate) output: Option<ChipId>,
    pub(crate) input_value: T,
    pub(crate) result: T,
}

impl<T: Scalar> Chip<T> {
    pub fn new(kind: ChipKind, id: impl Into<String>) -> Self {
        Chip {
            kind,
            id: id.into(),
            input1: None,
            input2: None,
            output: None,
            input_value: T::zero(),
            result: T::zero(),
        }
    }

    pub fn kind(&self) -> ChipKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn input(&self, slot: Slot) -> Option<ChipId> {
        match slot {
            Slot::Input1 => self.input1,
            Slot::Input2 => self.input2,
        }
    }

    pub fn output(&self) -> Option<ChipId> {
        self.output
    }

    pub fn input_value(&self) -> T {
        self.input_value
    }

    /// Last computed value. Stale until the chip is computed again.
    pub fn result(&self) -> T {
        self.result
    }

    pub(crate) fn slot_mut(&mut self, slot: Slot) -> &mut Option<ChipId> {
        match slot {
            Slot::Input1 => &mut self.input1,
            Slot::Input2 => &mut self.input2,
        }
    }

    /// Applies this chip's operation to already computed operands.
    ///
    /// Returns `false` when a divide chip saw a zero divisor; the result is
    /// forced to zero in that case. A negate chip fed zero keeps whatever
    /// result it held before.
    pub(crate) fn apply(&mut self, a: T, b: T) -> bool {
        match self.kind {
            ChipKind::Input => self.result = self.input_value,
            ChipKind::Output => (),
            ChipKind::Add => self.result = a + b,
            ChipKind::Subtract => self.result = a - b,
            ChipKind::Multiply => self.result = a * b,
            ChipKind::Divide => {
                if b.is_zero() {
                    self.result = T::zero();
                    return false;
                }
                self.result = a / b;
            }
            ChipKind::Negate => {
                if !a.is_zero() {
                    self.result = -a;
                }
            }
        }
        true
    }
}
