use std::collections::HashMap;
use std::fmt::{self, Display};
use std::ops::Index;

use crate::chip::{Chip, ChipId, ChipKind, Scalar, Slot};
use crate::error::CircuitError;

const UNWIRED: &str = "None";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    DivisionByZero { chip: String },
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DivisionByZero { chip } => {
                write!(f, "Error: Division by zero in chip {chip}")
            }
        }
    }
}

/// Owns every chip of a circuit, in creation order.
#[derive(Clone, Debug)]
pub struct Circuit<T = f64> {
    chips: Vec<Chip<T>>,
    by_id: HashMap<String, ChipId>,
    diagnostics: Vec<Diagnostic>,
}

impl<T> Default for Circuit<T> {
    fn default() -> Self {
        Circuit {
            chips: Vec::new(),
            by_id: HashMap::new(),
            diagnostics: Vec::new(),
        }
    }
}

impl<T> Index<ChipId> for Circuit<T> {
    type Output = Chip<T>;

    fn index(&self, index: ChipId) -> &Self::Output {
        &self.chips[index.index()]
    }
}

impl<T: Scalar> Circuit<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.chips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }

    /// Declares a chip whose kind is taken from the first character of `id`.
    pub fn create_chip(&mut self, id: &str) -> Result<ChipId, CircuitError> {
        let kind = ChipKind::from_id(id)?;
        if self.by_id.contains_key(id) {
            return Err(CircuitError::DuplicateId(id.to_string()));
        }
        Ok(self.push_chip(kind, id.to_string()))
    }

    pub(crate) fn push_chip(&mut self, kind: ChipKind, id: String) -> ChipId {
        let chip_id = ChipId(self.chips.len() as u32);
        self.by_id.insert(id.clone(), chip_id);
        self.chips.push(Chip::new(kind, id));
        chip_id
    }

    pub fn lookup(&self, id: &str) -> Result<ChipId, CircuitError> {
        self.by_id
            .get(id)
            .copied()
            .ok_or_else(|| CircuitError::UnknownId(id.to_string()))
    }

    pub fn chip(&self, id: &str) -> Result<&Chip<T>, CircuitError> {
        Ok(&self[self.lookup(id)?])
    }

    /// Chips with their handles, in creation order.
    pub fn chips(&self) -> impl Iterator<Item = (ChipId, &Chip<T>)> {
        self.chips
            .iter()
            .enumerate()
            .map(|(index, chip)| (ChipId(index as u32), chip))
    }

    /// Binds `source` into `slot` of `target` and makes `target` the output
    /// of `source`. Whatever was in the slot is replaced.
    pub fn set_input(&mut self, target: ChipId, slot: Slot, source: ChipId) {
        *self.chips[target.index()].slot_mut(slot) = Some(source);
        self.chips[source.index()].output = Some(target);
    }

    pub fn set_input1(&mut self, target: ChipId, source: ChipId) {
        self.set_input(target, Slot::Input1, source)
    }

    pub fn set_input2(&mut self, target: ChipId, source: ChipId) {
        self.set_input(target, Slot::Input2, source)
    }

    /// Wires the chip named `input` into the chip named `output`.
    ///
    /// Single-input chips always take the connection in their first slot.
    /// Two-input chips fill their first slot, then their second.
    pub fn connect(&mut self, input: &str, output: &str) -> Result<Slot, CircuitError> {
        let source = self.lookup(input)?;
        let target = self.lookup(output)?;
        let target_chip = &self[target];
        let slot = match target_chip.kind {
            ChipKind::Negate | ChipKind::Output => Slot::Input1,
            kind if kind.is_binary() => match target_chip.input1 {
                None => Slot::Input1,
                Some(_) => Slot::Input2,
            },
            _ => {
                return Err(CircuitError::InvalidTarget {
                    source_chip: input.to_string(),
                    target: output.to_string(),
                })
            }
        };
        self.set_input(target, slot, source);
        tracing::debug!(input, output, %slot, "connected chips");
        Ok(slot)
    }

    pub fn set_input_value(&mut self, id: &str, value: T) -> Result<(), CircuitError> {
        let chip_id = self.lookup(id)?;
        self.set_value(chip_id, value);
        Ok(())
    }

    pub fn set_value(&mut self, id: ChipId, value: T) {
        let chip = &mut self.chips[id.index()];
        if chip.kind != ChipKind::Input {
            tracing::debug!(chip = %chip.id, kind = ?chip.kind, "setting value on a non-input chip");
        }
        chip.input_value = value;
    }

    /// Recomputes `id` and everything upstream of it.
    ///
    /// Nothing is cached between calls: the whole subtree is walked again,
    /// so changed input values are always picked up.
    pub fn compute(&mut self, id: ChipId) -> Result<(), CircuitError> {
        let chip = &self.chips[id.index()];
        if chip.kind == ChipKind::Input {
            let value = chip.input_value;
            self.chips[id.index()].result = value;
            return Ok(());
        }

        let (kind, input1, input2) = (chip.kind, chip.input1, chip.input2);
        if let Some(input1) = input1 {
            self.compute(input1)?;
        }
        if let Some(input2) = input2 {
            self.compute(input2)?;
        }

        let a = match input1 {
            Some(input1) => self[input1].result,
            None if kind == ChipKind::Output => T::zero(),
            None => return Err(self.unwired(id, Slot::Input1)),
        };
        let b = match input2 {
            Some(input2) => self[input2].result,
            None if kind.is_binary() => return Err(self.unwired(id, Slot::Input2)),
            None => T::zero(),
        };

        let chip = &mut self.chips[id.index()];
        if !chip.apply(a, b) {
            tracing::warn!(chip = %chip.id, "division by zero");
            self.diagnostics.push(Diagnostic::DivisionByZero {
                chip: chip.id.clone(),
            });
        }
        tracing::trace!(chip = %self[id].id, result = %self[id].result, "computed");
        Ok(())
    }

    /// Computes the chip named `id` and returns its value. An output chip
    /// reports the result of the chip wired into it.
    pub fn query_output(&mut self, id: &str) -> Result<T, CircuitError> {
        let chip_id = self.lookup(id)?;
        self.value(chip_id)
    }

    pub fn value(&mut self, chip_id: ChipId) -> Result<T, CircuitError> {
        self.compute(chip_id)?;
        let chip = &self[chip_id];
        match chip.kind {
            ChipKind::Output => match chip.input1 {
                Some(input1) => Ok(self[input1].result),
                None => Err(self.unwired(chip_id, Slot::Input1)),
            },
            _ => Ok(chip.result),
        }
    }

    /// Diagnostics raised since the last call, oldest first.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Wiring lines for every chip: all non-output chips, then the output
    /// chips, each group in creation order.
    pub fn connections(&self) -> impl Iterator<Item = Connection<'_, T>> {
        let inner = self
            .chips()
            .filter(|(_, chip)| chip.kind != ChipKind::Output);
        let outputs = self
            .chips()
            .filter(|(_, chip)| chip.kind == ChipKind::Output);
        inner.chain(outputs).map(move |(id, _)| Connection {
            circuit: self,
            id,
        })
    }

    fn unwired(&self, id: ChipId, slot: Slot) -> CircuitError {
        CircuitError::Unwired {
            chip: self[id].id.clone(),
            slot,
        }
    }

    fn name_of(&self, id: Option<ChipId>) -> &str {
        match id {
            Some(id) => &self[id].id,
            None => UNWIRED,
        }
    }
}

/// Display adapter describing how one chip is wired.
pub struct Connection<'a, T> {
    circuit: &'a Circuit<T>,
    id: ChipId,
}

impl<'a, T: Scalar> Connection<'a, T> {
    pub fn chip(&self) -> &'a Chip<T> {
        let circuit: &'a Circuit<T> = self.circuit;
        &circuit[self.id]
    }
}

impl<T: Scalar> Display for Connection<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let circuit = self.circuit;
        let chip = &circuit[self.id];
        match chip.kind {
            ChipKind::Input => {
                write!(f, "{}, Output = {}", chip.id, circuit.name_of(chip.output))
            }
            ChipKind::Output => {
                write!(f, "{}, Input 1 = {}", chip.id, circuit.name_of(chip.input1))
            }
            _ => write!(
                f,
                "{}, Input 1 = {}, Input 2 = {}, Output = {}",
                chip.id,
                circuit.name_of(chip.input1),
                circuit.name_of(chip.input2),
                circuit.name_of(chip.output)
            ),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::chip::{ChipKind, Slot};
    use crate::error::CircuitError;

    use super::{Circuit, Diagnostic};

    fn circuit(ids: &[&str]) -> Circuit {
        let mut circuit = Circuit::new();
        for id in ids {
            circuit.create_chip(id).unwrap();
        }
        circuit
    }

    #[test]
    fn create_rejects_bad_ids() {
        let mut circuit = circuit(&["I1"]);
        assert_eq!(
            circuit.create_chip("I1"),
            Err(CircuitError::DuplicateId("I1".to_string()))
        );
        assert_eq!(
            circuit.create_chip("Q1"),
            Err(CircuitError::UnknownKind("Q1".to_string()))
        );
        assert_eq!(circuit.len(), 1);
    }

    #[test]
    fn binary_chips_fill_slots_in_order() {
        let mut circuit = circuit(&["I1", "I2", "S1"]);
        assert_eq!(circuit.connect("I1", "S1"), Ok(Slot::Input1));
        assert_eq!(circuit.connect("I2", "S1"), Ok(Slot::Input2));
        let s1 = circuit.chip("S1").unwrap();
        let i1 = circuit.lookup("I1").unwrap();
        let i2 = circuit.lookup("I2").unwrap();
        assert_eq!(s1.input(Slot::Input1), Some(i1));
        assert_eq!(s1.input(Slot::Input2), Some(i2));
        let s1 = circuit.lookup("S1").unwrap();
        assert_eq!(circuit[i1].output(), Some(s1));
        assert_eq!(circuit[i2].output(), Some(s1));
    }

    #[test]
    fn third_connection_overwrites_second_slot() {
        let mut circuit = circuit(&["I1", "I2", "I3", "M1"]);
        circuit.connect("I1", "M1").unwrap();
        circuit.connect("I2", "M1").unwrap();
        assert_eq!(circuit.connect("I3", "M1"), Ok(Slot::Input2));
        let i3 = circuit.lookup("I3").unwrap();
        assert_eq!(circuit.chip("M1").unwrap().input(Slot::Input2), Some(i3));
    }

    #[test]
    fn single_input_chips_use_first_slot() {
        let mut circuit = circuit(&["I1", "I2", "N1", "O1"]);
        assert_eq!(circuit.connect("I1", "N1"), Ok(Slot::Input1));
        assert_eq!(circuit.connect("I2", "N1"), Ok(Slot::Input1));
        assert_eq!(circuit.connect("N1", "O1"), Ok(Slot::Input1));
        let i2 = circuit.lookup("I2").unwrap();
        let n1 = circuit.chip("N1").unwrap();
        assert_eq!(n1.input(Slot::Input1), Some(i2));
        assert_eq!(n1.input(Slot::Input2), None);
    }

    #[test]
    fn connect_errors() {
        let mut circuit = circuit(&["I1", "I2", "A1"]);
        assert_eq!(
            circuit.connect("I1", "A9"),
            Err(CircuitError::UnknownId("A9".to_string()))
        );
        assert_eq!(
            circuit.connect("I1", "I2"),
            Err(CircuitError::InvalidTarget {
                source_chip: "I1".to_string(),
                target: "I2".to_string()
            })
        );
    }

    #[test]
    fn arithmetic_follows_inputs() {
        for (op, expected) in [("A1", 10.0), ("S1", 4.0), ("M1", 21.0), ("D1", 7.0 / 3.0)] {
            let mut circuit = circuit(&["I1", "I2", op, "O1"]);
            circuit.connect("I1", op).unwrap();
            circuit.connect("I2", op).unwrap();
            circuit.connect(op, "O1").unwrap();
            circuit.set_input_value("I1", 7.0).unwrap();
            circuit.set_input_value("I2", 3.0).unwrap();
            assert_eq!(circuit.query_output("O1"), Ok(expected), "{op}");
            assert_eq!(circuit.query_output(op), Ok(expected), "{op}");
        }
    }

    #[test]
    fn division_by_zero_is_recovered() {
        let mut circuit = circuit(&["I1", "I2", "D1", "O1"]);
        circuit.connect("I1", "D1").unwrap();
        circuit.connect("I2", "D1").unwrap();
        circuit.connect("D1", "O1").unwrap();
        circuit.set_input_value("I1", 5.0).unwrap();
        assert_eq!(circuit.query_output("O1"), Ok(0.0));
        assert_eq!(
            circuit.take_diagnostics(),
            [Diagnostic::DivisionByZero {
                chip: "D1".to_string()
            }]
        );
        assert!(circuit.take_diagnostics().is_empty());
    }

    #[test]
    fn negate_keeps_stale_value_on_zero() {
        let mut circuit = circuit(&["I1", "N1", "O1"]);
        circuit.connect("I1", "N1").unwrap();
        circuit.connect("N1", "O1").unwrap();
        circuit.set_input_value("I1", 2.5).unwrap();
        assert_eq!(circuit.query_output("O1"), Ok(-2.5));
        circuit.set_input_value("I1", 0.0).unwrap();
        assert_eq!(circuit.query_output("O1"), Ok(-2.5));
    }

    #[test]
    fn unwired_operands_are_reported() {
        let mut circuit = circuit(&["I1", "A1", "O1"]);
        circuit.connect("I1", "A1").unwrap();
        assert_eq!(
            circuit.query_output("A1"),
            Err(CircuitError::Unwired {
                chip: "A1".to_string(),
                slot: Slot::Input2
            })
        );
        assert_eq!(
            circuit.query_output("O1"),
            Err(CircuitError::Unwired {
                chip: "O1".to_string(),
                slot: Slot::Input1
            })
        );
    }

    #[test]
    fn input_chip_reports_its_value() {
        let mut circuit = circuit(&["I1"]);
        circuit.set_input_value("I1", -1.5).unwrap();
        assert_eq!(circuit.query_output("I1"), Ok(-1.5));
        assert_eq!(circuit.chip("I1").unwrap().kind(), ChipKind::Input);
    }

    #[test]
    fn connections_list_outputs_last() {
        let mut circuit = circuit(&["O1", "I1", "I2", "A1", "O2", "N1"]);
        circuit.connect("I1", "A1").unwrap();
        circuit.connect("I2", "A1").unwrap();
        circuit.connect("A1", "O1").unwrap();
        circuit.connect("I1", "N1").unwrap();
        circuit.connect("N1", "O2").unwrap();
        let lines: Vec<String> = circuit.connections().map(|c| c.to_string()).collect();
        assert_eq!(
            lines,
            [
                "I1, Output = N1",
                "I2, Output = A1",
                "A1, Input 1 = I1, Input 2 = I2, Output = O1",
                "N1, Input 1 = I1, Input 2 = None, Output = O2",
                "O1, Input 1 = A1",
                "O2, Input 1 = N1",
            ]
        );
    }
}
