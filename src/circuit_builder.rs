use std::collections::HashMap;

use crate::chip::{ChipId, ChipKind, Scalar};
use crate::Circuit;

/// Assembles a circuit from handles, naming chips `<kind prefix><n>` in
/// creation order (`I0`, `I1`, `A0`, ...).
#[derive(Debug)]
pub struct CircuitBuilder<T = f64> {
    circuit: Circuit<T>,
    counters: HashMap<ChipKind, usize>,
}

impl<T: Scalar> Default for CircuitBuilder<T> {
    fn default() -> Self {
        CircuitBuilder {
            circuit: Circuit::new(),
            counters: HashMap::new(),
        }
    }
}

impl<T: Scalar> CircuitBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn create_chip(&mut self, kind: ChipKind) -> ChipId {
        let counter = self.counters.entry(kind).or_default();
        let id = format!("{}{}", kind.prefix(), counter);
        *counter += 1;
        self.circuit.push_chip(kind, id)
    }

    pub fn input(&mut self, value: T) -> ChipId {
        let input = self.create_chip(ChipKind::Input);
        self.circuit.set_value(input, value);
        input
    }

    /// Creates a two-input chip fed by `a` and `b`.
    pub fn binary(&mut self, kind: ChipKind, a: ChipId, b: ChipId) -> ChipId {
        assert!(kind.is_binary(), "{kind:?} does not take two inputs");
        let chip = self.create_chip(kind);
        self.circuit.set_input1(chip, a);
        self.circuit.set_input2(chip, b);
        chip
    }

    pub fn negate(&mut self, a: ChipId) -> ChipId {
        let chip = self.create_chip(ChipKind::Negate);
        self.circuit.set_input1(chip, a);
        chip
    }

    pub fn output(&mut self, a: ChipId) -> ChipId {
        let chip = self.create_chip(ChipKind::Output);
        self.circuit.set_input1(chip, a);
        chip
    }

    pub fn id(&self, chip: ChipId) -> &str {
        self.circuit[chip].id()
    }

    pub fn circuit(&mut self) -> &mut Circuit<T> {
        &mut self.circuit
    }

    pub fn build(self) -> Circuit<T> {
        self.circuit
    }
}

pub mod ops {
    use crate::chip::{ChipId, ChipKind, Scalar};

    use super::CircuitBuilder;

    macro_rules! binary_fn_gen {
        ( $op_lowercase:ident, $op_uppercase:ident ) => {
            pub fn $op_lowercase<T: Scalar>(
                builder: &mut CircuitBuilder<T>,
                a: ChipId,
                b: ChipId,
            ) -> ChipId {
                builder.binary(ChipKind::$op_uppercase, a, b)
            }
        };
    }

    binary_fn_gen!(add, Add);
    binary_fn_gen!(subtract, Subtract);
    binary_fn_gen!(multiply, Multiply);
    binary_fn_gen!(divide, Divide);
}

#[cfg(test)]
mod test {
    use rand::Rng;

    use super::{ops::*, CircuitBuilder};

    #[test]
    fn names_by_kind() {
        let mut builder = CircuitBuilder::<f64>::new();
        let a = builder.input(1.0);
        let b = builder.input(2.0);
        let sum = add(&mut builder, a, b);
        let neg = builder.negate(sum);
        let out = builder.output(neg);
        let names: Vec<_> = [a, b, sum, neg, out]
            .into_iter()
            .map(|chip| builder.id(chip).to_string())
            .collect();
        assert_eq!(names, ["I0", "I1", "A0", "N0", "O0"]);
        assert_eq!(builder.circuit().value(out), Ok(-3.0));
    }

    #[test]
    fn nested_expression() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let (x, y, z): (f64, f64, f64) = (rng.gen_range(-100.0..100.0), rng.gen(), rng.gen());
            let mut builder = CircuitBuilder::new();
            let (ix, iy, iz) = (builder.input(x), builder.input(y), builder.input(z));
            let product = multiply(&mut builder, ix, iy);
            let difference = subtract(&mut builder, product, iz);
            let quotient = divide(&mut builder, difference, iz);
            let out = builder.output(quotient);
            let mut circuit = builder.build();
            if z == 0.0 {
                continue;
            }
            assert_eq!(circuit.value(out), Ok((x * y - z) / z));
            assert!(circuit.take_diagnostics().is_empty());
        }
    }
}
