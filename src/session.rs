use std::io::Write;

use num_traits::ToPrimitive;

use crate::chip::Scalar;
use crate::circuit::Circuit;
use crate::command::{Command, Script};
use crate::error::SessionError;

pub const COMPUTATION_MARKER: &str = "Computation Starts ";
pub const CONNECTIONS_HEADER: &str = "***** Showing the connections that were established";

#[derive(Clone, Copy, Debug, Default)]
pub struct SessionOptions {
    /// Stop at the first declaration or command that fails instead of
    /// skipping it.
    pub strict: bool,
}

/// Runs a script against a fresh circuit, writing the report to `out`.
pub fn run<T: Scalar, W: Write>(
    script: &Script<T>,
    options: SessionOptions,
    out: &mut W,
) -> Result<Circuit<T>, SessionError> {
    let mut circuit = Circuit::new();
    for id in &script.chips {
        match circuit.create_chip(id) {
            Ok(_) => (),
            Err(error) if !options.strict => {
                tracing::error!(%error, chip = %id, "skipping declaration");
            }
            Err(error) => return Err(error.into()),
        }
    }
    tracing::info!(chips = circuit.len(), commands = script.commands.len(), "circuit declared");

    for command in &script.commands {
        match execute(&mut circuit, command, out) {
            Ok(()) => (),
            Err(SessionError::Circuit(error)) if !options.strict => {
                tracing::error!(%error, ?command, "skipping command");
            }
            Err(error) => return Err(error),
        }
    }

    writeln!(out, "{CONNECTIONS_HEADER}")?;
    for connection in circuit.connections() {
        writeln!(out, "{connection}")?;
    }
    Ok(circuit)
}

fn execute<T: Scalar, W: Write>(
    circuit: &mut Circuit<T>,
    command: &Command<T>,
    out: &mut W,
) -> Result<(), SessionError> {
    match command {
        Command::Connect { input, output } => {
            circuit.connect(input, output)?;
        }
        Command::SetInput { chip, value } => circuit.set_input_value(chip, *value)?,
        Command::QueryOutput { chip } => {
            writeln!(out, "{COMPUTATION_MARKER}")?;
            let value = circuit.query_output(chip);
            for diagnostic in circuit.take_diagnostics() {
                writeln!(out, "{diagnostic}")?;
            }
            writeln!(
                out,
                "The output value from this circuit is {}",
                format_general(value?)
            )?;
        }
        Command::Ignored { verb } => tracing::debug!(%verb, "ignoring unknown command"),
    }
    Ok(())
}

/// Formats like a C++ stream with default flags: six significant digits,
/// trailing zeros dropped, scientific notation outside `1e-4..1e6`.
pub fn format_general<T: Scalar>(value: T) -> String {
    const PRECISION: i32 = 6;
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value.is_sign_negative() { "-inf" } else { "inf" }.to_string();
    }
    let value = value.to_f64().unwrap_or_default();
    let scientific = format!("{:.*e}", (PRECISION - 1) as usize, value);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or_default();
    if exponent < -4 || exponent >= PRECISION {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            trim_fraction(mantissa),
            exponent.unsigned_abs()
        )
    } else {
        let fixed = format!("{:.*}", (PRECISION - 1 - exponent) as usize, value);
        trim_fraction(&fixed).to_string()
    }
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}
