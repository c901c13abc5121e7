//! Textual circuit descriptions.
//!
//! A script is a whitespace separated token stream: a chip count followed by
//! that many chip identifiers, then a command count followed by the commands.
//!
//! ```text
//! 4 I1 I2 A1 O1
//! 6
//! A I1 A1
//! A I2 A1
//! A A1 O1
//! I I1 3
//! I I2 4
//! O O1
//! ```

use std::str::SplitWhitespace;

use crate::chip::Scalar;
use crate::error::ParseError;

#[derive(Clone, Debug, PartialEq)]
pub enum Command<T> {
    /// `A <input> <output>`
    Connect { input: String, output: String },
    /// `I <chip> <value>`
    SetInput { chip: String, value: T },
    /// `O <chip>`
    QueryOutput { chip: String },
    /// Any other verb. Consumes only itself.
    Ignored { verb: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Script<T = f64> {
    pub chips: Vec<String>,
    pub commands: Vec<Command<T>>,
}

struct Tokens<'a>(SplitWhitespace<'a>);

impl<'a> Tokens<'a> {
    fn next(&mut self, expected: &'static str) -> Result<&'a str, ParseError> {
        self.0.next().ok_or(ParseError::UnexpectedEnd { expected })
    }

    fn count(&mut self, what: &'static str) -> Result<usize, ParseError> {
        let token = self.next(what)?;
        token.parse::<usize>().map_err(|_| ParseError::InvalidCount {
            what,
            token: token.to_string(),
        })
    }
}

impl<T: Scalar> Script<T> {
    pub fn parse(src: &str) -> Result<Self, ParseError> {
        let mut tokens = Tokens(src.split_whitespace());

        let num_chips = tokens.count("chip")?;
        let chips = (0..num_chips)
            .map(|_| tokens.next("chip identifier").map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?;

        let num_commands = tokens.count("command")?;
        let mut commands = Vec::with_capacity(num_commands);
        for _ in 0..num_commands {
            let verb = tokens.next("command")?;
            let command = match verb {
                "A" => Command::Connect {
                    input: tokens.next("connection input")?.to_string(),
                    output: tokens.next("connection output")?.to_string(),
                },
                "I" => {
                    let chip = tokens.next("input chip")?.to_string();
                    let token = tokens.next("input value")?;
                    let value = token.parse::<T>().map_err(|_| ParseError::InvalidValue {
                        chip: chip.clone(),
                        token: token.to_string(),
                    })?;
                    Command::SetInput { chip, value }
                }
                "O" => Command::QueryOutput {
                    chip: tokens.next("output chip")?.to_string(),
                },
                _ => Command::Ignored {
                    verb: verb.to_string(),
                },
            };
            commands.push(command);
        }

        Ok(Script { chips, commands })
    }
}
