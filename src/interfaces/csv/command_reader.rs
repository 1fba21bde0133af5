use crate::error::{EngineError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One console operation per CSV row: `op, actor, entity, amount, note`.
///
/// `actor` is the handle of the acting account (or of the account being
/// created for the register ops). `entity` names the target entity — an
/// existing handle, or the handle assigned to a newly created submission or
/// payout. `note` carries free-text payloads: document pairs
/// (`name:content|name:content`) for `submit`, `bank|email` for `profile`,
/// reasons, review notes and settlement references.
#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    RegisterSupplier,
    RegisterAdmin,
    Profile,
    Credit,
    Submit,
    Claim,
    Verify,
    Reject,
    Release,
    Request,
    Approve,
    Deny,
    Paid,
    Deactivate,
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Command {
    pub op: Op,
    pub actor: String,
    #[serde(default)]
    pub entity: String,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub note: String,
}

/// Reads console commands from a CSV source.
///
/// Wraps `csv::Reader` and provides an iterator over `Result<Command>`,
/// with whitespace trimming and flexible record lengths, so large scripts
/// stream without loading the whole file.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g. File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(EngineError::from))
    }
}
