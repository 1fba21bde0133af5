use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

/// Row of the accounts report: `account,role,verified,earned,available`.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct AccountRow {
    pub account: String,
    pub role: String,
    pub verified: bool,
    pub earned: Decimal,
    pub available: Decimal,
}

/// Row of the submissions report: `submission,account,status,reviewer,reason`.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct SubmissionRow {
    pub submission: String,
    pub account: String,
    pub status: String,
    pub reviewer: String,
    pub reason: String,
}

/// Row of the payouts report: `payout,account,amount,status,reference`.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct PayoutRow {
    pub payout: String,
    pub account: String,
    pub amount: Decimal,
    pub status: String,
    pub reference: String,
}

/// Writes downloadable reports from list results.
///
/// Read-only consumer of the query layer; has no write access to the
/// engine.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_accounts(&mut self, rows: &[AccountRow]) -> Result<()> {
        for row in rows {
            self.writer.serialize(row)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_submissions(&mut self, rows: &[SubmissionRow]) -> Result<()> {
        for row in rows {
            self.writer.serialize(row)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_payouts(&mut self, rows: &[PayoutRow]) -> Result<()> {
        for row in rows {
            self.writer.serialize(row)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
