//! Tabular formats for operations, catalogs and summaries
//!
//! - `OperationCsvRecord` and its conversion to `OperationRecord`
//! - `CatalogCsvRecord` for `name,price` catalog files
//! - Summary output as CSV or JSON lines
//!
//! Everything here is pure (no file handling) so it can be tested on
//! in-memory buffers.

use crate::types::{Coins, OperationRecord, Summary};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Header of the operation input
pub const OPERATION_HEADER: [&str; 4] = ["op", "account", "target", "amount"];

/// Header of the CSV summary output
pub const SUMMARY_HEADER: [&str; 5] = ["account", "coins", "inventory", "received", "sent"];

/// One row of operation input: `op,account,target,amount`
///
/// `target` is the item for `buy` and the receiver identity for `send`;
/// `amount` is only read for `send`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct OperationCsvRecord {
    pub op: String,
    pub account: String,
    pub target: Option<String>,
    pub amount: Option<String>,
}

/// One row of catalog input: `name,price`
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CatalogCsvRecord {
    pub name: String,
    pub price: Coins,
}

fn required(field: Option<String>, what: &str, op: &str, account: &str) -> Result<String, String> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(format!("{} for {} requires {}", op, account, what)),
    }
}

/// Convert an `OperationCsvRecord` to an `OperationRecord`
///
/// Only shape is checked here. Amount sign and existence of items and
/// receivers are the engine's business, so those rows reach it and are
/// rejected there with the proper error.
pub fn convert_operation_record(csv_record: OperationCsvRecord) -> Result<OperationRecord, String> {
    let identity = csv_record.account.trim().to_string();
    if identity.is_empty() {
        return Err(format!("{} operation without an account", csv_record.op));
    }

    match csv_record.op.trim().to_lowercase().as_str() {
        "auth" => Ok(OperationRecord::Auth { identity }),
        "buy" => {
            let item = required(csv_record.target, "an item", "buy", &identity)?;
            Ok(OperationRecord::Buy { identity, item })
        }
        "send" => {
            let receiver = required(csv_record.target, "a receiver", "send", &identity)?;
            let raw = required(csv_record.amount, "an amount", "send", &identity)?;
            let amount = raw
                .parse::<Coins>()
                .map_err(|_| format!("Invalid amount '{}' for send from {}", raw, identity))?;
            Ok(OperationRecord::Send {
                identity,
                receiver,
                amount,
            })
        }
        other => Err(format!("Invalid operation: '{}' for {}", other, identity)),
    }
}

fn inventory_cell(summary: &Summary) -> String {
    summary
        .inventory
        .iter()
        .map(|item| format!("{}:{}", item.name, item.quantity))
        .collect::<Vec<_>>()
        .join(";")
}

/// Write summaries as CSV, one row per account in the given order
pub fn write_summaries_csv(summaries: &[Summary], output: &mut dyn Write) -> Result<(), String> {
    let mut writer = csv::Writer::from_writer(output);

    writer
        .write_record(SUMMARY_HEADER)
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    for summary in summaries {
        writer
            .write_record(&[
                summary.identity.clone(),
                summary.coins.to_string(),
                inventory_cell(summary),
                summary.total_received().to_string(),
                summary.total_sent().to_string(),
            ])
            .map_err(|e| format!("Failed to write summary for {}: {}", summary.identity, e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))
}

#[derive(Serialize)]
struct SummaryLine<'a> {
    account: &'a str,
    #[serde(flatten)]
    summary: &'a Summary,
}

/// Write summaries as JSON lines
///
/// Each line is the account summary object with the identity added as
/// `account`.
pub fn write_summaries_json(summaries: &[Summary], output: &mut dyn Write) -> Result<(), String> {
    for summary in summaries {
        let line = SummaryLine {
            account: &summary.identity,
            summary,
        };
        serde_json::to_writer(&mut *output, &line)
            .map_err(|e| format!("Failed to serialise summary for {}: {}", summary.identity, e))?;
        output
            .write_all(b"\n")
            .map_err(|e| format!("Failed to write output: {}", e))?;
    }
    output
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))
}
