//! Typed builder for `UPDATE tickets` statements.
//!
//! Column names come only from the closed [`TicketField`] set; every value is
//! a bound parameter.

use rusqlite::types::Value;

use helpdesk_core::ticket::{TicketField, TicketId, TicketUpdate};

use crate::encode::{encode_priority, encode_status};

/// A parameterised `UPDATE` ready to execute.
#[derive(Debug, PartialEq)]
pub struct UpdateStatement {
  pub sql:    String,
  pub params: Vec<Value>,
}

fn column(field: TicketField) -> &'static str {
  match field {
    TicketField::Status => "status",
    TicketField::Priority => "priority",
    TicketField::AssignedTo => "assigned_to",
  }
}

/// Build the statement for `update`. `updated_at` is always set, so an empty
/// update still bumps the timestamp.
pub fn build(id: TicketId, update: &TicketUpdate, updated_at: String) -> UpdateStatement {
  let mut sets   = vec!["updated_at = ?1".to_owned()];
  let mut params = vec![Value::Text(updated_at)];

  for field in update.fields() {
    let value = match field {
      TicketField::Status => update.status.map(|s| Value::Text(encode_status(s).to_owned())),
      TicketField::Priority => {
        update.priority.map(|p| Value::Text(encode_priority(p).to_owned()))
      }
      TicketField::AssignedTo => update
        .assigned_to
        .map(|a| a.map_or(Value::Null, Value::Integer)),
    };
    if let Some(value) = value {
      params.push(value);
      sets.push(format!("{} = ?{}", column(field), params.len()));
    }
  }

  params.push(Value::Integer(id));
  let sql = format!(
    "UPDATE tickets SET {} WHERE id = ?{}",
    sets.join(", "),
    params.len()
  );
  UpdateStatement { sql, params }
}
