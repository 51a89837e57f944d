//! Tickets, their enumerated attributes, and the typed update request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};

use crate::user::UserId;

pub type TicketId = i64;

// ─── Attributes ──────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub enum Priority {
  Low,
  #[default]
  Medium,
  High,
  Critical,
}

/// Where a ticket sits in the Open → In Progress → Closed lifecycle.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub enum Status {
  #[default]
  Open,
  #[serde(rename = "In Progress")]
  InProgress,
  Closed,
}

// ─── Ticket ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
  pub id:          TicketId,
  pub title:       String,
  pub description: String,
  pub priority:    Priority,
  pub status:      Status,
  pub category:    Option<String>,
  /// The creating user; never changes after insert.
  pub created_by:  UserId,
  pub assigned_to: Option<UserId>,
  pub created_at:  DateTime<Utc>,
  /// Bumped on every mutation.
  pub updated_at:  DateTime<Utc>,
}

impl Ticket {
  /// Whether `user` created or is assigned to this ticket.
  pub fn involves(&self, user: UserId) -> bool {
    self.created_by == user || self.assigned_to == Some(user)
  }
}

/// Read model for listings: the ticket plus the display names of its creator
/// and assignee, joined at query time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketView {
  #[serde(flatten)]
  pub ticket:        Ticket,
  pub creator_name:  Option<String>,
  pub assignee_name: Option<String>,
}

/// Input to [`crate::store::HelpdeskStore::create_ticket`].
#[derive(Debug, Clone)]
pub struct NewTicket {
  pub title:       String,
  pub description: String,
  pub priority:    Priority,
  pub category:    Option<String>,
  pub created_by:  UserId,
}

// ─── Updates ─────────────────────────────────────────────────────────────────

/// The closed set of ticket fields a caller may change after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketField {
  Status,
  Priority,
  AssignedTo,
}

/// A partial update. Absent fields are left untouched; `assigned_to:
/// Some(None)` clears the assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TicketUpdate {
  #[serde(default)]
  pub status:      Option<Status>,
  #[serde(default)]
  pub priority:    Option<Priority>,
  #[serde(default, deserialize_with = "assignee")]
  pub assigned_to: Option<Option<UserId>>,
}

/// Browser forms submit `<select>` values as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdOrString {
  Id(UserId),
  Text(String),
}

/// Distinguishes an explicit `null` from an absent key, and accepts the id as
/// a number or a numeric string. An empty string unassigns.
fn assignee<'de, D>(deserializer: D) -> Result<Option<Option<UserId>>, D::Error>
where
  D: Deserializer<'de>,
{
  let id = match Option::<IdOrString>::deserialize(deserializer)? {
    None => None,
    Some(IdOrString::Id(id)) => Some(id),
    Some(IdOrString::Text(text)) => match text.trim() {
      "" => None,
      digits => Some(digits.parse::<UserId>().map_err(|_| {
        D::Error::custom(format!("invalid user id {text:?}"))
      })?),
    },
  };
  Ok(Some(id))
}

impl TicketUpdate {
  /// The fields this update touches.
  pub fn fields(&self) -> Vec<TicketField> {
    let mut fields = Vec::with_capacity(3);
    if self.status.is_some() {
      fields.push(TicketField::Status);
    }
    if self.priority.is_some() {
      fields.push(TicketField::Priority);
    }
    if self.assigned_to.is_some() {
      fields.push(TicketField::AssignedTo);
    }
    fields
  }
}

// ─── Aggregates ──────────────────────────────────────────────────────────────

/// Dashboard counters. Every bucket is reported, zero when empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketStats {
  pub total:       u64,
  pub open:        u64,
  pub in_progress: u64,
  pub closed:      u64,
}
