//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as fixed-width RFC 3339 UTC strings so that
//! lexical order is chronological. Enumerations are stored by display name.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use helpdesk_core::{
  comment::{Comment, CommentView},
  ticket::{Priority, Status, Ticket, TicketView},
  user::{Role, StoredUser, User},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The current time at the precision the store keeps, so values handed back
/// from writes compare equal to values read later.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn encode_role(r: Role) -> &'static str {
  match r {
    Role::User => "user",
    Role::Admin => "admin",
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "user" => Ok(Role::User),
    "admin" => Ok(Role::Admin),
    other => Err(unknown("role", other)),
  }
}

// ─── Priority ────────────────────────────────────────────────────────────────

pub fn encode_priority(p: Priority) -> &'static str {
  match p {
    Priority::Low => "Low",
    Priority::Medium => "Medium",
    Priority::High => "High",
    Priority::Critical => "Critical",
  }
}

pub fn decode_priority(s: &str) -> Result<Priority> {
  match s {
    "Low" => Ok(Priority::Low),
    "Medium" => Ok(Priority::Medium),
    "High" => Ok(Priority::High),
    "Critical" => Ok(Priority::Critical),
    other => Err(unknown("priority", other)),
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

pub fn encode_status(s: Status) -> &'static str {
  match s {
    Status::Open => "Open",
    Status::InProgress => "In Progress",
    Status::Closed => "Closed",
  }
}

pub fn decode_status(s: &str) -> Result<Status> {
  match s {
    "Open" => Ok(Status::Open),
    "In Progress" => Ok(Status::InProgress),
    "Closed" => Ok(Status::Closed),
    other => Err(unknown("status", other)),
  }
}

fn unknown(kind: &'static str, value: &str) -> Error {
  Error::UnknownValue { kind, value: value.to_owned() }
}

// ─── Raw row types ───────────────────────────────────────────────────────────

/// Column values of a `users` row, straight from SQLite.
pub struct RawUser {
  pub id:         i64,
  pub username:   String,
  pub email:      String,
  pub role:       String,
  pub created_at: String,
}

impl RawUser {
  pub const COLUMNS: &'static str = "id, username, email, role, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      username:   row.get(1)?,
      email:      row.get(2)?,
      role:       row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:         self.id,
      username:   self.username,
      email:      self.email,
      role:       decode_role(&self.role)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// A `users` row plus its password column.
pub struct RawStoredUser {
  pub user:     RawUser,
  pub password: String,
}

impl RawStoredUser {
  pub fn into_stored(self) -> Result<StoredUser> {
    Ok(StoredUser {
      user:          self.user.into_user()?,
      password_hash: self.password,
    })
  }
}

/// A `tickets` row joined with creator and assignee usernames.
pub struct RawTicketView {
  pub id:            i64,
  pub title:         String,
  pub description:   String,
  pub priority:      String,
  pub status:        String,
  pub category:      Option<String>,
  pub created_by:    i64,
  pub assigned_to:   Option<i64>,
  pub created_at:    String,
  pub updated_at:    String,
  pub creator_name:  Option<String>,
  pub assignee_name: Option<String>,
}

impl RawTicketView {
  /// Select list matching [`Self::from_row`]; expects the `tickets` table
  /// aliased `t` and the joined users aliased `creator` and `assignee`.
  pub const SELECT: &'static str = "
    SELECT t.id, t.title, t.description, t.priority, t.status, t.category,
           t.created_by, t.assigned_to, t.created_at, t.updated_at,
           creator.username  AS creator_name,
           assignee.username AS assignee_name
    FROM tickets t
    LEFT JOIN users creator  ON t.created_by  = creator.id
    LEFT JOIN users assignee ON t.assigned_to = assignee.id";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      title:         row.get(1)?,
      description:   row.get(2)?,
      priority:      row.get(3)?,
      status:        row.get(4)?,
      category:      row.get(5)?,
      created_by:    row.get(6)?,
      assigned_to:   row.get(7)?,
      created_at:    row.get(8)?,
      updated_at:    row.get(9)?,
      creator_name:  row.get(10)?,
      assignee_name: row.get(11)?,
    })
  }

  pub fn into_view(self) -> Result<TicketView> {
    Ok(TicketView {
      ticket:        Ticket {
        id:          self.id,
        title:       self.title,
        description: self.description,
        priority:    decode_priority(&self.priority)?,
        status:      decode_status(&self.status)?,
        category:    self.category,
        created_by:  self.created_by,
        assigned_to: self.assigned_to,
        created_at:  decode_dt(&self.created_at)?,
        updated_at:  decode_dt(&self.updated_at)?,
      },
      creator_name:  self.creator_name,
      assignee_name: self.assignee_name,
    })
  }
}

/// A `comments` row joined with its author's username.
pub struct RawCommentView {
  pub id:         i64,
  pub ticket_id:  i64,
  pub user_id:    i64,
  pub comment:    String,
  pub created_at: String,
  pub username:   String,
}

impl RawCommentView {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      ticket_id:  row.get(1)?,
      user_id:    row.get(2)?,
      comment:    row.get(3)?,
      created_at: row.get(4)?,
      username:   row.get(5)?,
    })
  }

  pub fn into_view(self) -> Result<CommentView> {
    Ok(CommentView {
      comment:  Comment {
        id:         self.id,
        ticket_id:  self.ticket_id,
        user_id:    self.user_id,
        comment:    self.comment,
        created_at: decode_dt(&self.created_at)?,
      },
      username: self.username,
    })
  }
}
