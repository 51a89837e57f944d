//! Append-only comments notes attached to a ticket.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ticket::TicketId, user::UserId};

pub type CommentId = i64;

/// A comment is never updated or deleted, except when its ticket is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
  pub id:         CommentId,
  pub ticket_id:  TicketId,
  pub user_id:    UserId,
  pub comment:    String,
  pub created_at: DateTime<Utc>,
}

/// A comment with its author's username joined in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
  #[serde(flatten)]
  pub comment:  Comment,
  pub username: String,
}

/// Input to [`crate::store::HelpdeskStore::add_comment`].
#[derive(Debug, Clone)]
pub struct NewComment {
  pub ticket_id: TicketId,
  pub user_id:   UserId,
  pub comment:   String,
}
