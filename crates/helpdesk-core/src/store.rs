//! The `HelpdeskStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `helpdesk-store-sqlite`). The [`Helpdesk`](crate::Helpdesk) service depends
//! on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  comment::{Comment, CommentView, NewComment},
  ticket::{NewTicket, Ticket, TicketId, TicketStats, TicketUpdate, TicketView},
  user::{NewUser, StoredUser, User, UserId},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Which tickets a listing may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketScope {
  All,
  /// Only tickets created by or assigned to this user.
  InvolvingUser(UserId),
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a helpdesk persistence backend.
///
/// Backends perform no authorization; every call is assumed to have been
/// vetted by the [`AccessPolicy`](crate::policy::AccessPolicy) already.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait HelpdeskStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Insert a new user. Returns `None` if the username or email is already
  /// taken.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Insert `input` unless a user with the same username or email exists.
  /// Returns `true` if a row was inserted.
  fn seed_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Look a user up by username, including the password hash.
  fn find_user_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<StoredUser>, Self::Error>> + Send + 'a;

  fn get_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// All users, ordered by username.
  fn list_users(
    &self,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  // ── Tickets ───────────────────────────────────────────────────────────

  /// Insert a ticket with status `Open`. Timestamps are set by the store.
  fn create_ticket(
    &self,
    input: NewTicket,
  ) -> impl Future<Output = Result<Ticket, Self::Error>> + Send + '_;

  fn get_ticket(
    &self,
    id: TicketId,
  ) -> impl Future<Output = Result<Option<TicketView>, Self::Error>> + Send + '_;

  /// Tickets within `scope`, newest first.
  fn list_tickets(
    &self,
    scope: TicketScope,
  ) -> impl Future<Output = Result<Vec<TicketView>, Self::Error>> + Send + '_;

  /// Apply `update` and bump `updated_at`. Returns `false` if no such ticket.
  fn update_ticket(
    &self,
    id: TicketId,
    update: TicketUpdate,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete a ticket and all of its comments as one atomic unit.
  /// Returns `false` (and changes nothing) if no such ticket.
  fn delete_ticket(
    &self,
    id: TicketId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn ticket_stats(
    &self,
  ) -> impl Future<Output = Result<TicketStats, Self::Error>> + Send + '_;

  // ── Comments ──────────────────────────────────────────────────────────

  /// Returns `None` if the ticket no longer exists.
  fn add_comment(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + '_;

  /// Comments on a ticket, oldest first. Empty if the ticket does not exist.
  fn list_comments(
    &self,
    ticket_id: TicketId,
  ) -> impl Future<Output = Result<Vec<CommentView>, Self::Error>> + Send + '_;
}
