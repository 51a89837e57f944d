//! Authorization policy.
//!
//! Two mutually exclusive visibility models exist; one is selected at startup
//! and applies to every request:
//!
//! - [`AccessPolicy::Open`]: every authenticated user sees every ticket. Only
//!   admins change status or assignment; anyone changes priority. Only admins
//!   delete tickets.
//! - [`AccessPolicy::OwnerScoped`]: non-admins see only tickets they created
//!   or are assigned to, and may change any field on those. Nobody deletes.
//!
//! Under both, listing users is admin-only and comments follow ticket
//! visibility.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  session::Caller,
  store::TicketScope,
  ticket::{Ticket, TicketField},
};

/// Something a caller wants to do.
#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
  ListUsers,
  ReadTicket(&'a Ticket),
  UpdateTicket(&'a Ticket, &'a [TicketField]),
  DeleteTicket(&'a Ticket),
  /// Read or add comments on a ticket.
  Comment(&'a Ticket),
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AccessPolicy {
  #[default]
  Open,
  OwnerScoped,
}

impl AccessPolicy {
  /// Allow or deny `action` for `caller`. Denial is [`Error::Forbidden`].
  pub fn authorize(self, caller: &Caller, action: Action<'_>) -> Result<()> {
    if caller.is_admin() {
      return match (self, action) {
        (Self::OwnerScoped, Action::DeleteTicket(_)) => {
          Err(forbidden("tickets cannot be deleted"))
        }
        _ => Ok(()),
      };
    }

    match action {
      Action::ListUsers => Err(forbidden("Admin access required")),
      Action::DeleteTicket(_) => match self {
        Self::Open => Err(forbidden("Admin access required")),
        Self::OwnerScoped => Err(forbidden("tickets cannot be deleted")),
      },
      Action::ReadTicket(ticket) | Action::Comment(ticket) => {
        self.check_visible(caller, ticket)
      }
      Action::UpdateTicket(ticket, fields) => match self {
        Self::Open => {
          let restricted = fields.iter().any(|f| match f {
            TicketField::Status | TicketField::AssignedTo => true,
            TicketField::Priority => false,
          });
          if restricted {
            Err(forbidden("Only admins can change status or assignments"))
          } else {
            Ok(())
          }
        }
        Self::OwnerScoped => self.check_visible(caller, ticket),
      },
    }
  }

  /// Which tickets `caller` may list.
  pub fn scope(self, caller: &Caller) -> TicketScope {
    match self {
      Self::Open => TicketScope::All,
      Self::OwnerScoped if caller.is_admin() => TicketScope::All,
      Self::OwnerScoped => TicketScope::InvolvingUser(caller.id),
    }
  }

  fn check_visible(self, caller: &Caller, ticket: &Ticket) -> Result<()> {
    match self.scope(caller) {
      TicketScope::All => Ok(()),
      TicketScope::InvolvingUser(id) if ticket.involves(id) => Ok(()),
      TicketScope::InvolvingUser(_) => {
        Err(forbidden("You do not have access to this ticket"))
      }
    }
  }
}

fn forbidden(msg: &str) -> Error { Error::Forbidden(msg.to_owned()) }
