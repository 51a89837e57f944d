//! Ticket lifecycle: creation, listing, updates, deletion, comments, and
//! dashboard statistics. Every operation is checked against the configured
//! [`AccessPolicy`](crate::policy::AccessPolicy) before the store is touched.

use crate::{
  Error, Helpdesk, Result,
  comment::{Comment, CommentView, NewComment},
  policy::Action,
  session::Caller,
  store::HelpdeskStore,
  ticket::{NewTicket, Priority, TicketId, TicketStats, TicketUpdate, TicketView},
  user::User,
};

/// Caller-supplied fields for a new ticket.
#[derive(Debug, Clone, Default)]
pub struct NewTicketInput {
  pub title:       String,
  pub description: String,
  /// Defaults to [`Priority::Medium`].
  pub priority:    Option<Priority>,
  pub category:    Option<String>,
}

fn not_found(id: TicketId) -> Error { Error::NotFound(format!("Ticket {id} not found")) }

impl<S: HelpdeskStore> Helpdesk<S> {
  // ── Tickets ───────────────────────────────────────────────────────────────

  pub async fn create_ticket(&self, caller: &Caller, input: NewTicketInput) -> Result<TicketView> {
    let title       = input.title.trim();
    let description = input.description.trim();
    if title.is_empty() || description.is_empty() {
      return Err(Error::Validation("Title and description are required".into()));
    }
    let category = input
      .category
      .map(|c| c.trim().to_owned())
      .filter(|c| !c.is_empty());

    let ticket = self
      .store
      .create_ticket(NewTicket {
        title: title.to_owned(),
        description: description.to_owned(),
        priority: input.priority.unwrap_or_default(),
        category,
        created_by: caller.id,
      })
      .await
      .map_err(Error::store)?;

    tracing::info!(ticket_id = ticket.id, user_id = caller.id, "created ticket");
    Ok(TicketView {
      ticket,
      creator_name:  Some(caller.username.clone()),
      assignee_name: None,
    })
  }

  /// Tickets visible to `caller`, newest first.
  pub async fn list_tickets(&self, caller: &Caller) -> Result<Vec<TicketView>> {
    self
      .store
      .list_tickets(self.policy.scope(caller))
      .await
      .map_err(Error::store)
  }

  pub async fn get_ticket(&self, caller: &Caller, id: TicketId) -> Result<TicketView> {
    let view = self.load(id).await?;
    self.policy.authorize(caller, Action::ReadTicket(&view.ticket))?;
    Ok(view)
  }

  /// Apply a partial update. The whole request is rejected if any requested
  /// field is off-limits to `caller`.
  pub async fn update_ticket(
    &self,
    caller: &Caller,
    id: TicketId,
    update: TicketUpdate,
  ) -> Result<()> {
    let view   = self.load(id).await?;
    let fields = update.fields();
    self
      .policy
      .authorize(caller, Action::UpdateTicket(&view.ticket, &fields))?;

    if let Some(Some(assignee)) = update.assigned_to {
      self
        .store
        .get_user(assignee)
        .await
        .map_err(Error::store)?
        .ok_or_else(|| Error::Validation(format!("User {assignee} does not exist")))?;
    }

    if !self.store.update_ticket(id, update).await.map_err(Error::store)? {
      return Err(not_found(id));
    }
    tracing::info!(ticket_id = id, user_id = caller.id, ?fields, "updated ticket");
    Ok(())
  }

  /// Delete a ticket together with its comments.
  pub async fn delete_ticket(&self, caller: &Caller, id: TicketId) -> Result<()> {
    let view = self.load(id).await?;
    self.policy.authorize(caller, Action::DeleteTicket(&view.ticket))?;

    if !self.store.delete_ticket(id).await.map_err(Error::store)? {
      return Err(not_found(id));
    }
    tracing::info!(ticket_id = id, user_id = caller.id, "deleted ticket");
    Ok(())
  }

  pub async fn stats(&self) -> Result<TicketStats> {
    self.store.ticket_stats().await.map_err(Error::store)
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  pub async fn add_comment(
    &self,
    caller: &Caller,
    ticket_id: TicketId,
    text: &str,
  ) -> Result<Comment> {
    let text = text.trim();
    if text.is_empty() {
      return Err(Error::Validation("Comment is required".into()));
    }
    let view = self.load(ticket_id).await?;
    self.policy.authorize(caller, Action::Comment(&view.ticket))?;

    self
      .store
      .add_comment(NewComment {
        ticket_id,
        user_id: caller.id,
        comment: text.to_owned(),
      })
      .await
      .map_err(Error::store)?
      .ok_or_else(|| not_found(ticket_id))
  }

  /// Comments on a ticket, oldest first. A ticket that does not exist has no
  /// comments.
  pub async fn list_comments(
    &self,
    caller: &Caller,
    ticket_id: TicketId,
  ) -> Result<Vec<CommentView>> {
    let Some(view) = self.store.get_ticket(ticket_id).await.map_err(Error::store)? else {
      return Ok(Vec::new());
    };
    self.policy.authorize(caller, Action::Comment(&view.ticket))?;
    self.store.list_comments(ticket_id).await.map_err(Error::store)
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  pub async fn list_users(&self, caller: &Caller) -> Result<Vec<User>> {
    self.policy.authorize(caller, Action::ListUsers)?;
    self.store.list_users().await.map_err(Error::store)
  }

  async fn load(&self, id: TicketId) -> Result<TicketView> {
    self
      .store
      .get_ticket(id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| not_found(id))
  }
}
