//! Integration tests for `SqliteStore` and the `Helpdesk` service against an
//! in-memory database.

use std::sync::Arc;

use helpdesk_core::{
  Error as CoreError, Helpdesk,
  comment::NewComment,
  credentials::{AdminSeed, CredentialHasher},
  lifecycle::NewTicketInput,
  policy::AccessPolicy,
  session::Caller,
  store::{HelpdeskStore, TicketScope},
  ticket::{NewTicket, Priority, Status, TicketStats, TicketUpdate},
  user::{NewUser, Role, User},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_user(username: &str, email: &str) -> NewUser {
  NewUser {
    username:      username.into(),
    email:         email.into(),
    password_hash: "$argon2id$placeholder".into(),
    role:          Role::User,
  }
}

fn new_ticket(title: &str, created_by: i64) -> NewTicket {
  NewTicket {
    title:       title.into(),
    description: "details".into(),
    priority:    Priority::Medium,
    category:    None,
    created_by,
  }
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_find_user() {
  let s = store().await;
  let user = s.create_user(new_user("alice", "a@x.com")).await.unwrap().unwrap();
  assert_eq!(user.role, Role::User);

  let found = s.find_user_by_username("alice").await.unwrap().unwrap();
  assert_eq!(found.user, user);
  assert_eq!(found.password_hash, "$argon2id$placeholder");

  assert_eq!(s.get_user(user.id).await.unwrap(), Some(user));
}

#[tokio::test]
async fn duplicate_username_or_email_ignores_case() {
  let s = store().await;
  s.create_user(new_user("alice", "a@x.com")).await.unwrap().unwrap();

  assert!(s.create_user(new_user("ALICE", "other@x.com")).await.unwrap().is_none());
  assert!(s.create_user(new_user("bob", "A@X.COM")).await.unwrap().is_none());
  assert!(s.create_user(new_user("bob", "b@x.com")).await.unwrap().is_some());

  // Lookup follows the same collation.
  assert!(s.find_user_by_username("Alice").await.unwrap().is_some());
}

#[tokio::test]
async fn seed_user_is_idempotent() {
  let s = store().await;
  let mut admin = new_user("admin", "admin@company.com");
  admin.role = Role::Admin;

  assert!(s.seed_user(admin.clone()).await.unwrap());
  assert!(!s.seed_user(admin).await.unwrap());
  assert_eq!(s.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn list_users_orders_by_username() {
  let s = store().await;
  s.create_user(new_user("carol", "c@x.com")).await.unwrap();
  s.create_user(new_user("alice", "a@x.com")).await.unwrap();
  s.create_user(new_user("bob", "b@x.com")).await.unwrap();

  let names: Vec<String> =
    s.list_users().await.unwrap().into_iter().map(|u| u.username).collect();
  assert_eq!(names, ["alice", "bob", "carol"]);
}

// ─── Tickets ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_ticket_defaults_and_joined_names() {
  let s = store().await;
  let alice = s.create_user(new_user("alice", "a@x.com")).await.unwrap().unwrap();

  let ticket = s.create_ticket(new_ticket("Printer broken", alice.id)).await.unwrap();
  assert_eq!(ticket.status, Status::Open);
  assert_eq!(ticket.created_at, ticket.updated_at);

  let view = s.get_ticket(ticket.id).await.unwrap().unwrap();
  assert_eq!(view.ticket, ticket);
  assert_eq!(view.creator_name.as_deref(), Some("alice"));
  assert_eq!(view.assignee_name, None);
}

#[tokio::test]
async fn get_missing_ticket_returns_none() {
  let s = store().await;
  assert!(s.get_ticket(99).await.unwrap().is_none());
}

#[tokio::test]
async fn list_tickets_newest_first_and_scoped() {
  let s = store().await;
  let alice = s.create_user(new_user("alice", "a@x.com")).await.unwrap().unwrap();
  let bob   = s.create_user(new_user("bob", "b@x.com")).await.unwrap().unwrap();

  let first  = s.create_ticket(new_ticket("first", alice.id)).await.unwrap();
  let second = s.create_ticket(new_ticket("second", bob.id)).await.unwrap();
  let third  = s.create_ticket(new_ticket("third", bob.id)).await.unwrap();
  s.update_ticket(third.id, TicketUpdate {
    assigned_to: Some(Some(alice.id)),
    ..Default::default()
  })
  .await
  .unwrap();

  let all: Vec<i64> =
    s.list_tickets(TicketScope::All).await.unwrap().iter().map(|v| v.ticket.id).collect();
  assert_eq!(all, [third.id, second.id, first.id]);

  let mine = s.list_tickets(TicketScope::InvolvingUser(alice.id)).await.unwrap();
  let ids: Vec<i64> = mine.iter().map(|v| v.ticket.id).collect();
  assert_eq!(ids, [third.id, first.id]);
  assert_eq!(mine[0].assignee_name.as_deref(), Some("alice"));
  assert_eq!(mine[0].creator_name.as_deref(), Some("bob"));
}

#[tokio::test]
async fn update_changes_only_supplied_fields() {
  let s = store().await;
  let alice  = s.create_user(new_user("alice", "a@x.com")).await.unwrap().unwrap();
  let ticket = s.create_ticket(new_ticket("t", alice.id)).await.unwrap();
  tokio::time::sleep(std::time::Duration::from_millis(2)).await;

  let changed = s
    .update_ticket(ticket.id, TicketUpdate {
      status: Some(Status::InProgress),
      ..Default::default()
    })
    .await
    .unwrap();
  assert!(changed);

  let after = s.get_ticket(ticket.id).await.unwrap().unwrap().ticket;
  assert_eq!(after.status, Status::InProgress);
  assert_eq!(after.priority, Priority::Medium);
  assert_eq!(after.assigned_to, None);
  assert!(after.updated_at > ticket.updated_at);
  assert_eq!(after.created_at, ticket.created_at);
}

#[tokio::test]
async fn update_clears_assignment_with_explicit_null() {
  let s = store().await;
  let alice  = s.create_user(new_user("alice", "a@x.com")).await.unwrap().unwrap();
  let ticket = s.create_ticket(new_ticket("t", alice.id)).await.unwrap();

  s.update_ticket(ticket.id, TicketUpdate { assigned_to: Some(Some(alice.id)), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(s.get_ticket(ticket.id).await.unwrap().unwrap().ticket.assigned_to, Some(alice.id));

  s.update_ticket(ticket.id, TicketUpdate { assigned_to: Some(None), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(s.get_ticket(ticket.id).await.unwrap().unwrap().ticket.assigned_to, None);
}

#[tokio::test]
async fn update_missing_ticket_returns_false() {
  let s = store().await;
  let changed = s
    .update_ticket(7, TicketUpdate { priority: Some(Priority::High), ..Default::default() })
    .await
    .unwrap();
  assert!(!changed);
}

#[tokio::test]
async fn delete_removes_ticket_and_all_comments() {
  let s = store().await;
  let alice = s.create_user(new_user("alice", "a@x.com")).await.unwrap().unwrap();
  let doomed = s.create_ticket(new_ticket("doomed", alice.id)).await.unwrap();
  let kept   = s.create_ticket(new_ticket("kept", alice.id)).await.unwrap();

  for i in 0..3 {
    s.add_comment(NewComment { ticket_id: doomed.id, user_id: alice.id, comment: format!("c{i}") })
      .await
      .unwrap();
  }
  s.add_comment(NewComment { ticket_id: kept.id, user_id: alice.id, comment: "stay".into() })
    .await
    .unwrap();

  assert!(s.delete_ticket(doomed.id).await.unwrap());
  assert!(s.get_ticket(doomed.id).await.unwrap().is_none());
  assert!(s.list_comments(doomed.id).await.unwrap().is_empty());
  assert_eq!(s.list_comments(kept.id).await.unwrap().len(), 1);

  assert!(!s.delete_ticket(doomed.id).await.unwrap());
}

#[tokio::test]
async fn stats_on_empty_store_are_zero() {
  let s = store().await;
  assert_eq!(s.ticket_stats().await.unwrap(), TicketStats::default());
}

#[tokio::test]
async fn stats_count_each_status() {
  let s = store().await;
  let alice = s.create_user(new_user("alice", "a@x.com")).await.unwrap().unwrap();
  let a = s.create_ticket(new_ticket("a", alice.id)).await.unwrap();
  let b = s.create_ticket(new_ticket("b", alice.id)).await.unwrap();
  s.create_ticket(new_ticket("c", alice.id)).await.unwrap();

  s.update_ticket(a.id, TicketUpdate { status: Some(Status::Closed), ..Default::default() })
    .await
    .unwrap();
  s.update_ticket(b.id, TicketUpdate { status: Some(Status::InProgress), ..Default::default() })
    .await
    .unwrap();

  assert_eq!(s.ticket_stats().await.unwrap(), TicketStats {
    total:       3,
    open:        1,
    in_progress: 1,
    closed:      1,
  });
}

// ─── Comments ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn comments_are_oldest_first_with_author() {
  let s = store().await;
  let alice  = s.create_user(new_user("alice", "a@x.com")).await.unwrap().unwrap();
  let bob    = s.create_user(new_user("bob", "b@x.com")).await.unwrap().unwrap();
  let ticket = s.create_ticket(new_ticket("t", alice.id)).await.unwrap();

  s.add_comment(NewComment { ticket_id: ticket.id, user_id: alice.id, comment: "first".into() })
    .await
    .unwrap();
  s.add_comment(NewComment { ticket_id: ticket.id, user_id: bob.id, comment: "second".into() })
    .await
    .unwrap();

  let comments = s.list_comments(ticket.id).await.unwrap();
  let texts: Vec<(&str, &str)> = comments
    .iter()
    .map(|c| (c.comment.comment.as_str(), c.username.as_str()))
    .collect();
  assert_eq!(texts, [("first", "alice"), ("second", "bob")]);
}

#[tokio::test]
async fn comment_on_missing_ticket_is_not_inserted() {
  let s = store().await;
  let alice = s.create_user(new_user("alice", "a@x.com")).await.unwrap().unwrap();
  let result = s
    .add_comment(NewComment { ticket_id: 404, user_id: alice.id, comment: "hi".into() })
    .await
    .unwrap();
  assert!(result.is_none());
  assert!(s.list_comments(404).await.unwrap().is_empty());
}

// ─── Helpdesk service ────────────────────────────────────────────────────────

async fn desk(policy: AccessPolicy) -> Helpdesk<SqliteStore> {
  let desk = Helpdesk::new(Arc::new(store().await), policy, CredentialHasher::default());
  desk.seed_admin(&AdminSeed::default()).await.unwrap();
  desk
}

async fn admin(desk: &Helpdesk<SqliteStore>) -> Caller {
  let user = desk.verify_credentials("admin", "admin123").await.unwrap();
  Caller::from(&user)
}

async fn register(desk: &Helpdesk<SqliteStore>, name: &str) -> (User, Caller) {
  let user = desk
    .register(name, &format!("{name}@x.com"), "pw123456")
    .await
    .unwrap();
  let caller = Caller::from(&user);
  (user, caller)
}

fn input(title: &str) -> NewTicketInput {
  NewTicketInput {
    title: title.into(),
    description: "No toner".into(),
    ..Default::default()
  }
}

#[tokio::test]
async fn register_twice_in_any_case_conflicts() {
  let d = desk(AccessPolicy::Open).await;
  assert!(d.register("alice", "a@x.com", "pw123456").await.is_ok());
  assert!(matches!(
    d.register("Alice", "other@x.com", "pw123456").await,
    Err(CoreError::Conflict(_))
  ));
}

#[tokio::test]
async fn register_requires_every_field() {
  let d = desk(AccessPolicy::Open).await;
  for (u, e, p) in [("", "a@x.com", "pw"), ("alice", " ", "pw"), ("alice", "a@x.com", "")] {
    assert!(matches!(d.register(u, e, p).await, Err(CoreError::Validation(_))));
  }
  assert!(matches!(
    d.register("alice", "not-an-email", "pw").await,
    Err(CoreError::Validation(_))
  ));
}

#[tokio::test]
async fn login_does_not_reveal_which_part_was_wrong() {
  let d = desk(AccessPolicy::Open).await;
  let (alice, _) = register(&d, "alice").await;

  let ok = d.verify_credentials("alice", "pw123456").await.unwrap();
  assert_eq!(ok.id, alice.id);

  assert!(matches!(
    d.verify_credentials("alice", "wrong").await,
    Err(CoreError::InvalidCredentials)
  ));
  assert!(matches!(
    d.verify_credentials("nobody", "pw123456").await,
    Err(CoreError::InvalidCredentials)
  ));
}

#[tokio::test]
async fn admin_seed_runs_once() {
  let d = desk(AccessPolicy::Open).await;
  assert!(!d.seed_admin(&AdminSeed::default()).await.unwrap());
  let admin = d.verify_credentials("admin", "admin123").await.unwrap();
  assert_eq!(admin.role, Role::Admin);
}

#[tokio::test]
async fn created_ticket_belongs_to_caller_with_defaults() {
  let d = desk(AccessPolicy::Open).await;
  let (alice, caller) = register(&d, "alice").await;

  let view = d.create_ticket(&caller, input("Printer broken")).await.unwrap();
  assert_eq!(view.ticket.created_by, alice.id);
  assert_eq!(view.ticket.status, Status::Open);
  assert_eq!(view.ticket.priority, Priority::Medium);

  let urgent = d
    .create_ticket(&caller, NewTicketInput {
      priority: Some(Priority::Critical),
      category: Some("Hardware".into()),
      ..input("Server down")
    })
    .await
    .unwrap();
  assert_eq!(urgent.ticket.priority, Priority::Critical);
  assert_eq!(urgent.ticket.category.as_deref(), Some("Hardware"));
}

#[tokio::test]
async fn create_ticket_requires_title_and_description() {
  let d = desk(AccessPolicy::Open).await;
  let (_, caller) = register(&d, "alice").await;
  let missing = NewTicketInput { title: "  ".into(), ..input("x") };
  assert!(matches!(
    d.create_ticket(&caller, missing).await,
    Err(CoreError::Validation(_))
  ));
}

#[tokio::test]
async fn open_policy_rejects_non_admin_status_change() {
  let d = desk(AccessPolicy::Open).await;
  let (_, alice) = register(&d, "alice").await;
  let id = d.create_ticket(&alice, input("t")).await.unwrap().ticket.id;

  let mixed = TicketUpdate {
    status:   Some(Status::Closed),
    priority: Some(Priority::High),
    ..Default::default()
  };
  assert!(matches!(
    d.update_ticket(&alice, id, mixed).await,
    Err(CoreError::Forbidden(_))
  ));
  // Nothing was applied.
  let ticket = d.get_ticket(&alice, id).await.unwrap().ticket;
  assert_eq!(ticket.priority, Priority::Medium);

  let (_, bob) = register(&d, "bob").await;
  d.update_ticket(&bob, id, TicketUpdate { priority: Some(Priority::High), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(d.get_ticket(&alice, id).await.unwrap().ticket.priority, Priority::High);
}

#[tokio::test]
async fn admin_assignment_must_reference_existing_user() {
  let d = desk(AccessPolicy::Open).await;
  let admin = admin(&d).await;
  let (bob_user, bob) = register(&d, "bob").await;
  let id = d.create_ticket(&bob, input("t")).await.unwrap().ticket.id;

  assert!(matches!(
    d.update_ticket(&admin, id, TicketUpdate { assigned_to: Some(Some(999)), ..Default::default() })
      .await,
    Err(CoreError::Validation(_))
  ));

  d.update_ticket(&admin, id, TicketUpdate { assigned_to: Some(Some(bob_user.id)), ..Default::default() })
    .await
    .unwrap();
  let view = d.get_ticket(&admin, id).await.unwrap();
  assert_eq!(view.assignee_name.as_deref(), Some("bob"));
}

#[tokio::test]
async fn update_missing_ticket_is_not_found() {
  let d = desk(AccessPolicy::Open).await;
  let admin = admin(&d).await;
  assert!(matches!(
    d.update_ticket(&admin, 5, TicketUpdate::default()).await,
    Err(CoreError::NotFound(_))
  ));
}

#[tokio::test]
async fn owner_scoped_policy_limits_visibility_and_updates() {
  let d = desk(AccessPolicy::OwnerScoped).await;
  let admin = admin(&d).await;
  let (_, alice) = register(&d, "alice").await;
  let (bob_user, bob) = register(&d, "bob").await;
  let (_, carol) = register(&d, "carol").await;

  let id = d.create_ticket(&alice, input("alice's")).await.unwrap().ticket.id;
  d.create_ticket(&carol, input("carol's")).await.unwrap();

  assert_eq!(d.list_tickets(&alice).await.unwrap().len(), 1);
  assert_eq!(d.list_tickets(&bob).await.unwrap().len(), 0);
  assert_eq!(d.list_tickets(&admin).await.unwrap().len(), 2);

  let close = TicketUpdate { status: Some(Status::Closed), ..Default::default() };
  assert!(matches!(
    d.update_ticket(&bob, id, close.clone()).await,
    Err(CoreError::Forbidden(_))
  ));
  assert!(matches!(d.get_ticket(&bob, id).await, Err(CoreError::Forbidden(_))));
  assert!(matches!(
    d.add_comment(&bob, id, "let me in").await,
    Err(CoreError::Forbidden(_))
  ));

  // The creator may assign; the assignee may then move it along.
  d.update_ticket(&alice, id, TicketUpdate { assigned_to: Some(Some(bob_user.id)), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(d.list_tickets(&bob).await.unwrap().len(), 1);
  d.update_ticket(&bob, id, close).await.unwrap();

  assert!(matches!(d.delete_ticket(&admin, id).await, Err(CoreError::Forbidden(_))));
}

#[tokio::test]
async fn delete_is_admin_only_and_cascades() {
  let d = desk(AccessPolicy::Open).await;
  let admin = admin(&d).await;
  let (_, alice) = register(&d, "alice").await;
  let id = d.create_ticket(&alice, input("t")).await.unwrap().ticket.id;
  for text in ["one", "two", "three"] {
    d.add_comment(&alice, id, text).await.unwrap();
  }

  assert!(matches!(d.delete_ticket(&alice, id).await, Err(CoreError::Forbidden(_))));
  assert_eq!(d.list_comments(&alice, id).await.unwrap().len(), 3);

  d.delete_ticket(&admin, id).await.unwrap();
  assert!(d.list_comments(&alice, id).await.unwrap().is_empty());
  assert!(matches!(d.delete_ticket(&admin, id).await, Err(CoreError::NotFound(_))));
}

#[tokio::test]
async fn comments_need_text_and_an_existing_ticket() {
  let d = desk(AccessPolicy::Open).await;
  let (_, alice) = register(&d, "alice").await;
  let id = d.create_ticket(&alice, input("t")).await.unwrap().ticket.id;

  assert!(matches!(d.add_comment(&alice, id, "   ").await, Err(CoreError::Validation(_))));
  assert!(matches!(d.add_comment(&alice, 404, "hi").await, Err(CoreError::NotFound(_))));

  let comment = d.add_comment(&alice, id, " hello ").await.unwrap();
  assert_eq!(comment.comment, "hello");
  assert_eq!(comment.user_id, alice.id);
}

#[tokio::test]
async fn list_users_is_admin_only() {
  let d = desk(AccessPolicy::Open).await;
  let admin = admin(&d).await;
  let (_, alice) = register(&d, "alice").await;

  assert!(matches!(d.list_users(&alice).await, Err(CoreError::Forbidden(_))));
  let users = d.list_users(&admin).await.unwrap();
  let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
  assert_eq!(names, ["admin", "alice"]);
}

#[tokio::test]
async fn service_stats_start_at_zero() {
  let d = desk(AccessPolicy::Open).await;
  let stats = d.stats().await.unwrap();
  assert_eq!((stats.total, stats.open, stats.in_progress, stats.closed), (0, 0, 0, 0));
}

// ─── Ticket deleted mid-request ──────────────────────────────────────────────

mod deleted_mid_request {
  use helpdesk_core::{
    comment::{Comment, CommentView},
    ticket::{Ticket, TicketId, TicketView},
    user::{StoredUser, UserId},
  };

  use super::*;

  /// Hands out the ticket it was asked for, then deletes it before the caller
  /// can act on it.
  struct DeletesAfterLookup(SqliteStore);

  impl HelpdeskStore for DeletesAfterLookup {
    type Error = crate::Error;

    async fn create_user(&self, input: NewUser) -> crate::Result<Option<User>> {
      self.0.create_user(input).await
    }

    async fn seed_user(&self, input: NewUser) -> crate::Result<bool> {
      self.0.seed_user(input).await
    }

    async fn find_user_by_username(
      &self,
      username: &str,
    ) -> crate::Result<Option<StoredUser>> {
      self.0.find_user_by_username(username).await
    }

    async fn get_user(&self, id: UserId) -> crate::Result<Option<User>> {
      self.0.get_user(id).await
    }

    async fn list_users(&self) -> crate::Result<Vec<User>> { self.0.list_users().await }

    async fn create_ticket(&self, input: NewTicket) -> crate::Result<Ticket> {
      self.0.create_ticket(input).await
    }

    async fn get_ticket(&self, id: TicketId) -> crate::Result<Option<TicketView>> {
      let view = self.0.get_ticket(id).await?;
      self.0.delete_ticket(id).await?;
      Ok(view)
    }

    async fn list_tickets(&self, scope: TicketScope) -> crate::Result<Vec<TicketView>> {
      self.0.list_tickets(scope).await
    }

    async fn update_ticket(
      &self,
      id: TicketId,
      update: TicketUpdate,
    ) -> crate::Result<bool> {
      self.0.update_ticket(id, update).await
    }

    async fn delete_ticket(&self, id: TicketId) -> crate::Result<bool> {
      self.0.delete_ticket(id).await
    }

    async fn ticket_stats(&self) -> crate::Result<TicketStats> {
      self.0.ticket_stats().await
    }

    async fn add_comment(&self, input: NewComment) -> crate::Result<Option<Comment>> {
      self.0.add_comment(input).await
    }

    async fn list_comments(&self, ticket_id: TicketId) -> crate::Result<Vec<CommentView>> {
      self.0.list_comments(ticket_id).await
    }
  }

  #[tokio::test]
  async fn comment_on_ticket_deleted_after_lookup_is_not_found() {
    let inner = store().await;
    let alice = inner.create_user(new_user("alice", "a@x.com")).await.unwrap().unwrap();
    let ticket = inner.create_ticket(new_ticket("t", alice.id)).await.unwrap();

    let d = Helpdesk::new(
      Arc::new(DeletesAfterLookup(inner)),
      AccessPolicy::Open,
      CredentialHasher::default(),
    );
    let caller = Caller::from(&alice);

    let result = d.add_comment(&caller, ticket.id, "too late").await;
    assert!(matches!(result, Err(CoreError::NotFound(_))), "{result:?}");
  }
}
