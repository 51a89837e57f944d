//! [`SqliteStore`], the SQLite implementation of [`HelpdeskStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use helpdesk_core::{
  comment::{Comment, CommentView, NewComment},
  store::{HelpdeskStore, TicketScope},
  ticket::{NewTicket, Status, Ticket, TicketId, TicketStats, TicketUpdate, TicketView},
  user::{NewUser, StoredUser, User, UserId},
};

use crate::{
  Result,
  encode::{
    RawCommentView, RawStoredUser, RawTicketView, RawUser, encode_dt, encode_priority,
    encode_role, encode_status, now,
  },
  schema::SCHEMA,
  update,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A helpdesk store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

// ─── HelpdeskStore impl ──────────────────────────────────────────────────────

impl HelpdeskStore for SqliteStore {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<Option<User>> {
    let created_at = now();
    let at_str     = encode_dt(created_at);
    let role_str   = encode_role(input.role).to_owned();
    let username   = input.username.clone();
    let email      = input.email.clone();

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT INTO users (username, email, password, role, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![username, email, input.password_hash, role_str, at_str],
        );
        match inserted {
          Ok(_) => Ok(Some(conn.last_insert_rowid())),
          Err(e) if is_constraint_violation(&e) => Ok(None),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    Ok(id.map(|id| User {
      id,
      username: input.username,
      email: input.email,
      role: input.role,
      created_at,
    }))
  }

  async fn seed_user(&self, input: NewUser) -> Result<bool> {
    let at_str   = encode_dt(now());
    let role_str = encode_role(input.role).to_owned();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO users (username, email, password, role, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            input.username,
            input.email,
            input.password_hash,
            role_str,
            at_str,
          ],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn find_user_by_username(&self, username: &str) -> Result<Option<StoredUser>> {
    let username = username.to_owned();

    let raw: Option<RawStoredUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {}, password FROM users WHERE username = ?1", RawUser::COLUMNS),
            rusqlite::params![username],
            |row| {
              Ok(RawStoredUser {
                user:     RawUser::from_row(row)?,
                password: row.get(5)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawStoredUser::into_stored).transpose()
  }

  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {} FROM users WHERE id = ?1", RawUser::COLUMNS),
            rusqlite::params![id],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM users ORDER BY username",
          RawUser::COLUMNS
        ))?;
        let rows = stmt
          .query_map([], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  // ── Tickets ───────────────────────────────────────────────────────────────

  async fn create_ticket(&self, input: NewTicket) -> Result<Ticket> {
    let created_at   = now();
    let at_str       = encode_dt(created_at);
    let priority_str = encode_priority(input.priority).to_owned();
    let status_str   = encode_status(Status::Open).to_owned();
    let title        = input.title.clone();
    let description  = input.description.clone();
    let category     = input.category.clone();
    let created_by   = input.created_by;

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO tickets (
             title, description, priority, status, category,
             created_by, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
          rusqlite::params![
            title,
            description,
            priority_str,
            status_str,
            category,
            created_by,
            at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Ticket {
      id,
      title: input.title,
      description: input.description,
      priority: input.priority,
      status: Status::Open,
      category: input.category,
      created_by,
      assigned_to: None,
      created_at,
      updated_at: created_at,
    })
  }

  async fn get_ticket(&self, id: TicketId) -> Result<Option<TicketView>> {
    let raw: Option<RawTicketView> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("{} WHERE t.id = ?1", RawTicketView::SELECT),
            rusqlite::params![id],
            RawTicketView::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawTicketView::into_view).transpose()
  }

  async fn list_tickets(&self, scope: TicketScope) -> Result<Vec<TicketView>> {
    let raws: Vec<RawTicketView> = self
      .conn
      .call(move |conn| {
        let rows = match scope {
          TicketScope::All => {
            let mut stmt = conn.prepare(&format!(
              "{} ORDER BY t.created_at DESC, t.id DESC",
              RawTicketView::SELECT
            ))?;
            stmt
              .query_map([], RawTicketView::from_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
          TicketScope::InvolvingUser(user_id) => {
            let mut stmt = conn.prepare(&format!(
              "{} WHERE t.created_by = ?1 OR t.assigned_to = ?1
               ORDER BY t.created_at DESC, t.id DESC",
              RawTicketView::SELECT
            ))?;
            stmt
              .query_map(rusqlite::params![user_id], RawTicketView::from_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTicketView::into_view).collect()
  }

  async fn update_ticket(&self, id: TicketId, update: TicketUpdate) -> Result<bool> {
    let stmt = update::build(id, &update, encode_dt(now()));

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(&stmt.sql, rusqlite::params_from_iter(stmt.params))?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn delete_ticket(&self, id: TicketId) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM comments WHERE ticket_id = ?1", rusqlite::params![id])?;
        let removed = tx.execute("DELETE FROM tickets WHERE id = ?1", rusqlite::params![id])?;
        if removed == 0 {
          // Dropping the transaction rolls the comment delete back.
          return Ok(false);
        }
        tx.commit()?;
        Ok(true)
      })
      .await?;

    Ok(deleted)
  }

  async fn ticket_stats(&self) -> Result<TicketStats> {
    let stats = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*),
                  COALESCE(SUM(status = 'Open'), 0),
                  COALESCE(SUM(status = 'In Progress'), 0),
                  COALESCE(SUM(status = 'Closed'), 0)
           FROM tickets",
          [],
          |row| {
            let count = |i: usize| row.get::<_, i64>(i).map(|n| n.max(0) as u64);
            Ok(TicketStats {
              total:       count(0)?,
              open:        count(1)?,
              in_progress: count(2)?,
              closed:      count(3)?,
            })
          },
        )?)
      })
      .await?;

    Ok(stats)
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn add_comment(&self, input: NewComment) -> Result<Option<Comment>> {
    let created_at = now();
    let at_str     = encode_dt(created_at);
    let text       = input.comment.clone();
    let ticket_id  = input.ticket_id;
    let user_id    = input.user_id;

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT INTO comments (ticket_id, user_id, comment, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![ticket_id, user_id, text, at_str],
        );
        match inserted {
          Ok(_) => Ok(Some(conn.last_insert_rowid())),
          // The ticket was deleted after the caller looked it up.
          Err(e) if is_constraint_violation(&e) => Ok(None),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    Ok(id.map(|id| Comment {
      id,
      ticket_id,
      user_id,
      comment: input.comment,
      created_at,
    }))
  }

  async fn list_comments(&self, ticket_id: TicketId) -> Result<Vec<CommentView>> {
    let raws: Vec<RawCommentView> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT c.id, c.ticket_id, c.user_id, c.comment, c.created_at, u.username
           FROM comments c
           JOIN users u ON c.user_id = u.id
           WHERE c.ticket_id = ?1
           ORDER BY c.created_at ASC, c.id ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![ticket_id], RawCommentView::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCommentView::into_view).collect()
  }
}
