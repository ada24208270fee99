//! Realtime credit feed: one Postgres LISTEN subscription per session
//!
//! A trigger on `profiles` (see schema.sql) emits the new balance on the
//! `credits_{user_id}` channel whenever the credits column changes. Each
//! authenticated session holds one subscription for its lifetime; every
//! notification overwrites the session's mirrored balance. The feed is a
//! scoped resource: dropping it (logout, account switch, session
//! replacement) aborts the listener task so no subscription leaks.

use std::sync::Arc;

use sqlx::PgPool;
use sqlx::postgres::PgListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::session::Session;

/// Handle to a running credit subscription. Aborts the task on drop.
pub struct CreditFeed {
    handle: JoinHandle<()>,
}

impl Drop for CreditFeed {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
impl CreditFeed {
    /// Feed handle with no listener behind it
    pub(crate) fn idle() -> Self {
        Self {
            handle: tokio::spawn(std::future::pending::<()>()),
        }
    }
}

/// Notification channel carrying balance updates for one profile row
pub fn channel_name(user_id: &str) -> String {
    format!("credits_{}", user_id)
}

/// Open the per-user credit subscription and start forwarding balance
/// updates into the session. Must not be called for demo sessions.
pub async fn subscribe(
    db: &PgPool,
    user_id: &str,
    session: Arc<RwLock<Session>>,
) -> Result<CreditFeed, sqlx::Error> {
    let mut listener = PgListener::connect_with(db).await?;
    listener.listen(&channel_name(user_id)).await?;

    let user_id = user_id.to_string();
    let handle = tokio::spawn(async move {
        loop {
            match listener.recv().await {
                Ok(notification) => match notification.payload().parse::<i64>() {
                    Ok(credits) => {
                        session.write().await.ledger.apply_remote(credits);
                    }
                    Err(_) => {
                        eprintln!(
                            "[realtime] Ignoring non-numeric credit payload {:?} for user {}",
                            notification.payload(),
                            user_id
                        );
                    }
                },
                Err(e) => {
                    eprintln!("[realtime] Credit feed for user {} closed: {}", user_id, e);
                    break;
                }
            }
        }
    });

    Ok(CreditFeed { handle })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_name_embeds_user_id() {
        assert_eq!(
            channel_name("9b1deb4d-3b7d-4bad"),
            "credits_9b1deb4d-3b7d-4bad"
        );
    }
}
