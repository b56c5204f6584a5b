//! The session registry: the shared table of logged-in users.
//!
//! This is the only state that many connection handlers mutate
//! concurrently. It is responsible for:
//! - Enforcing nickname uniqueness at handshake time
//! - Resolving a nickname to a session for direct messages
//! - Listing who is online, in the order they logged in
//! - Forgetting a session when it disconnects
//!
//! # Concurrency note
//!
//! One registry-wide lock guards both the nickname map and the ordering,
//! so every operation observes a fully applied register/unregister. Lock
//! order is always registry → session; the registry lock is never held
//! across an `.await`.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{Session, SessionError, SessionState};

/// Table of authenticated sessions keyed by nickname.
///
/// ## Lifecycle
///
/// ```text
/// new Session ──→ register() ──→ lookup() / snapshot() ──→ unregister()
///                     │                                       │
///                     ▼                                       ▼
///              [Authenticated]                        (nickname free again)
/// ```
#[derive(Debug, Default)]
pub struct SessionRegistry {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    by_nickname: HashMap<String, Arc<Session>>,
    /// Nicknames in registration order; always the same set as the keys
    /// of `by_nickname`.
    order: Vec<String>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs `session` in as `nickname`.
    ///
    /// The checks and the insert happen under one lock, so of any number
    /// of concurrent callers with the same nickname exactly one succeeds.
    /// On success the session becomes `Authenticated`.
    ///
    /// # Errors
    /// - [`SessionError::EmptyNickname`]: `nickname` is empty
    /// - [`SessionError::NicknameTaken`]: another live session holds it
    /// - [`SessionError::AlreadyAuthenticated`]: the session is logged in
    /// - [`SessionError::Terminated`]: the session has disconnected
    ///
    /// Nothing changes on error.
    pub fn register(
        &self,
        session: &Arc<Session>,
        nickname: &str,
    ) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();

        match session.state() {
            SessionState::Terminated => {
                return Err(SessionError::Terminated(session.id()));
            }
            SessionState::Authenticated => {
                return Err(SessionError::AlreadyAuthenticated(session.id()));
            }
            SessionState::Unauthenticated => {}
        }
        if nickname.is_empty() {
            return Err(SessionError::EmptyNickname);
        }
        if inner.by_nickname.contains_key(nickname) {
            return Err(SessionError::NicknameTaken(nickname.to_owned()));
        }

        inner
            .by_nickname
            .insert(nickname.to_owned(), Arc::clone(session));
        inner.order.push(nickname.to_owned());
        session.set_authenticated(nickname);

        tracing::info!(
            session_id = %session.id(),
            nickname,
            online = inner.order.len(),
            "nickname registered"
        );
        Ok(())
    }

    /// Removes `session`'s nickname entry.
    ///
    /// Idempotent: returns `false` without changing anything if the
    /// session was never registered, was already removed, or its nickname
    /// now belongs to a different session.
    pub fn unregister(&self, session: &Session) -> bool {
        let mut inner = self.inner.lock();

        let Some(nickname) = session.nickname() else {
            return false;
        };
        let owned = inner
            .by_nickname
            .get(&nickname)
            .is_some_and(|current| current.id() == session.id());
        if !owned {
            return false;
        }

        inner.by_nickname.remove(&nickname);
        inner.order.retain(|n| *n != nickname);

        tracing::info!(
            session_id = %session.id(),
            %nickname,
            online = inner.order.len(),
            "nickname unregistered"
        );
        true
    }

    /// Returns the live session currently registered as `nickname`.
    pub fn lookup(&self, nickname: &str) -> Option<Arc<Session>> {
        self.inner
            .lock()
            .by_nickname
            .get(nickname)
            .filter(|session| !session.is_terminated())
            .cloned()
    }

    /// All registered nicknames, in registration order.
    pub fn snapshot(&self) -> Vec<String> {
        self.inner.lock().order.clone()
    }

    /// All registered sessions, in registration order.
    ///
    /// Taken under one lock, so a broadcast addresses a consistent set.
    pub fn sessions(&self) -> Vec<Arc<Session>> {
        let inner = self.inner.lock();
        inner
            .order
            .iter()
            .filter_map(|nickname| inner.by_nickname.get(nickname))
            .cloned()
            .collect()
    }

    /// Number of registered sessions.
    pub fn len(&self) -> usize {
        self.inner.lock().order.len()
    }

    /// Returns `true` if nobody is logged in.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().order.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `SessionRegistry`.
    //!
    //! Naming convention: `test_{function}_{scenario}_{expected}`.

    use std::sync::Barrier;

    use super::*;
    use crate::SessionId;

    // -- Helpers ----------------------------------------------------------

    /// Shorthand for a fresh unauthenticated session.
    fn session(id: u64) -> Arc<Session> {
        Arc::new(Session::new(SessionId(id)))
    }

    // =====================================================================
    // register()
    // =====================================================================

    #[test]
    fn test_register_new_nickname_authenticates_session() {
        let registry = SessionRegistry::new();
        let s = session(1);

        registry.register(&s, "x").expect("should succeed");

        assert_eq!(s.state(), SessionState::Authenticated);
        assert_eq!(s.nickname().as_deref(), Some("x"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_taken_nickname_from_other_session_fails() {
        let registry = SessionRegistry::new();
        let first = session(1);
        let second = session(2);
        registry.register(&first, "x").unwrap();

        let result = registry.register(&second, "x");

        assert!(
            matches!(result, Err(SessionError::NicknameTaken(ref n)) if n == "x")
        );
        assert_eq!(second.state(), SessionState::Unauthenticated);
        assert_eq!(second.nickname(), None);
        assert_eq!(registry.snapshot(), vec!["x"]);
    }

    #[test]
    fn test_register_empty_nickname_fails() {
        let registry = SessionRegistry::new();
        let s = session(1);

        let result = registry.register(&s, "");

        assert!(matches!(result, Err(SessionError::EmptyNickname)));
        assert!(registry.is_empty());
        assert_eq!(s.state(), SessionState::Unauthenticated);
    }

    #[test]
    fn test_register_twice_same_session_fails() {
        let registry = SessionRegistry::new();
        let s = session(1);
        registry.register(&s, "x").unwrap();

        let result = registry.register(&s, "y");

        assert!(matches!(
            result,
            Err(SessionError::AlreadyAuthenticated(id)) if id == SessionId(1)
        ));
        assert_eq!(registry.snapshot(), vec!["x"]);
    }

    #[test]
    fn test_register_terminated_session_fails() {
        let registry = SessionRegistry::new();
        let s = session(1);
        s.terminate();

        let result = registry.register(&s, "ghost");

        assert!(matches!(result, Err(SessionError::Terminated(_))));
        assert!(registry.lookup("ghost").is_none());
    }

    #[test]
    fn test_register_is_case_sensitive() {
        let registry = SessionRegistry::new();
        registry.register(&session(1), "Ann").unwrap();

        assert!(registry.register(&session(2), "ann").is_ok());
    }

    #[test]
    fn test_register_concurrent_same_nickname_exactly_one_wins() {
        const CONTENDERS: usize = 16;
        let registry = SessionRegistry::new();
        let barrier = Barrier::new(CONTENDERS);
        let sessions: Vec<_> =
            (0..CONTENDERS as u64).map(session).collect();

        let wins: usize = std::thread::scope(|s| {
            let handles: Vec<_> = sessions
                .iter()
                .map(|sess| {
                    let registry = &registry;
                    let barrier = &barrier;
                    s.spawn(move || {
                        barrier.wait();
                        registry.register(sess, "x").is_ok()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap() as usize)
                .sum()
        });

        assert_eq!(wins, 1);
        assert_eq!(registry.snapshot(), vec!["x"]);
        let authenticated = sessions
            .iter()
            .filter(|s| s.is_authenticated())
            .count();
        assert_eq!(authenticated, 1);
    }

    // =====================================================================
    // unregister()
    // =====================================================================

    #[test]
    fn test_unregister_frees_nickname() {
        let registry = SessionRegistry::new();
        let s = session(1);
        registry.register(&s, "x").unwrap();

        assert!(registry.unregister(&s));

        assert!(registry.lookup("x").is_none());
        assert!(registry.register(&session(2), "x").is_ok());
    }

    #[test]
    fn test_unregister_twice_is_noop() {
        let registry = SessionRegistry::new();
        let a = session(1);
        let b = session(2);
        registry.register(&a, "a").unwrap();
        registry.register(&b, "b").unwrap();

        assert!(registry.unregister(&a));
        let after_first = registry.snapshot();
        assert!(!registry.unregister(&a));

        assert_eq!(registry.snapshot(), after_first);
        assert_eq!(after_first, vec!["b"]);
    }

    #[test]
    fn test_unregister_never_registered_is_noop() {
        let registry = SessionRegistry::new();
        registry.register(&session(1), "a").unwrap();

        assert!(!registry.unregister(&session(2)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_stale_session_keeps_new_owner() {
        // "x" disconnects, someone else takes "x", then the old session's
        // cleanup runs again. The new owner must stay registered.
        let registry = SessionRegistry::new();
        let old = session(1);
        let new = session(2);
        registry.register(&old, "x").unwrap();
        registry.unregister(&old);
        registry.register(&new, "x").unwrap();

        assert!(!registry.unregister(&old));

        let current = registry.lookup("x").expect("new owner remains");
        assert_eq!(current.id(), SessionId(2));
    }

    // =====================================================================
    // lookup() / snapshot() / sessions()
    // =====================================================================

    #[test]
    fn test_lookup_unknown_returns_none() {
        let registry = SessionRegistry::new();
        assert!(registry.lookup("z").is_none());
    }

    #[test]
    fn test_lookup_skips_terminated_session() {
        // A session terminated before its unregister ran must not be
        // handed out as a chat target.
        let registry = SessionRegistry::new();
        let s = session(1);
        registry.register(&s, "x").unwrap();

        s.terminate();

        assert!(registry.lookup("x").is_none());
    }

    #[test]
    fn test_snapshot_is_registration_order() {
        let registry = SessionRegistry::new();
        registry.register(&session(1), "bob").unwrap();
        registry.register(&session(2), "ann").unwrap();
        registry.register(&session(3), "cid").unwrap();

        assert_eq!(registry.snapshot(), vec!["bob", "ann", "cid"]);
    }

    #[test]
    fn test_snapshot_after_removal_keeps_relative_order() {
        let registry = SessionRegistry::new();
        let bob = session(1);
        registry.register(&bob, "bob").unwrap();
        registry.register(&session(2), "ann").unwrap();
        registry.register(&session(3), "cid").unwrap();

        registry.unregister(&bob);
        registry.register(&session(4), "bob").unwrap();

        assert_eq!(registry.snapshot(), vec!["ann", "cid", "bob"]);
    }

    #[test]
    fn test_sessions_matches_snapshot_order() {
        let registry = SessionRegistry::new();
        registry.register(&session(7), "g").unwrap();
        registry.register(&session(3), "c").unwrap();

        let ids: Vec<_> =
            registry.sessions().iter().map(|s| s.id()).collect();

        assert_eq!(ids, vec![SessionId(7), SessionId(3)]);
    }

    #[test]
    fn test_snapshot_under_concurrent_churn_has_no_duplicates() {
        let registry = SessionRegistry::new();
        std::thread::scope(|s| {
            for worker in 0..4u64 {
                let registry = &registry;
                s.spawn(move || {
                    for round in 0..200u64 {
                        let sess = session(worker * 1000 + round);
                        let name = format!("w{worker}");
                        if registry.register(&sess, &name).is_ok() {
                            registry.unregister(&sess);
                        }
                    }
                });
            }
            s.spawn(|| {
                for _ in 0..500 {
                    let snap = registry.snapshot();
                    let mut dedup = snap.clone();
                    dedup.sort();
                    dedup.dedup();
                    assert_eq!(dedup.len(), snap.len());
                    assert!(snap.len() <= 4);
                }
            });
        });

        assert!(registry.is_empty());
    }
}
