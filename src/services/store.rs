use crate::core::uniform_index;
use crate::models::{Member, MemberPreferences, SessionState, SwipeValue};
use chrono::Utc;
use moka::future::{Cache, CacheBuilder};
use rand_core::{OsRng, RngCore};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

/// Attempts at drawing an unused session code before giving up
const CODE_ATTEMPTS: usize = 16;

/// Errors that can occur with session store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Member {member_id} is not part of session {code}")]
    MemberNotFound { code: String, member_id: String },

    #[error("Could not allocate a free session code")]
    CodesExhausted,
}

/// One session behind its own lock
type SessionHandle = Arc<Mutex<SessionState>>;

/// Local session store
///
/// Sessions live in a bounded in-memory cache and expire after a period
/// without access. Each session carries its own lock, so writes to one
/// session are serialized (last write wins) while other sessions proceed
/// independently.
///
/// Preferences are also remembered by member name, so someone joining a
/// later session under the same name starts from their previous choices.
pub struct SessionStore {
    sessions: Cache<String, SessionHandle>,
    saved_preferences: Cache<String, MemberPreferences>,
}

impl SessionStore {
    /// Create a new session store
    pub fn new(max_sessions: u64, idle_ttl_secs: u64) -> Self {
        let sessions = CacheBuilder::new(max_sessions)
            .time_to_idle(Duration::from_secs(idle_ttl_secs))
            .build();
        let saved_preferences = CacheBuilder::new(max_sessions)
            .time_to_idle(Duration::from_secs(idle_ttl_secs))
            .build();

        Self {
            sessions,
            saved_preferences,
        }
    }

    /// Snapshot of a session
    pub async fn get(&self, code: &str) -> Result<SessionState, StoreError> {
        let handle = self.handle(code).await?;
        let session = handle.lock().await.clone();
        Ok(session)
    }

    /// Open a session with its first member
    ///
    /// Blank names fall back to [`SessionState::DEFAULT_NAME`] and the first
    /// placeholder member name.
    pub async fn create_session(
        &self,
        name: Option<&str>,
        member_name: Option<&str>,
    ) -> Result<(SessionState, Member), StoreError> {
        let name = given_name(name).unwrap_or_else(|| SessionState::DEFAULT_NAME.to_string());
        let member = new_member(given_name(member_name).unwrap_or_else(|| Member::default_name(0)));

        let mut session = SessionState {
            code: String::new(),
            name,
            created_at: Utc::now(),
            members: vec![member.clone()],
            preferences: HashMap::new(),
            swipes: HashMap::new(),
        };
        if let Some(prefs) = self.saved_preferences.get(&member.name).await {
            session.preferences.insert(member.id.clone(), prefs);
        }

        for _ in 0..CODE_ATTEMPTS {
            session.code = generate_session_code(&mut OsRng);
            let handle = Arc::new(Mutex::new(session.clone()));

            // Insert-if-absent, so two creators never share a code
            let entry = self.sessions.entry(session.code.clone()).or_insert(handle).await;
            if entry.is_fresh() {
                tracing::info!("Created session {} for {}", session.code, member.name);
                return Ok((session, member));
            }
        }

        Err(StoreError::CodesExhausted)
    }

    /// Add a member to an existing session
    ///
    /// A blank name becomes the placeholder for the member's join position.
    pub async fn join_session(
        &self,
        code: &str,
        member_name: Option<&str>,
    ) -> Result<(SessionState, Member), StoreError> {
        let handle = self.handle(code).await?;
        let mut session = handle.lock().await;

        let name = given_name(member_name)
            .unwrap_or_else(|| Member::default_name(session.member_count()));
        let member = new_member(name);

        session.members.push(member.clone());
        if let Some(prefs) = self.saved_preferences.get(&member.name).await {
            tracing::debug!("Restored saved preferences for {}", member.name);
            session.preferences.insert(member.id.clone(), prefs);
        }

        tracing::info!("{} joined session {} ({} members)", member.name, code, session.member_count());
        Ok((session.clone(), member))
    }

    /// Replace a member's preferences and remember them under the member's name
    pub async fn save_preferences(
        &self,
        code: &str,
        member_id: &str,
        prefs: MemberPreferences,
    ) -> Result<SessionState, StoreError> {
        let remembered = prefs.clone();
        let session = self
            .update(code, |session| {
                ensure_member(session, member_id)?;
                session.preferences.insert(member_id.to_string(), prefs);
                Ok(())
            })
            .await?;

        if let Some(member) = session.member(member_id) {
            self.saved_preferences.insert(member.name.clone(), remembered).await;
        }

        Ok(session)
    }

    /// Preferences last saved by a member with this name, in any session
    pub async fn saved_preferences(&self, member_name: &str) -> Option<MemberPreferences> {
        self.saved_preferences.get(member_name).await
    }

    /// Record a swipe, overwriting any earlier vote on the same restaurant
    pub async fn save_swipe(
        &self,
        code: &str,
        member_id: &str,
        restaurant_id: &str,
        value: SwipeValue,
    ) -> Result<SessionState, StoreError> {
        self.update(code, |session| {
            ensure_member(session, member_id)?;
            session
                .swipes
                .entry(member_id.to_string())
                .or_default()
                .insert(restaurant_id.to_string(), value);
            Ok(())
        })
        .await
    }

    /// Number of live sessions
    pub fn session_count(&self) -> u64 {
        self.sessions.entry_count()
    }

    async fn handle(&self, code: &str) -> Result<SessionHandle, StoreError> {
        match self.sessions.get(code).await {
            Some(handle) => {
                tracing::trace!("Session hit: {}", code);
                Ok(handle)
            }
            None => Err(StoreError::SessionNotFound(code.to_string())),
        }
    }

    /// Read-modify-write one session under its lock; a failed change leaves
    /// the session untouched
    async fn update<F>(&self, code: &str, apply: F) -> Result<SessionState, StoreError>
    where
        F: FnOnce(&mut SessionState) -> Result<(), StoreError>,
    {
        let handle = self.handle(code).await?;
        let mut session = handle.lock().await;

        let mut next = session.clone();
        apply(&mut next)?;
        *session = next.clone();

        tracing::trace!("Session updated: {}", code);
        Ok(next)
    }
}

fn ensure_member(session: &SessionState, member_id: &str) -> Result<(), StoreError> {
    match session.member(member_id) {
        Some(_) => Ok(()),
        None => Err(StoreError::MemberNotFound {
            code: session.code.clone(),
            member_id: member_id.to_string(),
        }),
    }
}

/// Trimmed name, or `None` when blank
fn given_name(name: Option<&str>) -> Option<String> {
    name.map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

fn new_member(name: String) -> Member {
    Member {
        id: uuid::Uuid::new_v4().to_string(),
        name,
        joined_at: Utc::now(),
    }
}

/// Six digit session code, uniform over 100000..=999999
pub fn generate_session_code<R: RngCore + ?Sized>(rng: &mut R) -> String {
    (100_000 + uniform_index(rng, 900_000)).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cuisine, PreferenceChoice};
    use rand_core::{impls, Error};

    /// Always returns the same value
    struct FixedRng(u64);

    impl RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            self.0 as u32
        }

        fn next_u64(&mut self) -> u64 {
            self.0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            impls::fill_bytes_via_next(self, dest)
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    fn store() -> SessionStore {
        SessionStore::new(100, 60)
    }

    #[test]
    fn test_session_code_shape() {
        for _ in 0..50 {
            let code = generate_session_code(&mut OsRng);
            assert_eq!(code.len(), 6);
            let value: u32 = code.parse().unwrap();
            assert!((100_000..=999_999).contains(&value));
        }
    }

    #[test]
    fn test_session_code_bounds() {
        assert_eq!(generate_session_code(&mut FixedRng(0)), "100000");
        assert_eq!(generate_session_code(&mut FixedRng(899_999)), "999999");
        assert_eq!(generate_session_code(&mut FixedRng(900_000)), "100000");
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = store();
        let (session, member) = store
            .create_session(Some("Friday lunch"), Some("User A"))
            .await
            .unwrap();

        let loaded = store.get(&session.code).await.unwrap();

        assert_eq!(loaded.name, "Friday lunch");
        assert_eq!(loaded.members, vec![member]);
        assert_eq!(store.session_count(), 1);
    }

    #[tokio::test]
    async fn test_create_with_blank_names_uses_defaults() {
        let store = store();
        let (session, member) = store.create_session(Some("   "), None).await.unwrap();

        assert_eq!(session.name, "Tonight's crew");
        assert_eq!(member.name, "User A");
    }

    #[tokio::test]
    async fn test_join_defaults_to_next_placeholder() {
        let store = store();
        let (session, _) = store.create_session(None, None).await.unwrap();

        let (_, second) = store.join_session(&session.code, None).await.unwrap();
        let (_, third) = store.join_session(&session.code, Some("")).await.unwrap();
        let (updated, named) = store.join_session(&session.code, Some(" Dana ")).await.unwrap();

        assert_eq!(second.name, "User B");
        assert_eq!(third.name, "User C");
        assert_eq!(named.name, "Dana");
        assert_eq!(updated.member_count(), 4);
    }

    #[tokio::test]
    async fn test_join_appends_member() {
        let store = store();
        let (session, _) = store.create_session(Some("Dinner"), Some("User A")).await.unwrap();

        let (updated, member) = store.join_session(&session.code, Some("User B")).await.unwrap();

        assert_eq!(updated.member_count(), 2);
        assert_eq!(updated.members[1], member);
    }

    #[tokio::test]
    async fn test_join_unknown_session() {
        let result = store().join_session("000000", Some("User B")).await;
        assert!(matches!(result, Err(StoreError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn test_save_preferences_and_swipes() {
        let store = store();
        let (session, member) = store.create_session(Some("Dinner"), Some("User A")).await.unwrap();

        let mut prefs = MemberPreferences::default();
        prefs.cuisine.set(Cuisine::Thai, PreferenceChoice::Yes);
        store
            .save_preferences(&session.code, &member.id, prefs.clone())
            .await
            .unwrap();

        store
            .save_swipe(&session.code, &member.id, "d1", SwipeValue::Like)
            .await
            .unwrap();
        let updated = store
            .save_swipe(&session.code, &member.id, "d1", SwipeValue::Dislike)
            .await
            .unwrap();

        assert_eq!(updated.preferences_for(&member.id), Some(&prefs));
        assert_eq!(updated.swipes[&member.id]["d1"], SwipeValue::Dislike);
        assert_eq!(updated.swipes[&member.id].len(), 1);
    }

    #[tokio::test]
    async fn test_saved_preferences_follow_member_name() {
        let store = store();
        let (first, member) = store.create_session(Some("Lunch"), Some("Sam")).await.unwrap();

        let mut prefs = MemberPreferences::default();
        prefs.cuisine.set(Cuisine::Korean, PreferenceChoice::Yes);
        store
            .save_preferences(&first.code, &member.id, prefs.clone())
            .await
            .unwrap();
        assert_eq!(store.saved_preferences("Sam").await, Some(prefs.clone()));

        // Same name in another session starts from the saved choices
        let (second, _) = store.create_session(Some("Dinner"), Some("Alex")).await.unwrap();
        let (joined, sam) = store.join_session(&second.code, Some("Sam")).await.unwrap();
        assert_eq!(joined.preferences_for(&sam.id), Some(&prefs));

        let (created, creator) = store.create_session(None, Some("Sam")).await.unwrap();
        assert_eq!(created.preferences_for(&creator.id), Some(&prefs));

        let (_, stranger) = store.join_session(&second.code, Some("Kim")).await.unwrap();
        let latest = store.get(&second.code).await.unwrap();
        assert_eq!(latest.preferences_for(&stranger.id), None);
    }

    #[tokio::test]
    async fn test_swipe_from_stranger_rejected() {
        let store = store();
        let (session, _) = store.create_session(Some("Dinner"), Some("User A")).await.unwrap();

        let result = store
            .save_swipe(&session.code, "stranger", "d1", SwipeValue::Like)
            .await;

        assert!(matches!(result, Err(StoreError::MemberNotFound { .. })));
        assert!(store.get(&session.code).await.unwrap().swipes.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_swipes_all_land() {
        let store = Arc::new(store());
        let (session, member) = store.create_session(None, None).await.unwrap();

        let writes: Vec<_> = (0..20)
            .map(|i| {
                let store = Arc::clone(&store);
                let code = session.code.clone();
                let member_id = member.id.clone();
                tokio::spawn(async move {
                    store
                        .save_swipe(&code, &member_id, &format!("d{}", i), SwipeValue::Like)
                        .await
                })
            })
            .collect();
        for write in writes {
            write.await.unwrap().unwrap();
        }

        let loaded = store.get(&session.code).await.unwrap();
        assert_eq!(loaded.swipes[&member.id].len(), 20);
    }

    #[tokio::test]
    async fn test_busy_session_does_not_block_others() {
        let store = store();
        let (busy, _) = store.create_session(Some("Busy"), None).await.unwrap();
        let (other, member) = store.create_session(Some("Other"), None).await.unwrap();

        let handle = store.handle(&busy.code).await.unwrap();
        let _held = handle.lock().await;

        let write = store.save_swipe(&other.code, &member.id, "d1", SwipeValue::Like);
        let result = tokio::time::timeout(Duration::from_secs(1), write).await;

        assert!(matches!(result, Ok(Ok(_))));
    }
}
