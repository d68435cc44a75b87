//! インメモリのセッションストア。
//!
//! ログイン成功時にUUIDのベアラートークンを発行し、TTL経過で失効させる。
//! 失効済みエントリは検証時と発行時に掃除する。

use std::sync::Mutex;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use uuid::Uuid;

struct SessionEntry {
    username: String,
    expires_at: Instant,
}

/// プロセス内セッションテーブル。
pub struct SessionStore {
    ttl: Duration,
    sessions: Mutex<FxHashMap<String, SessionEntry>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(FxHashMap::default()),
        }
    }

    /// 新しいセッションを発行し、トークンを返す。
    pub fn issue(&self, username: &str) -> String {
        let token = Uuid::new_v4().to_string();
        let entry = SessionEntry {
            username: username.to_string(),
            expires_at: Instant::now() + self.ttl,
        };

        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.retain(|_, entry| entry.expires_at > Instant::now());
        sessions.insert(token.clone(), entry);

        token
    }

    /// トークンを検証し、有効ならユーザー名を返す。
    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<String> {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());

        match sessions.get(token) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.username.clone()),
            Some(_) => {
                sessions.remove(token);
                None
            }
            None => None,
        }
    }

    /// セッションを破棄する。存在したかどうかを返す。
    pub fn revoke(&self, token: &str) -> bool {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.remove(token).is_some()
    }

    /// 現在有効なセッション数。
    #[must_use]
    pub fn active_count(&self) -> usize {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions
            .values()
            .filter(|entry| entry.expires_at > Instant::now())
            .count()
    }
}
