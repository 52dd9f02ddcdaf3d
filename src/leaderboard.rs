//! Top-5 leaderboard with offline fallback
//!
//! The remote transport lives behind [`ScoreService`]; [`Leaderboard`] wraps
//! it with a local cached copy so every operation degrades gracefully when
//! the service is unreachable. Transport failures are logged and recovered,
//! never surfaced to the player. On wasm32 the cache persists to
//! LocalStorage.

use serde::{Deserialize, Serialize};

/// Maximum number of leaderboard entries to keep
pub const MAX_LEADERBOARD_ENTRIES: usize = 5;

/// Label used when a score is saved without initials
pub const DEFAULT_INITIALS: &str = "------";

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u32,
    pub initials: String,
}

/// Ordered top-5, sorted descending by score
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "bussi-runner-highscores";

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// True if fewer than 5 entries exist or `score` beats 5th place
    pub fn qualifies(&self, score: u32) -> bool {
        if self.entries.len() < MAX_LEADERBOARD_ENTRIES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Merge a score in, keeping the list sorted descending and at most 5 long
    pub fn insert(&mut self, score: u32, initials: &str) {
        let entry = HighScoreEntry {
            score,
            initials: initials.to_string(),
        };
        let pos = self
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_LEADERBOARD_ENTRIES);
    }

    fn replace_with(&mut self, entries: Vec<HighScoreEntry>) {
        self.entries = entries;
        self.entries.truncate(MAX_LEADERBOARD_ENTRIES);
    }

    /// Load the cached copy from LocalStorage (wasm only)
    #[cfg(target_arch = "wasm32")]
    fn load_cached() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY)
            && let Ok(scores) = serde_json::from_str::<HighScores>(&json)
        {
            log::info!("loaded {} cached scores", scores.entries.len());
            return scores;
        }
        Self::new()
    }

    /// Persist the cached copy to LocalStorage (wasm only)
    #[cfg(target_arch = "wasm32")]
    fn save_cached(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(json) = serde_json::to_string(self)
        {
            let _ = storage.set_item(Self::STORAGE_KEY, &json);
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn load_cached() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn save_cached(&self) {}
}

/// Remote transport failure; always recovered via the local cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Service could not be reached at all
    Unreachable,
    /// Service answered with a non-success status
    Status(u16),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Unreachable => write!(f, "score service unreachable"),
            TransportError::Status(code) => write!(f, "score service returned status {code}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// The external scoring transport
pub trait ScoreService {
    /// Fetch the current top 5, descending
    fn load_top(&mut self) -> Result<Vec<HighScoreEntry>, TransportError>;
    /// Save a score and return the refreshed top 5
    fn save_score(&mut self, score: u32, initials: &str)
    -> Result<Vec<HighScoreEntry>, TransportError>;
    /// Ask whether a score would make the board
    fn qualifies(&mut self, score: u32) -> Result<bool, TransportError>;
}

/// A service that is never reachable; everything falls back to the cache
#[derive(Debug, Default)]
pub struct OfflineService;

impl ScoreService for OfflineService {
    fn load_top(&mut self) -> Result<Vec<HighScoreEntry>, TransportError> {
        Err(TransportError::Unreachable)
    }

    fn save_score(
        &mut self,
        _score: u32,
        _initials: &str,
    ) -> Result<Vec<HighScoreEntry>, TransportError> {
        Err(TransportError::Unreachable)
    }

    fn qualifies(&mut self, _score: u32) -> Result<bool, TransportError> {
        Err(TransportError::Unreachable)
    }
}

/// Leaderboard facade: remote service plus local cache
#[derive(Debug)]
pub struct Leaderboard<S: ScoreService> {
    service: S,
    cache: HighScores,
}

impl<S: ScoreService> Leaderboard<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            cache: HighScores::load_cached(),
        }
    }

    /// Current top 5; cached copy when the service is down
    pub fn load_top(&mut self) -> Vec<HighScoreEntry> {
        match self.service.load_top() {
            Ok(entries) => {
                self.cache.replace_with(entries);
                self.cache.save_cached();
            }
            Err(err) => log::warn!("load_top failed, using cache: {err}"),
        }
        self.cache.entries.clone()
    }

    /// Save a score and return the refreshed top 5. Blank initials fall back
    /// to the default label; transport failure merges into the cache instead.
    pub fn save_score(&mut self, score: u32, initials: &str) -> Vec<HighScoreEntry> {
        let initials = if initials.is_empty() {
            DEFAULT_INITIALS
        } else {
            initials
        };
        match self.service.save_score(score, initials) {
            Ok(entries) => self.cache.replace_with(entries),
            Err(err) => {
                log::warn!("save_score failed, merging into cache: {err}");
                self.cache.insert(score, initials);
            }
        }
        self.cache.save_cached();
        self.cache.entries.clone()
    }

    #[cfg(test)]
    pub(crate) fn service_mut(&mut self) -> &mut S {
        &mut self.service
    }

    /// Would this score make the board? Evaluated locally when offline.
    pub fn qualifies(&mut self, score: u32) -> bool {
        match self.service.qualifies(score) {
            Ok(answer) => answer,
            Err(err) => {
                log::warn!("qualification check failed, evaluating locally: {err}");
                self.cache.qualifies(score)
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeService;
    use super::*;
    use proptest::prelude::*;

    fn full_board() -> HighScores {
        let mut board = HighScores::new();
        for (score, initials) in [(500, "AAA"), (400, "BBB"), (300, "CCC"), (200, "DDD"), (100, "EEE")]
        {
            board.insert(score, initials);
        }
        board
    }

    #[test]
    fn test_first_score_on_empty_board() {
        let mut lb = Leaderboard::new(FakeService::default());
        let top = lb.save_score(120, "AAA");
        assert_eq!(
            top,
            vec![HighScoreEntry {
                score: 120,
                initials: "AAA".to_string()
            }]
        );
    }

    #[test]
    fn test_qualifying_score_appears_sorted() {
        let mut lb = Leaderboard::new(FakeService {
            board: full_board(),
            ..Default::default()
        });
        let top = lb.save_score(350, "ZZZ");
        assert_eq!(top.len(), MAX_LEADERBOARD_ENTRIES);
        assert_eq!(top[2].initials, "ZZZ");
        assert!(top.windows(2).all(|w| w[0].score >= w[1].score));
        // 5th place (100) fell off
        assert!(top.iter().all(|e| e.score > 100));
    }

    #[test]
    fn test_low_score_leaves_full_board_unchanged() {
        let board = full_board();
        let before = board.entries.clone();
        let mut lb = Leaderboard::new(FakeService {
            board,
            ..Default::default()
        });
        assert!(!lb.qualifies(50));
        let top = lb.save_score(50, "ZZZ");
        assert_eq!(top, before);
    }

    #[test]
    fn test_qualifies_with_open_slots() {
        let mut board = HighScores::new();
        board.insert(900, "AAA");
        let mut lb = Leaderboard::new(FakeService {
            board,
            ..Default::default()
        });
        // Fewer than 5 entries: anything makes the board
        assert!(lb.qualifies(0));
    }

    #[test]
    fn test_offline_qualification_uses_cache() {
        let mut lb = Leaderboard::new(FakeService {
            board: full_board(),
            ..Default::default()
        });
        // Warm the cache while the service is up
        lb.load_top();
        lb.service.offline = true;

        assert!(lb.qualifies(999));
        assert!(!lb.qualifies(50));
    }

    #[test]
    fn test_offline_save_merges_into_cache() {
        let mut lb = Leaderboard::new(FakeService {
            board: full_board(),
            ..Default::default()
        });
        lb.load_top();
        lb.service.offline = true;

        let top = lb.save_score(450, "ZZZ");
        assert_eq!(top.len(), MAX_LEADERBOARD_ENTRIES);
        assert_eq!(top[1].initials, "ZZZ");

        // The offline result sticks for subsequent loads
        let top = lb.load_top();
        assert_eq!(top[1].initials, "ZZZ");
    }

    #[test]
    fn test_blank_initials_use_default_label() {
        let mut lb = Leaderboard::new(FakeService::default());
        let top = lb.save_score(10, "");
        assert_eq!(top[0].initials, DEFAULT_INITIALS);
    }

    #[test]
    fn test_successful_load_refreshes_cache() {
        let mut lb = Leaderboard::new(FakeService {
            board: full_board(),
            ..Default::default()
        });
        lb.load_top();
        // Remote board changes behind our back
        lb.service.board.insert(600, "NEW");
        lb.load_top();
        lb.service.offline = true;

        let top = lb.load_top();
        assert_eq!(top[0].initials, "NEW");
    }

    proptest! {
        #[test]
        fn prop_insert_keeps_sorted_and_bounded(scores in prop::collection::vec(0u32..10_000, 0..30)) {
            let mut board = HighScores::new();
            for score in scores {
                board.insert(score, "XYZ");
            }
            prop_assert!(board.entries.len() <= MAX_LEADERBOARD_ENTRIES);
            prop_assert!(board.entries.windows(2).all(|w| w[0].score >= w[1].score));
        }
    }
}
