//! Online leaderboard
//!
//! Transport is somebody else's job. This module defines the service
//! contract, the panel state the UI shows while a request is in flight, and
//! an in-memory board used offline and in tests.

use serde::{Deserialize, Serialize};

use crate::error::LeaderboardError;
use crate::tuning::LeaderboardConfig;

/// Inline message for any leaderboard failure
pub const GENERIC_ERROR_MESSAGE: &str = "Some error occurred";

/// Maximum number of entries the local board keeps
pub const MAX_LOCAL_ENTRIES: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Descending,
    Ascending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardQuery {
    pub sort: SortOrder,
    pub limit: usize,
}

/// One ranked row (rank is 1-indexed, best score is rank 1)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub rank: usize,
    pub name: String,
    pub score: u32,
}

/// Acknowledgement for a posted score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAck {
    /// Rank achieved, if the score made the board
    pub rank: Option<usize>,
}

/// Leaderboard collaborator
pub trait LeaderboardService {
    fn post(&mut self, name: &str, score: u32) -> Result<PostAck, LeaderboardError>;
    fn fetch(&mut self, query: &LeaderboardQuery) -> Result<Vec<RankedEntry>, LeaderboardError>;
}

/// A request the host should send to the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingRequest {
    Fetch(LeaderboardQuery),
    Post { name: String, score: u32 },
}

/// What the leaderboard panel is showing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PanelStatus {
    #[default]
    Idle,
    /// Placeholder until the service answers
    Loading,
    Ready(Vec<RankedEntry>),
    Failed(String),
}

/// Panel state machine. Never retries on its own: a failed request stays
/// failed until the player asks again.
#[derive(Debug, Clone)]
pub struct LeaderboardPanel {
    config: LeaderboardConfig,
    status: PanelStatus,
    last_ack: Option<PostAck>,
}

impl LeaderboardPanel {
    pub fn new(config: LeaderboardConfig) -> Self {
        Self {
            config,
            status: PanelStatus::Idle,
            last_ack: None,
        }
    }

    pub fn status(&self) -> &PanelStatus {
        &self.status
    }

    pub fn last_ack(&self) -> Option<&PostAck> {
        self.last_ack.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.status == PanelStatus::Loading
    }

    fn begin(&mut self, request: PendingRequest) -> Option<PendingRequest> {
        if self.is_loading() {
            log::debug!("Leaderboard request already in flight");
            return None;
        }
        if !self.config.is_configured() {
            log::warn!("Leaderboard request without board id/endpoint");
            self.status = PanelStatus::Failed(GENERIC_ERROR_MESSAGE.to_string());
            return None;
        }
        self.status = PanelStatus::Loading;
        Some(request)
    }

    /// Ask for the top entries. Returns the request to send, or None if one
    /// is already in flight or the board is not configured.
    pub fn request_fetch(&mut self) -> Option<PendingRequest> {
        let query = LeaderboardQuery {
            sort: SortOrder::Descending,
            limit: self.config.fetch_limit.max(1),
        };
        self.begin(PendingRequest::Fetch(query))
    }

    pub fn request_submit(&mut self, name: &str, score: u32) -> Option<PendingRequest> {
        self.begin(PendingRequest::Post {
            name: name.to_string(),
            score,
        })
    }

    pub fn resolve_fetch(&mut self, result: Result<Vec<RankedEntry>, LeaderboardError>) {
        self.status = match result {
            Ok(entries) => PanelStatus::Ready(entries),
            Err(e) => {
                log::warn!("Leaderboard fetch failed: {}", e);
                PanelStatus::Failed(GENERIC_ERROR_MESSAGE.to_string())
            }
        };
    }

    pub fn resolve_submit(&mut self, result: Result<PostAck, LeaderboardError>) {
        match result {
            Ok(ack) => {
                log::info!("Score posted, rank {:?}", ack.rank);
                self.last_ack = Some(ack);
                self.status = PanelStatus::Idle;
            }
            Err(e) => {
                log::warn!("Leaderboard post failed: {}", e);
                self.status = PanelStatus::Failed(GENERIC_ERROR_MESSAGE.to_string());
            }
        }
    }

    /// Send `request` to `service` and feed the answer back into the panel.
    /// Returns false when the panel ended up showing an error.
    pub fn dispatch(
        &mut self,
        request: PendingRequest,
        service: &mut dyn LeaderboardService,
    ) -> bool {
        match request {
            PendingRequest::Fetch(query) => {
                let result = service.fetch(&query);
                self.resolve_fetch(result);
            }
            PendingRequest::Post { name, score } => {
                let result = service.post(&name, score);
                self.resolve_submit(result);
            }
        }
        !matches!(self.status, PanelStatus::Failed(_))
    }
}

#[derive(Debug, Clone)]
struct LocalEntry {
    name: String,
    score: u32,
}

/// In-memory top-N board
#[derive(Debug, Clone)]
pub struct LocalLeaderboard {
    entries: Vec<LocalEntry>,
    available: bool,
}

impl Default for LocalLeaderboard {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalLeaderboard {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            available: true,
        }
    }

    /// Simulate an outage
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// Check if a score qualifies for the board
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_LOCAL_ENTRIES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_available(&self) -> Result<(), LeaderboardError> {
        if self.available {
            Ok(())
        } else {
            Err(LeaderboardError::Unavailable("local board offline".into()))
        }
    }
}

impl LeaderboardService for LocalLeaderboard {
    fn post(&mut self, name: &str, score: u32) -> Result<PostAck, LeaderboardError> {
        self.check_available()?;
        if name.trim().is_empty() {
            return Err(LeaderboardError::Rejected("empty name".into()));
        }
        if !self.qualifies(score) {
            return Ok(PostAck { rank: None });
        }

        let entry = LocalEntry {
            name: name.trim().to_string(),
            score,
        };
        // Sorted descending; ties keep the earlier entry ahead
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };
        self.entries.truncate(MAX_LOCAL_ENTRIES);
        Ok(PostAck { rank: Some(rank) })
    }

    fn fetch(&mut self, query: &LeaderboardQuery) -> Result<Vec<RankedEntry>, LeaderboardError> {
        self.check_available()?;
        let ranked = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| RankedEntry {
                rank: i + 1,
                name: e.name.clone(),
                score: e.score,
            });
        let mut rows: Vec<RankedEntry> = match query.sort {
            SortOrder::Descending => ranked.collect(),
            SortOrder::Ascending => ranked.rev().collect(),
        };
        rows.truncate(query.limit);
        Ok(rows)
    }
}
