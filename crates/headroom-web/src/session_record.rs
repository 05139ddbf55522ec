#![forbid(unsafe_code)]

//! Deterministic session recording and replay.
//!
//! Provides [`SessionRecorder`] for recording every host input of a page
//! mount, and [`replay`] for re-driving the inputs through a fresh
//! [`ChromeHost`] to verify that visibility checkpoints match exactly.
//!
//! # Design
//!
//! A trace is a flat list of [`TraceRecord`]s:
//!
//! - **Header**: route, viewport width and persisted dismissal at mount.
//! - **Input**: one timestamped [`HostInput`].
//! - **Checkpoint**: FNV-1a checksum of the [`HostSnapshot`] after the
//!   preceding input, chained with every earlier checkpoint.
//! - **Summary**: total checkpoints and the final chain value.
//!
//! # Determinism contract
//!
//! Given identical inputs and the same policy, replay **must** produce
//! identical checkpoints. This holds because the driver never reads a clock:
//! time only moves through the timestamps the inputs carry.
//!
//! # Example
//!
//! ```ignore
//! let host = ChromeHost::new(ChromePolicy::default(), "/", 1280)?;
//! let mut recorder = SessionRecorder::new(host);
//! recorder.apply(HostInput::Scroll { ts_ms: 16, y: 120.0 });
//! recorder.apply(HostInput::Tick { ts_ms: 400 });
//!
//! let trace = recorder.finish();
//! let result = replay(ChromePolicy::default(), &trace)?;
//! assert!(result.ok());
//! ```

use headroom_runtime::{BannerState, ChromePolicy, ChromeTransition, NavState};

use crate::host::{ChromeHost, HostSnapshot};
use crate::{HostError, HostInput};

/// Schema version for session traces.
pub const SCHEMA_VERSION: &str = "headroom-trace-v1";

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

fn fnv1a64_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn fnv1a64_u64(hash: u64, v: u64) -> u64 {
    fnv1a64_bytes(hash, &v.to_le_bytes())
}

fn fnv1a64_pair(prev: u64, next: u64) -> u64 {
    let hash = FNV_OFFSET_BASIS;
    let hash = fnv1a64_u64(hash, prev);
    fnv1a64_u64(hash, next)
}

/// Checksum of one snapshot. Field order is part of the trace format.
#[must_use]
pub fn checksum_snapshot(snap: &HostSnapshot) -> u64 {
    let banner = match snap.chrome.banner {
        BannerState::Shown => 0u8,
        BannerState::ScrollHidden => 1,
        BannerState::Dismissed => 2,
    };
    let navbar = match snap.chrome.navbar {
        NavState::Shown => 0u8,
        NavState::Hidden => 1,
    };
    let flags = [
        banner,
        u8::from(snap.chrome.banner_visible),
        navbar,
        u8::from(snap.simple_navbar),
        u8::from(snap.scroll_to_top),
        u8::from(snap.scrolled),
        u8::from(snap.context.is_landing_route),
        u8::from(snap.context.is_mobile_viewport),
    ];
    let hash = fnv1a64_u64(FNV_OFFSET_BASIS, u64::from(snap.position));
    fnv1a64_bytes(hash, &flags)
}

/// A single record in a session trace.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceRecord {
    /// Session header (must be first).
    Header {
        route: String,
        width_px: u32,
        dismissed: bool,
    },
    /// One host input.
    Input(HostInput),
    /// Visibility checkpoint after the preceding input.
    Checkpoint {
        idx: u64,
        ts_ms: u64,
        transitions: u32,
        checksum: u64,
        checksum_chain: u64,
    },
    /// Trace summary (must be last).
    Summary {
        total_checkpoints: u64,
        final_checksum_chain: u64,
    },
}

/// A complete recorded session trace.
#[derive(Debug, Clone)]
pub struct SessionTrace {
    pub records: Vec<TraceRecord>,
}

impl SessionTrace {
    /// Number of checkpoints in the trace.
    #[must_use]
    pub fn checkpoint_count(&self) -> u64 {
        self.records
            .iter()
            .filter(|r| matches!(r, TraceRecord::Checkpoint { .. }))
            .count() as u64
    }

    /// Extract the final checksum chain from the summary record.
    #[must_use]
    pub fn final_checksum_chain(&self) -> Option<u64> {
        self.records.iter().rev().find_map(|r| match r {
            TraceRecord::Summary {
                final_checksum_chain,
                ..
            } => Some(*final_checksum_chain),
            _ => None,
        })
    }

    /// Recorded inputs, in order.
    pub fn inputs(&self) -> impl Iterator<Item = &HostInput> + '_ {
        self.records.iter().filter_map(|r| match r {
            TraceRecord::Input(input) => Some(input),
            _ => None,
        })
    }
}

/// Records a page mount for deterministic replay.
///
/// Wraps a freshly mounted [`ChromeHost`] and records each input together
/// with a checkpoint of the resulting snapshot.
#[derive(Debug)]
pub struct SessionRecorder {
    host: ChromeHost,
    records: Vec<TraceRecord>,
    checksum_chain: u64,
    checkpoints: u64,
}

impl SessionRecorder {
    /// Start recording; writes the header and the mount checkpoint.
    #[must_use]
    pub fn new(host: ChromeHost) -> Self {
        let records = vec![TraceRecord::Header {
            route: host.route().to_owned(),
            width_px: host.width_px(),
            dismissed: host.snapshot().chrome.banner == BannerState::Dismissed,
        }];
        let mut recorder = Self {
            host,
            records,
            checksum_chain: 0,
            checkpoints: 0,
        };
        recorder.record_checkpoint(0, 0);
        recorder
    }

    /// Record and apply one input.
    pub fn apply(&mut self, input: HostInput) -> Vec<ChromeTransition> {
        let ts_ms = input.ts_ms();
        let applied = self.host.apply(&input);
        self.records.push(TraceRecord::Input(input));
        self.record_checkpoint(ts_ms, applied.len());
        applied
    }

    /// Finish recording and return the completed trace.
    #[must_use]
    pub fn finish(mut self) -> SessionTrace {
        self.records.push(TraceRecord::Summary {
            total_checkpoints: self.checkpoints,
            final_checksum_chain: self.checksum_chain,
        });
        SessionTrace {
            records: std::mem::take(&mut self.records),
        }
    }

    /// Access the underlying host.
    #[must_use]
    pub const fn host(&self) -> &ChromeHost {
        &self.host
    }

    fn record_checkpoint(&mut self, ts_ms: u64, transitions: usize) {
        let checksum = checksum_snapshot(&self.host.snapshot());
        let chain = fnv1a64_pair(self.checksum_chain, checksum);
        self.records.push(TraceRecord::Checkpoint {
            idx: self.checkpoints,
            ts_ms,
            transitions: u32::try_from(transitions).unwrap_or(u32::MAX),
            checksum,
            checksum_chain: chain,
        });
        self.checksum_chain = chain;
        self.checkpoints += 1;
    }
}

/// Result of replaying a session trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayResult {
    /// Total checkpoints replayed.
    pub total_checkpoints: u64,
    /// Final checksum chain from replay.
    pub final_checksum_chain: u64,
    /// First checkpoint where a checksum mismatch was detected, if any.
    pub first_mismatch: Option<ReplayMismatch>,
}

impl ReplayResult {
    /// Whether the replay produced identical checksums.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.first_mismatch.is_none()
    }
}

/// Description of a checksum mismatch during replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayMismatch {
    /// Checkpoint index where the mismatch occurred.
    pub idx: u64,
    /// Expected checksum from the trace.
    pub expected: u64,
    /// Actual checksum from replay.
    pub actual: u64,
}

/// Errors that can occur during replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// The trace is missing a header record.
    MissingHeader,
    /// The host could not be mounted.
    Host(HostError),
}

impl core::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "trace missing header record"),
            Self::Host(e) => write!(f, "host error: {e}"),
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MissingHeader => None,
            Self::Host(e) => Some(e),
        }
    }
}

impl From<HostError> for ReplayError {
    fn from(e: HostError) -> Self {
        Self::Host(e)
    }
}

/// Replay a recorded session trace through a fresh host.
///
/// Inputs are applied in order; every checkpoint record is compared with a
/// checksum of the replayed snapshot at the same point.
pub fn replay(policy: ChromePolicy, trace: &SessionTrace) -> Result<ReplayResult, ReplayError> {
    let (route, width_px, dismissed) = trace
        .records
        .first()
        .and_then(|r| match r {
            TraceRecord::Header {
                route,
                width_px,
                dismissed,
            } => Some((route.as_str(), *width_px, *dismissed)),
            _ => None,
        })
        .ok_or(ReplayError::MissingHeader)?;

    let mut host = ChromeHost::new(policy, route, width_px)?;
    if dismissed {
        host = host.with_persisted_dismissal();
    }

    let mut replayed: u64 = 0;
    let mut checksum_chain: u64 = 0;
    let mut first_mismatch: Option<ReplayMismatch> = None;

    for record in &trace.records {
        match record {
            TraceRecord::Input(input) => {
                host.apply(input);
            }
            TraceRecord::Checkpoint {
                idx,
                checksum: expected,
                ..
            } => {
                let actual = checksum_snapshot(&host.snapshot());
                checksum_chain = fnv1a64_pair(checksum_chain, actual);
                if actual != *expected && first_mismatch.is_none() {
                    tracing::warn!(idx, expected, actual, "replay checkpoint mismatch");
                    first_mismatch = Some(ReplayMismatch {
                        idx: *idx,
                        expected: *expected,
                        actual,
                    });
                }
                replayed += 1;
            }
            TraceRecord::Header { .. } | TraceRecord::Summary { .. } => {}
        }
    }

    Ok(ReplayResult {
        total_checkpoints: replayed,
        final_checksum_chain: checksum_chain,
        first_mismatch,
    })
}
