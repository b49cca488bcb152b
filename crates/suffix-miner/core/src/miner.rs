//! Suffix mining over the priority-fee field.
//!
//! Starting from `v0`, the miner sets `gas_tip_cap` to `v0, v0 + 1, ...`,
//! hashes the envelope and looks at the low nibble of the last hash byte. The
//! first candidate to produce a nibble owns that slot; later candidates never
//! overwrite it. The search ends when all 16 slots are filled or a
//! [`SearchBound`] is hit.

use crate::{
    encoding::{
        CanonicalEncoder,
        TipTemplate,
    },
    envelope::{
        BlobTxEnvelope,
        EncodingForm,
    },
    error::{
        MiningError,
        MiningTimeout,
        SearchLimit,
    },
};
use alloy_primitives::{
    B256,
    U256,
};
use std::time::{
    Duration,
    Instant,
};
use tokio_util::sync::CancellationToken;
use tracing::{
    debug,
    trace,
};

/// Number of distinct low nibbles.
pub const NIBBLE_COUNT: usize = 16;

/// Low 4 bits of the final hash byte.
#[inline]
pub fn suffix_nibble(hash: &B256) -> u8 {
    hash[31] & 0x0f
}

/// Ceilings on one search. `None` means unbounded on that axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchBound {
    pub max_iterations: Option<u64>,
    pub max_duration: Option<Duration>,
}

impl SearchBound {
    pub const fn unbounded() -> Self {
        Self {
            max_iterations: None,
            max_duration: None,
        }
    }

    pub const fn iterations(max: u64) -> Self {
        Self {
            max_iterations: Some(max),
            max_duration: None,
        }
    }

    pub const fn with_max_duration(mut self, max: Duration) -> Self {
        self.max_duration = Some(max);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct MinerConfig {
    pub bound: SearchBound,
    cancel: Option<CancellationToken>,
}

impl MinerConfig {
    pub fn new(bound: SearchBound) -> Self {
        Self {
            bound,
            cancel: None,
        }
    }

    /// Stop searches early once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

/// The candidate that first produced a nibble, and the hash it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NibbleHit {
    pub candidate: U256,
    pub hash: B256,
}

/// Nibble value to first hit. Slots are write-once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NibbleMap {
    slots: [Option<NibbleHit>; NIBBLE_COUNT],
    filled: usize,
}

impl NibbleMap {
    /// Record `hit` under `nibble` unless the slot is taken. Returns whether it
    /// was recorded.
    pub fn record(&mut self, nibble: u8, hit: NibbleHit) -> bool {
        let slot = &mut self.slots[usize::from(nibble & 0x0f)];
        if slot.is_some() {
            return false;
        }
        *slot = Some(hit);
        self.filled += 1;
        true
    }

    pub fn get(&self, nibble: u8) -> Option<&NibbleHit> {
        self.slots.get(usize::from(nibble))?.as_ref()
    }

    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    pub fn is_complete(&self) -> bool {
        self.filled == NIBBLE_COUNT
    }

    /// Slots ordered by nibble, 0 through 15.
    pub fn slots(&self) -> &[Option<NibbleHit>; NIBBLE_COUNT] {
        &self.slots
    }

    /// Filled `(nibble, hit)` pairs ordered by nibble.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &NibbleHit)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(nibble, hit)| hit.as_ref().map(|hit| (nibble as u8, hit)))
    }

    /// The 16 hashes ordered by nibble, if every slot is filled.
    pub fn ordered_hashes(&self) -> Option<[B256; NIBBLE_COUNT]> {
        let mut hashes = [B256::ZERO; NIBBLE_COUNT];
        for (out, slot) in hashes.iter_mut().zip(&self.slots) {
            *out = slot.as_ref()?.hash;
        }
        Some(hashes)
    }
}

/// Outcome of one search, complete or partial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinedSuffixes {
    pub start: U256,
    pub nibbles: NibbleMap,
    /// Candidates evaluated.
    pub iterations: u64,
    pub elapsed: Duration,
}

impl MinedSuffixes {
    pub fn is_complete(&self) -> bool {
        self.nibbles.is_complete()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SuffixMiner {
    config: MinerConfig,
}

impl SuffixMiner {
    pub fn new(config: MinerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MinerConfig {
        &self.config
    }

    /// Search tip values upward from `start` until all 16 nibbles are found.
    ///
    /// `envelope.gas_tip_cap` is overwritten per candidate and restored to its
    /// value on entry before returning.
    pub fn mine(
        &self,
        envelope: &mut BlobTxEnvelope,
        start: U256,
    ) -> Result<MinedSuffixes, MiningError> {
        let original_tip = envelope.gas_tip_cap;
        let result = self.search(envelope, start);
        envelope.gas_tip_cap = original_tip;
        result
    }

    fn search(
        &self,
        envelope: &mut BlobTxEnvelope,
        start: U256,
    ) -> Result<MinedSuffixes, MiningError> {
        let bound = self.config.bound;
        let started = Instant::now();
        let template = TipTemplate::new(envelope, EncodingForm::Identity)?;
        let mut encoder = CanonicalEncoder::new();
        let mut nibbles = NibbleMap::default();
        let mut iterations: u64 = 0;
        let mut candidate = Some(start);

        let partial = |nibbles: NibbleMap, iterations: u64| MinedSuffixes {
            start,
            nibbles,
            iterations,
            elapsed: started.elapsed(),
        };

        while let Some(value) = candidate {
            if self.config.is_cancelled() {
                return Err(MiningError::Cancelled(partial(nibbles, iterations)));
            }

            envelope.gas_tip_cap = value;
            let hash = encoder.hash_with_tip(&template, envelope.gas_tip_cap);
            iterations += 1;

            let nibble = suffix_nibble(&hash);
            if nibbles.record(
                nibble,
                NibbleHit {
                    candidate: value,
                    hash,
                },
            ) {
                trace!(target: "suffix_miner::miner", nibble, %value, %hash, "nibble found");
            }

            if nibbles.is_complete() {
                let mined = partial(nibbles, iterations);
                debug!(
                    target: "suffix_miner::miner",
                    %start,
                    iterations,
                    elapsed_us = mined.elapsed.as_micros(),
                    "all suffixes found"
                );
                return Ok(mined);
            }

            if let Some(max) = bound.max_iterations {
                if iterations >= max {
                    return Err(MiningTimeout {
                        limit: SearchLimit::Iterations(max),
                        partial: partial(nibbles, iterations),
                    }
                    .into());
                }
            }
            if let Some(max) = bound.max_duration {
                if started.elapsed() >= max {
                    return Err(MiningTimeout {
                        limit: SearchLimit::Duration(max),
                        partial: partial(nibbles, iterations),
                    }
                    .into());
                }
            }

            candidate = value.checked_add(U256::from(1));
        }

        Err(MiningTimeout {
            limit: SearchLimit::CandidateSpace,
            partial: partial(nibbles, iterations),
        }
        .into())
    }
}
