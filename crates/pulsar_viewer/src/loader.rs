//! Chunked catalog ingestion driven from the event loop.
//!
//! Each [`IncrementalLoader::step`] moves the state machine by one transition
//! and returns control to the caller, so a large catalog never blocks input or
//! rendering for more than one chunk.

use crate::config::VisualConfig;
use crate::data::{PulsarField, PulsarFieldBuilder};
use psrcat::PulsarRecord;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::{Duration, Instant};

/// Share of the progress bar covered by chunk processing.
const PROCESSING_SPAN: f32 = 80.0;
/// Progress once buffers are finalised, before the GPU upload.
const FINALIZED_PROGRESS: f32 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Processing { next_chunk: usize },
    Finalizing,
    Done,
}

/// What a single [`IncrementalLoader::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStep {
    /// Not started yet.
    Idle,
    /// Appended `len` records from chunk `index`.
    Chunk { index: usize, len: usize },
    /// All chunks done; the caller builds the combined point cloud now.
    Finalized,
    Done,
}

pub struct IncrementalLoader {
    phase: LoadPhase,
    /// Catalog indices to ingest, in order.
    queue: Vec<usize>,
    chunk_size: usize,
    chunk_delay: Duration,
    processed: usize,
    progress: f32,
    next_due: Option<Instant>,
    builder: PulsarFieldBuilder,
    rng: StdRng,
}

impl IncrementalLoader {
    /// Prepares a load of `total` catalog records, keeping each with
    /// probability `cfg.pulsar_subsample`.
    pub fn new(total: usize, cfg: &VisualConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(cfg.noise_seed as u64);

        let queue: Vec<usize> = if cfg.pulsar_subsample >= 1.0 {
            (0..total).collect()
        } else {
            let p = cfg.pulsar_subsample.max(0.0);
            (0..total).filter(|_| rng.gen_bool(p)).collect()
        };

        Self {
            phase: LoadPhase::Idle,
            queue,
            chunk_size: cfg.loading_chunk_size.max(1),
            chunk_delay: cfg.loading_chunk_delay,
            processed: 0,
            progress: 0.0,
            next_due: None,
            builder: PulsarFieldBuilder::new(cfg),
            rng,
        }
    }

    pub fn start(&mut self) {
        if self.phase != LoadPhase::Idle {
            return;
        }
        log::info!("Loading {} pulsars in chunks of {}", self.total(), self.chunk_size);
        self.phase = if self.queue.is_empty() {
            LoadPhase::Finalizing
        } else {
            LoadPhase::Processing { next_chunk: 0 }
        };
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    /// Number of records that will end up in the field.
    pub fn total(&self) -> usize {
        self.queue.len()
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Percentage in `[0, 100]`, never decreasing.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_done(&self) -> bool {
        self.phase == LoadPhase::Done
    }

    /// Marks the combined point cloud as uploaded.
    pub fn finish_upload(&mut self) {
        if self.phase == LoadPhase::Done {
            self.progress = 100.0;
        }
    }

    pub fn banner(&self) -> String {
        match self.phase {
            LoadPhase::Done => format!("{} Pulsars Loaded Successfully!", self.processed),
            _ => format!("Loading {} Pulsars...", self.total()),
        }
    }

    /// Steps once if the inter-chunk delay has elapsed.
    pub fn poll(
        &mut self,
        now: Instant,
        records: &[PulsarRecord],
        field: &mut PulsarField,
    ) -> Option<LoadStep> {
        if matches!(self.phase, LoadPhase::Idle | LoadPhase::Done) {
            return None;
        }
        if self.next_due.is_some_and(|due| now < due) {
            return None;
        }
        let step = self.step(records, field);
        self.next_due = Some(now + self.chunk_delay);
        Some(step)
    }

    /// Performs one transition. Chunk `i` is fully appended to `field` before
    /// this returns, so chunk `i + 1` always starts from committed state.
    pub fn step(&mut self, records: &[PulsarRecord], field: &mut PulsarField) -> LoadStep {
        match self.phase {
            LoadPhase::Idle => LoadStep::Idle,
            LoadPhase::Processing { next_chunk } => {
                let start = next_chunk * self.chunk_size;
                let end = (start + self.chunk_size).min(self.queue.len());

                for &idx in &self.queue[start..end] {
                    match records.get(idx) {
                        Some(record) => self.builder.push(field, idx, record, &mut self.rng),
                        None => log::warn!("Catalog index {} out of range, skipped", idx),
                    }
                }

                let len = end - start;
                self.processed += len;
                let total = self.queue.len().max(1);
                self.progress = self
                    .progress
                    .max(PROCESSING_SPAN * self.processed as f32 / total as f32);

                log::debug!(
                    "Chunk {}: +{} pulsars ({}/{}, {:.0}%)",
                    next_chunk,
                    len,
                    self.processed,
                    self.queue.len(),
                    self.progress
                );

                self.phase = if end >= self.queue.len() {
                    LoadPhase::Finalizing
                } else {
                    LoadPhase::Processing {
                        next_chunk: next_chunk + 1,
                    }
                };

                LoadStep::Chunk {
                    index: next_chunk,
                    len,
                }
            }
            LoadPhase::Finalizing => {
                self.progress = self.progress.max(FINALIZED_PROGRESS);
                self.phase = LoadPhase::Done;
                log::info!("Galaxy creation completed with {} pulsars", self.processed);
                LoadStep::Finalized
            }
            LoadPhase::Done => LoadStep::Done,
        }
    }
}
