//! Ingestion of semicolon-delimited catalog tables.
//!
//! Column order: `id;name;ra;dec;gl;gb;period;frequency;dm;binary;association`.
//! `#` lines are comments. Rows with fewer than [`MIN_FIELDS`] fields are
//! malformed and skipped.

use crate::{Ingested, PulsarRecord};
use rand::Rng;
use serde::Serialize;
use std::ops::Range;

pub const MIN_FIELDS: usize = 11;

/// Placeholder distance (kpc) for rows without a usable DM.
pub const PLACEHOLDER_DIST_KPC: Range<f64> = 1.0..6.0;

/// Rough DM-to-distance conversion: d ≈ DM / 30, never closer than 0.1 kpc.
pub const DM_PER_KPC: f64 = 30.0;

/// Period class boundaries used by [`CatalogStats`] (seconds).
pub const STATS_FAST_BELOW_S: f64 = 0.1;
pub const STATS_SLOW_FROM_S: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total: usize,
    pub fast_pulsars: usize,
    pub medium_pulsars: usize,
    pub slow_pulsars: usize,
    pub min_period: f64,
    pub max_period: f64,
    pub avg_distance: f64,
}

impl CatalogStats {
    pub fn from_records(records: &[PulsarRecord]) -> Self {
        let periods = || records.iter().filter_map(|r| r.p0);

        let fast = periods().filter(|p| *p < STATS_FAST_BELOW_S).count();
        let slow = periods().filter(|p| *p >= STATS_SLOW_FROM_S).count();
        let medium = periods()
            .filter(|p| (STATS_FAST_BELOW_S..STATS_SLOW_FROM_S).contains(p))
            .count();

        let min_period = periods().fold(f64::INFINITY, f64::min);
        let max_period = periods().fold(f64::NEG_INFINITY, f64::max);

        let dists: Vec<f64> = records.iter().filter_map(|r| r.dist).collect();
        let avg = if dists.is_empty() {
            0.0
        } else {
            dists.iter().sum::<f64>() / dists.len() as f64
        };

        Self {
            total: records.len(),
            fast_pulsars: fast,
            medium_pulsars: medium,
            slow_pulsars: slow,
            min_period,
            max_period,
            avg_distance: (avg * 100.0).round() / 100.0,
        }
    }
}

/// Lenient float parse: unparseable, zero or non-finite fields are absent.
fn num(field: &str) -> Option<f64> {
    match field.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v != 0.0 => Some(v),
        _ => None,
    }
}

fn text(field: &str) -> Option<String> {
    let t = field.trim();
    (!t.is_empty()).then(|| t.to_owned())
}

/// Parses one row. `None` means the row is malformed, lacks a name, GL, GB
/// or period, or has a period outside `(0, 100)` s.
pub fn parse_row<R: Rng + ?Sized>(line: &str, rng: &mut R) -> Option<PulsarRecord> {
    let fields: Vec<&str> = line.split(';').collect();
    if fields.len() < MIN_FIELDS {
        return None;
    }

    let jname = text(fields[1])?;
    let gl = num(fields[4])?;
    let gb = num(fields[5])?;
    let period = num(fields[6]).filter(|p| *p > 0.0 && *p < 100.0)?;
    let dm = num(fields[8]).unwrap_or(0.0);

    let dist = if dm > 0.0 {
        (dm / DM_PER_KPC).max(0.1)
    } else {
        rng.gen_range(PLACEHOLDER_DIST_KPC)
    };

    Some(PulsarRecord {
        jname: Some(jname),
        assoc: text(fields[10]),
        p0: Some(period),
        dm: Some(dm),
        gl: Some(gl),
        gb: Some(gb),
        dist: Some(dist),
    })
}

/// Parses a whole table. Comment and blank lines are ignored; every other line
/// that does not yield a record is counted as dropped.
pub fn parse_csv<R: Rng + ?Sized>(input: &str, rng: &mut R) -> Ingested {
    let mut out = Ingested::default();
    let mut total_lines = 0usize;

    for (i, raw) in input.lines().enumerate() {
        total_lines += 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match parse_row(line, rng) {
            Some(rec) => out.records.push(rec),
            None => {
                log::debug!("Skipping row {}: {}", i + 1, line);
                out.dropped += 1;
            }
        }
    }

    log::info!(
        "Processed {} pulsars from {} lines ({} dropped).",
        out.records.len(),
        total_lines,
        out.dropped
    );
    out
}
