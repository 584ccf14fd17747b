//! PSRCAT: pulsar catalog records and the static JSON asset the viewer consumes.
//!
//! - One record per pulsar, every field optional.
//! - Defaults are applied by the accessor methods on [`PulsarRecord`], never at
//!   storage time, so an asset round-trips exactly as written.
//! - Two offline ingestion paths: psrcat tabular text ([`text`]) and
//!   semicolon-delimited tables ([`csv`]).
//!
//! Asset layout (JSON, order-preserving array):
//!
//! ```text
//! [
//!   { "JNAME": "B0531+21", "ASSOC": "Crab", "P0": 0.0334, "DM": 56.77,
//!     "GL": 184.56, "GB": -5.78, "DIST": 2.0 },
//!   ...
//! ]
//! ```
//!
//! | key   | unit      | meaning                               |
//! |-------|-----------|---------------------------------------|
//! | JNAME | -         | pulsar identifier                     |
//! | ASSOC | -         | associated object (SNR, GC, ...)      |
//! | P0    | s         | rotation period                       |
//! | DM    | cm^-3 pc  | dispersion measure                    |
//! | GL    | deg       | galactic longitude                    |
//! | GB    | deg       | galactic latitude                     |
//! | DIST  | kpc       | distance estimate                     |

pub mod csv;
pub mod text;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Period used when a record carries none (seconds).
pub const DEFAULT_PERIOD_S: f64 = 0.5;
/// Dispersion measure used when a record carries none.
pub const DEFAULT_DM: f64 = 100.0;
/// Distance used when a record carries none (kpc).
pub const DEFAULT_DIST_KPC: f64 = 1.0;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed catalog JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A single catalog entry. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PulsarRecord {
    #[serde(rename = "JNAME", default, skip_serializing_if = "Option::is_none")]
    pub jname: Option<String>,
    #[serde(rename = "ASSOC", default, skip_serializing_if = "Option::is_none")]
    pub assoc: Option<String>,
    #[serde(rename = "P0", default, skip_serializing_if = "Option::is_none")]
    pub p0: Option<f64>,
    #[serde(rename = "DM", default, skip_serializing_if = "Option::is_none")]
    pub dm: Option<f64>,
    #[serde(rename = "GL", default, skip_serializing_if = "Option::is_none")]
    pub gl: Option<f64>,
    #[serde(rename = "GB", default, skip_serializing_if = "Option::is_none")]
    pub gb: Option<f64>,
    #[serde(rename = "DIST", default, skip_serializing_if = "Option::is_none")]
    pub dist: Option<f64>,
}

/// Zero and NaN are treated as "not provided", like an unset catalog column.
#[inline]
fn provided(v: Option<f64>) -> Option<f64> {
    v.filter(|x| *x != 0.0 && !x.is_nan())
}

impl PulsarRecord {
    /// True when identifier, longitude, latitude and period are all present.
    pub fn is_complete(&self) -> bool {
        self.jname.as_deref().map_or(false, |s| !s.is_empty())
            && self.gl.is_some()
            && self.gb.is_some()
            && self.p0.is_some()
    }

    /// Period in seconds, if the catalog provides a usable one.
    #[inline]
    pub fn period(&self) -> Option<f64> {
        provided(self.p0)
    }

    #[inline]
    pub fn period_or_default(&self) -> f64 {
        self.period().unwrap_or(DEFAULT_PERIOD_S)
    }

    #[inline]
    pub fn dm(&self) -> Option<f64> {
        provided(self.dm)
    }

    #[inline]
    pub fn dm_or_default(&self) -> f64 {
        self.dm().unwrap_or(DEFAULT_DM)
    }

    #[inline]
    pub fn dist(&self) -> Option<f64> {
        provided(self.dist)
    }

    #[inline]
    pub fn dist_or_default(&self) -> f64 {
        self.dist().unwrap_or(DEFAULT_DIST_KPC)
    }

    /// Galactic longitude in degrees; missing coordinates collapse to 0.
    #[inline]
    pub fn gl_deg(&self) -> f64 {
        self.gl.unwrap_or(0.0)
    }

    /// Galactic latitude in degrees; missing coordinates collapse to 0.
    #[inline]
    pub fn gb_deg(&self) -> f64 {
        self.gb.unwrap_or(0.0)
    }

    pub fn display_name(&self) -> &str {
        match self.jname.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ => "Unknown",
        }
    }

    pub fn display_assoc(&self) -> &str {
        match self.assoc.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ => "None",
        }
    }

    pub fn display_period(&self) -> String {
        self.period()
            .map(|p| format!("{p:.4} s"))
            .unwrap_or_else(|| "Unknown".to_owned())
    }

    pub fn display_dist(&self) -> String {
        self.dist()
            .map(|d| format!("{d:.2} kpc"))
            .unwrap_or_else(|| "Unknown".to_owned())
    }

    pub fn display_dm(&self) -> String {
        self.dm()
            .map(|d| format!("{d:.2} cm⁻³ pc"))
            .unwrap_or_else(|| "Unknown".to_owned())
    }
}

/// Result of one ingestion pass: the kept records (input order) and how many
/// rows were dropped as incomplete or malformed.
#[derive(Debug, Default, Clone)]
pub struct Ingested {
    pub records: Vec<PulsarRecord>,
    pub dropped: usize,
}

/// Parses a catalog asset from an in-memory JSON string.
pub fn parse_catalog(json: &str) -> Result<Vec<PulsarRecord>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Reads a catalog asset (JSON array) from disk.
pub fn read_catalog(path: &Path) -> Result<Vec<PulsarRecord>, CatalogError> {
    let file = File::open(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes any serializable value as pretty-printed JSON.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), CatalogError> {
    let io_err = |source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut w = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut w, value).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    w.write_all(b"\n").map_err(io_err)?;
    w.flush().map_err(io_err)
}

/// Writes a catalog asset (JSON array) to disk.
pub fn write_catalog(path: &Path, records: &[PulsarRecord]) -> Result<(), CatalogError> {
    write_json(path, records)
}

/// Returns a shuffled copy of `records` truncated to at most `n` entries.
pub fn shuffled_sample<R: Rng + ?Sized>(
    records: &[PulsarRecord],
    n: usize,
    rng: &mut R,
) -> Vec<PulsarRecord> {
    let mut out = records.to_vec();
    out.shuffle(rng);
    out.truncate(n);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn crab() -> PulsarRecord {
        PulsarRecord {
            jname: Some("B0531+21".into()),
            assoc: Some("Crab".into()),
            p0: Some(0.0334),
            dm: Some(56.77),
            gl: Some(184.56),
            gb: Some(-5.78),
            dist: Some(2.0),
        }
    }

    #[test]
    fn missing_keys_deserialize_as_none() {
        let recs = parse_catalog(r#"[{"JNAME":"J0000+0000","GL":1.5,"GB":-2.0}]"#).unwrap();
        assert_eq!(recs.len(), 1);
        let r = &recs[0];
        assert_eq!(r.p0, None);
        assert_eq!(r.dm, None);
        assert_eq!(r.period_or_default(), DEFAULT_PERIOD_S);
        assert_eq!(r.dm_or_default(), DEFAULT_DM);
        assert_eq!(r.dist_or_default(), DEFAULT_DIST_KPC);
    }

    #[test]
    fn zero_values_fall_back_to_defaults() {
        let r = PulsarRecord {
            p0: Some(0.0),
            dm: Some(0.0),
            dist: Some(0.0),
            ..crab()
        };
        assert_eq!(r.period(), None);
        assert_eq!(r.dm_or_default(), DEFAULT_DM);
        assert_eq!(r.dist_or_default(), DEFAULT_DIST_KPC);
        assert_eq!(r.display_period(), "Unknown");
    }

    #[test]
    fn display_fields_use_fallback_labels() {
        let r = PulsarRecord::default();
        assert_eq!(r.display_name(), "Unknown");
        assert_eq!(r.display_assoc(), "None");
        assert_eq!(r.display_dist(), "Unknown");
        assert_eq!(r.display_dm(), "Unknown");

        let c = crab();
        assert_eq!(c.display_name(), "B0531+21");
        assert_eq!(c.display_assoc(), "Crab");
        assert_eq!(c.display_period(), "0.0334 s");
        assert_eq!(c.display_dist(), "2.00 kpc");
        assert_eq!(c.display_dm(), "56.77 cm⁻³ pc");
    }

    #[test]
    fn empty_assoc_renders_as_none() {
        let r = PulsarRecord {
            assoc: Some(String::new()),
            ..crab()
        };
        assert_eq!(r.display_assoc(), "None");
    }

    #[test]
    fn completeness_requires_name_coords_and_period() {
        assert!(crab().is_complete());
        assert!(!PulsarRecord { gl: None, ..crab() }.is_complete());
        assert!(!PulsarRecord { gb: None, ..crab() }.is_complete());
        assert!(!PulsarRecord { p0: None, ..crab() }.is_complete());
        assert!(!PulsarRecord { jname: None, ..crab() }.is_complete());
        assert!(PulsarRecord { dm: None, dist: None, ..crab() }.is_complete());
    }

    #[test]
    fn sample_is_bounded_and_drawn_from_input() {
        let records: Vec<_> = (0..250)
            .map(|i| PulsarRecord {
                jname: Some(format!("J{i:04}")),
                ..crab()
            })
            .collect();
        let mut rng = StdRng::seed_from_u64(7);
        let sample = shuffled_sample(&records, 100, &mut rng);
        assert_eq!(sample.len(), 100);
        assert!(sample.iter().all(|s| records.contains(s)));

        let small = shuffled_sample(&records[..3], 100, &mut rng);
        assert_eq!(small.len(), 3);
    }

    #[test]
    fn catalog_file_round_trip_preserves_order() {
        let dir = std::env::temp_dir().join(format!("psrcat-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("catalog.json");

        let records = vec![
            crab(),
            PulsarRecord {
                jname: Some("J0437-4715".into()),
                assoc: None,
                ..crab()
            },
        ];
        write_catalog(&path, &records).unwrap();
        let back = read_catalog(&path).unwrap();
        assert_eq!(back, records);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"JNAME\": \"B0531+21\""));
        assert!(!text.contains("\"ASSOC\": null"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn read_missing_file_reports_path() {
        let err = read_catalog(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
