//! Ingestion of psrcat's tabular text output.
//!
//! ```text
//! #     NAME          GL        GB        P0          ASSOC
//! ...   (six header lines)
//! -----------------------------------------------------------
//! 1     J0002+6216    117.327   -0.074    0.115364    SNR:G117.7+0.6
//! ```
//!
//! Data lines start with an integer index followed by a `J` name. The first
//! decimal pair after the name is (GL, GB); the next unsigned decimal is P0.
//! DM is not part of this listing. DIST is not derivable here either and gets a
//! uniform placeholder in [`PLACEHOLDER_DIST_KPC`]: it is a display aid only,
//! not a distance model.

use crate::{Ingested, PulsarRecord};
use rand::Rng;
use rayon::prelude::*;
use std::ops::Range;

/// Non-empty lines before the first data row.
pub const HEADER_LINES: usize = 6;

/// Placeholder distance range in kpc.
pub const PLACEHOLDER_DIST_KPC: Range<f64> = 0.1..10.1;

const ASSOC_PREFIXES: [&str; 5] = ["GRS:", "XRS:", "SNR:", "GC:", "OPT:"];

/// `digits '.' digits`, optionally with a leading minus.
fn parse_decimal(tok: &str, signed: bool) -> Option<f64> {
    let body = match tok.strip_prefix('-') {
        Some(rest) if signed => rest,
        Some(_) => return None,
        None => tok,
    };
    let (int, frac) = body.split_once('.')?;
    let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(int) || !is_digits(frac) {
        return None;
    }
    tok.parse().ok()
}

fn is_data_line(line: &str) -> bool {
    if line.contains("-----") {
        return false;
    }
    let mut toks = line.split_whitespace();
    let starts_with_index = line.starts_with(|c: char| c.is_ascii_digit())
        && toks
            .next()
            .map_or(false, |t| t.bytes().all(|b| b.is_ascii_digit()));
    starts_with_index && toks.next().map_or(false, |t| t.starts_with('J'))
}

fn extract_name(tok: &str) -> Option<String> {
    let end = tok
        .find(|c: char| !(c == 'J' || c == '+' || c == '-' || c.is_ascii_digit()))
        .unwrap_or(tok.len());
    let name = &tok[..end];
    (!name.is_empty()).then(|| name.to_owned())
}

fn extract_assoc(tokens: &[&str]) -> Option<String> {
    let found: Vec<&str> = tokens
        .iter()
        .flat_map(|t| t.split(','))
        .filter(|piece| {
            ASSOC_PREFIXES
                .iter()
                .any(|p| piece.len() > p.len() && piece.starts_with(p))
        })
        .collect();

    (!found.is_empty()).then(|| found.join(", "))
}

/// Parses one data line. Distance is left unset for the caller to fill.
pub fn parse_line(line: &str) -> PulsarRecord {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let jname = tokens.get(1).and_then(|t| extract_name(t));

    let rest = tokens.get(2..).unwrap_or(&[]);

    // First (unsigned, signed) decimal pair after the name.
    let pair = rest.windows(2).position(|w| {
        parse_decimal(w[0], false).is_some() && parse_decimal(w[1], true).is_some()
    });

    let (gl, gb, p0) = match pair {
        Some(i) => {
            let gl = parse_decimal(rest[i], false);
            let gb = parse_decimal(rest[i + 1], true);
            let p0 = rest[i + 2..]
                .iter()
                .find_map(|t| parse_decimal(t, false));
            (gl, gb, p0)
        }
        None => (None, None, None),
    };

    PulsarRecord {
        jname,
        assoc: extract_assoc(rest),
        p0,
        dm: None,
        gl,
        gb,
        dist: None,
    }
}

/// Parses a whole psrcat listing. Incomplete rows are dropped and counted.
pub fn parse_text<R: Rng + ?Sized>(input: &str, rng: &mut R) -> Ingested {
    let data_lines: Vec<&str> = input
        .lines()
        .filter(|l| !l.trim().is_empty())
        .enumerate()
        .filter(|(i, l)| *i >= HEADER_LINES && is_data_line(l))
        .map(|(_, l)| l)
        .collect();

    log::info!("Processing {} pulsar entries...", data_lines.len());

    let parsed: Vec<PulsarRecord> = data_lines.par_iter().map(|l| parse_line(l)).collect();

    let mut out = Ingested::default();
    for (line, mut rec) in data_lines.iter().zip(parsed) {
        if !rec.is_complete() {
            log::debug!("Dropping incomplete row: {}", line.trim());
            out.dropped += 1;
            continue;
        }
        rec.dist = Some(rng.gen_range(PLACEHOLDER_DIST_KPC));
        out.records.push(rec);
    }

    log::info!(
        "Successfully processed {} pulsars with complete data ({} dropped).",
        out.records.len(),
        out.dropped
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    const HEADER: &str = "\
-----------------------------------------------------------------------
#     NAME            GL        GB       P0            ASSOC
                     (deg)     (deg)     (s)
-----------------------------------------------------------------------
 psrcat listing
 generated for tests
-----------------------------------------------------------------------
";

    fn listing(rows: &[&str]) -> String {
        let mut s = HEADER.to_owned();
        for r in rows {
            s.push_str(r);
            s.push('\n');
        }
        s
    }

    #[test]
    fn parses_complete_row() {
        let rec = parse_line("1     J0002+6216    117.327   -0.074    0.115364    SNR:G117.7+0.6");
        assert_eq!(rec.jname.as_deref(), Some("J0002+6216"));
        assert_eq!(rec.gl, Some(117.327));
        assert_eq!(rec.gb, Some(-0.074));
        assert_eq!(rec.p0, Some(0.115364));
        assert_eq!(rec.assoc.as_deref(), Some("SNR:G117.7+0.6"));
        assert_eq!(rec.dm, None);
    }

    #[test]
    fn joins_multiple_associations() {
        let rec = parse_line("7  J0024-7204C  305.923  -44.892  0.005757  GC:47Tuc,XRS:X5  OPT:W7");
        assert_eq!(rec.assoc.as_deref(), Some("GC:47Tuc, XRS:X5, OPT:W7"));
    }

    #[test]
    fn missing_columns_are_dropped_and_counted() {
        let text = listing(&[
            "1     J0002+6216    117.327   -0.074    0.115364",
            "2     J0006+1834    108.172   -42.985   *",
            "3     J0007+7303    *         *         0.315873",
            "4     J0011+08      108.8     -53.8     2.552",
        ]);
        let mut rng = StdRng::seed_from_u64(1);
        let out = parse_text(&text, &mut rng);
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.dropped, 2);
        assert_eq!(out.records[0].jname.as_deref(), Some("J0002+6216"));
        assert_eq!(out.records[1].jname.as_deref(), Some("J0011+08"));
    }

    #[test]
    fn placeholder_distance_is_in_range() {
        let text = listing(&["1 J0002+6216 117.327 -0.074 0.115364"; 50]);
        let mut rng = StdRng::seed_from_u64(9);
        let out = parse_text(&text, &mut rng);
        assert_eq!(out.records.len(), 50);
        for r in &out.records {
            let d = r.dist.unwrap();
            assert!(PLACEHOLDER_DIST_KPC.contains(&d), "dist {d}");
        }
    }

    #[test]
    fn header_and_separator_lines_are_not_data() {
        let text = listing(&[]);
        let mut rng = StdRng::seed_from_u64(1);
        let out = parse_text(&text, &mut rng);
        assert!(out.records.is_empty());
        assert_eq!(out.dropped, 0);
    }

    #[test]
    fn decimal_tokens_are_strict() {
        assert_eq!(parse_decimal("12.5", false), Some(12.5));
        assert_eq!(parse_decimal("-12.5", true), Some(-12.5));
        assert_eq!(parse_decimal("-12.5", false), None);
        assert_eq!(parse_decimal("12", false), None);
        assert_eq!(parse_decimal("1.2e3", false), None);
        assert_eq!(parse_decimal("*", true), None);
    }
}
