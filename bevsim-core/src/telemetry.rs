//! Module containing the schema adapter that maps raw engine output onto the
//! canonical telemetry series.
//!
//! Engine versions disagree on field names, so each canonical field carries an
//! ordered list of known aliases. Selection is purely name-based; all aliases
//! for a field are already in the canonical unit, and no unit conversion is
//! performed here.

use crate::error::SchemaAdapterError;
use crate::imports::*;
use crate::simdrive::RawSimResult;

/// Known raw-field spellings per canonical field, in preference order. The
/// canonical name itself is always first.
pub const FIELD_ALIASES: [(&str, &[&str]); 4] = [
    ("time_s", &["time_s", "cyc_time_s", "cyc_secs"]),
    ("speed_mps", &["speed_mps", "mps_ach", "mps"]),
    (
        "electrical_power_w",
        &["electrical_power_w", "ess_w_out_ach", "batt_w_out"],
    ),
    ("soc", &["soc", "ess_soc", "state_of_charge"]),
];

/// Canonical per-timestep telemetry, aligned on a shared time base.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySeries {
    /// Elapsed time [s]
    pub time_s: Array1<f64>,
    /// Achieved speed [m/s]
    pub speed_mps: Array1<f64>,
    /// Battery terminal power [W], negative while charging
    pub electrical_power_w: Array1<f64>,
    /// Battery state of charge, fraction
    pub soc: Array1<f64>,
}

impl SerdeAPI for TelemetrySeries {}

impl TelemetrySeries {
    pub fn len(&self) -> usize {
        self.time_s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_s.is_empty()
    }
}

fn select<'a>(
    raw: &'a RawSimResult,
    canonical: &'static str,
    candidates: &'static [&'static str],
) -> Result<&'a Vec<f64>, SchemaAdapterError> {
    for &cand in candidates {
        if let Some(values) = raw.get(cand) {
            if !values.is_empty() {
                if cand != canonical {
                    log::debug!("field `{canonical}` resolved via alias `{cand}`");
                }
                return Ok(values);
            }
        }
    }
    Err(SchemaAdapterError::MissingField {
        canonical,
        candidates: candidates.to_vec(),
    })
}

/// Maps a raw result onto [TelemetrySeries], resolving aliases in preference
/// order and verifying that all series share one length and that the time
/// base is strictly increasing.
pub fn adapt(raw: &RawSimResult) -> Result<TelemetrySeries, SchemaAdapterError> {
    let [(_, time_cands), (_, speed_cands), (_, power_cands), (_, soc_cands)] = FIELD_ALIASES;
    let time_s = select(raw, "time_s", time_cands)?;
    let speed_mps = select(raw, "speed_mps", speed_cands)?;
    let electrical_power_w = select(raw, "electrical_power_w", power_cands)?;
    let soc = select(raw, "soc", soc_cands)?;

    let expected = time_s.len();
    for (field, values) in [
        ("speed_mps", speed_mps),
        ("electrical_power_w", electrical_power_w),
        ("soc", soc),
    ] {
        if values.len() != expected {
            return Err(SchemaAdapterError::LengthMismatch {
                field,
                len: values.len(),
                expected,
            });
        }
    }
    for i in 1..expected {
        if time_s[i] <= time_s[i - 1] {
            return Err(SchemaAdapterError::NonMonotonicTime {
                index: i,
                prev: time_s[i - 1],
                next: time_s[i],
            });
        }
    }

    Ok(TelemetrySeries {
        time_s: Array1::from_vec(time_s.clone()),
        speed_mps: Array1::from_vec(speed_mps.clone()),
        electrical_power_w: Array1::from_vec(electrical_power_w.clone()),
        soc: Array1::from_vec(soc.clone()),
    })
}
