//! Dip classes, per-set mean orientation, imputation and strike/dip normalization.
//!
//! Conventions
//! - Angles are in degrees throughout this module; conversion to radians
//!   happens only when a `Fracture` is built.
//! - strike = dip_direction − 90.

use crate::config::PipelineCfg;
use crate::error::{Error, Result};
use crate::network::Network;
use rand::Rng;

/// Descriptive dip band, used only to color the diagnostic plot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DipClass {
    Vertical,
    Subvertical,
    Other,
    Missing,
}

impl DipClass {
    pub const ALL: [DipClass; 4] = [
        DipClass::Vertical,
        DipClass::Subvertical,
        DipClass::Other,
        DipClass::Missing,
    ];

    pub fn classify(dip: Option<f64>) -> Self {
        match dip {
            Some(d) if (80.0..=90.0).contains(&d) => DipClass::Vertical,
            Some(d) if (60.0..80.0).contains(&d) => DipClass::Subvertical,
            Some(d) if (0.0..60.0).contains(&d) => DipClass::Other,
            _ => DipClass::Missing,
        }
    }

    /// Legend text.
    pub fn label(self) -> &'static str {
        match self {
            DipClass::Vertical => "Vertical",
            DipClass::Subvertical => "Subvertical",
            DipClass::Other => "Other",
            DipClass::Missing => "Missing",
        }
    }

    pub fn rgb(self) -> [u8; 3] {
        match self {
            DipClass::Vertical => [0xe4, 0x1a, 0x1c],
            DipClass::Subvertical => [0x37, 0x7e, 0xb8],
            DipClass::Other => [0x4d, 0xaf, 0x4a],
            DipClass::Missing => [0x99, 0x99, 0x99],
        }
    }
}

/// Mean orientation of one azimuth set.
///
/// `dip` / `dip_dir` are `None` only when the set has no numeric values and no
/// fallback is configured.
#[derive(Clone, Debug, PartialEq)]
pub struct SetOrientation {
    pub label: String,
    pub traces: usize,
    pub measured_dip: usize,
    pub measured_dip_dir: usize,
    pub dip: Option<f64>,
    pub dip_dir: Option<f64>,
    pub dip_from_fallback: bool,
    pub dip_dir_from_fallback: bool,
}

impl SetOrientation {
    pub fn mean_dip(&self) -> Result<f64> {
        self.dip.ok_or_else(|| Error::NoOrientation {
            set: self.label.clone(),
        })
    }

    pub fn mean_dip_dir(&self) -> Result<f64> {
        self.dip_dir.ok_or_else(|| Error::NoOrientation {
            set: self.label.clone(),
        })
    }
}

fn mean(values: impl Iterator<Item = f64>) -> (Option<f64>, usize) {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        (None, 0)
    } else {
        (Some(sum / n as f64), n)
    }
}

/// Mean dip and dip-direction for every configured set, in configuration order.
pub fn set_orientations(network: &Network, cfg: &PipelineCfg) -> Vec<SetOrientation> {
    network
        .set_labels()
        .iter()
        .map(|label| {
            let members: Vec<_> = network.set_members(label).collect();
            let (dip, measured_dip) = mean(members.iter().filter_map(|t| t.trace.dip));
            let (dip_dir, measured_dip_dir) = mean(members.iter().filter_map(|t| t.trace.dip_dir));
            let fallback = cfg.fallback(label);
            let so = SetOrientation {
                label: label.clone(),
                traces: members.len(),
                measured_dip,
                measured_dip_dir,
                dip: dip.or(fallback.map(|f| f.dip)),
                dip_dir: dip_dir.or(fallback.map(|f| f.dip_dir)),
                dip_from_fallback: dip.is_none() && fallback.is_some(),
                dip_dir_from_fallback: dip_dir.is_none() && fallback.is_some(),
            };
            tracing::info!(
                set = %so.label,
                traces = so.traces,
                dip = ?so.dip,
                dip_dir = ?so.dip_dir,
                dip_fallback = so.dip_from_fallback,
                dip_dir_fallback = so.dip_dir_from_fallback,
                "set_orientation"
            );
            so
        })
        .collect()
}

/// Normal draw via Box–Muller on two uniforms.
pub fn sample_normal<R: Rng>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    // 1 - u keeps the log argument in (0, 1].
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
    mean + std_dev * z
}

/// Fold a (dip, dip_direction) pair into dip ∈ [0, 90] and strike ∈ [0, 360).
///
/// Equivalent to reflecting repeatedly (dip > 90 → 180 − dip, dip < 0 → −dip),
/// each reflection flipping the strike by 180°. Dip is periodic in 360° with an
/// even number of flips per period, so the fold is done on `dip mod 360`.
/// Inputs must be finite.
pub fn normalize(dip: f64, dip_dir: f64) -> (f64, f64) {
    debug_assert!(dip.is_finite() && dip_dir.is_finite());
    let d = dip.rem_euclid(360.0);
    let (dip, flipped) = if d <= 90.0 {
        (d, false)
    } else if d <= 180.0 {
        (180.0 - d, true)
    } else if d <= 270.0 {
        (d - 180.0, false)
    } else {
        // also catches d == 360 from rounding of tiny negative dips
        (360.0 - d, true)
    };
    let strike = dip_dir - 90.0 + if flipped { 180.0 } else { 0.0 };
    let strike = strike.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    let strike = if strike >= 360.0 { 0.0 } else { strike };
    (dip, strike)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn dip_bands() {
        assert_eq!(DipClass::classify(Some(90.0)), DipClass::Vertical);
        assert_eq!(DipClass::classify(Some(80.0)), DipClass::Vertical);
        assert_eq!(DipClass::classify(Some(79.9)), DipClass::Subvertical);
        assert_eq!(DipClass::classify(Some(60.0)), DipClass::Subvertical);
        assert_eq!(DipClass::classify(Some(0.0)), DipClass::Other);
        assert_eq!(DipClass::classify(Some(-1.0)), DipClass::Missing);
        assert_eq!(DipClass::classify(Some(95.0)), DipClass::Missing);
        assert_eq!(DipClass::classify(None), DipClass::Missing);
    }

    #[test]
    fn normalize_examples() {
        let (d, s) = normalize(85.0, 95.0);
        assert!((d - 85.0).abs() < 1e-12 && (s - 5.0).abs() < 1e-12);
        let (d, s) = normalize(100.0, 95.0);
        assert!((d - 80.0).abs() < 1e-12 && (s - 185.0).abs() < 1e-12);
        let (d, s) = normalize(-10.0, 300.0);
        assert!((d - 10.0).abs() < 1e-12 && (s - 30.0).abs() < 1e-12);
        let (d, s) = normalize(30.0, 45.0);
        assert!((d - 30.0).abs() < 1e-12 && (s - 315.0).abs() < 1e-12);
        // three reflections: 300 → -120 → 120 → 60
        let (d, s) = normalize(300.0, 90.0);
        assert!((d - 60.0).abs() < 1e-12 && (s - 180.0).abs() < 1e-12);
        // two reflections: 200 → -20 → 20
        let (d, s) = normalize(200.0, 90.0);
        assert!((d - 20.0).abs() < 1e-12 && s.abs() < 1e-12);
    }

    #[test]
    fn huge_dips_fold_without_iterating() {
        for dip in [1.0e9, 1.0e15, 1.0e20, -1.0e20, f64::MAX, f64::MIN] {
            let (d, s) = normalize(dip, 0.0);
            assert!((0.0..=90.0).contains(&d), "{dip} -> {d}");
            assert!((0.0..360.0).contains(&s), "{dip} -> {s}");
        }
    }

    /// Step-by-step reflection, usable only for small magnitudes.
    fn reflect_stepwise(dip: f64, dip_dir: f64) -> (f64, f64) {
        let (mut dip, mut strike) = (dip, dip_dir - 90.0);
        while !(0.0..=90.0).contains(&dip) {
            dip = if dip > 90.0 { 180.0 - dip } else { -dip };
            strike += 180.0;
        }
        (dip, strike.rem_euclid(360.0))
    }

    #[test]
    fn normal_draws_are_reproducible_and_centered() {
        let mut a = StdRng::seed_from_u64(12345);
        let mut b = StdRng::seed_from_u64(12345);
        let xs: Vec<f64> = (0..4000).map(|_| sample_normal(&mut a, 85.0, 5.0)).collect();
        let ys: Vec<f64> = (0..4000).map(|_| sample_normal(&mut b, 85.0, 5.0)).collect();
        assert_eq!(xs, ys);
        let m = xs.iter().sum::<f64>() / xs.len() as f64;
        let var = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / xs.len() as f64;
        assert!((m - 85.0).abs() < 0.5, "mean {m}");
        assert!((var.sqrt() - 5.0).abs() < 0.5, "std {}", var.sqrt());
    }

    proptest! {
        #[test]
        fn normalized_pair_in_range(dip in -400.0f64..400.0, dir in -720.0f64..720.0) {
            let (d, s) = normalize(dip, dir);
            prop_assert!((0.0..=90.0).contains(&d));
            prop_assert!((0.0..360.0).contains(&s));
        }

        #[test]
        fn fold_matches_stepwise_reflection(dip in -1500.0f64..1500.0, dir in 0.0f64..360.0) {
            let (d, s) = normalize(dip, dir);
            let (ed, es) = reflect_stepwise(dip, dir);
            prop_assert!((d - ed).abs() < 1e-9, "dip {} vs {}", d, ed);
            let diff = (s - es).abs();
            prop_assert!(diff < 1e-9 || (diff - 360.0).abs() < 1e-9, "strike {} vs {}", s, es);
        }

        #[test]
        fn reflection_law_above_ninety(dip in 90.0001f64..180.0, dir in 0.0f64..360.0) {
            let (d, s) = normalize(dip, dir);
            let raw_strike = dir - 90.0;
            prop_assert!((d - (180.0 - dip)).abs() < 1e-9);
            let expected = (raw_strike + 180.0).rem_euclid(360.0);
            let diff = (s - expected).abs();
            prop_assert!(diff < 1e-9 || (diff - 360.0).abs() < 1e-9);
        }

        #[test]
        fn reflection_law_below_zero(dip in -90.0f64..-0.0001, dir in 0.0f64..360.0) {
            let (d, s) = normalize(dip, dir);
            let raw_strike = dir - 90.0;
            prop_assert!((d + dip).abs() < 1e-9);
            let expected = (raw_strike + 180.0).rem_euclid(360.0);
            let diff = (s - expected).abs();
            prop_assert!(diff < 1e-9 || (diff - 360.0).abs() < 1e-9);
        }
    }
}
