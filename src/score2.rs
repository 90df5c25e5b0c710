//! SCORE2 ten-year cardiovascular risk estimation.
//!
//! The published SCORE2 model: centered risk-factor transforms feed a linear
//! predictor, the baseline survival turns it into an uncalibrated ten-year
//! risk, and a region-specific cloglog recalibration maps that onto observed
//! European incidence. This module is the numeric collaborator that produces
//! the headline value whose contributions the petal chart decomposes; it is a
//! pure function of its inputs with static coefficient tables.
//!
//! SCORE2 is not validated for individuals with diabetes. The diabetes term
//! exists in the published tables because the recalibration cohorts include
//! the whole population, so the coefficient is carried here but its input is
//! fixed at zero.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

/// European cardiovascular risk regions used by the SCORE2 recalibration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskRegion {
    Low,
    Moderate,
    High,
    #[serde(rename = "Very high")]
    VeryHigh,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown sex `{0}`; expected `male` or `female`")]
pub struct ParseSexError(pub String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown risk region `{0}`; expected `low`, `moderate`, `high`, or `very high`")]
pub struct ParseRiskRegionError(pub String);

impl FromStr for Sex {
    type Err = ParseSexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "m" | "male" => Ok(Sex::Male),
            "f" | "female" => Ok(Sex::Female),
            _ => Err(ParseSexError(s.to_string())),
        }
    }
}

impl FromStr for RiskRegion {
    type Err = ParseRiskRegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(RiskRegion::Low),
            "moderate" => Ok(RiskRegion::Moderate),
            "high" => Ok(RiskRegion::High),
            "very high" | "very-high" => Ok(RiskRegion::VeryHigh),
            _ => Err(ParseRiskRegionError(s.to_string())),
        }
    }
}

/// Linear-predictor coefficients, ordered as the transformed inputs:
/// cage, smoking, csbp, diabetes, ctchol, chdl, then the five age
/// interaction terms in the same order.
const MALE_COEFFICIENTS: [f64; 11] = [
    0.3742, 0.6012, 0.2777, 0.6457, 0.1458, -0.2698, -0.0755, -0.0255, -0.0281, 0.0426, -0.0983,
];
const FEMALE_COEFFICIENTS: [f64; 11] = [
    0.4648, 0.7744, 0.3131, 0.8096, 0.1002, -0.2606, -0.1088, -0.0277, -0.0226, 0.0613, -0.1272,
];

fn coefficients(sex: Sex) -> &'static [f64; 11] {
    match sex {
        Sex::Male => &MALE_COEFFICIENTS,
        Sex::Female => &FEMALE_COEFFICIENTS,
    }
}

fn baseline_survival(sex: Sex) -> f64 {
    match sex {
        Sex::Male => 0.9605,
        Sex::Female => 0.9776,
    }
}

/// Region- and sex-specific recalibration scales `(scale1, scale2)`.
///
/// The sex/region key space is total by construction: every combination has a
/// published pair, so an unknown key is unrepresentable here and surfaces
/// instead as a parse error at the input boundary.
fn recalibration_scales(sex: Sex, region: RiskRegion) -> (f64, f64) {
    match (sex, region) {
        (Sex::Male, RiskRegion::Low) => (-0.5699, 0.7476),
        (Sex::Male, RiskRegion::Moderate) => (-0.1565, 0.8009),
        (Sex::Male, RiskRegion::High) => (0.3207, 0.9360),
        (Sex::Male, RiskRegion::VeryHigh) => (0.5836, 0.8294),
        (Sex::Female, RiskRegion::Low) => (-0.7380, 0.7019),
        (Sex::Female, RiskRegion::Moderate) => (-0.3143, 0.7701),
        (Sex::Female, RiskRegion::High) => (0.5710, 0.9369),
        (Sex::Female, RiskRegion::VeryHigh) => (0.9412, 0.8329),
    }
}

/// Calibrated ten-year cardiovascular risk as a probability in `(0, 1)`.
///
/// # Arguments
///
/// * `age`: years; the model is calibrated for ages 40 to 69.
/// * `smoking`: current smoker.
/// * `sbp`: systolic blood pressure, mmHg.
/// * `total_cholesterol` / `hdl_cholesterol`: mmol/L.
pub fn ten_year_risk(
    region: RiskRegion,
    sex: Sex,
    age: f64,
    smoking: bool,
    sbp: f64,
    total_cholesterol: f64,
    hdl_cholesterol: f64,
) -> f64 {
    let cage = (age - 60.0) / 5.0;
    let csmoking = if smoking { 1.0 } else { 0.0 };
    let csbp = (sbp - 120.0) / 20.0;
    let ctchol = total_cholesterol - 6.0;
    let chdl = (hdl_cholesterol - 1.3) / 0.5;
    let diabetes = 0.0;

    let transformed = [
        cage,
        csmoking,
        csbp,
        diabetes,
        ctchol,
        chdl,
        cage * csmoking,
        cage * csbp,
        cage * ctchol,
        cage * chdl,
        cage * diabetes,
    ];

    let linear_predictor: f64 = coefficients(sex)
        .iter()
        .zip(transformed)
        .map(|(coefficient, value)| coefficient * value)
        .sum();

    let uncalibrated = 1.0 - baseline_survival(sex).powf(linear_predictor.exp());

    let (scale1, scale2) = recalibration_scales(sex, region);
    1.0 - (-(scale1 + scale2 * (-(1.0 - uncalibrated).ln()).ln()).exp()).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_male() -> f64 {
        ten_year_risk(RiskRegion::Low, Sex::Male, 60.0, false, 120.0, 6.0, 1.3)
    }

    #[test]
    fn reference_male_matches_published_tables() {
        // Centered inputs zero the linear predictor: the risk reduces to the
        // recalibrated baseline, about 5.0% for a low-risk-region male.
        assert!((reference_male() - 0.0500).abs() < 1e-3);
    }

    #[test]
    fn risk_is_a_probability() {
        let risk = ten_year_risk(RiskRegion::VeryHigh, Sex::Female, 69.0, true, 180.0, 8.0, 0.7);
        assert!(risk > 0.0 && risk < 1.0);
    }

    #[test]
    fn smoking_and_pressure_increase_risk() {
        let base = reference_male();
        let smoker = ten_year_risk(RiskRegion::Low, Sex::Male, 60.0, true, 120.0, 6.0, 1.3);
        let hypertensive =
            ten_year_risk(RiskRegion::Low, Sex::Male, 60.0, false, 160.0, 6.0, 1.3);
        assert!(smoker > base);
        assert!(hypertensive > base);
    }

    #[test]
    fn risk_increases_with_region_severity() {
        let risk_for = |region| ten_year_risk(region, Sex::Male, 55.0, true, 140.0, 6.5, 1.1);
        let low = risk_for(RiskRegion::Low);
        let moderate = risk_for(RiskRegion::Moderate);
        let high = risk_for(RiskRegion::High);
        let very_high = risk_for(RiskRegion::VeryHigh);
        assert!(low < moderate && moderate < high && high < very_high);
    }

    #[test]
    fn sex_parsing_accepts_prefixes_and_rejects_garbage() {
        assert_eq!("male".parse::<Sex>().unwrap(), Sex::Male);
        assert_eq!("F".parse::<Sex>().unwrap(), Sex::Female);
        assert!("other".parse::<Sex>().is_err());
    }

    #[test]
    fn region_parsing_covers_the_published_regions() {
        assert_eq!("low".parse::<RiskRegion>().unwrap(), RiskRegion::Low);
        assert_eq!(
            "Very high".parse::<RiskRegion>().unwrap(),
            RiskRegion::VeryHigh
        );
        assert!("extreme".parse::<RiskRegion>().is_err());
    }
}
