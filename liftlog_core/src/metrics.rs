//! Strength metrics: estimated one-rep max and the bodyweight-normalized
//! strength score.
//!
//! Both functions are pure. Neither validates its inputs beyond what is
//! needed to avoid returning a meaningless score.

use crate::{Error, Result, Sex, Units};

/// Growth factor per additional repetition
const REP_FACTOR: f64 = 1.03;

/// Smallest denominator accepted by the strength score
const MIN_DENOMINATOR: f64 = 1e-6;

/// Fifth-degree polynomial coefficients, lowest order first
struct ScoreCoefficients([f64; 6]);

const FEMALE: ScoreCoefficients = ScoreCoefficients([
    594.31747775582,
    -27.23842536447,
    0.82112226871,
    -0.00930733913,
    0.00004731582,
    -0.00000009054,
]);

const DEFAULT: ScoreCoefficients = ScoreCoefficients([
    -216.0475144,
    16.2606339,
    -0.002388645,
    -0.00113732,
    0.00000701863,
    -0.00000001291,
]);

impl ScoreCoefficients {
    fn for_sex(sex: Sex) -> &'static ScoreCoefficients {
        match sex {
            Sex::Female => &FEMALE,
            Sex::Male => &DEFAULT,
        }
    }

    /// Horner evaluation at bodyweight `bw` (kg)
    fn evaluate(&self, bw: f64) -> f64 {
        self.0.iter().rev().fold(0.0, |acc, c| acc * bw + c)
    }
}

/// Estimate the one-repetition maximum from a submaximal set.
///
/// `weight * 1.03^(reps - 1)`; a single rep returns the weight unchanged.
/// Reps of zero are not rejected and yield an underestimate. Absurd rep
/// counts saturate to infinity rather than wrapping.
pub fn estimate_one_rep_max(weight: f64, reps: u32) -> f64 {
    weight * REP_FACTOR.powf(f64::from(reps) - 1.0)
}

/// Bodyweight- and sex-normalized strength score for a lift total.
///
/// With [`Units::Pounds`] both `total` and `bodyweight` are converted to
/// kilograms before the polynomial is evaluated.
///
/// # Errors
/// [`Error::DegenerateScore`] when the polynomial denominator at this
/// bodyweight is not a finite value above a small positive threshold.
pub fn strength_score(total: f64, bodyweight: f64, sex: Sex, units: Units) -> Result<f64> {
    let total = units.to_kg(total);
    let bw = units.to_kg(bodyweight);

    let denominator = ScoreCoefficients::for_sex(sex).evaluate(bw);
    if !denominator.is_finite() || denominator < MIN_DENOMINATOR {
        tracing::debug!(bw, denominator, "rejecting strength score denominator");
        return Err(Error::DegenerateScore {
            bodyweight,
            denominator,
        });
    }

    Ok(total * 500.0 / denominator)
}
