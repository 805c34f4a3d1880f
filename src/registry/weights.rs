//! Declarative weight rules, deserializable from the `[weights.<signal>]` tables
//! of `config/credibility.toml`.
//!
//! TOML shape:
//! ```toml
//! [weights.grammar_spelling]
//! kind = "above"
//! bands = [{ above = 0.8, weight = 0.3 }]
//! otherwise = 0.45
//!
//! [weights.clickbait]
//! kind = "above"
//! bands = [{ above = 0.0, weight = 0.3 }]
//! otherwise = 0.8
//! requires_headline = true
//! ```
//!
//! A rule is a pure function of `(sub-score, page)`; nothing is carried between calls.

use serde::Deserialize;

use super::WeightFn;
use crate::page::PageData;

/// Tolerance for `at_points` matching.
const POINT_EPSILON: f64 = 1e-9;

/// One step of an `above` curve.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Band {
    /// Applies when the sub-score is strictly greater than this.
    pub above: f64,
    pub weight: f64,
}

/// Score-dependent weight shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeightCurve {
    Constant {
        weight: f64,
    },
    /// First band (in listed order) whose threshold the score exceeds.
    Above {
        bands: Vec<Band>,
        otherwise: f64,
    },
    /// `weight` when the score sits on one of `points`, `otherwise` elsewhere.
    AtPoints {
        points: Vec<f64>,
        weight: f64,
        otherwise: f64,
    },
}

impl WeightCurve {
    pub fn constant(weight: f64) -> Self {
        Self::Constant { weight }
    }

    pub fn above(bands: &[(f64, f64)], otherwise: f64) -> Self {
        Self::Above {
            bands: bands
                .iter()
                .map(|&(above, weight)| Band { above, weight })
                .collect(),
            otherwise,
        }
    }

    pub fn at_points(points: &[f64], weight: f64, otherwise: f64) -> Self {
        Self::AtPoints {
            points: points.to_vec(),
            weight,
            otherwise,
        }
    }

    pub fn eval(&self, score: f64) -> f64 {
        match self {
            Self::Constant { weight } => *weight,
            Self::Above { bands, otherwise } => bands
                .iter()
                .find(|b| score > b.above)
                .map(|b| b.weight)
                .unwrap_or(*otherwise),
            Self::AtPoints {
                points,
                weight,
                otherwise,
            } => {
                if points.iter().any(|p| (score - p).abs() < POINT_EPSILON) {
                    *weight
                } else {
                    *otherwise
                }
            }
        }
    }

    /// Every weight this curve can return is finite and non-negative.
    pub fn is_well_formed(&self) -> bool {
        let ok = |w: f64| w.is_finite() && w >= 0.0;
        match self {
            Self::Constant { weight } => ok(*weight),
            Self::Above { bands, otherwise } => {
                ok(*otherwise) && bands.iter().all(|b| ok(b.weight) && b.above.is_finite())
            }
            Self::AtPoints {
                points,
                weight,
                otherwise,
            } => ok(*weight) && ok(*otherwise) && points.iter().all(|p| p.is_finite()),
        }
    }
}

/// A weight curve plus page-context gates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeightRule {
    #[serde(flatten)]
    pub curve: WeightCurve,
    /// Weight is 0 on pages without a headline.
    #[serde(default)]
    pub requires_headline: bool,
    /// Weight is 0 when the page URL has no resolvable host.
    #[serde(default)]
    pub requires_host: bool,
}

impl WeightRule {
    pub fn new(curve: WeightCurve) -> Self {
        Self {
            curve,
            requires_headline: false,
            requires_host: false,
        }
    }

    pub fn headline_only(mut self) -> Self {
        self.requires_headline = true;
        self
    }

    pub fn host_only(mut self) -> Self {
        self.requires_host = true;
        self
    }
}

impl WeightFn for WeightRule {
    fn weight(&self, score: f64, page: &PageData) -> f64 {
        if self.requires_headline && !page.has_headline() {
            return 0.0;
        }
        if self.requires_host && page.host().is_none() {
            return 0.0;
        }
        self.curve.eval(score)
    }
}
