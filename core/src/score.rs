//! Percentage score over pass/fail checks.

use crate::model::{ComplianceCategory, ComplianceCheck};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: ComplianceCategory,
    pub passed: usize,
    pub total: usize,
    pub score: u32,
}

pub struct ComplianceScoreCalculator;

impl ComplianceScoreCalculator {
    /// `round(passed / total * 100)`; an empty set scores 0.
    pub fn score(checks: &[ComplianceCheck]) -> u32 {
        let passed = checks.iter().filter(|c| c.passed).count();
        ratio(passed, checks.len())
    }

    /// One entry per compliance category, in `ComplianceCategory::ALL`
    /// order. A category with no checks scores 0.
    pub fn breakdown(checks: &[ComplianceCheck]) -> Vec<CategoryScore> {
        ComplianceCategory::ALL
            .into_iter()
            .map(|category| {
                let (passed, total) = checks
                    .iter()
                    .filter(|c| c.category == category)
                    .fold((0, 0), |(p, t), c| (p + usize::from(c.passed), t + 1));
                CategoryScore {
                    category,
                    passed,
                    total,
                    score: ratio(passed, total),
                }
            })
            .collect()
    }
}

fn ratio(passed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (passed as f64 * 100.0 / total as f64).round() as u32
}
