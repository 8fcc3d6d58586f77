//! Histogram extraction and trait scoring.

use crate::domain::models::{
    classify, Category, CategoryHistogram, DomainScores, FourPillars, HiddenStems, PillarPosition,
    ScoreReport,
};

use super::modifiers::{ScoreDomain, TraitModifier};

/// Baseline every trait starts from.
pub const BASE_SCORE: f64 = 50.0;
/// Factor applied to the deviation from the baseline.
pub const AMPLIFICATION: f64 = 1.5;

/// Lower clamp of a trait score.
pub const MIN_SCORE: f64 = 0.0;
/// Upper clamp of a trait score.
pub const MAX_SCORE: f64 = 100.0;

/// Weight of a visible stem (year, month and hour pillars).
pub const STEM_WEIGHT: f64 = 1.0;
/// Weight of the principal hidden stem, the last one listed for a branch.
pub const PRINCIPAL_HIDDEN_WEIGHT: f64 = 1.0;
/// Weight of every other hidden stem.
pub const MINOR_HIDDEN_WEIGHT: f64 = 0.3;

/// Classify every stem of the chart against the day stem and accumulate weights.
///
/// The day stem itself is never classified; the hidden stems of all four
/// branches, including the day branch, are.
pub fn histogram(pillars: &FourPillars, hidden: &HiddenStems) -> CategoryHistogram {
    let reference = pillars.reference_stem();
    let mut histogram = CategoryHistogram::new();

    for (position, pillar) in pillars.iter() {
        if position != PillarPosition::Day {
            histogram.add(classify(reference, pillar.stem), STEM_WEIGHT);
        }
    }

    for position in PillarPosition::ALL {
        let stems = hidden.get(position);
        for (index, stem) in stems.iter().enumerate() {
            let weight = if index + 1 == stems.len() {
                PRINCIPAL_HIDDEN_WEIGHT
            } else {
                MINOR_HIDDEN_WEIGHT
            };
            histogram.add(classify(reference, *stem), weight);
        }
    }

    histogram
}

/// Score one trait: amplify the weighted deviation from 50, clamp, round half-up.
pub fn score_trait(histogram: &CategoryHistogram, modifier: &TraitModifier) -> u8 {
    let delta: f64 = histogram
        .iter()
        .filter(|(_, weight)| *weight != 0.0)
        .map(|(category, weight)| f64::from(modifier.get(category)) * weight)
        .sum();
    let amplified = BASE_SCORE + AMPLIFICATION * delta;
    round_half_up(amplified.clamp(MIN_SCORE, MAX_SCORE))
}

fn round_half_up(value: f64) -> u8 {
    (value + 0.5).floor() as u8
}

/// Score every trait of `domain`, keyed by trait name.
pub fn score_domain(histogram: &CategoryHistogram, domain: ScoreDomain) -> DomainScores {
    domain
        .modifiers()
        .iter()
        .map(|m| (m.name.to_string(), score_trait(histogram, m)))
        .collect()
}

/// Score all 35 traits from a precomputed histogram.
pub fn score_all(histogram: &CategoryHistogram) -> ScoreReport {
    ScoreReport {
        histogram: histogram.clone(),
        personality: score_domain(histogram, ScoreDomain::Personality),
        work: score_domain(histogram, ScoreDomain::Work),
        aptitude: score_domain(histogram, ScoreDomain::Aptitude),
        love: score_domain(histogram, ScoreDomain::Love),
    }
}

/// Hidden-stem lookup, histogram and every trait score in one call.
pub fn score_chart(pillars: &FourPillars) -> ScoreReport {
    let hidden = HiddenStems::lookup(pillars);
    score_all(&histogram(pillars, &hidden))
}

/// Non-zero categories, heaviest first.
pub fn summarize(histogram: &CategoryHistogram) -> Vec<(Category, f64)> {
    let mut entries: Vec<(Category, f64)> =
        histogram.iter().filter(|(_, weight)| *weight > 0.0).collect();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Pillar;

    fn pillars(year: &str, month: &str, day: &str, hour: &str) -> FourPillars {
        FourPillars {
            year: Pillar::parse(year).unwrap(),
            month: Pillar::parse(month).unwrap(),
            day: Pillar::parse(day).unwrap(),
            hour: Pillar::parse(hour).unwrap(),
        }
    }

    #[test]
    fn test_single_eating_god_scores_73() {
        let histogram: CategoryHistogram = [(Category::EatingGod, 1.0)].into_iter().collect();
        let mut values = [0; 10];
        values[Category::EatingGod as usize] = 15;
        let modifier = TraitModifier::new("test", values);
        assert_eq!(score_trait(&histogram, &modifier), 73);
    }

    #[test]
    fn test_zero_modifiers_score_50() {
        let chart = pillars("庚午", "辛巳", "甲子", "辛未");
        let hidden = HiddenStems::lookup(&chart);
        let histogram = histogram(&chart, &hidden);
        assert_eq!(score_trait(&histogram, &TraitModifier::uniform("flat", 0)), 50);
    }

    #[test]
    fn test_scores_clamp() {
        let histogram: CategoryHistogram = [(Category::Peer, 10.0)].into_iter().collect();
        assert_eq!(score_trait(&histogram, &TraitModifier::uniform("up", 30)), 100);
        assert_eq!(score_trait(&histogram, &TraitModifier::uniform("down", -30)), 0);
    }

    #[test]
    fn test_histogram_weights() {
        // 甲 day; 丙 year and month stems are eating gods, 庚 hour stem is seven killings.
        let chart = pillars("丙子", "丙子", "甲子", "庚子");
        let hidden = HiddenStems::lookup(&chart);
        let histogram = histogram(&chart, &hidden);

        assert!((histogram.weight(Category::EatingGod) - 2.0).abs() < 1e-9);
        assert!((histogram.weight(Category::SevenKillings) - 1.0).abs() < 1e-9);
        // 子 hides only 癸, a direct resource for 甲, once per pillar.
        assert!((histogram.weight(Category::DirectResource) - 4.0).abs() < 1e-9);
        assert!((histogram.total() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_minor_hidden_stems_weigh_less() {
        // 寅 hides 戊, 丙, 甲: two minor stems then the principal.
        let chart = pillars("甲子", "甲子", "甲寅", "甲子");
        let hidden = HiddenStems::lookup(&chart);
        let histogram = histogram(&chart, &hidden);

        assert!((histogram.weight(Category::IndirectWealth) - 0.3).abs() < 1e-9);
        assert!((histogram.weight(Category::EatingGod) - 0.3).abs() < 1e-9);
        assert!((histogram.weight(Category::Peer) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_chart_covers_every_trait() {
        let report = score_chart(&pillars("庚午", "辛巳", "甲子", "辛未"));
        assert_eq!(report.len(), 35);
        assert!(report.get("love", "selfEsteem").is_some());
        assert!(report.get("work", "drive").is_some());
    }

    #[test]
    fn test_summarize_orders_by_weight() {
        let histogram: CategoryHistogram = [
            (Category::Peer, 0.3),
            (Category::Rival, 2.0),
            (Category::EatingGod, 1.0),
        ]
        .into_iter()
        .collect();
        let summary = summarize(&histogram);
        assert_eq!(summary.len(), 3);
        assert_eq!(summary[0].0, Category::Rival);
        assert_eq!(summary[2].0, Category::Peer);
    }
}
