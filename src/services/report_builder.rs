//! Final report assembly from accumulated step outputs.

use tracing::warn;

use crate::domain::models::{
    AreaSection, ClassicalReference, FinalReport, IntermediateResults, PersonalitySection,
};

const NEUTRAL_SCORE: u8 = 50;

/// Assemble the report. Missing outputs are replaced with neutral defaults.
pub fn build_report(outputs: &IntermediateResults) -> FinalReport {
    if outputs.baseline.is_none() {
        warn!("Baseline analysis missing, report uses default summary");
    }
    for (name, present) in [
        ("personality", outputs.personality.is_some()),
        ("aptitude", outputs.aptitude.is_some()),
        ("fortune", outputs.fortune.is_some()),
        ("scores", outputs.scores.is_some()),
    ] {
        if !present {
            warn!(section = name, "Output missing, report section uses defaults");
        }
    }

    let baseline = outputs.baseline.as_ref();
    let aptitude = outputs.aptitude.as_ref();
    let fortune = outputs.fortune.as_ref();
    let score = |domain: &str, name: &str| {
        outputs
            .scores
            .as_ref()
            .and_then(|s| s.get(domain, name))
            .unwrap_or(NEUTRAL_SCORE)
    };

    FinalReport {
        summary: baseline
            .map(|b| b.summary.clone())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Analysis generated.".to_string()),
        personality: PersonalitySection {
            title: "Personality".to_string(),
            content: outputs.personality.as_ref().map_or_else(
                || "Personality analysis".to_string(),
                |p| format!("{}\n\n{}", p.outer_personality, p.inner_personality),
            ),
            keywords: aptitude.map(|a| a.keywords.clone()).unwrap_or_default(),
        },
        wealth: AreaSection {
            title: "Wealth".to_string(),
            content: fortune
                .map(|f| f.wealth.pattern.clone())
                .unwrap_or_else(|| "Wealth outlook".to_string()),
            score: score("aptitude", "business"),
            advice: fortune.map(|f| f.wealth.advice.clone()).unwrap_or_default(),
        },
        love: AreaSection {
            title: "Love".to_string(),
            content: fortune
                .map(|f| f.love.style.clone())
                .unwrap_or_else(|| "Love outlook".to_string()),
            score: score("love", "emotion"),
            advice: fortune.map(|f| f.love.warnings.join(", ")).unwrap_or_default(),
        },
        career: AreaSection {
            title: "Career".to_string(),
            content: aptitude
                .map(|a| a.talents.join(", "))
                .unwrap_or_else(|| "Career outlook".to_string()),
            score: score("work", "execution"),
            advice: aptitude
                .map(|a| a.recommended_fields.join(", "))
                .unwrap_or_default(),
        },
        health: AreaSection {
            title: "Health".to_string(),
            content: "Health outlook".to_string(),
            score: NEUTRAL_SCORE,
            advice: "Keep a regular routine.".to_string(),
        },
        yearly_flow: Vec::new(),
        classical_references: baseline
            .map(|b| {
                vec![ClassicalReference {
                    source: "Ziping Zhenquan".to_string(),
                    quote: b.useful_element.reasoning.clone(),
                    interpretation: format!(
                        "Useful element: {}, favourable element: {}",
                        b.useful_element.primary, b.useful_element.secondary
                    ),
                }]
            })
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{AptitudeAnalysis, ScoreReport};

    #[test]
    fn test_empty_outputs_use_defaults() {
        let report = build_report(&IntermediateResults::default());
        assert_eq!(report.summary, "Analysis generated.");
        assert_eq!(report.wealth.score, 50);
        assert!(report.classical_references.is_empty());
        assert!(report.yearly_flow.is_empty());
    }

    #[test]
    fn test_sections_pull_from_outputs() {
        let mut scores = ScoreReport::default();
        scores.work.insert("execution".into(), 81);
        let outputs = IntermediateResults {
            aptitude: Some(AptitudeAnalysis {
                keywords: vec!["focus".into()],
                talents: vec!["analysis".into(), "writing".into()],
                recommended_fields: vec!["research".into()],
                avoid_fields: vec![],
            }),
            scores: Some(scores),
            ..Default::default()
        };

        let report = build_report(&outputs);
        assert_eq!(report.career.score, 81);
        assert_eq!(report.career.content, "analysis, writing");
        assert_eq!(report.personality.keywords, vec!["focus"]);
    }
}
