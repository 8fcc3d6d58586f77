//! Step outputs and the assembled report.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::category::CategoryHistogram;
use super::chart::{ChartData, HiddenStems};
use super::step::PipelineStep;

/// A structured document produced by a narrative-generation step.
///
/// `REQUIRED_FIELDS` lists the top-level keys that must be present in the
/// generated JSON; nested fields fall back to their defaults.
pub trait NarrativeOutput: Serialize + serde::de::DeserializeOwned + Send + 'static {
    const STEP: PipelineStep;
    const REQUIRED_FIELDS: &'static [&'static str];
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DayMaster {
    pub stem: String,
    pub element: String,
    pub yin_yang: String,
    pub characteristics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStructure {
    #[serde(rename = "type")]
    pub kind: String,
    pub quality: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UsefulElement {
    pub primary: String,
    pub secondary: String,
    pub harmful: String,
    pub reasoning: String,
}

/// Output of the `baseline` step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicAnalysis {
    pub day_master: DayMaster,
    pub structure: ChartStructure,
    #[serde(rename = "usefulGod")]
    pub useful_element: UsefulElement,
    pub summary: String,
}

impl NarrativeOutput for BasicAnalysis {
    const STEP: PipelineStep = PipelineStep::Baseline;
    const REQUIRED_FIELDS: &'static [&'static str] =
        &["dayMaster", "structure", "usefulGod", "summary"];
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoredNote {
    pub score: u8,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialStyle {
    #[serde(rename = "type")]
    pub kind: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

/// Output of the `personality` step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalityAnalysis {
    pub willpower: ScoredNote,
    pub outer_personality: String,
    pub inner_personality: String,
    pub social_style: SocialStyle,
}

impl NarrativeOutput for PersonalityAnalysis {
    const STEP: PipelineStep = PipelineStep::Personality;
    const REQUIRED_FIELDS: &'static [&'static str] =
        &["willpower", "outerPersonality", "innerPersonality", "socialStyle"];
}

/// Output of the `aptitude` step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AptitudeAnalysis {
    pub keywords: Vec<String>,
    pub talents: Vec<String>,
    pub recommended_fields: Vec<String>,
    #[serde(default)]
    pub avoid_fields: Vec<String>,
}

impl NarrativeOutput for AptitudeAnalysis {
    const STEP: PipelineStep = PipelineStep::Aptitude;
    const REQUIRED_FIELDS: &'static [&'static str] = &["keywords", "talents", "recommendedFields"];
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WealthOutlook {
    pub pattern: String,
    pub strengths: Vec<String>,
    pub risks: Vec<String>,
    pub advice: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoveOutlook {
    pub style: String,
    pub ideal_partner: Vec<String>,
    pub compatibility_points: Vec<String>,
    pub warnings: Vec<String>,
}

/// Output of the `fortune` step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FortuneAnalysis {
    pub wealth: WealthOutlook,
    pub love: LoveOutlook,
}

impl NarrativeOutput for FortuneAnalysis {
    const STEP: PipelineStep = PipelineStep::Fortune;
    const REQUIRED_FIELDS: &'static [&'static str] = &["wealth", "love"];
}

/// Trait scores keyed by trait name, per domain.
pub type DomainScores = BTreeMap<String, u8>;

/// Output of the `scoring` step.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreReport {
    pub histogram: CategoryHistogram,
    pub personality: DomainScores,
    pub work: DomainScores,
    pub aptitude: DomainScores,
    pub love: DomainScores,
}

impl ScoreReport {
    pub fn get(&self, domain: &str, trait_name: &str) -> Option<u8> {
        let scores = match domain {
            "personality" => &self.personality,
            "work" => &self.work,
            "aptitude" => &self.aptitude,
            "love" => &self.love,
            _ => return None,
        };
        scores.get(trait_name).copied()
    }

    pub fn len(&self) -> usize {
        self.personality.len() + self.work.len() + self.aptitude.len() + self.love.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Output of the `visualization` step. An empty image means rendering was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visualization {
    pub pillar_image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalitySection {
    pub title: String,
    pub content: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaSection {
    pub title: String,
    pub content: String,
    pub score: u8,
    pub advice: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyFlow {
    pub year: i32,
    pub theme: String,
    pub score: u8,
    pub advice: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicalReference {
    pub source: String,
    pub quote: String,
    pub interpretation: String,
}

/// The assembled multi-section report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalReport {
    pub summary: String,
    pub personality: PersonalitySection,
    pub wealth: AreaSection,
    pub love: AreaSection,
    pub career: AreaSection,
    pub health: AreaSection,
    pub yearly_flow: Vec<YearlyFlow>,
    pub classical_references: Vec<ClassicalReference>,
}

/// Everything a run has produced so far, keyed by step.
///
/// Each step writes only its own field, which is what lets the three domain
/// steps run concurrently against the same value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntermediateResults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden_stems: Option<HiddenStems>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<BasicAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personality: Option<PersonalityAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aptitude: Option<AptitudeAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fortune: Option<FortuneAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<ScoreReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visualization: Option<Visualization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<FinalReport>,
}

impl IntermediateResults {
    /// Whether the output owned by `step` is present.
    pub const fn has_output(&self, step: PipelineStep) -> bool {
        match step {
            PipelineStep::Chart => self.chart.is_some(),
            PipelineStep::HiddenStems => self.hidden_stems.is_some(),
            PipelineStep::Baseline => self.baseline.is_some(),
            PipelineStep::Personality => self.personality.is_some(),
            PipelineStep::Aptitude => self.aptitude.is_some(),
            PipelineStep::Fortune => self.fortune.is_some(),
            PipelineStep::Scoring => self.scores.is_some(),
            PipelineStep::Visualization => self.visualization.is_some(),
            PipelineStep::Finalize => self.report.is_some(),
            PipelineStep::Complete => false,
        }
    }

    /// Drop the outputs of `step` and every later step.
    pub fn clear_from(&mut self, step: PipelineStep) {
        for s in step.suffix() {
            match s {
                PipelineStep::Chart => self.chart = None,
                PipelineStep::HiddenStems => self.hidden_stems = None,
                PipelineStep::Baseline => self.baseline = None,
                PipelineStep::Personality => self.personality = None,
                PipelineStep::Aptitude => self.aptitude = None,
                PipelineStep::Fortune => self.fortune = None,
                PipelineStep::Scoring => self.scores = None,
                PipelineStep::Visualization => self.visualization = None,
                PipelineStep::Finalize => self.report = None,
                PipelineStep::Complete => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_analysis_wire_names() {
        let json = serde_json::json!({
            "dayMaster": {"stem": "甲", "element": "木", "yinYang": "양", "characteristics": ["곧음"]},
            "structure": {"type": "정관격", "quality": "상", "description": "..."},
            "usefulGod": {"primary": "水", "secondary": "木", "harmful": "金", "reasoning": "..."},
            "summary": "한 줄 요약"
        });
        let parsed: BasicAnalysis = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.structure.kind, "정관격");
        assert_eq!(parsed.useful_element.primary, "水");
        assert_eq!(parsed.day_master.yin_yang, "양");
    }

    #[test]
    fn test_nested_fields_default() {
        let json = serde_json::json!({
            "willpower": {"score": 80},
            "outerPersonality": "outgoing",
            "innerPersonality": "careful",
            "socialStyle": {}
        });
        let parsed: PersonalityAnalysis = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.willpower.score, 80);
        assert!(parsed.social_style.strengths.is_empty());
    }

    #[test]
    fn test_has_output_and_clear_from() {
        let mut results = IntermediateResults {
            visualization: Some(Visualization::default()),
            scores: Some(ScoreReport::default()),
            ..Default::default()
        };
        assert!(results.has_output(PipelineStep::Scoring));
        assert!(!results.has_output(PipelineStep::Chart));

        results.clear_from(PipelineStep::Visualization);
        assert!(results.has_output(PipelineStep::Scoring));
        assert!(!results.has_output(PipelineStep::Visualization));
    }
}
