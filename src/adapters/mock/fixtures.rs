//! Canned narrative outputs and a sample chart for offline runs and tests.

use crate::domain::models::{Branch, ChartData, DecadePeriod, FourPillars, Pillar, Stem};
use crate::domain::ports::PromptKind;

/// A well-formed narrative response for `kind`.
pub fn sample_output(kind: PromptKind) -> &'static str {
    match kind {
        PromptKind::Basic => {
            r#"{
  "dayMaster": {"stem": "甲", "element": "木", "yinYang": "yang", "characteristics": ["upright", "principled"]},
  "structure": {"type": "direct officer", "quality": "high", "description": "A balanced chart with a clear officer."},
  "usefulGod": {"primary": "水", "secondary": "木", "harmful": "金", "reasoning": "Water nourishes a weak wood day master."},
  "summary": "Steady growth through patience."
}"#
        }
        PromptKind::Personality => {
            r#"{
  "willpower": {"score": 72, "description": "Firm once committed."},
  "outerPersonality": "Calm and courteous.",
  "innerPersonality": "Ambitious and self-critical.",
  "socialStyle": {"type": "selective", "strengths": ["loyal"], "weaknesses": ["reserved"]}
}"#
        }
        PromptKind::Aptitude => {
            r#"{
  "keywords": ["planning", "research", "mentoring"],
  "talents": ["structured thinking", "writing"],
  "recommendedFields": ["education", "policy"],
  "avoidFields": ["high-pressure sales"]
}"#
        }
        PromptKind::Fortune => {
            r#"{
  "wealth": {"pattern": "Slow accumulation", "strengths": ["saving"], "risks": ["speculation"], "advice": "Favour long-term holdings."},
  "love": {"style": "Devoted", "idealPartner": ["warm"], "compatibilityPoints": ["shared goals"], "warnings": ["over-caution"]}
}"#
        }
    }
}

/// 庚午 辛巳 甲子 辛未 with a short decade-cycle list.
pub fn sample_chart() -> ChartData {
    ChartData {
        pillars: FourPillars {
            year: Pillar::new(Stem::Gyeong, Branch::O),
            month: Pillar::new(Stem::Sin, Branch::Sa),
            day: Pillar::new(Stem::Gap, Branch::Ja),
            hour: Pillar::new(Stem::Sin, Branch::Mi),
        },
        decade_cycles: vec![
            DecadePeriod {
                start_age: 3,
                stem: Stem::Im,
                branch: Branch::O,
                start_year: Some(1993),
            },
            DecadePeriod {
                start_age: 13,
                stem: Stem::Gye,
                branch: Branch::Mi,
                start_year: Some(2003),
            },
        ],
    }
}
