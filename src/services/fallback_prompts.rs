//! Built-in prompts used when the prompt-assembly service is unavailable.

use crate::domain::models::FourPillars;
use crate::domain::ports::PromptKind;

const PREAMBLE: &str = "You are a master of Four Pillars analysis with thirty years of experience.";

/// Minimal prompt for `kind` listing the four pillars.
pub fn fallback_prompt(kind: PromptKind, pillars: &FourPillars) -> String {
    let task = match kind {
        PromptKind::Basic => "Analyse the chart below.",
        PromptKind::Personality => "Analyse the personality shown by the chart below.",
        PromptKind::Aptitude => "Analyse the aptitudes shown by the chart below.",
        PromptKind::Fortune => "Analyse the wealth and love outlook of the chart below.",
    };
    format!(
        "{PREAMBLE}\n{task}\n\nYear: {}\nMonth: {}\nDay: {}\nHour: {}\n\nRespond with JSON only.",
        pillars.year, pillars.month, pillars.day, pillars.hour
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Pillar;

    #[test]
    fn test_fallback_lists_pillars() {
        let pillars = FourPillars {
            year: Pillar::parse("庚午").unwrap(),
            month: Pillar::parse("辛巳").unwrap(),
            day: Pillar::parse("甲子").unwrap(),
            hour: Pillar::parse("辛未").unwrap(),
        };
        let prompt = fallback_prompt(PromptKind::Fortune, &pillars);
        assert!(prompt.contains("Year: 庚午"));
        assert!(prompt.contains("Hour: 辛未"));
        assert!(prompt.contains("wealth and love"));
        assert!(prompt.ends_with("JSON only."));
    }
}
