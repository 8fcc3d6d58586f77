//! Compiled-in trait modifier tables.
//!
//! Each row lists the signed contribution of one unit of category weight, in
//! [`Category::ALL`] order: peer, rival, eating god, hurting officer, direct
//! wealth, indirect wealth, direct officer, seven killings, indirect resource,
//! direct resource.

use crate::domain::models::Category;

/// Per-category modifiers for a single trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraitModifier {
    pub name: &'static str,
    values: [i32; 10],
}

impl TraitModifier {
    /// Table with one signed modifier per category, in `Category::ALL` order.
    pub const fn new(name: &'static str, values: [i32; 10]) -> Self {
        Self { name, values }
    }

    /// A table where every category contributes the same amount.
    pub const fn uniform(name: &'static str, value: i32) -> Self {
        Self::new(name, [value; 10])
    }

    /// Modifier applied to one unit of `category` weight.
    pub const fn get(&self, category: Category) -> i32 {
        self.values[category as usize]
    }
}

/// The four scored domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreDomain {
    Personality,
    Work,
    Aptitude,
    Love,
}

impl ScoreDomain {
    /// Domains in report order.
    pub const ALL: [Self; 4] = [Self::Personality, Self::Work, Self::Aptitude, Self::Love];

    /// Key used for the domain in score reports.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Personality => "personality",
            Self::Work => "work",
            Self::Aptitude => "aptitude",
            Self::Love => "love",
        }
    }

    /// Trait tables scored for this domain.
    pub const fn modifiers(self) -> &'static [TraitModifier] {
        match self {
            Self::Personality => PERSONALITY,
            Self::Work => WORK,
            Self::Aptitude => APTITUDE,
            Self::Love => LOVE,
        }
    }
}

/// Ten personality traits.
pub const PERSONALITY: &[TraitModifier] = &[
    TraitModifier::new("willpower", [20, 16, -7, -4, -4, -4, 7, 11, 0, -4]),
    TraitModifier::new("sociability", [-4, 0, 20, 16, 7, 14, 4, -7, -16, -11]),
    TraitModifier::new("patience", [7, -11, 0, -16, 14, -4, 16, -7, 4, 20]),
    TraitModifier::new("independence", [20, 16, 0, 4, -4, 7, -7, 11, 7, -14]),
    TraitModifier::new("reliability", [7, -11, 0, -16, 14, -4, 20, -7, -4, 16]),
    TraitModifier::new("consideration", [-4, -14, 20, 0, 11, 4, 7, -11, -4, 16]),
    TraitModifier::new("humor", [0, 7, 20, 16, 0, 11, -14, -4, 4, -7]),
    TraitModifier::new("cooperation", [-11, -16, 14, -7, 11, 4, 16, 0, -7, 11]),
    TraitModifier::new("expressiveness", [0, 4, 16, 20, 0, 7, -7, 0, -11, -14]),
    TraitModifier::new("diligence", [7, -7, 0, -14, 20, -4, 16, 4, -4, 14]),
];

/// Five work-style traits.
pub const WORK: &[TraitModifier] = &[
    TraitModifier::new("planning", [-7, -20, 5, 13, -10, -17, 8, 0, 30, 23]),
    TraitModifier::new("drive", [17, 30, -7, 7, -17, 3, 0, 23, -10, -20]),
    TraitModifier::new("execution", [13, 20, -7, -10, 17, 3, 0, 23, -20, -13]),
    TraitModifier::new("completion", [0, -17, 7, -17, 30, -10, 23, -13, 3, 20]),
    TraitModifier::new("management", [0, -17, -7, -20, 20, 3, 30, 7, -10, 20]),
];

/// Ten aptitude traits.
pub const APTITUDE: &[TraitModifier] = &[
    TraitModifier::new("analytical", [0, -11, 0, 4, 7, -7, 11, 4, 20, 16]),
    TraitModifier::new("teamwork", [-11, -16, 14, -7, 11, 4, 16, 0, -7, 11]),
    TraitModifier::new("learning", [0, -11, 7, 0, 0, -7, 7, -4, 16, 20]),
    TraitModifier::new("creativity", [0, 4, 14, 20, -7, 7, -14, 0, 16, -4]),
    TraitModifier::new("artistry", [-4, 0, 16, 20, -4, 4, -11, -4, 14, 0]),
    TraitModifier::new("expression", [0, 4, 16, 20, 0, 7, -7, 0, -7, -14]),
    TraitModifier::new("activity", [14, 20, 4, 7, -7, 11, -4, 16, -7, -14]),
    TraitModifier::new("challenge", [14, 20, 0, 7, -11, 7, -4, 16, 4, -7]),
    TraitModifier::new("business", [4, 14, 0, 11, -4, 20, 0, 7, 0, -11]),
    TraitModifier::new("trustworthiness", [7, -11, 0, -16, 14, -4, 20, -4, -4, 16]),
];

/// Ten relationship traits.
pub const LOVE: &[TraitModifier] = &[
    TraitModifier::new("consideration", [-10, -20, 30, 0, 13, 3, 7, -17, -13, 23]),
    TraitModifier::new("humor", [0, 7, 30, 23, -10, 13, -20, -13, 3, -17]),
    TraitModifier::new("emotion", [-10, 0, 23, 20, -13, 3, -17, -20, 20, 10]),
    TraitModifier::new("selfEsteem", [30, 20, -10, 0, -17, -13, 7, 13, 3, -17]),
    TraitModifier::new("adventure", [3, 30, -10, 17, -17, 23, -17, 3, 0, -17]),
    TraitModifier::new("sincerity", [3, -17, 0, -20, 30, -17, 23, 3, -10, 20]),
    TraitModifier::new("sociability", [-10, 0, 30, 23, 7, 17, 3, -13, -20, -20]),
    TraitModifier::new("finance", [7, -20, -10, -17, 30, 20, 13, 0, -13, 7]),
    TraitModifier::new("trustworthiness", [7, -20, 0, -20, 20, -10, 30, 0, -13, 23]),
    TraitModifier::new("expressiveness", [3, 7, 23, 30, -10, 10, -13, 0, -17, -17]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trait_counts() {
        assert_eq!(PERSONALITY.len(), 10);
        assert_eq!(WORK.len(), 5);
        assert_eq!(APTITUDE.len(), 10);
        assert_eq!(LOVE.len(), 10);
        let total: usize = ScoreDomain::ALL.iter().map(|d| d.modifiers().len()).sum();
        assert_eq!(total, 35);
    }

    #[test]
    fn test_lookup_by_category() {
        let willpower = PERSONALITY[0];
        assert_eq!(willpower.get(Category::Peer), 20);
        assert_eq!(willpower.get(Category::SevenKillings), 11);
        assert_eq!(willpower.get(Category::DirectResource), -4);
        assert_eq!(WORK[0].get(Category::IndirectResource), 30);
    }
}
