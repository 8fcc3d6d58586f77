//! The ten relationship categories and the classification rule.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::chart::Stem;
use crate::domain::errors::DomainResult;

/// Relationship of a stem to the reference (day) stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    /// 比肩
    Peer,
    /// 劫財
    Rival,
    /// 食神
    EatingGod,
    /// 傷官
    HurtingOfficer,
    /// 正財
    DirectWealth,
    /// 偏財
    IndirectWealth,
    /// 正官
    DirectOfficer,
    /// 偏官
    SevenKillings,
    /// 偏印
    IndirectResource,
    /// 正印
    DirectResource,
}

impl Category {
    /// Categories in modifier-table order.
    pub const ALL: [Self; 10] = [
        Self::Peer,
        Self::Rival,
        Self::EatingGod,
        Self::HurtingOfficer,
        Self::DirectWealth,
        Self::IndirectWealth,
        Self::DirectOfficer,
        Self::SevenKillings,
        Self::IndirectResource,
        Self::DirectResource,
    ];

    /// Traditional two-character name.
    pub const fn hanja(self) -> &'static str {
        match self {
            Self::Peer => "比肩",
            Self::Rival => "劫財",
            Self::EatingGod => "食神",
            Self::HurtingOfficer => "傷官",
            Self::DirectWealth => "正財",
            Self::IndirectWealth => "偏財",
            Self::DirectOfficer => "正官",
            Self::SevenKillings => "偏官",
            Self::IndirectResource => "偏印",
            Self::DirectResource => "正印",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Peer => "peer",
            Self::Rival => "rival",
            Self::EatingGod => "eatingGod",
            Self::HurtingOfficer => "hurtingOfficer",
            Self::DirectWealth => "directWealth",
            Self::IndirectWealth => "indirectWealth",
            Self::DirectOfficer => "directOfficer",
            Self::SevenKillings => "sevenKillings",
            Self::IndirectResource => "indirectResource",
            Self::DirectResource => "directResource",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.hanja())
    }
}

/// Classify `other` relative to `reference`.
///
/// Total over every pair of stems: the generation and dominance cycles are
/// permutations of the five elements, so exactly one rule matches.
pub fn classify(reference: Stem, other: Stem) -> Category {
    let (me, them) = (reference.element(), other.element());
    let same = reference.polarity() == other.polarity();

    if me == them {
        if same { Category::Peer } else { Category::Rival }
    } else if me.generates() == them {
        if same { Category::EatingGod } else { Category::HurtingOfficer }
    } else if them.generates() == me {
        if same { Category::IndirectResource } else { Category::DirectResource }
    } else if me.overcomes() == them {
        if same { Category::IndirectWealth } else { Category::DirectWealth }
    } else if same {
        Category::SevenKillings
    } else {
        Category::DirectOfficer
    }
}

/// Classify two stem symbols, rejecting anything that is not a stem.
pub fn classify_symbols(reference: &str, other: &str) -> DomainResult<Category> {
    Ok(classify(reference.parse()?, other.parse()?))
}

/// Weighted count of each category across a chart.
///
/// Always carries all ten keys so that serialized output is stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryHistogram(BTreeMap<Category, f64>);

impl Default for CategoryHistogram {
    fn default() -> Self {
        Self(Category::ALL.into_iter().map(|c| (c, 0.0)).collect())
    }
}

impl CategoryHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate `weight` for `category`.
    pub fn add(&mut self, category: Category, weight: f64) {
        *self.0.entry(category).or_insert(0.0) += weight;
    }

    /// Weight accumulated for `category`.
    pub fn weight(&self, category: Category) -> f64 {
        self.0.get(&category).copied().unwrap_or(0.0)
    }

    /// Sum of all weights.
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.0.iter().map(|(c, w)| (*c, *w))
    }
}

impl FromIterator<(Category, f64)> for CategoryHistogram {
    fn from_iter<I: IntoIterator<Item = (Category, f64)>>(iter: I) -> Self {
        let mut histogram = Self::new();
        for (category, weight) in iter {
            histogram.add(category, weight);
        }
        histogram
    }
}
