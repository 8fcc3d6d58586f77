//! Birth-chart vocabulary: elements, polarity, stems, branches and pillars.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::{DomainError, DomainResult};

/// One of the five elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

impl Element {
    pub const ALL: [Self; 5] = [Self::Wood, Self::Fire, Self::Earth, Self::Metal, Self::Water];

    /// The element this one generates (wood→fire→earth→metal→water→wood).
    pub const fn generates(self) -> Self {
        match self {
            Self::Wood => Self::Fire,
            Self::Fire => Self::Earth,
            Self::Earth => Self::Metal,
            Self::Metal => Self::Water,
            Self::Water => Self::Wood,
        }
    }

    /// The element this one overcomes (wood→earth→water→fire→metal→wood).
    pub const fn overcomes(self) -> Self {
        match self {
            Self::Wood => Self::Earth,
            Self::Earth => Self::Water,
            Self::Water => Self::Fire,
            Self::Fire => Self::Metal,
            Self::Metal => Self::Wood,
        }
    }

    pub const fn hanja(self) -> &'static str {
        match self {
            Self::Wood => "木",
            Self::Fire => "火",
            Self::Earth => "土",
            Self::Metal => "金",
            Self::Water => "水",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Wood => "wood",
            Self::Fire => "fire",
            Self::Earth => "earth",
            Self::Metal => "metal",
            Self::Water => "water",
        };
        f.write_str(name)
    }
}

/// Yang (positive) or yin (negative).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Yang,
    Yin,
}

/// Heavenly stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stem {
    Gap,
    Eul,
    Byeong,
    Jeong,
    Mu,
    Gi,
    Gyeong,
    Sin,
    Im,
    Gye,
}

const STEM_SYMBOLS: [(Stem, &str, &str); 10] = [
    (Stem::Gap, "甲", "갑"),
    (Stem::Eul, "乙", "을"),
    (Stem::Byeong, "丙", "병"),
    (Stem::Jeong, "丁", "정"),
    (Stem::Mu, "戊", "무"),
    (Stem::Gi, "己", "기"),
    (Stem::Gyeong, "庚", "경"),
    (Stem::Sin, "辛", "신"),
    (Stem::Im, "壬", "임"),
    (Stem::Gye, "癸", "계"),
];

impl Stem {
    pub const ALL: [Self; 10] = [
        Self::Gap,
        Self::Eul,
        Self::Byeong,
        Self::Jeong,
        Self::Mu,
        Self::Gi,
        Self::Gyeong,
        Self::Sin,
        Self::Im,
        Self::Gye,
    ];

    /// Five-phase element of this symbol.
    pub const fn element(self) -> Element {
        match self {
            Self::Gap | Self::Eul => Element::Wood,
            Self::Byeong | Self::Jeong => Element::Fire,
            Self::Mu | Self::Gi => Element::Earth,
            Self::Gyeong | Self::Sin => Element::Metal,
            Self::Im | Self::Gye => Element::Water,
        }
    }

    /// Yin or yang.
    pub const fn polarity(self) -> Polarity {
        match self {
            Self::Gap | Self::Byeong | Self::Mu | Self::Gyeong | Self::Im => Polarity::Yang,
            Self::Eul | Self::Jeong | Self::Gi | Self::Sin | Self::Gye => Polarity::Yin,
        }
    }

    pub const fn symbol(self) -> &'static str {
        STEM_SYMBOLS[self as usize].1
    }
}

impl fmt::Display for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Stem {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        let s = s.trim();
        STEM_SYMBOLS
            .iter()
            .find(|(_, hanja, hangul)| *hanja == s || *hangul == s)
            .map(|(stem, _, _)| *stem)
            .ok_or_else(|| DomainError::InvalidInput(format!("unrecognized stem symbol '{s}'")))
    }
}

impl Serialize for Stem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.symbol())
    }
}

impl<'de> Deserialize<'de> for Stem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Earthly branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Branch {
    Ja,
    Chuk,
    In,
    Myo,
    Jin,
    Sa,
    O,
    Mi,
    Sin,
    Yu,
    Sul,
    Hae,
}

const BRANCH_SYMBOLS: [(Branch, &str, &str); 12] = [
    (Branch::Ja, "子", "자"),
    (Branch::Chuk, "丑", "축"),
    (Branch::In, "寅", "인"),
    (Branch::Myo, "卯", "묘"),
    (Branch::Jin, "辰", "진"),
    (Branch::Sa, "巳", "사"),
    (Branch::O, "午", "오"),
    (Branch::Mi, "未", "미"),
    (Branch::Sin, "申", "신"),
    (Branch::Yu, "酉", "유"),
    (Branch::Sul, "戌", "술"),
    (Branch::Hae, "亥", "해"),
];

impl Branch {
    pub const ALL: [Self; 12] = [
        Self::Ja,
        Self::Chuk,
        Self::In,
        Self::Myo,
        Self::Jin,
        Self::Sa,
        Self::O,
        Self::Mi,
        Self::Sin,
        Self::Yu,
        Self::Sul,
        Self::Hae,
    ];

    /// Five-phase element of this symbol.
    pub const fn element(self) -> Element {
        match self {
            Self::Ja | Self::Hae => Element::Water,
            Self::In | Self::Myo => Element::Wood,
            Self::Sa | Self::O => Element::Fire,
            Self::Sin | Self::Yu => Element::Metal,
            Self::Chuk | Self::Jin | Self::Mi | Self::Sul => Element::Earth,
        }
    }

    /// Stems hidden in this branch, weakest first; the last entry is the proper stem.
    pub const fn hidden_stems(self) -> &'static [Stem] {
        use Stem::{Byeong, Eul, Gap, Gi, Gye, Gyeong, Im, Jeong, Mu, Sin};
        match self {
            Self::Ja => &[Gye],
            Self::Chuk => &[Gye, Sin, Gi],
            Self::In => &[Mu, Byeong, Gap],
            Self::Myo => &[Eul],
            Self::Jin => &[Eul, Gye, Mu],
            Self::Sa => &[Mu, Gyeong, Byeong],
            Self::O => &[Gi, Jeong],
            Self::Mi => &[Jeong, Eul, Gi],
            Self::Sin => &[Gi, Im, Gyeong],
            Self::Yu => &[Sin],
            Self::Sul => &[Sin, Jeong, Mu],
            Self::Hae => &[Mu, Gap, Im],
        }
    }

    pub const fn symbol(self) -> &'static str {
        BRANCH_SYMBOLS[self as usize].1
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Branch {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        let s = s.trim();
        BRANCH_SYMBOLS
            .iter()
            .find(|(_, hanja, hangul)| *hanja == s || *hangul == s)
            .map(|(branch, _, _)| *branch)
            .ok_or_else(|| DomainError::InvalidInput(format!("unrecognized branch symbol '{s}'")))
    }
}

impl Serialize for Branch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.symbol())
    }
}

impl<'de> Deserialize<'de> for Branch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Position of a pillar within the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PillarPosition {
    Year,
    Month,
    Day,
    Hour,
}

impl PillarPosition {
    pub const ALL: [Self; 4] = [Self::Year, Self::Month, Self::Day, Self::Hour];
}

/// One chart position: a stem over a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub struct Pillar {
    pub stem: Stem,
    pub branch: Branch,
}

impl Pillar {
    /// Pillar from its stem and branch.
    pub const fn new(stem: Stem, branch: Branch) -> Self {
        Self { stem, branch }
    }

    /// Parse a two-symbol pillar such as `甲子`.
    pub fn parse(text: &str) -> DomainResult<Self> {
        let mut chars = text.trim().chars();
        let (Some(stem), Some(branch), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(DomainError::InvalidInput(format!(
                "pillar '{text}' must be exactly one stem followed by one branch"
            )));
        };
        Ok(Self {
            stem: stem.to_string().parse()?,
            branch: branch.to_string().parse()?,
        })
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.stem, self.branch)
    }
}

impl Serialize for Pillar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Pillar", 4)?;
        state.serialize_field("stem", &self.stem)?;
        state.serialize_field("branch", &self.branch)?;
        state.serialize_field("stemElement", self.stem.element().hanja())?;
        state.serialize_field("branchElement", self.branch.element().hanja())?;
        state.end()
    }
}

/// The four pillars of a birth chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FourPillars {
    pub year: Pillar,
    pub month: Pillar,
    pub day: Pillar,
    pub hour: Pillar,
}

impl FourPillars {
    pub const fn get(&self, position: PillarPosition) -> Pillar {
        match position {
            PillarPosition::Year => self.year,
            PillarPosition::Month => self.month,
            PillarPosition::Day => self.day,
            PillarPosition::Hour => self.hour,
        }
    }

    /// The day stem, against which every other stem is classified.
    pub const fn reference_stem(&self) -> Stem {
        self.day.stem
    }

    pub fn iter(&self) -> impl Iterator<Item = (PillarPosition, Pillar)> + '_ {
        PillarPosition::ALL.into_iter().map(|p| (p, self.get(p)))
    }
}

/// One decade-long luck period produced by the calendar service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecadePeriod {
    #[serde(alias = "age")]
    pub start_age: u32,
    pub stem: Stem,
    pub branch: Branch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_year: Option<i32>,
}

/// Output of the `chart` step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub pillars: FourPillars,
    #[serde(default, alias = "daewun")]
    pub decade_cycles: Vec<DecadePeriod>,
}

/// Hidden stems of each pillar's branch, weakest first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HiddenStems {
    pub year: Vec<Stem>,
    pub month: Vec<Stem>,
    pub day: Vec<Stem>,
    pub hour: Vec<Stem>,
}

impl HiddenStems {
    /// Look up the hidden stems of every pillar from the fixed branch table.
    pub fn lookup(pillars: &FourPillars) -> Self {
        Self {
            year: pillars.year.branch.hidden_stems().to_vec(),
            month: pillars.month.branch.hidden_stems().to_vec(),
            day: pillars.day.branch.hidden_stems().to_vec(),
            hour: pillars.hour.branch.hidden_stems().to_vec(),
        }
    }

    /// Hidden stems of the branch at `position`, principal stem last.
    pub fn get(&self, position: PillarPosition) -> &[Stem] {
        match position {
            PillarPosition::Year => &self.year,
            PillarPosition::Month => &self.month,
            PillarPosition::Day => &self.day,
            PillarPosition::Hour => &self.hour,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_attributes() {
        assert_eq!(Stem::Gap.element(), Element::Wood);
        assert_eq!(Stem::Gap.polarity(), Polarity::Yang);
        assert_eq!(Stem::Gye.element(), Element::Water);
        assert_eq!(Stem::Gye.polarity(), Polarity::Yin);
    }

    #[test]
    fn test_stem_parse_hanja_and_hangul() {
        assert_eq!("丙".parse::<Stem>().unwrap(), Stem::Byeong);
        assert_eq!("병".parse::<Stem>().unwrap(), Stem::Byeong);
        assert!(matches!("X".parse::<Stem>(), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn test_cycles_are_permutations() {
        for element in Element::ALL {
            assert_ne!(element.generates(), element);
            assert_ne!(element.overcomes(), element);
            assert_ne!(element.generates(), element.overcomes());
        }
    }

    #[test]
    fn test_hidden_stem_table() {
        assert_eq!(Branch::Ja.hidden_stems(), &[Stem::Gye]);
        assert_eq!(Branch::In.hidden_stems(), &[Stem::Mu, Stem::Byeong, Stem::Gap]);
        assert_eq!(Branch::O.hidden_stems().len(), 2);
        for branch in Branch::ALL {
            let stems = branch.hidden_stems();
            assert!(!stems.is_empty() && stems.len() <= 3);
        }
    }

    #[test]
    fn test_pillar_parse_and_serialize() {
        let pillar = Pillar::parse("甲子").unwrap();
        assert_eq!(pillar, Pillar::new(Stem::Gap, Branch::Ja));

        let json = serde_json::to_value(pillar).unwrap();
        assert_eq!(json["stem"], "甲");
        assert_eq!(json["branch"], "子");
        assert_eq!(json["stemElement"], "木");
        assert_eq!(json["branchElement"], "水");

        let back: Pillar = serde_json::from_value(json).unwrap();
        assert_eq!(back, pillar);

        assert!(Pillar::parse("甲").is_err());
        assert!(Pillar::parse("甲子丑").is_err());
    }

    #[test]
    fn test_chart_accepts_daewun_alias() {
        let json = serde_json::json!({
            "pillars": {
                "year": {"stem": "庚", "branch": "午", "element": "金"},
                "month": {"stem": "辛", "branch": "巳"},
                "day": {"stem": "甲", "branch": "子"},
                "hour": {"stem": "辛", "branch": "未"}
            },
            "daewun": [{"age": 1, "stem": "壬", "branch": "午", "startYear": 1991}]
        });
        let chart: ChartData = serde_json::from_value(json).unwrap();
        assert_eq!(chart.pillars.reference_stem(), Stem::Gap);
        assert_eq!(chart.decade_cycles[0].start_age, 1);
        assert_eq!(chart.decade_cycles[0].start_year, Some(1991));
    }
}
