//! `saju classify`: one stem relative to a day stem.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{classify_symbols, Category};

/// Arguments of `saju classify`.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Day stem (Hanja or Hangul, e.g. 甲 or 갑)
    pub day: String,
    /// Stem to classify
    pub other: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyOutput {
    pub day: String,
    pub other: String,
    pub category: Category,
    pub hanja: &'static str,
}

impl CommandOutput for ClassifyOutput {
    fn to_human(&self) -> String {
        format!("{} relative to {}: {}", self.other, self.day, self.category)
    }
}

/// Classify `other` against the day stem.
pub fn classify(args: &ClassifyArgs) -> Result<ClassifyOutput> {
    let category = classify_symbols(&args.day, &args.other)?;
    Ok(ClassifyOutput {
        day: args.day.clone(),
        other: args.other.clone(),
        category,
        hanja: category.hanja(),
    })
}

pub fn execute(args: &ClassifyArgs, json_mode: bool) -> Result<()> {
    output(&classify(args)?, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(day: &str, other: &str) -> ClassifyArgs {
        ClassifyArgs {
            day: day.into(),
            other: other.into(),
        }
    }

    #[test]
    fn test_classify_hanja_and_hangul() {
        assert_eq!(classify(&args("甲", "庚")).unwrap().category, Category::SevenKillings);
        assert_eq!(classify(&args("갑", "을")).unwrap().category, Category::Rival);
    }

    #[test]
    fn test_classify_rejects_unknown_symbol() {
        assert!(classify(&args("甲", "X")).is_err());
    }

    #[test]
    fn test_json_uses_camel_case_category() {
        let value = classify(&args("甲", "丙")).unwrap().to_json();
        assert_eq!(value["category"], "eatingGod");
    }
}
