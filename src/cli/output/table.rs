//! Table output for scores, category weights and step timings using comfy-table.

use comfy_table::{presets, Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use std::collections::BTreeMap;
use std::env;

use crate::domain::models::{CategoryHistogram, DomainScores, PipelineStep, ScoreReport};
use crate::services::scoring::{summarize, ScoreDomain};

/// Table formatter for CLI output
pub struct TableFormatter {
    use_colors: bool,
    max_width: Option<u16>,
}

impl TableFormatter {
    /// Formatter that colours output unless `NO_COLOR` is set.
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    pub const fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// One row per trait, grouped by domain.
    pub fn format_scores(&self, scores: &ScoreReport) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            header("Domain"),
            header("Trait"),
            header("Score"),
        ]);

        let domains: [(ScoreDomain, &DomainScores); 4] = [
            (ScoreDomain::Personality, &scores.personality),
            (ScoreDomain::Work, &scores.work),
            (ScoreDomain::Aptitude, &scores.aptitude),
            (ScoreDomain::Love, &scores.love),
        ];
        for (domain, values) in domains {
            // Modifier table order rather than the map's alphabetical order.
            for modifier in domain.modifiers() {
                let Some(score) = values.get(modifier.name) else {
                    continue;
                };
                table.add_row(vec![
                    Cell::new(domain.name()),
                    Cell::new(modifier.name),
                    self.score_cell(*score),
                ]);
            }
        }
        table.to_string()
    }

    /// Non-zero category weights, heaviest first.
    pub fn format_histogram(&self, histogram: &CategoryHistogram) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![header("Category"), header("Weight")]);
        for (category, weight) in summarize(histogram) {
            table.add_row(vec![
                Cell::new(category.to_string()),
                Cell::new(format!("{weight:.1}")).set_alignment(CellAlignment::Right),
            ]);
        }
        table.to_string()
    }

    /// Per-step durations in pipeline order.
    pub fn format_durations(&self, durations: &BTreeMap<PipelineStep, u64>) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![header("Step"), header("Duration (ms)")]);
        for (step, ms) in durations {
            table.add_row(vec![
                Cell::new(step.as_str()),
                Cell::new(ms.to_string()).set_alignment(CellAlignment::Right),
            ]);
        }
        table.to_string()
    }

    fn score_cell(&self, score: u8) -> Cell {
        let cell = Cell::new(score.to_string()).set_alignment(CellAlignment::Right);
        if !self.use_colors {
            return cell;
        }
        let color = match score {
            70..=100 => Color::Green,
            40..=69 => Color::Reset,
            _ => Color::Yellow,
        };
        cell.fg(color)
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if let Some(width) = self.max_width {
            table.set_width(width);
        }
        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn header(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    !matches!(env::var("TERM").as_deref(), Ok("dumb"))
}
