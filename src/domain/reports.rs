//! Weekly reports parsed from markdown files with a YAML frontmatter block.

use serde::Deserialize;
use time::OffsetDateTime;

use super::error::DomainError;
use super::week::{is_valid_week_identifier, parse_report_date};

const FRONTMATTER_DELIMITER: &str = "---";
const EXCERPT_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub week: String,
    pub title: String,
    /// Date exactly as written in the frontmatter.
    pub date: String,
    pub published_at: OffsetDateTime,
    pub content: String,
    pub excerpt: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFrontmatter {
    title: Option<String>,
    week: Option<String>,
    date: Option<String>,
}

impl Report {
    /// Parse a report document, requiring `title`, `week` and a parseable `date`.
    pub fn parse(source: &str) -> Result<Self, DomainError> {
        let (frontmatter, content) = split_frontmatter(source)?;

        let raw: RawFrontmatter = serde_yaml::from_str(frontmatter)
            .map_err(|err| DomainError::malformed_report(format!("invalid frontmatter: {err}")))?;

        let title = required(raw.title, "title")?;
        let week = required(raw.week, "week")?;
        if !is_valid_week_identifier(&week) {
            return Err(DomainError::malformed_report(format!(
                "week identifier `{week}` is not of the form YYYY-week-N"
            )));
        }
        let date = required(raw.date, "date")?;
        let published_at = parse_report_date(&date)?;

        Ok(Self {
            excerpt: excerpt(content),
            week,
            title,
            date,
            published_at,
            content: content.to_string(),
        })
    }
}

/// A report together with the reports published around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportNeighbours {
    pub current: Report,
    /// The next older report.
    pub previous: Option<Report>,
    /// The next newer report.
    pub next: Option<Report>,
}

/// Find `week` in a newest-first list and pick its neighbours.
pub fn locate_with_neighbours(reports: Vec<Report>, week: &str) -> Option<ReportNeighbours> {
    let index = reports.iter().position(|report| report.week == week)?;
    let mut reports = reports.into_iter().map(Some).collect::<Vec<_>>();

    let previous = reports.get_mut(index + 1).and_then(Option::take);
    let next = match index {
        0 => None,
        _ => reports.get_mut(index - 1).and_then(Option::take),
    };
    let current = reports[index].take()?;

    Some(ReportNeighbours {
        current,
        previous,
        next,
    })
}

/// Sort newest first, keeping the first report seen for each week.
pub fn order_reports(reports: Vec<Report>) -> (Vec<Report>, Vec<Report>) {
    let mut seen = std::collections::HashSet::new();
    let (mut kept, duplicates): (Vec<_>, Vec<_>) = reports
        .into_iter()
        .partition(|report| seen.insert(report.week.clone()));
    kept.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    (kept, duplicates)
}

/// Split a document into its frontmatter block and body.
fn split_frontmatter(source: &str) -> Result<(&str, &str), DomainError> {
    let source = source.trim_start_matches('\u{feff}');
    let Some(rest) = strip_delimiter_line(source) else {
        return Err(DomainError::malformed_report(
            "document does not start with a frontmatter block",
        ));
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FRONTMATTER_DELIMITER {
            let frontmatter = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok((frontmatter, body));
        }
        offset += line.len();
    }

    Err(DomainError::malformed_report(
        "frontmatter block is not terminated",
    ))
}

fn strip_delimiter_line(source: &str) -> Option<&str> {
    let (first, rest) = match source.find('\n') {
        Some(index) => (&source[..index], &source[index + 1..]),
        None => (source, ""),
    };
    (first.trim_end() == FRONTMATTER_DELIMITER).then_some(rest)
}

fn required(value: Option<String>, field: &str) -> Result<String, DomainError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(DomainError::malformed_report(format!(
            "frontmatter field `{field}` is missing"
        ))),
    }
}

/// First 200 characters of the body without `#`, `*` and backtick markup.
pub fn excerpt(content: &str) -> String {
    let head: String = content
        .chars()
        .take(EXCERPT_CHARS)
        .filter(|ch| !matches!(ch, '#' | '*' | '`'))
        .collect();
    format!("{}...", head.trim())
}
