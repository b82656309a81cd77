use once_cell::sync::Lazy;
use regex::Regex;

use super::LibraryEntry;

pub const MAX_LIBRARIES: usize = 15;
const DEFAULT_CATEGORY: &str = "General";
const NO_DESCRIPTION: &str = "No description available";

static LINK_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*-\s*\[([^\]]+)\]\(([^)]+)\)\s*-?\s*(.*)$").expect("link pattern is valid")
});

/// Extract GitHub-hosted entries from an awesome-list README, grouped under
/// the nearest preceding `## ` heading.
pub fn parse_awesome_list(readme: &str) -> Vec<LibraryEntry> {
    let mut libraries = Vec::new();
    let mut category = DEFAULT_CATEGORY.to_string();

    for line in readme.lines() {
        if let Some(heading) = line.strip_prefix("## ") {
            category = heading.trim().to_string();
            continue;
        }

        if let Some(captures) = LINK_LINE.captures(line) {
            let url = &captures[2];
            if url.contains("github.com") {
                let description = captures[3].trim();
                libraries.push(LibraryEntry {
                    name: captures[1].to_string(),
                    url: url.to_string(),
                    description: if description.is_empty() {
                        NO_DESCRIPTION.to_string()
                    } else {
                        description.to_string()
                    },
                    category: category.clone(),
                });
            }
        }

        if libraries.len() >= MAX_LIBRARIES {
            break;
        }
    }

    libraries
}
