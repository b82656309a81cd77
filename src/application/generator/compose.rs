use std::fmt::Write as _;

use time::OffsetDateTime;

use super::{LibraryEntry, TrendingRepository};
use crate::domain::week::{format_display_date, format_timestamp};

pub fn report_title(published_at: OffsetDateTime) -> String {
    format!("React Weekly Trends - {}", format_display_date(published_at))
}

/// Render the weekly report document, frontmatter included.
pub fn compose_report(
    week: &str,
    published_at: OffsetDateTime,
    repositories: &[TrendingRepository],
    libraries: &[LibraryEntry],
) -> String {
    let title = report_title(published_at);
    let mut out = String::new();

    // `write!` into a String cannot fail.
    let _ = writeln!(out, "---");
    let _ = writeln!(out, "title: \"{title}\"");
    let _ = writeln!(out, "week: \"{week}\"");
    let _ = writeln!(out, "date: \"{}\"", format_timestamp(published_at));
    let _ = writeln!(out, "---");
    let _ = writeln!(out);
    let _ = writeln!(out, "# 🔥 {title}");
    let _ = writeln!(out);
    out.push_str(
        "Welcome to this week's React Weekly Trends report! This week brings exciting updates \
         from the React ecosystem, with new libraries, trending repositories, and important \
         community developments.\n\n",
    );

    out.push_str("## 📈 Trending React Repositories\n\n");
    for (index, repo) in repositories.iter().enumerate() {
        let _ = writeln!(
            out,
            "### {}. **[{}]({})** ⭐ {}",
            index + 1,
            repo.name,
            repo.html_url,
            group_thousands(repo.stargazers_count)
        );
        let _ = writeln!(
            out,
            "{}\n",
            repo.description.as_deref().unwrap_or("No description available")
        );
        let _ = writeln!(
            out,
            "**Language**: {} | **Forks**: {}\n",
            repo.language.as_deref().unwrap_or("Unknown"),
            group_thousands(repo.forks_count)
        );
    }

    out.push_str("\n## 📚 Library Updates\n\n");
    for library in libraries {
        let _ = writeln!(out, "### **{}** - {}", library.name, library.category);
        let _ = writeln!(out, "{}\n", library.description);
        let _ = writeln!(
            out,
            "**Category**: {} | **URL**: {}\n",
            library.category, library.url
        );
    }

    out.push_str("\n## 🚀 Community Highlights\n\n");
    out.push_str("- **React Conf 2025** announced for March 15-16 in San Francisco\n");
    out.push_str("- **Next.js 15.1** beta released with improved build performance\n");
    out.push_str("- **React Native 0.76** brings new architecture improvements\n\n");

    out.push_str("\n## 📊 This Week's Insights\n\n");
    out.push_str("The React ecosystem continues to evolve rapidly, with a focus on:\n");
    out.push_str("- Performance optimization and bundle size reduction\n");
    out.push_str("- Improved developer experience with better TypeScript support\n");
    out.push_str("- Enhanced server-side rendering capabilities\n");
    out.push_str("- State management simplification\n\n");

    out.push_str("Stay tuned for next week's trends and discoveries in the React world!\n");
    out
}

/// `2847` → `2,847`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::application::generator::mock::{mock_libraries, mock_repositories};
    use crate::domain::reports::Report;

    #[test]
    fn groups_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(2_847), "2,847");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn sections_appear_in_order() {
        let now = datetime!(2025-11-27 10:00 UTC);
        let doc = compose_report(
            "2025-week-48",
            now,
            &mock_repositories(now),
            &mock_libraries(),
        );

        let markers = [
            "---\ntitle:",
            "# 🔥 React Weekly Trends - November 27, 2025",
            "Welcome to this week's",
            "## 📈 Trending React Repositories",
            "## 📚 Library Updates",
            "## 🚀 Community Highlights",
            "## 📊 This Week's Insights",
            "Stay tuned for next week's trends",
        ];
        let positions: Vec<usize> = markers
            .iter()
            .map(|marker| doc.find(marker).unwrap_or_else(|| panic!("missing {marker}")))
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn generated_document_parses_as_a_report() {
        let now = datetime!(2025-01-08 09:30 UTC);
        let doc = compose_report("2025-week-2", now, &mock_repositories(now), &mock_libraries());

        let report = Report::parse(&doc).expect("generated report is valid");
        assert_eq!(report.week, "2025-week-2");
        assert_eq!(report.title, "React Weekly Trends - January 8, 2025");
        assert_eq!(report.published_at, now);
        assert!(report.content.contains("⭐ 2,847"));
        assert!(report.content.contains("**Category**: Routing | **URL**: https://tanstack.com/router"));
    }
}
