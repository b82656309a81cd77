//! Fixed data used when the upstream sources cannot be reached.

use time::OffsetDateTime;

use super::{LibraryEntry, TrendingRepository};
use crate::domain::week::format_timestamp;

pub fn mock_repositories(now: OffsetDateTime) -> Vec<TrendingRepository> {
    let updated_at = format_timestamp(now);
    vec![
        TrendingRepository {
            name: "react-19-features".to_string(),
            full_name: "facebook/react-19-features".to_string(),
            description: Some(
                "A comprehensive showcase of React 19's new features including the React Compiler and improved Server Components"
                    .to_string(),
            ),
            stargazers_count: 2847,
            forks_count: 189,
            language: Some("TypeScript".to_string()),
            updated_at: updated_at.clone(),
            html_url: "https://github.com/facebook/react".to_string(),
            homepage: Some("https://react.dev".to_string()),
        },
        TrendingRepository {
            name: "nextjs-15-performance".to_string(),
            full_name: "vercel/nextjs-15-performance".to_string(),
            description: Some(
                "Performance optimization techniques and benchmarks for Next.js 15 applications"
                    .to_string(),
            ),
            stargazers_count: 1892,
            forks_count: 156,
            language: Some("JavaScript".to_string()),
            updated_at: updated_at.clone(),
            html_url: "https://github.com/vercel/next.js".to_string(),
            homepage: Some("https://nextjs.org".to_string()),
        },
        TrendingRepository {
            name: "tanstack-query-v6".to_string(),
            full_name: "tanstack/query".to_string(),
            description: Some(
                "The latest version of TanStack Query with improved caching and devtools"
                    .to_string(),
            ),
            stargazers_count: 3421,
            forks_count: 421,
            language: Some("TypeScript".to_string()),
            updated_at,
            html_url: "https://github.com/tanstack/query".to_string(),
            homepage: Some("https://tanstack.com/query".to_string()),
        },
    ]
}

pub fn mock_libraries() -> Vec<LibraryEntry> {
    vec![
        LibraryEntry {
            name: "@tanstack/router".to_string(),
            url: "https://tanstack.com/router".to_string(),
            description:
                "A fully type-safe router with built-in data loading and caching capabilities"
                    .to_string(),
            category: "Routing".to_string(),
        },
        LibraryEntry {
            name: "react-hook-form-v8".to_string(),
            url: "https://react-hook-form.com".to_string(),
            description:
                "The latest version with improved performance and new validation features"
                    .to_string(),
            category: "Forms".to_string(),
        },
        LibraryEntry {
            name: "zustand-v5".to_string(),
            url: "https://zustand.docs.pmnd.rs".to_string(),
            description: "Lightweight state management with improved TypeScript support and middleware enhancements"
                .to_string(),
            category: "State Management".to_string(),
        },
    ]
}
