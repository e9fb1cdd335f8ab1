pub mod cat;
pub mod extract;
pub mod list;
pub mod pack;
pub mod verify;

use glob::{MatchOptions, Pattern};

/// Whether a bundle path matches any of the glob patterns. `*` doesn't cross folders.
pub fn matches_any(patterns: &[Pattern], path: &str) -> bool {
    patterns.iter().any(|pattern| {
        pattern.matches_with(
            path,
            MatchOptions {
                require_literal_separator: true,
                ..Default::default()
            },
        )
    })
}
