//! Shared helper functions for CLI commands

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::project::Project;
use crate::core::store::Store;

/// Discover the project and open its store, surfacing any load warnings
pub fn open_store() -> Result<(Project, Store)> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let store = Store::open(&project).into_diagnostic()?;
    print_store_warnings(&store);
    Ok((project, store))
}

pub fn print_store_warnings(store: &Store) {
    for warning in store.warnings() {
        eprintln!("{} {}", style("!").yellow(), warning);
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated.
/// Counts chars, not bytes, so multi-byte names never split mid-character.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
    }

    #[test]
    fn test_truncate_str_multibyte() {
        // Cyrillic herb names are two bytes per char; truncation must land
        // on a char boundary
        assert_eq!(truncate_str("Ашваганда экстракт", 18), "Ашваганда экстракт");
        assert_eq!(truncate_str("Ашваганда экстракт высший сорт", 18), "Ашваганда экстр...");
        assert_eq!(truncate_str("Тулси свежий", 10), "Тулси с...");
    }
}
