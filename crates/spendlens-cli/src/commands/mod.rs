//! CLI command implementations
//!
//! Commands are organized by output:
//! - `core` - Shared utilities (config loading, date range, feature loading)
//! - `analyze` - Full analysis report, text or JSON
//! - `features` - Feature table export (CSV or JSON)
//! - `insights` - Insight statements only

pub mod analyze;
pub mod core;
pub mod features;
pub mod insights;

// Re-export command functions for main.rs
pub use analyze::*;
pub use core::*;
pub use features::*;
pub use insights::*;

/// Truncate a string to at most `max` characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
