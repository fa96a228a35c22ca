//! Named, bounded diagnostic logs for operational dumps.
//!
//! Independent of the slot registry and guarded by its own mutex so that
//! logging never contends with registry reads.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::LogError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogLine {
    pub ts: DateTime<Utc>,
    pub text: String,
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ts.format("%m-%d %H:%M:%S%.3f"), self.text)
    }
}

#[derive(Debug)]
struct Category {
    capacity: usize,
    lines: VecDeque<LogLine>,
}

/// Snapshot of one category as returned by [`DiagnosticLogRegistry::dump_all`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryDump {
    pub name: String,
    pub capacity: usize,
    pub lines: Vec<LogLine>,
}

#[derive(Debug, Default)]
pub struct DiagnosticLogRegistry {
    categories: Mutex<BTreeMap<String, Category>>,
}

impl DiagnosticLogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ring buffer keeping the most recent `capacity` lines.
    pub fn register(&self, name: &str, capacity: usize) -> Result<(), LogError> {
        if capacity == 0 {
            return Err(LogError::ZeroCapacity(name.to_string()));
        }
        let mut categories = self.categories.lock().unwrap_or_else(|e| e.into_inner());
        if categories.contains_key(name) {
            return Err(LogError::DuplicateCategory(name.to_string()));
        }
        categories.insert(
            name.to_string(),
            Category {
                capacity,
                lines: VecDeque::with_capacity(capacity),
            },
        );
        Ok(())
    }

    pub fn append(&self, name: &str, line: impl Into<String>) -> Result<(), LogError> {
        let mut categories = self.categories.lock().unwrap_or_else(|e| e.into_inner());
        let category = categories
            .get_mut(name)
            .ok_or_else(|| LogError::UnknownCategory(name.to_string()))?;
        if category.lines.len() == category.capacity {
            category.lines.pop_front();
        }
        category.lines.push_back(LogLine {
            ts: Utc::now(),
            text: line.into(),
        });
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        let categories = self.categories.lock().unwrap_or_else(|e| e.into_inner());
        categories.contains_key(name)
    }

    /// Every category, sorted by name, oldest line first.
    pub fn dump_all(&self) -> Vec<CategoryDump> {
        let categories = self.categories.lock().unwrap_or_else(|e| e.into_inner());
        categories
            .iter()
            .map(|(name, c)| CategoryDump {
                name: name.clone(),
                capacity: c.capacity,
                lines: c.lines.iter().cloned().collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_and_unknown_categories() {
        let logs = DiagnosticLogRegistry::new();
        logs.register("radio", 4).unwrap();
        assert_eq!(
            logs.register("radio", 8),
            Err(LogError::DuplicateCategory("radio".into()))
        );
        assert_eq!(
            logs.append("sim", "inserted"),
            Err(LogError::UnknownCategory("sim".into()))
        );
        assert_eq!(logs.register("empty", 0), Err(LogError::ZeroCapacity("empty".into())));
        assert!(!logs.contains("empty"));
    }

    #[test]
    fn ring_keeps_most_recent_lines() {
        let logs = DiagnosticLogRegistry::new();
        logs.register("radio", 3).unwrap();
        for i in 0..5 {
            logs.append("radio", format!("line {i}")).unwrap();
        }
        let dump = logs.dump_all();
        let texts: Vec<_> = dump[0].lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn dump_order_is_by_name() {
        let logs = DiagnosticLogRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            logs.register(name, 1).unwrap();
        }
        let names: Vec<_> = logs.dump_all().into_iter().map(|c| c.name).collect();
        assert_eq!(names, ["alpha", "mid", "zeta"]);
    }
}
