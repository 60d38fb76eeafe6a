//! Settings for the demonstration harness.

use crate::demos::{self, Demo, DEMOS};
use crate::error::Result;
use log::LevelFilter;

/// Which demos a harness run executes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Every demo in table order.
    All,
    /// The named demos, in the order given.
    Named(Vec<String>),
    /// Print the table of demos instead of running any.
    List,
}

#[derive(Clone, Debug)]
pub struct HarnessConfig {
    pub selection: Selection,
    pub log_level: LevelFilter,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            selection: Selection::Named(vec!["films".to_string()]),
            log_level: LevelFilter::Warn,
        }
    }
}

impl HarnessConfig {
    /// Resolve the selection against the dispatch table. Fails on the first
    /// unknown name; `List` resolves to nothing.
    pub fn demos(&self) -> Result<Vec<&'static Demo>> {
        match &self.selection {
            Selection::All => Ok(DEMOS.iter().collect()),
            Selection::Named(names) => names.iter().map(|n| demos::find(n)).collect(),
            Selection::List => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapError;

    #[test]
    fn default_runs_the_films_demo() {
        let config = HarnessConfig::default();
        let names: Vec<&str> = config.demos().unwrap().iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["films"]);
        assert_eq!(config.log_level, LevelFilter::Warn);
    }

    #[test]
    fn all_resolves_every_demo_in_order() {
        let config = HarnessConfig {
            selection: Selection::All,
            ..HarnessConfig::default()
        };
        let resolved = config.demos().unwrap();
        assert_eq!(resolved.len(), DEMOS.len());
        assert_eq!(resolved[0].name, DEMOS[0].name);
    }

    #[test]
    fn named_keeps_given_order_and_rejects_unknown() {
        let config = HarnessConfig {
            selection: Selection::Named(vec!["phone-book".into(), "ages".into()]),
            ..HarnessConfig::default()
        };
        let names: Vec<&str> = config.demos().unwrap().iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["phone-book", "ages"]);

        let bad = HarnessConfig {
            selection: Selection::Named(vec!["ages".into(), "map10".into()]),
            ..HarnessConfig::default()
        };
        assert!(matches!(bad.demos(), Err(MapError::UnknownDemo(n)) if n == "map10"));
    }
}
