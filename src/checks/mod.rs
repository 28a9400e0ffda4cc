//! Project checks

pub mod typesafe_env;

use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;

/// What a check found and what it fixed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Environment names the schema does not declare
    pub missing_env: BTreeSet<String>,
    /// `process.env` names used in source that the schema does not declare
    pub missing_in_code: BTreeSet<String>,
    pub added: Vec<String>,
}

impl CheckReport {
    /// Names still undeclared after remediation
    pub fn unresolved(&self) -> BTreeSet<String> {
        self.missing_env
            .iter()
            .chain(&self.missing_in_code)
            .filter(|name| !self.added.contains(name))
            .cloned()
            .collect()
    }
}

#[async_trait(?Send)]
pub trait Check {
    fn name(&self) -> &'static str;

    async fn check(&mut self) -> Result<CheckReport>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn added_names_are_resolved() {
        let report = CheckReport {
            missing_env: ["A", "B"].iter().map(|s| s.to_string()).collect(),
            missing_in_code: ["B", "C"].iter().map(|s| s.to_string()).collect(),
            added: vec!["A".to_string()],
        };

        let unresolved: Vec<_> = report.unresolved().into_iter().collect();
        assert_eq!(unresolved, vec!["B", "C"]);
    }
}
