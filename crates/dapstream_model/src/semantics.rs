//! Structural validation of declared schemas.

use dapstream_foundation::{Error, ErrorKind, Result, TypeKind};

use crate::dataset::Dataset;
use crate::variable::{Body, Variable};

impl Variable {
    /// Checks this variable's structure.
    ///
    /// With `all`, nested variables are checked too. Every problem found
    /// is reported, not only the first.
    ///
    /// # Errors
    /// Returns [`ErrorKind::Semantics`] listing each problem.
    pub fn check_semantics(&self, all: bool) -> Result<()> {
        let mut problems = Vec::new();
        self.collect_problems(all, &mut problems);
        into_result(problems)
    }

    fn collect_problems(&self, all: bool, problems: &mut Vec<String>) {
        if self.name().is_empty() {
            problems.push(format!("{} with an empty name", self.type_kind()));
        }
        match self.body() {
            Body::Scalar(_) => {}
            Body::Array(array) => {
                if array.dimensions().is_empty() {
                    problems.push(format!("array '{}' has no dimensions", self.name()));
                }
                let kind = array.template().type_kind();
                if matches!(kind, TypeKind::Array | TypeKind::Table) {
                    problems.push(format!(
                        "array '{}' cannot hold elements of kind {kind}",
                        self.name()
                    ));
                } else if all {
                    array.template().collect_problems(all, problems);
                }
            }
            Body::Record(record) => self.collect_child_problems(record.duplicate_names(), all, problems),
            Body::Table(table) => self.collect_child_problems(table.duplicate_names(), all, problems),
        }
    }

    fn collect_child_problems(&self, dups: Vec<&str>, all: bool, problems: &mut Vec<String>) {
        for dup in dups {
            problems.push(format!("'{}' declares '{dup}' more than once", self.name()));
        }
        if all {
            for child in self.children() {
                child.collect_problems(all, problems);
            }
        }
    }
}

impl Dataset {
    /// Checks the dataset and, with `all`, every variable in it.
    ///
    /// # Errors
    /// Returns [`ErrorKind::Semantics`] listing each problem.
    pub fn check_semantics(&self, all: bool) -> Result<()> {
        let mut problems = Vec::new();
        if self.name().is_empty() {
            problems.push("dataset with an empty name".to_string());
        }
        for dup in self.top_level().duplicate_names() {
            problems.push(format!("dataset declares '{dup}' more than once"));
        }
        if all {
            for var in self.variables() {
                var.collect_problems(all, &mut problems);
            }
        }
        into_result(problems)
    }
}

fn into_result(problems: Vec<String>) -> Result<()> {
    if problems.is_empty() {
        Ok(())
    } else {
        Err(Error::new(ErrorKind::Semantics(problems)))
    }
}
