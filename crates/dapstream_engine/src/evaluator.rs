//! The clause evaluator.
//!
//! An evaluator holds the clauses of one request, in the order they were
//! appended, plus the constants created for their literals. A bound
//! expression is one of:
//!
//! - empty: every row passes
//! - boolean: relational and predicate clauses, ANDed in order
//! - functional: a single value clause whose result is the response
//!
//! Appending never checks which of these the list forms; evaluation does.

use std::borrow::Cow;
use std::sync::Arc;

use dapstream_foundation::{Error, ErrorKind, Result, Value};
use dapstream_language::{self as language, ProjectionItem, SelectionItem, Slice};
use dapstream_model::{Dataset, Selection, Variable};
use tracing::{debug, trace};

use crate::clause::{Clause, ConstantId, Operand};
use crate::functions::{Function, FunctionRegistry, ProjectionFn};
use crate::projection::project;

/// Evaluates the clauses of one request.
#[derive(Debug)]
pub struct Evaluator {
    registry: Arc<FunctionRegistry>,
    clauses: Vec<Clause>,
    constants: Vec<Variable>,
}

impl Evaluator {
    /// Creates an empty evaluator over a shared registry.
    #[must_use]
    pub fn new(registry: Arc<FunctionRegistry>) -> Self {
        Self {
            registry,
            clauses: Vec::new(),
            constants: Vec::new(),
        }
    }

    /// The function registry.
    #[must_use]
    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Appends a clause. Never fails, whatever the list already holds.
    pub fn append_clause(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }

    /// Adds a literal to the constant pool.
    pub fn append_constant(&mut self, value: Value) -> ConstantId {
        let id = ConstantId(self.constants.len());
        self.constants
            .push(Variable::with_value(format!("constant{}", id.0), value));
        id
    }

    /// The clauses in evaluation order.
    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// A pooled constant.
    #[must_use]
    pub fn constant(&self, id: ConstantId) -> Option<&Variable> {
        self.constants.get(id.0)
    }

    /// True if the first clause produces a value rather than a truth value.
    #[must_use]
    pub fn functional_expression(&self) -> bool {
        self.clauses.first().is_some_and(|c| !c.is_boolean())
    }

    /// True if every clause is boolean. Holds for the empty list.
    #[must_use]
    pub fn boolean_expression(&self) -> bool {
        self.clauses.iter().all(Clause::is_boolean)
    }

    /// Every variable path any clause reads, deduplicated, in first-use order.
    #[must_use]
    pub fn referenced_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = Vec::new();
        for path in self.clauses.iter().flat_map(Clause::paths) {
            if !paths.iter().any(|p| p == path) {
                paths.push(path.to_string());
            }
        }
        paths
    }

    /// Runs the single value clause.
    ///
    /// Returns `Ok(None)` when the function declines.
    ///
    /// # Errors
    /// Returns an internal error unless exactly one clause is held and it
    /// is a value clause, and otherwise the function's own failure.
    pub fn evaluate_value(&self, dataset: &Dataset) -> Result<Option<Variable>> {
        let [Clause::Value { name, func, args }] = self.clauses.as_slice() else {
            return Err(Error::internal(format!(
                "value evaluation needs exactly one value clause, found {}",
                self.describe()
            )));
        };
        let resolved = self.resolve_all(args, dataset)?;
        let Some(resolved) = resolved else {
            return Ok(None);
        };
        let refs: Vec<&Variable> = resolved.iter().map(AsRef::as_ref).collect();
        let result = func(&refs, dataset)?;
        trace!(function = %name, declined = result.is_none(), "value clause evaluated");
        Ok(result)
    }

    /// ANDs every clause, stopping at the first that fails.
    ///
    /// # Errors
    /// Returns an internal error if any clause is a value clause, and
    /// otherwise the first evaluation failure.
    pub fn evaluate_selection(&self, dataset: &Dataset) -> Result<bool> {
        self.evaluate_where(dataset, |_| true)
    }

    /// ANDs the clauses that gate rows of `table`.
    ///
    /// A clause gates `table` when every path it reads lies outside all
    /// tables, inside `table`, or inside a table enclosing `table`. Clauses
    /// over another table's columns are skipped.
    ///
    /// # Errors
    /// Fails as [`Evaluator::evaluate_selection`] does.
    pub fn evaluate_table_selection(&self, dataset: &Dataset, table: &str) -> Result<bool> {
        self.evaluate_where(dataset, |clause| gates(clause, dataset, table))
    }

    fn evaluate_where(
        &self,
        dataset: &Dataset,
        applies: impl Fn(&Clause) -> bool,
    ) -> Result<bool> {
        if !self.boolean_expression() {
            return Err(Error::internal(format!(
                "selection needs boolean clauses only, found {}",
                self.describe()
            )));
        }
        for (index, clause) in self.clauses.iter().enumerate() {
            if !applies(clause) {
                continue;
            }
            let holds = self.evaluate_clause(clause, dataset)?;
            trace!(clause = index, holds, "clause evaluated");
            if !holds {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn evaluate_clause(&self, clause: &Clause, dataset: &Dataset) -> Result<bool> {
        match clause {
            Clause::Relational { op, lhs, rhs } => {
                let Some(left) = self.resolve(lhs, dataset)? else {
                    return Ok(false);
                };
                for operand in rhs {
                    let Some(right) = self.resolve(operand, dataset)? else {
                        continue;
                    };
                    if left.compare(&right, *op)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Clause::Predicate { func, args, .. } => {
                let Some(resolved) = self.resolve_all(args, dataset)? else {
                    return Ok(false);
                };
                let refs: Vec<&Variable> = resolved.iter().map(AsRef::as_ref).collect();
                func(&refs, dataset)
            }
            Clause::Value { name, .. } => Err(Error::internal(format!(
                "value clause '{name}' used as a selection"
            ))),
        }
    }

    /// Resolves an operand. `None` when a nested function declines.
    fn resolve<'a>(
        &'a self,
        operand: &Operand,
        dataset: &'a Dataset,
    ) -> Result<Option<Cow<'a, Variable>>> {
        match operand {
            Operand::Variable(path) => dataset
                .lookup(path)
                .map(|v| Some(Cow::Borrowed(v)))
                .ok_or_else(|| Error::undefined_variable(path)),
            Operand::Constant(id) => self
                .constants
                .get(id.0)
                .map(|v| Some(Cow::Borrowed(v)))
                .ok_or_else(|| Error::internal(format!("no constant {}", id.0))),
            Operand::Call { func, args, .. } => {
                let Some(resolved) = self.resolve_all(args, dataset)? else {
                    return Ok(None);
                };
                let refs: Vec<&Variable> = resolved.iter().map(AsRef::as_ref).collect();
                Ok(func(&refs, dataset)?.map(Cow::Owned))
            }
        }
    }

    fn resolve_all<'a>(
        &'a self,
        args: &[Operand],
        dataset: &'a Dataset,
    ) -> Result<Option<Vec<Cow<'a, Variable>>>> {
        let mut resolved = Vec::with_capacity(args.len());
        for arg in args {
            match self.resolve(arg, dataset)? {
                Some(var) => resolved.push(var),
                None => return Ok(None),
            }
        }
        Ok(Some(resolved))
    }

    fn describe(&self) -> String {
        let values = self.clauses.len() - self.clauses.iter().filter(|c| c.is_boolean()).count();
        format!("{} clause(s), {values} value clause(s)", self.clauses.len())
    }

    // =========================================================================
    // Binding constraint text
    // =========================================================================

    /// Parses constraint text and binds it to `dataset`.
    ///
    /// Selection clauses and their constants are appended to this
    /// evaluator. The projection marks the dataset: an empty projection
    /// selects everything, otherwise only the listed paths, their slices
    /// and whatever projection functions mark.
    ///
    /// Nothing changes unless the whole expression parses and binds.
    ///
    /// # Errors
    /// Returns parse errors for malformed text, undefined variable or
    /// function errors for unknown names, and invalid constraint errors for
    /// bad slices.
    pub fn parse_constraint(&mut self, text: &str, dataset: &mut Dataset) -> Result<()> {
        let parsed = language::parse_constraint(text)?;
        let mut staged = Staged::new(self.constants.len());

        let mut paths: Vec<(&str, &[Slice])> = Vec::new();
        let mut projections: Vec<(ProjectionFn, &[language::Operand])> = Vec::new();
        for item in &parsed.projection {
            match item {
                ProjectionItem::Path { path, slices, .. } => {
                    if dataset.lookup(path).is_none() {
                        return Err(Error::undefined_variable(path.as_str()));
                    }
                    paths.push((path.as_str(), slices.as_slice()));
                }
                ProjectionItem::Call(call) => match self.registry.lookup(&call.name) {
                    Some(Function::Projection(func)) => projections.push((func, call.args.as_slice())),
                    Some(Function::Value(func)) => {
                        let args = self.stage_operands(&call.args, dataset, &mut staged)?;
                        staged.clauses.push(Clause::Value {
                            name: call.name.clone(),
                            func,
                            args,
                        });
                    }
                    Some(other) => return Err(misused(&call.name, other, "projection")),
                    None => return Err(Error::undefined_function(call.name.as_str())),
                },
            }
        }

        for item in &parsed.selection {
            let clause = match item {
                SelectionItem::Relation { op, lhs, rhs, .. } => Clause::Relational {
                    op: *op,
                    lhs: self.stage_operand(lhs, dataset, &mut staged)?,
                    rhs: self.stage_operands(rhs, dataset, &mut staged)?,
                },
                SelectionItem::Call(call) => match self.registry.lookup(&call.name) {
                    Some(Function::Predicate(func)) => Clause::Predicate {
                        name: call.name.clone(),
                        func,
                        args: self.stage_operands(&call.args, dataset, &mut staged)?,
                    },
                    Some(other) => return Err(misused(&call.name, other, "selection")),
                    None => return Err(Error::undefined_function(call.name.as_str())),
                },
            };
            staged.clauses.push(clause);
        }

        let mut view = dataset.clone();
        if parsed.projection.is_empty() {
            view.mark_all(true);
        } else {
            view.mark_all(false);
            for (path, slices) in paths {
                project(&mut view, path, slices)?;
            }
            for (func, args) in projections {
                func(args, &mut view)?;
            }
        }

        debug!(
            constraint = text,
            clauses = staged.clauses.len(),
            constants = staged.constants.len(),
            "constraint bound"
        );
        self.constants.extend(staged.constants);
        self.clauses.extend(staged.clauses);
        *dataset = view;
        Ok(())
    }

    fn stage_operands(
        &self,
        operands: &[language::Operand],
        dataset: &Dataset,
        staged: &mut Staged,
    ) -> Result<Vec<Operand>> {
        operands
            .iter()
            .map(|o| self.stage_operand(o, dataset, staged))
            .collect()
    }

    fn stage_operand(
        &self,
        operand: &language::Operand,
        dataset: &Dataset,
        staged: &mut Staged,
    ) -> Result<Operand> {
        match operand {
            language::Operand::Path(path, _) => {
                if dataset.lookup(path).is_none() {
                    return Err(Error::undefined_variable(path.as_str()));
                }
                Ok(Operand::Variable(path.clone()))
            }
            language::Operand::Integer(n, _) => Ok(staged.constant(integer_constant(*n)?)),
            language::Operand::Float(x, _) => Ok(staged.constant(Value::Float64(*x))),
            language::Operand::Str(s, _) => Ok(staged.constant(Value::Str(s.clone()))),
            language::Operand::Call(call) => match self.registry.lookup(&call.name) {
                Some(Function::Value(func)) => Ok(Operand::Call {
                    name: call.name.clone(),
                    func,
                    args: self.stage_operands(&call.args, dataset, staged)?,
                }),
                Some(other) => Err(misused(&call.name, other, "operand")),
                None => Err(Error::undefined_function(call.name.as_str())),
            },
        }
    }
}

impl Selection for Evaluator {
    fn evaluate(&self, dataset: &Dataset, table: &str) -> Result<bool> {
        self.evaluate_table_selection(dataset, table)
    }
}

/// Clauses and constants awaiting commit.
struct Staged {
    base: usize,
    constants: Vec<Variable>,
    clauses: Vec<Clause>,
}

impl Staged {
    const fn new(base: usize) -> Self {
        Self {
            base,
            constants: Vec::new(),
            clauses: Vec::new(),
        }
    }

    fn constant(&mut self, value: Value) -> Operand {
        let index = self.base + self.constants.len();
        self.constants
            .push(Variable::with_value(format!("constant{index}"), value));
        Operand::Constant(ConstantId(index))
    }
}

/// The narrowest of `Int32`, `Int64` and `UInt64` holding `n`.
fn integer_constant(n: i128) -> Result<Value> {
    if let Ok(v) = i32::try_from(n) {
        Ok(Value::Int32(v))
    } else if let Ok(v) = i64::try_from(n) {
        Ok(Value::Int64(v))
    } else if let Ok(v) = u64::try_from(n) {
        Ok(Value::UInt64(v))
    } else {
        Err(Error::parse(format!("integer literal {n} is out of range")))
    }
}

/// True if every path `clause` reads is loaded while `table` streams.
fn gates(clause: &Clause, dataset: &Dataset, table: &str) -> bool {
    clause.paths().into_iter().all(|path| {
        dataset.enclosing_table(path).is_none_or(|owner| {
            owner == table
                || table
                    .strip_prefix(owner.as_str())
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    })
}

fn misused(name: &str, function: Function, position: &str) -> Error {
    Error::new(ErrorKind::UndefinedFunction(format!(
        "{name} is a {} function and cannot be used as a {position}",
        function.role()
    )))
}
