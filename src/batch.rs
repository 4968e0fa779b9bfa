//! Batch execution and reporting.
//!
//! A batch is the ordered list of statements split out of one SQL file. Each
//! statement runs on the same connection, strictly after the previous one
//! has produced its outcome, and every outcome is reported in order. A
//! failed statement is reported and skipped; it never stops the batch.
//! There is no implicit transaction: each statement commits on its own.

use crate::core::db::{Database, Outcome, QueryExecutor};
use crate::core::Result;
use crate::results_grid::{OutputFormat, ResultsGrid, Viewport};
use crate::splitter::{split_statements, Statement};
use std::convert::Infallible;
use std::io::Write;
use tracing::{debug, info, warn};

/// Text written for a statement that succeeded without a result set.
pub const ACKNOWLEDGED_MESSAGE: &str = "Query executed successfully.";

/// Controls how tabular outcomes are rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    pub format: OutputFormat,
    pub max_rows: Option<usize>,
}

impl ReportOptions {
    fn viewport(&self) -> Viewport {
        match self.max_rows {
            Some(max) => Viewport::new(max),
            None => Viewport::unbounded(),
        }
    }
}

/// Every statement of a batch paired with its outcome, in execution order.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub source: String,
    pub entries: Vec<(Statement, Outcome)>,
}

impl BatchReport {
    pub fn outcomes(&self) -> impl Iterator<Item = &Outcome> {
        self.entries.iter().map(|(_, outcome)| outcome)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn tabular_count(&self) -> usize {
        self.outcomes()
            .filter(|o| matches!(o, Outcome::Tabular(_)))
            .count()
    }

    pub fn acknowledged_count(&self) -> usize {
        self.outcomes()
            .filter(|o| matches!(o, Outcome::Acknowledged { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes().filter(|o| o.is_failed()).count()
    }
}

/// Runs batches against one borrowed database.
pub struct BatchRunner<'a> {
    database: &'a Database,
}

impl<'a> BatchRunner<'a> {
    pub fn new(database: &'a Database) -> Self {
        BatchRunner { database }
    }

    /// Executes every statement of `sql` without writing anything.
    pub fn run(&self, source: &str, sql: &str) -> BatchReport {
        match self.run_with(source, sql, |_, _| Ok::<(), Infallible>(())) {
            Ok(report) => report,
            Err(never) => match never {},
        }
    }

    /// Executes every statement of `sql`, writing each outcome block to `out`
    /// as soon as it is known, then the completion marker naming `source`.
    ///
    /// # Errors
    ///
    /// Only a failure to write to `out` is returned; statement failures are
    /// part of the report.
    pub fn run_and_report<W: Write>(
        &self,
        source: &str,
        sql: &str,
        out: &mut W,
        options: ReportOptions,
    ) -> Result<BatchReport> {
        let report = self.run_with(source, sql, |statement, outcome| {
            write_outcome(&mut *out, statement, outcome, options)
        })?;
        write_completion(out, source)?;
        Ok(report)
    }

    fn run_with<F, E>(
        &self,
        source: &str,
        sql: &str,
        mut observe: F,
    ) -> std::result::Result<BatchReport, E>
    where
        F: FnMut(&Statement, &Outcome) -> std::result::Result<(), E>,
    {
        let statements = split_statements(sql);
        info!(source = %source, statements = statements.len(), "starting batch");

        let executor = QueryExecutor::new(self.database.connection());
        let mut entries = Vec::with_capacity(statements.len());
        for statement in statements {
            debug!(index = statement.index, sql = %statement.text, "dispatching statement");
            let outcome = executor.execute(statement.index, &statement.text);
            if let Outcome::Failed(err) = &outcome {
                warn!(index = err.index, error = %err.message, "statement failed");
            }
            observe(&statement, &outcome)?;
            entries.push((statement, outcome));
        }

        let report = BatchReport {
            source: source.to_string(),
            entries,
        };
        info!(
            source = %source,
            tabular = report.tabular_count(),
            acknowledged = report.acknowledged_count(),
            failed = report.failed_count(),
            "finished batch"
        );
        Ok(report)
    }
}

/// Writes the block for one statement: a blank line, the header, then the
/// result, the acknowledgment, or the error.
pub fn write_outcome<W: Write>(
    out: &mut W,
    statement: &Statement,
    outcome: &Outcome,
    options: ReportOptions,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "--- Running Query {} ---", statement.index)?;
    match outcome {
        Outcome::Tabular(result) => {
            let rendered = ResultsGrid::new(result)
                .with_viewport(options.viewport())
                .format(options.format)?;
            out.write_all(rendered.as_bytes())?;
        }
        Outcome::Acknowledged { .. } => writeln!(out, "{}", ACKNOWLEDGED_MESSAGE)?,
        Outcome::Failed(err) => writeln!(out, "{}", err)?,
    }
    Ok(())
}

/// Writes the completion marker that closes every report.
pub fn write_completion<W: Write>(out: &mut W, source: &str) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "Finished executing {}", source)?;
    Ok(())
}
