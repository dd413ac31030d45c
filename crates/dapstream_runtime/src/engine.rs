//! The request engine.
//!
//! An engine owns a catalog of dataset schemas. Every request works on a
//! private clone of its schema, so concurrent requests never share
//! selection flags, constraints or read values.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::sync::Arc;

use dapstream_engine::{Evaluator, FunctionRegistry};
use dapstream_foundation::{Error, ErrorContext, Result};
use dapstream_language::parse_declaration;
use dapstream_model::{DataSource, Dataset};
use dapstream_wire::{Marshaller, StreamMarshaller, StreamUnMarshaller, UnMarshaller};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;

/// One client request: a dataset name and a constraint expression.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Request {
    /// Name the schema was registered under.
    pub dataset: String,
    /// Constraint text, possibly empty.
    pub constraint: String,
}

impl Request {
    /// Creates a request.
    #[must_use]
    pub fn new(dataset: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            constraint: constraint.into(),
        }
    }
}

/// Answers declaration and data requests against registered schemas.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    registry: Arc<FunctionRegistry>,
    schemas: HashMap<String, Dataset>,
}

impl Engine {
    /// Creates an engine with an empty catalog.
    #[must_use]
    pub fn new(config: EngineConfig, registry: FunctionRegistry) -> Self {
        Self {
            config,
            registry: Arc::new(registry),
            schemas: HashMap::new(),
        }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Adds a schema under its dataset name, replacing any earlier one.
    pub fn register(&mut self, schema: Dataset) {
        debug!(
            dataset = schema.name(),
            variables = schema.variables().len(),
            "schema registered"
        );
        self.schemas.insert(schema.name().to_string(), schema);
    }

    /// A registered schema.
    #[must_use]
    pub fn schema(&self, name: &str) -> Option<&Dataset> {
        self.schemas.get(name)
    }

    /// The declaration of what a data request would send.
    ///
    /// # Errors
    /// Fails as [`Engine::data`] does before any bytes are written.
    pub fn declaration(&self, request: &Request) -> Result<String> {
        let (dataset, _) = self.prepare(request).inspect_err(|e| {
            warn!(
                dataset = %request.dataset,
                constraint = %request.constraint,
                error = %e,
                "declaration request failed"
            );
        })?;
        Ok(dataset.print_constrained())
    }

    /// Streams the constrained data to `writer` and returns the byte count.
    ///
    /// A functional constraint sends only its function's result, or
    /// nothing when the function declines.
    ///
    /// # Errors
    /// Returns the first parse, bind, read, evaluation or write failure, or
    /// a response-too-big error when the byte budget is exceeded. Bytes
    /// already written before a failure are not a valid response.
    pub fn data<W: Write>(
        &self,
        request: &Request,
        source: &mut dyn DataSource,
        writer: W,
    ) -> Result<u64> {
        match self.stream(request, source, writer) {
            Ok(bytes) => {
                info!(
                    dataset = %request.dataset,
                    constraint = %request.constraint,
                    bytes,
                    "data request answered"
                );
                Ok(bytes)
            }
            Err(e) => {
                warn!(
                    dataset = %request.dataset,
                    constraint = %request.constraint,
                    error = %e,
                    "data request failed"
                );
                Err(e.with_context(ErrorContext::new().with_source(&request.dataset)))
            }
        }
    }

    /// Decodes a data response on the client side.
    ///
    /// `declaration` is the text [`Engine::declaration`] returned for the
    /// same request. String lengths are capped by `max_string_len`.
    ///
    /// # Errors
    /// Returns parse errors for a bad declaration, and framing or I/O
    /// errors for a response that does not match it.
    pub fn decode<R: Read>(&self, declaration: &str, reader: R) -> Result<Dataset> {
        let mut dataset = parse_declaration(declaration)?;
        let mut um = StreamUnMarshaller::new(reader).with_max_string_len(self.config.max_string_len);
        dataset.deserialize(&mut um)?;
        debug!(dataset = dataset.name(), bytes = um.bytes_read(), "response decoded");
        Ok(dataset)
    }

    fn prepare(&self, request: &Request) -> Result<(Dataset, Evaluator)> {
        let mut dataset = self
            .schemas
            .get(&request.dataset)
            .cloned()
            .ok_or_else(|| Error::undefined_variable(request.dataset.as_str()))?;
        if self.config.check_semantics {
            dataset.check_semantics(true)?;
        }
        let mut evaluator = Evaluator::new(Arc::clone(&self.registry));
        evaluator.parse_constraint(&request.constraint, &mut dataset)?;
        Ok((dataset, evaluator))
    }

    fn stream<W: Write>(
        &self,
        request: &Request,
        source: &mut dyn DataSource,
        writer: W,
    ) -> Result<u64> {
        let (mut dataset, evaluator) = self.prepare(request)?;
        let mut m = StreamMarshaller::new(writer).with_limit(self.config.max_response_bytes);

        // Operands inside tables are loaded row by row while streaming.
        for path in evaluator.referenced_paths() {
            if dataset.enclosing_table(&path).is_none() {
                dataset.read(&path, source)?;
            }
        }

        if evaluator.functional_expression() {
            match evaluator.evaluate_value(&dataset)? {
                Some(result) => result.encode(&mut m)?,
                None => debug!(dataset = %request.dataset, "function declined, empty response"),
            }
        } else {
            dataset.serialize(&mut m, &evaluator, source, true)?;
        }
        m.flush()?;
        Ok(m.bytes_written())
    }
}
