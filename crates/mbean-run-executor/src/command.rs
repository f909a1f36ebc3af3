//! The `run` command: validate, resolve, coerce, invoke, print.

use std::time::Duration;

use mbean_run_core::{
    BeanResolver, ConnectionError, ManagementConnection, ObjectName, Output, TypedArgument, Value,
    ValueOutputFormat,
};
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    coerce::{CoerceError, coerce},
    invoker::{Invoker, LatencyObserver},
    resolver::{ResolveError, TypeHints, resolve},
};

/// Indentation of the printed result.
const RESULT_INDENT: usize = 2;

/// Run command error.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Please specify MBean to invoke either using -b option or bean command")]
    MissingTarget,
    #[error("At least one parameter is needed")]
    MissingOperationName,
    #[error("Signature does not match parameter count: {hints} types for {arguments} parameters")]
    SignatureArityMismatch { hints: usize, arguments: usize },
    #[error("Operation {name} with {arg_count} parameters doesn't exist in bean {target}")]
    NoSuchOperation {
        name: String,
        arg_count: usize,
        target: ObjectName,
    },
    #[error(transparent)]
    Coerce(#[from] CoerceError),
    #[error("Failed to fetch operations of {target}: {source}")]
    Metadata {
        target: ObjectName,
        #[source]
        source: ConnectionError,
    },
    #[error(transparent)]
    Invocation(ConnectionError),
}

impl RunError {
    fn from_resolve(err: ResolveError, target: &ObjectName) -> Self {
        match err {
            ResolveError::SignatureArityMismatch { hints, arguments } => {
                Self::SignatureArityMismatch { hints, arguments }
            }
            ResolveError::NoSuchOperation { name, arg_count } => Self::NoSuchOperation {
                name,
                arg_count,
                target: target.clone(),
            },
        }
    }
}

/// Raw options of a `run` command, as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Bean to invoke (`-b`).
    pub bean: Option<String>,
    /// Domain of the bean (`-d`).
    pub domain: Option<String>,
    /// Report invocation latency (`-m`).
    pub measure: bool,
    /// Comma separated parameter types (`-t`).
    pub types: Option<String>,
    /// Quote string results (`-q`).
    pub show_quotation_marks: bool,
    /// Operation name followed by parameter expressions.
    pub parameters: Vec<String>,
}

impl RunOptions {
    /// Options for `parameters`, the first being the operation name.
    #[must_use]
    pub fn new<I>(parameters: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            parameters: parameters.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn bean<S: Into<String>>(mut self, bean: S) -> Self {
        self.bean = Some(bean.into());
        self
    }

    #[must_use]
    pub fn domain<S: Into<String>>(mut self, domain: S) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub const fn measure(mut self, measure: bool) -> Self {
        self.measure = measure;
        self
    }

    #[must_use]
    pub fn types<S: Into<String>>(mut self, types: S) -> Self {
        self.types = Some(types.into());
        self
    }

    #[must_use]
    pub const fn show_quotation_marks(mut self, show: bool) -> Self {
        self.show_quotation_marks = show;
        self
    }

    /// Check the options without touching the connection.
    ///
    /// # Errors
    /// Returns [`RunError::MissingTarget`], [`RunError::MissingOperationName`]
    /// or [`RunError::SignatureArityMismatch`], checked in that order.
    pub fn validate(self, beans: &dyn BeanResolver) -> Result<RunRequest, RunError> {
        let target = beans
            .resolve(self.bean.as_deref(), self.domain.as_deref())
            .ok_or(RunError::MissingTarget)?;

        let mut parameters = self.parameters.into_iter();
        let operation = parameters.next().ok_or(RunError::MissingOperationName)?;
        let arguments: Vec<String> = parameters.collect();

        let hints = self.types.as_deref().map(TypeHints::parse);
        if let Some(hints) = &hints {
            if hints.len() != arguments.len() {
                return Err(RunError::SignatureArityMismatch {
                    hints: hints.len(),
                    arguments: arguments.len(),
                });
            }
        }

        Ok(RunRequest {
            target,
            operation,
            arguments,
            hints,
            measure: self.measure,
            show_quotation_marks: self.show_quotation_marks,
        })
    }
}

/// A validated `run` request.
#[derive(Debug, Clone)]
pub struct RunRequest {
    target: ObjectName,
    operation: String,
    arguments: Vec<String>,
    hints: Option<TypeHints>,
    measure: bool,
    show_quotation_marks: bool,
}

/// Prints the latency line of a measured invocation.
struct LatencyLine<'a>(&'a dyn Output);

impl LatencyObserver for LatencyLine<'_> {
    fn observe(&self, latency: Duration) {
        self.0
            .print_message(&format!("{}ms is taken by invocation", latency.as_millis()));
    }
}

/// Validate `options` and run the operation.
///
/// # Errors
/// Returns the first validation, resolution, coercion or remote error.
pub async fn execute<C>(
    options: RunOptions,
    beans: &dyn BeanResolver,
    connection: &C,
    output: &dyn Output,
) -> Result<(), RunError>
where
    C: ManagementConnection + ?Sized,
{
    let request = options.validate(beans)?;
    run(request, connection, output).await
}

/// Run a validated request against `connection`, printing to `output`.
///
/// Operation metadata is fetched fresh for every call. Arguments are coerced
/// to the resolved operation's declared types, not to the hints.
///
/// # Errors
/// Returns error if the operation cannot be resolved, an argument cannot be
/// coerced or the remote side fails. Nothing is invoked unless every
/// argument coerced.
pub async fn run<C>(request: RunRequest, connection: &C, output: &dyn Output) -> Result<(), RunError>
where
    C: ManagementConnection + ?Sized,
{
    let span = tracing::info_span!(
        "run",
        invocation_id = %Uuid::new_v4(),
        bean = %request.target,
        operation = %request.operation,
    );
    run_request(request, connection, output).instrument(span).await
}

async fn run_request<C>(
    request: RunRequest,
    connection: &C,
    output: &dyn Output,
) -> Result<(), RunError>
where
    C: ManagementConnection + ?Sized,
{
    let RunRequest {
        target,
        operation,
        arguments,
        hints,
        measure,
        show_quotation_marks,
    } = request;

    let available = connection
        .operations(&target)
        .await
        .map_err(|source| RunError::Metadata {
            target: target.clone(),
            source,
        })?;

    let descriptor = resolve(&available, &operation, arguments.len(), hints.as_ref())
        .map_err(|e| RunError::from_resolve(e, &target))?;

    let args = arguments
        .iter()
        .zip(&descriptor.parameter_types)
        .map(|(expression, type_name)| coerce(expression, type_name))
        .collect::<Result<Vec<TypedArgument>, _>>()?;

    let values = Value::Array(args.iter().map(|a| a.value.clone()).collect());
    tracing::info!(params = %values, "calling operation");
    output.print_message(&format!(
        "calling operation {operation} of mbean {target} with params {values}"
    ));

    let latency_line = LatencyLine(output);
    let measure = measure.then_some(&latency_line as &dyn LatencyObserver);
    let invocation = Invoker::new(connection)
        .invoke(&target, descriptor, &args, measure)
        .await;

    let result = invocation.result.map_err(|e| {
        tracing::warn!(error = %e, "invocation failed");
        RunError::Invocation(e)
    })?;

    output.print_message("operation returns: ");
    output.print_value(
        &result,
        ValueOutputFormat::new(RESULT_INDENT, show_quotation_marks),
    );
    output.println("");
    Ok(())
}

/// Names of the operations `target` exposes, in metadata order.
///
/// # Errors
/// Returns error if the metadata cannot be fetched.
pub async fn suggest_operation_names<C>(
    connection: &C,
    target: &ObjectName,
) -> Result<Vec<String>, ConnectionError>
where
    C: ManagementConnection + ?Sized,
{
    Ok(connection
        .operations(target)
        .await?
        .into_iter()
        .map(|op| op.name)
        .collect())
}
