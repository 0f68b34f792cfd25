//! Invocation-context injection for nested workflow steps.
//!
//! Subworkflows run with a cleared environment, so the cache directory, home
//! directory, and root workflow location are threaded down explicitly as
//! inline inputs on every nested step. Each injection is also recorded in the
//! edge-call ledger, which the compiler consults after recursion returns to
//! decide which arguments were supplied at which depth.

use super::error::EmitError;
use super::paths;
use super::types::{inline_input, EdgeCall, EdgeCallLedger};
use serde_yaml_ng::{Mapping, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Argument name for the directory holding the root workflow file.
pub const ROOT_WORKFLOW_DIR_KEY: &str = "root_workflow_yml_path";
/// Argument name for the cache directory.
pub const CACHEDIR_KEY: &str = "cachedir_path";
/// Argument name for the user's home directory.
pub const HOMEDIR_KEY: &str = "homedir";

/// The three context arguments, in injection order.
pub const CONTEXT_ARG_KEYS: [&str; 3] = [ROOT_WORKFLOW_DIR_KEY, CACHEDIR_KEY, HOMEDIR_KEY];

/// Joins a step name and an argument name into a ledger key.
pub const EDGE_CALL_SEPARATOR: &str = "___";

/// Values supplied once per run by the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    /// Cache directory (absolutized on injection)
    pub cachedir: PathBuf,
    /// Home directory (injected verbatim)
    pub homedir: String,
    /// The root workflow description file
    pub workflow_file: PathBuf,
}

impl InvocationContext {
    pub fn new(
        cachedir: impl Into<PathBuf>,
        homedir: impl Into<String>,
        workflow_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            cachedir: cachedir.into(),
            homedir: homedir.into(),
            workflow_file: workflow_file.into(),
        }
    }

    /// Absolute directory containing the root workflow file.
    pub fn root_workflow_dir(&self) -> Result<PathBuf, EmitError> {
        let parent = match self.workflow_file.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        paths::absolute(parent)
    }
}

/// Ledger key for an argument injected into `step_name`.
pub fn edge_call_key(step_name: &str, arg_key: &str) -> String {
    format!("{step_name}{EDGE_CALL_SEPARATOR}{arg_key}")
}

/// Stamp the context arguments into a step's input map and record them.
///
/// `in_map` gains exactly the three [`CONTEXT_ARG_KEYS`] as inline inputs
/// (overwriting any previous values under those keys). `ledger` gains one
/// entry per key, mapping `<step_name>___<arg>` to
/// `(namespaces + [step_name], arg)`.
pub fn inject_context(
    in_map: &mut Mapping,
    namespaces: &[String],
    step_name: &str,
    ctx: &InvocationContext,
    ledger: &mut EdgeCallLedger,
) -> Result<(), EmitError> {
    let cachedir = paths::absolute(&ctx.cachedir)?;
    let root_dir = ctx.root_workflow_dir()?;

    let values = [
        root_dir.to_string_lossy().into_owned(),
        cachedir.to_string_lossy().into_owned(),
        ctx.homedir.clone(),
    ];
    for (key, value) in CONTEXT_ARG_KEYS.iter().zip(values) {
        in_map.insert(Value::String(key.to_string()), inline_input(value));
    }

    let mut step_path = namespaces.to_vec();
    step_path.push(step_name.to_string());
    for key in CONTEXT_ARG_KEYS {
        ledger.record(
            edge_call_key(step_name, key),
            EdgeCall {
                namespaces: step_path.clone(),
                arg_key: key.to_string(),
            },
        );
    }

    debug!(step = step_name, depth = namespaces.len(), "injected invocation context");
    Ok(())
}
