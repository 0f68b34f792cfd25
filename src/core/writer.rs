//! Tree writer — materialize a compiled workflow tree as files on disk.
//!
//! Each node produces a compiled document (`<stem>.cwl`) and a default-inputs
//! document (`<stem>_inputs.yml`). Only the root's inputs document is
//! guaranteed to be complete; nested nodes get whatever defaults were known
//! at their level plus the caller's extra inputs, and rely on the parent to
//! supply the rest at run time.
//!
//! Some downstream YAML parsers refuse documents with more than a few dozen
//! anchors/aliases (billion-laughs protection). Output is therefore emitted
//! with every repeated substructure written out in full. `serde_yaml_ng`
//! serializes owned values and has no notion of shared nodes, so it never
//! produces anchors or aliases.

use super::error::EmitError;
use super::types::{CompiledTree, NodeData};
use serde::Serialize;
use serde_yaml_ng::{Mapping, Value};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Interpreter directive placed on the first line of compiled documents.
pub const INTERPRETER_LINE: &str = "#!/usr/bin/env cwl-runner\n";

/// Provenance banner placed on top of every generated document.
pub const AUTOGEN_HEADER: &str = "# This file was autogenerated by workflow-emit.\n\
                                  # Do not edit it by hand; edit the source workflow and recompile.\n";

/// Joins namespace segments in flat file names.
pub const FLAT_SEPARATOR: &str = "___";

/// How output files are laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Naming {
    /// One subdirectory per nested step; files named by stem only.
    #[default]
    Nested,
    /// Every file in one directory, prefixed with the namespace path.
    Flat,
}

/// Compiled-document and inputs-document file names for a node.
pub fn artifact_filenames(data: &NodeData, naming: Naming) -> (String, String) {
    let cwl = format!("{}.cwl", data.stem);
    let yml = format!("{}_inputs.yml", data.stem);
    match naming {
        Naming::Nested => (cwl, yml),
        Naming::Flat => (flat_name(&data.namespaces, &cwl), flat_name(&data.namespaces, &yml)),
    }
}

fn flat_name(namespaces: &[String], file: &str) -> String {
    let mut parts: Vec<&str> = namespaces.iter().map(String::as_str).collect();
    parts.push(file);
    parts.join(FLAT_SEPARATOR)
}

/// Check that every stem and namespace segment is usable as an output name.
///
/// Each must be a single plain path component, so nothing is written outside
/// the output directory. Under flat naming, segments also must not contain
/// the separator or start/end with `_`; otherwise two namespace paths could
/// join to the same file name. The stem only has to be separator-free.
pub fn validate_tree(tree: &CompiledTree, naming: Naming) -> Result<(), EmitError> {
    for data in tree.iter() {
        check_name(data, &data.stem, naming, false)?;
        for segment in &data.namespaces {
            check_name(data, segment, naming, true)?;
        }
    }
    Ok(())
}

fn check_name(data: &NodeData, name: &str, naming: Naming, segment: bool) -> Result<(), EmitError> {
    let invalid = |message: String| {
        let mut node = data.namespaces.clone();
        node.push(data.stem.clone());
        EmitError::InvalidTree {
            node: node.join("/"),
            message,
        }
    };

    let mut components = Path::new(name).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single_normal || name.chars().any(std::path::is_separator) {
        return Err(invalid(format!("{name:?} is not a single plain path component")));
    }

    if naming == Naming::Flat {
        if name.contains(FLAT_SEPARATOR) {
            return Err(invalid(format!("{name:?} contains the separator {FLAT_SEPARATOR:?}")));
        }
        if segment && (name.starts_with('_') || name.ends_with('_')) {
            return Err(invalid(format!("step name {name:?} starts or ends with '_'")));
        }
    }
    Ok(())
}

/// Serialize a value as block YAML with no anchors or aliases.
pub fn to_yaml_inline<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_yaml_ng::Error> {
    serde_yaml_ng::to_string(value)
}

/// Defaults overlaid with `extra`; `extra` wins on shared keys.
pub fn merge_inputs(defaults: &Mapping, extra: &Mapping) -> Mapping {
    let mut merged = defaults.clone();
    for (key, value) in extra {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Write every node of `tree` under `dir`, root first.
///
/// `extra_inputs` is merged into every node's inputs unchanged. Returns the
/// paths written, in write order. The whole tree is validated before the
/// first write; filesystem errors stop the walk.
pub fn write_to_disk(
    tree: &CompiledTree,
    dir: &Path,
    naming: Naming,
    extra_inputs: &Mapping,
) -> Result<Vec<PathBuf>, EmitError> {
    validate_tree(tree, naming)?;

    let root_inputs = merge_inputs(&tree.data.default_inputs, extra_inputs);
    let missing = missing_required_inputs(&tree.data.compiled, &root_inputs);
    if !missing.is_empty() {
        warn!(
            stem = %tree.data.stem,
            missing = ?missing,
            "root inputs document is missing required inputs"
        );
    }

    let mut written = Vec::with_capacity(tree.len() * 2);
    write_node(tree, dir, naming, extra_inputs, &mut written)?;
    Ok(written)
}

fn write_node(
    tree: &CompiledTree,
    dir: &Path,
    naming: Naming,
    extra_inputs: &Mapping,
    written: &mut Vec<PathBuf>,
) -> Result<(), EmitError> {
    let data = &tree.data;
    let inputs = merge_inputs(&data.default_inputs, extra_inputs);

    std::fs::create_dir_all(dir).map_err(EmitError::io(dir))?;
    let (cwl_name, yml_name) = artifact_filenames(data, naming);

    let cwl_path = dir.join(cwl_name);
    let body = to_yaml_inline(&data.compiled).map_err(EmitError::yaml(&cwl_path))?;
    write_atomic(&cwl_path, &format!("{INTERPRETER_LINE}{AUTOGEN_HEADER}{body}"))?;
    written.push(cwl_path);

    let yml_path = dir.join(yml_name);
    let body = to_yaml_inline(&inputs).map_err(EmitError::yaml(&yml_path))?;
    write_atomic(&yml_path, &format!("{AUTOGEN_HEADER}{body}"))?;
    written.push(yml_path);

    debug!(stem = %data.stem, dir = %dir.display(), "wrote node artifacts");

    for child in &tree.children {
        let child_dir = match naming {
            Naming::Nested => dir.join(child.data.step_name()),
            Naming::Flat => dir.to_path_buf(),
        };
        write_node(child, &child_dir, naming, extra_inputs, written)?;
    }
    Ok(())
}

/// Write through a temp file and rename into place.
fn write_atomic(path: &Path, content: &str) -> Result<(), EmitError> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);
    std::fs::write(&tmp_path, content).map_err(EmitError::io(&tmp_path))?;
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(EmitError::io(path)(e));
    }
    Ok(())
}

/// Write the tree, first loading extra inputs from an optional YAML file.
pub fn write_to_disk_with_inputs_file(
    tree: &CompiledTree,
    dir: &Path,
    naming: Naming,
    inputs_file: Option<&Path>,
) -> Result<Vec<PathBuf>, EmitError> {
    let extra = match inputs_file {
        Some(path) => load_supplementary_inputs(path)?,
        None => Mapping::new(),
    };
    write_to_disk(tree, dir, naming, &extra)
}

/// Load a supplementary inputs document.
///
/// Relative `location:` entries of File/Directory values are rebased with a
/// `../` prefix so they stay valid from the generated output directory.
pub fn load_supplementary_inputs(path: &Path) -> Result<Mapping, EmitError> {
    let content = std::fs::read_to_string(path).map_err(EmitError::io(path))?;
    if content.trim().is_empty() {
        return Ok(Mapping::new());
    }
    let value: Value = serde_yaml_ng::from_str(&content).map_err(EmitError::yaml(path))?;
    let mut inputs = match value {
        Value::Mapping(m) => m,
        Value::Null => Mapping::new(),
        other => {
            return Err(EmitError::InvalidInputs {
                path: path.to_path_buf(),
                message: format!("expected a mapping at the top level, found {}", kind(&other)),
            })
        }
    };
    rebase_relative_locations(&mut inputs);
    Ok(inputs)
}

// TODO: derive the prefix from the receiving node's depth instead of assuming
// the output directory is exactly one level below the inputs file.
/// Prefix every relative `location` one level up, in place.
pub fn rebase_relative_locations(inputs: &mut Mapping) {
    for (_, value) in inputs.iter_mut() {
        let Some(obj) = value.as_mapping_mut() else {
            continue;
        };
        let Some(Value::String(location)) = obj.get_mut("location") else {
            continue;
        };
        if !Path::new(location.as_str()).is_absolute() {
            *location = format!("../{location}");
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Inputs the compiled document requires that `inputs` does not provide.
///
/// An input is required when it has no `default` and its type is not
/// optional (`T?`, or a union containing `null`). Both the map form and the
/// list-of-`id` form of the `inputs:` section are understood. Names are
/// returned in declaration order.
pub fn missing_required_inputs(compiled: &Value, inputs: &Mapping) -> Vec<String> {
    let Some(declared) = compiled.get("inputs") else {
        return Vec::new();
    };

    let entries: Vec<(String, &Value)> = match declared {
        Value::Mapping(m) => m
            .iter()
            .filter_map(|(k, v)| k.as_str().map(|name| (name.to_string(), v)))
            .collect(),
        Value::Sequence(items) => items
            .iter()
            .filter_map(|item| {
                let id = item.get("id")?.as_str()?;
                Some((id.trim_start_matches('#').to_string(), item))
            })
            .collect(),
        _ => Vec::new(),
    };

    entries
        .into_iter()
        .filter(|(name, decl)| is_required(decl) && !inputs.contains_key(name.as_str()))
        .map(|(name, _)| name)
        .collect()
}

fn is_required(decl: &Value) -> bool {
    match decl {
        Value::String(t) => !t.ends_with('?'),
        Value::Sequence(_) => !is_optional_type(decl),
        Value::Mapping(m) => {
            if m.contains_key("default") {
                return false;
            }
            m.get("type").map_or(true, |t| !is_optional_type(t))
        }
        _ => true,
    }
}

fn is_optional_type(t: &Value) -> bool {
    match t {
        Value::String(s) => s.ends_with('?') || s == "null",
        Value::Sequence(union) => union.iter().any(|v| v.as_str() == Some("null")),
        _ => false,
    }
}
