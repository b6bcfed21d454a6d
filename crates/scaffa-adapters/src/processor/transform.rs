//! Named per-file transforms.
//!
//! A target's `pipeline` lists transform names; the processor looks each one
//! up here and applies them in order to the file contents.

use std::{collections::HashMap, fmt, path::Path, sync::Arc};

use serde_json::Value;

use scaffa_core::{application::ApplicationError, domain::Options, error::ScaffaResult};

/// A content transform.
pub trait Transform: Send + Sync {
    /// Rewrite `contents` of the file at `path`.
    fn apply(&self, path: &Path, contents: Vec<u8>, options: &Options) -> Result<Vec<u8>, String>;
}

impl<F> Transform for F
where
    F: Fn(&Path, Vec<u8>, &Options) -> Result<Vec<u8>, String> + Send + Sync,
{
    fn apply(&self, path: &Path, contents: Vec<u8>, options: &Options) -> Result<Vec<u8>, String> {
        self(path, contents, options)
    }
}

/// Transforms by name.
#[derive(Clone, Default)]
pub struct TransformRegistry {
    transforms: HashMap<String, Arc<dyn Transform>>,
}

impl TransformRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with `render` and `trim` registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("render", render);
        registry.register("trim", trim);
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, transform: impl Transform + 'static) {
        self.transforms.insert(name.into(), Arc::new(transform));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.transforms.contains_key(name)
    }

    /// Resolve every name of `pipeline`, failing on the first unknown one.
    pub fn pipeline(&self, pipeline: &[String]) -> ScaffaResult<Vec<(String, Arc<dyn Transform>)>> {
        pipeline
            .iter()
            .map(|name| {
                self.transforms
                    .get(name)
                    .map(|t| (name.clone(), Arc::clone(t)))
                    .ok_or_else(|| ApplicationError::UnknownTransform { name: name.clone() }.into())
            })
            .collect()
    }

    /// Run `pipeline` over `contents`.
    pub fn apply(
        &self,
        pipeline: &[(String, Arc<dyn Transform>)],
        path: &Path,
        mut contents: Vec<u8>,
        options: &Options,
    ) -> ScaffaResult<Vec<u8>> {
        for (name, transform) in pipeline {
            contents = transform.apply(path, contents, options).map_err(|reason| {
                ApplicationError::TransformFailed {
                    name: name.clone(),
                    path: path.to_path_buf(),
                    reason,
                }
            })?;
        }
        Ok(contents)
    }
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.transforms.keys().collect();
        names.sort();
        f.debug_struct("TransformRegistry")
            .field("transforms", &names)
            .finish()
    }
}

// ── Built-ins ─────────────────────────────────────────────────────────────────

/// Replace `{{key}}` with the value of option `key`.
///
/// Strings are inserted verbatim, numbers and booleans via their JSON text.
/// Other values and unknown keys leave the placeholder untouched.
fn render(_path: &Path, contents: Vec<u8>, options: &Options) -> Result<Vec<u8>, String> {
    let mut text = String::from_utf8(contents).map_err(|e| format!("not UTF-8: {e}"))?;

    for (key, value) in options {
        let replacement = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => continue,
        };
        let placeholder = format!("{{{{{key}}}}}");
        text = text.replace(&placeholder, &replacement);
    }

    Ok(text.into_bytes())
}

/// Strip trailing whitespace from every line and end with one newline.
fn trim(_path: &Path, contents: Vec<u8>, _options: &Options) -> Result<Vec<u8>, String> {
    let text = String::from_utf8(contents).map_err(|e| format!("not UTF-8: {e}"))?;
    let mut out: String = text
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    let trimmed = out.trim_end_matches('\n').len();
    out.truncate(trimmed);
    out.push('\n');
    Ok(out.into_bytes())
}
