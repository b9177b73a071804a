//! Resolution of externally defined deterministic functions.
//!
//! A `deterministic(script, function)` node names a callable that lives in a
//! separate script. The parser never loads code itself; it asks an injected
//! [`FunctionResolver`] to locate the callable and records the resulting
//! [`FunctionHandle`]. Executing the function is left to the sampling engine.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Result, ScmError};

/// Keywords that introduce a function definition in supported script languages.
const DEFINITION_KEYWORDS: [&str; 3] = ["def", "fn", "function"];

/// Words allowed in front of a definition keyword.
const DEFINITION_MODIFIERS: [&str; 3] = ["pub", "async", "export"];

/// Line comment markers of supported script languages.
const COMMENT_MARKERS: [&str; 2] = ["#", "//"];

/// A located external callable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionHandle {
    /// Script the function is defined in
    pub script: PathBuf,
    /// Function name within the script
    pub name: String,
}

/// Capability to locate a named callable inside a script.
pub trait FunctionResolver: Send + Sync {
    /// Resolve `name` in `script`.
    ///
    /// Fails with [`ScmError::ScriptNotFound`] when the script cannot be
    /// loaded and [`ScmError::FunctionNotFound`] when it does not define
    /// `name`.
    fn resolve(&self, script: &Path, name: &str) -> Result<FunctionHandle>;
}

/// Resolves functions by reading scripts from the filesystem.
#[derive(Debug, Clone, Default)]
pub struct ScriptResolver {
    root: Option<PathBuf>,
}

impl ScriptResolver {
    /// Create a resolver that reads paths as given.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative script paths against `root`, usually the directory
    /// of the description file.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    fn script_path(&self, script: &Path) -> PathBuf {
        match &self.root {
            Some(root) if script.is_relative() => root.join(script),
            _ => script.to_path_buf(),
        }
    }
}

impl FunctionResolver for ScriptResolver {
    fn resolve(&self, script: &Path, name: &str) -> Result<FunctionHandle> {
        let path = self.script_path(script);
        let source = std::fs::read_to_string(&path).map_err(|e| ScmError::ScriptNotFound {
            path: path.display().to_string(),
            source: e,
        })?;

        if !defines_function(&source, name) {
            return Err(ScmError::FunctionNotFound {
                path: path.display().to_string(),
                name: name.to_string(),
            });
        }

        tracing::debug!(script = %path.display(), function = name, "resolved function");
        Ok(FunctionHandle { script: path, name: name.to_string() })
    }
}

/// Whether `source` defines `name` at top level, e.g. `def name(`.
///
/// Indented definitions belong to a class or another function and are not
/// reachable by name, so only column-0 definitions count.
fn defines_function(source: &str, name: &str) -> bool {
    source.lines().any(|line| {
        if line.starts_with(char::is_whitespace)
            || COMMENT_MARKERS.iter().any(|m| line.starts_with(m))
        {
            return false;
        }
        let mut words = line
            .split_whitespace()
            .skip_while(|word| DEFINITION_MODIFIERS.iter().any(|m| m == word));
        let (Some(keyword), Some(rest)) = (words.next(), words.next()) else {
            return false;
        };
        DEFINITION_KEYWORDS.iter().any(|k| *k == keyword)
            && rest
                .strip_prefix(name)
                .map_or(false, |after| after.starts_with('(') || after.is_empty())
    })
}

/// In-memory registry of known scripts and the functions they define.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    scripts: HashMap<PathBuf, HashSet<String>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` as defined in `script`.
    pub fn register(&mut self, script: impl Into<PathBuf>, name: impl Into<String>) {
        self.scripts.entry(script.into()).or_default().insert(name.into());
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_function(mut self, script: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        self.register(script, name);
        self
    }
}

impl FunctionResolver for StaticResolver {
    fn resolve(&self, script: &Path, name: &str) -> Result<FunctionHandle> {
        let functions = self.scripts.get(script).ok_or_else(|| ScmError::ScriptNotFound {
            path: script.display().to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "script not registered"),
        })?;

        if !functions.contains(name) {
            return Err(ScmError::FunctionNotFound {
                path: script.display().to_string(),
                name: name.to_string(),
            });
        }

        Ok(FunctionHandle {
            script: script.to_path_buf(),
            name: name.to_string(),
        })
    }
}
