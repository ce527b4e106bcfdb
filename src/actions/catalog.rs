//! Capability contracts and the registry that holds them

use ahash::AHashMap;

use super::params::{ParamKind, ParamSpec, ParamValue, Params};
use super::context::OpContext;
use super::{fs_ops, system_ops, text_ops, OpResult};
use crate::core::error::{Result, TaifError};

/// Function that performs a capability once its parameters are bound
pub type ExecuteFn = fn(&Params, &OpContext<'_>) -> OpResult<String>;

/// A single supported operation with its parameter contract
#[derive(Debug, Clone)]
pub struct CapabilityContract {
    pub name: &'static str,
    pub description: &'static str,
    pub required: Vec<ParamSpec>,
    pub optional: Vec<ParamSpec>,
    pub execute: ExecuteFn,
}

impl CapabilityContract {
    pub fn new(name: &'static str, description: &'static str, execute: ExecuteFn) -> Self {
        Self {
            name,
            description,
            required: Vec::new(),
            optional: Vec::new(),
            execute,
        }
    }

    pub fn require(mut self, spec: ParamSpec) -> Self {
        self.required.push(spec);
        self
    }

    pub fn optional(mut self, spec: ParamSpec) -> Self {
        self.optional.push(spec);
        self
    }

    /// Look up a parameter spec by name, required or optional
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.required
            .iter()
            .chain(self.optional.iter())
            .find(|spec| spec.name == name)
    }

    /// `name(required, [optional])` signature shown to the reasoning service
    pub fn signature(&self) -> String {
        let mut parts: Vec<String> = self.required.iter().map(ParamSpec::signature).collect();
        parts.extend(self.optional.iter().map(|p| format!("[{}]", p.signature())));
        format!("{}({})", self.name, parts.join(", "))
    }
}

/// Registry of every action the agent can perform
///
/// Populated once at startup; read-only while instructions are handled.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    contracts: Vec<CapabilityContract>,
    index: AHashMap<&'static str, usize>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a contract; action names must be unique
    pub fn register(&mut self, contract: CapabilityContract) -> Result<()> {
        if self.index.contains_key(contract.name) {
            return Err(TaifError::DuplicateAction(contract.name.to_string()));
        }
        self.index.insert(contract.name, self.contracts.len());
        self.contracts.push(contract);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<&CapabilityContract> {
        self.index
            .get(name)
            .map(|&i| &self.contracts[i])
            .ok_or_else(|| TaifError::UnknownAction(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Action names in registration order
    pub fn list_actions(&self) -> Vec<&'static str> {
        self.contracts.iter().map(|c| c.name).collect()
    }

    pub fn contracts(&self) -> impl Iterator<Item = &CapabilityContract> {
        self.contracts.iter()
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Registry with the full built-in vocabulary
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();
        for contract in builtin_contracts() {
            registry.register(contract)?;
        }
        Ok(registry)
    }
}

fn here() -> ParamValue {
    ParamValue::Path(".".into())
}

fn builtin_contracts() -> Vec<CapabilityContract> {
    vec![
        CapabilityContract::new("ls", "List directory entries", fs_ops::ls)
            .optional(ParamSpec::path("path", "Directory to list").with_default(here())),
        CapabilityContract::new("cat", "Show a file's contents", fs_ops::cat)
            .require(ParamSpec::path("path", "File to read")),
        CapabilityContract::new("write", "Write text to a file", fs_ops::write)
            .require(ParamSpec::path("file", "File to write"))
            .optional(
                ParamSpec::text("content", "Text to write")
                    .with_default(ParamValue::Text(String::new())),
            )
            .optional(ParamSpec::flag("force", "Overwrite an existing file")),
        CapabilityContract::new("copy", "Copy files from one directory to another", fs_ops::copy)
            .require(ParamSpec::path("src", "Source directory"))
            .require(ParamSpec::path("dst", "Destination directory"))
            .optional(ParamSpec::list("files", "Only these file names")),
        CapabilityContract::new("move", "Move files from one directory to another", fs_ops::move_files)
            .require(ParamSpec::path("src", "Source directory"))
            .require(ParamSpec::path("dst", "Destination directory"))
            .optional(ParamSpec::list("files", "Only these file names")),
        CapabilityContract::new("delete", "Delete a file, an empty directory, or files in a directory", fs_ops::delete)
            .require(ParamSpec::path("src", "File, or directory holding the files"))
            .optional(ParamSpec::list("files", "Only these file names inside src")),
        CapabilityContract::new("mkdir", "Create a directory", fs_ops::mkdir)
            .require(ParamSpec::path("path", "Directory to create")),
        CapabilityContract::new("rmdir", "Remove a directory", fs_ops::rmdir)
            .require(ParamSpec::path("path", "Directory to remove"))
            .optional(ParamSpec::flag("force", "Remove contents too")),
        CapabilityContract::new("grep", "Search file contents with a regular expression", fs_ops::grep)
            .require(ParamSpec::text("pattern", "Regular expression"))
            .optional(ParamSpec::path("directory", "Directory to search").with_default(here()))
            .optional(ParamSpec::list("files", "Only files matching these globs")),
        CapabilityContract::new("locate", "Find files by name pattern", fs_ops::locate)
            .require(ParamSpec::text("pattern", "Glob such as *.py"))
            .optional(ParamSpec::path("directory", "Directory to search").with_default(here())),
        CapabilityContract::new("echo", "Repeat text back", system_ops::echo)
            .require(ParamSpec::text("text", "Text to print")),
        CapabilityContract::new("touch", "Create a file or update its timestamp", fs_ops::touch)
            .require(ParamSpec::path("path", "File to touch")),
        CapabilityContract::new("wc", "Count lines, words and characters", fs_ops::wc)
            .require(ParamSpec::path("path", "File to count")),
        CapabilityContract::new("sort", "Sort the lines of a file", fs_ops::sort)
            .require(ParamSpec::path("path", "File to sort"))
            .optional(ParamSpec::path("output_path", "Write sorted lines here")),
        CapabilityContract::new("uname", "Show system information", system_ops::uname),
        CapabilityContract::new("pwd", "Show the working directory", system_ops::pwd),
        CapabilityContract::new("ps", "List running processes", system_ops::ps),
        CapabilityContract::new("wget", "Download a URL to a file", system_ops::wget)
            .require(ParamSpec::text("url", "URL to fetch"))
            .require(ParamSpec::path("output_path", "File to save to")),
        CapabilityContract::new("ln", "Create a symbolic link", fs_ops::ln)
            .require(ParamSpec::text("target_path", "Link target, stored as given"))
            .require(ParamSpec::path("link_path", "Link to create")),
        CapabilityContract::new("tree", "Show a directory tree", fs_ops::tree)
            .optional(ParamSpec::path("path", "Root directory").with_default(here()))
            .optional(ParamSpec::new("max_depth", ParamKind::Integer, "Depth limit")),
        CapabilityContract::new("summarize", "Summarize a file with the reasoning backend", text_ops::summarize)
            .require(ParamSpec::path("file", "File to summarize"))
            .optional(ParamSpec::text("model", "Model to use instead of the default"))
            .optional(ParamSpec::integer("max_length", "Word limit for the summary")),
        CapabilityContract::new("rewrite", "Rewrite a file with the reasoning backend", text_ops::rewrite)
            .require(ParamSpec::path("file", "File to rewrite"))
            .require(ParamSpec::text("prompt", "How to rewrite it"))
            .require(ParamSpec::path("output", "File to save the result to"))
            .optional(ParamSpec::text("model", "Model to use instead of the default")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_vocabulary_order() {
        let registry = CapabilityRegistry::builtin().unwrap();
        let actions = registry.list_actions();
        assert_eq!(actions.len(), 22);
        assert_eq!(&actions[20..], &["summarize", "rewrite"]);
        assert_eq!(&actions[..3], &["ls", "cat", "write"]);
        assert!(actions.contains(&"tree"));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = CapabilityRegistry::builtin().unwrap();
        let err = registry
            .register(CapabilityContract::new("cat", "again", system_ops::pwd))
            .unwrap_err();
        assert!(matches!(err, TaifError::DuplicateAction(name) if name == "cat"));
        assert_eq!(registry.len(), 22);
    }

    #[test]
    fn test_resolve_unknown() {
        let registry = CapabilityRegistry::builtin().unwrap();
        assert!(registry.resolve("cat").is_ok());
        assert!(matches!(
            registry.resolve("format_disk"),
            Err(TaifError::UnknownAction(_))
        ));
    }

    #[test]
    fn test_signature() {
        let registry = CapabilityRegistry::builtin().unwrap();
        let copy = registry.resolve("copy").unwrap();
        assert_eq!(copy.signature(), "copy(src:path, dst:path, [files:list])");
        assert_eq!(registry.resolve("pwd").unwrap().signature(), "pwd()");
    }
}
