use anyhow::{Context, Result};
use glob::{glob_with, MatchOptions, Pattern};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Handles file system traversal and discovery of usage log files
pub struct FileDiscovery {
    extension: String,
}

impl Default for FileDiscovery {
    fn default() -> Self {
        Self::new("jsonl")
    }
}

impl FileDiscovery {
    pub fn new(extension: impl Into<String>) -> Self {
        let extension = extension.into();
        Self {
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// Default log root: `~/.claude/projects`.
    pub fn default_projects_dir() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Could not find home directory")?;
        Ok(home_dir.join(".claude").join("projects"))
    }

    /// Recursively find every regular file under `root` with the log extension.
    ///
    /// Files come back in traversal order (glob yields them sorted within each
    /// directory). A missing root, a root that is not a directory, or a
    /// directory that cannot be read aborts discovery with the offending path.
    pub fn find_log_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let meta = fs::metadata(root)
            .with_context(|| format!("Cannot access log directory: {}", root.display()))?;
        if !meta.is_dir() {
            anyhow::bail!("Log path is not a directory: {}", root.display());
        }

        let escaped_root = Pattern::escape(&root.to_string_lossy());
        let pattern = format!("{}/**/*.{}", escaped_root, self.extension);
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };

        let mut files = Vec::new();
        let paths = glob_with(&pattern, options)
            .with_context(|| format!("Invalid search pattern for {}", root.display()))?;

        for entry in paths {
            let path = entry.map_err(|e| {
                let failed = e.path().to_path_buf();
                anyhow::Error::new(e.into_error())
                    .context(format!("Failed to read directory: {}", failed.display()))
            })?;

            if path.is_file() {
                files.push(path);
            }
        }

        debug!(root = %root.display(), files = files.len(), "Discovered log files");
        Ok(files)
    }
}
