//! File system operations behind the built-in actions

use super::context::OpContext;
use super::params::Params;
use super::{OpError, OpResult};
use glob::Pattern;
use regex::Regex;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// True when `name` is selected by an allow-list (exact names or globs)
///
/// An absent list selects everything.
fn allowed(files: Option<&[String]>, name: &str) -> bool {
    let Some(files) = files else {
        return true;
    };
    files.iter().any(|entry| {
        entry == name
            || Pattern::new(entry)
                .map(|p| p.matches(name))
                .unwrap_or(false)
    })
}

/// Regular files directly inside `dir`, sorted by name
fn files_in(dir: &Path) -> OpResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| OpError::at(dir, e))? {
        let path = entry.map_err(|e| OpError::at(dir, e))?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Where a single file lands when sent to `dst`
fn single_target(src: &Path, dst: &Path) -> OpResult<PathBuf> {
    let into_dir = dst.is_dir() || dst.to_string_lossy().ends_with('/');
    if into_dir {
        fs::create_dir_all(dst).map_err(|e| OpError::at(dst, e))?;
        Ok(dst.join(file_name(src)))
    } else {
        Ok(dst.to_path_buf())
    }
}

pub fn ls(params: &Params, _ctx: &OpContext<'_>) -> OpResult<String> {
    let path = params.required_path("path")?;
    if !path.is_dir() {
        return Err(OpError::DirectoryNotFound(path.to_path_buf()));
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(path).map_err(|e| OpError::at(path, e))? {
        let entry = entry.map_err(|e| OpError::at(path, e))?;
        let mut name = entry.file_name().to_string_lossy().into_owned();
        if entry.path().is_dir() {
            name.push('/');
        }
        names.push(name);
    }
    names.sort();

    if names.is_empty() {
        return Ok(format!("Directory is empty: {}", path.display()));
    }
    Ok(names.join("\n"))
}

pub fn cat(params: &Params, _ctx: &OpContext<'_>) -> OpResult<String> {
    let path = params.required_path("path")?;
    if !path.is_file() {
        return Err(OpError::FileNotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(|e| OpError::io(format!("Error reading {}", path.display()), e))
}

pub fn write(params: &Params, _ctx: &OpContext<'_>) -> OpResult<String> {
    let file = params.required_path("file")?;
    if file.exists() && !params.flag("force") {
        return Err(OpError::FileExists(file.to_path_buf()));
    }
    let content = params.text("content").unwrap_or_default();
    fs::write(file, content).map_err(|e| OpError::io(format!("Error writing to {}", file.display()), e))?;
    Ok(format!("Wrote to {}", file.display()))
}

/// Shared walk for copy and move; `transfer` performs one file
fn transfer_files<F>(params: &Params, verb: &str, transfer: F) -> OpResult<String>
where
    F: Fn(&Path, &Path) -> std::io::Result<()>,
{
    let src = params.required_path("src")?;
    let dst = params.required_path("dst")?;

    if src.is_file() {
        let target = single_target(src, dst)?;
        transfer(src, &target).map_err(|e| OpError::at(src, e))?;
        return Ok(format!("{} {} to {}", verb, src.display(), target.display()));
    }
    if !src.is_dir() {
        return Err(OpError::DirectoryNotFound(src.to_path_buf()));
    }

    fs::create_dir_all(dst).map_err(|e| OpError::at(dst, e))?;
    let mut done = Vec::new();
    for path in files_in(src)? {
        let name = file_name(&path);
        if !allowed(params.list("files"), &name) {
            continue;
        }
        transfer(&path, &dst.join(&name)).map_err(|e| OpError::at(&path, e))?;
        done.push(name);
    }

    if done.is_empty() {
        Ok(format!("No files {}.", verb.to_lowercase()))
    } else {
        Ok(format!("{} files: {}", verb, done.join(", ")))
    }
}

pub fn copy(params: &Params, _ctx: &OpContext<'_>) -> OpResult<String> {
    transfer_files(params, "Copied", |from, to| fs::copy(from, to).map(|_| ()))
}

pub fn move_files(params: &Params, _ctx: &OpContext<'_>) -> OpResult<String> {
    transfer_files(params, "Moved", |from, to| {
        // rename fails across file systems; fall back to copy + remove
        fs::rename(from, to).or_else(|_| {
            fs::copy(from, to)?;
            fs::remove_file(from)
        })
    })
}

pub fn delete(params: &Params, _ctx: &OpContext<'_>) -> OpResult<String> {
    let src = params.required_path("src")?;

    if let Some(files) = params.list("files") {
        if !src.is_dir() {
            return Err(OpError::DirectoryNotFound(src.to_path_buf()));
        }
        let mut deleted = Vec::new();
        for path in files_in(src)? {
            let name = file_name(&path);
            if allowed(Some(files), &name) {
                fs::remove_file(&path).map_err(|e| OpError::at(&path, e))?;
                deleted.push(name);
            }
        }
        return if deleted.is_empty() {
            Ok("No files deleted.".to_string())
        } else {
            Ok(format!("Deleted files: {}", deleted.join(", ")))
        };
    }

    if src.is_file() {
        fs::remove_file(src).map_err(|e| OpError::at(src, e))?;
        Ok(format!("Deleted file: {}", src.display()))
    } else if src.is_dir() {
        let has_entries = fs::read_dir(src)
            .map_err(|e| OpError::at(src, e))?
            .next()
            .is_some();
        if has_entries {
            return Err(OpError::DirectoryNotEmpty(src.to_path_buf()));
        }
        fs::remove_dir(src).map_err(|e| OpError::at(src, e))?;
        Ok(format!("Deleted directory: {}", src.display()))
    } else {
        Err(OpError::PathNotFound(src.to_path_buf()))
    }
}

pub fn mkdir(params: &Params, _ctx: &OpContext<'_>) -> OpResult<String> {
    let path = params.required_path("path")?;
    if path.is_dir() {
        return Err(OpError::DirectoryExists(path.to_path_buf()));
    }
    if path.exists() {
        return Err(OpError::NotADirectory(path.to_path_buf()));
    }
    fs::create_dir_all(path).map_err(|e| OpError::io(format!("Error creating directory {}", path.display()), e))?;
    Ok(format!("Directory created: {}", path.display()))
}

pub fn rmdir(params: &Params, _ctx: &OpContext<'_>) -> OpResult<String> {
    let path = params.required_path("path")?;
    if !path.is_dir() {
        return Err(OpError::DirectoryNotFound(path.to_path_buf()));
    }

    if params.flag("force") {
        fs::remove_dir_all(path).map_err(|e| OpError::at(path, e))?;
        return Ok(format!("Directory and contents removed: {}", path.display()));
    }

    let has_entries = fs::read_dir(path)
        .map_err(|e| OpError::at(path, e))?
        .next()
        .is_some();
    if has_entries {
        return Err(OpError::DirectoryNotEmpty(path.to_path_buf()));
    }
    fs::remove_dir(path).map_err(|e| OpError::at(path, e))?;
    Ok(format!("Empty directory removed: {}", path.display()))
}

pub fn grep(params: &Params, _ctx: &OpContext<'_>) -> OpResult<String> {
    let pattern = params.required_text("pattern")?;
    let root = params.required_path("directory")?;
    let regex = Regex::new(pattern).map_err(|e| OpError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    if !root.exists() {
        return Err(OpError::PathNotFound(root.to_path_buf()));
    }

    let mut matches = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !allowed(params.list("files"), &name) {
            continue;
        }
        // Binary or non-UTF-8 files are skipped
        let Ok(text) = fs::read_to_string(entry.path()) else {
            continue;
        };
        let shown = entry
            .path()
            .strip_prefix(root)
            .ok()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(entry.path());
        for (line_no, line) in text.lines().enumerate() {
            if regex.is_match(line) {
                matches.push(format!("{}:{}: {}", shown.display(), line_no + 1, line));
            }
        }
    }

    if matches.is_empty() {
        Ok(format!("No matches for pattern: {}", pattern))
    } else {
        Ok(matches.join("\n"))
    }
}

pub fn locate(params: &Params, _ctx: &OpContext<'_>) -> OpResult<String> {
    let pattern = params.required_text("pattern")?;
    let root = params.required_path("directory")?;
    let glob = Pattern::new(pattern).map_err(|e| OpError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    if !root.is_dir() {
        return Err(OpError::DirectoryNotFound(root.to_path_buf()));
    }

    let found: Vec<String> = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| glob.matches(&entry.file_name().to_string_lossy()))
        .map(|entry| entry.path().display().to_string())
        .collect();

    if found.is_empty() {
        Ok(format!("No files found matching: {}", pattern))
    } else {
        Ok(found.join("\n"))
    }
}

pub fn touch(params: &Params, _ctx: &OpContext<'_>) -> OpResult<String> {
    let path = params.required_path("path")?;
    if path.exists() {
        let file = File::options()
            .append(true)
            .open(path)
            .map_err(|e| OpError::at(path, e))?;
        file.set_modified(SystemTime::now())
            .map_err(|e| OpError::at(path, e))?;
        Ok(format!("Timestamp updated: {}", path.display()))
    } else {
        File::create(path).map_err(|e| OpError::at(path, e))?;
        Ok(format!("File created: {}", path.display()))
    }
}

pub fn wc(params: &Params, _ctx: &OpContext<'_>) -> OpResult<String> {
    let path = params.required_path("path")?;
    if !path.is_file() {
        return Err(OpError::FileNotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|e| OpError::at(path, e))?;
    Ok(format!(
        "Lines: {}, Words: {}, Characters: {}",
        text.lines().count(),
        text.split_whitespace().count(),
        text.chars().count()
    ))
}

pub fn sort(params: &Params, _ctx: &OpContext<'_>) -> OpResult<String> {
    let path = params.required_path("path")?;
    if !path.is_file() {
        return Err(OpError::FileNotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|e| OpError::at(path, e))?;
    let mut lines: Vec<&str> = text.lines().collect();
    lines.sort_unstable();
    let sorted = lines.join("\n");

    match params.path("output_path") {
        Some(out) => {
            fs::write(out, &sorted).map_err(|e| OpError::at(out, e))?;
            Ok(format!("Sorted lines written to: {}", out.display()))
        }
        None => Ok(sorted),
    }
}

pub fn ln(params: &Params, _ctx: &OpContext<'_>) -> OpResult<String> {
    // Stored as given: a relative target is relative to the link's directory
    let target = Path::new(params.required_text("target_path")?);
    let link = params.required_path("link_path")?;
    if fs::symlink_metadata(link).is_ok() {
        return Err(OpError::LinkExists(link.to_path_buf()));
    }
    symlink(target, link).map_err(|e| OpError::io(format!("Error creating symlink {}", link.display()), e))?;
    Ok(format!("Symlink created: {} -> {}", link.display(), target.display()))
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    let resolved = link.parent().unwrap_or(Path::new(".")).join(target);
    if resolved.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}

#[cfg(not(any(unix, windows)))]
fn symlink(_target: &Path, _link: &Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "symbolic links are not supported on this platform",
    ))
}

pub fn tree(params: &Params, _ctx: &OpContext<'_>) -> OpResult<String> {
    let root = params.required_path("path")?;
    if !root.is_dir() {
        return Err(OpError::DirectoryNotFound(root.to_path_buf()));
    }
    let max_depth = params.integer("max_depth").map(|d| d.max(0) as usize);

    let header = root
        .canonicalize()
        .unwrap_or_else(|_| root.to_path_buf());
    let mut lines = vec![header.display().to_string()];
    walk_tree(root, "", 0, max_depth, &mut lines)?;
    Ok(lines.join("\n"))
}

fn walk_tree(
    dir: &Path,
    prefix: &str,
    depth: usize,
    max_depth: Option<usize>,
    lines: &mut Vec<String>,
) -> OpResult<()> {
    if max_depth.is_some_and(|max| depth > max) {
        return Ok(());
    }

    let mut children: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| OpError::at(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    // Directories first, then by name
    children.sort_by_key(|p| (!p.is_dir(), file_name(p)));

    let count = children.len();
    for (i, child) in children.iter().enumerate() {
        let last = i + 1 == count;
        let connector = if last { "└── " } else { "├── " };
        lines.push(format!("{}{}{}", prefix, connector, file_name(child)));
        if child.is_dir() {
            let extension = if last { "    " } else { "│   " };
            walk_tree(child, &format!("{}{}", prefix, extension), depth + 1, max_depth, lines)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_exact_and_glob() {
        let files = vec!["notes.txt".to_string(), "*.log".to_string()];
        assert!(allowed(Some(&files), "notes.txt"));
        assert!(allowed(Some(&files), "server.log"));
        assert!(!allowed(Some(&files), "main.rs"));
        assert!(allowed(None, "anything"));
    }

    #[test]
    fn test_single_target_into_directory() {
        let target = single_target(Path::new("a/file.txt"), Path::new("/nonexistent/renamed.txt")).unwrap();
        assert_eq!(target, PathBuf::from("/nonexistent/renamed.txt"));
    }
}
