//! Repository mirroring
//!
//! Walks the remote tree one directory level at a time and reproduces it
//! under a local directory. A file that cannot be fetched or written is
//! counted as a failure and the walk carries on.

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::forge::{ForgeApi, TreeEntry};

// Extensions whose MIME type is text/*; these are checked as UTF-8 before writing
const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "text", "md", "markdown", "csv", "tsv", "html", "htm", "css", "xml", "py", "c", "h",
    "cc", "cpp", "cxx", "hpp", "java", "ics", "vcf", "vtt", "sgml", "rtx", "etx", "js", "mjs",
    "bat", "ksh", "pl",
];

/// Counters for one mirror run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DownloadStats {
    pub files: usize,
    pub directories: usize,
    pub failures: usize,
}

/// True when the file name maps to a `text/*` MIME type
pub fn is_text_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TEXT_EXTENSIONS.iter().any(|text| text.eq_ignore_ascii_case(ext)))
}

fn remote_child(folder: &str, name: &str) -> String {
    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", folder.trim_end_matches('/'), name)
    }
}

fn is_safe_component(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// Mirrors the tree at `ref_name` into `local_dir`
///
/// Fails only when `local_dir` itself cannot be created.
pub async fn download_tree(
    forge: &dyn ForgeApi,
    project_id: u64,
    ref_name: &str,
    local_dir: &Path,
    progress: &ProgressBar,
) -> Result<DownloadStats> {
    tokio::fs::create_dir_all(local_dir)
        .await
        .with_context(|| format!("Failed to create mirror directory {}", local_dir.display()))?;

    let mut stats = DownloadStats::default();
    let mut pending: Vec<(String, PathBuf)> = vec![(String::new(), local_dir.to_path_buf())];

    while let Some((folder, dir)) = pending.pop() {
        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            warn!(dir = %dir.display(), error = %e, "failed to create directory");
            stats.failures += 1;
            continue;
        }
        stats.directories += 1;

        let entries = match forge.repository_tree(project_id, ref_name, &folder).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(folder = %folder, error = %e, "failed to list folder");
                stats.failures += 1;
                continue;
            }
        };
        if entries.is_empty() {
            warn!(folder = %folder, "folder listing is empty");
            stats.failures += 1;
            continue;
        }

        for entry in entries {
            if !is_safe_component(&entry.name) {
                warn!(name = %entry.name, "skipping entry with unusable name");
                stats.failures += 1;
                continue;
            }

            let remote_path = remote_child(&folder, &entry.name);
            let local_path = dir.join(&entry.name);

            if entry.is_tree() {
                pending.push((remote_path, local_path));
            } else if entry.is_blob() {
                progress.set_message(remote_path.clone());
                progress.tick();
                match download_file(forge, project_id, ref_name, &entry, &remote_path, &local_path).await {
                    Ok(()) => stats.files += 1,
                    Err(e) => {
                        warn!(file = %remote_path, error = %format!("{e:#}"), "failed to mirror file");
                        stats.failures += 1;
                    }
                }
            } else {
                debug!(name = %entry.name, kind = %entry.kind, "skipping non-file entry");
            }
        }
    }

    Ok(stats)
}

async fn download_file(
    forge: &dyn ForgeApi,
    project_id: u64,
    ref_name: &str,
    entry: &TreeEntry,
    remote_path: &str,
    local_path: &Path,
) -> Result<()> {
    let file = forge.file(project_id, remote_path, ref_name).await?;
    let content = file.decoded_content()?;

    if is_text_file(&entry.name) {
        std::str::from_utf8(&content).with_context(|| format!("{remote_path} is not valid UTF-8"))?;
    }

    tokio::fs::write(local_path, &content)
        .await
        .with_context(|| format!("Failed to write {}", local_path.display()))?;
    debug!(file = %remote_path, bytes = content.len(), "mirrored");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_classification() {
        assert!(is_text_file("README.md"));
        assert!(is_text_file("notes.TXT"));
        assert!(is_text_file("data.csv"));
        assert!(!is_text_file("main.rs"));
        assert!(!is_text_file("logo.png"));
        assert!(!is_text_file("Makefile"));
    }

    #[test]
    fn test_scripts_are_text() {
        for name in ["app.js", "module.mjs", "build.bat", "setup.ksh", "report.pl"] {
            assert!(is_text_file(name), "{name} should be text");
        }
        assert!(!is_text_file("archive.zip"));
    }

    #[test]
    fn test_remote_child() {
        assert_eq!(remote_child("", "src"), "src");
        assert_eq!(remote_child("src", "lib.rs"), "src/lib.rs");
        assert_eq!(remote_child("src/", "lib.rs"), "src/lib.rs");
    }

    #[test]
    fn test_safe_component() {
        assert!(is_safe_component("lib.rs"));
        assert!(!is_safe_component(".."));
        assert!(!is_safe_component("a/b"));
        assert!(!is_safe_component(""));
    }
}
