use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Deserialize;

use crate::config::FileSet;
use crate::error::GuardError;

/// 入口文件类型，由文件名（不含扩展名）决定。
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// `page.*`：页面入口。
    Page,
    /// `layout.*`：布局入口。
    Layout,
}

impl EntryKind {
    pub fn from_stem(stem: &str) -> Option<Self> {
        match stem {
            "page" => Some(EntryKind::Page),
            "layout" => Some(EntryKind::Layout),
            _ => None,
        }
    }
}

/// 一份待检查的入口源码。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    /// 相对应用根目录的路径，直接用于报告输出。
    pub path: PathBuf,
    pub kind: EntryKind,
    pub text: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, kind: EntryKind, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            text: text.into(),
        }
    }
}

/// 收集应用根目录下全部入口文件的路径，按路径排序。
///
/// # 执行流程（How）
/// 1. 对 `files.roots` 中每个存在的目录做深度优先遍历；
/// 2. 跳过 `files.skip_dirs` 中列出的目录名；
/// 3. 文件名为 `page`/`layout` 且扩展名命中 `files.extensions` 的文件纳入结果。
pub fn collect_entry_paths(
    root: &Path,
    files: &FileSet,
) -> Result<Vec<(PathBuf, EntryKind)>, GuardError> {
    let mut found = Vec::new();
    for app_root in &files.roots {
        let start = root.join(app_root);
        if !start.is_dir() {
            tracing::debug!(root = %start.display(), "application root absent, skipped");
            continue;
        }

        let mut stack = vec![start];
        while let Some(dir) = stack.pop() {
            let entries = fs::read_dir(&dir).map_err(|error| GuardError::io(&dir, error))?;
            for entry in entries {
                let entry = entry.map_err(|error| GuardError::io(&dir, error))?;
                let path = entry.path();
                let file_type = entry
                    .file_type()
                    .map_err(|error| GuardError::io(&path, error))?;
                if file_type.is_dir() {
                    if !should_skip_dir(&path, files) {
                        stack.push(path);
                    }
                } else if let Some(kind) = entry_kind(&path, files) {
                    found.push((path, kind));
                }
            }
        }
    }

    found.sort();
    found.dedup();
    Ok(found)
}

/// 读取应用根目录下的全部入口源码；文件并行读取，结果按路径排序。
pub fn load_sources(root: &Path, files: &FileSet) -> Result<Vec<SourceFile>, GuardError> {
    let paths = collect_entry_paths(root, files)?;
    paths
        .into_par_iter()
        .map(|(path, kind)| -> Result<SourceFile, GuardError> {
            let text = fs::read_to_string(&path).map_err(|error| GuardError::io(&path, error))?;
            let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
            Ok(SourceFile::new(relative, kind, text))
        })
        .collect()
}

fn should_skip_dir(path: &Path, files: &FileSet) -> bool {
    path.file_name()
        .and_then(OsStr::to_str)
        .is_some_and(|name| files.skip_dirs.iter().any(|skip| skip == name))
}

fn entry_kind(path: &Path, files: &FileSet) -> Option<EntryKind> {
    let extension = path.extension().and_then(OsStr::to_str)?;
    if !files
        .extensions
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(extension))
    {
        return None;
    }
    path.file_stem()
        .and_then(OsStr::to_str)
        .and_then(EntryKind::from_stem)
}
