//! 解析阶段错误
//!
//! 构图阶段遇到的问题立即终止本次运行（不产生模块图），
//! 每种错误都能转换为一条原始格式的 [`Diagnostic`]。

use crate::diagnostic::{Diagnostic, DiagnosticCode, SourceLocation};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 构图错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// 两个可观察模块同名
    #[error("module {name} found in both {} and {}", .first.display(), .second.display())]
    NameConflict {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// 依赖或根模块不可观察
    #[error("module not found: {name}")]
    MissingModule {
        name: String,
        location: Option<SourceLocation>,
    },

    /// 模块描述符无法解析
    #[error("bad module descriptor {}: {message}", .path.display())]
    MalformedDescriptor {
        path: PathBuf,
        message: String,
        location: Option<SourceLocation>,
    },

    /// 源码模块声明名与目录名不一致
    #[error("module name {declared} does not match expected name {expected}")]
    ModuleNameMismatch {
        declared: String,
        expected: String,
        location: Option<SourceLocation>,
    },

    /// 无法从文件名推导自动模块名
    #[error("unable to derive module name for {}: {reason}", .path.display())]
    InvalidAutomaticName { path: PathBuf, reason: String },

    /// 归档损坏或不受支持
    #[error("bad archive {}: {message}", .path.display())]
    MalformedArchive { path: PathBuf, message: String },

    /// 文件读取失败
    #[error("error reading {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },

    /// 配置项取值非法
    #[error("bad value for {option} option: '{value}'")]
    InvalidOption { option: String, value: String },
}

impl ResolveError {
    pub(crate) fn io(path: &Path, error: impl std::fmt::Display) -> Self {
        ResolveError::Io {
            path: path.to_path_buf(),
            message: error.to_string(),
        }
    }

    /// 诊断位置（如果有）
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            ResolveError::MissingModule { location, .. }
            | ResolveError::MalformedDescriptor { location, .. }
            | ResolveError::ModuleNameMismatch { location, .. } => location.as_ref(),
            _ => None,
        }
    }

    /// 转换为原始格式诊断
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic = match self {
            ResolveError::NameConflict {
                name,
                first,
                second,
            } => Diagnostic::new(
                DiagnosticCode::DuplicateModule,
                [name.clone(), display(first), display(second)],
            ),
            ResolveError::MissingModule { name, .. } => {
                Diagnostic::new(DiagnosticCode::ModuleNotFound, [name.clone()])
            }
            ResolveError::MalformedDescriptor { path, message, .. } => Diagnostic::new(
                DiagnosticCode::MalformedModuleDescriptor,
                [display(path), message.clone()],
            ),
            ResolveError::ModuleNameMismatch {
                declared, expected, ..
            } => Diagnostic::new(
                DiagnosticCode::ModuleNameMismatch,
                [declared.clone(), expected.clone()],
            ),
            ResolveError::InvalidAutomaticName { path, reason } => Diagnostic::new(
                DiagnosticCode::InvalidAutomaticModuleName,
                [display(path), reason.clone()],
            ),
            ResolveError::MalformedArchive { path, message }
            | ResolveError::Io { path, message } => Diagnostic::new(
                DiagnosticCode::CantReadFile,
                [display(path), message.clone()],
            ),
            ResolveError::InvalidOption { option, value } => Diagnostic::new(
                DiagnosticCode::BadValueForOption,
                [option.clone(), value.clone()],
            ),
        };
        diagnostic.with_location(self.location().cloned())
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
