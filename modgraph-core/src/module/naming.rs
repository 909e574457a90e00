//! 自动模块命名
//!
//! 由归档文件名推导模块名：
//! 1. 去掉 `.jar` 后缀
//! 2. 从版本模式的第一个匹配处截断（默认 `-(\d+(\.|$))`）
//! 3. 非字母数字字符替换为 `.`
//! 4. 合并连续的 `.`，去掉首尾的 `.`
//!
//! `test-api-1.0.jar` → `test.api`，`foo-bar-2.3.4-SNAPSHOT.jar` → `foo.bar`。

use crate::syntax::is_identifier;
use modgraph_config::{NamingConfig, DEFAULT_VERSION_PATTERN};
use once_cell::sync::OnceCell;
use regex::Regex;
use thiserror::Error;

/// 命名失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NamingError {
    #[error("{file_name}: {reason}")]
    InvalidName { file_name: String, reason: String },
    #[error("invalid version pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// 自动模块命名规则
pub trait AutomaticNaming: Send + Sync {
    /// 由制品文件名（不含目录）推导模块名
    fn derive_name(&self, file_name: &str) -> Result<String, NamingError>;
}

/// Java 保留字不能作为模块名的一段
const RESERVED_WORDS: [&str; 53] = [
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface",
    "long", "native", "new", "package", "private", "protected", "public", "return", "short",
    "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "try", "void", "volatile", "while", "true", "false", "null",
];

static DEFAULT_VERSION_RULE: OnceCell<Regex> = OnceCell::new();

/// 基于版本正则的默认命名规则
#[derive(Debug, Clone)]
pub struct DefaultNaming {
    version: Regex,
}

impl DefaultNaming {
    /// 默认版本模式
    pub fn new() -> Result<Self, NamingError> {
        let version = DEFAULT_VERSION_RULE
            .get_or_try_init(|| compile(DEFAULT_VERSION_PATTERN))?
            .clone();
        Ok(Self { version })
    }

    /// 自定义版本模式
    pub fn with_pattern(pattern: &str) -> Result<Self, NamingError> {
        if pattern == DEFAULT_VERSION_PATTERN {
            return Self::new();
        }
        Ok(Self {
            version: compile(pattern)?,
        })
    }

    pub fn from_config(config: &NamingConfig) -> Result<Self, NamingError> {
        Self::with_pattern(&config.version_pattern)
    }

    pub fn pattern(&self) -> &str {
        self.version.as_str()
    }
}

fn compile(pattern: &str) -> Result<Regex, NamingError> {
    Regex::new(pattern).map_err(|e| NamingError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

impl AutomaticNaming for DefaultNaming {
    fn derive_name(&self, file_name: &str) -> Result<String, NamingError> {
        let invalid = |reason: &str| NamingError::InvalidName {
            file_name: file_name.to_string(),
            reason: reason.to_string(),
        };

        let stem = file_name.strip_suffix(".jar").unwrap_or(file_name);
        let stem = match self.version.find(stem) {
            Some(found) => &stem[..found.start()],
            None => stem,
        };

        let mut name = String::with_capacity(stem.len());
        for c in stem.chars() {
            let c = if c.is_ascii_alphanumeric() { c } else { '.' };
            if c == '.' && (name.is_empty() || name.ends_with('.')) {
                continue;
            }
            name.push(c);
        }
        while name.ends_with('.') {
            name.pop();
        }

        if name.is_empty() {
            return Err(invalid("empty module name"));
        }
        for segment in name.split('.') {
            if !is_identifier(segment) {
                return Err(invalid(&format!("'{segment}' is not a Java identifier")));
            }
            if RESERVED_WORDS.contains(&segment) {
                return Err(invalid(&format!("'{segment}' is a reserved word")));
            }
        }
        Ok(name)
    }
}
