//! 模块描述符解析
//!
//! 解析 `module-info.java` 的声明形式：
//!
//! ```text
//! module m1 {
//!     requires test.api;
//!     requires transitive automatic;   // 旧写法: requires public automatic;
//!     exports m2;
//!     exports internal to m3, m4;
//! }
//! ```
//!
//! 诊断位置遵循编译器惯例：限定名取最后一个 `.` 的位置，简单名取标识符起点。

use super::lexer::{tokenize, Token, TokenKind};
use super::position::SourcePosition;
use thiserror::Error;

/// `requires` 指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiresDirective {
    /// 被依赖的模块名
    pub module: String,
    /// `transitive`（或旧写法 `public`）
    pub transitive: bool,
    /// `static`：仅编译期依赖
    pub is_static: bool,
    /// 模块名的诊断位置
    pub position: SourcePosition,
}

/// `exports` 指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportsDirective {
    /// 导出的包
    pub package: String,
    /// 限定导出目标，空表示无限定
    pub targets: Vec<String>,
    /// 包名的诊断位置
    pub position: SourcePosition,
}

/// 一个模块声明
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDeclaration {
    pub name: String,
    /// 模块名的诊断位置
    pub name_position: SourcePosition,
    pub requires: Vec<RequiresDirective>,
    pub exports: Vec<ExportsDirective>,
}

/// 描述符语法错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct DescriptorError {
    pub message: String,
    pub position: SourcePosition,
}

impl DescriptorError {
    fn at(position: SourcePosition, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// `requires` 修饰符
const REQUIRES_MODIFIERS: [&str; 3] = ["transitive", "public", "static"];

/// 解析模块描述符源码
pub fn parse_descriptor(source: &str) -> Result<ModuleDeclaration, DescriptorError> {
    let tokens = tokenize(source).map_err(|e| DescriptorError::at(e.position, e.kind.to_string()))?;
    let end = tokens
        .last()
        .map(|t| t.position)
        .unwrap_or_else(SourcePosition::start);
    DescriptorParser {
        tokens,
        index: 0,
        end,
    }
    .parse()
}

struct DescriptorParser {
    tokens: Vec<Token>,
    index: usize,
    /// 输入结束时报告错误的位置
    end: SourcePosition,
}

impl DescriptorParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.index + offset)
    }

    fn unexpected(&self, expected: &str) -> DescriptorError {
        match self.peek() {
            Some(token) => DescriptorError::at(
                token.position,
                format!("expected {expected}, found {}", token.describe()),
            ),
            None => DescriptorError::at(self.end, format!("expected {expected}, found end of input")),
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<(), DescriptorError> {
        if self.peek().is_some_and(|t| t.kind == kind) {
            self.index += 1;
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), DescriptorError> {
        match self.peek() {
            Some(token) if token.is_keyword(keyword) => {
                self.index += 1;
                Ok(())
            }
            _ => Err(self.unexpected(&format!("'{keyword}'"))),
        }
    }

    /// 解析限定名，返回（名字, 诊断位置）
    fn qualified_name(&mut self, what: &str) -> Result<(String, SourcePosition), DescriptorError> {
        let first = match self.peek() {
            Some(token) => match token.ident() {
                Some(name) => (name.to_string(), token.position),
                None => return Err(self.unexpected(what)),
            },
            None => return Err(self.unexpected(what)),
        };
        self.index += 1;

        let (mut name, mut position) = first;
        // `.` 之后不是标识符时停下，交给调用方处理（如 `import p.*;`）
        while let (Some(dot), Some(segment)) = (
            self.peek().filter(|t| t.kind == TokenKind::Dot),
            self.peek_at(1).and_then(|t| t.ident()),
        ) {
            name.push('.');
            name.push_str(segment);
            position = dot.position;
            self.index += 2;
        }
        Ok((name, position))
    }

    fn parse(mut self) -> Result<ModuleDeclaration, DescriptorError> {
        // 模块声明之前允许 import
        while self.peek().is_some_and(|t| t.is_keyword("import")) {
            self.index += 1;
            self.qualified_name("import name")?;
            if matches!(self.peek().map(|t| &t.kind), Some(TokenKind::Dot)) {
                self.index += 1;
                self.expect(TokenKind::Star, "'*'")?;
            }
            self.expect(TokenKind::Semi, "';'")?;
        }

        self.expect_keyword("module")?;
        let (name, name_position) = self.qualified_name("module name")?;
        self.expect(TokenKind::LBrace, "'{'")?;

        let mut declaration = ModuleDeclaration {
            name,
            name_position,
            requires: Vec::new(),
            exports: Vec::new(),
        };

        loop {
            let Some(token) = self.peek() else {
                return Err(self.unexpected("'}'"));
            };
            match &token.kind {
                TokenKind::RBrace => {
                    self.index += 1;
                    break;
                }
                TokenKind::Ident(word) if word == "requires" => {
                    self.index += 1;
                    let directive = self.requires_directive()?;
                    if declaration.requires.iter().any(|r| r.module == directive.module) {
                        return Err(DescriptorError::at(
                            directive.position,
                            format!("duplicate requires: {}", directive.module),
                        ));
                    }
                    declaration.requires.push(directive);
                }
                TokenKind::Ident(word) if word == "exports" => {
                    self.index += 1;
                    let directive = self.exports_directive()?;
                    if declaration.exports.iter().any(|e| e.package == directive.package) {
                        return Err(DescriptorError::at(
                            directive.position,
                            format!("duplicate export: {}", directive.package),
                        ));
                    }
                    declaration.exports.push(directive);
                }
                _ => return Err(self.unexpected("'requires', 'exports' or '}'")),
            }
        }

        if let Some(extra) = self.peek() {
            return Err(DescriptorError::at(
                extra.position,
                format!("unexpected {} after module declaration", extra.describe()),
            ));
        }

        Ok(declaration)
    }

    fn requires_directive(&mut self) -> Result<RequiresDirective, DescriptorError> {
        let mut transitive = false;
        let mut is_static = false;

        // 修饰符后必须紧跟标识符，否则它本身就是模块名（如 `requires transitive;`）
        loop {
            let modifier = match (self.peek(), self.peek_at(1)) {
                (Some(current), Some(following)) if following.ident().is_some() => current
                    .ident()
                    .filter(|word| REQUIRES_MODIFIERS.contains(word))
                    .map(str::to_string),
                _ => None,
            };
            match modifier.as_deref() {
                Some("static") => is_static = true,
                Some(_) => transitive = true,
                None => break,
            }
            self.index += 1;
        }

        let (module, position) = self.qualified_name("module name")?;
        self.expect(TokenKind::Semi, "';'")?;
        Ok(RequiresDirective {
            module,
            transitive,
            is_static,
            position,
        })
    }

    fn exports_directive(&mut self) -> Result<ExportsDirective, DescriptorError> {
        let (package, position) = self.qualified_name("package name")?;
        let mut targets = Vec::new();

        if self.peek().is_some_and(|t| t.is_keyword("to")) {
            self.index += 1;
            loop {
                let (target, _) = self.qualified_name("module name")?;
                targets.push(target);
                if matches!(self.peek().map(|t| &t.kind), Some(TokenKind::Comma)) {
                    self.index += 1;
                } else {
                    break;
                }
            }
        }

        self.expect(TokenKind::Semi, "';'")?;
        Ok(ExportsDirective {
            package,
            targets,
            position,
        })
    }
}
