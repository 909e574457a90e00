//! 编译单元扫描
//!
//! 访问检查只需要知道每个源文件引用了哪些包里的哪些类型，因此这里不做完整的
//! 语法分析，而是按命名惯例识别限定类型引用：前导段以小写开头（包名），
//! 随后一段以大写开头（类型名）。`api.Api`、`m2.M2` 是类型引用；
//! `api.actionPerformed` 是成员访问，不计入。
//!
//! 首段是本编译单元中已声明的变量、参数或字段名时，该限定名是成员访问
//! （如 `value.MAX`），同样不计入。声明按出现顺序记录，不区分作用域。
//!
//! 引用位置取类型名前的 `.`，与编译器对限定名的诊断位置一致。

use super::lexer::{tokenize, LexError, Token, TokenKind};
use super::position::SourcePosition;
use std::collections::BTreeSet;

/// 引用种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// 限定类型引用或单类型导入
    Type,
    /// 按需导入 `import p.*;`
    Package,
}

/// 对另一个包的引用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReference {
    pub kind: ReferenceKind,
    /// 被引用的包
    pub package: String,
    /// 类型简单名，按需导入时为空
    pub type_name: String,
    /// 诊断位置
    pub position: SourcePosition,
}

impl PackageReference {
    /// 诊断中使用的名字：类型引用为 `包.类型`，按需导入为包名
    pub fn display_name(&self) -> String {
        match self.kind {
            ReferenceKind::Type => format!("{}.{}", self.package, self.type_name),
            ReferenceKind::Package => self.package.clone(),
        }
    }
}

/// 扫描后的编译单元
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilationUnit {
    /// `package` 声明，缺省为无名包
    pub package: Option<String>,
    /// 按源码顺序排列的引用
    pub references: Vec<PackageReference>,
}

/// 不能作为包名首段的关键字
const NON_PACKAGE_KEYWORDS: [&str; 4] = ["this", "super", "new", "class"];

/// 其后的标识符不是被声明的名字
const STATEMENT_KEYWORDS: [&str; 7] = ["return", "throw", "case", "assert", "yield", "package", "import"];

/// 扫描一段源代码
pub fn scan_compilation_unit(source: &str) -> Result<CompilationUnit, LexError> {
    let tokens = tokenize(source)?;
    let mut unit = CompilationUnit::default();
    let mut declared: BTreeSet<String> = BTreeSet::new();
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        let Some(word) = token.ident() else {
            i += 1;
            continue;
        };

        match word {
            "package" if unit.package.is_none() && unit.references.is_empty() => {
                let chain = Chain::read(&tokens, i + 1);
                unit.package = Some(chain.segments.join("."));
                i = chain.end;
            }
            "import" => {
                let mut start = i + 1;
                if tokens.get(start).is_some_and(|t| t.is_keyword("static")) {
                    start += 1;
                }
                let chain = Chain::read(&tokens, start);
                i = chain.end;
                if let Some(star) = chain.on_demand(&tokens) {
                    i += 2;
                    match chain.type_reference() {
                        Some(reference) => unit.references.push(reference),
                        None if !chain.segments.is_empty() => unit.references.push(PackageReference {
                            kind: ReferenceKind::Package,
                            package: chain.segments.join("."),
                            type_name: String::new(),
                            position: star,
                        }),
                        None => {}
                    }
                } else if let Some(reference) = chain.type_reference() {
                    unit.references.push(reference);
                }
            }
            _ => {
                let preceded_by_dot = i > 0 && tokens[i - 1].kind == TokenKind::Dot;
                let start = i;
                let chain = Chain::read(&tokens, i);
                i = chain.end.max(i + 1);
                if preceded_by_dot || NON_PACKAGE_KEYWORDS.contains(&word) {
                    continue;
                }
                if chain.segments.len() == 1 && is_declaration(&tokens, start) {
                    declared.insert(word.to_string());
                    continue;
                }
                if declared.contains(word) {
                    continue;
                }
                if let Some(reference) = chain.type_reference() {
                    unit.references.push(reference);
                }
            }
        }
    }

    Ok(unit)
}

/// `tokens[index]` 是否是变量、参数或字段的声明名：前面是类型，后面是 `=` `;` `,` `)` `:`
fn is_declaration(tokens: &[Token], index: usize) -> bool {
    let Some(previous) = index.checked_sub(1).and_then(|p| tokens.get(p)) else {
        return false;
    };
    let after_type = match &previous.kind {
        TokenKind::Ident(name) => !STATEMENT_KEYWORDS.contains(&name.as_str()),
        TokenKind::Other('>') | TokenKind::Other(']') => true,
        _ => false,
    };
    after_type
        && tokens.get(index + 1).is_some_and(|next| {
            matches!(
                next.kind,
                TokenKind::Semi | TokenKind::Comma | TokenKind::Other('=' | ')' | ':')
            )
        })
}

/// 由 `.` 连接的标识符序列
struct Chain {
    segments: Vec<String>,
    /// 第 n 段（n ≥ 1）之前那个 `.` 的位置
    dots: Vec<SourcePosition>,
    /// 序列之后第一个 token 的下标
    end: usize,
}

impl Chain {
    fn read(tokens: &[Token], start: usize) -> Self {
        let mut chain = Chain {
            segments: Vec::new(),
            dots: Vec::new(),
            end: start,
        };
        let Some(first) = tokens.get(start).and_then(|t| t.ident()) else {
            return chain;
        };
        chain.segments.push(first.to_string());
        chain.end = start + 1;

        while let (Some(dot), Some(segment)) = (
            tokens.get(chain.end).filter(|t| t.kind == TokenKind::Dot),
            tokens.get(chain.end + 1).and_then(|t| t.ident()),
        ) {
            chain.dots.push(dot.position);
            chain.segments.push(segment.to_string());
            chain.end += 2;
        }
        chain
    }

    /// 若序列后紧跟 `. *`，返回 `*` 前 `.` 的位置
    fn on_demand(&self, tokens: &[Token]) -> Option<SourcePosition> {
        let dot = tokens.get(self.end).filter(|t| t.kind == TokenKind::Dot)?;
        tokens
            .get(self.end + 1)
            .filter(|t| t.kind == TokenKind::Star)
            .map(|_| dot.position)
    }

    /// 按命名惯例拆分为 包 + 类型
    fn type_reference(&self) -> Option<PackageReference> {
        let type_index = self
            .segments
            .iter()
            .position(|s| s.starts_with(|c: char| c.is_uppercase()))?;
        if type_index == 0 {
            return None;
        }
        Some(PackageReference {
            kind: ReferenceKind::Type,
            package: self.segments[..type_index].join("."),
            type_name: self.segments[type_index].clone(),
            position: self.dots[type_index - 1],
        })
    }
}
