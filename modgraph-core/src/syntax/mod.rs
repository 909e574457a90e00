//! 源码层：位置、词法、模块描述符与编译单元
//!
//! 只处理 `module-info.java` 与普通编译单元中访问检查需要的部分。

pub mod descriptor;
pub mod lexer;
pub mod position;
pub mod source;

pub use descriptor::{
    parse_descriptor, DescriptorError, ExportsDirective, ModuleDeclaration, RequiresDirective,
};
pub use lexer::{is_identifier, LexError, LexErrorKind};
pub use position::{SourcePosition, TAB_WIDTH};
pub use source::{scan_compilation_unit, CompilationUnit, PackageReference, ReferenceKind};
