pub mod files;
pub mod scaffold;
pub mod target;

pub use crate::domain::DomainError;
pub use files::{FileItem, FileNode, FilesDeclaration, FilesStage};
pub use scaffold::Scaffold;
pub use target::{Target, TargetDefinition, TargetId};
