//! Layout host error types.

use thiserror::Error;

use crate::layout::ElementId;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("unknown element: {0:?}")]
    UnknownElement(ElementId),

    #[error("{child:?} is not a child of {parent:?}")]
    NotAChild { parent: ElementId, child: ElementId },

    #[error("cannot insert {child:?} into {parent:?}: it would create a cycle")]
    Cycle { parent: ElementId, child: ElementId },

    #[error("the root element cannot be {0}")]
    RootElement(&'static str),

    #[error("taffy error: {0}")]
    Taffy(#[from] taffy::TaffyError),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
