use thiserror::Error;

pub type LayoutResult<T> = Result<T, LayoutError>;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("unknown node id: {0}")]
    UnknownNode(u32),

    #[error("node {0} is a leaf and cannot own children")]
    NotHierarchical(u32),

    #[error("unknown flow node: {0}")]
    UnknownFlowNode(String),
}
