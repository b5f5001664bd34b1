use thiserror::Error;

/// Why a triangle (or a line range of one) produced no record.
///
/// Every variant is an ordinary outcome of triangle setup, not a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("vertex or texture coordinate is not finite or out of range")]
    InvalidVertex,

    #[error("vertex has w <= 0")]
    NonPositiveW,

    #[error("triangle has zero area")]
    Degenerate,

    #[error("triangle winding is culled")]
    Culled,

    #[error("triangle covers no pixel centre")]
    EmptyBoundingBox,

    #[error("triangle lies outside the viewport")]
    OutsideViewport,

    #[error("fixed-point overflow in {field}")]
    Overflow { field: &'static str },

    #[error("invalid line range {start}..{end}")]
    InvalidLineRange { start: u16, end: u16 },

    #[error("line range does not intersect the bounding box")]
    LinesOutsideBoundingBox,
}
