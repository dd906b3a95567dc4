//! Plot construction: transcript axis, trace specifications, figure layout

mod axis;
mod figure;
mod traces;

pub use self::axis::{x_range, TranscriptAxis};
pub use self::figure::{make_plot, PlotConfig, MAX_PANELS};
pub use self::traces::{
    make_traces, ExpressionPanel, ExpressionStyle, ExpressionTrace, Shape, StructureTrace,
    TraceConfig, Traces, PALETTE,
};
