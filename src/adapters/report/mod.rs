//! Snapshot renderers.
//!
//! `text` produces the terminal dashboard; `chart_svg` draws the trend
//! lines for the `chart` command.

pub mod chart_svg;
pub mod text;

pub use chart_svg::SvgTrendChart;
pub use text::TextReport;
