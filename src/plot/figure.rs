//! Assembling traces into a multi-panel plotly figure

use plotly::box_plot::BoxPoints;
use plotly::common::{Anchor, Fill, Font, HoverInfo, Label, Line, Marker, Mode, Orientation, Title};
use plotly::layout::{
    Annotation as PlotAnnotation, Axis, BoxMode, GridPattern, Layout, LayoutGrid, Legend, Margin,
};
use plotly::{BoxPlot, Plot, Scatter};

use crate::error::{Error, Result};

use super::traces::{ExpressionStyle, ExpressionTrace, Shape, StructureTrace, Traces};

/// Most panels a figure can hold (one structure panel plus expression panels)
pub const MAX_PANELS: usize = 8;

/// Layout of the assembled figure
#[derive(Debug, Clone)]
pub struct PlotConfig {
    /// Panel titles, left to right; missing titles default to the panel content
    pub subplot_titles: Vec<String>,
    /// Space between panels as a fraction of the figure width
    pub horizontal_spacing: f64,
    pub show_legend: bool,
    pub height: usize,
    pub width: usize,
    pub box_group_gap: f64,
    pub box_gap: f64,
    /// Vertical grid lines in the structure panel
    pub structure_grid: bool,
    /// Vertical grid lines in the expression panels
    pub expression_grid: bool,
    /// Horizontal grid lines at each transcript, shared by all panels
    pub transcript_grid: bool,
    pub legend_title: Option<String>,
    pub legend_font_size: usize,
    pub xaxis_font_size: usize,
    pub yaxis_font_size: usize,
    pub subplot_title_font_size: usize,
    pub legend_title_font_size: usize,
    pub hover_font_size: usize,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            subplot_titles: vec!["Transcript Structure".to_string()],
            horizontal_spacing: 0.02,
            show_legend: true,
            height: 800,
            width: 1800,
            box_group_gap: 0.8,
            box_gap: 0.2,
            structure_grid: true,
            expression_grid: true,
            transcript_grid: true,
            legend_title: None,
            legend_font_size: 12,
            xaxis_font_size: 12,
            yaxis_font_size: 12,
            subplot_title_font_size: 16,
            legend_title_font_size: 14,
            hover_font_size: 12,
        }
    }
}

impl PlotConfig {
    pub fn with_subplot_titles(mut self, titles: Vec<String>) -> Self {
        self.subplot_titles = titles;
        self
    }

    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_show_legend(mut self, show: bool) -> Self {
        self.show_legend = show;
        self
    }

    pub fn with_grids(mut self, structure: bool, expression: bool, transcript: bool) -> Self {
        self.structure_grid = structure;
        self.expression_grid = expression;
        self.transcript_grid = transcript;
        self
    }

    pub fn with_legend_title(mut self, title: impl Into<String>) -> Self {
        self.legend_title = Some(title.into());
        self
    }

    /// Panel titles with defaults filled in for panels without one
    pub fn titles_for(&self, traces: &Traces) -> Vec<String> {
        std::iter::once("Transcript Structure".to_string())
            .chain(traces.expression.iter().map(|p| p.measure.clone()))
            .enumerate()
            .map(|(i, default)| self.subplot_titles.get(i).cloned().unwrap_or(default))
            .collect()
    }
}

/// Build the figure: the structure panel first, then one panel per
/// expression measure, all sharing the transcript axis
pub fn make_plot(traces: &Traces, config: &PlotConfig) -> Result<Plot> {
    let panels = 1 + traces.expression.len();
    if panels > MAX_PANELS {
        return Err(Error::TooManyPanels {
            requested: panels,
            max: MAX_PANELS,
        });
    }

    let mut plot = Plot::new();

    for trace in &traces.structure {
        plot.add_trace(structure_trace(trace));
    }
    for (i, panel) in traces.expression.iter().enumerate() {
        let x_axis = axis_id(i + 1);
        for trace in &panel.traces {
            let with_box = trace.style == ExpressionStyle::Boxplot;
            plot.add_trace(box_trace(trace, &x_axis, with_box));
        }
    }

    plot.set_layout(layout(traces, config, panels));
    log::debug!("Assembled figure with {} panel(s)", panels);
    Ok(plot)
}

/// Axis id of a panel: `x`, `x2`, `x3`, ...
fn axis_id(panel: usize) -> String {
    if panel == 0 {
        "x".to_string()
    } else {
        format!("x{}", panel + 1)
    }
}

fn structure_trace(trace: &StructureTrace) -> Box<Scatter<f64, f64>> {
    let (x, y) = trace.shape.points();
    let scatter = Scatter::new(x, y)
        .mode(Mode::Lines)
        .name(trace.name.as_str())
        .legend_group(trace.legend_group.as_str())
        .show_legend(trace.show_legend)
        .hover_text(trace.hover_text.as_str())
        .hover_info(HoverInfo::Text)
        .x_axis("x")
        .y_axis("y");

    match trace.shape {
        Shape::Rect { .. } => scatter
            .fill(Fill::ToSelf)
            .fill_color(trace.color.clone())
            .line(Line::new().color(trace.color.clone()).width(trace.line_width)),
        Shape::Line { .. } => scatter.line(Line::new().color(trace.color.clone()).width(trace.line_width)),
    }
}

fn box_trace(trace: &ExpressionTrace, x_axis: &str, with_box: bool) -> Box<BoxPlot<f64, f64>> {
    let plot = BoxPlot::new_xy(trace.x.clone(), trace.y.clone())
        .orientation(Orientation::Horizontal)
        .name(trace.name.as_str())
        .legend_group(trace.legend_group.as_str())
        .show_legend(trace.show_legend)
        .box_points(BoxPoints::All)
        .marker(Marker::new().color(trace.color.clone()).size(4))
        .x_axis(x_axis)
        .y_axis("y");

    if with_box {
        plot.line(Line::new().color(trace.color.clone()))
    } else {
        // hide the box itself, keep the points
        plot.line(Line::new().color("rgba(0,0,0,0)")).fill_color("rgba(0,0,0,0)")
    }
}

fn layout(traces: &Traces, config: &PlotConfig, panels: usize) -> Layout {
    let axis = &traces.axis;
    let titles = config.titles_for(traces);

    // cell width and gap, both as fractions of the figure width
    let spacing = config.horizontal_spacing;
    let cell = (1.0 - spacing * (panels as f64 - 1.0)) / panels as f64;

    let annotations: Vec<PlotAnnotation> = titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            PlotAnnotation::new()
                .text(title.as_str())
                .x_ref("paper")
                .y_ref("paper")
                .x(i as f64 * (cell + spacing) + cell / 2.0)
                .y(1.0)
                .x_anchor(Anchor::Center)
                .y_anchor(Anchor::Bottom)
                .show_arrow(false)
                .font(Font::new().size(config.subplot_title_font_size))
        })
        .collect();

    let mut legend = Legend::new()
        .font(Font::new().size(config.legend_font_size))
        .trace_group_gap(7);
    if let Some(ref title) = config.legend_title {
        legend = legend.title(Title::new(title.as_str()).font(Font::new().size(config.legend_title_font_size)));
    }

    let y_axis = Axis::new()
        .range(axis.range().to_vec())
        .tick_values(axis.tick_values())
        .tick_text(axis.labels())
        .show_tick_labels(true)
        .show_grid(config.transcript_grid)
        .zero_line(false)
        .tick_font(Font::new().size(config.yaxis_font_size));

    let mut layout = Layout::new()
        .grid(
            LayoutGrid::new()
                .rows(1)
                .columns(panels)
                .pattern(GridPattern::Coupled)
                .x_gap(spacing / cell),
        )
        .show_legend(config.show_legend)
        .height(config.height)
        .width(config.width)
        .plot_background_color("white")
        .paper_background_color("white")
        .hover_label(Label::new().font(Font::new().size(config.hover_font_size)))
        .margin(Margin::new().left(100).right(50).top(100).bottom(50))
        .box_mode(BoxMode::Group)
        .box_gap(config.box_gap)
        .box_group_gap(config.box_group_gap)
        .legend(legend)
        .annotations(annotations)
        .y_axis(y_axis);

    for panel in 0..panels {
        let structure = panel == 0;
        let x_axis = Axis::new()
            .show_tick_labels(!structure)
            .show_grid(if structure {
                config.structure_grid
            } else {
                config.expression_grid
            })
            .zero_line(false)
            .tick_font(Font::new().size(config.xaxis_font_size));
        layout = set_x_axis(layout, panel, x_axis);
    }

    layout
}

fn set_x_axis(layout: Layout, panel: usize, axis: Axis) -> Layout {
    match panel {
        0 => layout.x_axis(axis),
        1 => layout.x_axis2(axis),
        2 => layout.x_axis3(axis),
        3 => layout.x_axis4(axis),
        4 => layout.x_axis5(axis),
        5 => layout.x_axis6(axis),
        6 => layout.x_axis7(axis),
        _ => layout.x_axis8(axis),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Annotation, ExpressionMatrix, ExpressionRecord, Feature, FeatureType, Strand};
    use crate::plot::{make_traces, ExpressionPanel, TraceConfig};

    fn traces() -> Traces {
        let annotation = Annotation::new(vec![
            Feature::new("chr1", 100, 200, Strand::Forward, FeatureType::Exon, "t1"),
            Feature::new("chr1", 200, 300, Strand::Forward, FeatureType::Intron, "t1"),
            Feature::new("chr1", 300, 400, Strand::Forward, FeatureType::Exon, "t1"),
        ]);
        let mut matrix = ExpressionMatrix::new(vec!["counts".to_string(), "CPM".to_string()]);
        matrix.records.push(ExpressionRecord {
            transcript_id: "t1".to_string(),
            gene_id: None,
            sample_id: "s1".to_string(),
            values: vec![3.0, 1e6],
            metadata: Vec::new(),
        });
        let config = TraceConfig::default()
            .with_expression_measures(vec!["counts".to_string(), "CPM".to_string()]);
        make_traces(&annotation, Some(&matrix), &config).unwrap()
    }

    #[test]
    fn test_titles_default_to_measures() {
        let config = PlotConfig::default();
        assert_eq!(
            config.titles_for(&traces()),
            vec!["Transcript Structure", "counts", "CPM"]
        );

        let config = PlotConfig::default().with_subplot_titles(vec!["A".into(), "B".into()]);
        assert_eq!(config.titles_for(&traces()), vec!["A", "B", "CPM"]);
    }

    #[test]
    fn test_figure_json() {
        let plot = make_plot(&traces(), &PlotConfig::default()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&plot.to_json()).unwrap();

        let data = json["data"].as_array().unwrap();
        assert_eq!(data.len(), 5);
        assert_eq!(data[0]["type"], "scatter");
        assert_eq!(data[3]["type"], "box");
        assert_eq!(data[4]["xaxis"], "x3");

        let layout = &json["layout"];
        assert_eq!(layout["height"], 800);
        assert_eq!(layout["width"], 1800);
        assert_eq!(layout["boxmode"], "group");
        assert_eq!(layout["yaxis"]["ticktext"][0], "t1");
        assert_eq!(layout["xaxis"]["showticklabels"], false);
        assert_eq!(layout["xaxis2"]["showticklabels"], true);
        assert_eq!(layout["annotations"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_too_many_panels() {
        let mut traces = traces();
        traces.expression = (0..MAX_PANELS)
            .map(|i| ExpressionPanel {
                measure: format!("m{}", i),
                traces: Vec::new(),
            })
            .collect();
        assert!(matches!(
            make_plot(&traces, &PlotConfig::default()),
            Err(Error::TooManyPanels { requested: 9, max: 8 })
        ));
    }
}
