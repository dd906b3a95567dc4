//! Trace specifications for the structure and expression panels
//!
//! Traces are plain data here; they are turned into plotly traces when the
//! figure is assembled.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{Annotation, ExpressionMatrix, Feature, FeatureType};

use super::axis::TranscriptAxis;

/// Plotly's default qualitative palette
pub const PALETTE: [&str; 10] = [
    "#636EFA", "#EF553B", "#00CC96", "#AB63FA", "#FFA15A", "#19D3F3", "#FF6692", "#B6E880",
    "#FF97FF", "#FECB52",
];

/// How expression values are drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ExpressionStyle {
    #[default]
    Boxplot,
    Points,
}

impl std::str::FromStr for ExpressionStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "boxplot" | "box" => Ok(ExpressionStyle::Boxplot),
            "points" | "strip" => Ok(ExpressionStyle::Points),
            _ => Err(format!("Unknown expression style: {}", s)),
        }
    }
}

/// Appearance of the generated traces
#[derive(Debug, Clone)]
pub struct TraceConfig {
    pub exon_color: String,
    pub cds_color: String,
    pub intron_color: String,
    pub expression_color: String,
    /// Box height of exons and UTRs
    pub exon_height: f64,
    /// Box height of coding regions
    pub cds_height: f64,
    pub intron_line_width: f64,
    pub exon_line_width: f64,
    /// Feature column used to color the structure traces
    pub annotation_hue: Option<String>,
    /// Metadata column used to split the expression traces
    pub expression_hue: Option<String>,
    /// One expression panel per measure
    pub expression_measures: Vec<String>,
    pub expression_style: ExpressionStyle,
    /// Feature column used for transcript labels
    pub y_label_field: String,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            exon_color: "grey".to_string(),
            cds_color: "#3D3D3D".to_string(),
            intron_color: "black".to_string(),
            expression_color: PALETTE[0].to_string(),
            exon_height: 0.3,
            cds_height: 0.5,
            intron_line_width: 0.5,
            exon_line_width: 0.25,
            annotation_hue: None,
            expression_hue: None,
            expression_measures: vec!["counts".to_string()],
            expression_style: ExpressionStyle::default(),
            y_label_field: "transcript_name".to_string(),
        }
    }
}

impl TraceConfig {
    pub fn with_annotation_hue(mut self, column: impl Into<String>) -> Self {
        self.annotation_hue = Some(column.into());
        self
    }

    pub fn with_expression_hue(mut self, column: impl Into<String>) -> Self {
        self.expression_hue = Some(column.into());
        self
    }

    pub fn with_expression_measures(mut self, measures: Vec<String>) -> Self {
        self.expression_measures = measures;
        self
    }

    pub fn with_expression_style(mut self, style: ExpressionStyle) -> Self {
        self.expression_style = style;
        self
    }

    pub fn with_y_label_field(mut self, field: impl Into<String>) -> Self {
        self.y_label_field = field.into();
        self
    }
}

/// Shape drawn for one feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Shape {
    /// Filled rectangle
    Rect { x0: f64, x1: f64, y0: f64, y1: f64 },
    /// Horizontal line
    Line { x0: f64, x1: f64, y: f64 },
}

impl Shape {
    /// Polygon (or segment) vertices
    pub fn points(&self) -> (Vec<f64>, Vec<f64>) {
        match *self {
            Shape::Rect { x0, x1, y0, y1 } => (vec![x0, x1, x1, x0, x0], vec![y0, y0, y1, y1, y0]),
            Shape::Line { x0, x1, y } => (vec![x0, x1], vec![y, y]),
        }
    }
}

/// One feature of the structure panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureTrace {
    pub transcript_id: String,
    pub feature_type: FeatureType,
    pub shape: Shape,
    pub color: String,
    pub line_width: f64,
    pub name: String,
    pub legend_group: String,
    pub show_legend: bool,
    pub hover_text: String,
}

/// One group of expression values across transcripts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionTrace {
    pub name: String,
    pub legend_group: String,
    pub show_legend: bool,
    pub color: String,
    /// Expression values
    pub x: Vec<f64>,
    /// Transcript positions, aligned with `x`
    pub y: Vec<f64>,
    /// Sample ids, aligned with `x`
    pub samples: Vec<String>,
    pub style: ExpressionStyle,
}

/// One expression panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionPanel {
    pub measure: String,
    pub traces: Vec<ExpressionTrace>,
}

/// Everything needed to draw the figure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Traces {
    pub structure: Vec<StructureTrace>,
    pub expression: Vec<ExpressionPanel>,
    pub axis: TranscriptAxis,
}

/// Build structure traces and, when an expression matrix is given, one
/// expression panel per configured measure
pub fn make_traces(
    annotation: &Annotation,
    expression: Option<&ExpressionMatrix>,
    config: &TraceConfig,
) -> Result<Traces> {
    let axis = TranscriptAxis::from_annotation(annotation, &config.y_label_field);
    let structure = structure_traces(annotation, &axis, config);

    let expression = match expression {
        Some(matrix) => config
            .expression_measures
            .iter()
            .enumerate()
            .map(|(i, measure)| expression_panel(matrix, measure, &axis, config, i == 0))
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    log::debug!(
        "Built {} structure trace(s) and {} expression panel(s) for {} transcript(s)",
        structure.len(),
        expression.len(),
        axis.len()
    );

    Ok(Traces {
        structure,
        expression,
        axis,
    })
}

fn structure_traces(annotation: &Annotation, axis: &TranscriptAxis, config: &TraceConfig) -> Vec<StructureTrace> {
    let mut hue_colors: IndexMap<String, String> = IndexMap::new();
    let mut traces = Vec::with_capacity(annotation.len());

    // Exons go first so coding regions are drawn over them
    let mut ordered: Vec<&Feature> = annotation.features.iter().collect();
    ordered.sort_by_key(|f| draw_order(&f.feature_type));

    for feature in ordered {
        let Some(position) = axis.position(&feature.transcript_id) else {
            continue;
        };
        let y = position as f64;
        let label = axis.label(&feature.transcript_id).unwrap_or(&feature.transcript_id);

        let (shape, default_color, line_width) = match &feature.feature_type {
            FeatureType::Intron => (
                Shape::Line {
                    x0: feature.start as f64,
                    x1: feature.end as f64,
                    y,
                },
                &config.intron_color,
                config.intron_line_width,
            ),
            FeatureType::Cds => (
                rect(feature, y, config.cds_height),
                &config.cds_color,
                config.exon_line_width,
            ),
            _ => (
                rect(feature, y, config.exon_height),
                &config.exon_color,
                config.exon_line_width,
            ),
        };

        let hue = config
            .annotation_hue
            .as_deref()
            .and_then(|column| feature.field(column))
            .map(|v| v.into_owned());

        let (color, name, legend_group, show_legend) = match hue {
            Some(value) if !feature.is_intron() => {
                let next = hue_colors.len();
                let first = !hue_colors.contains_key(&value);
                let color = hue_colors
                    .entry(value.clone())
                    .or_insert_with(|| PALETTE[next % PALETTE.len()].to_string())
                    .clone();
                (color, value.clone(), value, first)
            }
            _ => (
                default_color.clone(),
                label.to_string(),
                feature.transcript_id.clone(),
                false,
            ),
        };

        traces.push(StructureTrace {
            transcript_id: feature.transcript_id.clone(),
            feature_type: feature.feature_type.clone(),
            shape,
            color,
            line_width,
            name,
            legend_group,
            show_legend,
            hover_text: hover_text(feature, label),
        });
    }

    traces
}

fn draw_order(kind: &FeatureType) -> u8 {
    match kind {
        FeatureType::Intron => 0,
        FeatureType::Exon => 1,
        FeatureType::Cds => 3,
        _ => 2,
    }
}

fn rect(feature: &Feature, y: f64, height: f64) -> Shape {
    Shape::Rect {
        x0: feature.start as f64,
        x1: feature.end as f64,
        y0: y - height / 2.0,
        y1: y + height / 2.0,
    }
}

fn hover_text(feature: &Feature, label: &str) -> String {
    let genomic = feature.genomic_span();
    let mut text = format!(
        "Transcript: {}<br>Feature: {}",
        label,
        feature.feature_type.as_str()
    );
    if let Some(number) = feature.exon_number {
        text.push_str(&format!("<br>Exon number: {}", number));
    }
    text.push_str(&format!(
        "<br>Start: {}<br>End: {}<br>Width: {}",
        genomic.start,
        genomic.end,
        genomic.width()
    ));
    text
}

fn expression_panel(
    matrix: &ExpressionMatrix,
    measure: &str,
    axis: &TranscriptAxis,
    config: &TraceConfig,
    first_panel: bool,
) -> Result<ExpressionPanel> {
    let measure_idx = matrix
        .measure_index(measure)
        .ok_or_else(|| Error::UnknownMeasure(measure.to_string()))?;

    // hue value (or a single unnamed group) -> trace
    let mut groups: IndexMap<String, ExpressionTrace> = IndexMap::new();
    for record in &matrix.records {
        let Some(position) = axis.position(&record.transcript_id) else {
            continue;
        };
        let Some(&value) = record.values.get(measure_idx) else {
            continue;
        };

        let hue = match config.expression_hue.as_deref() {
            Some(column) => matrix
                .metadata_value(record, column)
                .map(|v| v.display().into_owned())
                .unwrap_or_default(),
            None => String::new(),
        };

        let next = groups.len();
        let trace = groups.entry(hue.clone()).or_insert_with(|| {
            let grouped = config.expression_hue.is_some();
            ExpressionTrace {
                name: if grouped { hue.clone() } else { measure.to_string() },
                legend_group: hue.clone(),
                // hue legend entries come from the first panel only
                show_legend: grouped && first_panel,
                color: if grouped {
                    PALETTE[next % PALETTE.len()].to_string()
                } else {
                    config.expression_color.clone()
                },
                x: Vec::new(),
                y: Vec::new(),
                samples: Vec::new(),
                style: config.expression_style,
            }
        });
        trace.x.push(value);
        trace.y.push(position as f64);
        trace.samples.push(record.sample_id.clone());
    }

    Ok(ExpressionPanel {
        measure: measure.to_string(),
        traces: groups.into_values().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellValue, ExpressionRecord, Strand};

    fn annotation() -> Annotation {
        let exon = |tx: &str, start: i64, end: i64, biotype: &str| {
            Feature::new("chr1", start, end, Strand::Forward, FeatureType::Exon, tx)
                .with_exon_number(1)
                .with_attribute("transcript_biotype", biotype)
        };
        let mut cds = Feature::new("chr1", 120, 180, Strand::Forward, FeatureType::Cds, "t1");
        cds.exon_number = Some(1);
        let intron = Feature::new("chr1", 200, 300, Strand::Forward, FeatureType::Intron, "t1");

        Annotation::new(vec![
            cds,
            exon("t1", 100, 200, "protein_coding"),
            exon("t1", 300, 400, "protein_coding"),
            intron,
            exon("t2", 100, 250, "retained_intron"),
        ])
    }

    fn expression() -> ExpressionMatrix {
        let mut matrix = ExpressionMatrix::new(vec!["counts".to_string()]);
        matrix.metadata_columns = vec!["condition".to_string()];
        for (tx, sample, value, condition) in [
            ("t1", "s1", 5.0, "ctrl"),
            ("t1", "s2", 7.0, "treated"),
            ("t2", "s1", 1.0, "ctrl"),
            ("t3", "s1", 9.0, "ctrl"),
        ] {
            matrix.records.push(ExpressionRecord {
                transcript_id: tx.to_string(),
                gene_id: None,
                sample_id: sample.to_string(),
                values: vec![value],
                metadata: vec![CellValue::from(condition)],
            });
        }
        matrix
    }

    #[test]
    fn test_structure_shapes() {
        let traces = make_traces(&annotation(), None, &TraceConfig::default()).unwrap();
        assert!(traces.expression.is_empty());
        assert_eq!(traces.structure.len(), 5);

        // introns first, coding regions last
        assert_eq!(traces.structure[0].feature_type, FeatureType::Intron);
        assert_eq!(traces.structure[4].feature_type, FeatureType::Cds);

        assert_eq!(
            traces.structure[0].shape,
            Shape::Line { x0: 200.0, x1: 300.0, y: 0.0 }
        );
        match traces.structure[4].shape {
            Shape::Rect { y0, y1, .. } => assert!((y1 - y0 - 0.5).abs() < 1e-9),
            ref other => panic!("unexpected shape {:?}", other),
        }
        let t2 = traces
            .structure
            .iter()
            .find(|t| t.transcript_id == "t2")
            .unwrap();
        assert_eq!(t2.shape.points().1[0], 1.0 - 0.15);
        assert!(t2.hover_text.contains("Start: 100<br>End: 250"));
        assert!(traces.structure.iter().all(|t| !t.show_legend));
    }

    #[test]
    fn test_annotation_hue_colors() {
        let config = TraceConfig::default().with_annotation_hue("transcript_biotype");
        let traces = make_traces(&annotation(), None, &config).unwrap();

        let legend: Vec<_> = traces
            .structure
            .iter()
            .filter(|t| t.show_legend)
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(legend, vec!["protein_coding", "retained_intron"]);

        let t2 = traces.structure.iter().find(|t| t.transcript_id == "t2").unwrap();
        assert_eq!(t2.color, PALETTE[1]);
    }

    #[test]
    fn test_expression_panels() {
        let matrix = expression();
        let traces = make_traces(&annotation(), Some(&matrix), &TraceConfig::default()).unwrap();
        assert_eq!(traces.expression.len(), 1);

        let panel = &traces.expression[0];
        assert_eq!(panel.measure, "counts");
        assert_eq!(panel.traces.len(), 1);
        // t3 is not in the annotation
        assert_eq!(panel.traces[0].x, vec![5.0, 7.0, 1.0]);
        assert_eq!(panel.traces[0].y, vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_expression_hue_and_unknown_measure() {
        let matrix = expression();
        let config = TraceConfig::default().with_expression_hue("condition");
        let traces = make_traces(&annotation(), Some(&matrix), &config).unwrap();
        let names: Vec<_> = traces.expression[0].traces.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["ctrl", "treated"]);
        assert_eq!(traces.expression[0].traces[0].samples, vec!["s1", "s1"]);

        let config = config.with_expression_measures(vec!["counts".to_string(), "counts".to_string()]);
        let traces = make_traces(&annotation(), Some(&matrix), &config).unwrap();
        assert!(traces.expression[0].traces.iter().all(|t| t.show_legend));
        assert!(traces.expression[1].traces.iter().all(|t| !t.show_legend));

        let config = TraceConfig::default().with_expression_measures(vec!["TPM".to_string()]);
        assert!(matches!(
            make_traces(&annotation(), Some(&matrix), &config),
            Err(Error::UnknownMeasure(_))
        ));
    }
}
