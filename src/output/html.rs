//! HTML report output

use std::io::Write;

use anyhow::{Context as _, Result};
use tera::{Context, Tera};

use crate::pipeline::PlotReport;

use super::OutputFormatter;

const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>isoplot: {{ gene }}</title>
  <script src="{{ plotly_js }}"></script>
  <style>
    body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; padding: 20px; background: #f5f5f5; color: #333; }
    .header { background: #fff; padding: 20px; border-radius: 8px; margin-bottom: 20px; box-shadow: 0 1px 3px rgba(0,0,0,0.1); }
    .header h1 { margin: 0 0 6px 0; font-size: 24px; }
    .header p { margin: 0; color: #666; }
    .section { background: #fff; padding: 20px; border-radius: 8px; margin-bottom: 20px; box-shadow: 0 1px 3px rgba(0,0,0,0.1); overflow-x: auto; }
    table { border-collapse: collapse; width: 100%; font-size: 14px; }
    th, td { padding: 8px 12px; text-align: left; border-bottom: 1px solid #eee; }
    th { background: #f8f9fa; font-weight: 600; }
    td.num { text-align: right; font-family: monospace; }
  </style>
</head>
<body>
  <div class="header">
    <h1>{{ gene }}</h1>
    <p>{{ transcripts | length }} transcript(s){% if samples %}, {{ samples }} sample(s){% endif %}</p>
  </div>
  <div class="section">
    {{ plot | safe }}
  </div>
  <div class="section">
    <h2>Transcripts</h2>
    <table>
      <tr><th>Transcript</th><th>Name</th><th>Exons</th><th>Start</th><th>End</th><th>Length</th>{% if has_expression %}<th>Total expression</th>{% endif %}</tr>
      {% for tx in transcripts %}
      <tr><td>{{ tx.transcript_id }}</td><td>{{ tx.transcript_name }}</td><td class="num">{{ tx.exons }}</td><td class="num">{{ tx.start }}</td><td class="num">{{ tx.end }}</td><td class="num">{{ tx.length }}</td>{% if has_expression %}<td class="num">{{ tx.total_expression | round(precision=2) }}</td>{% endif %}</tr>
      {% endfor %}
    </table>
  </div>
</body>
</html>
"#;

/// HTML report output
pub struct HtmlOutput {
    template: String,
}

impl HtmlOutput {
    pub fn new() -> Self {
        Self::with_template(TEMPLATE)
    }

    /// Use a custom Tera template; it sees the same context as the default one
    pub fn with_template(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl Default for HtmlOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for HtmlOutput {
    fn render(&self, report: &PlotReport, writer: &mut dyn Write) -> Result<()> {
        let mut context = Context::new();
        context.insert("gene", &report.gene);
        context.insert("plotly_js", PLOTLY_JS);
        context.insert("plot", &report.plot.to_inline_html(Some("isoplot-figure")));
        context.insert("transcripts", &report.transcripts);
        context.insert("has_expression", &report.expression.is_some());
        context.insert(
            "samples",
            &report.expression.as_ref().map_or(0, |m| m.sample_ids().len()),
        );

        let mut tera = Tera::default();
        tera.add_raw_template("report.html", &self.template)
            .context("Invalid HTML report template")?;
        let html = tera
            .render("report.html", &context)
            .context("Failed to render HTML report")?;
        writer.write_all(html.as_bytes())?;

        Ok(())
    }
}
