// Pie chart rendering and export.
//
// The engine knows nothing about rendering: anything that turns labels and
// counts into an image satisfies PieChartRenderer. The default renderer
// emits SVG directly, so no browser round-trip is involved; the chart
// description kept alongside each image uses the Chart.js configuration
// shape so the combined HTML document can re-create the charts client-side.

use std::f64::consts::TAU;
use std::fs;
use std::path::Path;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::survey::*;

/// File name of the combined HTML document.
pub const COMBINED_DOCUMENT_NAME: &str = "charts.html";
/// Prefix of the per-question image files, completed by a 1-based index.
pub const CHART_FILE_PREFIX: &str = "chart-";

// The palette Chart.js applies to unstyled datasets, cycled over the slices.
const SLICE_COLORS: [&str; 7] = [
    "#36a2eb", "#ff6384", "#ff9f40", "#ffcd56", "#4bc0c0", "#9966ff", "#c9cbcf",
];

pub trait PieChartRenderer {
    fn render_pie_chart(
        &self,
        title: &str,
        labels: &[String],
        counts: &[u64],
    ) -> SurveyResult<RenderedChart>;
}

/// A rendered chart: the image bytes plus the serializable description used
/// by the combined document.
#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub image: Vec<u8>,
    pub config: ChartConfig,
}

// Chart description, in the Chart.js configuration shape.

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub chart_type: String,
    pub data: ChartData,
    pub options: ChartOptions,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ChartDataset {
    pub data: Vec<u64>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ChartOptions {
    pub radius: u32,
    pub responsive: bool,
    pub plugins: ChartPlugins,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ChartPlugins {
    pub title: TitleOptions,
    pub legend: LegendOptions,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TitleOptions {
    pub display: bool,
    pub text: String,
    pub font: FontOptions,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct LegendOptions {
    pub display: bool,
    pub position: String,
    pub labels: LegendLabels,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct LegendLabels {
    pub font: FontOptions,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FontOptions {
    pub size: u32,
}

impl ChartConfig {
    /// The pie configuration the legacy exporter produced, constants
    /// included, so existing consumers of the document keep working.
    pub fn pie(title: &str, labels: &[String], counts: &[u64]) -> ChartConfig {
        ChartConfig {
            chart_type: "pie".to_string(),
            data: ChartData {
                labels: labels.to_vec(),
                datasets: vec![ChartDataset {
                    data: counts.to_vec(),
                }],
            },
            options: ChartOptions {
                radius: 250,
                responsive: false,
                plugins: ChartPlugins {
                    title: TitleOptions {
                        display: true,
                        text: title.to_string(),
                        font: FontOptions { size: 35 },
                    },
                    legend: LegendOptions {
                        display: true,
                        position: "top".to_string(),
                        labels: LegendLabels {
                            font: FontOptions { size: 15 },
                        },
                    },
                },
            },
        }
    }
}

/// Server-side vector renderer. Canvas dimensions follow the legacy
/// exporter: 1300x850 with a radius-250 pie.
#[derive(Debug, Clone)]
pub struct SvgPieRenderer {
    width: u32,
    height: u32,
    radius: f64,
}

impl Default for SvgPieRenderer {
    fn default() -> Self {
        SvgPieRenderer {
            width: 1300,
            height: 850,
            radius: 250.0,
        }
    }
}

impl PieChartRenderer for SvgPieRenderer {
    fn render_pie_chart(
        &self,
        title: &str,
        labels: &[String],
        counts: &[u64],
    ) -> SurveyResult<RenderedChart> {
        if labels.is_empty() {
            whatever!("render_pie_chart: no labels for chart {:?}", title);
        }
        if labels.len() != counts.len() {
            whatever!(
                "render_pie_chart: {:?} labels but {:?} counts for chart {:?}",
                labels.len(),
                counts.len(),
                title
            );
        }
        let total: u64 = counts.iter().sum();
        if total == 0 {
            whatever!("render_pie_chart: all counts are zero for chart {:?}", title);
        }
        let svg = self.render_svg(title, labels, counts, total);
        Ok(RenderedChart {
            image: svg.into_bytes(),
            config: ChartConfig::pie(title, labels, counts),
        })
    }
}

impl SvgPieRenderer {
    fn render_svg(&self, title: &str, labels: &[String], counts: &[u64], total: u64) -> String {
        let mut lines: Vec<String> = Vec::new();
        lines.push(format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\" font-family=\"sans-serif\">",
            self.width, self.height, self.width, self.height
        ));
        lines.push("  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>".to_string());
        lines.push(format!(
            "  <text x=\"{}\" y=\"50\" font-size=\"35\" text-anchor=\"middle\">{}</text>",
            self.width / 2,
            escape_xml(title)
        ));

        // Legend, one swatch per label, top-left under the title.
        for (idx, label) in labels.iter().enumerate() {
            let y = 80 + (idx as u32) * 24;
            let color = SLICE_COLORS[idx % SLICE_COLORS.len()];
            lines.push(format!(
                "  <rect x=\"20\" y=\"{}\" width=\"16\" height=\"16\" fill=\"{}\"/>",
                y, color
            ));
            lines.push(format!(
                "  <text x=\"42\" y=\"{}\" font-size=\"15\">{} ({})</text>",
                y + 13,
                escape_xml(label),
                counts[idx]
            ));
        }

        let cx = f64::from(self.width) / 2.0;
        let cy = f64::from(self.height) / 2.0 + 40.0;

        // Slices start at twelve o'clock and run clockwise, like Chart.js.
        let mut start_angle = -TAU / 4.0;
        for (idx, count) in counts.iter().enumerate() {
            let color = SLICE_COLORS[idx % SLICE_COLORS.len()];
            let fraction = *count as f64 / total as f64;
            if fraction <= 0.0 {
                continue;
            }
            // A full-circle arc degenerates in SVG path syntax.
            if fraction >= 1.0 {
                lines.push(format!(
                    "  <circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\"/>",
                    cx, cy, self.radius, color
                ));
                break;
            }
            let end_angle = start_angle + fraction * TAU;
            let (x1, y1) = (
                cx + self.radius * start_angle.cos(),
                cy + self.radius * start_angle.sin(),
            );
            let (x2, y2) = (
                cx + self.radius * end_angle.cos(),
                cy + self.radius * end_angle.sin(),
            );
            let large_arc = if fraction > 0.5 { 1 } else { 0 };
            lines.push(format!(
                "  <path d=\"M {:.2} {:.2} L {:.2} {:.2} A {:.2} {:.2} 0 {} 1 {:.2} {:.2} Z\" fill=\"{}\"/>",
                cx, cy, x1, y1, self.radius, self.radius, large_arc, x2, y2, color
            ));
            start_angle = end_angle;
        }

        lines.push("</svg>".to_string());
        lines.join("\n")
    }
}

/// Outcome of one chart export run.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ChartExportReport {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
    pub document_written: bool,
}

impl ChartExportReport {
    pub fn summary(&self) -> String {
        format!(
            "{} charts written, {} questions skipped, {} renders failed",
            self.written, self.skipped, self.failed
        )
    }
}

/// Walks the question tables in order and writes one image per chartable
/// question plus the combined HTML document.
///
/// Image numbering is 1-based and contiguous over the charts actually
/// written: skipped and failed questions leave no gap. A render failure is
/// logged and the export moves on to the next question.
pub fn export_charts(
    stats: &SurveyStats,
    out_dir: &Path,
    renderer: &dyn PieChartRenderer,
) -> SurveyResult<ChartExportReport> {
    fs::create_dir_all(out_dir).context(WritingArtifactSnafu {
        path: out_dir.display().to_string(),
    })?;

    let mut report = ChartExportReport::default();
    let mut configs: Vec<ChartConfig> = Vec::new();
    let mut chart_no: usize = 1;

    for table in stats.questions.iter() {
        if !table.is_chartable() {
            debug!(
                "export_charts: skipping {:?}: no answer repeats",
                table.question
            );
            report.skipped += 1;
            continue;
        }

        let labels: Vec<String> = table
            .answers
            .iter()
            .map(|(answer, _)| answer.to_string())
            .collect();
        let counts: Vec<u64> = table.answers.iter().map(|(_, count)| count).collect();

        let rendered = match renderer.render_pie_chart(&table.question, &labels, &counts) {
            Result::Ok(rendered) => rendered,
            Result::Err(e) => {
                warn!("export_charts: could not render {:?}: {}", table.question, e);
                report.failed += 1;
                continue;
            }
        };

        let file_name = format!("{}{}.svg", CHART_FILE_PREFIX, chart_no);
        let image_path = out_dir.join(&file_name);
        info!("Saving {}", image_path.display());
        fs::write(&image_path, &rendered.image).context(WritingArtifactSnafu {
            path: image_path.display().to_string(),
        })?;
        configs.push(rendered.config);
        chart_no += 1;
        report.written += 1;
    }

    let html = build_combined_document(&configs)?;
    let html_path = out_dir.join(COMBINED_DOCUMENT_NAME);
    info!("Saving {}", html_path.display());
    fs::write(&html_path, html).context(WritingArtifactSnafu {
        path: html_path.display().to_string(),
    })?;
    report.document_written = true;

    Ok(report)
}

// The combined document re-creates every chart in the browser from its
// description, one numbered canvas per chart. It is valid with zero charts.
fn build_combined_document(configs: &[ChartConfig]) -> SurveyResult<String> {
    let mut configs_js: Vec<String> = Vec::new();
    for config in configs.iter() {
        configs_js.push(serde_json::to_string(config).context(ParsingJsonSnafu {})?);
    }

    let mut lines: Vec<String> = Vec::new();
    lines.push("<html>".to_string());
    lines.push("<head><meta charset=\"utf-8\"/></head>".to_string());
    lines.push(
        "<body style=\"display: flex; flex-direction: column; align-items: center; justify-content: center;\">"
            .to_string(),
    );
    for idx in 0..configs.len() {
        lines.push(format!(
            "  <canvas id=\"{}\" width=\"1300\" height=\"850\"></canvas>",
            idx + 1
        ));
    }
    lines.push("  <script src=\"https://cdn.jsdelivr.net/npm/chart.js\"></script>".to_string());
    lines.push("  <script>".to_string());
    lines.push(format!(
        "    const chartConfigs = [{}];",
        configs_js.join(", ")
    ));
    lines.push("    chartConfigs.forEach((config, index) => {".to_string());
    lines.push("      const canvas = document.getElementById(String(index + 1));".to_string());
    lines.push("      new Chart(canvas.getContext('2d'), config);".to_string());
    lines.push("    });".to_string());
    lines.push("  </script>".to_string());
    lines.push("</body>".to_string());
    lines.push("</html>".to_string());
    Ok(lines.join("\n"))
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_tabulation::{Category, FrequencyTable, QuestionTable, SurveyStats};

    fn table(question: &str, answers: &[(&str, u64)]) -> QuestionTable {
        let mut t = FrequencyTable::new();
        for (answer, count) in answers.iter() {
            t.add(answer, *count);
        }
        QuestionTable {
            question: question.to_string(),
            answers: t,
        }
    }

    fn stats(questions: Vec<QuestionTable>) -> SurveyStats {
        SurveyStats {
            questions,
            category_tally: Category::ALL.iter().map(|c| (*c, 0)).collect(),
            employer_terms: FrequencyTable::new(),
        }
    }

    // Fails on one designated title, delegates everything else.
    struct FlakyRenderer {
        fail_on: String,
        inner: SvgPieRenderer,
    }

    impl PieChartRenderer for FlakyRenderer {
        fn render_pie_chart(
            &self,
            title: &str,
            labels: &[String],
            counts: &[u64],
        ) -> SurveyResult<RenderedChart> {
            if title == self.fail_on {
                whatever!("no canvas context for {:?}", title);
            }
            self.inner.render_pie_chart(title, labels, counts)
        }
    }

    #[test]
    fn svg_contains_title_and_slices() {
        let renderer = SvgPieRenderer::default();
        let rendered = renderer
            .render_pie_chart(
                "Favourite color?",
                &["blue".to_string(), "red".to_string()],
                &[3, 1],
            )
            .unwrap();
        let svg = String::from_utf8(rendered.image).unwrap();
        assert!(svg.contains("Favourite color?"));
        assert_eq!(svg.matches("<path").count(), 2);
        assert!(svg.contains("#36a2eb"));
        assert!(svg.contains("blue (3)"));
    }

    #[test]
    fn single_answer_pie_is_a_full_circle() {
        let renderer = SvgPieRenderer::default();
        let rendered = renderer
            .render_pie_chart("Q", &["yes".to_string()], &[5])
            .unwrap();
        let svg = String::from_utf8(rendered.image).unwrap();
        assert!(svg.contains("<circle"));
        assert_eq!(svg.matches("<path").count(), 0);
    }

    #[test]
    fn titles_are_escaped() {
        let renderer = SvgPieRenderer::default();
        let rendered = renderer
            .render_pie_chart("Cats & <dogs>?", &["yes".to_string()], &[2])
            .unwrap();
        let svg = String::from_utf8(rendered.image).unwrap();
        assert!(svg.contains("Cats &amp; &lt;dogs&gt;?"));
    }

    #[test]
    fn mismatched_labels_are_an_error() {
        let renderer = SvgPieRenderer::default();
        assert!(renderer
            .render_pie_chart("Q", &["a".to_string()], &[1, 2])
            .is_err());
        assert!(renderer.render_pie_chart("Q", &[], &[]).is_err());
    }

    #[test]
    fn chart_config_keeps_the_legacy_shape() {
        let config = ChartConfig::pie("Q", &["a".to_string()], &[2]);
        let js = serde_json::to_value(&config).unwrap();
        assert_eq!(js["type"], "pie");
        assert_eq!(js["data"]["labels"][0], "a");
        assert_eq!(js["data"]["datasets"][0]["data"][0], 2);
        assert_eq!(js["options"]["radius"], 250);
        assert_eq!(js["options"]["plugins"]["title"]["text"], "Q");
        assert_eq!(js["options"]["plugins"]["legend"]["position"], "top");
    }

    #[test]
    fn export_numbers_only_written_charts() {
        let dir = tempfile::tempdir().unwrap();
        let s = stats(vec![
            // All singletons: skipped.
            table("Q1", &[("a", 1), ("b", 1)]),
            table("Q2", &[("a", 2), ("b", 1)]),
            table("Q3", &[("x", 3)]),
        ]);
        let report = export_charts(&s, dir.path(), &SvgPieRenderer::default()).unwrap();

        assert_eq!(report.written, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 0);
        assert!(dir.path().join("chart-1.svg").exists());
        assert!(dir.path().join("chart-2.svg").exists());
        assert!(!dir.path().join("chart-3.svg").exists());

        // chart-1 belongs to the first eligible question.
        let first = std::fs::read_to_string(dir.path().join("chart-1.svg")).unwrap();
        assert!(first.contains("Q2"));
    }

    #[test]
    fn render_failure_skips_the_question_and_keeps_numbering() {
        let dir = tempfile::tempdir().unwrap();
        let s = stats(vec![
            table("Q1", &[("a", 2)]),
            table("Q2", &[("b", 2)]),
            table("Q3", &[("c", 2)]),
        ]);
        let renderer = FlakyRenderer {
            fail_on: "Q2".to_string(),
            inner: SvgPieRenderer::default(),
        };
        let report = export_charts(&s, dir.path(), &renderer).unwrap();

        assert_eq!(report.written, 2);
        assert_eq!(report.failed, 1);
        assert!(dir.path().join("chart-1.svg").exists());
        assert!(dir.path().join("chart-2.svg").exists());
        assert!(!dir.path().join("chart-3.svg").exists());

        let second = std::fs::read_to_string(dir.path().join("chart-2.svg")).unwrap();
        assert!(second.contains("Q3"));
    }

    #[test]
    fn empty_export_still_writes_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let s = stats(vec![table("Q1", &[("a", 1)])]);
        let report = export_charts(&s, dir.path(), &SvgPieRenderer::default()).unwrap();

        assert_eq!(report.written, 0);
        assert!(report.document_written);
        let html = std::fs::read_to_string(dir.path().join(COMBINED_DOCUMENT_NAME)).unwrap();
        assert!(html.contains("const chartConfigs = [];"));
        assert!(!html.contains("<canvas"));
    }

    #[test]
    fn combined_document_embeds_every_config() {
        let dir = tempfile::tempdir().unwrap();
        let s = stats(vec![
            table("Q1", &[("a", 2), ("b", 1)]),
            table("Q2", &[("c", 3), ("d", 3)]),
        ]);
        export_charts(&s, dir.path(), &SvgPieRenderer::default()).unwrap();

        let html = std::fs::read_to_string(dir.path().join(COMBINED_DOCUMENT_NAME)).unwrap();
        assert!(html.contains("<canvas id=\"1\""));
        assert!(html.contains("<canvas id=\"2\""));
        assert!(html.contains("\"type\":\"pie\""));
        assert!(html.contains("Q1"));
        assert!(html.contains("Q2"));
        assert!(html.contains("new Chart"));
    }

    #[test]
    fn output_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out").join("charts");
        let s = stats(vec![]);
        let report = export_charts(&s, &nested, &SvgPieRenderer::default()).unwrap();
        assert!(report.document_written);
        assert!(nested.join(COMBINED_DOCUMENT_NAME).exists());
    }
}
