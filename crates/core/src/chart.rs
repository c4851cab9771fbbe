//! Declarative chart configuration and the renderer seam
//!
//! Charts are described as JSON option trees and handed to a
//! [`ChartRenderer`]. The renderer is the external charting engine; this
//! crate only builds its input and tracks the handles it returns.

use crate::page::RowId;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Chart options in the charting library's JSON shape
pub type ChartOptions = Value;

/// Handle to a chart owned by a renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ChartHandle(pub u64);

/// Page element a chart can be drawn into without an id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "element", rename_all = "kebab-case")]
pub enum ElementRef {
    /// Sparkline placeholder of a row
    Sparkline { row: RowId },
}

/// Where a chart is drawn
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderTarget {
    Element(ElementRef),
    Id(String),
}

/// The external charting engine
pub trait ChartRenderer {
    /// Draw a chart and return its handle
    fn render(&mut self, target: RenderTarget, options: ChartOptions) -> ChartHandle;

    /// Tear down a chart; unknown handles are ignored
    fn destroy(&mut self, handle: ChartHandle);
}

/// A chart kept by [`RecordingRenderer`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedChart {
    pub target: RenderTarget,
    pub options: ChartOptions,
}

/// Renderer that keeps every live chart's configuration in memory.
///
/// Used by the CLI to embed configurations in its HTML output, and by tests.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    next: u64,
    charts: BTreeMap<ChartHandle, RenderedChart>,
    destroyed: usize,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: ChartHandle) -> Option<&RenderedChart> {
        self.charts.get(&handle)
    }

    /// Live charts in creation order
    pub fn charts(&self) -> impl Iterator<Item = (ChartHandle, &RenderedChart)> {
        self.charts.iter().map(|(h, c)| (*h, c))
    }

    pub fn live(&self) -> usize {
        self.charts.len()
    }

    /// Charts rendered so far, live or destroyed
    pub fn rendered(&self) -> u64 {
        self.next
    }

    pub fn destroyed(&self) -> usize {
        self.destroyed
    }
}

impl ChartRenderer for RecordingRenderer {
    fn render(&mut self, target: RenderTarget, options: ChartOptions) -> ChartHandle {
        self.next += 1;
        let handle = ChartHandle(self.next);
        self.charts.insert(handle, RenderedChart { target, options });
        handle
    }

    fn destroy(&mut self, handle: ChartHandle) {
        if self.charts.remove(&handle).is_some() {
            self.destroyed += 1;
        }
    }
}

/// Deep-merge `overrides` into `base`.
///
/// Objects merge key by key; any other value in `overrides` replaces the one
/// in `base`.
pub fn merge(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overrides) => *base = overrides,
    }
}

/// Fixed defaults of a sparkline: a small, bare area chart
pub fn sparkline_defaults() -> ChartOptions {
    json!({
        "chart": {
            "backgroundColor": null,
            "borderWidth": 0,
            "type": "area",
            "margin": [2, 0, 2, 0],
            "height": 20,
            "style": { "overflow": "visible" },
            "skipClone": true
        },
        "exporting": { "enabled": false },
        "title": { "text": "" },
        "credits": { "enabled": false },
        "xAxis": {
            "labels": { "enabled": false },
            "title": { "text": null },
            "startOnTick": false,
            "endOnTick": false,
            "tickPositions": []
        },
        "yAxis": {
            "endOnTick": false,
            "startOnTick": false,
            "labels": { "enabled": false },
            "title": { "text": null },
            "tickPositions": [0]
        },
        "legend": { "enabled": false },
        "tooltip": { "enabled": false },
        "plotOptions": {
            "series": {
                "animation": false,
                "lineWidth": 1,
                "shadow": false,
                "states": { "hover": { "enabled": false } },
                "marker": { "enabled": false },
                "fillOpacity": 0.25
            },
            "column": {
                "negativeColor": "#910000",
                "borderColor": "silver"
            }
        }
    })
}

/// Sparkline defaults merged with caller options; the caller wins
pub fn build_config(options: ChartOptions) -> ChartOptions {
    let mut config = sparkline_defaults();
    merge(&mut config, options);
    config
}

/// Draw a sparkline into a page element
pub fn render_into_element<R: ChartRenderer + ?Sized>(
    renderer: &mut R,
    element: ElementRef,
    options: ChartOptions,
) -> ChartHandle {
    let config = build_config(options);
    debug!(?element, "Rendering sparkline into element");
    renderer.render(RenderTarget::Element(element), config)
}

/// Draw a sparkline into the element with `id`.
///
/// A `chart.renderTo` in the options takes precedence over `id`.
pub fn render_into_id<R: ChartRenderer + ?Sized>(
    renderer: &mut R,
    id: &str,
    options: ChartOptions,
) -> ChartHandle {
    let mut config = build_config(json!({ "chart": { "renderTo": id } }));
    merge(&mut config, options);

    let target = config
        .pointer("/chart/renderTo")
        .and_then(Value::as_str)
        .unwrap_or(id)
        .to_string();
    debug!(%target, "Rendering sparkline into id");
    renderer.render(RenderTarget::Id(target), config)
}

/// One line of a comparison chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    /// Non-finite values serialize as `null`
    pub data: Vec<f64>,
}

/// Options of a comparison chart
pub fn comparison_options(
    categories: &[String],
    series: &[Series],
    value_prefix: &str,
    axis_description: &str,
) -> ChartOptions {
    let mut options = Map::new();
    options.insert("title".to_string(), json!({ "text": "" }));
    options.insert("exporting".to_string(), json!({ "enabled": false }));
    options.insert("tooltip".to_string(), json!({ "valuePrefix": value_prefix }));
    options.insert(
        "xAxis".to_string(),
        json!({
            "categories": categories,
            "crosshair": true,
            "accessibility": { "description": axis_description }
        }),
    );
    options.insert("series".to_string(), json!(series));
    options.insert(
        "lang".to_string(),
        json!({ "decimalPoint": ".", "thousandsSep": "," }),
    );
    Value::Object(options)
}
