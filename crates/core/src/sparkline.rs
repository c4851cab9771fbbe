//! Sparkline renderer
//!
//! Drawing hundreds of charts at once stalls the page, so placeholders are
//! drained in bounded batches, one batch per timer tick. The loop finishes
//! once a tick draws fewer placeholders than the batch size.

use crate::chart::{render_into_element, ChartHandle, ChartRenderer, ElementRef};
use crate::markers;
use crate::page::{Page, RowId};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// State of the batch loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Finished,
}

/// Outcome of one timer tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub processed: usize,
    pub finished: bool,
}

#[derive(Debug)]
pub struct SparklineRenderer {
    batch_size: usize,
    state: LoopState,
    ticks: usize,
    charts: BTreeMap<RowId, ChartHandle>,
}

impl SparklineRenderer {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            state: LoopState::Idle,
            ticks: 0,
            charts: BTreeMap::new(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Ticks that have run so far
    pub fn ticks(&self) -> usize {
        self.ticks
    }

    pub fn chart(&self, row: RowId) -> Option<ChartHandle> {
        self.charts.get(&row).copied()
    }

    /// Start the loop; a running or finished loop is left alone
    pub fn start(&mut self) {
        if self.state == LoopState::Idle {
            self.state = LoopState::Running;
        }
    }

    /// Rows whose sparkline has not been drawn, in document order
    pub fn pending(page: &Page) -> Vec<RowId> {
        page.tables
            .iter()
            .flat_map(|t| t.body.iter())
            .filter(|r| r.sparkline().is_some_and(|s| !s.is_rendered()))
            .map(|r| r.id)
            .collect()
    }

    /// Draw up to `limit` pending sparklines, returning how many were drawn
    pub fn draw_batch<R: ChartRenderer + ?Sized>(
        &mut self,
        page: &mut Page,
        renderer: &mut R,
        limit: usize,
    ) -> usize {
        let batch: Vec<RowId> = Self::pending(page).into_iter().take(limit).collect();

        for &id in &batch {
            let Some(row) = page.row_mut(id) else {
                continue;
            };
            let data = row.series();
            if data.iter().any(|v| v.is_nan()) {
                warn!(row = %id, "Sparkline series contains unparsable values");
            }

            if let Some(spark) = row.sparkline_mut() {
                spark.loaders = 0;
                spark.classes.add(markers::SPARKLINE_DONE);
                spark.classes.remove(markers::SPARKLINE_LOADING);
            }

            let handle = render_into_element(
                renderer,
                ElementRef::Sparkline { row: id },
                json!({
                    "series": [{ "data": data, "pointStart": 1 }],
                    "chart": {}
                }),
            );
            self.charts.insert(id, handle);
        }

        batch.len()
    }

    /// Run one timer tick of the loop
    pub fn tick<R: ChartRenderer + ?Sized>(&mut self, page: &mut Page, renderer: &mut R) -> Tick {
        if self.state != LoopState::Running {
            return Tick {
                processed: 0,
                finished: true,
            };
        }

        let processed = self.draw_batch(page, renderer, self.batch_size);
        self.ticks += 1;
        debug!(tick = self.ticks, processed, "Sparkline tick");

        let finished = processed < self.batch_size;
        if finished {
            self.state = LoopState::Finished;
            info!(ticks = self.ticks, drawn = self.charts.len(), "Sparklines complete");
        }

        Tick {
            processed,
            finished,
        }
    }

    /// Start the loop and tick it until it finishes, without any delay.
    /// Returns the number of ticks run.
    pub fn run_to_completion<R: ChartRenderer + ?Sized>(
        &mut self,
        page: &mut Page,
        renderer: &mut R,
    ) -> usize {
        self.start();
        let before = self.ticks;
        while !self.tick(page, renderer).finished {}
        self.ticks - before
    }
}
