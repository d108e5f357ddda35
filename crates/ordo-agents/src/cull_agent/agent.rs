// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Defines the CullAgent, which runs build, finish_cull, draw and make_next
//! for every frame.

use super::FrameStats;
use ordo_core::cull::CullConfig;
use ordo_core::renderer::{
    FrameContext, FrameMode, GraphicsOutput, RenderError, SceneSetup, ThreadRole,
};
use ordo_core::telemetry::MetricId;
use ordo_core::{FrameClock, Stopwatch};
use ordo_lanes::{CullBinManager, CullResult, CullableObject};
use ordo_telemetry::{CounterHandle, CullCollectors, GaugeHandle};
use std::sync::Arc;

#[derive(Debug)]
struct FrameMetrics {
    frames: CounterHandle,
    binned: GaugeHandle,
}

impl FrameMetrics {
    fn register(collectors: &CullCollectors) -> Option<Self> {
        let registry = collectors.registry();
        let frames = registry.register_counter(MetricId::new("frame", "frames_drawn"), "Frames drawn");
        let binned = registry.register_gauge(
            MetricId::new("frame", "objects_binned"),
            "Objects binned in the last frame",
            "objects",
        );
        match (frames, binned) {
            (Ok(frames), Ok(binned)) => Some(Self { frames, binned }),
            (Err(e), _) | (_, Err(e)) => {
                log::warn!("Frame metrics unavailable: {e}");
                None
            }
        }
    }

    fn record(&self, stats: &FrameStats) {
        if stats.drawn {
            if let Err(e) = self.frames.increment() {
                log::warn!("Failed to count frame {}: {e}", stats.frame_number);
            }
        }
        if let Err(e) = self.binned.set(stats.binned as f64) {
            log::warn!("Failed to record binned objects: {e}");
        }
    }
}

/// Drives one output through the cull pipeline, frame after frame.
#[derive(Debug)]
pub struct CullAgent {
    output: Box<dyn GraphicsOutput>,
    result: CullResult,
    scene: SceneSetup,
    frame_count: u64,
    last_stats: FrameStats,
    metrics: Option<FrameMetrics>,
}

impl CullAgent {
    /// Creates an agent drawing into `output` with the bins of `manager`.
    pub fn new(
        output: Box<dyn GraphicsOutput>,
        manager: Arc<CullBinManager>,
        config: Arc<CullConfig>,
        clock: Arc<dyn FrameClock>,
        collectors: CullCollectors,
    ) -> Self {
        let metrics = FrameMetrics::register(&collectors);
        let result = CullResult::new(
            Arc::clone(output.gsg()),
            manager,
            config,
            clock,
            collectors,
        );
        log::info!("CullAgent drawing into '{}'", output.name());
        Self {
            output,
            result,
            scene: SceneSetup::default(),
            frame_count: 0,
            last_stats: FrameStats::default(),
            metrics,
        }
    }

    /// Sets the camera used for depth sorting.
    pub fn set_scene(&mut self, scene: SceneSetup) {
        self.scene = scene;
    }

    /// The camera used for depth sorting.
    pub fn scene(&self) -> &SceneSetup {
        &self.scene
    }

    /// The output frames are drawn into.
    pub fn output(&self) -> &dyn GraphicsOutput {
        self.output.as_ref()
    }

    /// The result that will collect the next frame's objects.
    pub fn result(&self) -> &CullResult {
        &self.result
    }

    /// The number of frames run so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Statistics of the last frame.
    pub fn last_stats(&self) -> &FrameStats {
        &self.last_stats
    }

    /// Runs one frame over `objects`.
    ///
    /// When the output cannot begin the frame the binned objects are
    /// discarded and the frame is reported as not drawn.
    ///
    /// # Errors
    ///
    /// Returns the first backend error raised while drawing. The frame is
    /// still closed and the next frame starts from a fresh result.
    pub fn render_frame<I>(&mut self, objects: I) -> Result<FrameStats, RenderError>
    where
        I: IntoIterator<Item = CullableObject>,
    {
        let frame = FrameContext::new(self.frame_count);
        let mut stats = FrameStats {
            frame_number: self.frame_count,
            ..FrameStats::default()
        };

        let cull_frame = frame.on(ThreadRole::Cull);
        let cull_timer = Stopwatch::new();
        for object in objects {
            stats.submitted += 1;
            stats.admitted += self.result.add_object(object, &cull_frame).len();
        }
        self.result.finish_cull(&self.scene, &cull_frame);
        stats.binned = self.result.num_objects();
        stats.cull_time = cull_timer.elapsed().unwrap_or_default();
        log::debug!(
            "Frame {}: culled {} objects into {} bin entries",
            stats.frame_number,
            stats.submitted,
            stats.binned
        );

        let draw_frame = frame.on(ThreadRole::Draw);
        let draw_timer = Stopwatch::new();
        let drawn = self.draw(&draw_frame);
        stats.draw_time = draw_timer.elapsed().unwrap_or_default();

        self.result = self.result.make_next();
        self.frame_count += 1;

        stats.drawn = drawn?;
        if let Some(metrics) = &self.metrics {
            metrics.record(&stats);
        }
        self.last_stats = stats;
        Ok(stats)
    }

    fn draw(&mut self, frame: &FrameContext) -> Result<bool, RenderError> {
        if !self.output.begin_frame(FrameMode::Render, frame) {
            log::warn!(
                "Output '{}' could not begin frame {}",
                self.output.name(),
                frame.frame_number
            );
            return Ok(false);
        }
        let gsg = Arc::clone(self.output.gsg());
        let result = if gsg.begin_scene() {
            let result = self.result.draw(frame);
            gsg.end_scene();
            result
        } else {
            log::warn!("Guardian refused to begin the scene");
            Ok(())
        };
        self.output.end_frame(FrameMode::Render, frame);
        result.map(|()| true)
    }
}
