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

//! Drives a synthetic scene through the cull pipeline and prints what the
//! software backend drew.
//!
//! Usage: `sandbox [config.ron] [frames]`

use anyhow::{Context, Result};
use ordo_agents::CullAgent;
use ordo_core::geom::{Geom, GeomId, VertexFormat};
use ordo_core::math::{Mat4, Vec3};
use ordo_core::renderer::{FrameBufferProperties, OutputRequest, SceneSetup};
use ordo_core::state::{
    LightAttrib, LightId, RenderAttrib, RenderState, TextureAttrib, TextureId, TransparencyMode,
};
use ordo_core::telemetry::MetricValue;
use ordo_infra::{ConfigLoader, PipeSelection, SystemClock};
use ordo_lanes::{CullBinManager, CullableObject};
use ordo_telemetry::{CullCollectors, MetricsRegistry};
use std::sync::Arc;

const DEFAULT_CONFIG_PATH: &str = "ordo.ron";
const DEFAULT_FRAMES: u64 = 3;

/// A grid of objects cycling through every transparency mode.
fn build_scene(frame: u64) -> Vec<CullableObject> {
    let modes = [
        None,
        Some(TransparencyMode::Alpha),
        Some(TransparencyMode::Binary),
        Some(TransparencyMode::Multisample),
        Some(TransparencyMode::Dual),
    ];
    let lit = RenderState::make([
        RenderAttrib::Texture(TextureAttrib::new([TextureId(1)])),
        RenderAttrib::Light(LightAttrib::new([LightId(0)])),
    ]);
    let hud = RenderState::make([RenderAttrib::cull_bin("fixed", 1)]);

    let mut objects = Vec::new();
    for (i, mode) in modes.iter().enumerate() {
        for row in 0..2u64 {
            let id = i as u64 * 10 + row;
            let state = match mode {
                Some(mode) => lit.add_attrib(RenderAttrib::Transparency(*mode)),
                None => Arc::clone(&lit),
            };
            let geom = Geom::new(GeomId(id), VertexFormat::all(), 24);
            // Every third frame one object's data is still streaming in.
            if id == 11 && frame % 3 == 0 {
                geom.set_resident(false);
            }
            let offset = Vec3::new(i as f32 * 2.0, row as f32, -5.0 - row as f32 * 3.0);
            objects.push(
                CullableObject::new(Arc::new(geom), state, Mat4::from_translation(offset))
                    .with_decals(row == 1),
            );
        }
    }
    let overlay = Geom::new(GeomId(100), VertexFormat::POSITION, 6);
    objects.push(CullableObject::new(Arc::new(overlay), hud, Mat4::IDENTITY));
    objects
}

fn main() -> Result<()> {
    ordo_infra::logging::init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_owned());
    let frames = match args.next() {
        Some(n) => n.parse().context("frame count must be a number")?,
        None => DEFAULT_FRAMES,
    };

    let config = ConfigLoader::load_path_or_default(&config_path)?;
    let mut pipes = PipeSelection::default();
    pipes.apply_config(&config)?;
    let pipe = pipes.make_default_pipe()?;

    let properties = FrameBufferProperties::default().with_multisamples(config.multisamples);
    let gsg = pipe.make_gsg(&properties, None)?;
    log::info!(
        "Using {} ({}), multisample: {}",
        gsg.adapter_info().name,
        gsg.adapter_info().interface_name,
        gsg.supports_multisample()
    );
    let output = pipe.make_output(
        &OutputRequest::new("sandbox", 1280, 720).with_properties(properties),
        Some(gsg),
    )?;

    let registry = Arc::new(MetricsRegistry::new());
    let manager = Arc::new(CullBinManager::from_config(&config));
    let mut agent = CullAgent::new(
        output,
        Arc::clone(&manager),
        Arc::new(config),
        Arc::new(SystemClock::new()),
        CullCollectors::new(Arc::clone(&registry))?,
    );
    agent.set_scene(SceneSetup::new(Mat4::IDENTITY));

    for frame in 0..frames {
        let stats = agent.render_frame(build_scene(frame))?;
        log::info!(
            "frame {}: {} submitted, {} admitted, {} binned, cull {:?}, draw {:?}",
            stats.frame_number,
            stats.submitted,
            stats.admitted,
            stats.binned,
            stats.cull_time,
            stats.draw_time
        );
    }

    for namespace in ["cull", "draw", "frame"] {
        for metric in registry.get_namespace_metrics(namespace) {
            match metric.value {
                MetricValue::Counter(n) => log::info!("{} = {n}", metric.id),
                MetricValue::Gauge(v) => log::info!("{} = {v}", metric.id),
                MetricValue::Histogram { count, sum, .. } => {
                    log::info!("{} = {count} samples, {sum:.3} {}", metric.id, metric.unit)
                }
            }
        }
    }

    Ok(())
}
