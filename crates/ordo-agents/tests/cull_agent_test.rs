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

use anyhow::Result;
use ordo_agents::CullAgent;
use ordo_core::cull::CullConfig;
use ordo_core::geom::{Geom, GeomId, VertexFormat};
use ordo_core::math::{Mat4, Vec3};
use ordo_core::renderer::{FrameBufferProperties, GraphicsPipe, OutputRequest};
use ordo_core::state::{RenderAttrib, RenderState, TransparencyMode};
use ordo_core::ManualClock;
use ordo_infra::graphics::DrawCommand;
use ordo_infra::{SoftwareGuardian, SoftwarePipe};
use ordo_lanes::{CullBinManager, CullableObject};
use ordo_telemetry::{CullCollectors, MetricsRegistry};
use std::sync::Arc;

fn agent(pipe: &SoftwarePipe) -> Result<(CullAgent, Arc<SoftwareGuardian>, Arc<CullBinManager>)> {
    let gsg = pipe.make_software_gsg(&FrameBufferProperties::default());
    let output = pipe.make_output(&OutputRequest::new("main", 640, 480), Some(gsg.clone()))?;
    let manager = Arc::new(CullBinManager::with_default_bins());
    let agent = CullAgent::new(
        output,
        Arc::clone(&manager),
        Arc::new(CullConfig::default()),
        Arc::new(ManualClock::new(0.5)),
        CullCollectors::new(Arc::new(MetricsRegistry::new()))?,
    );
    Ok((agent, gsg, manager))
}

fn scene() -> Vec<CullableObject> {
    let dual = RenderState::make([RenderAttrib::Transparency(TransparencyMode::Dual)]);
    (1..=3)
        .map(|id| {
            let state = if id == 2 { Arc::clone(&dual) } else { RenderState::empty() };
            CullableObject::new(
                Arc::new(Geom::new(GeomId(id), VertexFormat::POSITION, 3)),
                state,
                Mat4::from_translation(Vec3::new(0.0, 0.0, -(id as f32))),
            )
        })
        .collect()
}

#[test]
fn frame_runs_all_phases() -> Result<()> {
    let pipe = SoftwarePipe::new();
    let (mut agent, gsg, _) = agent(&pipe)?;
    let stats = agent.render_frame(scene())?;

    assert_eq!(stats.frame_number, 0);
    assert_eq!(stats.submitted, 3);
    assert_eq!(stats.admitted, 4);
    assert_eq!(stats.binned, 4);
    assert_eq!(stats.admission_delta(), 1);
    assert!(stats.drawn);
    assert_eq!(agent.frame_count(), 1);

    let log = gsg.draw_log();
    assert_eq!(log.first(), Some(&DrawCommand::BeginFrame(0)));
    assert_eq!(log.last(), Some(&DrawCommand::EndFrame(0)));
    assert_eq!(gsg.drawn_geoms().len(), 4);
    Ok(())
}

#[test]
fn successive_frames_start_empty() -> Result<()> {
    let pipe = SoftwarePipe::new();
    let (mut agent, gsg, _) = agent(&pipe)?;
    agent.render_frame(scene())?;
    assert_eq!(agent.result().num_objects(), 0);

    gsg.take_draw_log();
    let stats = agent.render_frame(Vec::new())?;
    assert_eq!(stats.binned, 0);
    assert_eq!(
        gsg.draw_log(),
        vec![DrawCommand::BeginFrame(1), DrawCommand::EndFrame(1)]
    );
    Ok(())
}

#[test]
fn closed_guardian_skips_drawing() -> Result<()> {
    let pipe = SoftwarePipe::new();
    let (mut agent, gsg, _) = agent(&pipe)?;
    pipe.close_gsg(agent.output().gsg());
    let stats = agent.render_frame(scene())?;
    assert!(!stats.drawn);
    assert!(gsg.draw_log().is_empty());
    Ok(())
}

#[test]
fn draw_errors_surface_and_the_next_frame_recovers() -> Result<()> {
    let pipe = SoftwarePipe::new();
    let (mut agent, gsg, _) = agent(&pipe)?;
    gsg.fail_on(Some(GeomId(1)));
    assert!(agent.render_frame(scene()).is_err());
    assert_eq!(gsg.draw_log().last(), Some(&DrawCommand::EndFrame(0)));

    gsg.fail_on(None);
    let stats = agent.render_frame(scene())?;
    assert!(stats.drawn);
    assert_eq!(stats.frame_number, 1);
    Ok(())
}

#[test]
fn removed_bins_stay_empty_across_frames() -> Result<()> {
    let pipe = SoftwarePipe::new();
    let (mut agent, gsg, manager) = agent(&pipe)?;
    agent.render_frame(scene())?;
    let transparent = manager.find_bin("transparent").expect("transparent bin");
    manager.remove_bin(transparent);

    gsg.take_draw_log();
    let stats = agent.render_frame(scene())?;
    assert!(agent.result().bin(transparent).is_none());
    // The implicit transparent bin comes back under a fresh index.
    let recreated = manager.find_bin("transparent").expect("recreated bin");
    assert_ne!(recreated, transparent);
    assert_eq!(stats.binned, 4);
    assert_eq!(gsg.drawn_geoms().len(), 4);
    Ok(())
}
