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

use super::{SoftwareGuardian, SoftwareOutput, INTERFACE_NAME};
use ordo_core::renderer::{
    BufferCreationFlags, FrameBufferProperties, GraphicsOutput, GraphicsPipe,
    GraphicsStateGuardian, OutputKind, OutputRequest, OutputTypes, PipeError,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The software graphics pipe.
///
/// It can always be created. Guardians it makes are tracked so that
/// [`GraphicsPipe::close_gsg`] can release them.
#[derive(Debug)]
pub struct SoftwarePipe {
    display_size: (u32, u32),
    multisample: bool,
    supported: OutputTypes,
    guardians: Mutex<Vec<Arc<SoftwareGuardian>>>,
}

impl SoftwarePipe {
    /// Creates a pipe with a 1920x1080 display that supports every output
    /// type and multisampling.
    pub fn new() -> Self {
        Self {
            display_size: (1920, 1080),
            multisample: true,
            supported: OutputTypes::all(),
            guardians: Mutex::new(Vec::new()),
        }
    }

    /// Restricts the output types the pipe can create.
    pub fn with_supported_types(mut self, types: OutputTypes) -> Self {
        self.supported = types;
        self
    }

    /// Sets whether the pipe can multisample.
    pub fn with_multisample(mut self, multisample: bool) -> Self {
        self.multisample = multisample;
        self
    }

    fn guardians(&self) -> MutexGuard<'_, Vec<Arc<SoftwareGuardian>>> {
        self.guardians.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn owns(&self, gsg: &Arc<dyn GraphicsStateGuardian>) -> bool {
        self.find(gsg).is_some()
    }

    fn find(&self, gsg: &Arc<dyn GraphicsStateGuardian>) -> Option<Arc<SoftwareGuardian>> {
        let wanted = Arc::as_ptr(gsg) as *const ();
        self.guardians()
            .iter()
            .find(|own| Arc::as_ptr(own) as *const () == wanted)
            .cloned()
    }

    /// Creates a guardian and keeps its concrete handle, for inspecting the
    /// draw log.
    pub fn make_software_gsg(&self, properties: &FrameBufferProperties) -> Arc<SoftwareGuardian> {
        let gsg = Arc::new(SoftwareGuardian::new(*properties, self.multisample));
        log::info!(
            "Created software guardian (multisample: {})",
            gsg.supports_multisample()
        );
        self.guardians().push(Arc::clone(&gsg));
        gsg
    }

    fn choose_kind(&self, flags: BufferCreationFlags) -> Result<OutputKind, PipeError> {
        let acceptable = flags.acceptable_types() & self.supported;
        if acceptable.intersects(OutputTypes::WINDOW | OutputTypes::FULLSCREEN_WINDOW) {
            Ok(OutputKind::Window)
        } else if acceptable.intersects(OutputTypes::BUFFER | OutputTypes::TEXTURE_BUFFER) {
            Ok(OutputKind::Buffer)
        } else {
            Err(PipeError::UnsupportedOutput {
                requested: flags.acceptable_types(),
                supported: self.supported,
            })
        }
    }
}

impl Default for SoftwarePipe {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsPipe for SoftwarePipe {
    fn interface_name(&self) -> &str {
        INTERFACE_NAME
    }

    fn is_valid(&self) -> bool {
        true
    }

    fn supported_types(&self) -> OutputTypes {
        self.supported
    }

    fn display_size(&self) -> (u32, u32) {
        self.display_size
    }

    fn make_gsg(
        &self,
        properties: &FrameBufferProperties,
        share_with: Option<&Arc<dyn GraphicsStateGuardian>>,
    ) -> Result<Arc<dyn GraphicsStateGuardian>, PipeError> {
        if let Some(share) = share_with {
            if !share.is_valid() || !self.owns(share) {
                return Err(PipeError::IncompatibleGuardian);
            }
        }
        let gsg: Arc<dyn GraphicsStateGuardian> = self.make_software_gsg(properties);
        Ok(gsg)
    }

    fn close_gsg(&self, gsg: &Arc<dyn GraphicsStateGuardian>) {
        let Some(own) = self.find(gsg) else {
            log::warn!("close_gsg called with a guardian from another pipe");
            return;
        };
        own.invalidate();
        self.guardians().retain(|other| !Arc::ptr_eq(other, &own));
        log::info!("Closed software guardian");
    }

    fn make_output(
        &self,
        request: &OutputRequest,
        gsg: Option<Arc<dyn GraphicsStateGuardian>>,
    ) -> Result<Box<dyn GraphicsOutput>, PipeError> {
        let kind = self.choose_kind(request.flags)?;
        let gsg = match gsg {
            Some(gsg) if gsg.is_valid() => gsg,
            Some(_) => return Err(PipeError::IncompatibleGuardian),
            None if request.flags.contains(BufferCreationFlags::NO_NEW_GSG) => {
                return Err(PipeError::GuardianRequired)
            }
            None => self.make_gsg(&request.properties, None)?,
        };
        log::info!(
            "Created software {kind:?} '{}' ({}x{})",
            request.name,
            request.width,
            request.height
        );
        Ok(Box::new(SoftwareOutput::new(
            request.name.clone(),
            (request.width, request.height),
            kind,
            gsg,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordo_core::renderer::{FrameContext, FrameMode};

    #[test]
    fn test_pipe_reports_interface() {
        let pipe = SoftwarePipe::new();
        assert_eq!(pipe.interface_name(), "Software");
        assert!(pipe.supports_type(OutputTypes::WINDOW | OutputTypes::BUFFER));
    }

    #[test]
    fn test_refuse_window_yields_buffer() {
        let pipe = SoftwarePipe::new();
        let request = OutputRequest::new("offscreen", 64, 64)
            .with_flags(BufferCreationFlags::REFUSE_WINDOW);
        let output = pipe.make_output(&request, None).unwrap();
        assert_eq!(output.kind(), OutputKind::Buffer);
        assert_eq!(output.size(), (64, 64));
    }

    #[test]
    fn test_require_window_on_buffer_only_pipe_fails() {
        let pipe = SoftwarePipe::new().with_supported_types(OutputTypes::BUFFER);
        let request = OutputRequest::new("main", 640, 480)
            .with_flags(BufferCreationFlags::REQUIRE_WINDOW);
        assert!(matches!(
            pipe.make_output(&request, None),
            Err(PipeError::UnsupportedOutput { .. })
        ));
    }

    #[test]
    fn test_no_new_gsg_requires_guardian() {
        let pipe = SoftwarePipe::new();
        let request =
            OutputRequest::new("main", 640, 480).with_flags(BufferCreationFlags::NO_NEW_GSG);
        assert_eq!(
            pipe.make_output(&request, None).unwrap_err(),
            PipeError::GuardianRequired
        );
        let gsg = pipe.make_gsg(&FrameBufferProperties::default(), None).unwrap();
        let output = pipe.make_output(&request, Some(Arc::clone(&gsg))).unwrap();
        assert!(Arc::ptr_eq(output.gsg(), &gsg));
    }

    #[test]
    fn test_multisample_follows_pipe_capability() {
        let props = FrameBufferProperties::default().with_multisamples(4);
        let capable = SoftwarePipe::new().make_gsg(&props, None).unwrap();
        let incapable = SoftwarePipe::new()
            .with_multisample(false)
            .make_gsg(&props, None)
            .unwrap();
        assert!(capable.supports_multisample());
        assert!(!incapable.supports_multisample());
    }

    #[test]
    fn test_sharing_requires_own_valid_guardian() {
        let pipe = SoftwarePipe::new();
        let other = SoftwarePipe::new();
        let props = FrameBufferProperties::default();
        let foreign = other.make_gsg(&props, None).unwrap();
        assert_eq!(
            pipe.make_gsg(&props, Some(&foreign)).unwrap_err(),
            PipeError::IncompatibleGuardian
        );
        let own = pipe.make_gsg(&props, Some(&pipe.make_gsg(&props, None).unwrap()));
        assert!(own.is_ok());
    }

    #[test]
    fn test_close_gsg_invalidates_outputs() {
        let pipe = SoftwarePipe::new();
        let mut output = pipe
            .make_output(&OutputRequest::new("main", 320, 240), None)
            .unwrap();
        let frame = FrameContext::new(0);
        assert!(output.begin_frame(FrameMode::Render, &frame));
        output.end_frame(FrameMode::Render, &frame);

        pipe.close_gsg(output.gsg());
        assert!(!output.is_valid());
        assert!(!output.begin_frame(FrameMode::Render, &frame));
    }
}
