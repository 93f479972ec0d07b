//! Command-batch execution engine.
//!
//! Walks one frame's `DisplayCommand` batch in order, applies every set
//! property to the device, runs the validate/accept/present lifecycle,
//! and accumulates per-command results. Processing is best-effort: a
//! failing setter records an error against its command index and never
//! blocks later commands.
//!
//! The engine is single-threaded by construction — `execute` takes
//! `&mut self` and runs a batch to completion before returning.

use anyhow::{Context, Result};

use crate::core::command::{
    BufferDescriptor, ClientTarget, ClockMonotonicTimestamp, ColorTransform, DisplayCommand,
    DisplayId, LayerCommand, LayerId, RawBufferHandle,
};
use crate::core::errors::HwcError;
use crate::core::writer::{CommandResultPayload, PresentOrValidateResult, ResultWriter};
use crate::hal::ComposerHal;
use crate::resources::ComposerResources;

/// Executes command batches against a composition device.
///
/// The engine borrows the device mutably and the resources subsystem
/// immutably for its lifetime; it owns nothing but the result writer
/// and the per-batch command index.
pub struct CommandEngine<'e> {
    hal: &'e mut dyn ComposerHal,
    resources: &'e dyn ComposerResources,
    writer: ResultWriter,
    /// Index of the `DisplayCommand` currently being dispatched; errors
    /// recorded while it runs are tagged with this value.
    command_index: u32,
}

impl<'e> CommandEngine<'e> {
    pub fn new(
        hal: &'e mut dyn ComposerHal,
        resources: &'e dyn ComposerResources,
    ) -> Result<Self> {
        let writer = ResultWriter::new().context("failed to construct result writer")?;
        Ok(Self {
            hal,
            resources,
            writer,
            command_index: 0,
        })
    }

    /// Execute one frame's command batch and return the drained results.
    ///
    /// Commands run in batch order: for each `DisplayCommand`, its layer
    /// commands first (listed order), then the display-level properties
    /// and lifecycle triggers in fixed order. Error payloads carry the
    /// index of the display command they occurred in.
    pub fn execute(&mut self, commands: &[DisplayCommand]) -> Vec<CommandResultPayload> {
        self.command_index = 0;
        for command in commands {
            self.dispatch_display_command(command);
            self.command_index += 1;
        }
        self.writer.take_results()
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    fn dispatch_display_command(&mut self, command: &DisplayCommand) {
        let display = command.display;

        for layer_command in &command.layers {
            self.dispatch_layer_command(display, layer_command);
        }

        if let Some(matrix) = &command.color_transform_matrix {
            self.set_color_transform(display, matrix);
        }
        if let Some(target) = &command.client_target {
            self.set_client_target(display, target);
        }
        if let Some(buffer) = &command.virtual_display_output_buffer {
            self.set_output_buffer(display, buffer);
        }
        if let Some(brightness) = command.brightness {
            self.set_display_brightness(display, brightness.brightness);
        }
        if command.validate_display {
            self.validate_display(display, command.expected_present_time);
        }
        if command.accept_display_changes {
            self.accept_display_changes(display);
        }
        if command.present_display {
            // A failed direct present records nothing; the client learns
            // about it from the missing fences.
            let _ = self.present_display(display);
        }
        if command.present_or_validate_display {
            self.present_or_validate_display(display, command.expected_present_time);
        }
    }

    fn dispatch_layer_command(&mut self, display: DisplayId, command: &LayerCommand) {
        let layer = command.layer;

        if let Some(position) = command.cursor_position {
            if let Err(err) = self.hal.set_layer_cursor_position(display, layer, position) {
                self.record_error("set_layer_cursor_position", err);
            }
        }
        if let Some(buffer) = &command.buffer {
            self.set_layer_buffer(display, layer, buffer);
        }
        if let Some(damage) = &command.damage {
            if let Err(err) = self.hal.set_layer_surface_damage(display, layer, damage) {
                self.record_error("set_layer_surface_damage", err);
            }
        }
        if let Some(blend_mode) = command.blend_mode {
            if let Err(err) = self.hal.set_layer_blend_mode(display, layer, blend_mode) {
                self.record_error("set_layer_blend_mode", err);
            }
        }
        if let Some(color) = command.color {
            if let Err(err) = self.hal.set_layer_color(display, layer, color) {
                self.record_error("set_layer_color", err);
            }
        }
        if let Some(composition) = command.composition {
            if let Err(err) = self.hal.set_layer_composition_type(display, layer, composition) {
                self.record_error("set_layer_composition_type", err);
            }
        }
        if let Some(dataspace) = command.dataspace {
            if let Err(err) = self.hal.set_layer_dataspace(display, layer, dataspace) {
                self.record_error("set_layer_dataspace", err);
            }
        }
        if let Some(frame) = command.display_frame {
            if let Err(err) = self.hal.set_layer_display_frame(display, layer, frame) {
                self.record_error("set_layer_display_frame", err);
            }
        }
        if let Some(alpha) = command.plane_alpha {
            if let Err(err) = self.hal.set_layer_plane_alpha(display, layer, alpha) {
                self.record_error("set_layer_plane_alpha", err);
            }
        }
        if let Some(stream) = &command.sideband_stream {
            self.set_layer_sideband_stream(display, layer, stream);
        }
        if let Some(crop) = command.source_crop {
            if let Err(err) = self.hal.set_layer_source_crop(display, layer, crop) {
                self.record_error("set_layer_source_crop", err);
            }
        }
        if let Some(transform) = command.transform {
            if let Err(err) = self.hal.set_layer_transform(display, layer, transform) {
                self.record_error("set_layer_transform", err);
            }
        }
        if let Some(visible_region) = &command.visible_region {
            if let Err(err) = self.hal.set_layer_visible_region(display, layer, visible_region) {
                self.record_error("set_layer_visible_region", err);
            }
        }
        if let Some(z) = command.z_order {
            if let Err(err) = self.hal.set_layer_z_order(display, layer, z) {
                self.record_error("set_layer_z_order", err);
            }
        }
        if let Some(matrix) = &command.color_transform {
            if let Err(err) = self.hal.set_layer_color_transform(display, layer, matrix) {
                self.record_error("set_layer_color_transform", err);
            }
        }
        if let Some(metadata) = &command.per_frame_metadata {
            if let Err(err) = self.hal.set_layer_per_frame_metadata(display, layer, metadata) {
                self.record_error("set_layer_per_frame_metadata", err);
            }
        }
        if let Some(blobs) = &command.per_frame_metadata_blobs {
            if let Err(err) = self.hal.set_layer_per_frame_metadata_blobs(display, layer, blobs) {
                self.record_error("set_layer_per_frame_metadata_blobs", err);
            }
        }
    }

    /// Record a failed call against the command being dispatched
    fn record_error(&mut self, op: &'static str, err: HwcError) {
        tracing::error!("{}: err {} ({})", op, err.code(), err);
        self.writer.set_error(self.command_index, err);
    }

    // =========================================================================
    // Display properties
    // =========================================================================

    fn set_color_transform(&mut self, display: DisplayId, matrix: &ColorTransform) {
        if let Err(err) = self.hal.set_color_transform(display, matrix) {
            self.record_error("set_color_transform", err);
        }
    }

    fn set_client_target(&mut self, display: DisplayId, target: &ClientTarget) {
        let buffer = &target.buffer;
        let resolved = self.resources.get_display_client_target(
            display,
            buffer.slot,
            buffer.handle.is_none(),
            buffer.handle.as_ref(),
        );
        match resolved {
            Ok(client_target) => {
                if let Err(err) = self.hal.set_client_target(
                    display,
                    client_target.handle(),
                    buffer.fence,
                    target.dataspace,
                    &target.damage,
                ) {
                    self.record_error("set_client_target", err);
                }
            }
            Err(err) => self.record_error("get_display_client_target", err),
        }
    }

    fn set_output_buffer(&mut self, display: DisplayId, buffer: &BufferDescriptor) {
        let resolved = self.resources.get_display_output_buffer(
            display,
            buffer.slot,
            buffer.handle.is_none(),
            buffer.handle.as_ref(),
        );
        match resolved {
            Ok(output_buffer) => {
                if let Err(err) =
                    self.hal
                        .set_output_buffer(display, output_buffer.handle(), buffer.fence)
                {
                    self.record_error("set_output_buffer", err);
                }
            }
            Err(err) => self.record_error("get_display_output_buffer", err),
        }
    }

    fn set_display_brightness(&mut self, display: DisplayId, brightness: f32) {
        if let Err(err) = self.hal.set_display_brightness(display, brightness) {
            self.record_error("set_display_brightness", err);
        }
    }

    // =========================================================================
    // Buffer-bearing layer properties
    // =========================================================================

    fn set_layer_buffer(&mut self, display: DisplayId, layer: LayerId, buffer: &BufferDescriptor) {
        let resolved = self.resources.get_layer_buffer(
            display,
            layer,
            buffer.slot,
            buffer.handle.is_none(),
            buffer.handle.as_ref(),
        );
        match resolved {
            Ok(layer_buffer) => {
                if let Err(err) =
                    self.hal
                        .set_layer_buffer(display, layer, layer_buffer.handle(), buffer.fence)
                {
                    self.record_error("set_layer_buffer", err);
                }
            }
            Err(err) => self.record_error("get_layer_buffer", err),
        }
    }

    fn set_layer_sideband_stream(
        &mut self,
        display: DisplayId,
        layer: LayerId,
        stream: &RawBufferHandle,
    ) {
        // Sideband streams are never slot-cached; resolution always
        // imports the supplied handle.
        match self.resources.get_layer_sideband_stream(display, layer, stream) {
            Ok(stream) => {
                if let Err(err) =
                    self.hal
                        .set_layer_sideband_stream(display, layer, stream.handle())
                {
                    self.record_error("set_layer_sideband_stream", err);
                }
            }
            Err(err) => self.record_error("get_layer_sideband_stream", err),
        }
    }

    // =========================================================================
    // Frame lifecycle
    // =========================================================================

    fn set_expected_present_time(
        &mut self,
        display: DisplayId,
        expected_present_time: Option<ClockMonotonicTimestamp>,
    ) {
        self.hal.set_expected_present_time(display, expected_present_time);
    }

    fn validate_display(
        &mut self,
        display: DisplayId,
        expected_present_time: Option<ClockMonotonicTimestamp>,
    ) {
        self.set_expected_present_time(display, expected_present_time);
        let _ = self.validate_display_internal(display);
    }

    /// Run the device validate primitive and record its result lists.
    ///
    /// `Ok(true)` means the device adjusted composition types and the
    /// client must accept them before presenting. A hard error records
    /// a command error and writes no lists; must-validate stays set.
    fn validate_display_internal(&mut self, display: DisplayId) -> Result<bool, HwcError> {
        match self.hal.validate_display(display) {
            Ok(validation) => {
                self.resources.set_display_must_validate_state(display, false);
                self.writer.set_changed_composition_types(
                    display,
                    validation.changed_layers,
                    validation.composition_types,
                );
                self.writer.set_display_requests(
                    display,
                    validation.display_request_mask,
                    validation.requested_layers,
                    validation.request_masks,
                );
                Ok(validation.has_changes)
            }
            Err(err) => {
                self.record_error("validate_display", err);
                Err(err)
            }
        }
    }

    fn accept_display_changes(&mut self, display: DisplayId) {
        if let Err(err) = self.hal.accept_display_changes(display) {
            self.record_error("accept_display_changes", err);
        }
    }

    /// Present and record the resulting fences.
    ///
    /// A present fence is only written when valid; an empty release-fence
    /// list is not written at all. Failures are returned to the caller,
    /// which decides whether they steer the lifecycle — a failed direct
    /// present is not a command error.
    fn present_display(&mut self, display: DisplayId) -> Result<(), HwcError> {
        let presentation = self.hal.present_display(display)?;
        if presentation.present_fence.is_valid() {
            self.writer.set_present_fence(display, presentation.present_fence);
        }
        if !presentation.release_fences.is_empty() {
            self.writer.set_release_fences(display, presentation.release_fences);
        }
        Ok(())
    }

    /// Latency-optimized present: try to present as is, fall back to a
    /// full validate, and when nothing requires a client round trip,
    /// accept the empty change set and present immediately.
    fn present_or_validate_display(
        &mut self,
        display: DisplayId,
        expected_present_time: Option<ClockMonotonicTimestamp>,
    ) {
        self.set_expected_present_time(display, expected_present_time);

        // First try to present as is. A pending must-validate means the
        // device would reject it, so skip the call outright.
        let present_result = if self.resources.must_validate_display(display) {
            Err(HwcError::NotValidated)
        } else {
            self.present_display(display)
        };
        if present_result.is_ok() {
            self.writer
                .set_present_or_validate_result(display, PresentOrValidateResult::Presented);
            return;
        }

        // Fall back to validate. A hard validate error has already been
        // recorded; no outcome is written for this trigger.
        let has_changes = match self.validate_display_internal(display) {
            Ok(has_changes) => has_changes,
            Err(_) => return,
        };

        // Composition-type changes or client-side compositing force the
        // two-round-trip path: the client must accept and re-present.
        let has_client_composition = self.hal.has_client_composition(display).unwrap_or(false);
        if has_changes || has_client_composition {
            self.writer
                .set_present_or_validate_result(display, PresentOrValidateResult::Validated);
            return;
        }

        // Nothing for the client to do: accept the empty change set and
        // present in the same round trip. A failed retry writes neither
        // an error nor an outcome, matching the legacy engine.
        self.accept_display_changes(display);
        if self.present_display(display).is_ok() {
            self.writer
                .set_present_or_validate_result(display, PresentOrValidateResult::Presented);
        }
    }
}
