//! Hardware composition device abstraction.
//!
//! One synchronous method per property or lifecycle operation. Device
//! generations differ in which capabilities they actually implement;
//! the engine depends only on this trait and treats `Unsupported` like
//! any other per-command error. Calls are assumed fast relative to a
//! frame budget — the engine applies no timeout.

use crate::core::command::{
    BlendMode, ClientTargetProperty, ClockMonotonicTimestamp, Color, ColorTransform, Composition,
    Dataspace, DisplayId, FRect, Fence, LayerId, NativeHandle, PerFrameMetadata,
    PerFrameMetadataBlob, Point, Rect, Transform,
};
use crate::core::errors::HalResult;

/// Outcome of a successful device validate call.
///
/// `changed_layers`/`composition_types` and `requested_layers`/
/// `request_masks` are parallel lists. `has_changes` carries the
/// "has changes" protocol condition: the composition types the client
/// asked for were adjusted and must be accepted before presenting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validation {
    pub has_changes: bool,
    pub changed_layers: Vec<LayerId>,
    pub composition_types: Vec<Composition>,
    pub display_request_mask: u32,
    pub requested_layers: Vec<LayerId>,
    pub request_masks: Vec<u32>,
    pub client_target_property: ClientTargetProperty,
}

/// Outcome of a successful device present call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Presentation {
    /// Signals when the frame reaches the display; may be `INVALID`
    pub present_fence: Fence,
    /// Per-layer fences signaling when the replaced buffers are free
    pub release_fences: Vec<(LayerId, Fence)>,
}

/// Stateful composition device interface.
///
/// Property setters take effect on the next validate/present cycle.
/// The device is state-preconditioned: present without a prior
/// validate fails with `NotValidated`, and composition-type changes
/// from validate must be accepted before present succeeds.
pub trait ComposerHal {
    // =========================================================================
    // Display properties
    // =========================================================================

    fn set_color_transform(&mut self, display: DisplayId, matrix: &ColorTransform)
        -> HalResult<()>;

    fn set_client_target(
        &mut self,
        display: DisplayId,
        target: NativeHandle,
        acquire_fence: Fence,
        dataspace: Dataspace,
        damage: &[Rect],
    ) -> HalResult<()>;

    /// Output buffer for a virtual display
    fn set_output_buffer(
        &mut self,
        display: DisplayId,
        buffer: NativeHandle,
        release_fence: Fence,
    ) -> HalResult<()>;

    fn set_display_brightness(&mut self, display: DisplayId, brightness: f32) -> HalResult<()>;

    /// Advisory present-time hint; never fails
    fn set_expected_present_time(
        &mut self,
        display: DisplayId,
        expected_present_time: Option<ClockMonotonicTimestamp>,
    );

    // =========================================================================
    // Frame lifecycle
    // =========================================================================

    /// Dry-run the pending composition. Returns the adjustments the
    /// device requires; hard failures are returned as errors.
    fn validate_display(&mut self, display: DisplayId) -> HalResult<Validation>;

    /// Accept the composition-type changes from the last validate
    fn accept_display_changes(&mut self, display: DisplayId) -> HalResult<()>;

    /// Commit the validated composition to the display
    fn present_display(&mut self, display: DisplayId) -> HalResult<Presentation>;

    /// Whether the pending composition requires client-side compositing
    /// for any layer
    fn has_client_composition(&mut self, display: DisplayId) -> HalResult<bool>;

    // =========================================================================
    // Layer properties
    // =========================================================================

    fn set_layer_cursor_position(
        &mut self,
        display: DisplayId,
        layer: LayerId,
        position: Point,
    ) -> HalResult<()>;

    fn set_layer_buffer(
        &mut self,
        display: DisplayId,
        layer: LayerId,
        buffer: NativeHandle,
        acquire_fence: Fence,
    ) -> HalResult<()>;

    fn set_layer_surface_damage(
        &mut self,
        display: DisplayId,
        layer: LayerId,
        damage: &[Rect],
    ) -> HalResult<()>;

    fn set_layer_blend_mode(
        &mut self,
        display: DisplayId,
        layer: LayerId,
        blend_mode: BlendMode,
    ) -> HalResult<()>;

    fn set_layer_color(&mut self, display: DisplayId, layer: LayerId, color: Color)
        -> HalResult<()>;

    fn set_layer_composition_type(
        &mut self,
        display: DisplayId,
        layer: LayerId,
        composition: Composition,
    ) -> HalResult<()>;

    fn set_layer_dataspace(
        &mut self,
        display: DisplayId,
        layer: LayerId,
        dataspace: Dataspace,
    ) -> HalResult<()>;

    fn set_layer_display_frame(
        &mut self,
        display: DisplayId,
        layer: LayerId,
        frame: Rect,
    ) -> HalResult<()>;

    fn set_layer_plane_alpha(
        &mut self,
        display: DisplayId,
        layer: LayerId,
        alpha: f32,
    ) -> HalResult<()>;

    fn set_layer_sideband_stream(
        &mut self,
        display: DisplayId,
        layer: LayerId,
        stream: NativeHandle,
    ) -> HalResult<()>;

    fn set_layer_source_crop(
        &mut self,
        display: DisplayId,
        layer: LayerId,
        crop: FRect,
    ) -> HalResult<()>;

    fn set_layer_transform(
        &mut self,
        display: DisplayId,
        layer: LayerId,
        transform: Transform,
    ) -> HalResult<()>;

    fn set_layer_visible_region(
        &mut self,
        display: DisplayId,
        layer: LayerId,
        visible_region: &[Rect],
    ) -> HalResult<()>;

    fn set_layer_z_order(&mut self, display: DisplayId, layer: LayerId, z: u32) -> HalResult<()>;

    fn set_layer_color_transform(
        &mut self,
        display: DisplayId,
        layer: LayerId,
        matrix: &ColorTransform,
    ) -> HalResult<()>;

    fn set_layer_per_frame_metadata(
        &mut self,
        display: DisplayId,
        layer: LayerId,
        metadata: &[PerFrameMetadata],
    ) -> HalResult<()>;

    fn set_layer_per_frame_metadata_blobs(
        &mut self,
        display: DisplayId,
        layer: LayerId,
        blobs: &[PerFrameMetadataBlob],
    ) -> HalResult<()>;
}

/// No-op device for harnesses and tests.
///
/// Accepts every property, reports a clean validate with no requests,
/// and presents without fences.
#[derive(Debug, Default)]
pub struct StubHal;

impl ComposerHal for StubHal {
    fn set_color_transform(
        &mut self,
        _display: DisplayId,
        _matrix: &ColorTransform,
    ) -> HalResult<()> {
        Ok(())
    }

    fn set_client_target(
        &mut self,
        _display: DisplayId,
        _target: NativeHandle,
        _acquire_fence: Fence,
        _dataspace: Dataspace,
        _damage: &[Rect],
    ) -> HalResult<()> {
        Ok(())
    }

    fn set_output_buffer(
        &mut self,
        _display: DisplayId,
        _buffer: NativeHandle,
        _release_fence: Fence,
    ) -> HalResult<()> {
        Ok(())
    }

    fn set_display_brightness(&mut self, _display: DisplayId, _brightness: f32) -> HalResult<()> {
        Ok(())
    }

    fn set_expected_present_time(
        &mut self,
        display: DisplayId,
        expected_present_time: Option<ClockMonotonicTimestamp>,
    ) {
        let display_id = display;
        tracing::trace!(
            "StubHal: expected present time for display {}: {:?}",
            display_id,
            expected_present_time
        );
    }

    fn validate_display(&mut self, _display: DisplayId) -> HalResult<Validation> {
        Ok(Validation::default())
    }

    fn accept_display_changes(&mut self, _display: DisplayId) -> HalResult<()> {
        Ok(())
    }

    fn present_display(&mut self, _display: DisplayId) -> HalResult<Presentation> {
        Ok(Presentation::default())
    }

    fn has_client_composition(&mut self, _display: DisplayId) -> HalResult<bool> {
        Ok(false)
    }

    fn set_layer_cursor_position(
        &mut self,
        _display: DisplayId,
        _layer: LayerId,
        _position: Point,
    ) -> HalResult<()> {
        Ok(())
    }

    fn set_layer_buffer(
        &mut self,
        _display: DisplayId,
        _layer: LayerId,
        _buffer: NativeHandle,
        _acquire_fence: Fence,
    ) -> HalResult<()> {
        Ok(())
    }

    fn set_layer_surface_damage(
        &mut self,
        _display: DisplayId,
        _layer: LayerId,
        _damage: &[Rect],
    ) -> HalResult<()> {
        Ok(())
    }

    fn set_layer_blend_mode(
        &mut self,
        _display: DisplayId,
        _layer: LayerId,
        _blend_mode: BlendMode,
    ) -> HalResult<()> {
        Ok(())
    }

    fn set_layer_color(
        &mut self,
        _display: DisplayId,
        _layer: LayerId,
        _color: Color,
    ) -> HalResult<()> {
        Ok(())
    }

    fn set_layer_composition_type(
        &mut self,
        _display: DisplayId,
        _layer: LayerId,
        _composition: Composition,
    ) -> HalResult<()> {
        Ok(())
    }

    fn set_layer_dataspace(
        &mut self,
        _display: DisplayId,
        _layer: LayerId,
        _dataspace: Dataspace,
    ) -> HalResult<()> {
        Ok(())
    }

    fn set_layer_display_frame(
        &mut self,
        _display: DisplayId,
        _layer: LayerId,
        _frame: Rect,
    ) -> HalResult<()> {
        Ok(())
    }

    fn set_layer_plane_alpha(
        &mut self,
        _display: DisplayId,
        _layer: LayerId,
        _alpha: f32,
    ) -> HalResult<()> {
        Ok(())
    }

    fn set_layer_sideband_stream(
        &mut self,
        _display: DisplayId,
        _layer: LayerId,
        _stream: NativeHandle,
    ) -> HalResult<()> {
        Ok(())
    }

    fn set_layer_source_crop(
        &mut self,
        _display: DisplayId,
        _layer: LayerId,
        _crop: FRect,
    ) -> HalResult<()> {
        Ok(())
    }

    fn set_layer_transform(
        &mut self,
        _display: DisplayId,
        _layer: LayerId,
        _transform: Transform,
    ) -> HalResult<()> {
        Ok(())
    }

    fn set_layer_visible_region(
        &mut self,
        _display: DisplayId,
        _layer: LayerId,
        _visible_region: &[Rect],
    ) -> HalResult<()> {
        Ok(())
    }

    fn set_layer_z_order(
        &mut self,
        _display: DisplayId,
        _layer: LayerId,
        _z: u32,
    ) -> HalResult<()> {
        Ok(())
    }

    fn set_layer_color_transform(
        &mut self,
        _display: DisplayId,
        _layer: LayerId,
        _matrix: &ColorTransform,
    ) -> HalResult<()> {
        Ok(())
    }

    fn set_layer_per_frame_metadata(
        &mut self,
        _display: DisplayId,
        _layer: LayerId,
        _metadata: &[PerFrameMetadata],
    ) -> HalResult<()> {
        Ok(())
    }

    fn set_layer_per_frame_metadata_blobs(
        &mut self,
        _display: DisplayId,
        _layer: LayerId,
        _blobs: &[PerFrameMetadataBlob],
    ) -> HalResult<()> {
        Ok(())
    }
}
