//! Inbound command data model.
//!
//! A display-server client submits one ordered `Vec<DisplayCommand>` per
//! frame. Every per-property field is optional: `Some` means "change this
//! property this frame", absence is a no-op. Command structures are
//! transient and fully consumed by a single `execute` call.

use std::os::unix::io::RawFd;

/// Addressable output target, composed once per frame
pub type DisplayId = i64;

/// A single visual element contributed to a display's composition
pub type LayerId = i64;

// ============================================================================
// Handles and Fences
// ============================================================================

/// Synchronization fence file descriptor.
///
/// Fences are passed through to the device or back to the client, never
/// waited on by the engine. `INVALID` means "no fence".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fence(pub RawFd);

impl Fence {
    pub const INVALID: Fence = Fence(-1);

    pub fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

impl Default for Fence {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Wire form of a native buffer handle: file descriptors plus opaque
/// driver metadata words, exactly as received from the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBufferHandle {
    pub fds: Vec<RawFd>,
    pub ints: Vec<i32>,
}

/// Opaque device-usable handle token issued by the resources subsystem
/// when a raw handle is imported (or looked up from a cache slot).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeHandle(pub u64);

// ============================================================================
// Geometry and Color
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }
}

/// Sub-pixel source crop rectangle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// 4x4 row-major color transform matrix
pub type ColorTransform = [f32; 16];

// ============================================================================
// Property Enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    Invalid,
    None,
    Premultiplied,
    Coverage,
}

/// How a layer is composed into the display output.
///
/// The device may override a client's requested type during validate;
/// overrides come back as changed-composition-type results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composition {
    Invalid,
    Client,
    Device,
    SolidColor,
    Cursor,
    Sideband,
    DisplayDecoration,
}

/// Raw dataspace word as defined by the graphics common protocol
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dataspace(pub i32);

impl Dataspace {
    pub const UNKNOWN: Dataspace = Dataspace(0);
}

/// Raw pixel format word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormat(pub i32);

impl PixelFormat {
    pub const RGBA_8888: PixelFormat = PixelFormat(1);
}

/// Flip/rotate flag word applied to a layer before composition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transform(pub u32);

impl Transform {
    pub const NONE: Transform = Transform(0);
    pub const FLIP_H: Transform = Transform(1);
    pub const FLIP_V: Transform = Transform(2);
    pub const ROT_180: Transform = Transform(3);
    pub const ROT_90: Transform = Transform(4);
    pub const ROT_270: Transform = Transform(7);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerFrameMetadata {
    pub key: i32,
    pub value: f32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerFrameMetadataBlob {
    pub key: i32,
    pub blob: Vec<u8>,
}

/// Nanosecond CLOCK_MONOTONIC hint for when the frame should reach the
/// display, forwarded to the device before validate/present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockMonotonicTimestamp {
    pub timestamp_nanos: i64,
}

// ============================================================================
// Request Masks
// ============================================================================

/// Display-level request bits reported alongside validate results
pub mod display_request {
    pub const FLIP_CLIENT_TARGET: u32 = 1 << 0;
    pub const WRITE_CLIENT_TARGET_TO_OUTPUT: u32 = 1 << 1;
}

/// Per-layer request bits reported alongside validate results
pub mod layer_request {
    pub const CLEAR_CLIENT_TARGET: u32 = 1 << 0;
}

// ============================================================================
// Buffer Descriptors
// ============================================================================

/// A buffer reference in a command: cache slot plus optional raw handle.
///
/// An absent handle means "reuse whatever a previous frame stored at
/// `slot`"; a present handle is imported and replaces the slot's entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BufferDescriptor {
    /// Cache slot index in the resources subsystem
    pub slot: u32,
    /// Absent = reuse the cached handle at `slot`
    pub handle: Option<RawBufferHandle>,
    /// Acquire fence the device must wait on before reading the buffer
    pub fence: Fence,
}

/// Client-composited target buffer for a display
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientTarget {
    pub buffer: BufferDescriptor,
    pub dataspace: Dataspace,
    pub damage: Vec<Rect>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayBrightness {
    /// Normalized brightness in [0.0, 1.0], or -1.0 to turn the backlight off
    pub brightness: f32,
}

/// Pixel format and dataspace the device wants the client target in,
/// reported by validate on device generations that support it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientTargetProperty {
    pub pixel_format: PixelFormat,
    pub dataspace: Dataspace,
}

impl Default for ClientTargetProperty {
    fn default() -> Self {
        Self {
            pixel_format: PixelFormat::RGBA_8888,
            dataspace: Dataspace::UNKNOWN,
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Per-layer configuration for one frame.
///
/// The owning `DisplayCommand` supplies the display id; each `Some` field
/// results in exactly one device call, in the fixed dispatch order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerCommand {
    pub layer: LayerId,
    pub cursor_position: Option<Point>,
    pub buffer: Option<BufferDescriptor>,
    pub damage: Option<Vec<Rect>>,
    pub blend_mode: Option<BlendMode>,
    pub color: Option<Color>,
    pub composition: Option<Composition>,
    pub dataspace: Option<Dataspace>,
    pub display_frame: Option<Rect>,
    pub plane_alpha: Option<f32>,
    pub sideband_stream: Option<RawBufferHandle>,
    pub source_crop: Option<FRect>,
    pub transform: Option<Transform>,
    pub visible_region: Option<Vec<Rect>>,
    pub z_order: Option<u32>,
    pub color_transform: Option<ColorTransform>,
    pub per_frame_metadata: Option<Vec<PerFrameMetadata>>,
    pub per_frame_metadata_blobs: Option<Vec<PerFrameMetadataBlob>>,
}

impl LayerCommand {
    pub fn new(layer: LayerId) -> Self {
        Self {
            layer,
            ..Self::default()
        }
    }
}

/// Per-display configuration and lifecycle triggers for one frame.
///
/// Layer commands are dispatched first, in listed order, then the
/// display-level properties and lifecycle triggers in declaration order
/// below. The lifecycle booleans are one-shot triggers, not state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayCommand {
    pub display: DisplayId,
    pub layers: Vec<LayerCommand>,
    pub color_transform_matrix: Option<ColorTransform>,
    pub client_target: Option<ClientTarget>,
    pub virtual_display_output_buffer: Option<BufferDescriptor>,
    pub brightness: Option<DisplayBrightness>,
    /// Hint consumed by the validate and present-or-validate triggers
    pub expected_present_time: Option<ClockMonotonicTimestamp>,
    pub validate_display: bool,
    pub accept_display_changes: bool,
    pub present_display: bool,
    pub present_or_validate_display: bool,
}

impl DisplayCommand {
    pub fn new(display: DisplayId) -> Self {
        Self {
            display,
            ..Self::default()
        }
    }
}
