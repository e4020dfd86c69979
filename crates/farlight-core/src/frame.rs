//! The frame protocol: what the host hands the core each tick and what the
//! core hands back.
//!
//! `FrameInput` is a complete description of one frame's input; nothing is
//! read from the environment. `FrameOutput` is a complete description of
//! what to present: an ordered draw list (back-to-front by layer then z),
//! sound cues, the relativity and lighting contexts, a view-specific
//! payload, and the collected debug effects. Asset ids are opaque to the
//! core; an id the host cannot resolve is the host's placeholder problem.

use farlight_logic::gravity::MassiveKind;
use farlight_logic::relativity::Rgb;
use farlight_logic::vec3::Vec3;
use serde::{Deserialize, Serialize};

use crate::components::StructureKind;
use crate::debug::{AssertionResult, DebugLog};

// ── Input ───────────────────────────────────────────────────────────────

/// Everything the host captured for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameInput {
    /// Host-side frame counter, echoed for replay correlation.
    pub tick: u64,
    /// Frame delta in seconds. Must be finite and non-negative.
    pub delta_seconds: f32,
    pub mouse: MouseState,
    /// Key events in the order they occurred.
    pub keys: Vec<KeyEvent>,
    pub action: PlayerAction,
    pub drag: Option<DragState>,
}

impl FrameInput {
    /// An input frame with no player activity.
    pub fn idle(tick: u64, delta_seconds: f32) -> Self {
        Self {
            tick,
            delta_seconds,
            mouse: MouseState::default(),
            keys: Vec::new(),
            action: PlayerAction::None,
            drag: None,
        }
    }

    /// Idle frame carrying a single action.
    pub fn action(tick: u64, delta_seconds: f32, action: PlayerAction) -> Self {
        Self {
            action,
            ..Self::idle(tick, delta_seconds)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MouseState {
    pub x: f32,
    pub y: f32,
    /// Buttons that went down this frame.
    pub pressed: Vec<MouseButton>,
    /// Buttons that went up this frame.
    pub released: Vec<MouseButton>,
    /// World-space projection of the cursor, when the host knows it.
    pub world_hint: Option<Vec3>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub state: KeyState,
    pub code: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyState {
    Down,
    Up,
    Repeat,
}

/// Key codes the core reacts to (ASCII uppercase).
pub mod keycodes {
    pub const BRIDGE: u32 = b'B' as u32;
    pub const GALAXY_MAP: u32 = b'M' as u32;
    pub const TRADE: u32 = b'T' as u32;
}

/// The one discrete thing the player asked for this frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlayerAction {
    None,
    /// Inspect whatever is under the cursor / selected.
    Inspect,
    Build(StructureKind),
    /// Tear down structures at the docked planet.
    Clear,
    Trade(TradeItem),
    /// Head for a catalog star by id.
    WarpTo(u32),
    /// Add this delta to the ship's velocity (fractions of c).
    AdjustVelocity(Vec3),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeItem {
    Metals,
    Volatiles,
    Data,
    /// Trading schematics uplifts the recipient civilization.
    TechSchematic,
}

/// An in-progress UI drag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragState {
    pub origin_x: f32,
    pub origin_y: f32,
    pub current_x: f32,
    pub current_y: f32,
    pub button: MouseButton,
}

// ── Draw commands ───────────────────────────────────────────────────────

/// Depth layer; the host renders layers in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DepthLayer {
    DeepBackground,
    MidBackground,
    Scene,
    Foreground,
}

/// A draw command plus its depth layer. Ordering in the output list is
/// significant: the list arrives sorted back-to-front by (layer, z).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayeredDraw {
    pub layer: DepthLayer,
    pub cmd: DrawCommand,
}

/// Integer tile coordinate for isometric views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IsoCoord {
    pub x: i32,
    pub y: i32,
}

/// Ring system descriptor attached to a textured planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingDescriptor {
    pub bands: Vec<RingBand>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingBand {
    /// Inner and outer radius as multiples of the planet radius.
    pub inner: f32,
    pub outer: f32,
    pub color: Rgb,
    pub alpha: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PanelStyle {
    Plain,
    Inset,
    Titled,
}

/// The closed set of rendering directives.
///
/// Coordinates are screen-space unless the variant says otherwise; `z`
/// orders commands within their depth layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Rgb,
        z: f32,
    },
    FilledCircle {
        x: f32,
        y: f32,
        r: f32,
        color: Rgb,
        z: f32,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        color: Rgb,
        z: f32,
    },
    Sprite {
        id: u32,
        x: f32,
        y: f32,
        z: f32,
    },
    TexturedPlanet {
        texture_id: u32,
        x: f32,
        y: f32,
        radius: f32,
        tilt: f32,
        ring: Option<RingDescriptor>,
        z: f32,
    },
    IsoTile {
        coord: IsoCoord,
        sprite_id: u32,
        layer: u8,
    },
    IsoTileAlpha {
        coord: IsoCoord,
        sprite_id: u32,
        layer: u8,
        alpha: f32,
        tint: Rgb,
    },
    IsoEntity {
        id: u32,
        coord: IsoCoord,
        offset_x: f32,
        offset_y: f32,
        height: f32,
        sprite_id: u32,
        layer: u8,
    },
    Star {
        screen_x: f32,
        screen_y: f32,
        /// Perceptual brightness in [0, 1].
        brightness: f32,
        /// Packed 0xRRGGBB.
        color_code: u32,
        z: f32,
    },
    GalaxyBg {
        exposure: f32,
        rotation: f32,
        flip_y: bool,
        shift_x: f32,
        shift_y: f32,
        scale: f32,
    },
    SpireBg {
        z: f32,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        color: Rgb,
        z: f32,
    },
    UiPanel {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        style: PanelStyle,
        z: f32,
    },
    SpaceBg {
        z: f32,
    },
}

impl DrawCommand {
    /// Within-layer sort key.
    pub fn z(&self) -> f32 {
        match self {
            DrawCommand::Rect { z, .. }
            | DrawCommand::FilledCircle { z, .. }
            | DrawCommand::Text { z, .. }
            | DrawCommand::Sprite { z, .. }
            | DrawCommand::TexturedPlanet { z, .. }
            | DrawCommand::Star { z, .. }
            | DrawCommand::SpireBg { z }
            | DrawCommand::Line { z, .. }
            | DrawCommand::UiPanel { z, .. }
            | DrawCommand::SpaceBg { z } => *z,
            DrawCommand::IsoTile { layer, .. }
            | DrawCommand::IsoTileAlpha { layer, .. }
            | DrawCommand::IsoEntity { layer, .. } => f32::from(*layer),
            DrawCommand::GalaxyBg { .. } => 0.0,
        }
    }

    /// Layer this variant must always be drawn in, if fixed.
    pub fn fixed_layer(&self) -> Option<DepthLayer> {
        match self {
            DrawCommand::GalaxyBg { .. } | DrawCommand::SpaceBg { .. } => {
                Some(DepthLayer::DeepBackground)
            }
            _ => None,
        }
    }
}

/// Pack an RGB triple into 0xRRGGBB for `Star::color_code`.
pub fn pack_color(color: Rgb) -> u32 {
    let clamp = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
    (clamp(color[0]) << 16) | (clamp(color[1]) << 8) | clamp(color[2])
}

// ── Contexts ────────────────────────────────────────────────────────────

/// SR parameters the host applies as post-processing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SrContext {
    pub enabled: bool,
    pub beta: Vec3,
    pub gamma: f64,
    /// Angle between the velocity and the camera forward axis, radians.
    pub view_angle: f64,
}

impl SrContext {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            beta: Vec3::ZERO,
            gamma: 1.0,
            view_angle: 0.0,
        }
    }
}

/// GR lensing parameters in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrLensContext {
    pub enabled: bool,
    pub center_x: f32,
    pub center_y: f32,
    pub phi: f64,
    pub schwarzschild_radius_ly: f64,
    pub kind: Option<MassiveKind>,
}

impl GrLensContext {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            center_x: 0.0,
            center_y: 0.0,
            phi: 0.0,
            schwarzschild_radius_ly: 0.0,
            kind: None,
        }
    }
}

/// Both substructures are present on every frame; their `enabled` flags
/// gate host processing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelativityContext {
    pub sr: SrContext,
    pub gr: GrLensContext,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientLight {
    pub energy: f32,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub id: u32,
    pub position: Vec3,
    pub energy: f32,
    pub color: Rgb,
    /// Falloff range; 0 means infinite.
    pub range: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightingContext {
    pub enabled: bool,
    pub ambient: AmbientLight,
    pub lights: Vec<PointLight>,
    pub global_multiplier: f32,
}

impl LightingContext {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ambient: AmbientLight {
                energy: 0.0,
                color: [0.0, 0.0, 0.0],
            },
            lights: Vec::new(),
            global_multiplier: 1.0,
        }
    }
}

// ── View payloads ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetReadout {
    pub star_id: u32,
    pub name: Option<String>,
    pub distance_ly: f64,
    /// External-frame ETA at current speed, if moving.
    pub eta_years: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeView {
    pub beta_magnitude: f64,
    pub gamma: f64,
    pub proper_time_years: f64,
    pub external_time_years: f64,
    pub target: Option<TargetReadout>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalaxyMapView {
    pub center: Vec3,
    pub ly_per_tile: f64,
    pub selected: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeListing {
    pub item: TradeItem,
    pub price: f64,
    pub available: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeView {
    pub station_star: Option<u32>,
    pub listings: Vec<TradeListing>,
}

/// Mode-specific payload of one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ViewPayload {
    Bridge(BridgeView),
    GalaxyMap(GalaxyMapView),
    Trade(TradeView),
}

/// Echo of the camera the frame was built with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraEcho {
    pub position: Vec3,
    pub zoom: f64,
    pub fov_deg: f64,
}

/// Sound cue ids emitted by the core.
pub mod sounds {
    pub const MODE_SHIFT: u32 = 1;
    pub const WARP_ENGAGE: u32 = 2;
    pub const ARRIVAL: u32 = 3;
    pub const UI_SELECT: u32 = 4;
    pub const TRADE_COMPLETE: u32 = 5;
}

// ── Output ──────────────────────────────────────────────────────────────

/// Everything the core produced for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameOutput {
    /// Ordered draw list, back-to-front by (layer, z).
    pub draw: Vec<LayeredDraw>,
    /// Sound cues to start this frame.
    pub sounds: Vec<u32>,
    pub logs: Vec<DebugLog>,
    pub assertions: Vec<AssertionResult>,
    pub camera: Option<CameraEcho>,
    pub relativity: RelativityContext,
    pub lighting: LightingContext,
    pub view: ViewPayload,
}
