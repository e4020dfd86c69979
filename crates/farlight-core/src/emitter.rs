//! Draw-command emitter: turns world state into the ordered, layered
//! directive list plus the relativity, lighting, and view contexts.
//!
//! The emitter is read-only over the world and completely deterministic —
//! no randomness, no clock. Anything visual that depends on SR is blended
//! by the effect ramp so engaging the drive never pops. The final list is
//! sorted back-to-front by (layer, z); the host draws it in order.

use farlight_logic::gravity::GrSnapshot;
use farlight_logic::lod::{self, LodStats, LodTier};
use farlight_logic::relativity::{self, Rgb, SrSnapshot};
use farlight_logic::vec3::Vec3;

use crate::components::{BeliefState, PlanetBody, UiMode};
use crate::debug::DebugSink;
use crate::engine::World;
use crate::frame::{
    pack_color, AmbientLight, BridgeView, CameraEcho, DepthLayer, DrawCommand, GalaxyMapView,
    GrLensContext, IsoCoord, LayeredDraw, LightingContext, PanelStyle, PointLight,
    RelativityContext, RingBand, RingDescriptor, SrContext, TargetReadout, TradeItem,
    TradeListing, TradeView, ViewPayload,
};
use crate::src_loc;

/// Virtual screen the host letterboxes to.
pub const VIRTUAL_WIDTH: f32 = 1280.0;
pub const VIRTUAL_HEIGHT: f32 = 720.0;

/// Upper bound on star commands per frame; the brightest win.
const MAX_STAR_DRAWS: usize = 2000;

/// Minimum mapped brightness for a star to be worth a command.
const MIN_STAR_BRIGHTNESS: f32 = 0.02;

/// Sprite ids the host resolves (placeholders if unknown — its problem).
mod sprites {
    pub const MAP_TILE: u32 = 100;
    pub const SHIP_MARKER: u32 = 101;
    pub const PLANET_BILLBOARD_BASE: u32 = 2000;
}

/// Everything the emitter contributes to a frame.
pub struct EmittedFrame {
    pub draw: Vec<LayeredDraw>,
    pub relativity: RelativityContext,
    pub lighting: LightingContext,
    pub view: ViewPayload,
    pub camera: Option<CameraEcho>,
}

struct CameraBasis {
    right: Vec3,
    up: Vec3,
    forward: Vec3,
    focal: f32,
}

impl CameraBasis {
    fn for_world(world: &World) -> Self {
        let forward = if world.ship.beta.length() > 1e-9 {
            world.ship.beta.normalize()
        } else {
            Vec3::new(0.0, 0.0, 1.0)
        };
        let up_hint = if forward.y.abs() > 0.99 {
            Vec3::new(1.0, 0.0, 0.0)
        } else {
            Vec3::new(0.0, 1.0, 0.0)
        };
        let right = up_hint.cross(&forward).normalize();
        let up = forward.cross(&right).normalize();
        let fov = world.camera.fov_deg.to_radians();
        let focal =
            (VIRTUAL_HEIGHT as f64 * 0.5 / (fov * 0.5).tan() * world.camera.zoom.max(0.05)) as f32;
        Self {
            right,
            up,
            forward,
            focal,
        }
    }

    /// Project a world position; None behind the camera or far off-frame.
    /// Returns (screen x, screen y, depth).
    fn project(&self, camera_pos: &Vec3, p: &Vec3) -> Option<(f32, f32, f64)> {
        let rel = *p - *camera_pos;
        let z = rel.dot(&self.forward);
        if z <= 1e-9 {
            return None;
        }
        let x = rel.dot(&self.right) / z;
        let y = rel.dot(&self.up) / z;
        let sx = VIRTUAL_WIDTH * 0.5 + x as f32 * self.focal;
        let sy = VIRTUAL_HEIGHT * 0.5 - y as f32 * self.focal;
        if sx < -VIRTUAL_WIDTH || sx > 2.0 * VIRTUAL_WIDTH || sy < -VIRTUAL_HEIGHT
            || sy > 2.0 * VIRTUAL_HEIGHT
        {
            return None;
        }
        Some((sx, sy, z))
    }

    /// Project a unit direction (for objects treated as at infinity).
    fn project_direction(&self, dir: &Vec3) -> Option<(f32, f32)> {
        let z = dir.dot(&self.forward);
        if z <= 1e-6 {
            return None;
        }
        let x = dir.dot(&self.right) / z;
        let y = dir.dot(&self.up) / z;
        let sx = VIRTUAL_WIDTH * 0.5 + x as f32 * self.focal;
        let sy = VIRTUAL_HEIGHT * 0.5 - y as f32 * self.focal;
        if sx < -VIRTUAL_WIDTH || sx > 2.0 * VIRTUAL_WIDTH || sy < -VIRTUAL_HEIGHT
            || sy > 2.0 * VIRTUAL_HEIGHT
        {
            return None;
        }
        Some((sx, sy))
    }
}

/// Build the frame's presentation payloads from world state.
pub fn emit_frame(world: &World, gr: &GrSnapshot, sink: &mut DebugSink) -> EmittedFrame {
    let sr = SrSnapshot::from_beta(world.camera.beta);
    let basis = CameraBasis::for_world(world);

    let mut draw: Vec<LayeredDraw> = Vec::new();
    let mut lens = GrLensContext::disabled();
    let mut lighting = LightingContext::disabled();

    let view = match world.ui.mode {
        UiMode::Bridge => {
            emit_bridge(world, &sr, gr, &basis, &mut draw, &mut lens, sink);
            lighting = bridge_lighting(world);
            ViewPayload::Bridge(bridge_view(world))
        }
        UiMode::GalaxyMap => {
            emit_galaxy_map(world, &mut draw);
            ViewPayload::GalaxyMap(GalaxyMapView {
                center: map_center(world),
                ly_per_tile: map_ly_per_tile(world),
                selected: world.ui.map_selected,
            })
        }
        UiMode::Trade => {
            emit_trade(world, &mut draw);
            ViewPayload::Trade(trade_view(world))
        }
    };

    // Back-to-front by (layer, z). Stable, so equal keys keep emit order.
    draw.sort_by(|a, b| {
        a.layer
            .cmp(&b.layer)
            .then(a.cmd.z().total_cmp(&b.cmd.z()))
    });

    let view_angle = if sr.enabled {
        let cos = basis.forward.dot(&world.camera.beta.normalize()).clamp(-1.0, 1.0);
        cos.acos()
    } else {
        0.0
    };

    EmittedFrame {
        draw,
        relativity: RelativityContext {
            sr: SrContext {
                enabled: sr.enabled,
                beta: sr.beta,
                gamma: sr.gamma,
                view_angle,
            },
            gr: lens,
        },
        lighting,
        view,
        camera: Some(CameraEcho {
            position: world.camera.position,
            zoom: world.camera.zoom,
            fov_deg: world.camera.fov_deg,
        }),
    }
}

fn push(draw: &mut Vec<LayeredDraw>, layer: DepthLayer, cmd: DrawCommand) {
    let layer = cmd.fixed_layer().unwrap_or(layer);
    draw.push(LayeredDraw { layer, cmd });
}

// ── Bridge view ─────────────────────────────────────────────────────────

fn emit_bridge(
    world: &World,
    sr: &SrSnapshot,
    gr: &GrSnapshot,
    basis: &CameraBasis,
    draw: &mut Vec<LayeredDraw>,
    lens: &mut GrLensContext,
    sink: &mut DebugSink,
) {
    push(draw, DepthLayer::DeepBackground, DrawCommand::SpaceBg { z: 0.0 });
    let rotation = basis.forward.y.atan2(basis.forward.x) as f32;
    push(
        draw,
        DepthLayer::DeepBackground,
        DrawCommand::GalaxyBg {
            exposure: (1.0 + sr.ramp * 0.5) as f32,
            rotation,
            flip_y: false,
            shift_x: (basis.forward.x * 0.1) as f32,
            shift_y: (basis.forward.z * 0.1) as f32,
            scale: world.camera.zoom as f32,
        },
    );

    emit_star_field(world, sr, basis, draw);
    let stats = emit_planets(world, basis, draw);
    sink.log(
        src_loc!(),
        format!(
            "lod tiers: {} full, {} billboard, {} circle, {} point, {} culled",
            stats.full3d, stats.billboard, stats.circle, stats.point, stats.culled
        ),
    );

    // Massive object: an occluding disc plus the lensing context the host
    // uses for post-processing.
    if gr.active {
        if let Some(object) = world.massive_objects.iter().find(|o| o.id == gr.object_id) {
            if let Some((sx, sy, depth)) = basis.project(&world.camera.position, &object.position)
            {
                *lens = GrLensContext {
                    enabled: true,
                    center_x: sx,
                    center_y: sy,
                    phi: gr.phi,
                    schwarzschild_radius_ly: object.schwarzschild_radius_ly,
                    kind: Some(object.kind),
                };
                let radius = (gr.phi * 4000.0).clamp(4.0, 160.0) as f32;
                push(
                    draw,
                    DepthLayer::Scene,
                    DrawCommand::FilledCircle {
                        x: sx,
                        y: sy,
                        r: radius,
                        color: [0.0, 0.0, 0.0],
                        z: -depth as f32,
                    },
                );
            }
        }
    }

    emit_bridge_hud(world, sr, gr, draw);
}

/// Star field with SR optics: aberrated apparent directions, Doppler color
/// shift, beamed brightness — all blended by the effect ramp.
fn emit_star_field(
    world: &World,
    sr: &SrSnapshot,
    basis: &CameraBasis,
    draw: &mut Vec<LayeredDraw>,
) {
    struct Candidate {
        brightness: f32,
        color: Rgb,
        sx: f32,
        sy: f32,
        depth: f64,
        id: u32,
    }

    let stars = world
        .catalog
        .stars_within(&world.camera.position, world.lod.point_max);
    let mut candidates: Vec<Candidate> = Vec::with_capacity(stars.len().min(4096));

    for star in stars {
        let offset = star.position - world.camera.position;
        let distance = offset.length();
        if distance < 1e-6 {
            continue;
        }
        let dir = offset * (1.0 / distance);

        let (dir_seen, doppler) = if sr.enabled {
            let apparent = relativity::apparent_direction(&dir, &sr.beta);
            let seen = dir.lerp(&apparent, sr.ramp).normalize();
            let d = relativity::doppler_factor(&sr.beta, &dir);
            (seen, 1.0 + (d - 1.0) * sr.ramp)
        } else {
            (dir, 1.0)
        };

        let Some((sx, sy)) = basis.project_direction(&dir_seen) else {
            continue;
        };

        let mut flux = star.luminosity / (distance * distance);
        flux *= relativity::beaming_multiplier(doppler);
        // Map relative flux to [0,1] over six decades.
        let brightness = ((flux.log10() + 6.0) / 6.0).clamp(0.0, 1.0) as f32;
        if brightness <= MIN_STAR_BRIGHTNESS {
            continue;
        }

        candidates.push(Candidate {
            brightness,
            color: relativity::shift_color(star.spectral.base_color(), doppler, 1.0),
            sx,
            sy,
            depth: distance,
            id: star.id,
        });
    }

    if candidates.len() > MAX_STAR_DRAWS {
        candidates.sort_by(|a, b| {
            b.brightness
                .total_cmp(&a.brightness)
                .then(a.id.cmp(&b.id))
        });
        candidates.truncate(MAX_STAR_DRAWS);
    }

    for c in candidates {
        push(
            draw,
            DepthLayer::MidBackground,
            DrawCommand::Star {
                screen_x: c.sx,
                screen_y: c.sy,
                brightness: c.brightness,
                color_code: pack_color(c.color),
                z: -c.depth as f32,
            },
        );
    }
}

/// Planets near the camera, one command per LOD tier.
fn emit_planets(world: &World, basis: &CameraBasis, draw: &mut Vec<LayeredDraw>) -> LodStats {
    let mut stats = LodStats::default();

    for (&planet_id, &entity) in &world.planet_index {
        let Ok(body) = world.ecs.get::<&PlanetBody>(entity) else {
            continue;
        };
        let Some(star) = world.catalog.get(body.star_id) else {
            continue;
        };
        let tier = lod::classify(&world.camera.position, &star.position, &world.lod);
        stats.record(tier);
        if tier == LodTier::Culled {
            continue;
        }
        let Some((sx, sy, depth)) = basis.project(&world.camera.position, &star.position) else {
            continue;
        };
        let z = -depth as f32;
        let texture_id = sprites::PLANET_BILLBOARD_BASE + planet_id;

        match tier {
            LodTier::Full3D => {
                let radius = (240.0 / depth.max(0.1)).clamp(12.0, 220.0) as f32;
                let ring = (planet_id % 5 == 0).then(|| RingDescriptor {
                    bands: vec![
                        RingBand {
                            inner: 1.4,
                            outer: 1.9,
                            color: [0.76, 0.70, 0.58],
                            alpha: 0.8,
                        },
                        RingBand {
                            inner: 2.0,
                            outer: 2.3,
                            color: [0.62, 0.58, 0.50],
                            alpha: 0.5,
                        },
                    ],
                });
                push(
                    draw,
                    DepthLayer::Scene,
                    DrawCommand::TexturedPlanet {
                        texture_id,
                        x: sx,
                        y: sy,
                        radius,
                        tilt: (planet_id % 7) as f32 * 0.15,
                        ring,
                        z,
                    },
                );
            }
            LodTier::Billboard => {
                push(
                    draw,
                    DepthLayer::Scene,
                    DrawCommand::Sprite {
                        id: texture_id,
                        x: sx,
                        y: sy,
                        z,
                    },
                );
            }
            LodTier::Circle => {
                push(
                    draw,
                    DepthLayer::Scene,
                    DrawCommand::FilledCircle {
                        x: sx,
                        y: sy,
                        r: 3.0,
                        color: [0.55, 0.68, 0.60],
                        z,
                    },
                );
            }
            LodTier::Point => {
                push(
                    draw,
                    DepthLayer::Scene,
                    DrawCommand::Star {
                        screen_x: sx,
                        screen_y: sy,
                        brightness: 0.3,
                        color_code: pack_color([0.55, 0.68, 0.60]),
                        z,
                    },
                );
            }
            LodTier::Culled => unreachable!("culled above"),
        }
    }
    stats
}

fn emit_bridge_hud(
    world: &World,
    sr: &SrSnapshot,
    gr: &GrSnapshot,
    draw: &mut Vec<LayeredDraw>,
) {
    let panel_h = 110.0;
    let top = VIRTUAL_HEIGHT - panel_h;
    push(
        draw,
        DepthLayer::Foreground,
        DrawCommand::UiPanel {
            x: 0.0,
            y: top,
            w: VIRTUAL_WIDTH,
            h: panel_h,
            style: PanelStyle::Titled,
            z: 0.0,
        },
    );

    let white: Rgb = [0.92, 0.94, 0.96];
    let amber: Rgb = [1.0, 0.78, 0.35];
    let mut line = |text: String, row: f32, color: Rgb, z: f32| {
        push(
            draw,
            DepthLayer::Foreground,
            DrawCommand::Text {
                text,
                x: 16.0,
                y: top + 12.0 + row * 22.0,
                size: 14.0,
                color,
                z,
            },
        );
    };

    line(
        format!(
            "{:?}  |β|={:.4}  γ={:.3}",
            world.ship.mode,
            world.ship.beta.length(),
            sr.gamma
        ),
        0.0,
        white,
        1.0,
    );
    line(
        format!(
            "ship clock {:.2} y   galaxy clock {:.2} y",
            world.ship.proper_time_years, world.ship.external_time_years
        ),
        1.0,
        white,
        2.0,
    );
    if let Some(target) = world.ship.target_star.and_then(|id| world.catalog.get(id)) {
        let d = world.ship.position.distance(&target.position);
        line(
            format!(
                "target {}  {:.2} ly",
                target.name.as_deref().unwrap_or("unnamed"),
                d
            ),
            2.0,
            white,
            3.0,
        );
    }
    if gr.active {
        line(
            format!("gravity well: Φ={:.2e} danger {:?}", gr.phi, gr.danger),
            3.0,
            amber,
            4.0,
        );
    }
}

fn bridge_view(world: &World) -> BridgeView {
    let target = world.ship.target_star.and_then(|id| {
        let star = world.catalog.get(id)?;
        let distance = world.ship.position.distance(&star.position);
        let speed = world.ship.beta.length();
        Some(TargetReadout {
            star_id: id,
            name: star.name.clone(),
            distance_ly: distance,
            eta_years: (speed > 1e-9).then(|| distance / speed),
        })
    });
    BridgeView {
        beta_magnitude: world.ship.beta.length(),
        gamma: relativity::gamma(&world.ship.beta),
        proper_time_years: world.ship.proper_time_years,
        external_time_years: world.ship.external_time_years,
        target,
    }
}

fn bridge_lighting(world: &World) -> LightingContext {
    let mut lights = Vec::new();
    for star in world.catalog.nearest_n(&world.camera.position, 3) {
        let d = world.camera.position.distance(&star.position).max(1e-3);
        lights.push(PointLight {
            id: star.id,
            position: star.position,
            energy: ((star.luminosity / (d * d)).min(10.0)) as f32,
            color: star.spectral.base_color(),
            range: 0.0,
        });
    }
    LightingContext {
        enabled: true,
        ambient: AmbientLight {
            energy: 0.04,
            color: [0.55, 0.60, 0.75],
        },
        lights,
        global_multiplier: 1.0,
    }
}

// ── Galaxy map ──────────────────────────────────────────────────────────

fn map_center(world: &World) -> Vec3 {
    world.ship.position + Vec3::new(world.ui.map_pan_x, world.ui.map_pan_y, 0.0)
}

fn map_ly_per_tile(world: &World) -> f64 {
    10.0 / world.camera.zoom.max(0.05)
}

fn emit_galaxy_map(world: &World, draw: &mut Vec<LayeredDraw>) {
    push(draw, DepthLayer::DeepBackground, DrawCommand::SpaceBg { z: 0.0 });
    push(
        draw,
        DepthLayer::DeepBackground,
        DrawCommand::GalaxyBg {
            exposure: 0.8,
            rotation: 0.0,
            flip_y: true,
            shift_x: 0.0,
            shift_y: 0.0,
            scale: (world.camera.zoom * 0.5) as f32,
        },
    );

    // Tile backdrop for the chart.
    for ty in -4..=4 {
        for tx in -6..=6 {
            push(
                draw,
                DepthLayer::MidBackground,
                DrawCommand::IsoTile {
                    coord: IsoCoord { x: tx, y: ty },
                    sprite_id: sprites::MAP_TILE,
                    layer: 0,
                },
            );
        }
    }

    let center = map_center(world);
    let ly_per_tile = map_ly_per_tile(world);
    let px_per_ly = (64.0 / ly_per_tile) as f32;
    let to_screen = |p: &Vec3| -> (f32, f32) {
        (
            VIRTUAL_WIDTH * 0.5 + (p.x - center.x) as f32 * px_per_ly,
            VIRTUAL_HEIGHT * 0.5 - (p.y - center.y) as f32 * px_per_ly,
        )
    };

    let view_radius = ly_per_tile * 12.0;
    let mut shown = world.catalog.stars_within(&center, view_radius);
    crate::catalog::sort_by_distance(&center, &mut shown);
    shown.truncate(MAX_STAR_DRAWS);

    for star in &shown {
        let (sx, sy) = to_screen(&star.position);
        let brightness = match star.luminosity {
            l if l > 5.0 => 1.0,
            l if l > 0.5 => 0.8,
            l if l > 0.05 => 0.55,
            _ => 0.35,
        };
        push(
            draw,
            DepthLayer::Scene,
            DrawCommand::Star {
                screen_x: sx,
                screen_y: sy,
                brightness,
                color_code: pack_color(star.spectral.base_color()),
                z: 0.0,
            },
        );
        if star.has_habitable_planet {
            push(
                draw,
                DepthLayer::Scene,
                DrawCommand::FilledCircle {
                    x: sx,
                    y: sy,
                    r: 6.0,
                    color: [0.25, 0.75, 0.45],
                    z: 0.5,
                },
            );
        }
        if let Some(name) = &star.name {
            push(
                draw,
                DepthLayer::Scene,
                DrawCommand::Text {
                    text: name.clone(),
                    x: sx + 8.0,
                    y: sy - 6.0,
                    size: 11.0,
                    color: [0.75, 0.80, 0.88],
                    z: 1.0,
                },
            );
        }
    }

    // Ship marker on the chart.
    let (ship_x, ship_y) = to_screen(&world.ship.position);
    let ship_tile = IsoCoord {
        x: ((ship_x - VIRTUAL_WIDTH * 0.5) / 64.0).round() as i32,
        y: ((ship_y - VIRTUAL_HEIGHT * 0.5) / 64.0).round() as i32,
    };
    push(
        draw,
        DepthLayer::Scene,
        DrawCommand::IsoEntity {
            id: 0,
            coord: ship_tile,
            offset_x: ship_x - VIRTUAL_WIDTH * 0.5 - ship_tile.x as f32 * 64.0,
            offset_y: ship_y - VIRTUAL_HEIGHT * 0.5 - ship_tile.y as f32 * 64.0,
            height: 0.0,
            sprite_id: sprites::SHIP_MARKER,
            layer: 2,
        },
    );

    // Selection highlight and course line.
    if let Some(star) = world.ui.map_selected.and_then(|id| world.catalog.get(id)) {
        let (sx, sy) = to_screen(&star.position);
        let tile = IsoCoord {
            x: ((sx - VIRTUAL_WIDTH * 0.5) / 64.0).round() as i32,
            y: ((sy - VIRTUAL_HEIGHT * 0.5) / 64.0).round() as i32,
        };
        push(
            draw,
            DepthLayer::Scene,
            DrawCommand::IsoTileAlpha {
                coord: tile,
                sprite_id: sprites::MAP_TILE,
                layer: 1,
                alpha: 0.45,
                tint: [0.3, 0.9, 0.5],
            },
        );
        push(
            draw,
            DepthLayer::Scene,
            DrawCommand::Line {
                x1: ship_x,
                y1: ship_y,
                x2: sx,
                y2: sy,
                color: [0.3, 0.9, 0.5],
                z: 2.0,
            },
        );
        emit_map_selection_panel(world, star.id, draw);
    }
}

/// Side panel for the selected system: name, range, and what the player
/// believes lives there.
fn emit_map_selection_panel(world: &World, star_id: u32, draw: &mut Vec<LayeredDraw>) {
    let Some(star) = world.catalog.get(star_id) else {
        return;
    };
    push(
        draw,
        DepthLayer::Foreground,
        DrawCommand::UiPanel {
            x: VIRTUAL_WIDTH - 300.0,
            y: 20.0,
            w: 280.0,
            h: 160.0,
            style: PanelStyle::Inset,
            z: 0.0,
        },
    );
    let mut row = 0.0f32;
    let mut line = |text: String, z: f32, draw: &mut Vec<LayeredDraw>| {
        push(
            draw,
            DepthLayer::Foreground,
            DrawCommand::Text {
                text,
                x: VIRTUAL_WIDTH - 288.0,
                y: 36.0 + row * 20.0,
                size: 13.0,
                color: [0.88, 0.90, 0.94],
                z,
            },
        );
        row += 1.0;
    };

    line(
        star.name.clone().unwrap_or_else(|| format!("star {}", star_id)),
        1.0,
        draw,
    );
    line(
        format!(
            "{:.1} ly from ship",
            world.ship.position.distance(&star.position)
        ),
        2.0,
        draw,
    );

    if let Some(planet_id) = world.planet_at_star(star_id) {
        if let Some(&entity) = world.planet_index.get(&planet_id) {
            if let Ok(belief) = world.ecs.get::<&BeliefState>(entity) {
                let (tag, weight) = belief.belief.dominant();
                line(
                    format!("observed: {} (p={:.2})", tag.label(), weight),
                    3.0,
                    draw,
                );
                line(
                    format!(
                        "light is {:.0} years old",
                        belief.observation_distance_ly
                    ),
                    4.0,
                    draw,
                );
                line(
                    format!("confidence {:.2}", belief.belief.confidence),
                    5.0,
                    draw,
                );
            }
        }
    } else {
        line("no surveyed planet".to_string(), 3.0, draw);
    }
}

// ── Trade view ──────────────────────────────────────────────────────────

/// Deterministic price book for a station; no randomness in the emitter.
pub fn trade_listings(star_id: u32) -> Vec<TradeListing> {
    let items = [
        (TradeItem::Metals, 10.0),
        (TradeItem::Volatiles, 14.0),
        (TradeItem::Data, 35.0),
        (TradeItem::TechSchematic, 120.0),
    ];
    items
        .iter()
        .enumerate()
        .map(|(i, &(item, base))| {
            let wobble = ((star_id as u64 * 31 + i as u64 * 17) % 41) as f64;
            TradeListing {
                item,
                price: base * (0.8 + wobble / 100.0),
                available: 3 + ((star_id as u64 + i as u64 * 7) % 12) as u32,
            }
        })
        .collect()
}

fn trade_view(world: &World) -> TradeView {
    let station = world.docked_star();
    TradeView {
        station_star: station,
        listings: station.map(trade_listings).unwrap_or_default(),
    }
}

fn emit_trade(world: &World, draw: &mut Vec<LayeredDraw>) {
    push(draw, DepthLayer::DeepBackground, DrawCommand::SpireBg { z: 0.0 });
    push(
        draw,
        DepthLayer::Foreground,
        DrawCommand::UiPanel {
            x: VIRTUAL_WIDTH * 0.5 - 260.0,
            y: 80.0,
            w: 520.0,
            h: 400.0,
            style: PanelStyle::Titled,
            z: 0.0,
        },
    );

    let Some(station) = world.docked_star() else {
        push(
            draw,
            DepthLayer::Foreground,
            DrawCommand::Text {
                text: "not docked — no market".to_string(),
                x: VIRTUAL_WIDTH * 0.5 - 240.0,
                y: 110.0,
                size: 14.0,
                color: [0.9, 0.6, 0.5],
                z: 1.0,
            },
        );
        return;
    };

    for (i, listing) in trade_listings(station).iter().enumerate() {
        let y = 120.0 + i as f32 * 28.0;
        if world.ui.last_trade == Some(listing.item) {
            push(
                draw,
                DepthLayer::Foreground,
                DrawCommand::Rect {
                    x: VIRTUAL_WIDTH * 0.5 - 250.0,
                    y: y - 4.0,
                    w: 500.0,
                    h: 24.0,
                    color: [0.18, 0.30, 0.22],
                    z: 1.0,
                },
            );
        }
        push(
            draw,
            DepthLayer::Foreground,
            DrawCommand::Text {
                text: format!(
                    "{:?}  {:.1} cr  x{}",
                    listing.item, listing.price, listing.available
                ),
                x: VIRTUAL_WIDTH * 0.5 - 240.0,
                y,
                size: 13.0,
                color: [0.88, 0.90, 0.94],
                z: 2.0,
            },
        );
    }
}
