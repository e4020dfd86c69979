//! Star catalog: a hybrid of hardcoded nearby stars, an optional ingested
//! real-star table, and procedural generation beyond the real data's reach.
//!
//! Construction is a pure function of (seed, source text, config): the same
//! inputs always produce the identical catalog, which is why saves never
//! serialize it. Sol is always id 0 at the origin. Queries go through the
//! octree; results are unordered unless passed to [`sort_by_distance`].

mod octree;

pub use octree::{Aabb, Octree};

use farlight_logic::constants::{catalog as cfg, physics};
use farlight_logic::relativity::Rgb;
use farlight_logic::vec3::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::rng::sub_rng;

/// Main-sequence spectral class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpectralClass {
    O,
    B,
    A,
    F,
    G,
    K,
    M,
}

impl SpectralClass {
    /// Order matches `constants::catalog::SPECTRAL_WEIGHTS`.
    pub const ALL: [SpectralClass; 7] = [
        SpectralClass::O,
        SpectralClass::B,
        SpectralClass::A,
        SpectralClass::F,
        SpectralClass::G,
        SpectralClass::K,
        SpectralClass::M,
    ];

    /// Parse the class letter of a spectral type string ("G2V" → G).
    pub fn from_type_string(s: &str) -> Option<Self> {
        match s.trim().chars().next()?.to_ascii_uppercase() {
            'O' => Some(SpectralClass::O),
            'B' => Some(SpectralClass::B),
            'A' => Some(SpectralClass::A),
            'F' => Some(SpectralClass::F),
            'G' => Some(SpectralClass::G),
            'K' => Some(SpectralClass::K),
            'M' => Some(SpectralClass::M),
            _ => None,
        }
    }

    /// Effective temperature, Kelvin (class midpoint).
    pub fn temperature_k(&self) -> f64 {
        match self {
            SpectralClass::O => 40_000.0,
            SpectralClass::B => 20_000.0,
            SpectralClass::A => 8_500.0,
            SpectralClass::F => 6_500.0,
            SpectralClass::G => 5_700.0,
            SpectralClass::K => 4_500.0,
            SpectralClass::M => 3_000.0,
        }
    }

    /// Base render color before any Doppler shift.
    pub fn base_color(&self) -> Rgb {
        match self {
            SpectralClass::O => [0.60, 0.69, 1.00],
            SpectralClass::B => [0.67, 0.75, 1.00],
            SpectralClass::A => [0.80, 0.84, 1.00],
            SpectralClass::F => [0.97, 0.95, 1.00],
            SpectralClass::G => [1.00, 0.93, 0.84],
            SpectralClass::K => [1.00, 0.82, 0.63],
            SpectralClass::M => [1.00, 0.62, 0.44],
        }
    }

    /// Luminosity range in solar units, log-uniform sampled.
    pub fn luminosity_range(&self) -> (f64, f64) {
        match self {
            SpectralClass::O => (3e4, 8e5),
            SpectralClass::B => (25.0, 3e4),
            SpectralClass::A => (5.0, 25.0),
            SpectralClass::F => (1.5, 5.0),
            SpectralClass::G => (0.6, 1.5),
            SpectralClass::K => (0.08, 0.6),
            SpectralClass::M => (1e-4, 0.08),
        }
    }

    /// Probability that a star of this class carries a habitable-zone
    /// planet (tunable model parameter).
    pub fn habitable_weight(&self) -> f64 {
        match self {
            SpectralClass::O | SpectralClass::B => 0.0,
            SpectralClass::A => 0.02,
            SpectralClass::F => 0.15,
            SpectralClass::G => 0.25,
            SpectralClass::K => 0.20,
            SpectralClass::M => 0.08,
        }
    }
}

/// One catalog star. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
    /// Stable id; Sol is always 0.
    pub id: u32,
    /// Display name for the handful of stars that have one.
    pub name: Option<String>,
    /// Position in catalog space, light-years, Sol at the origin.
    pub position: Vec3,
    pub spectral: SpectralClass,
    /// Solar units.
    pub luminosity: f64,
    pub has_habitable_planet: bool,
}

/// A row of the ingested real-star table.
#[derive(Debug, Clone, Deserialize)]
pub struct RealStarRecord {
    pub name: String,
    pub ra_deg: f64,
    pub dec_deg: f64,
    pub parallax_mas: f64,
    pub spectral: String,
    pub luminosity: f64,
}

/// Catalog construction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Procedural stars are generated out to this radius, light-years.
    pub procedural_radius_ly: f64,
    /// Edge length of one generation cell, light-years.
    pub cell_size_ly: f64,
    /// Octree leaf capacity.
    pub max_leaf: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            procedural_radius_ly: 150.0,
            cell_size_ly: 20.0,
            max_leaf: 32,
        }
    }
}

/// The built catalog plus its spatial index.
#[derive(Debug)]
pub struct StarCatalog {
    stars: Vec<Star>,
    positions: Vec<Vec3>,
    octree: Octree,
    /// Construction notes: ingest fallbacks, row skips.
    pub diagnostics: Vec<String>,
}

/// Sort a query result by distance to a center, ties broken by id.
pub fn sort_by_distance<'a>(center: &Vec3, stars: &mut [&'a Star]) {
    stars.sort_by(|a, b| {
        let da = a.position.distance_squared(center);
        let db = b.position.distance_squared(center);
        da.partial_cmp(&db)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.id.cmp(&b.id))
    });
}

/// The ~20 nearest real stars, seeded unconditionally. Positions are
/// catalog-space light-years; habitable flags are fixed so worldgen is
/// stable across seeds.
fn hardcoded_stars() -> Vec<Star> {
    let table: [(&str, f64, f64, f64, SpectralClass, f64, bool); 20] = [
        ("Sol", 0.0, 0.0, 0.0, SpectralClass::G, 1.0, false),
        ("Proxima Centauri", 4.0, 1.0, -1.0, SpectralClass::M, 0.0017, true),
        ("Alpha Centauri A", 3.0, 2.0, 2.0, SpectralClass::G, 1.52, false),
        ("Alpha Centauri B", 3.1, 2.0, 2.0, SpectralClass::K, 0.5, false),
        ("Barnard's Star", 5.0, 3.0, 1.0, SpectralClass::M, 0.0035, false),
        ("Wolf 359", 6.0, -5.0, 0.0, SpectralClass::M, 0.0014, false),
        ("Lalande 21185", -7.0, 4.0, 2.0, SpectralClass::M, 0.026, false),
        ("Sirius", -8.0, -3.0, 0.0, SpectralClass::A, 25.4, false),
        ("Luyten 726-8", 7.0, -5.0, 1.0, SpectralClass::M, 6e-5, false),
        ("Ross 154", 9.0, 3.0, 2.0, SpectralClass::M, 0.0038, false),
        ("Ross 248", -6.0, 7.0, 4.0, SpectralClass::M, 0.0018, false),
        ("Epsilon Eridani", 10.0, -3.0, 1.0, SpectralClass::K, 0.34, true),
        ("Lacaille 9352", -9.0, -5.0, 2.0, SpectralClass::M, 0.033, false),
        ("Ross 128", 11.0, 0.0, 1.0, SpectralClass::M, 0.0036, true),
        ("61 Cygni A", 7.0, 8.0, 4.0, SpectralClass::K, 0.15, false),
        ("61 Cygni B", 7.1, 8.0, 4.0, SpectralClass::K, 0.085, false),
        ("Procyon", -10.0, 5.0, 2.0, SpectralClass::F, 6.9, false),
        ("Epsilon Indi", 3.0, -11.0, 1.0, SpectralClass::K, 0.22, false),
        ("Tau Ceti", -4.0, -11.0, -1.0, SpectralClass::G, 0.52, true),
        ("Groombridge 34", 2.0, 11.0, 3.0, SpectralClass::M, 0.0064, false),
    ];
    table
        .iter()
        .enumerate()
        .map(|(i, &(name, x, y, z, spectral, luminosity, habitable))| Star {
            id: i as u32,
            name: Some(name.to_string()),
            position: Vec3::new(x, y, z),
            spectral,
            luminosity,
            has_habitable_planet: habitable,
        })
        .collect()
}

/// Convert one table row to catalog space: distance_pc = 1000/parallax_mas,
/// then equatorial (RA, dec) to Cartesian.
fn record_to_star(record: &RealStarRecord) -> Result<(Vec3, SpectralClass), String> {
    if !record.parallax_mas.is_finite() || record.parallax_mas <= 0.0 {
        return Err(format!(
            "star '{}' has unusable parallax {}",
            record.name, record.parallax_mas
        ));
    }
    let spectral = SpectralClass::from_type_string(&record.spectral)
        .ok_or_else(|| format!("star '{}' has spectral type '{}'", record.name, record.spectral))?;

    let distance_ly = (1000.0 / record.parallax_mas) * physics::LY_PER_PC;
    let ra = record.ra_deg.to_radians();
    let dec = record.dec_deg.to_radians();
    let dir = Vec3::new(dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin());
    Ok((dir * distance_ly, spectral))
}

/// Stream identifiers for sub-seeded generators (arbitrary, fixed).
const STREAM_INGEST: u64 = 0x1001;
const STREAM_CELL: u64 = 0x2001;

impl StarCatalog {
    /// Build the catalog. A malformed `source` is a recoverable failure:
    /// it is recorded in `diagnostics` and construction proceeds on the
    /// hardcoded-plus-procedural path.
    pub fn build(seed: u64, source: Option<&str>, config: &CatalogConfig) -> Self {
        let mut diagnostics = Vec::new();
        let mut stars = hardcoded_stars();

        if let Some(text) = source {
            match Self::ingest(seed, text, &mut stars) {
                Ok(kept) => {
                    diagnostics.push(format!("ingested {} real stars from source", kept));
                }
                Err(e) => {
                    log::warn!("real-star source rejected, using procedural fallback: {}", e);
                    diagnostics.push(format!("real-star source rejected: {}", e));
                }
            }
        }

        Self::generate_procedural(seed, config, &mut stars);

        let half = stars
            .iter()
            .map(|s| {
                s.position
                    .x
                    .abs()
                    .max(s.position.y.abs())
                    .max(s.position.z.abs())
            })
            .fold(config.procedural_radius_ly, f64::max)
            + 1.0;

        let positions: Vec<Vec3> = stars.iter().map(|s| s.position).collect();
        let octree = Octree::build(&positions, Aabb::cube(half), config.max_leaf);

        Self {
            stars,
            positions,
            octree,
            diagnostics,
        }
    }

    /// Parse and merge the real-star table. Unusable rows are skipped; a
    /// document that fails to parse at all is an error.
    fn ingest(seed: u64, text: &str, stars: &mut Vec<Star>) -> Result<usize, String> {
        let records: Vec<RealStarRecord> =
            serde_json::from_str(text).map_err(|e| e.to_string())?;

        let mut kept = 0;
        for (i, record) in records.iter().enumerate() {
            let (position, spectral) = match record_to_star(record) {
                Ok(v) => v,
                Err(_) => continue,
            };
            let d = position.length();
            let mut rng = sub_rng(seed, STREAM_INGEST, i as u64);
            // Real data fades out across the blend annulus.
            if d >= cfg::BLEND_OUTER_LY {
                continue;
            }
            if d > cfg::BLEND_INNER_LY {
                let t = (d - cfg::BLEND_INNER_LY) / (cfg::BLEND_OUTER_LY - cfg::BLEND_INNER_LY);
                if rng.gen::<f64>() < t {
                    continue;
                }
            }
            // The hardcoded table already covers the closest neighborhood.
            if stars.iter().any(|s| s.position.distance(&position) < 0.5) {
                continue;
            }
            let id = stars.len() as u32;
            stars.push(Star {
                id,
                name: Some(record.name.clone()),
                position,
                spectral,
                luminosity: record.luminosity.max(1e-6),
                has_habitable_planet: rng.gen::<f64>() < spectral.habitable_weight(),
            });
            kept += 1;
        }
        Ok(kept)
    }

    /// Grid-cell procedural generation from the blend annulus outward.
    ///
    /// Each cell gets its own generator seeded from (seed, cell coords), so
    /// the field is identical regardless of iteration order or what real
    /// data was ingested.
    fn generate_procedural(seed: u64, config: &CatalogConfig, stars: &mut Vec<Star>) {
        let cell = config.cell_size_ly;
        let radius = config.procedural_radius_ly;
        let cells = (radius / cell).ceil() as i64;
        let half_diag = cell * 0.5 * 3f64.sqrt();

        for ix in -cells..=cells {
            for iy in -cells..=cells {
                for iz in -cells..=cells {
                    let center = Vec3::new(
                        (ix as f64 + 0.5) * cell,
                        (iy as f64 + 0.5) * cell,
                        (iz as f64 + 0.5) * cell,
                    );
                    let center_d = center.length();
                    if center_d - half_diag > radius {
                        continue;
                    }
                    if center_d + half_diag < cfg::BLEND_INNER_LY {
                        continue;
                    }

                    let cell_key = ((ix as u64) & 0x1F_FFFF)
                        | (((iy as u64) & 0x1F_FFFF) << 21)
                        | (((iz as u64) & 0x1F_FFFF) << 42);
                    let mut rng = sub_rng(seed, STREAM_CELL, cell_key);

                    let expected = local_density(&center) * cell * cell * cell;
                    let mut count = expected.floor() as usize;
                    if rng.gen::<f64>() < expected.fract() {
                        count += 1;
                    }

                    for _ in 0..count {
                        let position = Vec3::new(
                            center.x + rng.gen_range(-0.5..0.5) * cell,
                            center.y + rng.gen_range(-0.5..0.5) * cell,
                            center.z + rng.gen_range(-0.5..0.5) * cell,
                        );
                        let d = position.length();
                        if d > radius || d < cfg::BLEND_INNER_LY {
                            continue;
                        }
                        // Crossfade in: procedural density ramps 0→1 across
                        // the annulus.
                        if d < cfg::BLEND_OUTER_LY {
                            let t = (d - cfg::BLEND_INNER_LY)
                                / (cfg::BLEND_OUTER_LY - cfg::BLEND_INNER_LY);
                            if rng.gen::<f64>() >= t {
                                continue;
                            }
                        }

                        let spectral = draw_spectral(&mut rng);
                        let (lo, hi) = spectral.luminosity_range();
                        let luminosity = 10f64.powf(rng.gen_range(lo.log10()..hi.log10()));
                        let id = stars.len() as u32;
                        stars.push(Star {
                            id,
                            name: None,
                            position,
                            spectral,
                            luminosity,
                            has_habitable_planet: rng.gen::<f64>() < spectral.habitable_weight(),
                        });
                    }
                }
            }
        }
    }

    pub fn get(&self, id: u32) -> Option<&Star> {
        self.stars.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Star> {
        self.stars.iter()
    }

    /// Stars that carry a display name (the seeded real neighborhood).
    pub fn named(&self) -> impl Iterator<Item = &Star> {
        self.stars.iter().filter(|s| s.name.is_some())
    }

    /// All stars within `radius` of `center`. Unordered.
    pub fn stars_within(&self, center: &Vec3, radius: f64) -> Vec<&Star> {
        let mut indices = Vec::new();
        self.octree
            .within_radius(center, radius, &self.positions, &mut indices);
        indices
            .into_iter()
            .map(|i| &self.stars[i as usize])
            .collect()
    }

    /// The `n` stars nearest `center`, closest first.
    pub fn nearest_n(&self, center: &Vec3, n: usize) -> Vec<&Star> {
        self.octree
            .nearest_n(center, n, &self.positions)
            .into_iter()
            .map(|(i, _)| &self.stars[i as usize])
            .collect()
    }
}

/// Stellar density at a catalog-space position, stars per cubic light-year.
///
/// Exponential disk, ρ ∝ exp(−r/h_r)·exp(−|z|/h_z) in galactocentric
/// cylindrical coordinates, anchored so the solar neighborhood comes out at
/// `LOCAL_DENSITY`.
fn local_density(position: &Vec3) -> f64 {
    let gc_x = position.x + physics::SOL_GALACTOCENTRIC_LY;
    let r = (gc_x * gc_x + position.y * position.y).sqrt();
    let radial = (-(r - physics::SOL_GALACTOCENTRIC_LY) / cfg::DISK_SCALE_RADIAL_LY).exp();
    let vertical = (-position.z.abs() / cfg::DISK_SCALE_VERTICAL_LY).exp();
    cfg::LOCAL_DENSITY * radial * vertical
}

fn draw_spectral<R: Rng>(rng: &mut R) -> SpectralClass {
    let mut roll = rng.gen::<f64>();
    for (i, w) in cfg::SPECTRAL_WEIGHTS.iter().enumerate() {
        roll -= w;
        if roll < 0.0 {
            return SpectralClass::ALL[i];
        }
    }
    SpectralClass::M
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> CatalogConfig {
        CatalogConfig {
            procedural_radius_ly: 100.0,
            cell_size_ly: 20.0,
            max_leaf: 16,
        }
    }

    #[test]
    fn sol_is_id_zero_at_origin() {
        let catalog = StarCatalog::build(42, None, &small_config());
        let sol = catalog.get(0).unwrap();
        assert_eq!(sol.name.as_deref(), Some("Sol"));
        assert_eq!(sol.position, Vec3::ZERO);
    }

    #[test]
    fn same_seed_same_catalog() {
        let a = StarCatalog::build(42, None, &small_config());
        let b = StarCatalog::build(42, None, &small_config());
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x, y);
        }
    }

    #[test]
    fn different_seeds_differ() {
        let a = StarCatalog::build(1, None, &small_config());
        let b = StarCatalog::build(2, None, &small_config());
        // Hardcoded stars match; the procedural field must not.
        assert!(
            a.len() != b.len()
                || a.iter().zip(b.iter()).any(|(x, y)| x.position != y.position)
        );
    }

    #[test]
    fn population_is_plausible() {
        let catalog = StarCatalog::build(42, None, &CatalogConfig::default());
        // ~0.004 stars/ly³ out to 150 ly minus the real-only core.
        assert!(
            catalog.len() > 10_000 && catalog.len() < 200_000,
            "got {}",
            catalog.len()
        );
    }

    #[test]
    fn procedural_stars_stay_outside_real_core() {
        let catalog = StarCatalog::build(7, None, &small_config());
        for star in catalog.iter().filter(|s| s.name.is_none()) {
            assert!(
                star.position.length() >= cfg::BLEND_INNER_LY,
                "procedural star {} at {} ly",
                star.id,
                star.position.length()
            );
        }
    }

    #[test]
    fn query_matches_linear_scan() {
        let catalog = StarCatalog::build(42, None, &small_config());
        let center = Vec3::new(90.0, 0.0, 0.0);
        let radius = 15.0;
        let mut got: Vec<u32> = catalog
            .stars_within(&center, radius)
            .iter()
            .map(|s| s.id)
            .collect();
        got.sort_unstable();
        let mut want: Vec<u32> = catalog
            .iter()
            .filter(|s| s.position.distance(&center) <= radius)
            .map(|s| s.id)
            .collect();
        want.sort_unstable();
        assert_eq!(got, want);
    }

    #[test]
    fn nearest_to_origin_is_sol() {
        let catalog = StarCatalog::build(42, None, &small_config());
        let nearest = catalog.nearest_n(&Vec3::ZERO, 3);
        assert_eq!(nearest[0].id, 0);
        assert_eq!(nearest.len(), 3);
    }

    #[test]
    fn malformed_source_falls_back() {
        let catalog = StarCatalog::build(42, Some("this is not json"), &small_config());
        assert!(catalog
            .diagnostics
            .iter()
            .any(|d| d.contains("rejected")));
        // Fallback still has the hardcoded core and procedural field.
        assert!(catalog.len() > 20);
        assert_eq!(catalog.get(0).unwrap().name.as_deref(), Some("Sol"));
    }

    #[test]
    fn good_source_rows_are_ingested() {
        let source = r#"[
            {"name": "Vega", "ra_deg": 279.23, "dec_deg": 38.78,
             "parallax_mas": 130.23, "spectral": "A0V", "luminosity": 40.12},
            {"name": "Bad Row", "ra_deg": 0.0, "dec_deg": 0.0,
             "parallax_mas": 0.0, "spectral": "G2V", "luminosity": 1.0}
        ]"#;
        let catalog = StarCatalog::build(42, Some(source), &small_config());
        let vega = catalog.iter().find(|s| s.name.as_deref() == Some("Vega"));
        let vega = vega.expect("Vega should be ingested");
        // 1000/130.23 mas ≈ 7.68 pc ≈ 25.04 ly.
        assert!((vega.position.length() - 25.04).abs() < 0.1);
        assert_eq!(vega.spectral, SpectralClass::A);
        // The zero-parallax row is skipped, not fatal.
        assert!(catalog.iter().all(|s| s.name.as_deref() != Some("Bad Row")));
    }

    #[test]
    fn sort_by_distance_helper() {
        let catalog = StarCatalog::build(42, None, &small_config());
        let mut stars = catalog.stars_within(&Vec3::ZERO, 12.0);
        sort_by_distance(&Vec3::ZERO, &mut stars);
        for pair in stars.windows(2) {
            assert!(
                pair[0].position.length_squared() <= pair[1].position.length_squared() + 1e-12
            );
        }
        assert_eq!(stars[0].id, 0, "Sol is closest to the origin");
    }

    #[test]
    fn spectral_parsing() {
        assert_eq!(SpectralClass::from_type_string("G2V"), Some(SpectralClass::G));
        assert_eq!(SpectralClass::from_type_string("m5"), Some(SpectralClass::M));
        assert_eq!(SpectralClass::from_type_string("X9"), None);
        assert_eq!(SpectralClass::from_type_string(""), None);
    }
}
