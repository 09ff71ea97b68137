//! Engine constants and default tuning parameters.

/// Maximum number of emplacements that may exist at the same time.
pub const MAX_EMPLACEMENTS: usize = 5;

// --- Geodesy ---

/// Meters per degree of latitude (nearly constant across the globe).
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Mean Earth radius in meters (haversine distances).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Web-Mercator latitude limit (degrees).
pub const MERCATOR_MAX_LAT: f64 = 85.051_128_78;

// --- Tiles ---

/// Deepest supported pyramid zoom (2^31 tiles per side, rows fit in u32).
pub const MAX_ZOOM: u8 = 31;

/// Edge length of a raster tile in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Elevation represented by a full-white heightmap pixel (meters).
pub const DEFAULT_MAX_HEIGHT: f64 = 500.0;

/// Default number of decoded tiles kept by the LRU cache.
pub const DEFAULT_TILE_CACHE_CAPACITY: usize = 64;

// --- Viewport ---

/// Smallest allowed view scale.
pub const DEFAULT_MIN_SCALE: f64 = 0.1;

/// Largest allowed view scale.
pub const DEFAULT_MAX_SCALE: f64 = 5.0;

// --- Raster (pixel-space) solver profile, angles in mils ---

/// Maximum range in map pixels.
pub const RASTER_MAX_RANGE: f64 = 1200.0;

/// Elevation at minimum range (mils).
pub const RASTER_ELEV_MAX: f64 = 1500.0;

/// Elevation floor (mils).
pub const RASTER_ELEV_MIN: f64 = 900.0;

/// Elevation drop from zero to maximum range (mils).
pub const RASTER_ELEV_SPAN: f64 = 600.0;

/// Gain applied to the height/slant ratio (mils).
pub const RASTER_HEIGHT_GAIN: f64 = 200.0;

/// Hit-test radius for selecting an emplacement (map pixels).
pub const RASTER_PICK_RADIUS: f64 = 30.0;

// --- Geodetic solver profile, angles in degrees ---

/// Maximum range in meters.
pub const GEO_MAX_RANGE: f64 = 5000.0;

/// Elevation at minimum range (degrees).
pub const GEO_ELEV_MAX: f64 = 85.0;

/// Elevation floor (degrees).
pub const GEO_ELEV_MIN: f64 = 45.0;

/// Elevation drop from zero to maximum range (degrees).
pub const GEO_ELEV_SPAN: f64 = 40.0;

/// Gain applied to the height/slant ratio (degrees, 200 mils).
pub const GEO_HEIGHT_GAIN: f64 = 11.25;

/// Hit-test radius for selecting an emplacement (meters).
pub const GEO_PICK_RADIUS: f64 = 50.0;

/// NATO mils per full circle.
pub const MILS_PER_CIRCLE: f64 = 6400.0;
