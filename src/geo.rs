//! Sphere projection for placing sites and connections on the globe.
//!
//! Every position drawn on the globe goes through [`project`], so markers and
//! connection endpoints line up exactly from frame to frame.

use latwatch_types::Site;
use serde::Serialize;

/// Radius of the rendered globe.
pub const GLOBE_RADIUS: f64 = 1.5;

/// Markers sit this far above the surface so they never clip into it.
pub const MARKER_OFFSET: f64 = 0.01;

/// How far a connection arc's control point is lifted above its chord midpoint.
pub const ARC_HEIGHT: f64 = 0.5;

/// Default number of segments used to sample a connection arc.
pub const ARC_SEGMENTS: usize = 50;

/// A point in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn scale(&self, k: f64) -> Self {
        Self::new(self.x * k, self.y * k, self.z * k)
    }

    pub fn add(&self, other: Vec3) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    /// Linear interpolation towards `other`; `t = 0` is `self`, `t = 1` is `other`.
    pub fn lerp(&self, other: Vec3, t: f64) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
            self.z + (other.z - self.z) * t,
        )
    }
}

/// Map latitude/longitude in degrees onto a sphere of the given radius.
///
/// Longitude is negated before conversion so that the projection faces the
/// renderer's forward axis. Inputs are not wrapped or clamped; callers pass
/// latitude in [-90, 90] and longitude in [-180, 180].
pub fn project(lat_deg: f64, lon_deg: f64, radius: f64) -> Vec3 {
    let lat = lat_deg.to_radians();
    let lon = (-lon_deg).to_radians();

    Vec3 {
        x: radius * lat.cos() * lon.cos(),
        y: radius * lat.sin(),
        z: radius * lat.cos() * lon.sin(),
    }
}

/// Position of a site's marker, just above the globe surface.
pub fn marker_position<S: Site + ?Sized>(site: &S) -> Vec3 {
    project(site.lat(), site.lon(), GLOBE_RADIUS + MARKER_OFFSET)
}

/// Sample a raised arc between two points on the globe.
///
/// The arc is a quadratic Bézier curve whose control point is the chord
/// midpoint pushed outward by [`ARC_HEIGHT`]. Returns `segments + 1` points,
/// starting at `start` and ending at `end`.
pub fn connection_arc(start: Vec3, end: Vec3, segments: usize) -> Vec<Vec3> {
    let segments = segments.max(1);

    let mid = start.lerp(end, 0.5);
    let mid_len = mid.length();
    // Antipodal endpoints put the midpoint at the origin, which has no outward direction.
    let control = if mid_len > f64::EPSILON {
        mid.scale((mid_len + ARC_HEIGHT) / mid_len)
    } else {
        mid
    };

    (0..=segments)
        .map(|i| {
            let t = i as f64 / segments as f64;
            let u = 1.0 - t;
            start.scale(u * u).add(control.scale(2.0 * u * t)).add(end.scale(t * t))
        })
        .collect()
}
