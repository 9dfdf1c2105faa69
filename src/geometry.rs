#[derive(PartialEq, Debug, Clone, Copy)]
pub struct GeoPoint {
    pub lng: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lng: f64, lat: f64) -> GeoPoint {
        GeoPoint{lng, lat}
    }
}


/// An axis-aligned lon/lat box.  Bounds are inclusive on both ends.
#[derive(PartialEq, Debug, Clone)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Rough extent of the five boroughs.
    pub fn nyc() -> BoundingBox {
        BoundingBox {
            min_lon: -74.25909,
            max_lon: -73.70018,
            min_lat: 40.477399,
            max_lat: 40.917577,
        }
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        // NaN coordinates fail every comparison, so they're never inside
        point.lng >= self.min_lon && point.lng <= self.max_lon &&
        point.lat >= self.min_lat && point.lat <= self.max_lat
    }
}


/// Accumulates the component-wise mean of a set of points.
#[derive(Debug, Clone, Default)]
pub struct MeanPoint {
    lng_sum: f64,
    lat_sum: f64,
    count: usize,
}

impl MeanPoint {
    pub fn add(&mut self, point: &GeoPoint) {
        self.lng_sum += point.lng;
        self.lat_sum += point.lat;
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> Option<GeoPoint> {
        if self.count == 0 {
            return None;
        }
        let count = self.count as f64;
        Some(GeoPoint::new(self.lng_sum / count, self.lat_sum / count))
    }
}
