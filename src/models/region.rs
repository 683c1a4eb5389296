use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Region {
    pub region_name: String,
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

#[cfg(test)]
impl Region {
    /// Inclusive bounding-box test; points on an edge belong to the region.
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_longitude..=self.max_longitude).contains(&longitude)
            && (self.min_latitude..=self.max_latitude).contains(&latitude)
    }
}
