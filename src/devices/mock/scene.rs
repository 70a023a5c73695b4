//! Simulated scene geometry

/// One simulated physical object in front of the head.
#[derive(Debug, Clone, Copy)]
pub struct SceneObject {
    /// First degree covered by the object
    pub start_deg: u16,
    /// Last degree covered (inclusive)
    pub end_deg: u16,
    /// Distance from the head, in centimeters
    pub distance_cm: u32,
}

/// What the head sees at each angle.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// Simulated objects; earlier entries win where spans overlap
    pub objects: Vec<SceneObject>,
    /// Background return when no object covers the angle; `None` means no
    /// reflector at all, so acoustic pulses get no echo
    pub wall_distance_cm: Option<u32>,
}

impl Scene {
    /// Distance to whatever covers the given angle, if anything reflects
    pub fn distance_at(&self, degree: u16) -> Option<u32> {
        self.objects
            .iter()
            .find(|o| degree >= o.start_deg && degree <= o.end_deg)
            .map(|o| o.distance_cm)
            .or(self.wall_distance_cm)
    }
}
