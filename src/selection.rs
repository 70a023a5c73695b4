//! Post-sweep object selection
//!
//! Reduces a finalized object list to the single best approach candidate.
//! Implausibly narrow objects and objects beyond the trustworthy range are
//! discarded; among the rest the narrowest wins. When nothing qualifies the
//! selector says so explicitly instead of falling back to an arbitrary
//! entry.

use crate::config::SelectionConfig;
use crate::segmentation::Object;

/// Filters spurious detections and picks the best qualifying object.
pub struct ObjectSelector {
    config: SelectionConfig,
}

impl ObjectSelector {
    /// Create a selector with the given filter thresholds
    pub fn new(config: SelectionConfig) -> Self {
        Self { config }
    }

    /// Whether an object passes the plausibility filters
    fn qualifies(&self, object: &Object) -> bool {
        object.cm_width > self.config.min_width_cm
            && object.cm_distance <= self.config.max_distance_cm
    }

    /// Pick the narrowest qualifying object.
    ///
    /// Ties resolve to the first encountered, which for a segmenter-ordered
    /// list is the lowest degree position. Returns `None` when no object
    /// survives filtering.
    pub fn select(&self, objects: &[Object]) -> Option<Object> {
        let mut best: Option<&Object> = None;
        for object in objects {
            if !self.qualifies(object) {
                continue;
            }
            match best {
                Some(current) if object.cm_width >= current.cm_width => {}
                _ => best = Some(object),
            }
        }
        best.copied()
    }
}
