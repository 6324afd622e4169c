/// One row of engine output, decoded into named fields.
///
/// Box coordinates are fractions of the frame width/height, ordered
/// `x1, y1, x2, y2`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawDetection {
    pub class_index: i64,
    pub confidence: f32,
    pub normalized_box: [f32; 4],
}

/// Axis-aligned box in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
}

impl BoundingBox {
    pub fn new(start_x: i32, start_y: i32, end_x: i32, end_y: i32) -> Self {
        Self {
            start_x,
            start_y,
            end_x,
            end_y,
        }
    }

    /// Scale a normalized box by `(W, H, W, H)` and truncate each coordinate.
    pub fn from_normalized(normalized: [f32; 4], width: u32, height: u32) -> Self {
        let w = width as f64;
        let h = height as f64;
        Self {
            start_x: (normalized[0] as f64 * w) as i32,
            start_y: (normalized[1] as f64 * h) as i32,
            end_x: (normalized[2] as f64 * w) as i32,
            end_y: (normalized[3] as f64 * h) as i32,
        }
    }

    /// Integer midpoint, truncated toward zero.
    pub fn centroid(&self) -> Centroid {
        Centroid {
            x: ((self.start_x as i64 + self.end_x as i64) / 2) as i32,
            y: ((self.start_y as i64 + self.end_y as i64) / 2) as i32,
        }
    }

    pub fn width(&self) -> i32 {
        self.end_x - self.start_x
    }

    pub fn height(&self) -> i32 {
        self.end_y - self.start_y
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Centroid {
    pub x: i32,
    pub y: i32,
}

impl Centroid {
    pub fn distance_to(&self, other: &Centroid) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A person found in one frame. Immutable once built: the centroid is always
/// derived from the box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    confidence: f32,
    bbox: BoundingBox,
    centroid: Centroid,
}

impl Detection {
    pub fn new(confidence: f32, bbox: BoundingBox) -> Self {
        Self {
            confidence,
            bbox,
            centroid: bbox.centroid(),
        }
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    pub fn centroid(&self) -> Centroid {
        self.centroid
    }
}

/// Detections for one frame, in engine output order. The index is the
/// per-frame identity used by `ViolationSet`.
pub type DetectionList = Vec<Detection>;
