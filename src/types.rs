use serde::{Deserialize, Deserializer, Serialize};

/// Axis-aligned rectangle in panel coordinates, millimetres.
/// `y` grows downward: the top edge of the panel is `y == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    pub fn right(&self) -> u32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }

    pub fn contains_size(&self, w: u32, h: u32) -> bool {
        self.w >= w && self.h >= h
    }

    /// Strict interior overlap. Rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.right() <= other.x
            || other.right() <= self.x
            || self.bottom() <= other.y
            || other.bottom() <= self.y)
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}@({},{})", self.w, self.h, self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Original,
    Rotated,
}

impl Orientation {
    pub fn is_rotated(&self) -> bool {
        matches!(self, Orientation::Rotated)
    }
}

/// One line of demand: a size, a quantity and a rotation policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceType {
    #[serde(rename = "id")]
    pub type_id: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub width: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub height: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub quantity: u32,
    #[serde(default = "default_true")]
    pub rotation_allowed: bool,
}

/// A single unit expanded out of a `PieceType`. `piece_id` is a global
/// ordinal over the whole expansion, assigned before sorting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    pub piece_id: usize,
    pub type_id: u32,
    pub w: u32,
    pub h: u32,
    pub rotation_allowed: bool,
}

impl Piece {
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
}

/// A committed cut: oriented dimensions, so `w`/`h` are swapped from the
/// piece type when `orientation` is `Rotated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub piece_id: usize,
    pub type_id: u32,
    pub orientation: Orientation,
    pub panel_index: usize,
}

impl Placement {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub panel_count: usize,
    pub total_used_area: u64,
    pub total_waste_area: u64,
    pub total_panel_area: u64,
    pub used_percentage: f64,
    pub waste_percentage: f64,
    pub usable_waste_area: u64,
    pub min_waste_size: u32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PanelDims {
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub width: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub height: u32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(
        default = "default_min_waste",
        deserialize_with = "deserialize_u32_from_number"
    )]
    pub min_waste_size: u32,
    #[serde(default)]
    pub poignet_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_waste_size: default_min_waste(),
            poignet_enabled: false,
        }
    }
}

/// The full optimization request of one run.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CutConfig {
    pub panel: PanelDims,
    #[serde(default)]
    pub settings: Settings,
    pub pieces: Vec<PieceType>,
}

fn default_true() -> bool {
    true
}

fn default_min_waste() -> u32 {
    100
}

/// Accepts both `600` and `600.0` for millimetre fields; callers post either.
pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() || value < 0.0 || value > u32::MAX as f64 || value.fract() != 0.0 {
        return Err(serde::de::Error::custom(format!(
            "expected a non-negative whole number, got {value}"
        )));
    }
    Ok(value as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area() {
        assert_eq!(Rect::new(0, 0, 200, 150).area(), 30_000);
        // Areas of large panels exceed u32.
        assert_eq!(Rect::new(0, 0, 100_000, 100_000).area(), 10_000_000_000);
    }

    #[test]
    fn test_contains_size() {
        let r = Rect::new(10, 10, 100, 50);
        assert!(r.contains_size(100, 50));
        assert!(r.contains_size(99, 50));
        assert!(!r.contains_size(101, 50));
        assert!(!r.contains_size(100, 51));
    }

    #[test]
    fn test_overlaps_strict_interior() {
        let a = Rect::new(0, 0, 100, 100);
        assert!(a.overlaps(&Rect::new(50, 50, 100, 100)));
        assert!(a.overlaps(&Rect::new(10, 10, 10, 10)));
        // Sharing an edge is not an overlap.
        assert!(!a.overlaps(&Rect::new(100, 0, 50, 100)));
        assert!(!a.overlaps(&Rect::new(0, 100, 100, 50)));
        assert!(!a.overlaps(&Rect::new(200, 200, 10, 10)));
    }

    #[test]
    fn test_config_defaults() {
        let json = r#"{
            "panel": { "width": 2440, "height": 1220 },
            "pieces": [ { "id": 7, "width": 600, "height": 400.0, "quantity": 3 } ]
        }"#;
        let config: CutConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.panel.width, 2440);
        assert_eq!(config.settings.min_waste_size, 100);
        assert!(!config.settings.poignet_enabled);
        assert_eq!(config.pieces[0].type_id, 7);
        assert_eq!(config.pieces[0].height, 400);
        assert!(config.pieces[0].rotation_allowed);
    }

    #[test]
    fn test_config_explicit_settings() {
        let json = r#"{
            "panel": { "width": 1000, "height": 500 },
            "settings": { "minWasteSize": 50, "poignetEnabled": true },
            "pieces": [ { "id": 0, "width": 400, "height": 100, "quantity": 3, "rotationAllowed": false } ]
        }"#;
        let config: CutConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.settings.min_waste_size, 50);
        assert!(config.settings.poignet_enabled);
        assert!(!config.pieces[0].rotation_allowed);
    }

    #[test]
    fn test_rejects_fractional_dimension() {
        let json = r#"{
            "panel": { "width": 2440.5, "height": 1220 },
            "pieces": []
        }"#;
        assert!(serde_json::from_str::<CutConfig>(json).is_err());
    }
}
