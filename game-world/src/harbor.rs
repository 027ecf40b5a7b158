//! Harbor registry: boundary collaborator loaded at startup. Harbors never
//! move or get created/destroyed at runtime.

use serde::Deserialize;

use game_types::Vec2;

use crate::ids::HarborId;

#[derive(Debug, Deserialize)]
struct HarborDoc {
    id: u64,
    #[serde(alias = "tileX")]
    x: f64,
    #[serde(alias = "tileY")]
    y: f64,
    #[serde(default = "default_radius")]
    radius: f64,
    name: String,
    #[serde(default)]
    island_id: u64,
    #[serde(default)]
    exit_direction: Option<Vec2>,
}

fn default_radius() -> f64 {
    96.0
}

#[derive(Debug, Clone)]
pub struct Harbor {
    pub id: HarborId,
    pub pos: Vec2,
    pub radius: f64,
    pub name: String,
    pub island_id: u64,
    /// Unit vector used to place a departing ship away from land.
    pub exit_direction: Vec2,
}

#[derive(Debug, Clone, Default)]
pub struct HarborRegistry {
    harbors: Vec<Harbor>,
}

impl HarborRegistry {
    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        let docs: Vec<HarborDoc> = serde_json::from_str(data)?;
        let harbors = docs
            .into_iter()
            .map(|d| Harbor {
                id: HarborId(d.id),
                pos: Vec2::new(d.x, d.y),
                radius: d.radius,
                name: d.name,
                island_id: d.island_id,
                exit_direction: d.exit_direction.unwrap_or(Vec2::new(0.0, -1.0)),
            })
            .collect();
        Ok(Self { harbors })
    }

    pub fn get(&self, id: HarborId) -> Option<&Harbor> {
        self.harbors.iter().find(|h| h.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Harbor> {
        self.harbors.iter()
    }

    pub fn nearest(&self, pos: Vec2) -> Option<&Harbor> {
        self.harbors
            .iter()
            .min_by(|a, b| a.pos.dist_sq(pos).partial_cmp(&b.pos.dist_sq(pos)).unwrap())
    }

    pub fn within_radius(&self, pos: Vec2) -> Option<&Harbor> {
        self.harbors.iter().find(|h| pos.dist_sq(h.pos) <= h.radius * h.radius)
    }
}
