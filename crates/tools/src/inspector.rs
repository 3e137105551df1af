use glam::DVec3;

use lightcone_common::{GeometryId, ObjectId};
use lightcone_geometry::{ConformalMap, GeometryKind};
use lightcone_kernel::Scene;

/// Read-only queries against a scene for debugging and development UI.
pub struct SceneInspector;

impl SceneInspector {
    pub fn summary(scene: &Scene) -> SceneSummary {
        let state = scene.state();
        SceneSummary {
            tick: scene.tick(),
            world_time: state.total_world_time(),
            frozen: state.is_movement_frozen(),
            geometry_count: scene.geometry_count(),
            object_count: scene.object_count(),
            pending_events: scene.events().len(),
        }
    }

    pub fn list_geometries(scene: &Scene) -> Vec<GeometryInfo> {
        scene
            .geometries()
            .iter()
            .map(|(&id, entry)| {
                let shape = entry.geometry.shape(scene.state());
                GeometryInfo {
                    id,
                    name: entry.name.clone(),
                    kind: shape.kind,
                    radius: shape.radius,
                    spin_fraction: shape.spin_fraction,
                    charge: shape.charge,
                    is_exterior: shape.is_exterior,
                }
            })
            .collect()
    }

    pub fn inspect_object(scene: &Scene, id: ObjectId) -> Option<ObjectInfo> {
        scene.get(id).map(|object| {
            let geometry = object.geometry.and_then(|g| scene.geometry(g));
            let acceleration = geometry.map_or(DVec3::ZERO, |entry| {
                entry
                    .geometry
                    .local_acceleration(object.position, scene.state())
            });
            ObjectInfo {
                id,
                position: object.position.to_array(),
                velocity: object.velocity.to_array(),
                geometry: geometry.map(|entry| entry.name.clone()),
                hold_acceleration: acceleration.length(),
                proper_time: object.proper_time,
            }
        })
    }

    pub fn list_objects(scene: &Scene) -> Vec<ObjectId> {
        scene.objects().keys().copied().collect()
    }
}

#[derive(Debug, Clone)]
pub struct SceneSummary {
    pub tick: u64,
    pub world_time: f64,
    pub frozen: bool,
    pub geometry_count: usize,
    pub object_count: usize,
    pub pending_events: usize,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: tick={} t={:.6} frozen={} geometries={} objects={} pending_events={}",
            self.tick,
            self.world_time,
            self.frozen,
            self.geometry_count,
            self.object_count,
            self.pending_events
        )
    }
}

#[derive(Debug, Clone)]
pub struct GeometryInfo {
    pub id: GeometryId,
    pub name: String,
    pub kind: GeometryKind,
    pub radius: f64,
    pub spin_fraction: f64,
    pub charge: f64,
    pub is_exterior: bool,
}

impl std::fmt::Display for GeometryInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Geometry [{}] {} ({}) r={:.6e} spin={:.3} charge={:.3e} {}",
            self.id,
            self.name,
            self.kind,
            self.radius,
            self.spin_fraction,
            self.charge,
            if self.is_exterior { "exterior" } else { "interior" },
        )
    }
}

/// Detailed info about a single object.
#[derive(Debug, Clone)]
pub struct ObjectInfo {
    pub id: ObjectId,
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    pub geometry: Option<String>,
    /// Proper acceleration needed to hold the object static where it is.
    pub hold_acceleration: f64,
    pub proper_time: f64,
}

impl std::fmt::Display for ObjectInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Object [{}] pos=({:.3}, {:.3}, {:.3}) vel=({:.3}, {:.3}, {:.3}) in {} hold={:.3e} tau={:.3}",
            self.id,
            self.position[0],
            self.position[1],
            self.position[2],
            self.velocity[0],
            self.velocity[1],
            self.velocity[2],
            self.geometry.as_deref().unwrap_or("flat space"),
            self.hold_acceleration,
            self.proper_time,
        )
    }
}
