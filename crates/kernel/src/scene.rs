use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use lightcone_common::{GeometryId, ObjectId, ObserverFrame, SpacetimeState};
use lightcone_geometry::{ConformalMap, Geometry, GeometryKind, Minkowski, ShapeParams};
use lightcone_optics::{
    OpticalDelaySolver, VisibilityWindow, doppler_factor, lorentz_factor, optical_position,
    relative_velocity,
};

use crate::SceneError;

/// An event record produced by every mutation to the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneEvent {
    GeometryAdded {
        id: GeometryId,
        name: String,
        kind: GeometryKind,
    },
    Spawned {
        id: ObjectId,
        geometry: Option<GeometryId>,
    },
    /// Removed by gameplay.
    Despawned { id: ObjectId },
    /// Removed because its optical time passed its death time.
    Destroyed { id: ObjectId, optical_time: f64 },
    /// The observer crossed inside this body's horizon.
    BecameInterior { geometry: GeometryId },
    /// Horizon enforcement clamped and froze the clock.
    HorizonFrozen {
        geometry: GeometryId,
        world_time: f64,
    },
    Evaporated { geometry: GeometryId },
    Stepped { tick: u64, world_time: f64 },
}

/// A rendered relativistic object.
///
/// `geometry == None` means the object moves through flat space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldObject {
    pub position: DVec3,
    pub velocity: DVec3,
    pub orientation: DQuat,
    pub birth_time: f64,
    /// 0 means the object never dies.
    pub death_time: f64,
    pub geometry: Option<GeometryId>,
    /// Proper time elapsed along the object's comoving worldline.
    #[serde(default)]
    pub proper_time: f64,
}

impl WorldObject {
    /// A resting, immortal object in flat space.
    pub fn at(position: DVec3) -> Self {
        Self {
            position,
            velocity: DVec3::ZERO,
            orientation: DQuat::IDENTITY,
            birth_time: 0.0,
            death_time: 0.0,
            geometry: None,
            proper_time: 0.0,
        }
    }

    pub fn with_velocity(mut self, velocity: DVec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_lifetime(mut self, birth_time: f64, death_time: f64) -> Self {
        self.birth_time = birth_time;
        self.death_time = death_time;
        self
    }

    pub fn in_geometry(mut self, geometry: GeometryId) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn window(&self) -> VisibilityWindow {
        VisibilityWindow::new(self.birth_time, self.death_time)
    }
}

/// A named gravitating body.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryEntry {
    pub name: String,
    pub geometry: Geometry,
}

/// What the observer sees of one object this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OpticalView {
    pub id: ObjectId,
    pub position: DVec3,
    pub orientation: DQuat,
    /// Retarded-time offset, never positive for sub-luminal objects.
    pub time_offset: f64,
    pub optical_time: f64,
    pub visible: bool,
    /// Lorentz factor of the object in the observer's rest frame.
    pub lorentz_factor: f64,
    pub doppler_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometryShape {
    pub id: GeometryId,
    pub name: String,
    pub shape: ShapeParams,
}

/// Everything handed to the rendering and gameplay layers after one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameOutput {
    pub tick: u64,
    pub world_time: f64,
    pub frozen: bool,
    pub objects: Vec<OpticalView>,
    pub shapes: Vec<GeometryShape>,
    pub destroyed: Vec<ObjectId>,
}

/// The authoritative simulation state.
///
/// Owns the shared [`SpacetimeState`] and is its clock driver. Uses BTreeMap
/// for deterministic iteration order, so a scene built from the same
/// configuration (including stochastic seeds) steps identically every run.
#[derive(Debug, Clone)]
pub struct Scene {
    state: SpacetimeState,
    geometries: BTreeMap<GeometryId, GeometryEntry>,
    objects: BTreeMap<ObjectId, WorldObject>,
    tick: u64,
    /// Append-only event log of all mutations.
    event_log: Vec<SceneEvent>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SpacetimeState::default())
    }
}

impl Scene {
    /// Create an empty scene driving `state`.
    pub fn new(state: SpacetimeState) -> Self {
        Self {
            state,
            geometries: BTreeMap::new(),
            objects: BTreeMap::new(),
            tick: 0,
            event_log: Vec::new(),
        }
    }

    /// Number of completed ticks.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Shared clock, constants and observer frame.
    pub fn state(&self) -> &SpacetimeState {
        &self.state
    }

    /// Current observer frame.
    pub fn observer(&self) -> &ObserverFrame {
        &self.state.observer
    }

    /// Gameplay moves the observer between ticks.
    pub fn observer_mut(&mut self) -> &mut ObserverFrame {
        &mut self.state.observer
    }

    /// Set the uniform field that drives Rindler geometries.
    pub fn set_ambient_acceleration(&mut self, acceleration: DVec3) {
        self.state.ambient_acceleration = acceleration;
    }

    /// Number of gravitating bodies.
    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    /// Number of live objects.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// All bodies, in id order.
    pub fn geometries(&self) -> &BTreeMap<GeometryId, GeometryEntry> {
        &self.geometries
    }

    /// All live objects, in id order.
    pub fn objects(&self) -> &BTreeMap<ObjectId, WorldObject> {
        &self.objects
    }

    /// Look up a body by id.
    pub fn geometry(&self, id: GeometryId) -> Option<&GeometryEntry> {
        self.geometries.get(&id)
    }

    /// Look up an object by id.
    pub fn get(&self, id: ObjectId) -> Option<&WorldObject> {
        self.objects.get(&id)
    }

    /// Mutable access to an object, for gameplay edits between ticks.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut WorldObject> {
        self.objects.get_mut(&id)
    }

    /// Events recorded since the last drain.
    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Add a named body and return its id.
    pub fn add_geometry(&mut self, name: impl Into<String>, geometry: Geometry) -> GeometryId {
        let id = GeometryId::new();
        let name = name.into();
        self.event_log.push(SceneEvent::GeometryAdded {
            id,
            name: name.clone(),
            kind: geometry.kind(),
        });
        self.geometries.insert(id, GeometryEntry { name, geometry });
        id
    }

    /// Spawn an object. Fails if it references a geometry this scene does not own.
    pub fn spawn(&mut self, object: WorldObject) -> Result<ObjectId, SceneError> {
        let id = ObjectId::new();
        self.spawn_with_id(id, object)?;
        Ok(id)
    }

    /// Spawn an object under a caller-chosen id, replacing any object with that id.
    pub fn spawn_with_id(&mut self, id: ObjectId, object: WorldObject) -> Result<(), SceneError> {
        if let Some(geometry) = object.geometry {
            if !self.geometries.contains_key(&geometry) {
                return Err(SceneError::UnknownGeometry(geometry));
            }
        }
        self.objects.insert(id, object);
        self.event_log.push(SceneEvent::Spawned {
            id,
            geometry: object.geometry,
        });
        Ok(())
    }

    /// Remove an object. Returns the removed object, if any.
    pub fn despawn(&mut self, id: ObjectId) -> Option<WorldObject> {
        let object = self.objects.remove(&id);
        if object.is_some() {
            self.event_log.push(SceneEvent::Despawned { id });
        }
        object
    }

    /// Change an object's inertial velocity.
    pub fn set_velocity(&mut self, id: ObjectId, velocity: DVec3) -> Result<(), SceneError> {
        let object = self
            .objects
            .get_mut(&id)
            .ok_or(SceneError::UnknownObject(id))?;
        object.velocity = velocity;
        Ok(())
    }

    /// Advance the scene by one tick of world time `dt`.
    ///
    /// Order: clock, geometry evolution, object comovement, optics, then
    /// destruction of objects whose death light has reached the observer.
    pub fn step(&mut self, dt: f64) -> FrameOutput {
        let span = tracing::info_span!("scene_step", tick = self.tick + 1, dt);
        let _enter = span.enter();

        self.state.advance(dt);
        self.tick += 1;

        self.evolve_geometries();
        self.move_objects();

        let mut frame = self.observe();
        for &id in &frame.destroyed {
            if self.objects.remove(&id).is_some() {
                let optical_time = frame
                    .objects
                    .iter()
                    .find(|view| view.id == id)
                    .map_or(self.state.total_world_time(), |view| view.optical_time);
                tracing::debug!(object = %id, optical_time, "object destroyed");
                self.event_log
                    .push(SceneEvent::Destroyed { id, optical_time });
            }
        }
        frame.objects.retain(|view| !frame.destroyed.contains(&view.id));

        self.event_log.push(SceneEvent::Stepped {
            tick: self.tick,
            world_time: self.state.total_world_time(),
        });
        tracing::trace!(
            world_time = self.state.total_world_time(),
            objects = self.objects.len(),
            frozen = self.state.is_movement_frozen(),
            "tick complete"
        );
        frame
    }

    fn evolve_geometries(&mut self) {
        for (&id, entry) in &mut self.geometries {
            let report = entry.geometry.evolve(&mut self.state);
            if report.became_interior {
                self.event_log
                    .push(SceneEvent::BecameInterior { geometry: id });
            }
            if report.froze_clock {
                self.event_log.push(SceneEvent::HorizonFrozen {
                    geometry: id,
                    world_time: self.state.total_world_time(),
                });
            }
            if report.fully_evaporated() {
                tracing::debug!(geometry = %id, name = %entry.name, "geometry evaporated");
                self.event_log
                    .push(SceneEvent::Evaporated { geometry: id });
            }
        }
    }

    fn move_objects(&mut self) {
        let dt = self.state.delta_world_time();
        if self.state.is_movement_frozen() || !dt.is_finite() || dt == 0.0 {
            return;
        }
        // Comovement integrates from the start of the tick.
        let mut start = self.state.clone();
        start.reset_clock(self.state.total_world_time() - dt);
        for object in self.objects.values_mut() {
            let inertial = object.position + object.velocity * dt;
            let map: &dyn ConformalMap =
                match object.geometry.and_then(|id| self.geometries.get(&id)) {
                    Some(entry) => &entry.geometry,
                    None => &Minkowski,
                };
            let (proper_time_delta, comoved) =
                map.comove_over_world_time(dt, inertial, object.orientation, &start);
            object.position = comoved.spatial();
            object.orientation = comoved.orientation;
            object.proper_time += proper_time_delta;
        }
    }

    /// Optical views of every object and the shape of every geometry, as the
    /// observer perceives them at the current world time.
    pub fn observe(&self) -> FrameOutput {
        let c = self.state.speed_of_light();
        let world_time = self.state.total_world_time();
        let observer = self.state.observer;
        let solver = OpticalDelaySolver::for_observer(&observer, c);

        let mut objects = Vec::with_capacity(self.objects.len());
        let mut destroyed = Vec::new();
        for (&id, object) in &self.objects {
            let relative = object.position - observer.position;
            let time_offset = solver.offset(relative, object.velocity);
            let optical_time = world_time + time_offset;
            let window = object.window();
            if window.should_destroy(optical_time) {
                destroyed.push(id);
            }
            let position = optical_position(object.position, object.velocity, time_offset);
            let seen_velocity = relative_velocity(object.velocity, observer.velocity, c);
            objects.push(OpticalView {
                id,
                position,
                orientation: object.orientation,
                time_offset,
                optical_time,
                visible: window.is_visible(optical_time),
                lorentz_factor: lorentz_factor(seen_velocity, c),
                doppler_factor: doppler_factor(seen_velocity, position - observer.position, c),
            });
        }

        let shapes = self
            .geometries
            .iter()
            .map(|(&id, entry)| GeometryShape {
                id,
                name: entry.name.clone(),
                shape: entry.geometry.shape(&self.state),
            })
            .collect();

        FrameOutput {
            tick: self.tick,
            world_time,
            frozen: self.state.is_movement_frozen(),
            objects,
            shapes,
            destroyed,
        }
    }

    /// Deterministic hash of the scene's dynamic state for comparing runs.
    /// Uses canonical (BTreeMap) iteration order; ids are excluded so that two
    /// scenes built from the same configuration compare equal.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, value: f64| {
            for b in value.to_le_bytes() {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, self.tick as f64);
        mix(&mut h, self.state.total_world_time());
        for entry in self.geometries.values() {
            let shape = entry.geometry.shape(&self.state);
            mix(&mut h, shape.radius);
            mix(&mut h, shape.spin_fraction);
            mix(&mut h, shape.charge);
        }
        for object in self.objects.values() {
            for v in object.position.to_array() {
                mix(&mut h, v);
            }
        }
        h
    }
}
