//! Scene: entity arena, camera and per-frame behaviour updates
//!
//! Entities live in a flat `Vec` and refer to their children by index, so
//! the tree has a single owner and no reference counting. Behaviour is a
//! plain enum matched in [`Scene::update`].

use crate::rasterizer::{Mat4, MeshHandle, Scalar, Vec3};

use super::InputState;

/// Index of an entity in its scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub usize);

/// What an entity does each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Behavior {
    Static,
    /// Constant angular velocity, radians per second around each axis
    Spin { rate: Vec3 },
    /// Free-flying viewpoint driven by the input snapshot. The scene camera
    /// snaps to this entity after it moves.
    FlyCamera {
        /// Units per second
        move_speed: Scalar,
        /// Radians per pixel of mouse movement
        turn_speed: Scalar,
    },
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub position: Vec3,
    /// Euler angles, applied as X * Y * Z
    pub rotation: Vec3,
    pub children: Vec<EntityId>,
    pub meshes: Vec<MeshHandle>,
    pub behavior: Behavior,
}

impl Default for Entity {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            children: Vec::new(),
            meshes: Vec::new(),
            behavior: Behavior::Static,
        }
    }
}

impl Entity {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_mesh(mut self, mesh: MeshHandle) -> Self {
        self.meshes.push(mesh);
        self
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }
}

/// Viewpoint. `rotation.x` is pitch and `rotation.y` is yaw; roll is ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::from_ints(0, 0, -5),
            rotation: Vec3::ZERO,
        }
    }
}

impl Camera {
    /// Pitch limit (about 86 degrees); looking straight up or down would make
    /// the view direction parallel to the up vector.
    pub const MAX_PITCH: Scalar = Scalar::from_bits(98_304);

    pub fn new(position: Vec3, rotation: Vec3) -> Self {
        Self { position, rotation }
    }

    /// Unit view direction: pitch first, then yaw
    pub fn forward(&self) -> Vec3 {
        let pitch = self.rotation.x.clamp(-Self::MAX_PITCH, Self::MAX_PITCH);
        let turn = Mat4::rotation_y(self.rotation.y) * Mat4::rotation_x(pitch);
        (turn * Vec3::FORWARD.to_direction()).xyz()
    }

    /// `None` only if the orientation is degenerate
    pub fn view_matrix(&self) -> Option<Mat4> {
        Mat4::look_at(self.position, self.position + self.forward(), Vec3::UP)
    }
}

pub struct Scene {
    entities: Vec<Entity>,
    root: EntityId,
    pub camera: Camera,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Empty scene holding only a static root at the origin
    pub fn new() -> Self {
        Self {
            entities: vec![Entity::default()],
            root: EntityId(0),
            camera: Camera::default(),
        }
    }

    pub fn root(&self) -> EntityId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.0)
    }

    /// Add `entity` under `parent`. Returns `None` if the parent does not exist.
    pub fn spawn(&mut self, parent: EntityId, entity: Entity) -> Option<EntityId> {
        if parent.0 >= self.entities.len() {
            tracing::warn!("Cannot spawn under missing parent {:?}", parent);
            return None;
        }
        let id = EntityId(self.entities.len());
        self.entities.push(entity);
        self.entities[parent.0].children.push(id);
        Some(id)
    }

    /// Advance every entity by `dt` seconds, parents before children
    pub fn update(&mut self, dt: Scalar, input: &InputState) {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let entity = &mut self.entities[id.0];
            match entity.behavior {
                Behavior::Static => {}
                Behavior::Spin { rate } => {
                    entity.rotation = entity.rotation + rate * dt;
                }
                Behavior::FlyCamera { move_speed, turn_speed } => {
                    fly(entity, dt, input, move_speed, turn_speed);
                    self.camera = Camera::new(entity.position, entity.rotation);
                }
            }
            // Reversed so the first child is visited first
            stack.extend(entity.children.iter().rev());
        }
    }

    /// Call `f` for every mesh in draw order: children first (depth first),
    /// then the entity's own meshes.
    pub fn visit_meshes<F: FnMut(&Entity, MeshHandle)>(&self, mut f: F) {
        self.visit_from(self.root, &mut f);
    }

    fn visit_from<F: FnMut(&Entity, MeshHandle)>(&self, id: EntityId, f: &mut F) {
        let Some(entity) = self.entities.get(id.0) else {
            return;
        };
        for &child in &entity.children {
            self.visit_from(child, f);
        }
        for &mesh in &entity.meshes {
            f(entity, mesh);
        }
    }
}

/// Mouse look plus ground-plane movement relative to yaw
fn fly(entity: &mut Entity, dt: Scalar, input: &InputState, move_speed: Scalar, turn_speed: Scalar) {
    let yaw = entity.rotation.y - Scalar::from_f32(input.look_dx) * turn_speed;
    let pitch = (entity.rotation.x - Scalar::from_f32(input.look_dy) * turn_speed)
        .clamp(-Camera::MAX_PITCH, Camera::MAX_PITCH);
    entity.rotation = Vec3::new(pitch, yaw, Scalar::ZERO);

    let (strafe, advance) = input.move_axes();
    if (strafe, advance) == (0, 0) {
        return;
    }
    let (s, c) = (yaw.sin(), yaw.cos());
    let forward = Vec3::new(-s, Scalar::ZERO, c);
    let right = Vec3::new(c, Scalar::ZERO, s);
    let direction = forward * Scalar::from_int(advance) + right * Scalar::from_int(strafe);
    let step = direction.normalize() * (move_speed * dt);
    entity.position = entity.position + step;
}
