use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::Shape;
use crate::error::{MotionError, MotionResult};

/// Opaque handle to one retained shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShapeId(u64);

/// Opaque handle to one scene container (render layer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(u64);

#[derive(Debug)]
struct ShapeSlot {
    shape: Shape,
    parent: ContainerId,
}

#[derive(Debug)]
struct Container {
    children: Vec<ShapeId>,
    opacity: f64,
}

/// Retained scene: containers drawn in creation order, shapes drawn in
/// child-list order within their container.
///
/// Z-ordering is purely positional. Re-parenting a shape appends it to the
/// end of the target container's child list, so staged deletions and fresh
/// inserts render above everything that was already committed.
#[derive(Debug, Default)]
pub struct Scene {
    shapes: IndexMap<ShapeId, ShapeSlot>,
    containers: IndexMap<ContainerId, Container>,
    container_order: Vec<ContainerId>,
    next_shape: u64,
    next_container: u64,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new empty container above all existing ones.
    pub fn add_container(&mut self) -> ContainerId {
        let id = ContainerId(self.next_container);
        self.next_container += 1;
        self.containers.insert(
            id,
            Container {
                children: Vec::new(),
                opacity: 1.0,
            },
        );
        self.container_order.push(id);
        id
    }

    /// Removes a container together with every shape still parented to it.
    pub fn remove_container(&mut self, id: ContainerId) -> MotionResult<Vec<ShapeId>> {
        let container = self
            .containers
            .shift_remove(&id)
            .ok_or(MotionError::UnknownContainer(id))?;
        self.container_order.retain(|entry| *entry != id);
        for child in &container.children {
            self.shapes.shift_remove(child);
        }
        Ok(container.children)
    }

    pub fn spawn(&mut self, container: ContainerId, shape: Shape) -> MotionResult<ShapeId> {
        if !self.containers.contains_key(&container) {
            return Err(MotionError::UnknownContainer(container));
        }
        let id = ShapeId(self.next_shape);
        self.next_shape += 1;
        self.shapes.insert(
            id,
            ShapeSlot {
                shape,
                parent: container,
            },
        );
        self.containers
            .get_mut(&container)
            .ok_or(MotionError::UnknownContainer(container))?
            .children
            .push(id);
        Ok(id)
    }

    pub fn remove_shape(&mut self, id: ShapeId) -> MotionResult<Shape> {
        let slot = self
            .shapes
            .shift_remove(&id)
            .ok_or(MotionError::UnknownShape(id))?;
        if let Some(container) = self.containers.get_mut(&slot.parent) {
            container.children.retain(|child| *child != id);
        }
        Ok(slot.shape)
    }

    /// Moves a shape to the end of `target`'s child list (top of that layer).
    pub fn reparent(&mut self, id: ShapeId, target: ContainerId) -> MotionResult<()> {
        if !self.containers.contains_key(&target) {
            return Err(MotionError::UnknownContainer(target));
        }
        let slot = self.shapes.get_mut(&id).ok_or(MotionError::UnknownShape(id))?;
        let previous = slot.parent;
        slot.parent = target;
        if let Some(container) = self.containers.get_mut(&previous) {
            container.children.retain(|child| *child != id);
        }
        self.containers
            .get_mut(&target)
            .ok_or(MotionError::UnknownContainer(target))?
            .children
            .push(id);
        Ok(())
    }

    /// Moves a shape to the top of its own container.
    pub fn raise_to_top(&mut self, id: ShapeId) -> MotionResult<()> {
        let parent = self
            .shapes
            .get(&id)
            .ok_or(MotionError::UnknownShape(id))?
            .parent;
        let container = self
            .containers
            .get_mut(&parent)
            .ok_or(MotionError::UnknownContainer(parent))?;
        container.children.retain(|child| *child != id);
        container.children.push(id);
        Ok(())
    }

    pub fn shape(&self, id: ShapeId) -> MotionResult<&Shape> {
        self.shapes
            .get(&id)
            .map(|slot| &slot.shape)
            .ok_or(MotionError::UnknownShape(id))
    }

    pub fn shape_mut(&mut self, id: ShapeId) -> MotionResult<&mut Shape> {
        self.shapes
            .get_mut(&id)
            .map(|slot| &mut slot.shape)
            .ok_or(MotionError::UnknownShape(id))
    }

    #[must_use]
    pub fn contains(&self, id: ShapeId) -> bool {
        self.shapes.contains_key(&id)
    }

    pub fn parent_of(&self, id: ShapeId) -> MotionResult<ContainerId> {
        self.shapes
            .get(&id)
            .map(|slot| slot.parent)
            .ok_or(MotionError::UnknownShape(id))
    }

    pub fn children_of(&self, container: ContainerId) -> MotionResult<&[ShapeId]> {
        self.containers
            .get(&container)
            .map(|entry| entry.children.as_slice())
            .ok_or(MotionError::UnknownContainer(container))
    }

    pub fn container_opacity(&self, container: ContainerId) -> MotionResult<f64> {
        self.containers
            .get(&container)
            .map(|entry| entry.opacity)
            .ok_or(MotionError::UnknownContainer(container))
    }

    pub fn set_container_opacity(
        &mut self,
        container: ContainerId,
        opacity: f64,
    ) -> MotionResult<()> {
        self.containers
            .get_mut(&container)
            .ok_or(MotionError::UnknownContainer(container))?
            .opacity = opacity.clamp(0.0, 1.0);
        Ok(())
    }

    /// Host-facing composite opacity (shape × owning container).
    pub fn effective_opacity(&self, id: ShapeId) -> MotionResult<f64> {
        let slot = self.shapes.get(&id).ok_or(MotionError::UnknownShape(id))?;
        let container_opacity = self.container_opacity(slot.parent)?;
        Ok(slot.shape.opacity() * container_opacity)
    }

    #[must_use]
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Containers in draw order, bottom to top.
    #[must_use]
    pub fn containers(&self) -> &[ContainerId] {
        &self.container_order
    }
}
