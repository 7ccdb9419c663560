//! Component Storage
//!
//! `ComponentStorage<T>` is a sparse array indexed by entity slot. Each
//! occupied cell remembers the generation of the entity that owns it, so a
//! stale handle to a recycled slot reads `None` instead of somebody else's
//! component.

use super::entity::Entity;

struct Cell<T> {
    generation: u32,
    value: T,
}

pub struct ComponentStorage<T> {
    cells: Vec<Option<Cell<T>>>,
}

impl<T> ComponentStorage<T> {
    pub fn new() -> Self {
        Self { cells: Vec::new() }
    }

    /// Insert or replace an entity's component, returning the previous one.
    pub fn insert(&mut self, entity: Entity, value: T) -> Option<T> {
        let idx = entity.index() as usize;
        if idx >= self.cells.len() {
            self.cells.resize_with(idx + 1, || None);
        }
        let previous = self.cells[idx].take();
        self.cells[idx] = Some(Cell { generation: entity.generation(), value });
        previous
            .filter(|cell| cell.generation == entity.generation())
            .map(|cell| cell.value)
    }

    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let cell = self.cells.get_mut(entity.index() as usize)?;
        if cell.as_ref().is_some_and(|c| c.generation == entity.generation()) {
            cell.take().map(|c| c.value)
        } else {
            None
        }
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        match self.cells.get(entity.index() as usize)? {
            Some(cell) if cell.generation == entity.generation() => Some(&cell.value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        match self.cells.get_mut(entity.index() as usize)? {
            Some(cell) if cell.generation == entity.generation() => Some(&mut cell.value),
            _ => None,
        }
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.get(entity).is_some()
    }

    /// Iterate (owner, component) pairs in ascending entity order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.cells.iter().enumerate().filter_map(|(idx, cell)| {
            cell.as_ref()
                .map(|c| (Entity::new(idx as u32, c.generation), &c.value))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.cells.iter_mut().enumerate().filter_map(|(idx, cell)| {
            cell.as_mut()
                .map(|c| (Entity::new(idx as u32, c.generation), &mut c.value))
        })
    }

    /// Owners only, collected so callers can mutate the world while walking them.
    pub fn entities(&self) -> Vec<Entity> {
        self.iter().map(|(e, _)| e).collect()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

impl<T> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}
