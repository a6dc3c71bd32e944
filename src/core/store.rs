use crate::core::rigidbody::RigidBody;

/// Dense, insertion-ordered body identifier.
///
/// Ids double as the stable ordering key for broadphase pair deduplication;
/// memory addresses never enter any identity or ordering decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(pub(crate) u32);

impl BodyId {
    pub(crate) const INVALID: BodyId = BodyId(u32::MAX);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Default for BodyId {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Insertion-ordered container owning every body in a world.
///
/// Bodies live until the world is dropped; ids are dense indices handed out
/// at insertion and never reused or invalidated.
#[derive(Default)]
pub struct BodyStore {
    bodies: Vec<RigidBody>,
}

impl BodyStore {
    pub fn new() -> Self {
        Self { bodies: Vec::new() }
    }

    pub fn insert(&mut self, mut body: RigidBody) -> BodyId {
        let id = BodyId(self.bodies.len() as u32);
        body.id = id;
        self.bodies.push(body);
        id
    }

    pub fn get(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(id.index())
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(id.index())
    }

    /// Disjoint mutable borrow of two bodies. `None` when the ids are equal
    /// or out of range.
    pub fn get2_mut(&mut self, a: BodyId, b: BodyId) -> Option<(&mut RigidBody, &mut RigidBody)> {
        let (ia, ib) = (a.index(), b.index());
        if ia == ib || ia >= self.bodies.len() || ib >= self.bodies.len() {
            return None;
        }

        if ia < ib {
            let (left, right) = self.bodies.split_at_mut(ib);
            Some((&mut left[ia], &mut right[0]))
        } else {
            let (left, right) = self.bodies.split_at_mut(ia);
            Some((&mut right[0], &mut left[ib]))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RigidBody> {
        self.bodies.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RigidBody> {
        self.bodies.iter_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        (0..self.bodies.len() as u32).map(BodyId)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}
