//! Observer registry - resize and mutation observation.
//!
//! Registrations live in the [`Host`](super::Host); callers hold an
//! [`ObserverHandle`](super::ObserverHandle) and disconnect through it.

use std::rc::Rc;

use crate::layout::{Document, ElementId, MutationKind, MutationRecord};
use crate::types::Rect;

bitflags::bitflags! {
    /// Which mutations a mutation observer receives.
    ///
    /// Combine with bitwise OR: `ObserveFlags::CHILD_LIST | ObserveFlags::SUBTREE`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ObserveFlags: u8 {
        const CHILD_LIST = 1 << 0;
        const ATTRIBUTES = 1 << 1;
        const CHARACTER_DATA = 1 << 2;
        /// Also observe every descendant of the target.
        const SUBTREE = 1 << 3;
    }
}

impl ObserveFlags {
    fn selects(self, kind: MutationKind) -> bool {
        match kind {
            MutationKind::ChildList => self.contains(Self::CHILD_LIST),
            MutationKind::Attributes => self.contains(Self::ATTRIBUTES),
            MutationKind::CharacterData => self.contains(Self::CHARACTER_DATA),
        }
    }
}

/// One resize observation: the element's new border box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeEntry {
    pub target: ElementId,
    pub rect: Rect,
}

/// Identifies an observer registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

pub(crate) type MutationCallback = Rc<dyn Fn(&[MutationRecord])>;
pub(crate) type ResizeCallback = Rc<dyn Fn(&[ResizeEntry])>;

struct MutationRegistration {
    id: ObserverId,
    target: ElementId,
    flags: ObserveFlags,
    callback: MutationCallback,
}

struct ResizeRegistration {
    id: ObserverId,
    target: ElementId,
    last_size: Option<(f32, f32)>,
    callback: ResizeCallback,
}

#[derive(Default)]
pub(crate) struct ObserverRegistry {
    next_id: u64,
    mutation: Vec<MutationRegistration>,
    resize: Vec<ResizeRegistration>,
}

impl ObserverRegistry {
    fn allocate_id(&mut self) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn add_mutation(
        &mut self,
        target: ElementId,
        flags: ObserveFlags,
        callback: MutationCallback,
    ) -> ObserverId {
        let id = self.allocate_id();
        self.mutation.push(MutationRegistration {
            id,
            target,
            flags,
            callback,
        });
        id
    }

    pub fn add_resize(&mut self, target: ElementId, callback: ResizeCallback) -> ObserverId {
        let id = self.allocate_id();
        self.resize.push(ResizeRegistration {
            id,
            target,
            last_size: None,
            callback,
        });
        id
    }

    pub fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.mutation.len() + self.resize.len();
        self.mutation.retain(|r| r.id != id);
        self.resize.retain(|r| r.id != id);
        before != self.mutation.len() + self.resize.len()
    }

    pub fn contains(&self, id: ObserverId) -> bool {
        self.mutation.iter().any(|r| r.id == id) || self.resize.iter().any(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.mutation.len() + self.resize.len()
    }

    /// Group `records` per mutation registration that wants them.
    pub fn match_mutations(
        &self,
        doc: &Document,
        records: &[MutationRecord],
    ) -> Vec<(ObserverId, MutationCallback, Vec<MutationRecord>)> {
        self.mutation
            .iter()
            .filter_map(|registration| {
                let matched: Vec<MutationRecord> = records
                    .iter()
                    .filter(|record| record_matches(doc, record, registration.target, registration.flags))
                    .cloned()
                    .collect();
                if matched.is_empty() {
                    None
                } else {
                    Some((registration.id, registration.callback.clone(), matched))
                }
            })
            .collect()
    }

    /// Collect resize entries for every observed element whose size changed
    /// since it was last reported, updating the reported size.
    pub fn collect_resizes(
        &mut self,
        doc: &mut Document,
    ) -> crate::error::Result<Vec<(ObserverId, ResizeCallback, ResizeEntry)>> {
        let mut due = Vec::new();
        for registration in &mut self.resize {
            if !doc.exists(registration.target) {
                continue;
            }
            let rect = doc.bounding_client_rect(registration.target)?;
            let size = rect.size();
            if registration.last_size == Some(size) {
                continue;
            }
            registration.last_size = Some(size);
            due.push((
                registration.id,
                registration.callback.clone(),
                ResizeEntry {
                    target: registration.target,
                    rect,
                },
            ));
        }
        Ok(due)
    }
}

fn record_matches(
    doc: &Document,
    record: &MutationRecord,
    target: ElementId,
    flags: ObserveFlags,
) -> bool {
    if !flags.selects(record.kind) {
        return false;
    }
    if record.target == target {
        return true;
    }
    flags.contains(ObserveFlags::SUBTREE) && doc.contains(target, record.target)
}
