use crate::domain::identity::Identity;
use crate::infrastructure::graphql::GraphqlSession;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Lifecycle state of one registered login
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Registered, no identity created yet
    Uncreated,
    /// Reserved by an `acquire` that is creating or authenticating its identity
    Provisioning,
    /// Identity exists but no session is bound yet
    Created,
    Clean,
    CheckedOut,
    Dirty,
    /// Authentication failed; kept only so teardown deletes the identity
    Broken,
}

/// A provisioned identity plus the one session bound to it
pub(crate) struct LoginEntry {
    pub(crate) identity: Arc<Identity>,
    pub(crate) session: Arc<GraphqlSession>,
    pub(crate) state: EntryState,
    /// Bumped on every check-out and clean so stale handles stay inert
    pub(crate) lease: u64,
}

pub(crate) enum Slot {
    Uncreated,
    Provisioning,
    Created(Arc<Identity>),
    Live(LoginEntry),
    Broken(Arc<Identity>),
}

impl Slot {
    pub(crate) fn state(&self) -> EntryState {
        match self {
            Slot::Uncreated => EntryState::Uncreated,
            Slot::Provisioning => EntryState::Provisioning,
            Slot::Created(_) => EntryState::Created,
            Slot::Live(entry) => entry.state,
            Slot::Broken(_) => EntryState::Broken,
        }
    }

    pub(crate) fn owns_identity(&self) -> bool {
        matches!(self, Slot::Created(_) | Slot::Live(_) | Slot::Broken(_))
    }

    pub(crate) fn into_identity(self) -> Option<Arc<Identity>> {
        match self {
            Slot::Live(entry) => Some(entry.identity),
            Slot::Created(identity) | Slot::Broken(identity) => Some(identity),
            Slot::Uncreated | Slot::Provisioning => None,
        }
    }
}

/// Registration-ordered slots. All state transitions happen while holding
/// the surrounding lock, which is never held across an `.await`.
#[derive(Default)]
pub(crate) struct Slots {
    pub(crate) slots: Vec<Slot>,
    next_lease: u64,
}

pub(crate) type SharedSlots = Arc<Mutex<Slots>>;

impl Slots {
    pub(crate) fn next_lease(&mut self) -> u64 {
        self.next_lease += 1;
        self.next_lease
    }

    /// Check out the lowest-index clean entry in the same critical section that finds it
    pub(crate) fn check_out_clean(
        &mut self,
    ) -> Option<(usize, u64, Arc<Identity>, Arc<GraphqlSession>)> {
        let index = self
            .slots
            .iter()
            .position(|slot| slot.state() == EntryState::Clean)?;
        let lease = self.next_lease();

        match &mut self.slots[index] {
            Slot::Live(entry) => {
                entry.state = EntryState::CheckedOut;
                entry.lease = lease;
                Some((index, lease, entry.identity.clone(), entry.session.clone()))
            }
            _ => None,
        }
    }

    /// Reserve the lowest-index slot whose identity still needs a session
    pub(crate) fn reserve_created(&mut self) -> Option<(usize, Arc<Identity>)> {
        let index = self
            .slots
            .iter()
            .position(|slot| matches!(slot, Slot::Created(_)))?;

        match std::mem::replace(&mut self.slots[index], Slot::Provisioning) {
            Slot::Created(identity) => Some((index, identity)),
            other => {
                self.slots[index] = other;
                None
            }
        }
    }

    /// Reserve the lowest-index slot that still has no identity
    pub(crate) fn reserve_uncreated(&mut self) -> Option<usize> {
        let index = self
            .slots
            .iter()
            .position(|slot| matches!(slot, Slot::Uncreated))?;
        self.slots[index] = Slot::Provisioning;
        Some(index)
    }

    /// The live entry at `index`, only while `lease` is still its current lease
    pub(crate) fn live_mut(&mut self, index: usize, lease: u64) -> Option<&mut LoginEntry> {
        match self.slots.get_mut(index) {
            Some(Slot::Live(entry)) if entry.lease == lease => Some(entry),
            _ => None,
        }
    }
}

/// A checked-out login handed to one test.
///
/// Tests never release explicitly. Dropping the handle marks the entry
/// dirty because nothing proves the test left the account untouched; the
/// next `clean_all` resets it.
pub struct Login {
    index: usize,
    lease: u64,
    identity: Arc<Identity>,
    session: Arc<GraphqlSession>,
    slots: SharedSlots,
}

impl Login {
    pub(crate) fn new(
        index: usize,
        lease: u64,
        identity: Arc<Identity>,
        session: Arc<GraphqlSession>,
        slots: SharedSlots,
    ) -> Self {
        Self {
            index,
            lease,
            identity,
            session,
            slots,
        }
    }

    /// Position in registration order
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn identity_id(&self) -> &str {
        &self.identity.id
    }

    pub fn username(&self) -> &str {
        self.identity.username()
    }

    /// Provider metadata captured at creation (display username, contact)
    pub fn display_metadata(&self) -> &BTreeMap<String, String> {
        &self.identity.extras
    }

    pub fn session(&self) -> &GraphqlSession {
        &self.session
    }

    pub(crate) fn lease(&self) -> u64 {
        self.lease
    }

    pub(crate) fn identity(&self) -> &Arc<Identity> {
        &self.identity
    }

    pub(crate) fn replace_session(&mut self, session: Arc<GraphqlSession>) {
        self.session = session;
    }
}

impl fmt::Debug for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Login")
            .field("index", &self.index)
            .field("identity_id", &self.identity.id)
            .field("username", &self.identity.username())
            .finish_non_exhaustive()
    }
}

impl Drop for Login {
    fn drop(&mut self) {
        let mut slots = self.slots.lock();
        if let Some(entry) = slots.live_mut(self.index, self.lease) {
            if entry.state == EntryState::CheckedOut {
                entry.state = EntryState::Dirty;
                tracing::trace!(index = self.index, "Login released dirty");
            }
        }
    }
}
