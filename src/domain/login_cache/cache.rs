use super::entry::{EntryState, Login, LoginEntry, SharedSlots, Slot, Slots};
use crate::domain::identity::{Identity, IdentityOptions, IdentityProvisioner};
use crate::domain::reset::ResetProtocol;
use crate::domain::session::SessionFactory;
use crate::error::{CacheError, CacheResult, EntryFailure};
use crate::infrastructure::graphql::GraphqlSession;
use futures::future::join_all;
use parking_lot::Mutex;
use std::sync::Arc;

/// Pool of authenticated logins for one test run.
///
/// Suites register how many logins they need, acquire clean ones inside
/// tests, call `clean_all` before each test and `teardown_all` once at the
/// end. Identities are created lazily on first need and deleted only at
/// teardown; in between they are reset, not recreated.
pub struct LoginCache {
    provisioner: Arc<dyn IdentityProvisioner>,
    session_factory: Arc<dyn SessionFactory>,
    reset_protocol: Arc<dyn ResetProtocol>,
    identity_options: IdentityOptions,
    slots: SharedSlots,
}

impl LoginCache {
    pub fn new(
        provisioner: Arc<dyn IdentityProvisioner>,
        session_factory: Arc<dyn SessionFactory>,
        reset_protocol: Arc<dyn ResetProtocol>,
    ) -> Self {
        Self {
            provisioner,
            session_factory,
            reset_protocol,
            identity_options: IdentityOptions::default(),
            slots: Arc::new(Mutex::new(Slots::default())),
        }
    }

    /// Options used for every identity this cache provisions
    pub fn with_identity_options(mut self, identity_options: IdentityOptions) -> Self {
        self.identity_options = identity_options;
        self
    }

    /// Reserve capacity for `count` more logins. Nothing is provisioned yet.
    pub fn register_intended_use(&self, count: usize) {
        let mut slots = self.slots.lock();
        slots.slots.extend((0..count).map(|_| Slot::Uncreated));
        tracing::debug!(
            added = count,
            registered = slots.slots.len(),
            "Registered logins"
        );
    }

    pub fn add_clean_login(&self) {
        self.register_intended_use(1);
    }

    pub fn registered(&self) -> usize {
        self.slots.lock().slots.len()
    }

    /// Current state of every registered login, in registration order
    pub fn snapshot(&self) -> Vec<EntryState> {
        self.slots.lock().slots.iter().map(Slot::state).collect()
    }

    /// Hand out the lowest-index clean login, provisioning a new one if none is clean.
    ///
    /// An identity whose session was never bound, because an earlier
    /// `acquire` was dropped mid-way, is authenticated again before any new
    /// identity is created.
    ///
    /// # Errors
    /// - `PoolExhausted` when no registered login is clean or still unprovisioned
    /// - `Provision` when the identity could not be created; the slot stays available
    /// - `Auth` when the new identity could not be authenticated; that login is broken for good
    pub async fn acquire(&self) -> CacheResult<Login> {
        let (index, created) = {
            let mut slots = self.slots.lock();

            if let Some((index, lease, identity, session)) = slots.check_out_clean() {
                tracing::debug!(index = index, identity_id = %identity.id, "Reusing clean login");
                return Ok(Login::new(index, lease, identity, session, self.slots.clone()));
            }

            if let Some((index, identity)) = slots.reserve_created() {
                (index, Some(identity))
            } else if let Some(index) = slots.reserve_uncreated() {
                (index, None)
            } else {
                let registered = slots.slots.len();
                tracing::error!(registered = registered, "Login pool exhausted");
                return Err(CacheError::PoolExhausted { registered });
            }
        };

        let mut reservation = Reservation::new(self.slots.clone(), index);

        let identity = match created {
            Some(identity) => {
                tracing::info!(
                    index = index,
                    identity_id = %identity.id,
                    "Resuming login with unbound identity"
                );
                identity
            }
            None => {
                tracing::info!(index = index, "Provisioning login");
                let identity = self
                    .provisioner
                    .create(self.identity_options.clone())
                    .await
                    .map_err(|source| {
                        tracing::error!(index = index, error = %source, "Login provisioning failed");
                        CacheError::Provision { index, source }
                    })?;
                Arc::new(identity)
            }
        };
        reservation.hold(identity.clone());

        let session = self
            .session_factory
            .authenticate(&identity)
            .await
            .map_err(|source| {
                reservation.mark_broken();
                tracing::error!(
                    index = index,
                    identity_id = %identity.id,
                    error = %source,
                    "Login authentication failed"
                );
                CacheError::Auth {
                    index,
                    identity_id: identity.id.clone(),
                    source,
                }
            })?;

        tracing::info!(index = index, identity_id = %identity.id, "Login provisioned");

        Ok(reservation.commit(identity, Arc::new(session)))
    }

    /// Rebind a fresh session to a checked-out login, e.g. after credential rotation.
    /// A failure marks the login broken.
    pub async fn reauthenticate(&self, login: &mut Login) -> CacheResult<()> {
        let index = login.index();
        let lease = login.lease();

        {
            let mut slots = self.slots.lock();
            match slots.live_mut(index, lease) {
                Some(entry) if entry.state == EntryState::CheckedOut => {}
                _ => return Err(CacheError::StaleLogin { index }),
            }
        }

        let identity = login.identity().clone();
        match self.session_factory.authenticate(&identity).await {
            Ok(session) => {
                let session = Arc::new(session);
                let mut slots = self.slots.lock();
                let entry = slots
                    .live_mut(index, lease)
                    .ok_or(CacheError::StaleLogin { index })?;
                entry.session = session.clone();
                drop(slots);

                login.replace_session(session);
                tracing::info!(index = index, identity_id = %identity.id, "Login reauthenticated");
                Ok(())
            }
            Err(source) => {
                let mut slots = self.slots.lock();
                if slots.live_mut(index, lease).is_some() {
                    slots.slots[index] = Slot::Broken(identity.clone());
                }
                tracing::error!(
                    index = index,
                    identity_id = %identity.id,
                    error = %source,
                    "Login reauthentication failed, marking broken"
                );
                Err(CacheError::Auth {
                    index,
                    identity_id: identity.id.clone(),
                    source,
                })
            }
        }
    }

    /// Reset every login that is checked out or dirty back to clean.
    ///
    /// Logins are reset independently and concurrently. A failing reset
    /// leaves its login dirty and does not stop the others; all failures
    /// are returned together once every login has been attempted.
    pub async fn clean_all(&self) -> CacheResult<()> {
        let targets: Vec<(usize, Arc<Identity>, Arc<GraphqlSession>)> = {
            let mut guard = self.slots.lock();
            let mut targets = Vec::new();
            for (index, slot) in guard.slots.iter_mut().enumerate() {
                if let Slot::Live(entry) = slot {
                    if entry.state != EntryState::Clean {
                        entry.state = EntryState::Dirty;
                        targets.push((index, entry.identity.clone(), entry.session.clone()));
                    }
                }
            }
            // Supersede outstanding handles so a late drop cannot dirty a cleaned login
            for (index, _, _) in &targets {
                let lease = guard.next_lease();
                if let Slot::Live(entry) = &mut guard.slots[*index] {
                    entry.lease = lease;
                }
            }
            targets
        };

        if targets.is_empty() {
            return Ok(());
        }

        tracing::info!(count = targets.len(), "Cleaning logins");

        let resets = targets.into_iter().map(|(index, identity, session)| {
            let reset_protocol = self.reset_protocol.clone();
            async move {
                let result = reset_protocol.reset(&session).await;
                (index, identity, result)
            }
        });
        let results = join_all(resets).await;

        let mut failures = Vec::new();
        {
            let mut slots = self.slots.lock();
            for (index, identity, result) in results {
                match result {
                    Ok(()) => {
                        if let Some(Slot::Live(entry)) = slots.slots.get_mut(index) {
                            if Arc::ptr_eq(&entry.identity, &identity) {
                                entry.state = EntryState::Clean;
                            }
                        }
                    }
                    Err(error) => {
                        tracing::warn!(
                            index = index,
                            identity_id = %identity.id,
                            error = %error,
                            "Login reset failed"
                        );
                        failures.push(EntryFailure {
                            index,
                            identity_id: identity.id.clone(),
                            error,
                        });
                    }
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(CacheError::CleanFailed { failures })
        }
    }

    /// Delete every identity this cache created and forget all logins.
    ///
    /// Deletions run concurrently; an identity that is already gone counts as
    /// deleted. Failures are collected and returned after every deletion has
    /// been attempted. Calling this again is a no-op. Must not run
    /// concurrently with `acquire`.
    pub async fn teardown_all(&self) -> CacheResult<()> {
        let owned: Vec<(usize, Arc<Identity>)> = {
            let mut slots = self.slots.lock();
            std::mem::take(&mut slots.slots)
                .into_iter()
                .enumerate()
                .filter_map(|(index, slot)| slot.into_identity().map(|identity| (index, identity)))
                .collect()
        };

        if owned.is_empty() {
            return Ok(());
        }

        tracing::info!(count = owned.len(), "Tearing down logins");

        let provisioner = &self.provisioner;
        let deletions = owned.into_iter().map(|(index, identity)| async move {
            let result = provisioner.delete(&identity).await;
            (index, identity, result)
        });
        let results = join_all(deletions).await;

        let failures: Vec<_> = results
            .into_iter()
            .filter_map(|(index, identity, result)| {
                result.err().map(|error| {
                    tracing::error!(
                        index = index,
                        identity_id = %identity.id,
                        error = %error,
                        "Login teardown failed, identity leaked"
                    );
                    EntryFailure {
                        index,
                        identity_id: identity.id.clone(),
                        error,
                    }
                })
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(CacheError::TeardownFailed { failures })
        }
    }
}

impl Drop for LoginCache {
    fn drop(&mut self) {
        let owned = self
            .slots
            .lock()
            .slots
            .iter()
            .filter(|slot| slot.owns_identity())
            .count();
        if owned > 0 {
            tracing::warn!(owned = owned, "Login cache dropped before teardown, identities leaked");
        }
    }
}

/// A slot claimed by an in-flight `acquire`.
///
/// If the acquisition fails or its future is dropped, the slot goes back
/// to `Uncreated` when no identity exists yet, to `Created` when one does,
/// and to `Broken` only after authentication itself failed. Teardown
/// deletes the identity in both of the latter cases.
struct Reservation {
    slots: SharedSlots,
    index: usize,
    identity: Option<Arc<Identity>>,
    broken: bool,
    armed: bool,
}

impl Reservation {
    fn new(slots: SharedSlots, index: usize) -> Self {
        Self {
            slots,
            index,
            identity: None,
            broken: false,
            armed: true,
        }
    }

    fn hold(&mut self, identity: Arc<Identity>) {
        self.identity = Some(identity);
    }

    fn mark_broken(&mut self) {
        self.broken = true;
    }

    fn commit(mut self, identity: Arc<Identity>, session: Arc<GraphqlSession>) -> Login {
        self.armed = false;
        let slots = self.slots.clone();
        let mut guard = slots.lock();
        let lease = guard.next_lease();

        match guard.slots.get_mut(self.index) {
            Some(slot) if matches!(slot, Slot::Provisioning) => {
                *slot = Slot::Live(LoginEntry {
                    identity: identity.clone(),
                    session: session.clone(),
                    state: EntryState::CheckedOut,
                    lease,
                });
            }
            _ => {
                tracing::warn!(
                    index = self.index,
                    identity_id = %identity.id,
                    "Login slot vanished during provisioning, identity leaked"
                );
            }
        }
        drop(guard);

        Login::new(self.index, lease, identity, session, slots)
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let mut slots = self.slots.lock();
        if let Some(slot) = slots.slots.get_mut(self.index) {
            if matches!(slot, Slot::Provisioning) {
                *slot = match self.identity.take() {
                    Some(identity) if self.broken => Slot::Broken(identity),
                    Some(identity) => Slot::Created(identity),
                    None => Slot::Uncreated,
                };
            }
        }
    }
}
