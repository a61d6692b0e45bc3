use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::RepositoryError;
use crate::adoption::{
    AdoptionRepository, Application, ApplicationId, ApplicationStatus, WriteBatch, WriteOp,
};
use crate::auth::{Session, SessionRepository, TokenFingerprint, User, UserId, UserRepository};
use crate::catalog::{Pet, PetFilter, PetId, PetRepository, PetStatus};
use crate::pagination::{Page, PageRequest};

/// Document plus its insertion sequence, used to break `created_at` ties.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Stored<T> {
    seq: u64,
    doc: T,
}

#[derive(Debug, Clone, Default)]
struct Documents {
    pets: BTreeMap<PetId, Stored<Pet>>,
    applications: BTreeMap<ApplicationId, Stored<Application>>,
    users: BTreeMap<UserId, User>,
    sessions: HashMap<TokenFingerprint, Session>,
    sequence: u64,
}

/// On-disk form. Sessions are deliberately left out; a restart signs everyone out.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    sequence: u64,
    pets: Vec<Stored<Pet>>,
    applications: Vec<Stored<Application>>,
    users: Vec<User>,
}

impl Documents {
    fn next_seq(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            sequence: self.sequence,
            pets: self.pets.values().cloned().collect(),
            applications: self.applications.values().cloned().collect(),
            users: self.users.values().cloned().collect(),
        }
    }

    fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            pets: snapshot
                .pets
                .into_iter()
                .map(|stored| (stored.doc.id, stored))
                .collect(),
            applications: snapshot
                .applications
                .into_iter()
                .map(|stored| (stored.doc.id, stored))
                .collect(),
            users: snapshot
                .users
                .into_iter()
                .map(|user| (user.id, user))
                .collect(),
            sessions: HashMap::new(),
            sequence: snapshot.sequence,
        }
    }

    fn applications_where(&self, keep: impl Fn(&Application) -> bool) -> Vec<Application> {
        newest_first(
            self.applications
                .values()
                .filter(|stored| keep(&stored.doc))
                .collect(),
            |application| application.created_at,
        )
    }

    fn application_status(&self, id: &ApplicationId) -> Result<ApplicationStatus, RepositoryError> {
        self.applications
            .get(id)
            .map(|stored| stored.doc.status)
            .ok_or(RepositoryError::NotFound)
    }

    fn user_clash(&self, candidate: &User) -> bool {
        self.users.values().any(|user| {
            user.id != candidate.id
                && (user.email.eq_ignore_ascii_case(&candidate.email)
                    || user.username.eq_ignore_ascii_case(&candidate.username))
        })
    }

    /// Check every guard in the batch against the current documents.
    fn validate(&self, batch: &WriteBatch) -> Result<(), RepositoryError> {
        for op in batch.ops() {
            match op {
                WriteOp::InsertApplication(application) => {
                    let pair_taken = self.applications.values().any(|stored| {
                        stored.doc.user == application.user && stored.doc.pet == application.pet
                    });
                    if pair_taken || self.applications.contains_key(&application.id) {
                        return Err(RepositoryError::Duplicate);
                    }
                }
                WriteOp::SetPetStatus { pet, expected, .. } => {
                    let stored = self.pets.get(pet).ok_or(RepositoryError::NotFound)?;
                    if stored.doc.status != *expected {
                        return Err(RepositoryError::Stale);
                    }
                }
                WriteOp::SetApplicationStatus {
                    application,
                    expected,
                    ..
                }
                | WriteOp::ExpectApplicationStatus {
                    application,
                    expected,
                } => {
                    if self.application_status(application)? != *expected {
                        return Err(RepositoryError::Stale);
                    }
                }
            }
        }
        Ok(())
    }

    /// Apply a batch that already passed [`Documents::validate`].
    fn apply(&mut self, batch: WriteBatch, now: DateTime<Utc>) {
        for op in batch.into_ops() {
            match op {
                WriteOp::InsertApplication(application) => {
                    let seq = self.next_seq();
                    self.applications.insert(
                        application.id,
                        Stored {
                            seq,
                            doc: application,
                        },
                    );
                }
                WriteOp::SetPetStatus { pet, next, .. } => {
                    if let Some(stored) = self.pets.get_mut(&pet) {
                        stored.doc.status = next;
                        stored.doc.updated_at = now;
                    }
                }
                WriteOp::SetApplicationStatus {
                    application, next, ..
                } => {
                    if let Some(stored) = self.applications.get_mut(&application) {
                        stored.doc.status = next;
                        stored.doc.updated_at = now;
                    }
                }
                WriteOp::ExpectApplicationStatus { .. } => {}
            }
        }
    }
}

fn newest_first<T: Clone>(mut items: Vec<&Stored<T>>, created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    items.sort_by(|left, right| {
        created_at(&right.doc)
            .cmp(&created_at(&left.doc))
            .then(right.seq.cmp(&left.seq))
    });
    items.into_iter().map(|stored| stored.doc.clone()).collect()
}

/// Mutex-guarded document store backing every repository trait.
///
/// With a snapshot path, each mutation is applied to a working copy, written
/// to disk (temp file + rename), and only then published to readers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<Documents>,
    snapshot: Option<PathBuf>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store persisted to `path`. An existing snapshot is loaded; a missing one starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let path = path.into();
        let documents = match fs::read(&path) {
            Ok(bytes) => {
                let snapshot: Snapshot = serde_json::from_slice(&bytes).map_err(|err| {
                    RepositoryError::Unavailable(format!(
                        "snapshot {} is unreadable: {err}",
                        path.display()
                    ))
                })?;
                let documents = Documents::from_snapshot(snapshot);
                info!(
                    path = %path.display(),
                    pets = documents.pets.len(),
                    applications = documents.applications.len(),
                    users = documents.users.len(),
                    "snapshot loaded"
                );
                documents
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Documents::default(),
            Err(err) => {
                return Err(RepositoryError::Unavailable(format!(
                    "failed to read {}: {err}",
                    path.display()
                )))
            }
        };

        Ok(Self {
            documents: Mutex::new(documents),
            snapshot: Some(path),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Documents>, RepositoryError> {
        self.documents
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }

    fn read<T>(&self, view: impl FnOnce(&Documents) -> T) -> Result<T, RepositoryError> {
        let guard = self.lock()?;
        Ok(view(&guard))
    }

    /// Run a durable mutation. `change` must leave the documents untouched when it fails.
    fn write<T>(
        &self,
        change: impl FnOnce(&mut Documents) -> Result<T, RepositoryError>,
    ) -> Result<T, RepositoryError> {
        let mut guard = self.lock()?;
        let Some(path) = &self.snapshot else {
            return change(&mut guard);
        };

        let mut working = guard.clone();
        let outcome = change(&mut working)?;
        write_snapshot(path, &working.snapshot())?;
        *guard = working;
        Ok(outcome)
    }
}

fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), RepositoryError> {
    let unavailable =
        |err: std::io::Error| RepositoryError::Unavailable(format!("{}: {err}", path.display()));

    let bytes = serde_json::to_vec_pretty(snapshot)
        .map_err(|err| RepositoryError::Unavailable(format!("snapshot encoding failed: {err}")))?;

    let parent = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(unavailable)?;

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| RepositoryError::Unavailable("snapshot path must name a file".to_string()))?;
    let temp = parent.join(format!(".{file_name}.tmp.{}", std::process::id()));

    let mut file = fs::File::create(&temp).map_err(unavailable)?;
    file.write_all(&bytes).map_err(unavailable)?;
    file.sync_all().map_err(unavailable)?;
    drop(file);
    fs::rename(&temp, path).map_err(unavailable)?;

    debug!(path = %path.display(), bytes = bytes.len(), "snapshot written");
    Ok(())
}

impl PetRepository for MemoryStore {
    fn insert_pet(&self, pet: Pet) -> Result<Pet, RepositoryError> {
        self.write(|docs| {
            if docs.pets.contains_key(&pet.id) {
                return Err(RepositoryError::Duplicate);
            }
            let seq = docs.next_seq();
            docs.pets.insert(
                pet.id,
                Stored {
                    seq,
                    doc: pet.clone(),
                },
            );
            Ok(pet)
        })
    }

    fn pet(&self, id: &PetId) -> Result<Option<Pet>, RepositoryError> {
        self.read(|docs| docs.pets.get(id).map(|stored| stored.doc.clone()))
    }

    fn replace_pet(&self, pet: Pet, expected: PetStatus) -> Result<Pet, RepositoryError> {
        self.write(|docs| {
            let stored = docs.pets.get_mut(&pet.id).ok_or(RepositoryError::NotFound)?;
            if stored.doc.status != expected {
                return Err(RepositoryError::Stale);
            }
            stored.doc = pet.clone();
            Ok(pet)
        })
    }

    fn delete_pet(&self, id: &PetId) -> Result<(), RepositoryError> {
        self.write(|docs| {
            docs.pets
                .remove(id)
                .map(|_| ())
                .ok_or(RepositoryError::NotFound)
        })
    }

    fn search_pets(
        &self,
        filter: &PetFilter,
        page: PageRequest,
    ) -> Result<Page<Pet>, RepositoryError> {
        self.read(|docs| {
            let matching = docs
                .pets
                .values()
                .filter(|stored| filter.matches(&stored.doc))
                .collect();
            page.slice(newest_first(matching, |pet| pet.created_at))
        })
    }

    fn pet_count(&self) -> Result<usize, RepositoryError> {
        self.read(|docs| docs.pets.len())
    }

    fn open_application_count(&self, id: &PetId) -> Result<usize, RepositoryError> {
        self.read(|docs| {
            docs.applications
                .values()
                .filter(|stored| {
                    stored.doc.pet == *id
                        && matches!(
                            stored.doc.status,
                            ApplicationStatus::Pending | ApplicationStatus::Approved
                        )
                })
                .count()
        })
    }
}

impl AdoptionRepository for MemoryStore {
    fn application(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        self.read(|docs| docs.applications.get(id).map(|stored| stored.doc.clone()))
    }

    fn application_by(
        &self,
        user: &UserId,
        pet: &PetId,
    ) -> Result<Option<Application>, RepositoryError> {
        self.read(|docs| {
            docs.applications
                .values()
                .find(|stored| stored.doc.user == *user && stored.doc.pet == *pet)
                .map(|stored| stored.doc.clone())
        })
    }

    fn applications_for_pet(&self, pet: &PetId) -> Result<Vec<Application>, RepositoryError> {
        self.read(|docs| docs.applications_where(|application| application.pet == *pet))
    }

    fn applications_for_user(&self, user: &UserId) -> Result<Vec<Application>, RepositoryError> {
        self.read(|docs| docs.applications_where(|application| application.user == *user))
    }

    fn list_applications(
        &self,
        status: Option<ApplicationStatus>,
        page: PageRequest,
    ) -> Result<Page<Application>, RepositoryError> {
        self.read(|docs| {
            page.slice(docs.applications_where(|application| {
                status.map_or(true, |wanted| application.status == wanted)
            }))
        })
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), RepositoryError> {
        if batch.is_empty() {
            return Ok(());
        }
        self.write(|docs| {
            docs.validate(&batch)?;
            docs.apply(batch, Utc::now());
            Ok(())
        })
    }
}

impl UserRepository for MemoryStore {
    fn insert_user(&self, user: User) -> Result<User, RepositoryError> {
        self.write(|docs| {
            if docs.users.contains_key(&user.id) || docs.user_clash(&user) {
                return Err(RepositoryError::Duplicate);
            }
            docs.users.insert(user.id, user.clone());
            Ok(user)
        })
    }

    fn user(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        self.read(|docs| docs.users.get(id).cloned())
    }

    fn user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        self.read(|docs| {
            docs.users
                .values()
                .find(|user| user.email.eq_ignore_ascii_case(email))
                .cloned()
        })
    }

    fn replace_user(&self, user: User) -> Result<User, RepositoryError> {
        self.write(|docs| {
            if !docs.users.contains_key(&user.id) {
                return Err(RepositoryError::NotFound);
            }
            if docs.user_clash(&user) {
                return Err(RepositoryError::Duplicate);
            }
            docs.users.insert(user.id, user.clone());
            Ok(user)
        })
    }
}

impl SessionRepository for MemoryStore {
    fn insert_session(
        &self,
        fingerprint: TokenFingerprint,
        session: Session,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        let now = Utc::now();
        let before = guard.sessions.len();
        guard.sessions.retain(|_, held| !held.is_expired(now));
        let pruned = before - guard.sessions.len();
        if pruned > 0 {
            debug!(pruned, "expired sessions dropped");
        }
        guard.sessions.insert(fingerprint, session);
        Ok(())
    }

    fn session(&self, fingerprint: &TokenFingerprint) -> Result<Option<Session>, RepositoryError> {
        self.read(|docs| docs.sessions.get(fingerprint).cloned())
    }

    fn remove_session(&self, fingerprint: &TokenFingerprint) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        guard.sessions.remove(fingerprint);
        Ok(())
    }
}
