//! The desk: users, activities and packs with their record files
//!
//! A [`Desk`] loads the three working sets when opened and keeps them in
//! memory. Edits only touch memory and mark the affected set dirty;
//! [`Desk::save`] rewrites the files of the dirty sets.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::collection::{Handle, InsertFlags, OrderedList, Record};
use crate::entities::{check_text, Activity, Pack, User, UserKind};
use crate::error::{DeskError, DeskResult, StatusCode};
use crate::storage::{Codec, RecordFile};

/// Default users file name
pub const USERS_FILE: &str = "user.db";
/// Default activities file name
pub const ACTIVITIES_FILE: &str = "act.db";
/// Default packs file name
pub const PACKS_FILE: &str = "pack.db";

/// Locations of the desk's record files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskPaths {
    pub users: PathBuf,
    pub activities: PathBuf,
    pub packs: PathBuf,
}

impl Default for DeskPaths {
    fn default() -> Self {
        DeskPaths {
            users: PathBuf::from(USERS_FILE),
            activities: PathBuf::from(ACTIVITIES_FILE),
            packs: PathBuf::from(PACKS_FILE),
        }
    }
}

impl DeskPaths {
    /// Default file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        DeskPaths::default().relative_to(dir)
    }

    /// Resolve relative paths against `dir`; absolute paths are kept
    pub fn relative_to(&self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        DeskPaths {
            users: dir.join(&self.users),
            activities: dir.join(&self.activities),
            packs: dir.join(&self.packs),
        }
    }
}

/// In-memory working sets backed by record files
#[derive(Debug)]
pub struct Desk {
    users: OrderedList<User>,
    activities: OrderedList<Activity>,
    packs: OrderedList<Pack>,
    user_file: RecordFile,
    activity_file: RecordFile,
    pack_file: RecordFile,
}

impl Desk {
    /// Load every record file. A missing file yields an empty set.
    pub fn open(paths: &DeskPaths) -> DeskResult<Self> {
        let mut user_file = RecordFile::new(&paths.users);
        let mut activity_file = RecordFile::new(&paths.activities);
        let mut pack_file = RecordFile::new(&paths.packs);

        let users = load_or_empty(&mut user_file)?;
        let activities = load_or_empty(&mut activity_file)?;
        let packs = load_or_empty(&mut pack_file)?;

        info!(
            "Desk opened: {} users, {} activities, {} packs",
            users.len(),
            activities.len(),
            packs.len()
        );

        Ok(Desk {
            users,
            activities,
            packs,
            user_file,
            activity_file,
            pack_file,
        })
    }

    pub fn users(&self) -> &OrderedList<User> {
        &self.users
    }

    pub fn activities(&self) -> &OrderedList<Activity> {
        &self.activities
    }

    pub fn packs(&self) -> &OrderedList<Pack> {
        &self.packs
    }

    /// Whether any set has unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.users.is_dirty() || self.activities.is_dirty() || self.packs.is_dirty()
    }

    /// Rewrite the files of the dirty sets. Returns how many files were
    /// written.
    pub fn save(&mut self) -> DeskResult<usize> {
        let mut written = 0;
        if save_if_dirty(&mut self.user_file, &mut self.users)? {
            written += 1;
        }
        if save_if_dirty(&mut self.activity_file, &mut self.activities)? {
            written += 1;
        }
        if save_if_dirty(&mut self.pack_file, &mut self.packs)? {
            written += 1;
        }
        info!("Desk saved: {} files written", written);
        Ok(written)
    }

    /// Look a user up by username and check the password
    pub fn authenticate(&self, username: &str, pass: &str) -> Option<&User> {
        let user = self.users.search(&User::probe(username), None)?;
        if user.pass != pass {
            debug!("Wrong password for {}", username);
            return None;
        }
        Some(user)
    }

    /// Every user of `kind`, sorted by username
    pub fn users_of_kind(&self, kind: UserKind) -> OrderedList<User> {
        self.users
            .search_all(&User::probe_kind(kind), Some(User::by_kind))
    }

    pub fn add_user(&mut self, user: User) -> DeskResult<Handle> {
        Ok(self.users.insert_sorted(user, InsertFlags::empty(), None)?)
    }

    pub fn add_activity(&mut self, activity: Activity) -> DeskResult<Handle> {
        Ok(self
            .activities
            .insert_sorted(activity, InsertFlags::empty(), None)?)
    }

    pub fn add_pack(&mut self, pack: Pack) -> DeskResult<Handle> {
        Ok(self.packs.insert_sorted(pack, InsertFlags::empty(), None)?)
    }

    pub fn user(&self, handle: Handle) -> Option<&User> {
        self.users.get(handle)
    }

    pub fn activity(&self, handle: Handle) -> Option<&Activity> {
        self.activities.get(handle)
    }

    pub fn pack(&self, handle: Handle) -> Option<&Pack> {
        self.packs.get(handle)
    }

    pub fn find_user(&self, username: &str) -> Option<Handle> {
        self.users.search_handle(&User::probe(username), None)
    }

    /// Full scan by name, the list being sorted by slot
    pub fn find_activity_by_name(&self, name: &str) -> Option<Handle> {
        self.activities
            .find(&Activity::probe_name(name), Activity::by_name)
    }

    pub fn find_activity_at(&self, day: i32, hour: i32, mins: i32) -> DeskResult<Option<Handle>> {
        let probe = Activity::probe_at(day, hour, mins)?;
        Ok(self.activities.search_handle(&probe, None))
    }

    pub fn find_pack(&self, name: &str) -> Option<Handle> {
        self.packs.search_handle(&Pack::probe(name), None)
    }

    /// Edit a user's non-key fields
    pub fn update_user(&mut self, handle: Handle, edit: impl FnOnce(&mut User)) -> DeskResult<()> {
        let user = self.users.get_mut(handle).ok_or(StatusCode::InvalidHandle)?;
        let username = user.username.clone();
        edit(user);
        user.username = username;
        self.users.set_dirty(true);
        Ok(())
    }

    /// Change a user's username, keeping the list sorted
    pub fn rename_user(&mut self, handle: Handle, username: &str) -> DeskResult<()> {
        check_text("username", username)?;
        if self.users.get(handle).is_none() {
            return Err(StatusCode::InvalidHandle.into());
        }
        check_free(&self.users, &User::probe(username), handle)?;

        if let Some(user) = self.users.get_mut(handle) {
            user.username = username.to_string();
        }
        self.users.sort(None);
        self.users.set_dirty(true);
        Ok(())
    }

    /// Move an activity to another slot, keeping the list sorted
    pub fn reschedule_activity(
        &mut self,
        handle: Handle,
        day: i32,
        hour: i32,
        mins: i32,
    ) -> DeskResult<()> {
        let probe = Activity::probe_at(day, hour, mins)?;
        if self.activities.get(handle).is_none() {
            return Err(StatusCode::InvalidHandle.into());
        }
        check_free(&self.activities, &probe, handle)?;

        if let Some(activity) = self.activities.get_mut(handle) {
            activity.schedule(day, hour, mins)?;
        }
        self.activities.sort(None);
        self.activities.set_dirty(true);
        Ok(())
    }

    /// Take a seat in an activity
    pub fn book_activity(&mut self, handle: Handle) -> DeskResult<()> {
        let activity = self
            .activities
            .get_mut(handle)
            .ok_or(StatusCode::InvalidHandle)?;
        if !activity.reserve_seat() {
            return Err(DeskError::InvalidValue(format!("{} is full", activity.name)));
        }
        self.activities.set_dirty(true);
        Ok(())
    }

    /// Give a seat back
    pub fn cancel_booking(&mut self, handle: Handle) -> DeskResult<()> {
        let activity = self
            .activities
            .get_mut(handle)
            .ok_or(StatusCode::InvalidHandle)?;
        if !activity.release_seat() {
            return Err(DeskError::InvalidValue(format!(
                "no seat taken in {}",
                activity.name
            )));
        }
        self.activities.set_dirty(true);
        Ok(())
    }

    pub fn remove_user(&mut self, handle: Handle) -> bool {
        self.users.remove(handle)
    }

    pub fn remove_activity(&mut self, handle: Handle) -> bool {
        self.activities.remove(handle)
    }

    pub fn remove_pack(&mut self, handle: Handle) -> bool {
        self.packs.remove(handle)
    }
}

fn load_or_empty<T: Record + Codec>(file: &mut RecordFile) -> DeskResult<OrderedList<T>> {
    match file.load() {
        Ok(list) => Ok(list),
        Err(e) if e.status_code() == StatusCode::FileNotFound => {
            info!("{:?} not found, starting empty", file.path());
            Ok(OrderedList::new())
        }
        Err(e) => Err(e),
    }
}

fn save_if_dirty<T: Record + Codec>(
    file: &mut RecordFile,
    list: &mut OrderedList<T>,
) -> DeskResult<bool> {
    if !list.is_dirty() {
        return Ok(false);
    }
    file.save(list)?;
    Ok(true)
}

/// Fail if a record other than `handle` already holds `probe`'s key
fn check_free<T: Record>(list: &OrderedList<T>, probe: &T, handle: Handle) -> DeskResult<()> {
    match list.search_handle(probe, None) {
        Some(found) if found != handle => Err(StatusCode::DuplicateKey.into()),
        _ => Ok(()),
    }
}
