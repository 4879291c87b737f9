use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

use crossbeam::atomic::AtomicCell;
use once_cell::sync::OnceCell;

use super::app_info::{AppFlags, AppInfo};
use super::inventory::PackageInventory;
use crate::Uid;

/// A complete, immutable view of the installed packages taken from one
/// inventory listing
#[derive(Debug)]
pub struct PkgSnapshot {
    generation: u64,
    apps: Vec<AppInfo>,
    by_name: HashMap<String, usize>,
    uid_to_pkgs: HashMap<Uid, Vec<String>>,
    /// Indexes into `apps`, one list per entry of [AppFlags::CATEGORY_ORDER]
    categories: [Vec<usize>; 7],
    whitelist: Vec<String>,
    whitelist_set: HashSet<String>,
}

impl PkgSnapshot {
    fn build(generation: u64, listed: Vec<AppInfo>) -> Self {
        let mut apps = Vec::with_capacity(listed.len());
        let mut by_name = HashMap::with_capacity(listed.len());
        let mut uid_to_pkgs: HashMap<Uid, Vec<String>> = HashMap::new();
        let mut categories: [Vec<usize>; 7] = Default::default();
        let mut whitelist = Vec::new();
        let mut whitelist_set = HashSet::new();

        for app in listed {
            if by_name.contains_key(&app.pkg_name) {
                log::warn!("inventory listed {} twice, keeping the first", app.pkg_name);
                continue;
            }
            let idx = apps.len();
            by_name.insert(app.pkg_name.clone(), idx);
            uid_to_pkgs
                .entry(app.uid)
                .or_default()
                .push(app.pkg_name.clone());
            for (slot, flag) in AppFlags::CATEGORY_ORDER.iter().enumerate() {
                if app.is_a(*flag) {
                    categories[slot].push(idx);
                }
            }
            if app.is_a(AppFlags::WHITE_LISTED) {
                whitelist.push(app.pkg_name.clone());
                whitelist_set.insert(app.pkg_name.clone());
            }
            apps.push(app);
        }

        Self {
            generation,
            apps,
            by_name,
            uid_to_pkgs,
            categories,
            whitelist,
            whitelist_set,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Every app in inventory order
    pub fn apps(&self) -> &[AppInfo] {
        &self.apps
    }

    pub fn pkg_names_for_uid(&self, uid: Uid) -> Option<&[String]> {
        self.uid_to_pkgs.get(&uid).map(|it| it.as_slice())
    }

    pub fn uid_for_pkg_name(&self, pkg_name: &str) -> Option<Uid> {
        self.app_info(pkg_name).map(|it| it.uid)
    }

    pub fn app_info(&self, pkg_name: &str) -> Option<&AppInfo> {
        self.by_name.get(pkg_name).map(|idx| &self.apps[*idx])
    }

    /// Apps in a single category
    pub fn category(&self, category: AppFlags) -> impl Iterator<Item = &AppInfo> {
        let slot = AppFlags::CATEGORY_ORDER
            .iter()
            .position(|it| *it == category);
        let indexes: &[usize] = match slot {
            Some(v) => &self.categories[v],
            None => &[],
        };
        indexes.iter().map(|idx| &self.apps[*idx])
    }

    /// The union of every category selected by `flags`. Each app is listed
    /// once, in the order its first selected category was collected.
    pub fn installed_pkgs(&self, flags: AppFlags) -> Vec<&AppInfo> {
        let mut seen = HashSet::new();
        let mut res = Vec::new();
        for category in AppFlags::CATEGORY_ORDER {
            if !flags.contains(category) {
                continue;
            }
            log::debug!("installed_pkgs, adding {}", category.category_name());
            for app in self.category(category) {
                if seen.insert(app.pkg_name.as_str()) {
                    res.push(app);
                }
            }
        }
        res
    }

    pub fn whitelist(&self) -> &[String] {
        &self.whitelist
    }

    pub fn is_pkg_in_whitelist(&self, pkg_name: &str) -> bool {
        self.whitelist_set.contains(pkg_name)
    }
}

#[derive(Default)]
struct RebuildState {
    /// Message of the most recent rebuild attempt if it failed
    last_failure: Option<String>,
}

/// Lazily rebuilt cache of the installed packages
///
/// [PackageCache::invalidate] only bumps a generation counter, the next read
/// rebuilds from the bound [PackageInventory]. At most one rebuild runs at a
/// time and readers never see a partially built snapshot: reads racing a
/// rebuild wait for it, and when it fails they get its error.
pub struct PackageCache {
    provider: OnceCell<Box<dyn PackageInventory>>,
    generation: AtomicCell<u64>,
    snapshot: RwLock<Option<Arc<PkgSnapshot>>>,
    rebuild: Mutex<RebuildState>,
    attempts: AtomicCell<u64>,
    /// Rebuilds that have finished, either way. Only bumped under `rebuild`.
    completed: AtomicCell<u64>,
}

impl Default for PackageCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageCache {
    pub fn new() -> Self {
        Self {
            provider: OnceCell::new(),
            generation: AtomicCell::new(0),
            snapshot: RwLock::new(None),
            rebuild: Mutex::new(RebuildState::default()),
            attempts: AtomicCell::new(0),
            completed: AtomicCell::new(0),
        }
    }

    /// Bind the inventory the cache is rebuilt from. Nothing is loaded until
    /// the first read.
    pub fn on_start(&self, provider: Box<dyn PackageInventory>) {
        if self.provider.set(provider).is_err() {
            log::warn!("package cache already started, ignoring new inventory");
        }
    }

    pub fn is_started(&self) -> bool {
        self.provider.get().is_some()
    }

    /// Mark the cache stale. Never blocks and never touches the inventory.
    pub fn invalidate(&self) {
        let prev = self.generation.fetch_add(1);
        log::debug!("package cache invalidated (generation {})", prev + 1);
    }

    /// Whether the next read can be answered without a rebuild
    pub fn is_valid(&self) -> bool {
        match self.published() {
            Some(snap) => snap.generation == self.generation.load(),
            None => false,
        }
    }

    /// Number of times the inventory has been queried
    pub fn rebuild_attempts(&self) -> u64 {
        self.attempts.load()
    }

    fn published(&self) -> Option<Arc<PkgSnapshot>> {
        self.snapshot
            .read()
            .expect("failed to lock")
            .as_ref()
            .map(Arc::clone)
    }

    fn fresh(&self) -> Option<Arc<PkgSnapshot>> {
        let snap = self.published()?;
        if snap.generation == self.generation.load() {
            Some(snap)
        } else {
            None
        }
    }

    /// The current snapshot, rebuilding it first if the cache is invalid
    pub fn snapshot(&self) -> crate::Result<Arc<PkgSnapshot>> {
        if let Some(snap) = self.fresh() {
            return Ok(snap);
        }

        let seen_completed = self.completed.load();
        let mut state = self.rebuild.lock().expect("failed to lock");

        if let Some(snap) = self.fresh() {
            return Ok(snap);
        }

        // A rebuild finished while we were waiting, report its failure
        // instead of hitting the inventory again
        if self.completed.load() != seen_completed {
            if let Some(msg) = &state.last_failure {
                return Err(crate::Error::Provider(msg.clone()));
            }
        }

        let provider = match self.provider.get() {
            Some(v) => v,
            None => {
                return Err(crate::Error::Provider(String::from(
                    "package cache used before an inventory was bound",
                )))
            }
        };

        let generation = self.generation.load();
        self.attempts.fetch_add(1);
        log::debug!("rebuilding package cache for generation {}", generation);

        let listed = match provider.list_installed_packages() {
            Ok(v) => v,
            Err(e) => {
                let msg = match e.into_provider() {
                    crate::Error::Provider(msg) => msg,
                    other => other.to_string(),
                };
                log::error!("package cache rebuild failed: {}", msg);
                state.last_failure = Some(msg.clone());
                self.completed.fetch_add(1);
                return Err(crate::Error::Provider(msg));
            }
        };

        let snap = Arc::new(PkgSnapshot::build(generation, listed));
        log::debug!(
            "package cache rebuilt with {} packages across {} uids",
            snap.apps.len(),
            snap.uid_to_pkgs.len()
        );
        *self.snapshot.write().expect("failed to lock") = Some(Arc::clone(&snap));
        state.last_failure = None;
        self.completed.fetch_add(1);
        Ok(snap)
    }

    pub fn pkg_names_for_uid(&self, uid: Uid) -> crate::Result<Option<Vec<String>>> {
        Ok(self.snapshot()?.pkg_names_for_uid(uid).map(|it| it.to_vec()))
    }

    pub fn uid_for_pkg_name(&self, pkg_name: &str) -> crate::Result<Option<Uid>> {
        Ok(self.snapshot()?.uid_for_pkg_name(pkg_name))
    }

    pub fn installed_pkgs(&self, flags: AppFlags) -> crate::Result<Vec<AppInfo>> {
        let snap = self.snapshot()?;
        Ok(snap.installed_pkgs(flags).into_iter().cloned().collect())
    }

    pub fn app_info(&self, pkg_name: &str) -> crate::Result<Option<AppInfo>> {
        Ok(self.snapshot()?.app_info(pkg_name).cloned())
    }

    pub fn all_apps(&self) -> crate::Result<Vec<AppInfo>> {
        Ok(self.snapshot()?.apps().to_vec())
    }

    pub fn whitelist_pkgs(&self) -> crate::Result<Vec<String>> {
        Ok(self.snapshot()?.whitelist().to_vec())
    }

    pub fn is_pkg_in_whitelist(&self, pkg_name: &str) -> crate::Result<bool> {
        Ok(self.snapshot()?.is_pkg_in_whitelist(pkg_name))
    }
}
