use std::sync::{Arc, RwLock};

use super::cache::PackageCache;
use crate::Uid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageEvent {
    Added {
        pkg_name: String,
        uid: Uid,
    },
    Removed {
        pkg_name: String,
        uid: Uid,
    },
    Changed {
        pkg_name: String,
        uid: Uid,
        components: Vec<String>,
    },
}

impl PackageEvent {
    pub fn pkg_name(&self) -> &str {
        match self {
            Self::Added { pkg_name, .. }
            | Self::Removed { pkg_name, .. }
            | Self::Changed { pkg_name, .. } => pkg_name,
        }
    }
}

/// Receives package change notifications
pub trait PackageEventListener: Send + Sync {
    fn on_package_event(&self, event: &PackageEvent);
}

/// Something package events can be subscribed to
pub trait PackageMonitor: Send + Sync {
    fn register(&self, listener: Arc<dyn PackageEventListener>);

    fn unregister(&self, listener: &Arc<dyn PackageEventListener>);
}

/// Invalidates a [PackageCache] on every event, whatever its kind
pub struct CacheInvalidator {
    cache: Arc<PackageCache>,
}

impl CacheInvalidator {
    pub fn new(cache: Arc<PackageCache>) -> Self {
        Self { cache }
    }
}

impl PackageEventListener for CacheInvalidator {
    fn on_package_event(&self, event: &PackageEvent) {
        log::debug!("package event for {}, invalidating", event.pkg_name());
        self.cache.invalidate();
    }
}

/// In process [PackageMonitor]. Listeners are called synchronously from
/// [LocalPackageMonitor::dispatch] on the caller's thread.
#[derive(Default)]
pub struct LocalPackageMonitor {
    listeners: RwLock<Vec<Arc<dyn PackageEventListener>>>,
}

impl LocalPackageMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().expect("failed to lock").len()
    }

    pub fn dispatch(&self, event: &PackageEvent) {
        let listeners = self.listeners.read().expect("failed to lock").clone();
        for listener in listeners {
            listener.on_package_event(event);
        }
    }

    pub fn package_added(&self, pkg_name: &str, uid: Uid) {
        self.dispatch(&PackageEvent::Added {
            pkg_name: pkg_name.into(),
            uid,
        })
    }

    pub fn package_removed(&self, pkg_name: &str, uid: Uid) {
        self.dispatch(&PackageEvent::Removed {
            pkg_name: pkg_name.into(),
            uid,
        })
    }

    pub fn package_changed(&self, pkg_name: &str, uid: Uid, components: &[String]) {
        self.dispatch(&PackageEvent::Changed {
            pkg_name: pkg_name.into(),
            uid,
            components: components.to_vec(),
        })
    }
}

impl PackageMonitor for LocalPackageMonitor {
    fn register(&self, listener: Arc<dyn PackageEventListener>) {
        self.listeners.write().expect("failed to lock").push(listener);
    }

    fn unregister(&self, listener: &Arc<dyn PackageEventListener>) {
        self.listeners
            .write()
            .expect("failed to lock")
            .retain(|it| !Arc::ptr_eq(it, listener));
    }
}
