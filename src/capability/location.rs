use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread,
};

use serde::{Deserialize, Serialize};

use crate::error::SensorError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl Location {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat: Some(lat),
            lon: Some(lon),
        }
    }

    pub const fn unknown() -> Self {
        Self {
            lat: None,
            lon: None,
        }
    }

    /// Both coordinates, or nothing.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lon)
    }
}

pub trait LocationProvider: Send {
    /// Last cached value; never blocks.
    fn current(&self) -> Location;
    /// Fire-and-forget cache update.
    fn refresh(&self);
}

/// Blocking last-known-location lookup.
pub trait LocationResolver: Send + Sync + 'static {
    fn resolve(&self) -> Result<Location, SensorError>;
}

impl<F> LocationResolver for F
where
    F: Fn() -> Result<Location, SensorError> + Send + Sync + 'static,
{
    fn resolve(&self) -> Result<Location, SensorError> {
        self()
    }
}

pub struct FixedLocation(pub Location);

impl LocationProvider for FixedLocation {
    fn current(&self) -> Location {
        self.0
    }

    fn refresh(&self) {}
}

struct LocationCache<R> {
    resolver: R,
    cached: Mutex<Location>,
    fallback: Option<Location>,
    in_flight: AtomicBool,
}

impl<R: LocationResolver> LocationCache<R> {
    fn refresh_now(&self) {
        let resolved = self.resolver.resolve();
        let Ok(mut cached) = self.cached.lock() else {
            return;
        };
        match resolved {
            Ok(location) if location.coordinates().is_some() => *cached = location,
            Ok(_) => log::debug!("location lookup returned no fix"),
            Err(err) => {
                log::warn!("location lookup failed: {err}");
                if cached.coordinates().is_none() {
                    if let Some(fallback) = self.fallback {
                        *cached = fallback;
                    }
                }
            }
        }
    }
}

/// Caches the result of a [`LocationResolver`] that runs on a detached thread.
pub struct CachedLocationProvider<R: LocationResolver> {
    inner: Arc<LocationCache<R>>,
}

impl<R: LocationResolver> CachedLocationProvider<R> {
    pub fn new(resolver: R) -> Self {
        Self::with_fallback(resolver, None)
    }

    pub fn with_fallback(resolver: R, fallback: Option<Location>) -> Self {
        Self {
            inner: Arc::new(LocationCache {
                resolver,
                cached: Mutex::new(Location::unknown()),
                fallback,
                in_flight: AtomicBool::new(false),
            }),
        }
    }

    /// Synchronous variant of [`LocationProvider::refresh`].
    pub fn refresh_now(&self) {
        self.inner.refresh_now();
    }
}

impl<R: LocationResolver> LocationProvider for CachedLocationProvider<R> {
    fn current(&self) -> Location {
        self.inner
            .cached
            .lock()
            .map(|cached| *cached)
            .unwrap_or_default()
    }

    fn refresh(&self) {
        if self.inner.in_flight.swap(true, Ordering::AcqRel) {
            return;
        }
        let inner = Arc::clone(&self.inner);
        let spawned = thread::Builder::new()
            .name("sos-location".to_string())
            .spawn(move || {
                inner.refresh_now();
                inner.in_flight.store(false, Ordering::Release);
            });
        if let Err(err) = spawned {
            log::warn!("location refresh not started: {err}");
            self.inner.in_flight.store(false, Ordering::Release);
        }
    }
}
