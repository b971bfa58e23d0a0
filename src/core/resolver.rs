/*!
 * WPS capability resolution
 *
 * Two tiers per BSSID:
 * 1. heuristic detail from the capability string (always available)
 * 2. authoritative detail from the last iw dump (root only), which fully
 *    replaces the heuristic one when present
 */

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

use super::iw_dump::WpsDumpSource;
use super::mac;
use super::root_gate::{RootGate, RootState};
use super::wps::WpsDetail;

pub struct WpsCapabilityResolver {
    root: Arc<RootGate>,
    source: Arc<dyn WpsDumpSource>,
    authoritative: RwLock<HashMap<String, WpsDetail>>,
}

impl WpsCapabilityResolver {
    pub fn new(root: Arc<RootGate>, source: Arc<dyn WpsDumpSource>) -> Self {
        Self {
            root,
            source,
            authoritative: RwLock::new(HashMap::new()),
        }
    }

    /// Rebuild the authoritative map for a new scan cycle.
    ///
    /// Only consults the cached root state, so it never waits on a consent
    /// prompt. Without root the map is emptied and every lookup falls back
    /// to the heuristic tier. Returns the number of authoritative entries.
    pub async fn refresh(&self) -> usize {
        let fresh = if self.root.peek_cached() == RootState::Granted {
            self.source.fetch_wps_map().await
        } else {
            debug!("root not granted, using capability heuristics only");
            HashMap::new()
        };

        let count = fresh.len();
        match self.authoritative.write() {
            Ok(mut map) => *map = fresh,
            Err(poisoned) => *poisoned.into_inner() = fresh,
        }
        info!(entries = count, "WPS authoritative map refreshed");
        count
    }

    /// Authoritative entry for `bssid` from the last refresh
    pub fn authoritative_for(&self, bssid: &str) -> Option<WpsDetail> {
        let key = mac::canonical(bssid).unwrap_or_else(|| bssid.to_ascii_uppercase());
        let map = match self.authoritative.read() {
            Ok(map) => map,
            Err(poisoned) => poisoned.into_inner(),
        };
        map.get(&key).cloned()
    }

    /// Merged detail: authoritative if known, else heuristic when the
    /// capability string mentions WPS, else `None`
    pub fn resolve(&self, bssid: &str, capabilities: &str) -> Option<WpsDetail> {
        if let Some(detail) = self.authoritative_for(bssid) {
            return Some(detail);
        }
        if capabilities.to_ascii_uppercase().contains("WPS") {
            Some(WpsDetail::from_capabilities(capabilities))
        } else {
            None
        }
    }
}
