/*!
 * Scan cycle: raw scan entries in, enriched and sorted records out
 */

use std::sync::Arc;
use tracing::{info, warn};

use super::config::EngineConfig;
use super::lookup::VendorLookup;
use super::network::{sort_for_display, NetworkRecord, ScanEntry};
use super::resolver::WpsCapabilityResolver;

pub struct ScanProcessor {
    resolver: Arc<WpsCapabilityResolver>,
    vendors: Arc<dyn VendorLookup>,
    hidden_label: String,
}

impl ScanProcessor {
    pub fn new(
        resolver: Arc<WpsCapabilityResolver>,
        vendors: Arc<dyn VendorLookup>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            resolver,
            vendors,
            hidden_label: config.hidden_ssid_label.clone(),
        }
    }

    /// Refresh the authoritative WPS map, then build one record per entry.
    /// Vendor lookup failures only cost the vendor name.
    pub async fn process(&self, entries: &[ScanEntry]) -> Vec<NetworkRecord> {
        let authoritative = self.resolver.refresh().await;

        let mut records = Vec::with_capacity(entries.len());
        for entry in entries {
            let vendor = match self.vendors.vendor_for(&entry.bssid).await {
                Ok(vendor) => vendor,
                Err(e) => {
                    warn!(bssid = %entry.bssid, "vendor lookup failed: {:#}", e);
                    None
                }
            };
            let wps = self.resolver.resolve(&entry.bssid, &entry.capabilities);
            records.push(NetworkRecord::from_scan(entry, vendor, wps, &self.hidden_label));
        }

        sort_for_display(&mut records);
        info!(
            networks = records.len(),
            wps = records.iter().filter(|r| r.has_wps()).count(),
            authoritative,
            "scan cycle processed"
        );
        records
    }
}
