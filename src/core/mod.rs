// Core library modules
pub mod algorithms;
pub mod attack;
pub mod checksum;
pub mod config;
pub mod error;
pub mod iw_dump;
pub mod lookup;
pub mod mac;
pub mod network;
pub mod pins;
pub mod resolver;
pub mod root_gate;
pub mod scanner;
pub mod shell;
pub mod wps;

// Re-exports
pub use algorithms::{
    AlgorithmId, AlgorithmOutcome, AlgorithmRegistry, DirectorySerialSource, NoSerialSource,
    SerialSource, StaticSerialSource, SuggestedPin, WpsAlgorithm, SUGGESTED_ALGORITHMS,
};
pub use attack::{
    collect_outcome, dispatch, AttackEvent, AttackExecutor, AttackOutcome, AttackRequest,
};
pub use checksum::{calculate_wps_checksum, format_with_checksum, is_valid_pin};
pub use config::EngineConfig;
pub use error::{AlgorithmError, AlgorithmResult};
pub use iw_dump::{
    parse_scan_dump, parse_scan_dump_text, FileDumpSource, IwDumpSource, WpsDumpSource,
};
pub use lookup::{InMemoryPinDatabase, InMemoryVendorLookup, PinDatabase, VendorLookup};
pub use network::{
    classify_security, estimate_distance, frequency_to_band, frequency_to_channel,
    sort_for_display, NetworkRecord, ScanEntry, SecurityType, SignalStrength, WifiBand,
};
pub use pins::{merge_candidates, PinCandidate, PinCandidateService};
pub use resolver::WpsCapabilityResolver;
pub use root_gate::{
    FixedPrivilegeBroker, PrivilegeBroker, RootGate, RootState, ShellPrivilegeBroker,
};
pub use scanner::ScanProcessor;
pub use shell::{CommandShell, ShellCommand, ShellExecutor, ShellOutput};
pub use wps::{ConfigMethods, WpsDetail, WpsMethod};
