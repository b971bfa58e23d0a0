/*!
 * wpsrecon command line
 *
 * Thin front end over the library:
 * - `pins`: prioritised PIN candidates for one BSSID
 * - `generate`: run a single derivation algorithm
 * - `parse-dump`: decode a captured `iw ... scan dump`
 * - `classify`: derive channel/band/security for one scan sample
 * - `enrich`: run a full scan cycle over JSON scan entries
 */

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use wpsrecon::core::{
    algorithms::AlgorithmId, AlgorithmOutcome, AlgorithmRegistry, CommandShell,
    DirectorySerialSource, EngineConfig, FileDumpSource, FixedPrivilegeBroker,
    InMemoryPinDatabase, InMemoryVendorLookup, IwDumpSource, NetworkRecord, PinCandidateService,
    PinDatabase, PrivilegeBroker, RootGate, ScanEntry, ScanProcessor, SerialSource, ShellExecutor,
    ShellPrivilegeBroker, VendorLookup, WpsCapabilityResolver, WpsDetail, WpsDumpSource,
};

#[derive(Parser, Debug)]
#[command(name = "wpsrecon", version, about = "WPS reconnaissance and PIN candidates")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print prioritised PIN candidates
    Pins {
        bssid: String,
        #[arg(long)]
        ssid: Option<String>,
        /// Extra database PIN for this BSSID (repeatable)
        #[arg(long = "db-pin")]
        db_pins: Vec<String>,
    },

    /// Run one algorithm by numeric code (101-117)
    Generate {
        code: u16,
        bssid: String,
        #[arg(long)]
        ssid: Option<String>,
    },

    /// Print the WPS map of a captured scan dump as JSON
    ParseDump { file: PathBuf },

    /// Derive channel, band, distance and security for one sample
    Classify {
        #[arg(long, default_value = "")]
        capabilities: String,
        #[arg(long)]
        frequency: i32,
        #[arg(long, allow_hyphen_values = true)]
        signal: i32,
    },

    /// Enrich a JSON array of scan entries
    Enrich {
        scan_file: PathBuf,
        /// Use a captured dump instead of running iw
        #[arg(long, conflicts_with = "live")]
        dump: Option<PathBuf>,
        /// Probe for root and run iw
        #[arg(long)]
        live: bool,
    },
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path),
        None => Ok(EngineConfig::default()),
    }
}

fn build_registry(config: &EngineConfig) -> AlgorithmRegistry {
    match &config.serial_dir {
        Some(dir) => {
            let serials: Arc<dyn SerialSource> = Arc::new(DirectorySerialSource::new(dir));
            AlgorithmRegistry::new(serials)
        }
        None => AlgorithmRegistry::without_serials(),
    }
}

fn build_pin_database(
    config: &EngineConfig,
    bssid: &str,
    extra: &[String],
) -> Result<InMemoryPinDatabase> {
    let db = match &config.pin_database_path {
        Some(path) => InMemoryPinDatabase::from_json_file(path, config.max_database_pins)?,
        None => InMemoryPinDatabase::new(config.max_database_pins),
    };
    Ok(db.with_pins(bssid, extra.iter().cloned()))
}

fn build_vendor_lookup(config: &EngineConfig) -> InMemoryVendorLookup {
    config
        .vendor_database_path
        .as_deref()
        .and_then(|path| match InMemoryVendorLookup::from_json_file(path) {
            Ok(lookup) => Some(lookup),
            Err(e) => {
                warn!("vendor database unavailable: {:#}", e);
                None
            }
        })
        .unwrap_or_default()
}

async fn run_pins(
    config: &EngineConfig,
    bssid: &str,
    ssid: Option<&str>,
    db_pins: &[String],
) -> Result<()> {
    if let Some(bad) = db_pins
        .iter()
        .find(|p| p.len() != 8 || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        bail!("database PIN '{}' is not 8 digits", bad);
    }

    let database: Arc<dyn PinDatabase> = Arc::new(build_pin_database(config, bssid, db_pins)?);
    let service = PinCandidateService::new(Arc::new(build_registry(config)), database, config);

    let candidates = service.candidates(bssid, ssid).await;
    println!("PIN candidates for {}:", bssid);
    for (index, candidate) in candidates.iter().enumerate() {
        println!("{:>3}. {}  {}", index + 1, candidate.pin, candidate.source);
    }
    Ok(())
}

fn run_generate(config: &EngineConfig, code: u16, bssid: &str, ssid: Option<&str>) -> Result<()> {
    let id = AlgorithmId::from_code(code)
        .with_context(|| format!("unknown algorithm code {}", code))?;

    match build_registry(config).generate_pin(id, bssid, ssid) {
        AlgorithmOutcome::Success {
            pin,
            algorithm_name,
        } => println!("{} --{}", pin, algorithm_name),
        AlgorithmOutcome::Failure { reason } => bail!("{}: {}", id.display_name(), reason),
    }
    Ok(())
}

fn run_parse_dump(file: &Path) -> Result<()> {
    let text =
        std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let map: BTreeMap<String, WpsDetail> = wpsrecon::core::parse_scan_dump_text(&text)
        .into_iter()
        .collect();
    println!("{}", serde_json::to_string_pretty(&map)?);
    Ok(())
}

fn run_classify(capabilities: &str, frequency: i32, signal: i32) {
    let entry = ScanEntry {
        bssid: String::new(),
        ssid: String::new(),
        signal_level: signal,
        frequency,
        capabilities: capabilities.to_string(),
    };
    let wps = capabilities
        .to_ascii_uppercase()
        .contains("WPS")
        .then(|| WpsDetail::from_capabilities(capabilities));
    let record = NetworkRecord::from_scan(&entry, None, wps, "");

    println!("channel:   {}", record.channel());
    println!("band:      {}", record.band());
    println!("distance:  {:.2} m (estimate)", record.distance());
    println!("security:  {}", record.security());
    println!("signal:    {:?}", record.signal_strength());
    match &record.wps {
        Some(detail) => println!("wps:       {}", detail.summary()),
        None => println!("wps:       none advertised"),
    }
}

async fn run_enrich(
    config: &EngineConfig,
    scan_file: &Path,
    dump: Option<&Path>,
    live: bool,
) -> Result<()> {
    let text = tokio::fs::read_to_string(scan_file)
        .await
        .with_context(|| format!("reading {}", scan_file.display()))?;
    let entries: Vec<ScanEntry> =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", scan_file.display()))?;

    let shell: Arc<dyn ShellExecutor> = Arc::new(CommandShell::with_privilege_prefix(
        config.privilege_prefix.clone(),
    ));
    let (broker, source): (Arc<dyn PrivilegeBroker>, Arc<dyn WpsDumpSource>) = match dump {
        Some(path) => (
            Arc::new(FixedPrivilegeBroker(true)),
            Arc::new(FileDumpSource::new(path)),
        ),
        None => (
            Arc::new(ShellPrivilegeBroker::new(shell.clone())),
            Arc::new(IwDumpSource::new(shell, config)),
        ),
    };
    let gate = Arc::new(RootGate::new(broker));

    // Without --live or --dump the gate stays unprobed and only heuristics are used
    if dump.is_some() || live {
        let granted = gate.probe().await;
        info!(granted, "privileged WPS source");
    }

    let vendors: Arc<dyn VendorLookup> = Arc::new(build_vendor_lookup(config));
    let resolver = Arc::new(WpsCapabilityResolver::new(gate, source));
    let processor = ScanProcessor::new(resolver, vendors, config);

    for record in processor.process(&entries).await {
        let wps = record
            .wps
            .as_ref()
            .map(|d| {
                let origin = if d.from_authoritative_source { "iw" } else { "caps" };
                format!("{} ({})", d.summary(), origin)
            })
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  {:<24} ch{:<4} {:>4} dBm  {:<9} {:<12} {}",
            record.bssid,
            record.ssid,
            record.channel(),
            record.signal_level,
            record.security().to_string(),
            record.vendor,
            wps
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(
            cli.log_level
                .parse::<tracing_subscriber::filter::LevelFilter>()
                .unwrap_or(tracing_subscriber::filter::LevelFilter::INFO),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Pins {
            bssid,
            ssid,
            db_pins,
        } => run_pins(&config, &bssid, ssid.as_deref(), &db_pins).await,
        Command::Generate { code, bssid, ssid } => {
            run_generate(&config, code, &bssid, ssid.as_deref())
        }
        Command::ParseDump { file } => run_parse_dump(&file),
        Command::Classify {
            capabilities,
            frequency,
            signal,
        } => {
            run_classify(&capabilities, frequency, signal);
            Ok(())
        }
        Command::Enrich {
            scan_file,
            dump,
            live,
        } => run_enrich(&config, &scan_file, dump.as_deref(), live).await,
    }
}
