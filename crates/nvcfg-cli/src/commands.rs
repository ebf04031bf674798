use colored::Colorize;
use nvcfg_config::{checksum, encoded_len, ConfigError, ConfigStore, CONFIG_KEY};
use nvcfg_kv::{FsKv, FsKvConfig, KvBackend, KvError, KvHandle, OpenMode, SyncMode};
use serde::Serialize;

use crate::cli::*;
use crate::settings::DeviceSettings;

type Store = ConfigStore<DeviceSettings, FsKv>;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let kv = FsKv::new(FsKvConfig {
        root: cli.root.clone(),
        sync_mode: if cli.sync { SyncMode::EveryWrite } else { SyncMode::OsDefault },
    });
    let json = matches!(cli.format, OutputFormat::Json);

    match cli.command {
        Command::Show(args) => cmd_show(&kv, &args.namespace, json),
        Command::Bump(args) => cmd_bump(&kv, &args.namespace, json),
        Command::Inspect(args) => cmd_inspect(&kv, &args.namespace, json),
        Command::Erase(args) => cmd_erase(&kv, &args.namespace),
        Command::List => cmd_list(&kv, json),
        Command::Checksum(args) => cmd_checksum(&args.hex, json),
    }
}

/// Outcome of loading (and possibly updating) a namespace.
#[derive(Debug, Serialize)]
struct RecordReport {
    namespace: String,
    loaded: bool,
    saved: Option<bool>,
    settings: DeviceSettings,
}

fn show(kv: &FsKv, namespace: &str) -> RecordReport {
    let mut store = Store::new(namespace, kv.clone());
    let loaded = store.load();
    RecordReport {
        namespace: namespace.to_string(),
        loaded,
        saved: None,
        settings: store.data,
    }
}

/// Load, and only if a stored record was accepted, bump and save it.
fn bump(kv: &FsKv, namespace: &str) -> RecordReport {
    let mut store = Store::new(namespace, kv.clone());
    let loaded = store.load();
    let saved = if loaded {
        store.data.bump();
        Some(store.save())
    } else {
        None
    };
    RecordReport {
        namespace: namespace.to_string(),
        loaded,
        saved,
        settings: store.data,
    }
}

fn print_record(report: &RecordReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    if report.loaded {
        println!("{} Loaded {}", "✓".green().bold(), report.namespace.bold());
    } else {
        println!(
            "{} No valid configuration in {}; defaults restored",
            "!".yellow().bold(),
            report.namespace.bold()
        );
    }
    match report.saved {
        Some(true) => println!("  {}", "saved".green()),
        Some(false) => println!("  {}", "save failed".red()),
        None => {}
    }
    println!("  setting1: {}", report.settings.setting1.to_string().cyan());
    println!("  enabled:  {}", report.settings.enabled.to_string().cyan());
    Ok(())
}

fn cmd_show(kv: &FsKv, namespace: &str, json: bool) -> anyhow::Result<()> {
    print_record(&show(kv, namespace), json)
}

fn cmd_bump(kv: &FsKv, namespace: &str, json: bool) -> anyhow::Result<()> {
    let report = bump(kv, namespace);
    print_record(&report, json)?;
    if report.saved == Some(false) {
        anyhow::bail!("failed to save {namespace}");
    }
    Ok(())
}

/// Read-only view of the stored blob.
#[derive(Debug, Serialize)]
struct InspectReport {
    namespace: String,
    expected_len: usize,
    stored_len: Option<usize>,
    stored_checksum: Option<u16>,
    computed_checksum: Option<u16>,
    hex: Option<String>,
    verdict: String,
    valid: bool,
}

fn read_raw(kv: &FsKv, namespace: &str) -> anyhow::Result<Option<Vec<u8>>> {
    let handle = match kv.open(namespace, OpenMode::ReadOnly) {
        Ok(handle) => handle,
        Err(KvError::NamespaceNotFound(_)) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let Some(len) = handle.value_len(CONFIG_KEY)? else {
        return Ok(None);
    };
    let mut blob = vec![0u8; len];
    let read = handle.get_bytes(CONFIG_KEY, &mut blob)?;
    blob.truncate(read);
    Ok(Some(blob))
}

fn inspect(kv: &FsKv, namespace: &str) -> anyhow::Result<InspectReport> {
    let blob = read_raw(kv, namespace)?;
    let (stored_checksum, computed_checksum) = match blob.as_deref() {
        Some(bytes) if bytes.len() >= 2 => {
            let (image, trailer) = bytes.split_at(bytes.len() - 2);
            (
                Some(u16::from_le_bytes([trailer[0], trailer[1]])),
                Some(checksum(image)),
            )
        }
        _ => (None, None),
    };

    let store = Store::new(namespace, kv.clone());
    let (valid, verdict) = match store.read_verified() {
        Ok(_) => (true, "ok".to_string()),
        Err(e @ ConfigError::StorageUnavailable(_)) if !e.is_missing() => return Err(e.into()),
        Err(e) => (false, e.to_string()),
    };

    Ok(InspectReport {
        namespace: namespace.to_string(),
        expected_len: encoded_len::<DeviceSettings>(),
        stored_len: blob.as_ref().map(Vec::len),
        stored_checksum,
        computed_checksum,
        hex: blob.as_deref().map(hex::encode),
        verdict,
        valid,
    })
}

fn cmd_inspect(kv: &FsKv, namespace: &str, json: bool) -> anyhow::Result<()> {
    let report = inspect(kv, namespace)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let fmt_len = |len: Option<usize>| len.map_or_else(|| "-".into(), |l| l.to_string());
    let fmt_crc = |crc: Option<u16>| crc.map_or_else(|| "-".into(), |c| format!("0x{c:04X}"));

    println!("Namespace {}", report.namespace.bold());
    println!("  length:   {} (expected {})", fmt_len(report.stored_len), report.expected_len);
    println!("  stored:   {}", fmt_crc(report.stored_checksum));
    println!("  computed: {}", fmt_crc(report.computed_checksum));
    if let Some(hex) = &report.hex {
        println!("  bytes:    {}", hex.dimmed());
    }
    if report.valid {
        println!("{} {}", "✓".green().bold(), report.verdict.green());
    } else {
        println!("{} {}", "✗".red().bold(), report.verdict.red());
    }
    Ok(())
}

fn cmd_erase(kv: &FsKv, namespace: &str) -> anyhow::Result<()> {
    let store = Store::new(namespace, kv.clone());
    store.try_erase()?;
    println!("{} Erased {}", "✓".green(), namespace.bold());
    Ok(())
}

fn cmd_list(kv: &FsKv, json: bool) -> anyhow::Result<()> {
    let names = kv.namespaces()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&names)?);
    } else if names.is_empty() {
        println!("No namespaces under {}.", kv.root().display());
    } else {
        for name in &names {
            println!("{}", name.yellow());
        }
    }
    Ok(())
}

fn parse_hex(input: &str) -> anyhow::Result<Vec<u8>> {
    let digits = input.strip_prefix("0x").unwrap_or(input);
    Ok(hex::decode(digits)?)
}

fn cmd_checksum(input: &str, json: bool) -> anyhow::Result<()> {
    let bytes = parse_hex(input)?;
    let crc = checksum(&bytes);
    if json {
        println!("{}", serde_json::json!({ "len": bytes.len(), "checksum": crc }));
    } else {
        println!("0x{crc:04X}");
    }
    Ok(())
}
