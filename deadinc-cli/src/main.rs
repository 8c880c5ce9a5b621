//! deadinc CLI - unused #include detector for C translation units.
//!
//! Features:
//! - Replays recorded front-end event streams (`*.events.jsonl`)
//! - Rayon-powered parallel analysis, one unit per stream
//! - Incremental caching for faster re-analysis
//! - Compiler-style or JSON output, CI-friendly exit codes

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::path::{Path, PathBuf};

use deadinc_core::{
    init_structured_logging, load_config, load_config_file, log_event, log_info, log_warn,
    print_json, print_plain, AnalyzerConfig, Deadinc, DeadincConfig,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Unused #include detector for C translation units")]
pub struct Cli {
    /// Event stream file, or a directory searched for *.events.jsonl
    #[arg(default_value = ".")]
    path: String,

    /// Output results in JSON format
    #[arg(long)]
    json: bool,

    /// Report every diagnostic as an error
    #[arg(long)]
    werror: bool,

    /// Configuration file (defaults to deadinc.toml next to the streams)
    #[arg(long, value_name = "FILE")]
    config: Option<String>,

    /// Do not read or write the incremental cache
    #[arg(long)]
    no_cache: bool,

    /// Fail on the first malformed event stream
    #[arg(long)]
    strict: bool,

    /// Drop diagnostics for included files matching this pattern (repeatable)
    #[arg(long, value_name = "PATTERN", action = ArgAction::Append)]
    ignore: Vec<String>,

    /// Path prefix of system headers (repeatable; replaces the configured list)
    #[arg(long, value_name = "PREFIX", action = ArgAction::Append)]
    system_prefix: Vec<String>,

    /// Suffix of trackable headers (repeatable; replaces the configured list)
    #[arg(long, value_name = "SUFFIX", action = ArgAction::Append)]
    header_suffix: Vec<String>,
}

/// Everything a run needs after merging the config file with flags.
#[derive(Debug)]
struct Settings {
    analyzer: AnalyzerConfig,
    ignore: Vec<String>,
    json: bool,
}

/// Directory holding `deadinc.toml` and the cache.
fn config_root(path: &Path) -> PathBuf {
    if path.is_file() {
        path.parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    } else {
        path.to_path_buf()
    }
}

/// Loads the config file. An explicit `--config` must load; an implicit
/// `deadinc.toml` that fails to parse is reported and ignored.
fn load_file_config(cli: &Cli, root: &Path) -> Result<Option<DeadincConfig>> {
    if let Some(ref file) = cli.config {
        let cfg = load_config_file(Path::new(file))
            .with_context(|| format!("Failed to load config: {}", file))?;
        return Ok(Some(cfg));
    }

    match load_config(root) {
        Ok(cfg) => Ok(cfg),
        Err(e) => {
            log_warn(&format!("config load failed: {:#}", e));
            eprintln!("[WARN] config load failed: {:#}", e);
            Ok(None)
        }
    }
}

/// Flags override file values; list flags replace, `--ignore` extends.
fn resolve_settings(cli: &Cli, file: Option<DeadincConfig>) -> Settings {
    let mut analyzer = AnalyzerConfig::default();
    let mut ignore = Vec::new();
    let mut json = cli.json;

    if let Some(cfg) = file {
        analyzer = cfg.analyzer;
        ignore.extend(cfg.ignore.unwrap_or_default());
        if let Some(format) = cfg.output.and_then(|o| o.format) {
            json |= format.eq_ignore_ascii_case("json");
        }
    }

    if cli.werror {
        analyzer.warnings_as_errors = true;
    }
    if !cli.system_prefix.is_empty() {
        analyzer.system_prefixes = cli.system_prefix.clone();
    }
    if !cli.header_suffix.is_empty() {
        analyzer.header_suffixes = cli.header_suffix.clone();
    }
    ignore.extend(cli.ignore.iter().cloned());

    Settings {
        analyzer,
        ignore,
        json,
    }
}

/// Runs the analysis and returns the process exit code.
fn run(cli: &Cli) -> Result<i32> {
    let input_path = Path::new(&cli.path);
    if !input_path.exists() {
        anyhow::bail!("Path does not exist: {}", cli.path);
    }

    // 1. Merge configuration
    let root = config_root(input_path);
    let settings = resolve_settings(cli, load_file_config(cli, &root)?);

    // 2. Analyze every stream
    let result = Deadinc::new(input_path)
        .with_config(settings.analyzer)
        .ignore_patterns(settings.ignore)
        .with_cache(!cli.no_cache)
        .strict(cli.strict)
        .analyze()
        .with_context(|| format!("Failed to analyze: {}", cli.path))?;

    log_info(&format!(
        "analyzed {} units, {} diagnostics, {} cache hits",
        result.units.len(),
        result.diagnostic_count(),
        result.cache_hits
    ));
    for failure in &result.failures {
        log_warn(&format!("skipped {}: {}", failure.source.display(), failure.message));
    }

    // 3. Report results
    if settings.json {
        print_json(&result);
    } else {
        print_plain(&result);
    }

    // 4. Exit code (CI-friendly)
    Ok(if result.has_errors() { 1 } else { 0 })
}

fn main() {
    // Global panic guard
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] deadinc internal error: {}", info);
        eprintln!("[PANIC] The process will exit with code 2.");
        std::process::exit(2);
    }));

    // Initialize structured logging (JSON to stderr, respects RUST_LOG)
    init_structured_logging();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            log_event("ERROR", &format!("{:#}", e));
            eprintln!("[ERROR] {:#}", e);
            std::process::exit(2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deadinc_core::OutputConfig;
    use std::fs;
    use std::io::Write;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn create_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::File::create(path)
            .unwrap()
            .write_all(content.as_bytes())
            .unwrap();
    }

    fn create_temp_dir(name: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let temp_dir = std::env::temp_dir()
            .join("deadinc_cli_test")
            .join(format!("{}_{}_{}", name, std::process::id(), id));
        if temp_dir.exists() {
            fs::remove_dir_all(&temp_dir).ok();
        }
        fs::create_dir_all(&temp_dir).unwrap();
        temp_dir
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("deadinc").chain(args.iter().copied())).unwrap()
    }

    const DEAD_UNIT: &str = r#"{"event":"main_file","path":"main.c"}
{"event":"include","file":"dead.h","line":1}
"#;

    // --- argument parsing ---

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.path, ".");
        assert!(!cli.json && !cli.werror && !cli.no_cache && !cli.strict);
        assert!(cli.ignore.is_empty());
    }

    #[test]
    fn test_repeated_list_flags() {
        let cli = parse(&[
            "events",
            "--system-prefix",
            "/usr/",
            "--system-prefix",
            "/opt/sdk/",
            "--header-suffix",
            ".h",
            "--header-suffix",
            ".hh",
        ]);
        assert_eq!(cli.path, "events");
        assert_eq!(cli.system_prefix, vec!["/usr/", "/opt/sdk/"]);
        assert_eq!(cli.header_suffix, vec![".h", ".hh"]);
    }

    #[test]
    fn test_list_flag_before_path_keeps_path() {
        let cli = parse(&["--ignore", "gen/", "events"]);
        assert_eq!(cli.ignore, vec!["gen/"]);
        assert_eq!(cli.path, "events");

        let cli = parse(&["--header-suffix", ".hh", "--system-prefix", "/sdk/", "build/events"]);
        assert_eq!(cli.header_suffix, vec![".hh"]);
        assert_eq!(cli.system_prefix, vec!["/sdk/"]);
        assert_eq!(cli.path, "build/events");
    }

    // --- settings resolution ---

    #[test]
    fn test_flags_override_file() {
        let file = DeadincConfig {
            analyzer: AnalyzerConfig {
                system_prefixes: vec!["/usr/".to_string(), "/sdk/".to_string()],
                ..AnalyzerConfig::default()
            },
            ignore: Some(vec!["generated/".to_string()]),
            output: Some(OutputConfig {
                format: Some("json".to_string()),
            }),
        };
        let cli = parse(&["--werror", "--system-prefix", "/nix/", "--ignore", "vendor/"]);

        let settings = resolve_settings(&cli, Some(file));
        assert!(settings.analyzer.warnings_as_errors);
        assert_eq!(settings.analyzer.system_prefixes, vec!["/nix/"]);
        assert_eq!(settings.ignore, vec!["generated/", "vendor/"]);
        assert!(settings.json);
    }

    #[test]
    fn test_no_file_uses_defaults() {
        let settings = resolve_settings(&parse(&[]), None);
        assert_eq!(settings.analyzer, AnalyzerConfig::default());
        assert!(!settings.json);
    }

    #[test]
    fn test_config_root_of_file_is_parent() {
        let dir = create_temp_dir("config_root");
        let file = dir.join("u.events.jsonl");
        create_file(&file, DEAD_UNIT);
        assert_eq!(config_root(&file), dir);
        assert_eq!(config_root(&dir), dir);
        fs::remove_dir_all(&dir).ok();
    }

    // --- exit codes ---

    #[test]
    fn test_warnings_exit_zero() {
        let dir = create_temp_dir("warnings");
        create_file(&dir.join("u.events.jsonl"), DEAD_UNIT);
        let cli = parse(&[dir.to_str().unwrap(), "--no-cache"]);
        assert_eq!(run(&cli).unwrap(), 0);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_werror_exit_one() {
        let dir = create_temp_dir("werror");
        create_file(&dir.join("u.events.jsonl"), DEAD_UNIT);
        let cli = parse(&[dir.to_str().unwrap(), "--no-cache", "--werror"]);
        assert_eq!(run(&cli).unwrap(), 1);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_file_werror() {
        let dir = create_temp_dir("config_werror");
        create_file(&dir.join("u.events.jsonl"), DEAD_UNIT);
        create_file(
            &dir.join("deadinc.toml"),
            "[analyzer]\nwarnings_as_errors = true\n",
        );
        let cli = parse(&[dir.to_str().unwrap(), "--no-cache"]);
        assert_eq!(run(&cli).unwrap(), 1);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_path_is_internal_failure() {
        let cli = parse(&["/definitely/not/here/deadinc"]);
        assert!(run(&cli).is_err());
    }

    #[test]
    fn test_strict_malformed_is_failure() {
        let dir = create_temp_dir("strict");
        create_file(&dir.join("bad.events.jsonl"), "{not json}\n");
        let cli = parse(&[dir.to_str().unwrap(), "--no-cache", "--strict"]);
        assert!(run(&cli).is_err());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_explicit_config_must_load() {
        let dir = create_temp_dir("explicit_config");
        create_file(&dir.join("u.events.jsonl"), DEAD_UNIT);
        let missing = dir.join("nope.toml");
        let cli = parse(&[
            dir.to_str().unwrap(),
            "--config",
            missing.to_str().unwrap(),
        ]);
        assert!(run(&cli).is_err());
        fs::remove_dir_all(&dir).ok();
    }
}
