//! Logging setup.
//!
//! Console logging on stderr plus optional rolling files. The root logger
//! stays off unless explicitly opted in with `root=<level>`, so only this
//! workspace's crates log by default; dependency noise needs a deliberate
//! override.
//!
//! Filter grammar, comma-separated: a bare level (`debug`) sets the level
//! for the workspace crates, `module=level` pins one module, and
//! `root=level` opens the root logger for everything else.

use std::path::Path;

use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::filter::threshold::ThresholdFilter;

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l:5}] {m} [{M}] [{I}]{n}";

const LOG_FILE_NAME: &str = "civicserve.log";
const ERR_LOG_FILE_NAME: &str = "civicserve_err.log";
const ROLL_FILE_PATTERN: &str = "civicserve.{}.log.gz";

/// 50 MB per file before rolling.
const FILE_SIZE_LIMIT: u64 = 50 * 1024 * 1024;
const ROLL_COUNT: u32 = 5;

/// Crates raised to the app level without an explicit override.
const WHITELISTED_CRATES: &[&str] = &["civicserve_core", "civicserve_service"];

/// Initializes log4rs. `log_dir` of `None` keeps logging console-only.
///
/// Initialization failures fall through silently; a service that cannot
/// set up logging still has to serve.
pub fn init_logger(log_dir: Option<&str>, filters: &str) {
    let app_level = parse_app_level(filters);
    let root_level = parse_root_override(filters).unwrap_or(LevelFilter::Off);
    let module_levels = parse_module_levels(filters);

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build();

    let mut config_builder =
        Config::builder().appender(Appender::builder().build("stderr", Box::new(stderr)));
    let mut root_builder = Root::builder().appender("stderr");

    if let Some(dir) = log_dir {
        let roll_pattern = Path::new(dir).join(ROLL_FILE_PATTERN);
        let roller = FixedWindowRoller::builder()
            .build(&roll_pattern.to_string_lossy(), ROLL_COUNT)
            .ok();
        let file_appender = roller.and_then(|roller| {
            let policy =
                CompoundPolicy::new(Box::new(SizeTrigger::new(FILE_SIZE_LIMIT)), Box::new(roller));
            RollingFileAppender::builder()
                .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
                .build(Path::new(dir).join(LOG_FILE_NAME), Box::new(policy))
                .ok()
        });
        if let Some(appender) = file_appender {
            config_builder = config_builder
                .appender(Appender::builder().build("file", Box::new(appender)));
            root_builder = root_builder.appender("file");
        }

        // Separate warn-and-up file so operators can tail failures alone.
        let err_appender = log4rs::append::file::FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build(Path::new(dir).join(ERR_LOG_FILE_NAME))
            .ok();
        if let Some(appender) = err_appender {
            config_builder = config_builder.appender(
                Appender::builder()
                    .filter(Box::new(ThresholdFilter::new(log::LevelFilter::Warn)))
                    .build("err_file", Box::new(appender)),
            );
            root_builder = root_builder.appender("err_file");
        }
    }

    for crate_name in WHITELISTED_CRATES {
        let overridden = module_levels.iter().any(|(module, _)| module == crate_name);
        if !overridden {
            config_builder =
                config_builder.logger(Logger::builder().build(*crate_name, app_level));
        }
    }
    for (module, level) in &module_levels {
        config_builder = config_builder.logger(Logger::builder().build(module, *level));
    }

    match config_builder.build(root_builder.build(root_level)) {
        Ok(config) => {
            let _ = log4rs::init_config(config);
        }
        Err(err) => {
            eprintln!("failed to build logging config: {err}");
        }
    }
}

/// Level applied to the workspace crates: the first bare token that names
/// a level. Defaults to `info`.
pub fn parse_app_level(filters: &str) -> LevelFilter {
    for token in filters.split(',') {
        let token = token.trim();
        if token.is_empty() || token.contains('=') {
            continue;
        }
        if let Ok(level) = token.parse::<LevelFilter>() {
            return level;
        }
    }
    LevelFilter::Info
}

/// Explicit `root=<level>` override, opening the root logger to
/// dependencies.
pub fn parse_root_override(filters: &str) -> Option<LevelFilter> {
    for token in filters.split(',') {
        let token = token.trim();
        if let Some(value) = token.strip_prefix("root=") {
            if let Ok(level) = value.parse::<LevelFilter>() {
                return Some(level);
            }
        }
    }
    None
}

/// `module=level` pairs, excluding the `root` pseudo-module.
pub fn parse_module_levels(filters: &str) -> Vec<(String, LevelFilter)> {
    let mut levels = Vec::new();
    for token in filters.split(',') {
        let token = token.trim();
        let Some((module, value)) = token.split_once('=') else {
            continue;
        };
        if module == "root" {
            continue;
        }
        if let Ok(level) = value.parse::<LevelFilter>() {
            levels.push((module.to_string(), level));
        }
    }
    levels
}
