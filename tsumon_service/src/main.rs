//! Tsunami early indicator daemon
//!
//! Polls the USGS earthquake feed, evaluates every record for tsunami
//! potential, and ticks marker timers once per second.
//!
//! Usage:
//!   tsumon_service [--once] [--show] [--replay <file.geojson>]
//!
//!   --once     run a single poll cycle, fire timers, then exit
//!   --show     act as the UI: create and check the tsunami toggle
//!   --replay   serve a saved GeoJSON snapshot instead of the live feed

use std::fs;
use std::thread;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};

use tsumon_service::config::Config;
use tsumon_service::dev_mode::DevMode;
use tsumon_service::ingest::usgs_quakes::{fetch_feed, within_region, QuakeFeature};
use tsumon_service::logging::{self, DataSource};
use tsumon_service::model::FeedError;
use tsumon_service::TsunamiMonitor;

struct Args {
    once: bool,
    show: bool,
    replay: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        once: false,
        show: false,
        replay: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--once" => args.once = true,
            "--show" => args.show = true,
            "--replay" => {
                args.replay = Some(iter.next().ok_or("--replay needs a file path")?);
            }
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }
    Ok(args)
}

enum FeedSource {
    Live {
        client: reqwest::blocking::Client,
        url: String,
        timeout: StdDuration,
    },
    Replay(DevMode),
}

impl FeedSource {
    fn fetch(&self) -> Result<Vec<QuakeFeature>, FeedError> {
        match self {
            FeedSource::Live { client, url, timeout } => fetch_feed(client, url, *timeout),
            FeedSource::Replay(dev) => dev.fetch_simulated_feed(),
        }
    }
}

fn poll_once(monitor: &mut TsunamiMonitor, source: &FeedSource, config: &Config, now: DateTime<Utc>) {
    let features = match source.fetch() {
        Ok(features) => features,
        Err(e) => {
            logging::log_feed_failure("feed fetch", &e);
            return;
        }
    };
    let regional: Vec<QuakeFeature> = features
        .into_iter()
        .filter(|f| within_region(f, &config.feed.region))
        .collect();

    let summary = monitor.evaluate_batch_at(&regional, now);
    logging::log_poll_summary(
        summary.received,
        summary.new_events(),
        summary.alerted.len(),
        summary.malformed,
    );
}

fn write_layer_snapshot(monitor: &TsunamiMonitor, path: &str) {
    let rendered = monitor.display().rendered();
    let result = serde_json::to_string_pretty(&rendered)
        .map_err(|e| e.to_string())
        .and_then(|json| fs::write(path, json).map_err(|e| e.to_string()));
    if let Err(e) = result {
        logging::error(DataSource::Display, None, &format!("writing layer snapshot {}: {}", path, e));
    }
}

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("usage: tsumon_service [--once] [--show] [--replay <file.geojson>]");
            std::process::exit(2);
        }
    };

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    // validate() already checked the level
    let level = config.log_level().unwrap_or(logging::LogLevel::Info);
    logging::init_logger(level, config.logging.file.as_deref(), config.logging.timestamps);

    let (source, poll_interval_secs) = match &args.replay {
        Some(path) => {
            let dev = DevMode::new(path);
            let interval = dev.update_interval_secs;
            logging::info(DataSource::System, None, &format!("replaying feed from {}", path));
            (FeedSource::Replay(dev), interval)
        }
        None => {
            let client = match reqwest::blocking::Client::builder().build() {
                Ok(client) => client,
                Err(e) => {
                    logging::error(DataSource::System, None, &format!("building HTTP client: {}", e));
                    std::process::exit(1);
                }
            };
            let source = FeedSource::Live {
                client,
                url: config.feed.url.clone(),
                timeout: StdDuration::from_secs(config.feed.request_timeout_secs),
            };
            (source, config.feed.poll_interval_secs)
        }
    };

    let mut monitor = TsunamiMonitor::from_config(&config);

    // The panel that owns the toggle is built after the monitor starts.
    monitor.attach_toggle(|_| false);
    if args.show {
        if let Some(setup) = monitor.control_created("chkTsunami") {
            logging::info(DataSource::Display, None, &format!("bound control '{}'", setup.control_id));
        }
        monitor.toggle_changed(true);
    }

    logging::info(
        DataSource::System,
        None,
        &format!(
            "tsunami monitor started: M>={}, depth<={} km, within {} km of a trench",
            config.thresholds.magnitude, config.thresholds.depth_km, config.thresholds.distance_km
        ),
    );

    let poll_interval = Duration::seconds(poll_interval_secs as i64);
    let mut next_poll = Utc::now();
    let mut polls = 0u64;
    loop {
        let now = Utc::now();
        if now >= next_poll && !(args.once && polls > 0) {
            poll_once(&mut monitor, &source, &config, now);
            next_poll = now + poll_interval;
            polls += 1;
        }
        monitor.run_due_tasks(now);
        if let Some(path) = &config.logging.layer_snapshot {
            write_layer_snapshot(&monitor, path);
        }

        if args.once && monitor.timers().is_empty() {
            break;
        }
        thread::sleep(StdDuration::from_secs(1));
    }
}
