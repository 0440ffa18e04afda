use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use cropscope::chart_export::ChartSize;
use cropscope::error_display::{user_message_from_load, user_message_from_report};
use cropscope::logging::{self, LogTarget};
use cropscope::print::{print_view, PrintOptions};
use cropscope::{
    App, AppConfig, CacheManager, ConfigManager, DatasetStore, InsightOptions, LoadOptions,
    APP_NAME, DEFAULT_DATA_FILE,
};
use cropscope_cli::Args;
use std::path::PathBuf;
use std::time::Duration;

/// Data file: command line, then config, then the default name in the working directory.
fn data_path(args: &Args, config: &AppConfig) -> PathBuf {
    args.path
        .clone()
        .or_else(|| config.data.path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE))
}

fn load_options(args: &Args, config: &AppConfig) -> Result<LoadOptions> {
    let mut opts = LoadOptions::new();
    if let Some(delimiter) = args.delimiter.or(config.data.delimiter) {
        if !delimiter.is_ascii() {
            return Err(eyre!(
                "Delimiter must be a single ASCII character, got '{}'",
                delimiter
            ));
        }
        opts = opts.with_delimiter(delimiter as u8);
    }
    Ok(opts)
}

fn insight_options(config: &AppConfig) -> InsightOptions {
    InsightOptions {
        top_n: config.insights.top_n,
        decimals: config.insights.decimals,
    }
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.clear_cache {
        match CacheManager::new(APP_NAME) {
            Ok(cache) => {
                match cache.clear_all() {
                    Ok(removed) => println!(
                        "Cache cleared successfully ({} file(s) removed from {})",
                        removed,
                        cache.cache_dir().display()
                    ),
                    Err(e) => {
                        eprintln!("Error clearing cache: {}", e);
                        std::process::exit(1);
                    }
                }
                return Ok(Some(()));
            }
            Err(_e) => {
                println!("No cache to clear");
                return Ok(Some(()));
            }
        }
    }

    if args.generate_config {
        match ConfigManager::new(APP_NAME) {
            Ok(config_manager) => match config_manager.write_default_config(args.force) {
                Ok(config_path) => {
                    println!("Configuration file written to {}", config_path.display());
                    return Ok(Some(()));
                }
                Err(e) => {
                    eprintln!("Error writing configuration file: {}", e);
                    std::process::exit(1);
                }
            },
            Err(e) => {
                eprintln!("Error initializing config manager: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(None)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;

    let config = match AppConfig::load(APP_NAME) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", user_message_from_report(&e, None));
            std::process::exit(1);
        }
    };

    let directive = logging::filter_directive(args.debug || config.debug.enabled, &config.debug.log_level);
    if args.print.is_some() {
        logging::init(LogTarget::Stderr, &directive)?;
    } else {
        let cache = CacheManager::new(APP_NAME)?;
        logging::init(LogTarget::File(&cache.log_file()), &directive)?;
    }

    let path = data_path(&args, &config);
    let store = match DatasetStore::open(&path, &load_options(&args, &config)?) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, "failed to load dataset");
            eprintln!("Error: {}", user_message_from_load(&e));
            std::process::exit(1);
        }
    };

    if let Some(view) = args.print {
        let opts = PrintOptions {
            view,
            crop: args.crop.clone(),
            season: args.season.clone(),
            json: args.json,
            export_chart: args.export_chart.clone(),
            insights: insight_options(&config),
            chart_size: ChartSize {
                width: config.chart.width,
                height: config.chart.height,
            },
        };
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = print_view(store.dataset(), &opts, &mut stdout) {
            eprintln!("Error: {}", user_message_from_report(&e, None));
            std::process::exit(1);
        }
        return Ok(());
    }

    let app = App::new(store.dataset().clone(), insight_options(&config));
    let poll_interval = Duration::from_millis(config.performance.event_poll_interval_ms);
    let terminal = ratatui::init();
    let result = cropscope::run(terminal, app, poll_interval);
    ratatui::restore();
    if let Err(e) = result {
        eprintln!("Error: {}", user_message_from_report(&e, Some(store.source())));
        std::process::exit(1);
    }
    Ok(())
}
