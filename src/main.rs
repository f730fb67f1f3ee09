use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use crossterm::event::KeyEventKind;
use tracing::{error, info};

use lonitor::app::App;
use lonitor::config::{self, Config, load_config, load_config_from_path};
use lonitor::event::{Event, Scheduler};
use lonitor::logging;
use lonitor::system::collector::Collector;
use lonitor::ui;

/// Floor for the sampling period; sysinfo needs time between CPU refreshes.
const MIN_REFRESH_MS: u64 = 200;

#[derive(Parser)]
#[command(
    name = "lonitor",
    about = "Terminal system monitor with one-key maintenance actions"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Refresh rate in milliseconds
    #[arg(long)]
    refresh_rate: Option<u64>,

    /// Thermal zone file to read the CPU temperature from
    #[arg(long)]
    thermal_zone: Option<PathBuf>,

    /// Log file (defaults to the user data directory)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Theme: dark, light, colorblind
    #[arg(long)]
    theme: Option<String>,

    /// Run maintenance commands without sudo
    #[arg(long, default_value_t = false)]
    no_sudo: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let log_path = cli
        .log_file
        .clone()
        .or_else(logging::default_log_path)
        .ok_or_else(|| eyre!("no user data directory for the log file, pass --log-file"))?;
    logging::init_file_logging(&log_path)?;

    let config = load_config_for_cli(&cli);
    info!(
        log = %log_path.display(),
        refresh_ms = config.general.refresh_rate_ms,
        use_sudo = config.actions.use_sudo,
        "starting lonitor"
    );

    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        error!(%panic_info, "panicked");
        original_hook(panic_info);
    }));

    let result = run(&mut terminal, config).await;

    ratatui::restore();
    info!("exiting");
    result
}

async fn run(terminal: &mut ratatui::DefaultTerminal, config: Config) -> Result<()> {
    let period = Duration::from_millis(config.general.refresh_rate_ms.max(MIN_REFRESH_MS));
    let collector = Collector::new(config.sensors.paths(), config.general.top_processes);
    let mut app = App::new(&config, collector);
    let mut scheduler = Scheduler::new(period);
    let runner = scheduler.runner(config.actions.settings());

    terminal.draw(|frame| ui::draw(frame, &app))?;

    while app.running {
        let Some(event) = scheduler.next().await else {
            break;
        };
        match event {
            Event::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let action = app.map_key(key);
                app.dispatch(action);
            }
            Event::Tick => app.on_tick(),
            Event::Resize => {}
            Event::TaskFinished(outcome) => app.on_task_finished(outcome),
        }

        for task in app.take_requests() {
            runner.submit(task);
        }
        terminal.draw(|frame| ui::draw(frame, &app))?;
    }

    scheduler.cancel();
    Ok(())
}

fn load_config_for_cli(cli: &Cli) -> config::Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(rate) = cli.refresh_rate {
        config.general.refresh_rate_ms = rate;
    }
    if let Some(ref zone) = cli.thermal_zone {
        config.sensors.thermal_zone = zone.clone();
    }
    if let Some(ref theme) = cli.theme {
        config.colors.theme = theme.clone();
    }
    if cli.no_sudo {
        config.actions.use_sudo = false;
    }

    config
}
