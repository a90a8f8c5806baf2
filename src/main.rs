use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hanover_flipdot::{Bitmap, ByteSink, Config, HanoverController, RecordingSink, SerialSink};

#[derive(Parser)]
#[command(name = "flipdot")]
#[command(about = "Hanover flipdot controller\n\nSends images and test commands to Hanover signs over a serial bus.", long_about = None)]
struct Cli {
    /// Path to configuration file (JSON)
    config: String,

    /// Enable debug output (one line per frame)
    #[arg(long)]
    debug: bool,

    /// Enable detailed debug (frame bytes)
    #[arg(long)]
    ddebug: bool,

    /// Print frames instead of opening the serial port
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the test sequence on every sign
    TestStart,
    /// Stop the test sequence on every sign
    TestStop,
    /// Run the test sequence until Ctrl-C
    Test,
    /// Draw an ASCII-art image file ('#' set, '.' or space clear)
    Draw {
        image: String,
        /// Target sign; may be omitted when only one sign is configured
        #[arg(long)]
        sign: Option<String>,
    },
    /// Blank one sign, or every configured sign
    Clear {
        #[arg(long)]
        sign: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ddebug implies debug
    let filter = if cli.ddebug {
        EnvFilter::new("trace")
    } else if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load configuration
    let config_data = fs::read_to_string(&cli.config)
        .context(format!("Failed to read config {}", cli.config))?;
    let config: Config = serde_json::from_str(&config_data)
        .context(format!("Failed to parse config {}", cli.config))?;
    let registry = config.build_registry()?;

    if cli.dry_run {
        let mut controller = HanoverController::with_registry(RecordingSink::new(), registry);
        run(&mut controller, &cli.command)?;
        for frame in controller.sink().frames() {
            println!("{}", frame.escape_ascii());
        }
    } else {
        let sink = SerialSink::open(&config.serial.port, config.serial.baud_rate)
            .context(format!("Failed to open serial port {}", config.serial.port))?;
        info!(port = sink.name(), baud = config.serial.baud_rate, "opened serial port");
        let mut controller = HanoverController::with_registry(sink, registry);
        run(&mut controller, &cli.command)?;
    }

    Ok(())
}

fn run<S: ByteSink>(controller: &mut HanoverController<S>, command: &Command) -> Result<()> {
    match command {
        Command::TestStart => controller.start_test_signs()?,
        Command::TestStop => controller.stop_test_signs()?,
        Command::Test => run_test_sequence(controller)?,
        Command::Draw { image, sign } => {
            let text = fs::read_to_string(image).context(format!("Failed to read image {}", image))?;
            let bitmap = Bitmap::parse(&text)?;
            match sign {
                Some(name) => controller.draw_image(name, &bitmap)?,
                None => controller.draw_image_to_only_sign(&bitmap)?,
            }
        }
        Command::Clear { sign: Some(name) } => {
            let blank = controller.signs().get(name)?.blank_image();
            controller.draw_image(name, &blank)?;
        }
        Command::Clear { sign: None } => controller.clear_all()?,
    }
    Ok(())
}

/// Start the test sequence, wait for Ctrl-C, then stop it again
fn run_test_sequence<S: ByteSink>(controller: &mut HanoverController<S>) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = Arc::clone(&running);
    // The wait below only ends through this handler
    ctrlc::set_handler(move || {
        handler_flag.store(false, Ordering::Relaxed);
    })
    .context("Failed to set Ctrl-C handler")?;

    controller.start_test_signs()?;
    info!("test sequence running (press Ctrl-C to stop)");

    while running.load(Ordering::Relaxed) {
        thread::sleep(Duration::from_millis(100));
    }

    controller.stop_test_signs()?;
    info!("test sequence stopped");
    Ok(())
}
