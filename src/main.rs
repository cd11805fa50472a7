use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::Parser;
use cursor_presence::config::{ClientConfig, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_THROTTLE_MS};
use cursor_presence::net::connection::{self, ClientError};
use cursor_presence::render::DEFAULT_PROXIMITY_RADIUS;
use cursor_presence::sample::{LocalSample, Sampler, Viewport, parse_pointer_line};
use cursor_presence::state::SelfIdentity;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Join a presence room and stream pointer positions read from stdin.
///
/// Each stdin line is one pointer event in viewport pixels: `<x> <y>`.
#[derive(Parser, Debug)]
#[command(name = "cursor-presence", about = "Live cursor presence client")]
struct Cli {
    /// Display name sent as the `username` query parameter.
    #[arg(long, env = "PRESENCE_USERNAME")]
    username: String,

    #[arg(long, env = "PRESENCE_HOST", default_value = DEFAULT_HOST)]
    host: String,

    #[arg(long, env = "PRESENCE_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Connect with `wss://`.
    #[arg(long, env = "PRESENCE_SECURE", default_value_t = false)]
    secure: bool,

    /// Participant id, if known. Otherwise the local entry is found by display name.
    #[arg(long, env = "PRESENCE_SELF_ID")]
    self_id: Option<String>,

    #[arg(long, env = "PRESENCE_THROTTLE_MS", default_value_t = DEFAULT_THROTTLE_MS)]
    throttle_ms: u64,

    #[arg(long, env = "PRESENCE_RADIUS", default_value_t = DEFAULT_PROXIMITY_RADIUS)]
    radius: f64,

    #[arg(long, env = "PRESENCE_VIEWPORT_WIDTH", default_value_t = 1280.0)]
    viewport_width: f64,

    #[arg(long, env = "PRESENCE_VIEWPORT_HEIGHT", default_value_t = 720.0)]
    viewport_height: f64,
}

impl Cli {
    fn config(&self) -> ClientConfig {
        ClientConfig {
            host: self.host.clone(),
            port: self.port,
            secure: self.secure,
            display_name: self.username.clone(),
            throttle_interval: Duration::from_millis(self.throttle_ms),
            proximity_radius: self.radius,
            viewport: Viewport::new(self.viewport_width, self.viewport_height),
        }
    }

    fn identity(&self) -> SelfIdentity {
        match &self.self_id {
            Some(id) => SelfIdentity::Id(id.clone()),
            None => SelfIdentity::DisplayName(self.username.clone()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config();

    let (tx, rx) = mpsc::channel::<LocalSample>(64);
    let sampler = Sampler::new(config.viewport);
    let _reader = tokio::spawn(read_pointer_events(sampler, tx));

    connection::run(&config, cli.identity(), rx, |model| println!("{model}")).await
}

/// Forward stdin pointer events until EOF or until the session stops listening.
async fn read_pointer_events(sampler: Sampler, tx: mpsc::Sender<LocalSample>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "stdin read failed");
                break;
            }
        };
        let Some((x, y)) = parse_pointer_line(&line) else {
            if !line.trim().is_empty() {
                tracing::debug!(%line, "ignoring unparseable pointer line");
            }
            continue;
        };
        if tx.send(sampler.sample(x, y, now_ms())).await.is_err() {
            break;
        }
    }
}

fn now_ms() -> i64 {
    let Ok(duration) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(duration.as_millis()).unwrap_or(0)
}
