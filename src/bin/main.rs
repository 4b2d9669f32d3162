//! Btcon CLI - wallet display services as JSON
//!
//!   btcon color <address>      → {"address", "background", "foreground"}
//!   btcon colors               → {"<address>": "<color>", ...}
//!   btcon price [--watch]      → {"eur": 61234.5}
//!   btcon convert <btcon>      → {"btcon", "eur", "display"}
//!   btcon flip                 → {"outcome", "spins", "rotation_deg", "duration_ms"}
//!
//! Configuration:
//!   --app / BTCON_APP, --data-dir / BTCON_DATA_DIR, BTCON_PRICE_TTL_SECS
//!
//! Output format:
//!   --json     Output raw JSON (default for non-tty)
//!   --pretty   Pretty-print JSON (default for tty)

use btcon::logging::init_logging;
use btcon::{
    btcon_to_euro, format_btcon_with_euro, install_signal_handlers, BtconConfig, CoinFlip, FileStore,
    PriceCache, PriceSource, QrColorService,
};
use serde_json::{json, Value};
use std::env;
use std::io::IsTerminal;
use std::sync::Arc;
use tracing::debug;

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let opts = ParsedArgs::parse(&args[1..]);

    if opts.help {
        print_usage();
        return;
    }

    if opts.version {
        println!("btcon {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let result = match opts.command.as_deref() {
        Some("color") => cmd_color(&opts),
        Some("colors") => cmd_colors(&opts),
        Some("price") => cmd_price(&opts),
        Some("convert") => cmd_convert(&opts),
        Some("flip") => cmd_flip(),
        Some(cmd) => Err(format!("Unknown command: {}", cmd)),
        None => {
            print_usage();
            return;
        }
    };

    let pretty = opts.pretty || (!opts.json && std::io::stdout().is_terminal());
    match result {
        Ok(output) => println!("{}", render(&output, pretty)),
        Err(e) => {
            eprintln!("{}", render(&json!({"error": e}), pretty));
            std::process::exit(1);
        }
    }
}

fn render(value: &Value, pretty: bool) -> String {
    let rendered = if pretty { serde_json::to_string_pretty(value) } else { serde_json::to_string(value) };
    rendered.unwrap_or_else(|_| value.to_string())
}

#[derive(Default)]
struct ParsedArgs {
    command: Option<String>,
    arg: Option<String>,
    app: Option<String>,
    data_dir: Option<String>,
    watch: bool,
    json: bool,
    pretty: bool,
    help: bool,
    version: bool,
}

impl ParsedArgs {
    fn parse(args: &[String]) -> Self {
        // Load .env file if present
        if let Ok(contents) = std::fs::read_to_string(".env") {
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    let value = value.trim().trim_matches('"');
                    if !value.is_empty() && env::var(key.trim()).is_err() {
                        env::set_var(key.trim(), value);
                    }
                }
            }
        }

        let mut opts = ParsedArgs::default();
        let mut positional = Vec::new();
        let mut i = 0;

        while i < args.len() {
            let arg = &args[i];
            match arg.as_str() {
                "--help" | "-h" => opts.help = true,
                "--version" | "-V" => opts.version = true,
                "--json" => opts.json = true,
                "--pretty" => opts.pretty = true,
                "--watch" | "-w" => opts.watch = true,
                "--app" | "-a" => {
                    if i + 1 < args.len() {
                        opts.app = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                "--data-dir" | "-d" => {
                    if i + 1 < args.len() {
                        opts.data_dir = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                _ if !arg.starts_with('-') => positional.push(arg.clone()),
                _ => {} // Ignore unknown flags
            }
            i += 1;
        }

        let mut positional = positional.into_iter();
        opts.command = positional.next();
        opts.arg = positional.next();
        opts
    }

    /// Environment config with CLI flags on top
    fn config(&self) -> BtconConfig {
        let mut config = BtconConfig::from_env();
        if let Some(app) = &self.app {
            config.app = app.clone();
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = Some(dir.into());
        }
        config
    }
}

fn print_usage() {
    println!(
        r#"btcon - Btcon wallet display services

USAGE:
    btcon <command> [arg] [options]

COMMANDS:
    color <address>         QR colors for an address (assigns one if new)
    colors                  All stored address colors
    price                   BTC price in EUR (cached 60s)
    convert <btcon>         Btcon amount with EUR equivalent
    flip                    Flip a coin

OPTIONS:
    --app, -a <name>        Application name (env: BTCON_APP)
    --data-dir, -d <path>   Data directory (env: BTCON_DATA_DIR)
    --watch, -w             price: keep refreshing until Ctrl+C

OUTPUT OPTIONS:
    --json                  Raw JSON output
    --pretty                Pretty-print JSON
    --version, -V           Print version

EXAMPLES:
    btcon color bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh
    btcon convert 150000
    RUST_LOG=debug btcon price
"#
    );
}

fn runtime() -> Result<tokio::runtime::Runtime, String> {
    tokio::runtime::Runtime::new().map_err(|e| format!("Failed to create runtime: {}", e))
}

fn color_service(opts: &ParsedArgs) -> QrColorService {
    let config = opts.config();
    let dir = config.resolve_data_dir();
    debug!(dir = %dir.display(), "opening color store");
    QrColorService::start(Arc::new(FileStore::open(dir)), &config.colors)
}

fn cmd_color(opts: &ParsedArgs) -> Result<Value, String> {
    let address = opts.arg.clone().ok_or("Usage: btcon color <address>")?;
    runtime()?.block_on(async {
        let colors = color_service(opts);
        colors.wait_loaded().await.map_err(|e| e.to_string())?;
        let qr = colors.resolve(Some(address.as_str()));
        colors.flush().await.map_err(|e| e.to_string())?;
        Ok::<_, String>(json!({"address": address, "background": qr.background, "foreground": qr.foreground}))
    })
}

fn cmd_colors(opts: &ParsedArgs) -> Result<Value, String> {
    runtime()?.block_on(async {
        let colors = color_service(opts);
        colors.wait_loaded().await.map_err(|e| e.to_string())?;
        serde_json::to_value(colors.assignments()).map_err(|e| e.to_string())
    })
}

fn price_sources() -> Vec<Box<dyn PriceSource>> {
    #[cfg(feature = "http")]
    {
        btcon::price::default_sources()
    }
    #[cfg(not(feature = "http"))]
    {
        tracing::warn!("built without `http`, serving the default price");
        Vec::new()
    }
}

fn cmd_price(opts: &ParsedArgs) -> Result<Value, String> {
    let cache = Arc::new(PriceCache::new(price_sources(), opts.config().price));
    runtime()?.block_on(async {
        if !opts.watch {
            return Ok::<_, String>(json!({"eur": cache.price().await}));
        }

        let shutdown = install_signal_handlers();
        let mut latest = cache.subscribe();
        let refresher = cache.clone().spawn_refresher(shutdown.subscribe());
        let mut stop = shutdown.subscribe();
        loop {
            tokio::select! {
                _ = stop.recv() => break,
                changed = latest.changed() => {
                    if changed.is_err() { break; }
                    let eur = *latest.borrow_and_update();
                    println!("{}", json!({"eur": eur}));
                }
            }
        }
        let _ = refresher.await;
        Ok::<_, String>(json!({"eur": cache.current()}))
    })
}

fn cmd_convert(opts: &ParsedArgs) -> Result<Value, String> {
    let raw = opts.arg.as_deref().ok_or("Usage: btcon convert <btcon>")?;
    let btcon: f64 = raw.trim().parse().map_err(|_| format!("Invalid amount: {}", raw))?;
    if !btcon.is_finite() || btcon < 0.0 {
        return Err(format!("Invalid amount: {}", raw));
    }
    let cache = PriceCache::new(price_sources(), opts.config().price);
    let eur_price = runtime()?.block_on(cache.price());
    Ok(json!({
        "btcon": btcon,
        "eur": btcon_to_euro(btcon, eur_price),
        "display": format_btcon_with_euro(btcon, eur_price),
        "btc_eur": eur_price,
    }))
}

fn cmd_flip() -> Result<Value, String> {
    let mut game = CoinFlip::new();
    let plan = game.flip(&mut rand::thread_rng()).ok_or("coin already flipping")?;
    game.land();
    Ok(json!({
        "outcome": plan.outcome.as_str(),
        "spins": plan.spins,
        "rotation_deg": plan.rotation_deg,
        "duration_ms": plan.duration_ms,
        "coin_visible": game.coin_visible(),
    }))
}
