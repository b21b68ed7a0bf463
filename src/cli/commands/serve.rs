//! Web server command.

use console::style;

use crate::config::Settings;

/// Default port when a bind address names only a host.
const DEFAULT_PORT: u16 = 3000;

/// Start the web server.
pub async fn cmd_serve(mut settings: Settings, bind: Option<&str>) -> anyhow::Result<()> {
    if let Some(bind) = bind {
        let (host, port) = parse_bind_address(bind);
        settings.server.bind = format!("{}:{}", host, port);
    }

    println!(
        "{} Starting BusPlus scraper at http://{}",
        style("→").cyan(),
        settings.server.bind
    );
    if settings.server.allows_any_origin() {
        println!("  CORS: any origin");
    } else {
        println!("  CORS: {}", settings.server.allowed_origins.join(", "));
    }
    println!("  Press Ctrl+C to stop");

    crate::server::serve(&settings).await
}

/// Parse a bind address that can be:
/// - Just a port: "8080" -> 0.0.0.0:8080
/// - Just a host: "127.0.0.1" -> 127.0.0.1:3000
/// - Host and port: "127.0.0.1:8080" -> 127.0.0.1:8080
fn parse_bind_address(bind: &str) -> (String, u16) {
    if let Ok(port) = bind.parse::<u16>() {
        return ("0.0.0.0".to_string(), port);
    }

    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return (host.to_string(), port);
        }
    }

    (bind.to_string(), DEFAULT_PORT)
}
