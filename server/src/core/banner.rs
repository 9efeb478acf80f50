//! Startup banner

use super::config::{AppConfig, is_all_interfaces};
use super::constants::APP_NAME;

// Width of the longest label ("OTLP/HTTP logs:") plus padding
const W: usize = 17;

/// Wrap a URL in an OSC 8 hyperlink when stdout supports it
fn link(url: &str) -> String {
    if supports_hyperlinks::on(supports_hyperlinks::Stream::Stdout) {
        format!("\x1b]8;;{}\x07\x1b[36m{}\x1b[0m\x1b]8;;\x07", url, url)
    } else {
        format!("\x1b[36m{}\x1b[0m", url)
    }
}

/// Base URL clients should use; all-interfaces binds are shown as localhost
pub fn display_base_url(host: &str, port: u16) -> String {
    let host = if is_all_interfaces(host) {
        "localhost"
    } else {
        host
    };
    format!("http://{}:{}", host, port)
}

pub fn print_banner(config: &AppConfig) {
    let base = display_base_url(&config.server.host, config.server.port);

    println!();
    println!(
        "  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{}\x1b[0m",
        APP_NAME,
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!(
        "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
        "Event search:",
        link(&format!("{}/api/events", base))
    );
    println!(
        "  \x1b[33m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}/v1/traces",
        "OTLP/HTTP traces:", base
    );
    println!(
        "  \x1b[33m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}/v1/logs",
        "OTLP/HTTP logs:", base
    );

    if is_all_interfaces(&config.server.host) {
        if let Ok(interfaces) = local_ip_address::list_afinet_netifas() {
            for (_, ip) in interfaces
                .iter()
                .filter(|(_, ip)| ip.is_ipv4() && !ip.is_loopback())
            {
                println!(
                    "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
                    "Network:",
                    link(&format!("http://{}:{}", ip, config.server.port))
                );
            }
        }
    } else {
        println!(
            "  \x1b[90m➜  {:<W$} use --host 0.0.0.0 to expose\x1b[0m",
            "Network:"
        );
    }

    println!(
        "  \x1b[90m➜  {:<W$} {} (attributes: {})\x1b[0m",
        "Database:",
        config.database.path.display(),
        config.database.attribute_storage
    );
    println!();
}
