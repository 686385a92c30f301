//! Four-router forwarding demo.
//!
//! Prints each router's table, then routes packets from a source router.
//!
//! ```text
//! cargo run --example four_routers
//! RUST_LOG=patricia_route=debug cargo run --example four_routers -- --from B 192.168.1.5
//! ```

use std::net::Ipv4Addr;

use clap::Parser;
use patricia_route::{ForwardingConfig, Network};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "four_routers")]
#[command(about = "Route packets through the A/B/C/D demo network", long_about = None)]
struct Cli {
    /// Router the packets start at.
    #[arg(short, long, default_value = "A")]
    from: String,

    /// Lookups per packet before giving up.
    #[arg(long, default_value_t = 50)]
    max_hops: usize,

    /// Skip printing the routing tables.
    #[arg(long)]
    quiet: bool,

    /// Destinations. Defaults to 192.168.1.5, 10.1.2.3 and 172.16.5.4.
    destinations: Vec<Ipv4Addr>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "patricia_route=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut net = Network::four_router_demo()?;
    net.set_config(ForwardingConfig::default().max_hops(cli.max_hops));

    if !cli.quiet {
        for router in net.routers() {
            println!("Table {}:", router.name());
            print!("{}", router.table().trie().dump());
            println!();
        }
    }

    let destinations = if cli.destinations.is_empty() {
        vec![
            Ipv4Addr::new(192, 168, 1, 5),
            Ipv4Addr::new(10, 1, 2, 3),
            Ipv4Addr::new(172, 16, 5, 4),
        ]
    } else {
        cli.destinations
    };

    println!("--- Simulations ---");
    for dst in destinations {
        println!("\nRouting packet to {} from {}", dst, cli.from);
        match net.route_packet(&cli.from, dst) {
            Ok(delivery) => println!(
                "  Delivered at {} via {}",
                delivery.delivered_at(),
                delivery.path.join(" -> ")
            ),
            Err(err) => println!("  {err}"),
        }
    }

    Ok(())
}
