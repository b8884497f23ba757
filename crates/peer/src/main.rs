mod config;
mod message;
mod peer;

use std::time::Duration;

use ackline::{
    Endpoint, LossyTransport, OrderedDelivery, PacketLossSimulation, Reliability, SystemClock,
    UdpTransport, UnorderedDelivery,
};
use anyhow::{Context, Result};
use clap::Parser;

use config::PeerConfig;
use peer::ChatPeer;

#[derive(Parser)]
#[command(name = "ackline-peer")]
#[command(about = "Exchange chat messages with another peer over ackline")]
struct Args {
    #[arg(short, long, default_value = "127.0.0.1:7000")]
    bind: String,

    #[arg(short, long, default_value = "127.0.0.1:7001")]
    peer: String,

    #[arg(short, long, default_value = "peer")]
    name: String,

    #[arg(long, default_value_t = 500, help = "Delay between ticks in ms")]
    interval_ms: u64,

    #[arg(long, help = "Number of greetings to send, runs forever if omitted")]
    count: Option<u32>,

    #[arg(long, help = "Deliver messages as they arrive instead of in order")]
    unordered: bool,

    #[arg(long, help = "Send greetings without retransmission")]
    unreliable: bool,

    #[arg(long, default_value_t = 0.0, help = "Outgoing packet loss percentage (0-100)")]
    loss_percent: f32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = PeerConfig {
        name: args.name,
        interval: Duration::from_millis(args.interval_ms),
        count: args.count,
        reliability: Reliability::from(!args.unreliable),
        packet_loss: PacketLossSimulation::with_loss(args.loss_percent),
        ..Default::default()
    };

    let udp = UdpTransport::bind(&args.bind, &args.peer)
        .with_context(|| format!("failed to bind {} for peer {}", args.bind, args.peer))?;
    log::info!("{} -> {}", udp.local_addr(), udp.peer_addr());
    let transport = LossyTransport::new(udp, config.packet_loss);

    if args.unordered {
        let endpoint = Endpoint::with_config(
            transport,
            SystemClock::new(),
            UnorderedDelivery::default(),
            config.endpoint,
        )
        .context("invalid endpoint config")?;
        ChatPeer::new(endpoint, config)?.run();
    } else {
        let endpoint = Endpoint::with_config(
            transport,
            SystemClock::new(),
            OrderedDelivery::new(config.endpoint.buffer_capacity),
            config.endpoint,
        )
        .context("invalid endpoint config")?;
        ChatPeer::new(endpoint, config)?.run();
    }

    Ok(())
}
