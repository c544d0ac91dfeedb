use clap::Parser;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use mtp_config::{PhyBackend, SharedConfig, StackConfig, toml_config};
use mtp_core::{BitTime, debug, mtp_entities::MtpEntity};
use mtp_entities::{MessageRouter, MtpEntityTrait};
use mtp_entities::mtp2::Mtp2;
use mtp_entities::mtp2::components::tap::LoggingTap;
use mtp_entities::mtp3::Mtp3;
use mtp_entities::phy::Phy;
use mtp_entities::phy::components::{
    file_dev::FileDev,
    loopback_dev::LoopbackDev,
    null_dev::NullDev,
};

mod demo_user;

use demo_user::DemoUser;

/// Pacing slack; the stacks run ahead of the wall clock by at most this much
const PACING_SLACK: Duration = Duration::from_millis(5);

/// Load configuration file
fn load_config_from_toml(cfg_path: &str) -> SharedConfig {
    match toml_config::from_file(cfg_path) {
        Ok(c) => c,
        Err(e) => {
            println!("Failed to load configuration from {}: {}", cfg_path, e);
            std::process::exit(1);
        }
    }
}

/// Config of the far end of a loopback pair: same line, point codes swapped
fn peer_config(cfg: &SharedConfig) -> SharedConfig {
    let mut peer: StackConfig = (*cfg.config()).clone();
    peer.debug_log = None;
    peer.link.name = format!("{}-peer", peer.link.name);
    std::mem::swap(&mut peer.link.local_pc, &mut peer.link.remote_pc);
    SharedConfig::from_config(peer)
}

/// Registers everything above the Phy entity
fn register_upper_entities(router: &mut MessageRouter, cfg: &SharedConfig, sniff: bool) {
    let mtp2 = if sniff {
        Mtp2::with_tap(cfg.clone(), Box::new(LoggingTap::default()))
    } else {
        Mtp2::new(cfg.clone())
    };
    router.register_entity(Box::new(mtp2));
    router.register_entity(Box::new(Mtp3::new(cfg.clone())));
    if !sniff {
        router.register_entity(Box::new(DemoUser::new(cfg.clone())));
    }
    router.set_time(BitTime::default());
}

/// Builds the link stack(s). The loopback backend yields two stacks wired back-to-back.
fn build_stacks(cfg: &SharedConfig, sniff: bool) -> Vec<MessageRouter> {
    match cfg.config().phy_io.backend {
        PhyBackend::None => {
            let mut router = MessageRouter::new(cfg.clone());
            router.register_entity(Box::new(Phy::new(cfg.clone(), NullDev::default())));
            register_upper_entities(&mut router, cfg, sniff);
            vec![router]
        }
        PhyBackend::File => {
            let phy_io = cfg.config().phy_io.clone();
            let dev = match FileDev::new(phy_io.rx_file.as_deref(), phy_io.tx_file.as_deref()) {
                Ok(dev) => dev,
                Err(e) => {
                    println!("Failed to open bit stream files: {}", e);
                    std::process::exit(1);
                }
            };
            let mut router = MessageRouter::new(cfg.clone());
            router.register_entity(Box::new(Phy::new(cfg.clone(), dev)));
            register_upper_entities(&mut router, cfg, sniff);
            vec![router]
        }
        PhyBackend::Loopback => {
            let peer_cfg = peer_config(cfg);
            let (dev_a, dev_b) = LoopbackDev::pair();

            let mut router_a = MessageRouter::new(cfg.clone());
            router_a.register_entity(Box::new(Phy::new(cfg.clone(), dev_a)));
            register_upper_entities(&mut router_a, cfg, sniff);

            // The peer always runs the full link, so there is something to sniff
            let mut router_b = MessageRouter::new(peer_cfg.clone());
            router_b.register_entity(Box::new(Phy::new(peer_cfg.clone(), dev_b)));
            register_upper_entities(&mut router_b, &peer_cfg, false);
            eprintln!(" -> Loopback peer {} at {}", peer_cfg.config().link.name, peer_cfg.config().link.local_pc);

            vec![router_a, router_b]
        }
        PhyBackend::Undefined => {
            panic!("Unsupported PhyIo type: {:?}", cfg.config().phy_io.backend);
        }
    }
}

/// Runs the stacks tick by tick, in step with the wall clock at the configured bit rate
fn run_paced(routers: &mut [MessageRouter], bit_rate: u32, running: Arc<AtomicBool>) {
    let start = Instant::now();

    while running.load(Ordering::SeqCst) {
        for router in routers.iter_mut() {
            router.run_tick();
        }
        if routers.iter().any(|r| r.is_halted()) {
            break;
        }

        let Some(first) = routers.first() else {
            break;
        };
        let target = Duration::from_secs_f64(first.get_time().as_secs(bit_rate));
        let elapsed = start.elapsed();
        if target > elapsed + PACING_SLACK {
            std::thread::sleep(target - elapsed);
        }
    }
    tracing::info!("stopping stack");
}

/// Takes every link out of service before the stacks are dropped
fn shutdown(routers: &mut [MessageRouter]) {
    for router in routers.iter_mut() {
        let in_service = router.get_config().state_read().link_in_service;
        if let Some(entity) = router.get_entity(MtpEntity::Mtp2) {
            if let Some(mtp2) = entity.as_any_mut().downcast_mut::<Mtp2>() {
                tracing::info!("shutting down {} (in service: {})", mtp2.link().name(), in_service);
                mtp2.shutdown();
            }
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "SS7 MTP signalling link",
    long_about = "Runs an MTP level 2 signalling link with a level 3 shim on top, using the provided TOML configuration file"
)]

struct Args {
    /// Config file (required)
    #[arg(help = "TOML config with link and phy_io parameters")]
    config: String,

    /// Only decode and log received signal units, never feed them to the link
    #[arg(long)]
    sniff: bool,
}

fn main() {
    let args = Args::parse();
    let cfg = load_config_from_toml(&args.config);
    let _log_guard = debug::setup_logging_default(cfg.config().debug_log.clone());

    let link = cfg.config().link.clone();
    eprintln!(" -> Link {} at {} bit/s, {} -> {}", link.name, link.bit_rate, link.local_pc, link.remote_pc);

    let mut routers = build_stacks(&cfg, args.sniff);

    // Set up Ctrl+C handler for graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("failed to set Ctrl+C handler");

    match cfg.config().phy_io.backend {
        // Input from file runs as fast as it can be read
        PhyBackend::File => {
            if let Some(router) = routers.first_mut() {
                router.run_stack(None, Some(running));
            }
        }
        _ => run_paced(&mut routers, link.bit_rate, running),
    }

    shutdown(&mut routers);
    // routers drop here, FileDev flushes the transmit file on drop
}
