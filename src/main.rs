//! Gray-Scott CLI - Run headless simulations from JSON configuration.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use gray_scott::{
    compute::CpuSimulation,
    schema::{Seed, SimulationConfig},
};

/// Synthetic display refresh interval fed to the frame clock.
const FRAME_INTERVAL_MS: f64 = 1000.0 / 60.0;

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json> [frames]", args[0]);
        eprintln!();
        eprintln!("Run a headless Gray-Scott simulation from JSON configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to simulation configuration file");
        eprintln!("  frames       Number of displayed frames to simulate (default: 100)");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);
    let frames: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(100);

    // Load configuration
    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let config: SimulationConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    // Load or create seed
    let seed_path = config_path.with_extension("seed.json");
    let seed: Seed = if seed_path.exists() {
        let seed_str = fs::read_to_string(&seed_path).unwrap_or_else(|e| {
            eprintln!("Error reading seed file: {}", e);
            std::process::exit(1);
        });
        serde_json::from_str(&seed_str).unwrap_or_else(|e| {
            eprintln!("Error parsing seed: {}", e);
            std::process::exit(1);
        })
    } else {
        Seed::default()
    };

    println!("Gray-Scott Simulation");
    println!("=====================");
    println!("Grid: {}x{}", config.width, config.height);
    println!("feed: {}, kill: {}", config.feed, config.kill);
    println!("Sub-steps/frame: {}", config.substeps);
    println!("Frames: {}", frames);
    println!();

    let substeps = config.substeps;
    let mut sim = CpuSimulation::new(config, seed).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let initial_stats = sim.stats();
    println!("Initial state:");
    println!(
        "  u range: [{:.6}, {:.6}]",
        initial_stats.min_u, initial_stats.max_u
    );
    println!(
        "  v range: [{:.6}, {:.6}]",
        initial_stats.min_v, initial_stats.max_v
    );
    println!();

    println!("Running simulation...");
    let start = Instant::now();

    for i in 0..frames {
        sim.advance(i as f64 * FRAME_INTERVAL_MS);

        // Print progress every 10%
        if (i + 1) % (frames / 10).max(1) == 0 {
            let stats = sim.stats();
            let elapsed = start.elapsed().as_secs_f32();
            let frames_per_sec = (i + 1) as f32 / elapsed;
            println!(
                "  Frame {}/{}: v in [{:.4}, {:.4}], non-finite={}, {:.1} frames/s",
                i + 1,
                frames,
                stats.min_v,
                stats.max_v,
                stats.non_finite,
                frames_per_sec
            );
        }
    }

    let elapsed = start.elapsed();
    let final_stats = sim.stats();

    println!();
    println!("Final state:");
    println!(
        "  u range: [{:.6}, {:.6}]",
        final_stats.min_u, final_stats.max_u
    );
    println!(
        "  v range: [{:.6}, {:.6}]",
        final_stats.min_v, final_stats.max_v
    );
    println!("  Non-finite cells: {}", final_stats.non_finite);
    println!();
    println!(
        "Time: {:.2}s ({:.1} frames/s, {:.1} sub-steps/s)",
        elapsed.as_secs_f32(),
        frames as f32 / elapsed.as_secs_f32(),
        (frames * substeps as u64) as f32 / elapsed.as_secs_f32()
    );
}

fn print_example_config() {
    let config = SimulationConfig::default();
    let seed = Seed::default();

    println!("Example configuration (config.json):");
    println!("{}", serde_json::to_string_pretty(&config).unwrap());
    println!();
    println!("Example seed (config.seed.json):");
    println!("{}", serde_json::to_string_pretty(&seed).unwrap());
}
