use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use spider_web_core::config::{PreyDistribution, WebConfig};
use spider_web_core::engine::Engine;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

const WARMUP_GENERATIONS: usize = 5;
const BENCHMARK_GENERATIONS: usize = 100;

#[derive(Parser)]
#[command(name = "spider-web")]
#[command(about = "Evolving spider web simulation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DistributionArg {
    Mixed,
    Uniform,
}

impl From<DistributionArg> for PreyDistribution {
    fn from(arg: DistributionArg) -> Self {
        match arg {
            DistributionArg::Mixed => PreyDistribution::Mixed,
            DistributionArg::Uniform => PreyDistribution::Uniform,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Evolve a web from a config file
    Run {
        /// Path to config file (JSON)
        #[arg(long)]
        config: PathBuf,

        /// Output directory for results (optional)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Number of generations to evolve
        #[arg(long, default_value_t = 100)]
        generations: usize,

        /// Record a status sample every N generations
        #[arg(long, default_value_t = 10)]
        sample_every: usize,
    },
    /// Evolve a web configured from the command line
    Evolve {
        #[arg(long, default_value_t = 15)]
        sides: usize,

        #[arg(long, default_value_t = 100_000)]
        max_net_length: i64,

        #[arg(long, default_value_t = 100)]
        prey_count: usize,

        #[arg(long, value_enum, default_value_t = DistributionArg::Mixed)]
        distribution: DistributionArg,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[arg(long, default_value_t = 100)]
        generations: usize,

        /// Score every candidate on the parent's flies instead of fresh ones
        #[arg(long)]
        static_prey: bool,
    },
    /// Time reproduction steps across web sizes
    Benchmark,
    /// Dump the default configuration to stdout
    DumpDefaultConfig,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn load_config(path: &Path) -> Result<WebConfig> {
    let file = File::open(path).context("failed to open config file")?;
    let reader = BufReader::new(file);
    let config: WebConfig = serde_json::from_reader(reader).context("failed to parse config")?;
    config.validate().context("Config validation error")?;
    Ok(config)
}

fn evolve_config(
    sides: usize,
    max_net_length: i64,
    prey_count: usize,
    distribution: DistributionArg,
    seed: u64,
    static_prey: bool,
) -> Result<WebConfig> {
    let config = WebConfig {
        seed,
        sides_count: sides,
        max_net_length,
        prey_count,
        prey_distribution: distribution.into(),
        dynamic_prey: !static_prey,
        ..WebConfig::default()
    };
    config.validate().context("Config validation error")?;
    Ok(config)
}

fn run_benchmark(sides: usize, prey_count: usize, seed: u64) -> Result<()> {
    let config = WebConfig {
        seed,
        sides_count: sides,
        prey_count,
        ..WebConfig::default()
    };
    let mut engine = Engine::new(config).context("failed to spin benchmark web")?;

    for _ in 0..WARMUP_GENERATIONS {
        engine.reproduce_once().context("warmup reproduction failed")?;
    }

    let start = Instant::now();
    for _ in 0..BENCHMARK_GENERATIONS {
        engine.reproduce_once().context("benchmark reproduction failed")?;
    }
    let total_us = start.elapsed().as_micros() as f64;
    let avg_us = total_us / BENCHMARK_GENERATIONS as f64;
    let status = engine.query_status();

    println!("--- {sides} sides, {prey_count} prey ---");
    println!(
        "  Avg generation: {avg_us:.0} us ({:.1} generations/sec)",
        1_000_000.0 / avg_us.max(1.0)
    );
    println!(
        "  Final:          efficiency={:.4}, circles={}, length={}",
        status.efficiency, status.circle_count, status.trapping_net_length
    );
    println!();
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::DumpDefaultConfig => {
            let config = WebConfig::default();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Benchmark => {
            if cfg!(debug_assertions) {
                eprintln!("WARNING: running in debug mode. Results are not representative.");
                eprintln!("         Use: cargo run -p spider-web-cli --release -- benchmark");
                eprintln!();
            }
            println!("=== Spider Web Benchmark ===");
            println!(
                "Warmup: {WARMUP_GENERATIONS} generations, Benchmark: {BENCHMARK_GENERATIONS} generations"
            );
            println!();

            let configs = [(10, 100), (15, 100), (20, 100), (15, 1000)];
            for (sides, prey_count) in configs {
                run_benchmark(sides, prey_count, 42)?;
            }
        }
        Commands::Evolve {
            sides,
            max_net_length,
            prey_count,
            distribution,
            seed,
            generations,
            static_prey,
        } => {
            let config = evolve_config(
                sides,
                max_net_length,
                prey_count,
                distribution,
                seed,
                static_prey,
            )?;
            let mut engine = Engine::new(config).context("failed to spin web")?;
            let web = engine
                .reproduce_generations(generations, |p| {
                    if p.completed == p.total || p.completed % 10 == 0 {
                        info!(percent = p.percent(), "evolving");
                    }
                })
                .context("evolution failed")?;
            println!(
                "Generation {}: efficiency={:.4}, circles={}, length={}",
                web.generation(),
                web.efficiency(),
                web.net().len(),
                web.trapping_net_length()
            );
        }
        Commands::Run {
            config,
            out,
            generations,
            sample_every,
        } => {
            let web_config = load_config(&config)?;

            println!("Loaded config from {:?}", config);
            println!("Evolving for {} generations...", generations);

            let mut engine = Engine::new(web_config).context("failed to spin web")?;
            let summary = engine
                .run(generations, sample_every)
                .context("evolution failed")?;

            if let Some(out_dir) = out {
                std::fs::create_dir_all(&out_dir).context("failed to create output directory")?;
                let summary_path = out_dir.join("summary.json");
                let file = File::create(summary_path).context("failed to create summary file")?;
                serde_json::to_writer_pretty(file, &summary).context("failed to write summary")?;
                println!("Run complete. Results saved to {:?}", out_dir);
            } else {
                println!(
                    "Run complete. Final efficiency: {:.4} (best {:.4})",
                    summary.final_status.efficiency, summary.best_efficiency
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evolve_flags_parse_with_defaults() {
        let cli = Cli::try_parse_from(["spider-web", "evolve", "--distribution", "uniform"])
            .expect("args should parse");
        match cli.command {
            Commands::Evolve {
                sides,
                distribution,
                generations,
                static_prey,
                ..
            } => {
                assert_eq!(sides, 15);
                assert_eq!(distribution, DistributionArg::Uniform);
                assert_eq!(generations, 100);
                assert!(!static_prey);
            }
            _ => panic!("expected evolve command"),
        }
    }

    #[test]
    fn evolve_config_rejects_out_of_range_sides() {
        assert!(evolve_config(25, 100_000, 100, DistributionArg::Mixed, 1, false).is_err());
        let config = evolve_config(12, 50_000, 200, DistributionArg::Uniform, 1, false)
            .expect("valid flags");
        assert_eq!(config.prey_distribution, PreyDistribution::Uniform);
        assert_eq!(config.sides_count, 12);
        assert!(config.dynamic_prey);
    }

    #[test]
    fn static_prey_flag_turns_off_dynamic_prey() {
        let cli = Cli::try_parse_from(["spider-web", "evolve", "--static-prey"])
            .expect("args should parse");
        let Commands::Evolve { static_prey, .. } = cli.command else {
            panic!("expected evolve command");
        };
        assert!(static_prey);
        let config = evolve_config(15, 100_000, 100, DistributionArg::Mixed, 1, static_prey)
            .expect("valid flags");
        assert!(!config.dynamic_prey);
    }

    #[test]
    fn unknown_distribution_is_rejected() {
        assert!(Cli::try_parse_from(["spider-web", "evolve", "--distribution", "clustered"]).is_err());
    }
}
