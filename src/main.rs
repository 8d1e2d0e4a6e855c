// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::time::Instant;

use anyhow::{bail, Context};
use analysis_backends::backends::{Backend, BackendFactory};
use analysis_backends::builtins::{self, Square, SumOfSquares};
use analysis_backends::config::consts::{WORKER_LOG_LEVEL, WORKER_SUBCOMMAND};
use analysis_backends::config::{load_config, Config, LoggingConfig};
use analysis_backends::observability::init_logging;
use analysis_backends::partition::computation_groups;
use analysis_backends::traits::ExecutionBackend;
use analysis_backends::worker::run_worker;

fn usage(program: &str) {
    eprintln!("Usage: {} {}", program, WORKER_SUBCOMMAND);
    eprintln!("       {} run <config.yaml|config.toml> square <int>...", program);
    eprintln!("       {} run <config.yaml|config.toml> sum-of-squares <n_frames>", program);
    eprintln!("Example: {} run configs/process-pool.yaml square 1 2 3 4 5", program);
    eprintln!("Example: {} run configs/task-graph.toml sum-of-squares 1000", program);
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("analysis-backends");

    let result = match args.get(1).map(String::as_str) {
        Some(mode) if mode == WORKER_SUBCOMMAND => serve_builtins(),
        Some("run") if args.len() >= 4 => run(&args[2], &args[3], &args[4..]),
        _ => {
            usage(program);
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

/// Worker mode: stdout belongs to the protocol, so logs stay on stderr at a quiet level.
fn serve_builtins() -> anyhow::Result<()> {
    init_logging(&LoggingConfig::with_level(WORKER_LOG_LEVEL))?;
    run_worker(&builtins::registry()).context("worker protocol failed")?;
    Ok(())
}

fn run(config_file: &str, function: &str, operands: &[String]) -> anyhow::Result<()> {
    let config = load_config(config_file)
        .with_context(|| format!("failed to load configuration '{}'", config_file))?;
    init_logging(&config.logging)?;

    let backend = BackendFactory::from_config(&config)?;
    print_header(config_file, &config, &backend);

    let start = Instant::now();
    match function {
        "square" => {
            let items = operands
                .iter()
                .map(|operand| {
                    operand
                        .parse::<i64>()
                        .with_context(|| format!("'{}' is not an integer", operand))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            let results = backend.apply(&Square, &items)?;

            println!("\n📊 Results:");
            for (item, result) in items.iter().zip(&results) {
                println!("   {} -> {}", item, result);
            }
        }
        "sum-of-squares" => {
            let [n_frames] = operands else {
                bail!("sum-of-squares takes exactly one argument: <n_frames>");
            };
            let n_frames: usize = n_frames
                .parse()
                .with_context(|| format!("'{}' is not a frame count", n_frames))?;

            let groups: Vec<_> = computation_groups(n_frames, backend.n_workers())
                .into_iter()
                .map(|group| group.start as u64..group.end as u64)
                .collect();
            let sums = backend.apply(&SumOfSquares, &groups)?;

            println!("\n📊 Results:");
            for (group, sum) in groups.iter().zip(&sums) {
                println!("   frames {:?}: {}", group, sum);
            }
            let total = sums
                .iter()
                .try_fold(0u64, |total, sum| total.checked_add(*sum))
                .context("total sum of squares overflows u64")?;
            println!("   total: {}", total);
        }
        other => bail!("unknown function '{}', expected 'square' or 'sum-of-squares'", other),
    }

    println!("⏱️  Execution Time: {:?}", start.elapsed());
    Ok(())
}

fn print_header(config_file: &str, config: &Config, backend: &Backend) {
    println!("📋 Configuration: {}", config_file);
    println!("🔧 Backend: {}", config.backend);
    println!("⚙️  Workers: {}", backend.n_workers());
    for warning in backend.warnings() {
        println!("⚠️  {}", warning);
    }
}
