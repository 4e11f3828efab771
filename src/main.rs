// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use the_chainwright::backends::local::LocalEngine;
use the_chainwright::bindings::Bindings;
use the_chainwright::config::{load_config, RuntimeBuilder};
use the_chainwright::generator::StubGenerator;
use tracing_subscriber::EnvFilter;

fn print_usage(program: &str) {
    eprintln!("Usage: {} <node.yaml>", program);
    eprintln!("       {} --generate [output.rs]", program);
    eprintln!("       {} --blocks", program);
    eprintln!("Example: {} demos/counter.yaml", program);
    eprintln!("Logging is controlled through RUST_LOG, e.g. RUST_LOG=the_chainwright=debug");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("the-chainwright");

    match args.get(1).map(String::as_str) {
        Some("--generate") => generate(args.get(2).map(String::as_str)),
        Some("--blocks") => list_blocks(),
        Some(path) if !path.starts_with("--") => run_node(path).await,
        _ => {
            print_usage(program);
            std::process::exit(1);
        }
    }
}

fn generate(output: Option<&str>) -> anyhow::Result<()> {
    let bindings = Bindings::new(Arc::new(LocalEngine::with_core_blocks()));
    let source = StubGenerator::new(&bindings).generate()?;

    match output {
        Some(path) => {
            std::fs::write(path, source).with_context(|| format!("writing {}", path))?;
            println!("✅ Wrote block constructors to {}", path);
        }
        None => print!("{}", source),
    }
    Ok(())
}

fn list_blocks() -> anyhow::Result<()> {
    let bindings = Bindings::new(Arc::new(LocalEngine::with_core_blocks()));
    for descriptor in bindings.descriptors()? {
        println!(
            "{:<16} {} -> {}",
            descriptor.name, descriptor.input_types, descriptor.output_types
        );
        for parameter in &descriptor.parameters {
            println!("    {:<12} {}", parameter.name, parameter.types);
        }
    }
    Ok(())
}

async fn run_node(path: &str) -> anyhow::Result<()> {
    let config = load_config(path).with_context(|| format!("loading {}", path))?;
    let bindings = RuntimeBuilder::bindings(&config, Arc::new(LocalEngine::with_core_blocks()));
    let mut node = RuntimeBuilder::from_config(&config, &bindings)?;

    println!("🚀 Running node '{}' with {} chain(s)", node.name(), node.len());
    println!("Config file: {}", path);
    println!();

    let start = Instant::now();
    let result = node.run(config.tick_interval(), config.max_ticks).await;
    let elapsed = start.elapsed();
    node.stop();
    let ticks = result?;

    println!();
    println!("📊 Ran {} tick(s) in {:.2?}", ticks, elapsed);
    for id in node.chain_ids() {
        println!(
            "   {} {:<16} iterations={:<6} output={:?}",
            id,
            node.chain_name(id).unwrap_or("?"),
            node.iterations(id).unwrap_or(0),
            node.output(id)
        );
    }
    Ok(())
}
