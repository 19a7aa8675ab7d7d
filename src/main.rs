use anyhow::{Context, Result};
use portfolio_problem::baseline::sample_baseline;
use portfolio_problem::config::BaselineConfig;
use portfolio_problem::problem::sampling::seeded_rng;
use portfolio_problem::PortfolioInstance;
use std::{fs::File, io::Write, time::Instant};
use tracing::info;

fn main() -> Result<()> {
    let config = BaselineConfig::from_env().context("Invalid baseline configuration")?;
    config.problem.init_tracing();

    let instance = PortfolioInstance::load(&config.instance, &config.problem)
        .with_context(|| format!("Failed to load instance {}", config.instance.display()))?;
    info!(
        stocks = instance.stock_count(),
        expected_profit = instance.expected_profit(),
        "Instance ready"
    );

    let (mut rng, seed) = seeded_rng(config.seed);
    info!(samples = config.samples, seed, "Sampling random portfolios");
    let start = Instant::now();
    let report = sample_baseline(&instance, config.samples, &mut rng);
    let elapsed = start.elapsed();

    println!(
        "{} / {} random portfolios feasible ({:.1}%) in {:.2?}",
        report.feasible,
        report.samples,
        report.feasible_ratio() * 100.0,
        elapsed
    );
    match (report.best_risk, report.mean_risk) {
        (Some(best), Some(mean)) => {
            println!("best risk = {:.6}, mean risk = {:.6}", best, mean);
            if let Some(std_dev) = report.risk_std_dev {
                println!("risk std dev = {:.6}", std_dev);
            }
        }
        _ => println!("no feasible portfolio found, try more samples"),
    }

    if let Some(path) = &config.report {
        let json = serde_json::to_string_pretty(&report)?;
        let mut f = File::create(path)
            .with_context(|| format!("Failed to create report {}", path.display()))?;
        f.write_all(json.as_bytes())?;
        info!(path = %path.display(), "Report written");
    }

    Ok(())
}
