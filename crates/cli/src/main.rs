use clap::{Parser, Subcommand};
use anyhow::{Context, Result};

use heredity_core::inference::{infer, Accumulation, InferenceOptions, Posteriors};
use heredity_core::{Family, ModelParams};

#[derive(Parser)]
#[command(name = "heredity")]
#[command(version)]
#[command(about = "Exact inference of gene copies and trait presence in a family tree")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute posterior gene and trait distributions for every person
    Infer {
        /// Path to family CSV (columns: name, mother, father, trait)
        data: String,

        /// JSON file overriding the probability model
        #[arg(long)]
        params: Option<String>,

        /// Override the mutation rate
        #[arg(long)]
        mutation_rate: Option<f64>,

        /// Output format: "text" (default) or "json"
        #[arg(long, default_value = "text")]
        format: String,

        /// Always accumulate probabilities in log space
        #[arg(long)]
        log_space: bool,

        /// Disable parallel enumeration
        #[arg(long)]
        sequential: bool,
    },

    /// Load and validate a family CSV without running inference
    Check {
        /// Path to family CSV (columns: name, mother, father, trait)
        data: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Infer {
            data,
            params,
            mutation_rate,
            format,
            log_space,
            sequential,
        } => cmd_infer(
            &data,
            params.as_deref(),
            mutation_rate,
            &format,
            log_space,
            sequential,
        ),
        Commands::Check { data } => cmd_check(&data),
    }
}

fn load_family(data_path: &str) -> Result<Family> {
    let family = Family::from_csv(data_path)
        .with_context(|| format!("Failed to load family from '{}'", data_path))?;
    eprintln!(
        "Loaded {} people ({} with observed trait) from '{}'",
        family.len(),
        family.n_observed(),
        data_path
    );
    Ok(family)
}

fn cmd_infer(
    data_path: &str,
    params_path: Option<&str>,
    mutation_rate: Option<f64>,
    output_format: &str,
    log_space: bool,
    sequential: bool,
) -> Result<()> {
    let family = load_family(data_path)?;

    let mut params = match params_path {
        Some(path) => ModelParams::from_json_file(path)
            .with_context(|| format!("Failed to load model parameters from '{}'", path))?,
        None => ModelParams::default(),
    };
    if let Some(mu) = mutation_rate {
        params = params.with_mutation_rate(mu);
    }

    let accumulation = if log_space {
        Accumulation::LogSpace
    } else {
        Accumulation::Auto
    };
    let options = InferenceOptions::new()
        .params(params)
        .accumulation(accumulation)
        .parallel(!sequential);

    let posteriors = infer(&family, &options).context("Inference failed")?;

    eprintln!(
        "Evaluated {} joint assignments over {} evidence-consistent trait sets",
        posteriors.stats.evaluations, posteriors.stats.consistent_trait_partitions
    );

    match output_format.to_lowercase().as_str() {
        "json" => print_json(&posteriors)?,
        "text" => print!("{}", posteriors.summary()),
        other => {
            anyhow::bail!("Unknown format '{}'. Use 'text' (default) or 'json'.", other);
        }
    }

    Ok(())
}

fn print_json(posteriors: &Posteriors) -> Result<()> {
    let json_str = serde_json::to_string_pretty(posteriors)?;
    println!("{}", json_str);
    Ok(())
}

fn cmd_check(data_path: &str) -> Result<()> {
    let family = load_family(data_path)?;

    println!("Family: {} people, {} founders", family.len(), family.founders().len());
    for i in 0..family.len() {
        let parents = match family.parents(i) {
            Some((m, f)) => format!("mother={} father={}", family.name(m), family.name(f)),
            None => "founder".to_string(),
        };
        let observed = match family.observed_trait(i) {
            Some(true) => "present",
            Some(false) => "absent",
            None => "unknown",
        };
        println!("  {}: {} trait={}", family.name(i), parents, observed);
    }

    Ok(())
}
