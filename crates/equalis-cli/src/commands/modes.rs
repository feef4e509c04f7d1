//! Built-in mode listing.

use anyhow::bail;
use clap::Args;
use equalis_config::{factory_modes, get_factory_mode};

#[derive(Args)]
pub struct ModesArgs {
    /// Show the bands of one mode
    #[arg(value_name = "NAME")]
    name: Option<String>,
}

pub fn run(args: ModesArgs) -> anyhow::Result<()> {
    let Some(name) = args.name else {
        println!("Available Modes\n");
        for mode in factory_modes() {
            println!(
                "  {:<10} {} band(s)  {}",
                mode.name.to_lowercase(),
                mode.len(),
                mode.description.as_deref().unwrap_or("")
            );
        }
        return Ok(());
    };

    let Some(mode) = get_factory_mode(&name) else {
        bail!("Mode '{}' not found. Use 'equalis modes' to list modes.", name);
    };

    println!("{}", mode.name);
    if let Some(description) = &mode.description {
        println!("{description}");
    }
    if mode.is_empty() {
        println!("\n  (no preset bands; pass --band to 'equalis equalize')");
        return Ok(());
    }
    println!("\n  {:<14} {:<6} {:<10} Ranges (Hz)", "Band", "Gain", "Slider");
    for band in &mode.bands {
        let ranges: Vec<String> = band
            .ranges
            .iter()
            .map(|[lo, hi]| format!("{lo}-{hi}"))
            .collect();
        let slider = format!("{}..{}", band.min_gain, band.max_gain);
        println!(
            "  {:<14} {:<6} {:<10} {}",
            band.label,
            band.gain,
            slider,
            ranges.join(", ")
        );
    }
    Ok(())
}
