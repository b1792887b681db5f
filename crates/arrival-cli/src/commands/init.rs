use std::path::Path;

use arrival_core::ArrivalRateConfig;

pub fn init(name: &str, output: &Path) -> anyhow::Result<()> {
    if output.exists() {
        anyhow::bail!("{} already exists", output.display());
    }
    let config = ArrivalRateConfig::scaffold(name);
    std::fs::write(output, config.to_toml_string()?)?;
    println!("✓ Generated {}", output.display());
    Ok(())
}
