//! CarrierSave CLI binary

fn main() -> anyhow::Result<()> {
    carriersave::cli::run_cli()
}
