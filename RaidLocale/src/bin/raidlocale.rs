fn main() -> anyhow::Result<()> {
    raidlocale::cli::run_cli()
}
