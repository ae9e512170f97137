fn main() -> anyhow::Result<()> {
    env_logger::init();
    quarry_bench::cli::run()
}
