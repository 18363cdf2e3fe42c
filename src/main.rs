fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = store_sales_etl::args::parse();
    store_sales_etl::cli::main(args)
}
