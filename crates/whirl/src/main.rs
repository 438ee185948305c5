use clap::Parser;
use whirl::app::App;
use whirl::config;
use whirl::sys::runtime;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Write the default config file, print its path and exit
    #[arg(long)]
    init: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.init {
        let path = config::write_default_config()?;
        println!("{}", path.display());
        return Ok(());
    }

    let config = config::load_or_setup();
    let app = App::from_config(&config)?;

    let (tx, rx) = async_channel::bounded(32);

    runtime::run(
        app,
        config.socket_path.clone(),
        config.frame_interval_ms,
        tx,
        rx,
    )?;
    Ok(())
}
