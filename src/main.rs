use anyhow::Result;
use chip8vm::{
    frontend,
    headless::Headless,
    Args,
    Config,
};
use clap::Parser;

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::from_args(Args::parse())?;
    let mut emulator = chip8vm::boot(&config)?;

    if config.headless {
        Headless::new(&config).run(&mut emulator)?;
        return Ok(());
    }

    macroquad::Window::from_config(frontend::window_conf(&config), async move {
        if let Err(e) = frontend::run(config, emulator).await {
            log::error!("{:#}", e);
            std::process::exit(1);
        }
    });

    Ok(())
}
