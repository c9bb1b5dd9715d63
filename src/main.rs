use ogl_framework::{Config, Engine, config::CONFIG_PATH, logging};

fn run() -> ogl_framework::Result<()> {
    let config = Config::load(CONFIG_PATH)?;
    logging::init(config.log_level)?;

    let mut engine = Engine::new(&config)?;
    engine.init();
    engine.run()?;
    engine.shut_down();
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        // The logger may not be up yet if the config was the problem.
        if log::log_enabled!(log::Level::Error) {
            log::error!("{e}");
        } else {
            eprintln!("error: {e}");
        }
        std::process::exit(1);
    }
}
