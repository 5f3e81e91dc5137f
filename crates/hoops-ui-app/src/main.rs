use hoops_ui_app::{App, AppConfig};
use std::path::PathBuf;

fn main() {
    env_logger::init();

    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = match AppConfig::load_or_default(path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    log::info!("Starting {}", config.title);

    let app = match pollster::block_on(App::start(config)) {
        Ok(app) => app,
        Err(e) => {
            log::error!("Start-up failed: {}", e);
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&app.snapshot()) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}
