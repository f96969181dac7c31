use log::{error, warn};
use veil::{AppConfig, FULL_COVER_TRIGGER, TransitionConfig, TransitionStyle};

/// Read transition tweaks from `VEIL_STYLE` (`smoke` | `fade`) and
/// `VEIL_TRIGGER` (`early` | `full`).
fn transition_from_env() -> TransitionConfig {
    let mut config = TransitionConfig::default();

    match std::env::var("VEIL_STYLE").as_deref() {
        Ok("fade") => config = config.style(TransitionStyle::Fade),
        Ok("smoke") | Err(_) => {}
        Ok(other) => warn!("unknown VEIL_STYLE '{other}', using smoke"),
    }

    match std::env::var("VEIL_TRIGGER").as_deref() {
        Ok("full") => config = config.cover_trigger(FULL_COVER_TRIGGER),
        Ok("early") | Err(_) => {}
        Ok(other) => warn!("unknown VEIL_TRIGGER '{other}', using early"),
    }

    config
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("veil=info"))
        .init();

    let config = AppConfig::new()
        .title("Veil Showcase")
        .transition(transition_from_env());

    if let Err(err) = veil::run(config) {
        error!("event loop failed: {err}");
        std::process::exit(1);
    }
}
