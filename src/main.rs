use log::{error, warn};
use std::env;

use datecol::transform;

const DEFAULT_PATH: &str = "data.csv";

fn main() {
    env_logger::init();

    let extra: Vec<String> = env::args().skip(1).collect();
    if !extra.is_empty() {
        warn!("arguments are not supported and will be ignored: {:?}", extra);
    }

    if let Err(err) = transform(DEFAULT_PATH, DEFAULT_PATH) {
        error!("{}", err);
        std::process::exit(1);
    }
}
