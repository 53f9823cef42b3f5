use anyhow::Result;
use clap::Parser;

use circpack::output;
use circpack::packing::CircPacking;
use circpack::settings::{self, CliArgs};

fn main() -> Result<()> {
    let args = CliArgs::parse();

    let level = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let settings = settings::load_config(&args)?;
    println!("{}", settings);

    let polygon = settings.boundary.polygon()?;
    let mut packing = CircPacking::new(polygon, settings.packing.clone(), settings.max_area)?;
    packing.solve()?;

    let summary = packing.summary(settings.bins)?;
    println!("{}", summary);

    output::writeup(&settings, &packing.circles, &summary)?;

    if args.plot {
        #[cfg(feature = "macroquad")]
        circpack::helpers::show("circpack", &packing);
        #[cfg(not(feature = "macroquad"))]
        log::warn!("built without the `visualization` feature, --plot is ignored");
    }

    Ok(())
}
