use anyhow::{ensure, Context, Result};
use clap::Parser;
use config::{Config, Environment, File};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::polygon::Polygon;
use crate::slope::{AnthropicSlope, NaturalSlope};
use crate::stopping::PackingOptions;
use crate::triangle::Triangle;


/// Relative tolerance on the center distance when checking tangency.
pub const TANGENCY_TOLERANCE: f64 = 1e-6;
/// Absolute slack in tangency checks, in units of machine epsilon times the
/// coordinate magnitude.
pub const COORDINATE_ULPS: f64 = 64.0;
/// Smallest representable radius, in units of machine epsilon times the
/// coordinate magnitude. Packing fails once a level drops below it.
pub const RESOLUTION_FACTOR: f64 = 1e3;
/// Minimum area of a triangle or polygon relative to its squared perimeter.
pub const DEGENERACY_TOLERANCE: f64 = 1e-12;
/// Minimum distance from a circle center to the vertex it is packed towards,
/// in units of the largest absolute vertex coordinate.
pub const MIN_VERTEX_DISTANCE: f64 = 1e-12;

/// The region to pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Boundary {
    Polygon {
        coordinates: Vec<[f64; 2]>,
    },
    Triangle {
        coordinates: Vec<[f64; 2]>,
    },
    AnthropicSlope {
        slope_height: f64,
        slope_dip: [f64; 2],
        crown_dist: f64,
        toe_dist: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        depth: Option<f64>,
    },
    NaturalSlope {
        surface: Vec<[f64; 2]>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        depth: Option<f64>,
    },
}

impl Boundary {
    /// The polygon enclosed by this boundary.
    pub fn polygon(&self) -> crate::error::Result<Polygon> {
        match self {
            Boundary::Polygon { coordinates } => Polygon::from_coords(coordinates),
            Boundary::Triangle { coordinates } => {
                let triangle = Triangle::from_coords(coordinates)?;
                Polygon::new(triangle.vertices().to_vec())
            }
            Boundary::AnthropicSlope {
                slope_height,
                slope_dip,
                crown_dist,
                toe_dist,
                depth,
            } => AnthropicSlope::new(*slope_height, *slope_dip, *crown_dist, *toe_dist, *depth)?
                .polygon(),
            Boundary::NaturalSlope { surface, depth } => {
                NaturalSlope::from_coords(surface, *depth)?.polygon()
            }
        }
    }
}

/// Runtime configuration for the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Output directory for packing results.
    pub directory: PathBuf,
    /// Number of bins in the diameter histogram.
    pub bins: usize,
    /// Triangles larger than this are bisected before packing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_area: Option<f64>,
    pub packing: PackingOptions,
    pub boundary: Boundary,
}

pub fn load_default_config() -> Result<Settings> {
    let root = retrieve_project_root()?;
    let default_config_file = root.join("config/default.toml");

    let settings: Config = Config::builder()
        .add_source(File::from(default_config_file).required(true))
        .build()
        .context("Error loading configuration")?;

    let config: Settings = settings
        .try_deserialize()
        .context("Error deserializing configuration")?;

    validate_config(&config)?;

    Ok(config)
}

/// Loads the configuration file, applies `CIRCPACK_*` environment variables
/// and then the command-line overrides in `args`.
pub fn load_config(args: &CliArgs) -> Result<Settings> {
    let config_file = match &args.config {
        Some(path) => path.clone(),
        None => {
            let root = retrieve_project_root()?;
            let default_config_file = root.join("config/default.toml");
            let local_config = root.join("config/local.toml");
            if local_config.exists() {
                local_config
            } else {
                default_config_file
            }
        }
    };
    log::info!("using configuration: {:?}", config_file);

    let settings: Config = Config::builder()
        .add_source(File::from(config_file.as_path()).required(true))
        .add_source(Environment::with_prefix("circpack").separator("__"))
        .build()
        .with_context(|| format!("Error loading configuration from {:?}", config_file))?;

    let mut config: Settings = settings
        .try_deserialize()
        .context("Error deserializing configuration")?;

    apply_cli(&mut config, args);
    validate_config(&config)?;

    log::debug!("{:#?}", config);

    Ok(config)
}

fn apply_cli(config: &mut Settings, args: &CliArgs) {
    if args.depth.is_some() || args.length.is_some() || args.lenght.is_some() {
        config.packing = PackingOptions {
            depth: args.depth,
            length: args.length,
            lenght: args.lenght,
        };
    }
    if let Some(max_area) = args.max_area {
        config.max_area = Some(max_area);
    }
    if let Some(bins) = args.bins {
        config.bins = bins;
    }
    if let Some(dir) = &args.dir {
        config.directory = dir.clone();
    }
    if let Some(points) = &args.polygon {
        config.boundary = Boundary::Polygon {
            coordinates: points.iter().map(|p| [p.x, p.y]).collect(),
        };
    }
}

/// Retrieve the project root directory.
/// This function tries to find the project root directory in different ways:
/// 1. If the CARGO_MANIFEST_DIR environment variable is set, use it.
/// 2. If the CIRCPACK_ROOT_DIR environment variable is set, use it.
/// 3. If the "config" subdirectory is found in the executable directory or any of its parents, use it.
fn retrieve_project_root() -> Result<PathBuf> {
    if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        return Ok(PathBuf::from(manifest_dir));
    }
    if let Ok(path) = env::var("CIRCPACK_ROOT_DIR") {
        return Ok(PathBuf::from(path));
    }

    let exe_path = env::current_exe().context("Failed to get current executable path")?;
    exe_path
        .parent()
        .into_iter()
        .flat_map(Path::ancestors)
        .find(|dir| dir.join("config").is_dir())
        .map(Path::to_path_buf)
        .context("Could not find project root directory")
}

fn validate_config(config: &Settings) -> Result<()> {
    ensure!(config.bins > 0, "Number of histogram bins must be greater than 0");
    if let Some(max_area) = config.max_area {
        ensure!(
            max_area > 0.0 && max_area.is_finite(),
            "Maximum triangle area must be positive, got {}",
            max_area
        );
    }
    config
        .packing
        .resolve()
        .context("Invalid packing options")?;
    Ok(())
}

#[derive(Parser, Debug)]
#[command(version, about = "circpack - circle packing with Descartes' theorem")]
pub struct CliArgs {
    /// Path to a configuration file. Defaults to `config/local.toml` if present,
    /// otherwise `config/default.toml`.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of refinement levels to pack in every triangle.
    #[arg(short, long, conflicts_with_all = ["length", "lenght"])]
    pub depth: Option<i64>,

    /// Stop once a corner circle's diameter drops to this length or below.
    #[arg(short, long, conflicts_with = "lenght")]
    pub length: Option<f64>,

    #[arg(long, hide = true)]
    pub lenght: Option<f64>,

    /// Bisect triangles larger than this area before packing.
    #[arg(long)]
    pub max_area: Option<f64>,

    /// Number of bins in the diameter histogram.
    #[arg(long)]
    pub bins: Option<usize>,

    /// Output directory.
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Pack this polygon instead of the configured boundary.
    /// Format: x1,y1 x2,y2 x3,y3 ...
    #[arg(long, value_parser = parse_point, num_args = 1.., value_delimiter = ' ')]
    pub polygon: Option<Vec<Point2<f64>>>,

    /// Show the packing in a window once solved.
    #[arg(long)]
    pub plot: bool,

    /// Log progress details.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parse a point in the format "x,y"
fn parse_point(s: &str) -> Result<Point2<f64>, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("Invalid point format: '{}'. Expected 'x,y'", s))?;

    let x = x
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("Failed to parse x coordinate: {}", x))?;
    let y = y
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("Failed to parse y coordinate: {}", y))?;

    Ok(Point2::new(x, y))
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = match self.packing.resolve() {
            Ok(rule) => format!("{:?}", rule),
            Err(err) => err.to_string(),
        };
        write!(
            f,
            "Settings:
  - Output directory: {}
  - Stopping rule: {}
  - Max triangle area: {:?}
  - Histogram bins: {}
  - Boundary: {:?}
  ",
            self.directory.display(),
            rule,
            self.max_area,
            self.bins,
            self.boundary,
        )
    }
}
