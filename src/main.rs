use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use decoupe::render;
use decoupe::solver::Optimizer;
use decoupe::types::{CutConfig, PanelDims, PieceType, Settings};

#[derive(Parser)]
#[command(name = "decoupe", about = "2D guillotine panel cutting optimizer")]
struct Cli {
    /// Panel dimensions (WxH in mm, e.g. 2440x1220)
    #[arg(long, required_unless_present = "config", conflicts_with = "config")]
    panel: Option<String>,

    /// Pieces to cut as WxH:qty (e.g. 800x600:3 400x300:5)
    #[arg(long = "cuts", num_args = 1.., conflicts_with = "config")]
    cuts: Vec<String>,

    /// Minimum usable off-cut size in mm
    #[arg(long, default_value_t = 100)]
    min_waste: u32,

    /// Disable piece rotation
    #[arg(long)]
    no_rotate: bool,

    /// Restrict placements to the top and bottom rows of each panel
    #[arg(long)]
    poignet: bool,

    /// Load a full JSON configuration instead of flags
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Show ASCII layout of each panel
    #[arg(long)]
    layout: bool,

    /// Emit the full result as JSON
    #[arg(long)]
    json: bool,

    #[arg(long, default_value = "warn", value_name = "[off, error, warn, info, debug, trace]")]
    log_level: LevelFilter,
}

fn parse_dimensions(s: &str) -> Result<(u32, u32), String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        return Err(format!("invalid dimensions '{}', expected WxH", s));
    }
    let w = parts[0]
        .parse::<u32>()
        .map_err(|_| format!("invalid width in '{}'", s))?;
    let h = parts[1]
        .parse::<u32>()
        .map_err(|_| format!("invalid height in '{}'", s))?;
    if w == 0 || h == 0 {
        return Err(format!("dimensions must be non-zero in '{}'", s));
    }
    Ok((w, h))
}

fn parse_cut(s: &str, type_id: u32, rotation_allowed: bool) -> Result<PieceType, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 {
        return Err(format!("invalid cut '{}', expected WxH:qty", s));
    }
    let (width, height) = parse_dimensions(parts[0])?;
    let quantity = parts[1]
        .parse::<u32>()
        .map_err(|_| format!("invalid quantity in '{}'", s))?;
    if quantity == 0 {
        return Err(format!("quantity must be non-zero in '{}'", s));
    }
    Ok(PieceType {
        type_id,
        width,
        height,
        quantity,
        rotation_allowed,
    })
}

fn build_config(cli: &Cli) -> Result<CutConfig, String> {
    if let Some(path) = &cli.config {
        let file = File::open(path).map_err(|e| format!("cannot open {}: {e}", path.display()))?;
        return serde_json::from_reader(BufReader::new(file))
            .map_err(|e| format!("cannot parse {}: {e}", path.display()));
    }

    let Some(panel) = cli.panel.as_deref() else {
        return Err("either --panel or --config is required".to_string());
    };
    let (width, height) = parse_dimensions(panel)?;
    let pieces = cli
        .cuts
        .iter()
        .enumerate()
        .map(|(i, c)| parse_cut(c, i as u32, !cli.no_rotate))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CutConfig {
        panel: PanelDims { width, height },
        settings: Settings {
            min_waste_size: cli.min_waste,
            poignet_enabled: cli.poignet,
        },
        pieces,
    })
}

fn main() {
    let cli = Cli::parse();
    decoupe::init_logger(cli.log_level).expect("logger already initialized");

    let config = build_config(&cli).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    let (stock_w, stock_h) = (config.panel.width, config.panel.height);

    let solution = Optimizer::new(config).optimize();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&solution).unwrap());
        return;
    }

    for panel in &solution.panels {
        println!("Panel {}:", panel.panel_index + 1);
        for p in &panel.placements {
            let rot = if p.orientation.is_rotated() {
                " [rotated]"
            } else {
                ""
            };
            println!("  piece {} ({}x{}) @ ({}, {}){}", p.piece_id, p.w, p.h, p.x, p.y, rot);
        }
        if cli.layout {
            print!("{}", render::render_panel(stock_w, stock_h, &panel.placements));
        }
        println!();
    }

    if !solution.rejected.is_empty() {
        println!("Rejected pieces:");
        for r in &solution.rejected {
            println!("  piece {} ({}x{})", r.piece_id, r.w, r.h);
        }
        println!();
    }

    println!(
        "Summary: {} panel{} used, {:.1}% used, {:.1}% waste, {} rejected",
        solution.stats.panel_count,
        if solution.stats.panel_count == 1 { "" } else { "s" },
        solution.stats.used_percentage,
        solution.stats.waste_percentage,
        solution.rejected.len(),
    );
}
