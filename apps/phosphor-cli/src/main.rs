use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use glam::Vec3;
use phosphor_assets::{Mesh, MeshLibrary};
use phosphor_common::{Transform3D, ViewMode};
use phosphor_input::Action;
use phosphor_kernel::{Session, SessionConfig, SimParams, World, WorldEvent};
use phosphor_render::{
    Camera, Framebuffer, MeshInstance, Projection, RenderConfig, TextArt, WireframeRenderer,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "phosphor", about = "Vector-display wireframe renderer and pong simulation")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the stock mesh library
    Info,
    /// Render one mesh as text art, and optionally as a PPM image
    Render {
        /// Stock mesh name or path to a mesh JSON file
        #[arg(short, long, default_value = "cube")]
        mesh: String,
        /// Camera position as x,y,z
        #[arg(long, default_value = "2.5,2,3", value_parser = parse_vec3)]
        camera: Vec3,
        /// Camera target as x,y,z
        #[arg(long, default_value = "0,0,0", value_parser = parse_vec3)]
        target: Vec3,
        /// Session config whose render section is used
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long, default_value = "80")]
        cols: usize,
        #[arg(long, default_value = "40")]
        rows: usize,
        /// Write the framebuffer to this PPM file
        #[arg(long)]
        ppm: Option<PathBuf>,
        #[arg(long)]
        orthographic: bool,
        /// Draw every edge inside the viewport, unsorted
        #[arg(long)]
        no_hidden_lines: bool,
    },
    /// Run the pong arena headless and report scores
    Pong {
        #[arg(short, long, default_value = "600")]
        ticks: u64,
        /// Overrides the config seed
        #[arg(short, long)]
        seed: Option<u64>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// View mode to run in: 2d or 3d
        #[arg(long)]
        mode: Option<ViewMode>,
        /// JSON array of actions applied before the first tick
        #[arg(long)]
        actions: Option<String>,
        /// Print the final frame as text art
        #[arg(long)]
        show: bool,
        /// Write the final frame to this PPM file
        #[arg(long)]
        ppm: Option<PathBuf>,
    },
    /// Check a mesh JSON file and print its counts
    Validate { path: PathBuf },
}

const TICK: f32 = 1.0 / 60.0;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Commands::Info => {
            println!("phosphor v{}", env!("CARGO_PKG_VERSION"));
            let library = MeshLibrary::with_defaults();
            for name in ["cube", "paddle", "ball"] {
                if let Some(mesh) = library.get_by_name(name) {
                    println!(
                        "mesh {name}: {} vertices, {} edges, {} faces",
                        mesh.vertex_count(),
                        mesh.edge_count(),
                        mesh.face_count()
                    );
                }
            }
            let world = World::new(0, SimParams::default());
            println!("systems: {}", world.system_names().join(" -> "));
        }
        Commands::Render {
            mesh,
            camera,
            target,
            config,
            cols,
            rows,
            ppm,
            orthographic,
            no_hidden_lines,
        } => {
            let mut render = match config {
                Some(path) => SessionConfig::load(&path)?.render,
                None => RenderConfig::default(),
            };
            if orthographic {
                render.projection = Projection::Orthographic;
            }
            if no_hidden_lines {
                render.hidden_line_removal = false;
            }

            let mesh = resolve_mesh(&mesh)?;
            let mut cam = Camera::new(camera, target);
            cam.set_aspect(render.width, render.height);
            let instance = MeshInstance {
                mesh,
                transform: Transform3D::default(),
                color: render.phosphor_color,
            };

            let viewport = render.viewport();
            let mut canvas = Framebuffer::new(render.width, render.height);
            let mut renderer = WireframeRenderer::new(render);
            let segments = renderer.render(&[instance], &cam, 0.0, &mut canvas);
            tracing::info!(segments = segments.len(), "mesh rendered");

            println!("{}", TextArt::from_segments(&segments, viewport, cols, rows));
            if let Some(path) = ppm {
                write_ppm(&canvas, &path)?;
            }
        }
        Commands::Pong {
            ticks,
            seed,
            config,
            mode,
            actions,
            show,
            ppm,
        } => {
            let mut config = match config {
                Some(path) => SessionConfig::load(&path)?,
                None => SessionConfig::default(),
            };
            if let Some(seed) = seed {
                config.seed = seed;
            }
            if let Some(mode) = mode {
                config.view_mode = mode;
            }
            let viewport = config.render.viewport();
            let (width, height) = (config.render.width, config.render.height);

            let mut session = Session::new(config);
            if let Some(json) = actions {
                let actions: Vec<Action> =
                    serde_json::from_str(&json).context("--actions must be a JSON array of actions")?;
                session.input_mut().apply_all(actions);
            }

            let mut canvas = Framebuffer::new(width, height);
            let mut segments = Vec::new();
            let (mut bounces, mut switches) = (0, 0);
            for tick in 0..ticks {
                if tick + 1 == ticks {
                    segments = session.frame(TICK, &mut canvas);
                } else {
                    session.advance(TICK);
                }
                for event in session.last_events() {
                    match event {
                        WorldEvent::Bounced { .. } => bounces += 1,
                        WorldEvent::ModeSwitched { .. } => switches += 1,
                        WorldEvent::Stepped { .. } | WorldEvent::Scored { .. } => {}
                    }
                }
            }

            let world = session.world();
            println!(
                "tick={} seed={:#x} hash={:#018x} bounces={bounces} mode_switches={switches}",
                world.tick(),
                world.seed(),
                world.state_hash()
            );
            for (side, points) in session.scores() {
                println!("{:>6}: {points}", side.as_str());
            }

            if show {
                println!("{}", TextArt::from_segments(&segments, viewport, 80, 40));
            }
            if let Some(path) = ppm {
                if ticks == 0 {
                    bail!("--ppm needs at least one tick");
                }
                write_ppm(&canvas, &path)?;
            }
        }
        Commands::Validate { path } => {
            let mesh = Mesh::load(&path).with_context(|| format!("invalid mesh {}", path.display()))?;
            println!(
                "{}: OK ({} vertices, {} edges, {} faces, {} loose edges, radius {:.3})",
                path.display(),
                mesh.vertex_count(),
                mesh.edge_count(),
                mesh.face_count(),
                mesh.loose_edges().len(),
                mesh.bounding_radius()
            );
        }
    }

    Ok(())
}

/// A stock mesh name, or a path to a mesh JSON file.
fn resolve_mesh(name: &str) -> anyhow::Result<Arc<Mesh>> {
    let path = Path::new(name);
    if path.exists() {
        return Ok(Arc::new(Mesh::load(path)?));
    }
    MeshLibrary::with_defaults()
        .get_by_name(name)
        .cloned()
        .with_context(|| format!("no stock mesh or file named {name:?}"))
}

fn write_ppm(canvas: &Framebuffer, path: &Path) -> anyhow::Result<()> {
    canvas
        .write_ppm(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "frame written");
    Ok(())
}

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f32>().map_err(|e| format!("{p:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match parts[..] {
        [x, y, z] => Ok(Vec3::new(x, y, z)),
        _ => Err(format!("expected x,y,z, got {} values", parts.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn vec3_arguments() {
        assert_eq!(parse_vec3("1, 2.5,-3").unwrap(), Vec3::new(1.0, 2.5, -3.0));
        assert!(parse_vec3("1,2").is_err());
        assert!(parse_vec3("a,b,c").is_err());
    }

    #[test]
    fn pong_accepts_mode_names() {
        let cli = Cli::try_parse_from(["phosphor", "pong", "--mode", "2d", "--ticks", "3"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Pong {
                mode: Some(ViewMode::Planar),
                ticks: 3,
                ..
            }
        ));
    }
}
