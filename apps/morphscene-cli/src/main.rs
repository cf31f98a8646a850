use clap::{Parser, Subcommand, ValueEnum};
use morphscene_assets::{MAZE1, MAZE2, MeshLibrary, SurfaceSampler};
use morphscene_common::{ParticleBuffer, SceneConfig};
use morphscene_input::Action;
use morphscene_kernel::{FrameContext, REFERENCE_DT};
use morphscene_render::{DebugTextRenderer, RenderView, Renderer};
use morphscene_tools::FrameInspector;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "morphscene-cli", about = "Headless tools for the morph scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene configuration (YAML); defaults are used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceMesh {
    Maze1,
    Maze2,
}

impl SourceMesh {
    fn name(self) -> &'static str {
        match self {
            SourceMesh::Maze1 => MAZE1,
            SourceMesh::Maze2 => MAZE2,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate info and the effective configuration
    Info,
    /// Run the scene without a window and report each frame
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "120")]
        frames: u64,
        /// Start walking on the first frame
        #[arg(long)]
        walk: bool,
        /// Press "Jump" before these frames (repeatable)
        #[arg(long = "jump-at")]
        jump_at: Vec<u64>,
        /// Frame period in seconds
        #[arg(long, default_value_t = REFERENCE_DT)]
        dt: f32,
        /// Emit JSON lines instead of text
        #[arg(long)]
        json: bool,
        /// Print the debug text render of the last frame
        #[arg(long)]
        describe: bool,
    },
    /// Sample points on a source mesh and check them against its bounds
    Sample {
        #[arg(long, value_enum, default_value = "maze1")]
        mesh: SourceMesh,
        #[arg(short, long, default_value = "5000")]
        count: usize,
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("morphscene-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("assets: {}", morphscene_assets::crate_info());
            println!("anim: {}", morphscene_anim::crate_info());
            println!("render: {}", morphscene_render::crate_info());
            println!("tools: {}", morphscene_tools::crate_info());
            let library = MeshLibrary::with_default_sources()?;
            println!(
                "meshes: {}",
                library.names().collect::<Vec<_>>().join(", ")
            );
            println!("--- config ---");
            print!("{}", config.to_yaml()?);
        }
        Commands::Simulate {
            frames,
            walk,
            jump_at,
            dt,
            json,
            describe,
        } => {
            let dt = frame_period(dt)?;
            let mut ctx = FrameContext::build(config)?;
            if walk {
                morphscene_input::apply(&mut ctx, Action::SetWalking(true));
            }
            let mut log = Vec::new();
            for frame in 0..frames {
                if jump_at.contains(&frame) {
                    morphscene_input::apply(&mut ctx, Action::Jump);
                }
                ctx.update(dt);
                if json {
                    println!("{}", serde_json::to_string(&ctx.snapshot())?);
                } else {
                    println!("{}", FrameInspector::summary(&ctx));
                }
                log.extend(ctx.drain_events());
            }

            if json {
                for event in &log {
                    println!("{}", serde_json::to_string(event)?);
                }
            } else {
                let tally = FrameInspector::tally(&log);
                println!(
                    "events: transitions={} jumps={} saturations={} wraps={} toggles={} missing={}",
                    tally.transitions,
                    tally.jumps,
                    tally.morph_saturations,
                    tally.walk_wraps,
                    tally.walk_toggles,
                    tally.missing_clips
                );
            }

            if describe {
                let view = RenderView {
                    target: glam::Vec3::from_array(ctx.config().camera_target),
                    ..RenderView::default()
                };
                print!("{}", DebugTextRenderer::new().render(&ctx, &view));
            }
        }
        Commands::Sample { mesh, count, seed } => {
            let library = MeshLibrary::with_default_sources()?;
            let source = library.require(mesh.name())?;
            let sampler = SurfaceSampler::build(source)?;
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let points: Vec<_> = (0..count).map(|_| sampler.sample(&mut rng)).collect();
            let buffer = ParticleBuffer::from_points(&points);
            println!(
                "{}: {} triangles, sampled area {:.2}",
                source.name(),
                source.triangle_count(),
                sampler.total_area()
            );
            println!("points: {} ({} floats)", buffer.len(), buffer.as_slice().len());
            match source.bounds() {
                Some(aabb) => {
                    let inside = buffer.points().all(|p| aabb.contains(p, 1e-4));
                    println!(
                        "bounds: min=({:.2}, {:.2}, {:.2}) max=({:.2}, {:.2}, {:.2})",
                        aabb.min.x, aabb.min.y, aabb.min.z, aabb.max.x, aabb.max.y, aabb.max.z
                    );
                    println!("all inside: {}", if inside { "OK" } else { "NO" });
                }
                None => println!("bounds: empty mesh"),
            }
        }
    }

    Ok(())
}

/// Simulation frame period; must be a positive, finite number of seconds.
fn frame_period(dt: f32) -> anyhow::Result<f32> {
    if !dt.is_finite() || dt <= 0.0 {
        anyhow::bail!("--dt must be a positive number of seconds, got {dt}");
    }
    Ok(dt)
}
