use argh::FromArgs;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use trimorph::config::DEFAULT_SIZE;
use trimorph::io::{read_image_rgb8, write_image_rgb8};
use trimorph::render::overlay::{draw_mesh, DEFAULT_WIRE_COLOR};
use trimorph::{
    AnimationWorker, CorrespondenceMesh, FrameCount, InsertOutcome, MorphConfig, MorphRenderer,
    PointPair, RasterizerType,
};

#[derive(FromArgs)]
/// Morph one image into another along hand-picked point correspondences
struct Args {
    /// path to the "before" image
    #[argh(option, short = 'b')]
    before: PathBuf,

    /// path to the "after" image
    #[argh(option, short = 'a')]
    after: PathBuf,

    /// JSON file of point pairs: [{"source": [x, y], "target": [x, y]}, ...]
    #[argh(option, short = 'p')]
    points: Option<PathBuf>,

    /// number of frames, a power of two in [2, 4096] (default: 16)
    #[argh(option, short = 'n', default = "FrameCount::default()")]
    frames: FrameCount,

    /// side of the square working region in pixels (default: 512)
    #[argh(option, short = 's', default = "DEFAULT_SIZE")]
    size: u32,

    /// directory the frames are written to
    #[argh(option, short = 'o')]
    out: PathBuf,

    /// also write the side-by-side mesh overlay as mesh.png
    #[argh(switch)]
    overlay: bool,

    /// rasterizer: scanline, edge (default: scanline)
    #[argh(option, short = 'r', default = "RasterizerType::default()")]
    rasterizer: RasterizerType,
}

fn load_points(path: &Path) -> Result<Vec<PointPair>, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let config = MorphConfig::with_size(args.size)?;
    let before = read_image_rgb8(&args.before, config.size)?;
    let after = read_image_rgb8(&args.after, config.size)?;

    let mut mesh = CorrespondenceMesh::new(config);
    let pairs = match &args.points {
        Some(path) => load_points(path)?,
        None => Vec::new(),
    };
    for pair in pairs {
        match mesh.insert_pair(pair) {
            InsertOutcome::Inserted { flips } => {
                info!(
                    "inserted ({}, {}) -> ({}, {}), {flips} flips",
                    pair.source.x, pair.source.y, pair.target.x, pair.target.y
                );
            }
            outcome => warn!(
                "skipped ({}, {}) -> ({}, {}): {outcome:?}",
                pair.source.x, pair.source.y, pair.target.x, pair.target.y
            ),
        }
    }
    info!("mesh has {} triangle pairs", mesh.len());

    fs::create_dir_all(&args.out)?;

    if args.overlay {
        let overlay = draw_mesh(&mesh, &before, &after, DEFAULT_WIRE_COLOR)?;
        write_image_rgb8(args.out.join("mesh.png"), &overlay)?;
    }

    let renderer = MorphRenderer::new(args.rasterizer);
    info!("rendering {} with {} rasterizer", args.frames, args.rasterizer);

    let worker = AnimationWorker::spawn(renderer, mesh, before, after, args.frames);
    while let Some(frame) = worker.recv() {
        let frame = frame?;
        let path = args.out.join(format!("frame_{:04}.png", frame.index));
        write_image_rgb8(&path, &frame.image)?;
        info!("wrote {} (tau={:.4})", path.display(), frame.tau);
    }
    let rendered = worker.join();
    info!("done, {rendered} frames");

    Ok(())
}
