use anyhow::Result;
use map_atlas::config::{Config, SourceType};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt)]
struct Args {
    /// Path to the world save directory.
    #[structopt(long, parse(from_os_str))]
    world: PathBuf,

    /// Server dialect the world was saved by.
    #[structopt(long, default_value = "java")]
    r#type: String,

    /// Directory to write the tile pyramid and marker files into.
    #[structopt(long, parse(from_os_str))]
    output: PathBuf,

    /// Include maps with unlimited tracking enabled (normally dropped).
    #[structopt(long)]
    include_unlimited_tracking: bool,

    /// Paint buckets in map-epoch order instead of detail-then-epoch order.
    #[structopt(long)]
    disable_zoom_sort: bool,

    /// Copy the viewer's static assets from this directory into the output.
    #[structopt(long, parse(from_os_str))]
    copy_template: Option<PathBuf>,

    /// Suppress progress bars and the summary line.
    #[structopt(long)]
    quiet: bool,

    /// Re-render every map regardless of its stored content hash.
    #[structopt(long)]
    force: bool,
}

#[paw::main]
fn main(args: Args) -> Result<()> {
    env_logger::init();

    let source_type: SourceType = args.r#type.parse()?;
    let config = Config {
        world: args.world,
        source_type,
        output: args.output,
        include_unlimited_tracking: args.include_unlimited_tracking,
        disable_zoom_sort: args.disable_zoom_sort,
        copy_template: args.copy_template,
        quiet: args.quiet,
        force: args.force,
    };

    map_atlas::run(&config)
}
