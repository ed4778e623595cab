pub mod compositor;
pub mod config;
pub mod decoder;
pub mod dimension;
pub mod markers;
pub mod palette;
pub mod png_store;
pub mod source;
pub mod tile;
pub mod pyramid;

mod bedrock_nbt;
pub mod nbt_tree;
mod utilities;

use anyhow::Result;
use config::{Config, SourceType};
use decoder::DecodedMap;
use dimension::Dimension;
use png_store::StoredMapPng;
use rayon::prelude::*;
use source::bedrock::SourceBedrock;
use source::java::SourceJava;
use source::{RawMap, SourceAdapter};
use std::collections::HashMap;
use std::fs;
use std::time::Instant;
use utilities::progress_bar;

#[derive(Default)]
pub struct Report {
    pub maps_written: usize,
    pub maps_dropped: usize,
    pub tiles_written: usize,
}

fn scan(config: &Config) -> Result<Vec<RawMap>> {
    match config.source_type {
        SourceType::Java => SourceJava::open(&config.world)?.scan(),
        SourceType::Bedrock => SourceBedrock::open(&config.world)?.scan(),
    }
}

pub fn run(config: &Config) -> Result<()> {
    let start_time = Instant::now();

    fs::create_dir_all(&config.output)?;
    let maps_dir = config.output.join("maps");
    fs::create_dir_all(&maps_dir)?;
    let merged_maps_dir = config.output.join("merged-maps");
    fs::create_dir_all(&merged_maps_dir)?;
    let tiles_dir = config.output.join("tiles");
    fs::create_dir_all(&tiles_dir)?;

    let raw_maps = scan(config)?;

    let decode_bar = progress_bar(config.quiet, "Decode", raw_maps.len(), "maps");
    let decoded: Vec<DecodedMap> = raw_maps
        .par_iter()
        .filter_map(|raw| {
            let result = decoder::decode(
                raw.id,
                raw.epoch_hint,
                &raw.nbt,
                config.include_unlimited_tracking,
            );
            decode_bar.inc(1);
            match result {
                Ok(map) => map,
                Err(error) => {
                    log::warn!("map {}: {error:#}", raw.id);
                    None
                }
            }
        })
        .collect();
    decode_bar.finish_and_clear();

    let stored: HashMap<u32, StoredMapPng> = if config.force {
        HashMap::new()
    } else {
        png_store::load_all(&maps_dir)?
    };
    let now = png_store::now_epoch();

    let write_bar = progress_bar(config.quiet, "Store", decoded.len(), "maps");
    let write_results: Vec<Option<StoredMapPng>> = decoded
        .par_iter()
        .map(|decoded_map| {
            let previous = stored.get(&decoded_map.id);
            let result = match png_store::reconcile(decoded_map, previous, now) {
                png_store::Action::Drop => Ok(previous.cloned()),
                png_store::Action::Write { epoch } => {
                    png_store::write(&maps_dir, decoded_map, epoch, previous).map(Some)
                }
            };
            write_bar.inc(1);
            result
        })
        .collect::<Result<Vec<_>>>()?;
    write_bar.finish_and_clear();

    let mut report = Report::default();
    let mut stored_now: HashMap<u32, StoredMapPng> = HashMap::new();
    for (decoded_map, written) in decoded.iter().zip(write_results.into_iter()) {
        if let Some(stored_map) = written {
            let is_fresh = stored.get(&decoded_map.id).map_or(true, |p| p.hash != stored_map.hash);
            if is_fresh {
                report.maps_written += 1;
            } else {
                report.maps_dropped += 1;
            }
            stored_now.insert(decoded_map.id, stored_map);
        }
    }

    let current_maps: Vec<StoredMapPng> = stored_now.values().cloned().collect();
    let buckets = compositor::group_by_bucket(&current_maps);

    let composite_bar = progress_bar(config.quiet, "Composite", buckets.len(), "buckets");
    let tiles_written: usize = buckets
        .par_iter()
        .map(|(&(dimension, ox, oz), maps)| -> Result<usize> {
            let canvas = compositor::composite_bucket((ox, oz), maps, config.disable_zoom_sort)?;
            compositor::write_bucket(&merged_maps_dir, dimension, (ox, oz), &canvas)?;
            let base_tile_x = ox.div_euclid(128) as i64;
            let base_tile_y = (-oz).div_euclid(128) as i64;
            let written = tile::slice_bucket(&tiles_dir, dimension, base_tile_x, base_tile_y, &canvas)?;
            composite_bar.inc(1);
            Ok(written.len())
        })
        .try_reduce(|| 0, |a, b| Ok(a + b))?;
    composite_bar.finish_and_clear();
    report.tiles_written += tiles_written;

    report.tiles_written += pyramid::reduce_pyramid(&tiles_dir, &Dimension::ALL)?;

    let filenames: HashMap<u32, String> =
        stored_now.iter().map(|(&id, stored_map)| (id, stored_map.filename())).collect();
    markers::write_banners(&config.output.join("banners.json"), &decoded)?;
    markers::write_maps(&config.output.join("maps.json"), &decoded, &filenames)?;

    if let Some(template) = &config.copy_template {
        utilities::copy_template(template, &config.output.join("assets"))?;
    }

    if !config.quiet {
        println!(
            "Processed {} maps and wrote {} tiles in {:.2}s",
            decoded.len(),
            report.tiles_written,
            start_time.elapsed().as_secs_f32()
        );
    }

    Ok(())
}
