use anyhow::Result;
use clap::{ArgAction::Count, Args};
use geopack_container::{OpenOptions, RasterReader, RasterSource, list_subdatasets};
use std::path::PathBuf;

#[derive(Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// GeoPackage container you want to probe
	#[arg(required = true)]
	filename: PathBuf,

	/// deep scan
	/// -d also computes per-band checksums
	#[arg(long, short, action = Count, verbatim_doc_comment)]
	deep: u8,
}

#[tokio::main]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!("probe {:?}", arguments.filename);

	let subdatasets = list_subdatasets(&arguments.filename)?;
	println!("tile pyramids: {}", subdatasets.len());

	for subdataset in subdatasets {
		let options = OpenOptions {
			table_name: Some(subdataset.table_name.clone()),
			..OpenOptions::default()
		};
		let reader = RasterReader::open_with(&arguments.filename, options)?;

		println!("table '{}':", subdataset.table_name);
		println!("  identifier: {}", reader.identifier());
		if !reader.description().is_empty() {
			println!("  description: {}", reader.description());
		}
		if let Some(format) = reader.tile_format()? {
			println!("  format: {format}");
		}
		println!("  size: {}x{}", reader.width(), reader.height());
		println!("  zoom: {}", reader.zoom());
		println!("  srs_id: {}", reader.srs_id());
		println!("  geotransform: {:?}", reader.geo_transform().to_coefficients());

		if arguments.deep > 0 {
			for band in 0..reader.band_layout().band_count() {
				println!("  checksum band {band}: {}", reader.band_checksum(band).await?);
			}
		}
	}

	Ok(())
}
