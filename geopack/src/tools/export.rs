use anyhow::Result;
use clap::Args;
use geopack_container::{OpenOptions, RasterReader, RasterSource};
use geopack_core::BandLayout;
use std::path::PathBuf;

#[derive(Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// source GeoPackage
	#[arg(required = true)]
	container: PathBuf,

	/// target image file; the format follows the file extension
	#[arg(required = true)]
	image: PathBuf,

	/// tile pyramid table to export; required for multi-table containers
	#[arg(long)]
	table: Option<String>,

	/// zoom level to export; defaults to the base level
	#[arg(long)]
	zoom: Option<u8>,

	/// number of bands in the output (1-4); defaults to 4
	#[arg(long)]
	band_count: Option<u8>,
}

#[tokio::main]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!("export {:?} to {:?}", arguments.container, arguments.image);

	let options = OpenOptions {
		table_name: arguments.table.clone(),
		band_layout: arguments.band_count.map(BandLayout::from_band_count).transpose()?,
		zoom_level: arguments.zoom,
		..OpenOptions::default()
	};

	let reader = RasterReader::open_with(&arguments.container, options)?;
	let image = reader.read_full().await?;
	image.save(&arguments.image)?;

	log::info!(
		"exported {}x{} pixels from '{}'",
		image.width(),
		image.height(),
		reader.table_name()
	);
	Ok(())
}

#[cfg(test)]
mod tests {
	use crate::tests::run_command;
	use geopack_container::{CreateOptions, RasterWriter};
	use geopack_core::{BandLayout, GeoTransform};
	use geopack_image::testing::test_image;

	#[test]
	fn export_to_png() {
		let dir = assert_fs::TempDir::new().unwrap();
		let container = dir.path().join("source.gpkg");
		let target = dir.path().join("out.png");

		let source = test_image(BandLayout::Rgba, 48, 48);
		let options = CreateOptions {
			tile_width: 32,
			tile_height: 32,
			..CreateOptions::default()
		};
		let mut writer = RasterWriter::create(&container, 48, 48, options).unwrap();
		writer
			.set_geo_transform(GeoTransform::new(0.0, 0.0, 1.0, -1.0).unwrap())
			.unwrap();
		writer.write_image(&source).unwrap();

		run_command(vec![
			"geopack",
			"export",
			container.to_str().unwrap(),
			target.to_str().unwrap(),
			"--band-count",
			"3",
		])
		.unwrap();

		let exported = image::open(&target).unwrap();
		assert_eq!((exported.width(), exported.height()), (48, 48));
	}
}
