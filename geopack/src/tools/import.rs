use anyhow::{Result, ensure};
use clap::Args;
use geopack_container::{CreateOptions, RasterWriter};
use geopack_core::{GeoExtent, GeoTransform, TileFormat};
use std::path::PathBuf;

#[derive(Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// source image (png, jpeg or webp)
	#[arg(required = true)]
	image: PathBuf,

	/// target GeoPackage
	#[arg(required = true)]
	container: PathBuf,

	/// name of the tile pyramid table
	#[arg(long, default_value = "tiles")]
	table: String,

	/// tile codec: png, jpeg or webp
	#[arg(long, default_value = "png")]
	format: TileFormat,

	/// codec quality 0..=100 (100 selects lossless webp)
	#[arg(long)]
	quality: Option<u8>,

	/// tile edge length in pixels
	#[arg(long, default_value_t = 256)]
	tile_size: u32,

	/// geographic bounds as min_x,min_y,max_x,max_y
	/// defaults to one unit per pixel, anchored at the origin
	#[arg(long, value_delimiter = ',', num_args = 1, allow_hyphen_values = true, verbatim_doc_comment)]
	bounds: Option<Vec<f64>>,

	/// also build the overview levels
	#[arg(long)]
	overviews: bool,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!("import {:?} into {:?}", arguments.image, arguments.container);

	let image = image::open(&arguments.image)?;
	let (width, height) = (image.width(), image.height());

	let extent = match &arguments.bounds {
		Some(bounds) => {
			ensure!(bounds.len() == 4, "bounds require exactly four values");
			GeoExtent::new(bounds[0], bounds[1], bounds[2], bounds[3])?
		}
		None => GeoExtent::new(0.0, -f64::from(height), f64::from(width), 0.0)?,
	};

	let options = CreateOptions {
		table_name: arguments.table.clone(),
		format: arguments.format,
		quality: arguments.quality,
		tile_width: arguments.tile_size,
		tile_height: arguments.tile_size,
		..CreateOptions::default()
	};

	let mut writer = RasterWriter::create(&arguments.container, width, height, options)?;
	writer.set_geo_transform(GeoTransform::from_extent(&extent, width, height)?)?;
	writer.write_image(&image)?;

	if arguments.overviews {
		writer.build_overviews()?;
	}

	log::info!("imported {width}x{height} pixels into '{}'", arguments.table);
	Ok(())
}

#[cfg(test)]
mod tests {
	use crate::tests::run_command;
	use geopack_core::BandLayout;
	use geopack_image::testing::test_image;

	#[test]
	fn import_png() {
		let dir = assert_fs::TempDir::new().unwrap();
		let source = dir.path().join("source.png");
		let target = dir.path().join("target.gpkg");

		test_image(BandLayout::Rgba, 80, 40).save(&source).unwrap();

		run_command(vec![
			"geopack",
			"import",
			source.to_str().unwrap(),
			target.to_str().unwrap(),
			"--tile-size",
			"32",
			"--bounds",
			"-180,-90,180,90",
			"--overviews",
		])
		.unwrap();

		assert!(target.exists());
	}
}
