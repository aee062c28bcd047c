//! Row types of the GeoPackage catalog tables.

use geopack_core::GeoExtent;

/// A row of `gpkg_spatial_ref_sys`.
#[derive(Clone, Debug, PartialEq)]
pub struct SrsRecord {
	pub srs_name: String,
	pub srs_id: i32,
	pub organization: String,
	pub organization_coordsys_id: i32,
	pub definition: String,
}

impl SrsRecord {
	/// The three records every container is seeded with: the two undefined
	/// systems (-1, 0) and WGS 84 (4326).
	#[must_use]
	pub fn seed_records() -> Vec<SrsRecord> {
		vec![
			SrsRecord {
				srs_name: "Undefined Cartesian SRS".to_string(),
				srs_id: -1,
				organization: "NONE".to_string(),
				organization_coordsys_id: -1,
				definition: "undefined".to_string(),
			},
			SrsRecord {
				srs_name: "Undefined geographic SRS".to_string(),
				srs_id: 0,
				organization: "NONE".to_string(),
				organization_coordsys_id: 0,
				definition: "undefined".to_string(),
			},
			SrsRecord {
				srs_name: "WGS 84 geodetic".to_string(),
				srs_id: 4326,
				organization: "EPSG".to_string(),
				organization_coordsys_id: 4326,
				definition: concat!(
					"GEOGCS[\"WGS 84\",DATUM[\"WGS_1984\",",
					"SPHEROID[\"WGS 84\",6378137,298.257223563]],",
					"PRIMEM[\"Greenwich\",0],UNIT[\"degree\",0.0174532925199433]]"
				)
				.to_string(),
			},
		]
	}

	/// Web Mercator (3857), not seeded but common enough to keep on hand.
	#[must_use]
	pub fn web_mercator() -> SrsRecord {
		SrsRecord {
			srs_name: "WGS 84 / Pseudo-Mercator".to_string(),
			srs_id: 3857,
			organization: "EPSG".to_string(),
			organization_coordsys_id: 3857,
			definition: concat!(
				"PROJCS[\"WGS 84 / Pseudo-Mercator\",GEOGCS[\"WGS 84\",",
				"DATUM[\"WGS_1984\",SPHEROID[\"WGS 84\",6378137,298.257223563]],",
				"PRIMEM[\"Greenwich\",0],UNIT[\"degree\",0.0174532925199433]],",
				"PROJECTION[\"Mercator_1SP\"],PARAMETER[\"central_meridian\",0],",
				"PARAMETER[\"scale_factor\",1],PARAMETER[\"false_easting\",0],",
				"PARAMETER[\"false_northing\",0],UNIT[\"metre\",1]]"
			)
			.to_string(),
		}
	}
}

/// A row of `gpkg_contents` describing one tile pyramid table.
#[derive(Clone, Debug, PartialEq)]
pub struct ContentsRecord {
	pub table_name: String,
	pub data_type: String,
	pub identifier: String,
	pub description: String,
	/// RFC 3339 timestamp of the last modification.
	pub last_change: String,
	pub extent: GeoExtent,
	pub srs_id: i32,
}

/// A row of `gpkg_tile_matrix_set`: the full extent of a tile grid.
///
/// The top-left corner of this extent anchors tile (0, 0) of every zoom
/// level of the table.
#[derive(Clone, Debug, PartialEq)]
pub struct TileMatrixSetRecord {
	pub table_name: String,
	pub srs_id: i32,
	pub extent: GeoExtent,
}

/// A row of `gpkg_extensions`.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtensionRecord {
	pub table_name: Option<String>,
	pub column_name: Option<String>,
	pub extension_name: String,
	pub definition: String,
	pub scope: String,
}

impl ExtensionRecord {
	/// The `gpkg_webp` extension row for a tile table.
	#[must_use]
	pub fn webp(table_name: &str) -> ExtensionRecord {
		ExtensionRecord {
			table_name: Some(table_name.to_string()),
			column_name: Some("tile_data".to_string()),
			extension_name: "gpkg_webp".to_string(),
			definition: "http://www.geopackage.org/spec120/#extension_tiles_webp".to_string(),
			scope: "read-write".to_string(),
		}
	}
}
