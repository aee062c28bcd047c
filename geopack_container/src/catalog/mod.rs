//! The GeoPackage catalog: schema creation and row access.
//!
//! All SQL lives here. The [`Catalog`] wraps a connection pool and exposes
//! typed accessors for the catalog tables plus the tile pyramid tables they
//! describe. Higher layers never issue SQL themselves.

mod records;

pub use records::{ContentsRecord, ExtensionRecord, SrsRecord, TileMatrixSetRecord};

use anyhow::{Context, Result, ensure};
use geopack_core::{Blob, GeoExtent, TileCoord, TileMatrix, TileRange};
use r2d2::Pool;
use r2d2_sqlite::{
	SqliteConnectionManager,
	rusqlite::{OptionalExtension, params},
};
use std::path::Path;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// `PRAGMA application_id` value of a GeoPackage: the bytes "GPKG".
pub const GPKG_APPLICATION_ID: i64 = 0x4750_4B47;

/// Legacy application ids ("GP10", "GP11") still accepted on open.
const LEGACY_APPLICATION_IDS: [i64; 2] = [0x4750_3130, 0x4750_3131];

/// Typed access to the catalog tables of one container.
pub struct Catalog {
	pool: Pool<SqliteConnectionManager>,
}

impl Catalog {
	#[must_use]
	pub fn new(pool: Pool<SqliteConnectionManager>) -> Catalog {
		Catalog { pool }
	}

	/// Open a connection pool for a container file.
	///
	/// # Errors
	/// Returns an error if the pool cannot be built.
	pub fn open_pool(path: &Path) -> Result<Pool<SqliteConnectionManager>> {
		let manager = SqliteConnectionManager::file(path);
		Ok(Pool::builder().max_size(10).build(manager)?)
	}

	/// Create the catalog schema in an empty database.
	///
	/// Sets the application id, creates the five catalog tables and seeds
	/// `gpkg_spatial_ref_sys` with the required records.
	///
	/// # Errors
	/// Returns an error if any statement fails.
	pub fn initialize(&self) -> Result<()> {
		log::debug!("initializing catalog schema");

		let conn = self.pool.get()?;
		conn.pragma_update(None, "application_id", GPKG_APPLICATION_ID)?;

		conn.execute_batch(
			"CREATE TABLE gpkg_spatial_ref_sys (
				srs_name TEXT NOT NULL,
				srs_id INTEGER PRIMARY KEY,
				organization TEXT NOT NULL,
				organization_coordsys_id INTEGER NOT NULL,
				definition TEXT NOT NULL,
				description TEXT
			);
			CREATE TABLE gpkg_contents (
				table_name TEXT PRIMARY KEY,
				data_type TEXT NOT NULL,
				identifier TEXT UNIQUE,
				description TEXT DEFAULT '',
				last_change DATETIME NOT NULL,
				min_x DOUBLE,
				min_y DOUBLE,
				max_x DOUBLE,
				max_y DOUBLE,
				srs_id INTEGER,
				CONSTRAINT fk_gc_r_srs_id FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys(srs_id)
			);
			CREATE TABLE gpkg_tile_matrix_set (
				table_name TEXT PRIMARY KEY,
				srs_id INTEGER NOT NULL,
				min_x DOUBLE NOT NULL,
				min_y DOUBLE NOT NULL,
				max_x DOUBLE NOT NULL,
				max_y DOUBLE NOT NULL,
				CONSTRAINT fk_gtms_table_name FOREIGN KEY (table_name) REFERENCES gpkg_contents(table_name),
				CONSTRAINT fk_gtms_srs FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys(srs_id)
			);
			CREATE TABLE gpkg_tile_matrix (
				table_name TEXT NOT NULL,
				zoom_level INTEGER NOT NULL,
				matrix_width INTEGER NOT NULL,
				matrix_height INTEGER NOT NULL,
				tile_width INTEGER NOT NULL,
				tile_height INTEGER NOT NULL,
				pixel_x_size DOUBLE NOT NULL,
				pixel_y_size DOUBLE NOT NULL,
				CONSTRAINT pk_ttm PRIMARY KEY (table_name, zoom_level),
				CONSTRAINT fk_tmm_table_name FOREIGN KEY (table_name) REFERENCES gpkg_contents(table_name)
			);
			CREATE TABLE gpkg_extensions (
				table_name TEXT,
				column_name TEXT,
				extension_name TEXT NOT NULL,
				definition TEXT NOT NULL,
				scope TEXT NOT NULL,
				CONSTRAINT ge_tce UNIQUE (table_name, column_name, extension_name)
			);",
		)?;

		for srs in SrsRecord::seed_records() {
			conn.execute(
				"INSERT INTO gpkg_spatial_ref_sys (srs_name, srs_id, organization, organization_coordsys_id, definition)
				VALUES (?1, ?2, ?3, ?4, ?5)",
				params![
					srs.srs_name,
					srs.srs_id,
					srs.organization,
					srs.organization_coordsys_id,
					srs.definition
				],
			)?;
		}

		Ok(())
	}

	/// Returns `true` if the database already carries a catalog schema.
	///
	/// # Errors
	/// Returns an error if the query fails.
	pub fn has_schema(&self) -> Result<bool> {
		let conn = self.pool.get()?;
		let count: i64 = conn.query_row(
			"SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'gpkg_contents'",
			[],
			|row| row.get(0),
		)?;
		Ok(count > 0)
	}

	/// Validate the application id pragma of an opened container.
	///
	/// # Errors
	/// Returns an error if the id is neither "GPKG" nor a legacy "GP10"/"GP11".
	pub fn check_application_id(&self) -> Result<()> {
		let conn = self.pool.get()?;
		let id: i64 = conn.query_row("PRAGMA application_id", [], |row| row.get(0))?;
		ensure!(
			id == GPKG_APPLICATION_ID || LEGACY_APPLICATION_IDS.contains(&id),
			"application_id 0x{id:08X} does not identify a GeoPackage"
		);
		Ok(())
	}

	/// Insert or update the SRS record with the given id.
	///
	/// # Errors
	/// Returns an error if the statement fails.
	pub fn put_srs(&self, srs: &SrsRecord) -> Result<()> {
		self.pool.get()?.execute(
			"INSERT OR REPLACE INTO gpkg_spatial_ref_sys (srs_name, srs_id, organization, organization_coordsys_id, definition)
			VALUES (?1, ?2, ?3, ?4, ?5)",
			params![
				srs.srs_name,
				srs.srs_id,
				srs.organization,
				srs.organization_coordsys_id,
				srs.definition
			],
		)?;
		Ok(())
	}

	/// Fetch the SRS definition for an id.
	///
	/// # Errors
	/// Returns an error if the query fails.
	pub fn get_srs(&self, srs_id: i32) -> Result<Option<SrsRecord>> {
		let conn = self.pool.get()?;
		Ok(conn
			.query_row(
				"SELECT srs_name, srs_id, organization, organization_coordsys_id, definition
				FROM gpkg_spatial_ref_sys WHERE srs_id = ?1",
				params![srs_id],
				|row| {
					Ok(SrsRecord {
						srs_name: row.get(0)?,
						srs_id: row.get(1)?,
						organization: row.get(2)?,
						organization_coordsys_id: row.get(3)?,
						definition: row.get(4)?,
					})
				},
			)
			.optional()?)
	}

	/// Insert or replace a `gpkg_contents` row.
	///
	/// # Errors
	/// Returns an error if the statement fails.
	pub fn put_contents(&self, contents: &ContentsRecord) -> Result<()> {
		self.pool.get()?.execute(
			"INSERT OR REPLACE INTO gpkg_contents
			(table_name, data_type, identifier, description, last_change, min_x, min_y, max_x, max_y, srs_id)
			VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
			params![
				contents.table_name,
				contents.data_type,
				contents.identifier,
				contents.description,
				contents.last_change,
				contents.extent.min_x,
				contents.extent.min_y,
				contents.extent.max_x,
				contents.extent.max_y,
				contents.srs_id
			],
		)?;
		Ok(())
	}

	/// Fetch the `gpkg_contents` row of a table.
	///
	/// # Errors
	/// Returns an error if the query fails or the stored extent is invalid.
	pub fn get_contents(&self, table_name: &str) -> Result<Option<ContentsRecord>> {
		let conn = self.pool.get()?;
		let row = conn
			.query_row(
				"SELECT table_name, data_type, identifier, description, last_change, min_x, min_y, max_x, max_y, srs_id
				FROM gpkg_contents WHERE table_name = ?1",
				params![table_name],
				map_contents_row,
			)
			.optional()?;

		row.map(contents_from_raw).transpose()
	}

	/// All `gpkg_contents` rows with `data_type = 'tiles'`.
	///
	/// # Errors
	/// Returns an error if the query fails or a stored extent is invalid.
	pub fn list_tile_contents(&self) -> Result<Vec<ContentsRecord>> {
		let conn = self.pool.get()?;
		let mut stmt = conn.prepare(
			"SELECT table_name, data_type, identifier, description, last_change, min_x, min_y, max_x, max_y, srs_id
			FROM gpkg_contents WHERE data_type = 'tiles' ORDER BY table_name",
		)?;
		let rows = stmt.query_map([], map_contents_row)?;

		let mut result = Vec::new();
		for row in rows {
			result.push(contents_from_raw(row?)?);
		}
		Ok(result)
	}

	/// Insert or replace a `gpkg_tile_matrix_set` row.
	///
	/// # Errors
	/// Returns an error if the statement fails.
	pub fn put_tile_matrix_set(&self, set: &TileMatrixSetRecord) -> Result<()> {
		self.pool.get()?.execute(
			"INSERT OR REPLACE INTO gpkg_tile_matrix_set (table_name, srs_id, min_x, min_y, max_x, max_y)
			VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
			params![
				set.table_name,
				set.srs_id,
				set.extent.min_x,
				set.extent.min_y,
				set.extent.max_x,
				set.extent.max_y
			],
		)?;
		Ok(())
	}

	/// Fetch the `gpkg_tile_matrix_set` row of a table.
	///
	/// # Errors
	/// Returns an error if the query fails or the stored extent is invalid.
	pub fn get_tile_matrix_set(&self, table_name: &str) -> Result<Option<TileMatrixSetRecord>> {
		let conn = self.pool.get()?;
		let row = conn
			.query_row(
				"SELECT table_name, srs_id, min_x, min_y, max_x, max_y
				FROM gpkg_tile_matrix_set WHERE table_name = ?1",
				params![table_name],
				|row| {
					Ok((
						row.get::<_, String>(0)?,
						row.get::<_, i32>(1)?,
						row.get::<_, f64>(2)?,
						row.get::<_, f64>(3)?,
						row.get::<_, f64>(4)?,
						row.get::<_, f64>(5)?,
					))
				},
			)
			.optional()?;

		row.map(|(table_name, srs_id, min_x, min_y, max_x, max_y)| {
			Ok(TileMatrixSetRecord {
				table_name,
				srs_id,
				extent: GeoExtent::new(min_x, min_y, max_x, max_y)
					.context("invalid extent in gpkg_tile_matrix_set")?,
			})
		})
		.transpose()
	}

	/// Insert or replace a `gpkg_tile_matrix` row.
	///
	/// # Errors
	/// Returns an error if the statement fails.
	pub fn put_tile_matrix(&self, table_name: &str, matrix: &TileMatrix) -> Result<()> {
		self.pool.get()?.execute(
			"INSERT OR REPLACE INTO gpkg_tile_matrix
			(table_name, zoom_level, matrix_width, matrix_height, tile_width, tile_height, pixel_x_size, pixel_y_size)
			VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
			params![
				table_name,
				matrix.zoom,
				matrix.matrix_width,
				matrix.matrix_height,
				matrix.tile_width,
				matrix.tile_height,
				matrix.pixel_size_x,
				matrix.pixel_size_y
			],
		)?;
		Ok(())
	}

	/// All tile matrix rows of a table, ordered by ascending zoom.
	///
	/// # Errors
	/// Returns an error if the query fails or a row is invalid.
	pub fn get_tile_matrices(&self, table_name: &str) -> Result<Vec<TileMatrix>> {
		let conn = self.pool.get()?;
		let mut stmt = conn.prepare(
			"SELECT zoom_level, matrix_width, matrix_height, tile_width, tile_height, pixel_x_size, pixel_y_size
			FROM gpkg_tile_matrix WHERE table_name = ?1 ORDER BY zoom_level",
		)?;
		let rows = stmt.query_map(params![table_name], |row| {
			Ok((
				row.get::<_, u8>(0)?,
				row.get::<_, u32>(1)?,
				row.get::<_, u32>(2)?,
				row.get::<_, u32>(3)?,
				row.get::<_, u32>(4)?,
				row.get::<_, f64>(5)?,
				row.get::<_, f64>(6)?,
			))
		})?;

		let mut matrices = Vec::new();
		for row in rows {
			let (zoom, mw, mh, tw, th, psx, psy) = row?;
			matrices.push(
				TileMatrix::new(zoom, mw, mh, tw, th, psx, psy)
					.with_context(|| format!("invalid gpkg_tile_matrix row for '{table_name}' zoom {zoom}"))?,
			);
		}
		Ok(matrices)
	}

	/// Insert or replace a `gpkg_extensions` row.
	///
	/// # Errors
	/// Returns an error if the statement fails.
	pub fn put_extension(&self, extension: &ExtensionRecord) -> Result<()> {
		self.pool.get()?.execute(
			"INSERT OR REPLACE INTO gpkg_extensions (table_name, column_name, extension_name, definition, scope)
			VALUES (?1, ?2, ?3, ?4, ?5)",
			params![
				extension.table_name,
				extension.column_name,
				extension.extension_name,
				extension.definition,
				extension.scope
			],
		)?;
		Ok(())
	}

	/// All extension rows that apply to a table (or to the whole container).
	///
	/// Containers without a `gpkg_extensions` table yield an empty list.
	///
	/// # Errors
	/// Returns an error if the query fails.
	pub fn get_extensions(&self, table_name: &str) -> Result<Vec<ExtensionRecord>> {
		let conn = self.pool.get()?;
		let has_table: i64 = conn.query_row(
			"SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'gpkg_extensions'",
			[],
			|row| row.get(0),
		)?;
		if has_table == 0 {
			return Ok(Vec::new());
		}

		let mut stmt = conn.prepare(
			"SELECT table_name, column_name, extension_name, definition, scope
			FROM gpkg_extensions WHERE table_name IS NULL OR table_name = ?1",
		)?;
		let rows = stmt.query_map(params![table_name], |row| {
			Ok(ExtensionRecord {
				table_name: row.get(0)?,
				column_name: row.get(1)?,
				extension_name: row.get(2)?,
				definition: row.get(3)?,
				scope: row.get(4)?,
			})
		})?;

		Ok(rows.collect::<Result<Vec<_>, _>>()?)
	}

	/// Create an empty tile pyramid table.
	///
	/// # Errors
	/// Returns an error if the name is not a valid identifier or the
	/// statement fails.
	pub fn create_tile_table(&self, table_name: &str) -> Result<()> {
		let table = quote_identifier(table_name)?;
		self.pool.get()?.execute_batch(&format!(
			"CREATE TABLE {table} (
				id INTEGER PRIMARY KEY AUTOINCREMENT,
				zoom_level INTEGER NOT NULL,
				tile_column INTEGER NOT NULL,
				tile_row INTEGER NOT NULL,
				tile_data BLOB NOT NULL,
				UNIQUE (zoom_level, tile_column, tile_row)
			);"
		))?;
		Ok(())
	}

	/// Store a batch of tiles in a single transaction.
	///
	/// Existing tiles at the same coordinates are replaced.
	///
	/// # Errors
	/// Returns an error if the transaction or any insertion fails.
	pub fn put_tiles(&self, table_name: &str, tiles: &[(TileCoord, Blob)]) -> Result<()> {
		log::trace!("storing {} tiles into '{table_name}'", tiles.len());

		let table = quote_identifier(table_name)?;
		let mut conn = self.pool.get()?;
		let transaction = conn.transaction()?;
		{
			let mut stmt = transaction.prepare(&format!(
				"INSERT OR REPLACE INTO {table} (zoom_level, tile_column, tile_row, tile_data) VALUES (?1, ?2, ?3, ?4)"
			))?;
			for (coord, blob) in tiles {
				stmt.execute(params![coord.zoom, coord.col, coord.row, blob.as_slice()])?;
			}
		}
		transaction.commit()?;
		Ok(())
	}

	/// Fetch one tile blob; `Ok(None)` when the tile is not stored.
	///
	/// # Errors
	/// Returns an error if the query fails.
	pub fn get_tile(&self, table_name: &str, coord: &TileCoord) -> Result<Option<Blob>> {
		let table = quote_identifier(table_name)?;
		let conn = self.pool.get()?;
		let data = conn
			.query_row(
				&format!("SELECT tile_data FROM {table} WHERE zoom_level = ?1 AND tile_column = ?2 AND tile_row = ?3"),
				params![coord.zoom, coord.col, coord.row],
				|row| row.get::<_, Vec<u8>>(0),
			)
			.optional()?;
		Ok(data.map(Blob::from))
	}

	/// Fetch an arbitrary tile blob from one zoom level, for format sniffing.
	///
	/// Returns `Ok(None)` when the level holds no tiles.
	///
	/// # Errors
	/// Returns an error if the query fails.
	pub fn sample_tile(&self, table_name: &str, zoom: u8) -> Result<Option<Blob>> {
		let table = quote_identifier(table_name)?;
		let conn = self.pool.get()?;
		let data = conn
			.query_row(
				&format!("SELECT tile_data FROM {table} WHERE zoom_level = ?1 LIMIT 1"),
				params![zoom],
				|row| row.get::<_, Vec<u8>>(0),
			)
			.optional()?;
		Ok(data.map(Blob::from))
	}

	/// The col/row range actually occupied by tiles at one zoom level.
	///
	/// Returns `Ok(None)` when the level holds no tiles.
	///
	/// # Errors
	/// Returns an error if the query fails.
	pub fn get_tile_range(&self, table_name: &str, zoom: u8) -> Result<Option<TileRange>> {
		let table = quote_identifier(table_name)?;
		let conn = self.pool.get()?;
		let bounds = conn.query_row(
			&format!(
				"SELECT MIN(tile_column), MIN(tile_row), MAX(tile_column), MAX(tile_row)
				FROM {table} WHERE zoom_level = ?1"
			),
			params![zoom],
			|row| {
				Ok((
					row.get::<_, Option<u32>>(0)?,
					row.get::<_, Option<u32>>(1)?,
					row.get::<_, Option<u32>>(2)?,
					row.get::<_, Option<u32>>(3)?,
				))
			},
		)?;

		match bounds {
			(Some(col_min), Some(row_min), Some(col_max), Some(row_max)) => {
				Ok(Some(TileRange::new(zoom, col_min, row_min, col_max, row_max)?))
			}
			_ => Ok(None),
		}
	}

	/// Number of tiles stored at one zoom level.
	///
	/// # Errors
	/// Returns an error if the query fails.
	pub fn count_tiles(&self, table_name: &str, zoom: u8) -> Result<u64> {
		let table = quote_identifier(table_name)?;
		let conn = self.pool.get()?;
		let count: i64 = conn.query_row(
			&format!("SELECT COUNT(*) FROM {table} WHERE zoom_level = ?1"),
			params![zoom],
			|row| row.get(0),
		)?;
		Ok(count as u64)
	}
}

/// The current time as an RFC 3339 string, for `last_change` columns.
///
/// # Errors
/// Returns an error if formatting fails.
pub fn now_rfc3339() -> Result<String> {
	Ok(OffsetDateTime::now_utc().format(&Rfc3339)?)
}

type RawContentsRow = (
	String,
	String,
	Option<String>,
	Option<String>,
	String,
	Option<f64>,
	Option<f64>,
	Option<f64>,
	Option<f64>,
	i32,
);

fn map_contents_row(row: &r2d2_sqlite::rusqlite::Row<'_>) -> r2d2_sqlite::rusqlite::Result<RawContentsRow> {
	Ok((
		row.get(0)?,
		row.get(1)?,
		row.get(2)?,
		row.get(3)?,
		row.get(4)?,
		row.get(5)?,
		row.get(6)?,
		row.get(7)?,
		row.get(8)?,
		row.get(9)?,
	))
}

fn contents_from_raw(raw: RawContentsRow) -> Result<ContentsRecord> {
	let (table_name, data_type, identifier, description, last_change, min_x, min_y, max_x, max_y, srs_id) = raw;
	let extent = match (min_x, min_y, max_x, max_y) {
		(Some(min_x), Some(min_y), Some(max_x), Some(max_y)) => GeoExtent::new(min_x, min_y, max_x, max_y)
			.with_context(|| format!("invalid extent in gpkg_contents for '{table_name}'"))?,
		_ => anyhow::bail!("gpkg_contents row for '{table_name}' has no extent"),
	};
	Ok(ContentsRecord {
		identifier: identifier.unwrap_or_else(|| table_name.clone()),
		description: description.unwrap_or_default(),
		table_name,
		data_type,
		last_change,
		extent,
		srs_id,
	})
}

/// Quote a table name for direct use in SQL.
///
/// # Errors
/// Returns an error for empty names or names containing a double quote.
fn quote_identifier(name: &str) -> Result<String> {
	ensure!(!name.is_empty(), "table name must not be empty");
	ensure!(!name.contains('"'), "table name {name:?} must not contain '\"'");
	Ok(format!("\"{name}\""))
}
