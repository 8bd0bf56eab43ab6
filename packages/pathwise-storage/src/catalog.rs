//! JSON content catalogs: an array of content records, validated one record at a time.

use std::{collections::HashSet, fs, path::Path};

use serde_json::Value;

use pathwise_domain::ContentItem;

use crate::{Error, Result};

#[derive(Debug, Default)]
pub struct CatalogLoad {
	pub items: Vec<ContentItem>,
	pub rejected: Vec<RejectedRecord>,
}

#[derive(Debug)]
pub struct RejectedRecord {
	/// Position of the record in the source array.
	pub position: usize,
	pub reason: String,
}

pub fn load_catalog(path: &Path) -> Result<CatalogLoad> {
	let raw = fs::read_to_string(path)?;

	parse_catalog(&raw)
}

pub fn parse_catalog(raw: &str) -> Result<CatalogLoad> {
	let value: Value = serde_json::from_str(raw)?;
	let Value::Array(records) = value else {
		return Err(Error::Catalog("Catalog must be a JSON array of content records.".to_string()));
	};
	let mut out = CatalogLoad::default();
	let mut seen = HashSet::new();

	for (position, record) in records.into_iter().enumerate() {
		let item = match serde_json::from_value::<ContentItem>(record) {
			Ok(item) => item,
			Err(err) => {
				out.rejected.push(RejectedRecord { position, reason: err.to_string() });

				continue;
			},
		};

		if let Err(err) = item.validate() {
			out.rejected.push(RejectedRecord { position, reason: err.to_string() });

			continue;
		}
		if !seen.insert(item.id.clone()) {
			out.rejected.push(RejectedRecord {
				position,
				reason: format!("Duplicate content id {}.", item.id),
			});

			continue;
		}

		out.items.push(item);
	}

	for rejected in &out.rejected {
		tracing::warn!(
			position = rejected.position,
			reason = %rejected.reason,
			"Skipped invalid catalog record."
		);
	}

	Ok(out)
}

pub fn write_catalog(path: &Path, items: &[ContentItem]) -> Result<()> {
	let payload = serde_json::to_string_pretty(items)?;

	fs::write(path, payload)?;

	Ok(())
}
