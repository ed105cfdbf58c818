use arrow_schema::{DataType, Field, Schema, TimeUnit};
use std::sync::Arc;

/// One row per chunk: explicit row position, chunk metadata and its vector.
pub fn build_chunk_schema(dim: i32) -> Arc<Schema> {
	Arc::new(Schema::new(vec![
		Field::new("row", DataType::Int64, false),
		Field::new("chunk_id", DataType::Utf8, false),
		Field::new("doc_id", DataType::Utf8, false),
		Field::new("title", DataType::Utf8, false),
		Field::new("chunk_index", DataType::Int32, false),
		Field::new("text", DataType::Utf8, false),
		Field::new("vector", DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim), true),
	]))
}

/// Key/value manifest written next to the chunk table.
pub fn build_meta_schema() -> Arc<Schema> {
	Arc::new(Schema::new(vec![
		Field::new("key", DataType::Utf8, false),
		Field::new("value", DataType::Utf8, false),
		Field::new("updated_at", DataType::Timestamp(TimeUnit::Millisecond, None), false),
	]))
}
