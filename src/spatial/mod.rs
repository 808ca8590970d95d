mod index;

pub use index::{CellRect, OccupancyStore, CHUNK_SIZE};
