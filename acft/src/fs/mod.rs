pub mod checkpoints;
pub mod markers;

pub use checkpoints::{
    create_checkpoint, load_checkpoint, read_checkpoint, scan_checkpoints, write_checkpoint,
};
pub use markers::init_markers;
